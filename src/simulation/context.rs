//! Explicit shared context: runtime settings and camera state
//!
//! Constructed once by the embedder and passed into the manager, simulation
//! and script bridge, instead of global singletons. `Rc`-based, so the whole
//! core is single-threaded by construction.

use std::cell::RefCell;
use std::rc::Rc;

use crate::simulation::object::Vec3;

/// Externally adjustable runtime settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// When set, `Tick` is a no-op.
    pub paused: bool,
    /// Integration step size in years.
    pub time_step: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            paused: false,
            time_step: 0.001,
        }
    }
}

/// Camera translation the external renderer reads each frame. The core only
/// writes it, on behalf of scripts and the followed object.
#[derive(Debug, Clone, Default)]
pub struct CameraState {
    pub translation: Vec3,
}

impl CameraState {
    pub fn set_translation(&mut self, translation: Vec3) {
        self.translation = translation;
    }

    pub fn translate(&mut self, delta: Vec3) {
        self.translation += delta;
    }
}

/// Shared context handed to every component of one simulation.
#[derive(Clone, Default)]
pub struct SimContext {
    settings: Rc<RefCell<Settings>>,
    camera: Rc<RefCell<CameraState>>,
}

impl SimContext {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: Rc::new(RefCell::new(settings)),
            camera: Rc::new(RefCell::new(CameraState::default())),
        }
    }

    pub fn paused(&self) -> bool {
        self.settings.borrow().paused
    }

    pub fn set_paused(&self, paused: bool) {
        self.settings.borrow_mut().paused = paused;
    }

    pub fn time_step(&self) -> f64 {
        self.settings.borrow().time_step
    }

    pub fn set_time_step(&self, time_step: f64) {
        self.settings.borrow_mut().time_step = time_step;
    }

    pub fn camera(&self) -> &Rc<RefCell<CameraState>> {
        &self.camera
    }
}
