//! The simulation: object collection, elapsed time, per-tick orchestration
//!
//! A tick runs the script phase strictly before the physics phase, so
//! topology changes a script makes are integrated in the same tick. The
//! physics pass iterates a handle snapshot of the collection taken after the
//! script phase. Script runtime errors are contained: reported, then the tick
//! continues.

use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use crate::error::ConfigError;
use crate::scripting::bridge::ScriptBridge;
use crate::scripting::engine::ScriptEngine;
use crate::scripting::lua::LuaEngine;
use crate::simulation::constants::ConstantsTable;
use crate::simulation::context::SimContext;
use crate::simulation::object::{MassObject, RenderState};

/// Mutable simulation state shared with the script bridge's host functions.
pub(crate) struct SimState {
    pub(crate) objects: Vec<MassObject>,
    pub(crate) current_time: f64, // years
    pub(crate) followed: Option<MassObject>,
}

impl SimState {
    pub(crate) fn find_object(&self, name: &str) -> Option<MassObject> {
        self.objects
            .iter()
            .find(|obj| obj.name().as_deref() == Some(name))
            .cloned()
    }

    /// Remove the first identity match. No-op if the handle is absent.
    pub(crate) fn remove_object(&mut self, handle: &MassObject) {
        if let Some(index) = self.objects.iter().position(|obj| obj.same_object(handle)) {
            self.objects.remove(index);
        }
    }
}

/// An ordered collection of gravitating bodies driven by one user script.
pub struct Simulation {
    state: Rc<RefCell<SimState>>,
    bridge: Option<ScriptBridge>,
    context: SimContext,
    disposed: bool,
}

impl Simulation {
    /// Construct from script source, hosting a fresh Lua runtime.
    pub fn from_source(
        context: SimContext,
        constants: &ConstantsTable,
        name: &str,
        source: &str,
    ) -> Result<Self, ConfigError> {
        Self::with_engine(context, constants, name, source, Box::new(LuaEngine::new()))
    }

    /// Construct from a script file on disk.
    pub fn load(
        context: SimContext,
        constants: &ConstantsTable,
        path: &Path,
    ) -> Result<Self, ConfigError> {
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "script".to_string());
        Self::from_source(context, constants, &name, &source)
    }

    /// Construct over a caller-supplied script engine. Test seam.
    pub fn with_engine(
        context: SimContext,
        constants: &ConstantsTable,
        name: &str,
        source: &str,
        engine: Box<dyn ScriptEngine>,
    ) -> Result<Self, ConfigError> {
        let state = Rc::new(RefCell::new(SimState {
            objects: Vec::new(),
            current_time: 0.0,
            followed: None,
        }));

        let bridge = ScriptBridge::new(
            engine,
            Rc::clone(&state),
            &context,
            constants,
            name,
            source,
        )?;

        Ok(Self {
            state,
            bridge: Some(bridge),
            context,
            disposed: false,
        })
    }

    /// Advance the simulation by one step. No-op when paused or disposed.
    pub fn tick(&mut self) {
        if self.disposed || self.context.paused() {
            return;
        }

        // Script phase: push state, then let the script mutate the collection.
        // Runtime errors are contained so one bad callback cannot take down
        // the frame loop.
        if let Some(bridge) = &self.bridge {
            if let Err(err) = bridge.update_state() {
                eprintln!("script state push failed: {err}");
            }
            if let Err(err) = bridge.tick() {
                eprintln!("script tick failed: {err}");
            }
        }

        let dt = self.context.time_step();
        self.state.borrow_mut().current_time += dt;

        // Physics phase over a stable snapshot of the possibly-mutated
        // collection; each body integrates against the same snapshot.
        let objects = self.state.borrow().objects.clone();
        for object in &objects {
            object.calculate_step(dt, &objects);
        }
    }

    /// Append a new body. Optional color and physical-unit kinematics are
    /// applied through the conversion-boundary setters by the caller.
    pub fn add_object(&self, mass_grams: f64, size: f32, name: Option<&str>) -> MassObject {
        let object = MassObject::new(mass_grams, size, name);
        self.state.borrow_mut().objects.push(object.clone());
        object
    }

    /// First object with a matching name.
    pub fn find_object(&self, name: &str) -> Option<MassObject> {
        self.state.borrow().find_object(name)
    }

    /// Remove by reference identity. No-op if the handle is absent.
    pub fn remove_object(&self, handle: &MassObject) {
        self.state.borrow_mut().remove_object(handle);
    }

    /// Handles to all live objects, in insertion order.
    pub fn objects(&self) -> Vec<MassObject> {
        self.state.borrow().objects.clone()
    }

    /// Elapsed simulated time in years.
    pub fn current_time(&self) -> f64 {
        self.state.borrow().current_time
    }

    pub fn followed(&self) -> Option<MassObject> {
        self.state.borrow().followed.clone()
    }

    pub fn set_followed(&self, object: Option<MassObject>) {
        self.state.borrow_mut().followed = object;
    }

    /// Per-object snapshots for the external renderer. Empty after dispose.
    pub fn render(&self) -> Vec<RenderState> {
        if self.disposed {
            return Vec::new();
        }
        self.state
            .borrow()
            .objects
            .iter()
            .map(MassObject::render_state)
            .collect()
    }

    /// Tear down the script runtime. Idempotent; later `tick`/`render` calls
    /// are silent no-ops.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.bridge = None;
        self.disposed = true;
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}
