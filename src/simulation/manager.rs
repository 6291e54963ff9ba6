//! Lifecycle owner for the single active simulation
//!
//! `load` disposes any previous simulation before constructing the new one,
//! so at most one script runtime is ever live. `update` ticks the simulation
//! and reports the followed object's position to the camera state.

use std::path::Path;
use std::rc::Rc;

use crate::error::ConfigError;
use crate::simulation::constants::ConstantsTable;
use crate::simulation::context::SimContext;
use crate::simulation::object::{MassObject, RenderState};
use crate::simulation::sim::Simulation;

pub struct SimulationManager {
    context: SimContext,
    constants: Rc<ConstantsTable>,
    simulation: Option<Simulation>,
}

impl SimulationManager {
    pub fn new(context: SimContext, constants: Rc<ConstantsTable>) -> Self {
        Self {
            context,
            constants,
            simulation: None,
        }
    }

    /// Load a script file, replacing any previous simulation.
    pub fn load(&mut self, path: &Path) -> Result<(), ConfigError> {
        self.dispose();
        self.simulation = Some(Simulation::load(
            self.context.clone(),
            &self.constants,
            path,
        )?);
        Ok(())
    }

    /// Load script source directly, replacing any previous simulation.
    pub fn load_source(&mut self, name: &str, source: &str) -> Result<(), ConfigError> {
        self.dispose();
        self.simulation = Some(Simulation::from_source(
            self.context.clone(),
            &self.constants,
            name,
            source,
        )?);
        Ok(())
    }

    /// Per-frame update: tick, then report the followed object's position.
    pub fn update(&mut self) {
        let Some(simulation) = &mut self.simulation else {
            return;
        };

        simulation.tick();

        if let Some(followed) = simulation.followed() {
            self.context
                .camera()
                .borrow_mut()
                .set_translation(followed.location());
        }
    }

    pub fn render(&self) -> Vec<RenderState> {
        self.simulation
            .as_ref()
            .map(Simulation::render)
            .unwrap_or_default()
    }

    pub fn objects(&self) -> Vec<MassObject> {
        self.simulation
            .as_ref()
            .map(Simulation::objects)
            .unwrap_or_default()
    }

    pub fn current_time(&self) -> f64 {
        self.simulation
            .as_ref()
            .map(Simulation::current_time)
            .unwrap_or_default()
    }

    pub fn follow_object(&self, object: Option<MassObject>) {
        if let Some(simulation) = &self.simulation {
            simulation.set_followed(object);
        }
    }

    pub fn clear_follow_object(&self) {
        self.follow_object(None);
    }

    pub fn dispose(&mut self) {
        if let Some(simulation) = &mut self.simulation {
            simulation.dispose();
        }
    }
}
