pub mod configuration;
pub mod error;
pub mod scripting;
pub mod simulation;

pub use error::{ConfigError, ScriptError};

pub use simulation::constants::{ConstantsTable, PresetKind, PresetTable};
pub use simulation::context::{CameraState, Settings, SimContext};
pub use simulation::manager::SimulationManager;
pub use simulation::object::{Color, MassObject, RenderState, Vec3, MIN_SEPARATION, TRAIL_LENGTH};
pub use simulation::sim::Simulation;
pub use simulation::units::{UnitSystem, UNITS};

pub use scripting::engine::ScriptEngine;
pub use scripting::lua::LuaEngine;
pub use scripting::value::{HostFn, ScriptValue};

pub use configuration::config::SettingsConfig;
