//! Host/script bridge: one script runtime per simulation
//!
//! Owns the engine exclusively, exports the host-function table under stable
//! external names, publishes constants as namespaced globals, and overwrites
//! the script's view of the simulation once per tick before invoking `tick`.
//! The function table is assembled explicitly at startup; there is no runtime
//! discovery of exports.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{ConfigError, ScriptError};
use crate::scripting::engine::ScriptEngine;
use crate::scripting::value::{Args, HostFn, ScriptValue};
use crate::simulation::constants::ConstantsTable;
use crate::simulation::context::SimContext;
use crate::simulation::object::{Color, MassObject, Vec3};
use crate::simulation::sim::SimState;

/// Stub lifecycle entry points, so a user script may omit `init`/`tick`.
const BOOTSTRAP: &str = "init = function () end\ntick = function () end\n";

/// Bridge between one simulation and its embedded script runtime.
pub struct ScriptBridge {
    engine: Box<dyn ScriptEngine>,
    state: Rc<RefCell<SimState>>,
}

impl ScriptBridge {
    /// Boot the runtime: bootstrap stubs, host functions, constant globals,
    /// user chunk, entry-point resolution, then `init` exactly once.
    pub(crate) fn new(
        engine: Box<dyn ScriptEngine>,
        state: Rc<RefCell<SimState>>,
        context: &SimContext,
        constants: &ConstantsTable,
        chunk_name: &str,
        source: &str,
    ) -> Result<Self, ConfigError> {
        engine.evaluate("bootstrap", BOOTSTRAP)?;

        for (name, func) in host_functions(&state, context) {
            engine.register_function(name, func)?;
        }

        for table in constants.tables() {
            let prefix = table.kind().global_prefix();
            for (key, value) in table.iter() {
                engine.set_global(&format!("{prefix}{key}"), ScriptValue::Number(value))?;
            }
        }

        engine.evaluate(chunk_name, source)?;

        // A missing tick function is a load-time configuration error.
        engine
            .resolve_entry_point("tick")
            .map_err(|_| ConfigError::MissingEntryPoint {
                name: "tick".to_string(),
            })?;
        engine.resolve_entry_point("init")?;

        let bridge = Self { engine, state };
        bridge.engine.call_entry_point("init")?;
        Ok(bridge)
    }

    /// Overwrite `CurrentTime`, `FollowedObject` and `Objects` with current
    /// host values. Whole-value replacement, once per tick.
    pub(crate) fn update_state(&self) -> Result<(), ScriptError> {
        let (time, followed, objects) = {
            let state = self.state.borrow();
            (
                state.current_time,
                state.followed.clone(),
                state.objects.clone(),
            )
        };

        self.engine
            .set_global("CurrentTime", ScriptValue::Number(time))?;
        self.engine.set_global(
            "FollowedObject",
            followed.map_or(ScriptValue::Nil, ScriptValue::Object),
        )?;
        self.engine.set_global(
            "Objects",
            ScriptValue::List(objects.into_iter().map(ScriptValue::Object).collect()),
        )
    }

    /// Invoke the retained `tick` entry point.
    pub(crate) fn tick(&self) -> Result<(), ScriptError> {
        self.engine.call_entry_point("tick")
    }
}

/// The explicit table of (external name, native function) pairs.
fn host_functions(
    state: &Rc<RefCell<SimState>>,
    context: &SimContext,
) -> Vec<(&'static str, HostFn)> {
    let mut table: Vec<(&'static str, HostFn)> = Vec::new();

    let vector: HostFn = Rc::new(|args| {
        let mut args = Args::new("Vector", args);
        let x = args.number()?;
        let y = args.number()?;
        let z = args.number()?;
        Ok(ScriptValue::Vector(Vec3::new(x, y, z)))
    });
    table.push(("Vector", vector));

    let color_name: HostFn = Rc::new(|args| {
        let mut args = Args::new("ColorFromName", args);
        let name = args.string()?;
        Color::from_name(&name)
            .map(ScriptValue::Color)
            .ok_or_else(|| ScriptError::BadArgument {
                function: "ColorFromName".to_string(),
                reason: format!("unknown color name '{name}'"),
            })
    });
    table.push(("ColorFromName", color_name));

    let color_rgb: HostFn = Rc::new(|args| {
        let mut args = Args::new("ColorFromRGB", args);
        let r = args.number()?;
        let g = args.number()?;
        let b = args.number()?;
        Ok(ScriptValue::Color(Color::rgb(r as f32, g as f32, b as f32)))
    });
    table.push(("ColorFromRGB", color_rgb));

    let color_rgba: HostFn = Rc::new(|args| {
        let mut args = Args::new("ColorFromRGBA", args);
        let r = args.number()?;
        let g = args.number()?;
        let b = args.number()?;
        let a = args.number()?;
        Ok(ScriptValue::Color(Color::rgba(
            r as f32, g as f32, b as f32, a as f32,
        )))
    });
    table.push(("ColorFromRGBA", color_rgba));

    let debug: HostFn = Rc::new(|args| {
        let mut args = Args::new("DebugMessage", args);
        println!("(script)->{}", args.message());
        Ok(ScriptValue::Nil)
    });
    table.push(("DebugMessage", debug));

    let error: HostFn = Rc::new(|args| {
        let mut args = Args::new("ErrorMessage", args);
        eprintln!("(script)->{}", args.message());
        Ok(ScriptValue::Nil)
    });
    table.push(("ErrorMessage", error));

    let camera = Rc::clone(context.camera());
    let translate: HostFn = Rc::new(move |args| {
        let mut args = Args::new("CameraTranslate", args);
        let x = args.number()?;
        let y = args.number()?;
        let z = args.number()?;
        camera.borrow_mut().translate(Vec3::new(x, y, z));
        Ok(ScriptValue::Nil)
    });
    table.push(("CameraTranslate", translate));

    let camera = Rc::clone(context.camera());
    let set_translation: HostFn = Rc::new(move |args| {
        let mut args = Args::new("CameraSetTranslation", args);
        let x = args.number()?;
        let y = args.number()?;
        let z = args.number()?;
        camera.borrow_mut().set_translation(Vec3::new(x, y, z));
        Ok(ScriptValue::Nil)
    });
    table.push(("CameraSetTranslation", set_translation));

    let follow_state = Rc::clone(state);
    let follow: HostFn = Rc::new(move |args| {
        let mut args = Args::new("FollowObject", args);
        follow_state.borrow_mut().followed = args.opt_object()?;
        Ok(ScriptValue::Nil)
    });
    table.push(("FollowObject", follow));

    let clear_state = Rc::clone(state);
    let clear_follow: HostFn = Rc::new(move |_| {
        clear_state.borrow_mut().followed = None;
        Ok(ScriptValue::Nil)
    });
    table.push(("ClearFollowObject", clear_follow));

    let add_state = Rc::clone(state);
    let add: HostFn = Rc::new(move |args| {
        let mut args = Args::new("AddObject", args);
        let mass = args.number()?;
        let size = args.number()?;
        let name = args.opt_string()?;
        let color = args.opt_color()?;
        let location = args.opt_vector()?;
        let velocity = args.opt_vector()?;
        let acceleration = args.opt_vector()?;

        let object = MassObject::new(mass, size as f32, name.as_deref());
        if let Some(color) = color {
            object.set_color(color);
        }
        if let Some(location) = location {
            object.set_location(location);
        }
        if let Some(velocity) = velocity {
            object.set_velocity(velocity);
        }
        if let Some(acceleration) = acceleration {
            object.set_acceleration(acceleration);
        }

        add_state.borrow_mut().objects.push(object.clone());
        Ok(ScriptValue::Object(object))
    });
    table.push(("AddObject", add));

    let find_state = Rc::clone(state);
    let find: HostFn = Rc::new(move |args| {
        let mut args = Args::new("FindObject", args);
        let name = args.string()?;
        Ok(find_state
            .borrow()
            .find_object(&name)
            .map_or(ScriptValue::Nil, ScriptValue::Object))
    });
    table.push(("FindObject", find));

    let remove_state = Rc::clone(state);
    let remove: HostFn = Rc::new(move |args| {
        let mut args = Args::new("RemoveObject", args);
        let object = args.object()?;
        remove_state.borrow_mut().remove_object(&object);
        Ok(ScriptValue::Nil)
    });
    table.push(("RemoveObject", remove));

    table
}
