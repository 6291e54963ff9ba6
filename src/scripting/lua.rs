//! Lua backend for the script engine interface
//!
//! Wraps one `mlua` state and converts between [`ScriptValue`] and Lua values.
//! Mass objects, vectors and colors cross the boundary as userdata; the fields
//! visible from Lua mirror the host accessors, so reads return normalized
//! values and writes take physical ones.

use std::cell::RefCell;
use std::collections::HashMap;

use mlua::{
    Function, Lua, MetaMethod, MultiValue, RegistryKey, UserData, UserDataFields, UserDataMethods,
    Value,
};

use crate::error::ScriptError;
use crate::scripting::engine::ScriptEngine;
use crate::scripting::value::{HostFn, ScriptValue};
use crate::simulation::object::{Color, MassObject, Vec3};

fn load_error(err: mlua::Error) -> ScriptError {
    ScriptError::Load(err.to_string())
}

fn runtime_error(err: mlua::Error) -> ScriptError {
    ScriptError::Runtime(err.to_string())
}

/// Lua-visible 3-vector.
#[derive(Debug, Clone, Copy)]
pub struct LuaVector(pub Vec3);

impl UserData for LuaVector {
    fn add_fields<F: UserDataFields<Self>>(fields: &mut F) {
        fields.add_field_method_get("X", |_, this| Ok(this.0.x));
        fields.add_field_method_get("Y", |_, this| Ok(this.0.y));
        fields.add_field_method_get("Z", |_, this| Ok(this.0.z));
        fields.add_field_method_set("X", |_, this, x: f64| {
            this.0.x = x;
            Ok(())
        });
        fields.add_field_method_set("Y", |_, this, y: f64| {
            this.0.y = y;
            Ok(())
        });
        fields.add_field_method_set("Z", |_, this, z: f64| {
            this.0.z = z;
            Ok(())
        });
    }

    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        methods.add_meta_method(MetaMethod::ToString, |_, this, ()| {
            Ok(format!("({}, {}, {})", this.0.x, this.0.y, this.0.z))
        });
    }
}

impl mlua::FromLua for LuaVector {
    fn from_lua(value: Value, _: &Lua) -> mlua::Result<Self> {
        match value {
            Value::UserData(ud) => Ok(*ud.borrow::<LuaVector>()?),
            other => Err(mlua::Error::FromLuaConversionError {
                from: other.type_name(),
                to: "Vector".to_string(),
                message: None,
            }),
        }
    }
}

/// Lua-visible RGBA color.
#[derive(Debug, Clone, Copy)]
pub struct LuaColor(pub Color);

impl UserData for LuaColor {
    fn add_fields<F: UserDataFields<Self>>(fields: &mut F) {
        fields.add_field_method_get("R", |_, this| Ok(this.0.r));
        fields.add_field_method_get("G", |_, this| Ok(this.0.g));
        fields.add_field_method_get("B", |_, this| Ok(this.0.b));
        fields.add_field_method_get("A", |_, this| Ok(this.0.a));
    }

    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        methods.add_meta_method(MetaMethod::ToString, |_, this, ()| {
            Ok(format!(
                "rgba({}, {}, {}, {})",
                this.0.r, this.0.g, this.0.b, this.0.a
            ))
        });
    }
}

impl mlua::FromLua for LuaColor {
    fn from_lua(value: Value, _: &Lua) -> mlua::Result<Self> {
        match value {
            Value::UserData(ud) => Ok(*ud.borrow::<LuaColor>()?),
            other => Err(mlua::Error::FromLuaConversionError {
                from: other.type_name(),
                to: "Color".to_string(),
                message: None,
            }),
        }
    }
}

impl UserData for MassObject {
    fn add_fields<F: UserDataFields<Self>>(fields: &mut F) {
        fields.add_field_method_get("Name", |_, this| Ok(this.name()));
        fields.add_field_method_get("Mass", |_, this| Ok(this.mass()));
        fields.add_field_method_get("EmissionStrength", |_, this| Ok(this.emission()));
        fields.add_field_method_set("EmissionStrength", |_, this, e: f32| {
            this.set_emission(e);
            Ok(())
        });
        fields.add_field_method_get("Color", |_, this| Ok(LuaColor(this.color())));
        fields.add_field_method_set("Color", |_, this, c: LuaColor| {
            this.set_color(c.0);
            Ok(())
        });
        fields.add_field_method_get("Location", |_, this| Ok(LuaVector(this.location())));
        fields.add_field_method_set("Location", |_, this, v: LuaVector| {
            this.set_location(v.0);
            Ok(())
        });
        fields.add_field_method_get("Velocity", |_, this| Ok(LuaVector(this.velocity())));
        fields.add_field_method_set("Velocity", |_, this, v: LuaVector| {
            this.set_velocity(v.0);
            Ok(())
        });
        fields.add_field_method_get("Acceleration", |_, this| Ok(LuaVector(this.acceleration())));
        fields.add_field_method_set("Acceleration", |_, this, v: LuaVector| {
            this.set_acceleration(v.0);
            Ok(())
        });
    }

    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        methods.add_meta_method(MetaMethod::ToString, |_, this, ()| Ok(this.to_string()));
        methods.add_meta_method(MetaMethod::Eq, |_, this, other: MassObject| {
            Ok(this.same_object(&other))
        });
    }
}

impl mlua::FromLua for MassObject {
    fn from_lua(value: Value, _: &Lua) -> mlua::Result<Self> {
        match value {
            Value::UserData(ud) => Ok((*ud.borrow::<MassObject>()?).clone()),
            other => Err(mlua::Error::FromLuaConversionError {
                from: other.type_name(),
                to: "MassObject".to_string(),
                message: None,
            }),
        }
    }
}

fn to_lua(lua: &Lua, value: ScriptValue) -> mlua::Result<Value> {
    Ok(match value {
        ScriptValue::Nil => Value::Nil,
        ScriptValue::Bool(b) => Value::Boolean(b),
        ScriptValue::Number(n) => Value::Number(n),
        ScriptValue::Str(s) => Value::String(lua.create_string(&s)?),
        ScriptValue::Vector(v) => Value::UserData(lua.create_userdata(LuaVector(v))?),
        ScriptValue::Color(c) => Value::UserData(lua.create_userdata(LuaColor(c))?),
        ScriptValue::Object(obj) => Value::UserData(lua.create_userdata(obj)?),
        ScriptValue::List(items) => {
            let table = lua.create_table()?;
            for (i, item) in items.into_iter().enumerate() {
                table.raw_set(i + 1, to_lua(lua, item)?)?;
            }
            Value::Table(table)
        }
    })
}

fn from_lua(value: &Value) -> mlua::Result<ScriptValue> {
    Ok(match value {
        Value::Nil => ScriptValue::Nil,
        Value::Boolean(b) => ScriptValue::Bool(*b),
        Value::Integer(i) => ScriptValue::Number(*i as f64),
        Value::Number(n) => ScriptValue::Number(*n),
        Value::String(s) => ScriptValue::Str(s.to_string_lossy().to_string()),
        Value::UserData(ud) => {
            if let Ok(obj) = ud.borrow::<MassObject>() {
                ScriptValue::Object((*obj).clone())
            } else if let Ok(v) = ud.borrow::<LuaVector>() {
                ScriptValue::Vector(v.0)
            } else if let Ok(c) = ud.borrow::<LuaColor>() {
                ScriptValue::Color(c.0)
            } else {
                return Err(mlua::Error::RuntimeError(
                    "unsupported userdata at the host boundary".to_string(),
                ));
            }
        }
        other => {
            return Err(mlua::Error::RuntimeError(format!(
                "unsupported {} value at the host boundary",
                other.type_name()
            )))
        }
    })
}

/// One exclusive Lua state implementing [`ScriptEngine`].
pub struct LuaEngine {
    lua: Lua,
    entry_points: RefCell<HashMap<String, RegistryKey>>,
}

impl LuaEngine {
    pub fn new() -> Self {
        Self {
            lua: Lua::new(),
            entry_points: RefCell::new(HashMap::new()),
        }
    }
}

impl Default for LuaEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptEngine for LuaEngine {
    fn evaluate(&self, name: &str, source: &str) -> Result<(), ScriptError> {
        self.lua
            .load(source)
            .set_name(name)
            .exec()
            .map_err(load_error)
    }

    fn register_function(&self, name: &str, func: HostFn) -> Result<(), ScriptError> {
        let wrapped = self
            .lua
            .create_function(move |lua, args: MultiValue| {
                let mut values = Vec::with_capacity(args.len());
                for value in args.iter() {
                    values.push(from_lua(value)?);
                }
                let result =
                    func(&values).map_err(|err| mlua::Error::RuntimeError(err.to_string()))?;
                to_lua(lua, result)
            })
            .map_err(load_error)?;

        self.lua.globals().set(name, wrapped).map_err(load_error)
    }

    fn set_global(&self, name: &str, value: ScriptValue) -> Result<(), ScriptError> {
        let value = to_lua(&self.lua, value).map_err(runtime_error)?;
        self.lua.globals().set(name, value).map_err(runtime_error)
    }

    fn get_global(&self, name: &str) -> Result<ScriptValue, ScriptError> {
        let value: Value = self.lua.globals().get(name).map_err(runtime_error)?;
        from_lua(&value).map_err(runtime_error)
    }

    fn resolve_entry_point(&self, name: &str) -> Result<(), ScriptError> {
        let value: Value = self.lua.globals().get(name).map_err(load_error)?;
        match value {
            Value::Function(func) => {
                let key = self.lua.create_registry_value(func).map_err(load_error)?;
                self.entry_points.borrow_mut().insert(name.to_string(), key);
                Ok(())
            }
            _ => Err(ScriptError::Load(format!(
                "global '{name}' is not a function"
            ))),
        }
    }

    fn call_entry_point(&self, name: &str) -> Result<(), ScriptError> {
        let func: Function = {
            let entry_points = self.entry_points.borrow();
            let key = entry_points.get(name).ok_or_else(|| {
                ScriptError::Runtime(format!("entry point '{name}' was never resolved"))
            })?;
            self.lua.registry_value(key).map_err(runtime_error)?
        };
        func.call::<()>(()).map_err(runtime_error)
    }
}
