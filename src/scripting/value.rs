//! Engine-neutral values exchanged between host and script
//!
//! Host functions operate on [`ScriptValue`] so the concrete script runtime
//! stays swappable; the Lua backend converts these to and from its own types.

use std::fmt;
use std::rc::Rc;

use crate::error::ScriptError;
use crate::simulation::object::{Color, MassObject, Vec3};

/// A value crossing the host/script boundary.
#[derive(Debug, Clone)]
pub enum ScriptValue {
    Nil,
    Bool(bool),
    Number(f64),
    Str(String),
    Vector(Vec3),
    Color(Color),
    Object(MassObject),
    List(Vec<ScriptValue>),
}

/// A native callable exported to the script under a fixed external name.
pub type HostFn = Rc<dyn Fn(&[ScriptValue]) -> Result<ScriptValue, ScriptError>>;

impl ScriptValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::Str(_) => "string",
            Self::Vector(_) => "vector",
            Self::Color(_) => "color",
            Self::Object(_) => "object",
            Self::List(_) => "list",
        }
    }
}

impl fmt::Display for ScriptValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => f.write_str("nil"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Str(s) => f.write_str(s),
            Self::Vector(v) => write!(f, "({}, {}, {})", v.x, v.y, v.z),
            Self::Color(c) => write!(f, "rgba({}, {}, {}, {})", c.r, c.g, c.b, c.a),
            Self::Object(obj) => write!(f, "{obj}"),
            Self::List(items) => write!(f, "[{} items]", items.len()),
        }
    }
}

fn bad_argument(function: &str, expected: &str, got: Option<&ScriptValue>) -> ScriptError {
    let got = got.map_or("nothing", ScriptValue::type_name);
    ScriptError::BadArgument {
        function: function.to_string(),
        reason: format!("expected {expected}, got {got}"),
    }
}

/// Positional argument reader for host functions.
pub struct Args<'a> {
    function: &'a str,
    values: &'a [ScriptValue],
    index: usize,
}

impl<'a> Args<'a> {
    pub fn new(function: &'a str, values: &'a [ScriptValue]) -> Self {
        Self {
            function,
            values,
            index: 0,
        }
    }

    fn next(&mut self) -> Option<&'a ScriptValue> {
        let value = self.values.get(self.index);
        self.index += 1;
        value
    }

    pub fn number(&mut self) -> Result<f64, ScriptError> {
        match self.next() {
            Some(ScriptValue::Number(n)) => Ok(*n),
            other => Err(bad_argument(self.function, "number", other)),
        }
    }

    pub fn string(&mut self) -> Result<String, ScriptError> {
        match self.next() {
            Some(ScriptValue::Str(s)) => Ok(s.clone()),
            other => Err(bad_argument(self.function, "string", other)),
        }
    }

    pub fn object(&mut self) -> Result<MassObject, ScriptError> {
        match self.next() {
            Some(ScriptValue::Object(obj)) => Ok(obj.clone()),
            other => Err(bad_argument(self.function, "object", other)),
        }
    }

    /// Optional string: absent or nil yields `None`.
    pub fn opt_string(&mut self) -> Result<Option<String>, ScriptError> {
        match self.next() {
            None | Some(ScriptValue::Nil) => Ok(None),
            Some(ScriptValue::Str(s)) => Ok(Some(s.clone())),
            other => Err(bad_argument(self.function, "string or nil", other)),
        }
    }

    /// Optional object: absent or nil yields `None`.
    pub fn opt_object(&mut self) -> Result<Option<MassObject>, ScriptError> {
        match self.next() {
            None | Some(ScriptValue::Nil) => Ok(None),
            Some(ScriptValue::Object(obj)) => Ok(Some(obj.clone())),
            other => Err(bad_argument(self.function, "object or nil", other)),
        }
    }

    /// Optional vector: absent or nil yields `None`.
    pub fn opt_vector(&mut self) -> Result<Option<Vec3>, ScriptError> {
        match self.next() {
            None | Some(ScriptValue::Nil) => Ok(None),
            Some(ScriptValue::Vector(v)) => Ok(Some(*v)),
            other => Err(bad_argument(self.function, "vector or nil", other)),
        }
    }

    /// Optional color: absent or nil yields `None`.
    pub fn opt_color(&mut self) -> Result<Option<Color>, ScriptError> {
        match self.next() {
            None | Some(ScriptValue::Nil) => Ok(None),
            Some(ScriptValue::Color(c)) => Ok(Some(*c)),
            other => Err(bad_argument(self.function, "color or nil", other)),
        }
    }

    /// Remaining argument, formatted for the debug/error message functions.
    pub fn message(&mut self) -> String {
        self.next()
            .map(ScriptValue::to_string)
            .unwrap_or_else(|| "nil".to_string())
    }
}
