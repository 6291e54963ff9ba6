//! Narrow capability interface over the embedded script runtime
//!
//! The bridge talks to the interpreter exclusively through this trait, so the
//! concrete runtime (Lua in production) is swappable and mockable in tests.

use crate::error::ScriptError;
use crate::scripting::value::{HostFn, ScriptValue};

pub trait ScriptEngine {
    /// Parse and execute a chunk of script source.
    fn evaluate(&self, name: &str, source: &str) -> Result<(), ScriptError>;

    /// Export a native callable to the script under a fixed external name.
    fn register_function(&self, name: &str, func: HostFn) -> Result<(), ScriptError>;

    /// Overwrite a script global with a host value.
    fn set_global(&self, name: &str, value: ScriptValue) -> Result<(), ScriptError>;

    /// Read a script global back into the host.
    fn get_global(&self, name: &str) -> Result<ScriptValue, ScriptError>;

    /// Resolve and retain a lifecycle entry point. Fails if the named global
    /// is not a function.
    fn resolve_entry_point(&self, name: &str) -> Result<(), ScriptError>;

    /// Invoke a previously resolved entry point. Synchronous and blocking.
    fn call_entry_point(&self, name: &str) -> Result<(), ScriptError>;
}
