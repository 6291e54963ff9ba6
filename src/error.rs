//! Error types for the simulator
//!
//! Two families: [`ConfigError`] for fatal load-time failures (constants files,
//! script load, missing entry point) and [`ScriptError`] for failures inside the
//! embedded script runtime. Load-time errors abort simulation construction;
//! per-tick script errors are contained by the tick loop.

use std::error::Error;
use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::simulation::constants::PresetKind;

/// Fatal configuration errors raised while constructing a simulation.
#[derive(Debug)]
pub enum ConfigError {
    /// A constants or script file could not be read.
    Io {
        path: PathBuf,
        source: io::Error,
    },
    /// A line in a constants file was not a valid `key = value` pair.
    MalformedEntry {
        file: String,
        line: String,
    },
    /// `Get` was called with a preset name that is not registered.
    UnknownPreset {
        kind: PresetKind,
        name: String,
    },
    /// The user script does not define the named entry point as a function.
    MissingEntryPoint {
        name: String,
    },
    /// The script runtime failed while loading or initializing the user script.
    Script(ScriptError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "could not read {}: {source}", path.display())
            }
            Self::MalformedEntry { file, line } => {
                write!(f, "invalid data line '{line}' in file {file}")
            }
            Self::UnknownPreset { kind, name } => {
                write!(f, "unknown {kind} preset '{name}'")
            }
            Self::MissingEntryPoint { name } => {
                write!(f, "script does not define a '{name}' function")
            }
            Self::Script(err) => write!(f, "script load failed: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Script(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ScriptError> for ConfigError {
    fn from(err: ScriptError) -> Self {
        Self::Script(err)
    }
}

/// Errors raised by the embedded script runtime.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScriptError {
    /// A chunk failed to parse or execute at load time.
    Load(String),
    /// The script raised an error while one of its functions was executing.
    Runtime(String),
    /// A host function was called with arguments it cannot accept.
    BadArgument {
        function: String,
        reason: String,
    },
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load(msg) => write!(f, "load error: {msg}"),
            Self::Runtime(msg) => write!(f, "runtime error: {msg}"),
            Self::BadArgument { function, reason } => {
                write!(f, "bad argument to {function}: {reason}")
            }
        }
    }
}

impl Error for ScriptError {}
