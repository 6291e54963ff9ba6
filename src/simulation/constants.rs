//! Named preset tables loaded from `key = value` text resources
//!
//! Three independent tables (mass, distance, time) hold the physical constants
//! scripts and setup code refer to by name. Lookups on an unknown key are a
//! fatal configuration error, never a default: preset names are compiled into
//! scripts, so a miss means the installation is broken.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::ConfigError;

/// Which physical quantity a preset table describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresetKind {
    Mass,
    Distance,
    Time,
}

impl PresetKind {
    /// File stem of the resource backing this table.
    fn file_stem(self) -> &'static str {
        match self {
            Self::Mass => "mass",
            Self::Distance => "distance",
            Self::Time => "time",
        }
    }

    /// Prefix used when publishing entries as script globals.
    pub fn global_prefix(self) -> &'static str {
        match self {
            Self::Mass => "Mass_",
            Self::Distance => "Distance_",
            Self::Time => "Time_",
        }
    }
}

impl fmt::Display for PresetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_stem())
    }
}

/// One named-value lookup table.
#[derive(Debug, Clone)]
pub struct PresetTable {
    kind: PresetKind,
    values: HashMap<String, f64>,
}

impl PresetTable {
    /// Build a table directly from pairs (used by tests and embedders).
    pub fn from_pairs<I, S>(kind: PresetKind, pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self {
            kind,
            values: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Parse a table from `key = value` text.
    ///
    /// Lines starting with `#` and blank lines are skipped; anything else must
    /// split into exactly one key and one `f64` value.
    pub fn parse(kind: PresetKind, source: &str) -> Result<Self, ConfigError> {
        let mut values = HashMap::new();

        for line in source.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let malformed = || ConfigError::MalformedEntry {
                file: kind.file_stem().to_string(),
                line: line.to_string(),
            };

            let (key, value) = line.split_once('=').ok_or_else(malformed)?;
            let value: f64 = value.trim().parse().map_err(|_| malformed())?;
            values.insert(key.trim().to_string(), value);
        }

        Ok(Self { kind, values })
    }

    /// Look up a preset by name. Fails on an unregistered key.
    pub fn get(&self, name: &str) -> Result<f64, ConfigError> {
        self.values
            .get(name)
            .copied()
            .ok_or_else(|| ConfigError::UnknownPreset {
                kind: self.kind,
                name: name.to_string(),
            })
    }

    pub fn kind(&self) -> PresetKind {
        self.kind
    }

    /// Iterate over all entries, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// The three preset tables consumed by simulation setup and scripts.
#[derive(Debug, Clone)]
pub struct ConstantsTable {
    pub mass: PresetTable,
    pub distance: PresetTable,
    pub time: PresetTable,
}

impl ConstantsTable {
    pub fn from_tables(mass: PresetTable, distance: PresetTable, time: PresetTable) -> Self {
        Self {
            mass,
            distance,
            time,
        }
    }

    /// Load `mass.txt`, `distance.txt` and `time.txt` from a directory.
    pub fn load_dir(dir: &Path) -> Result<Self, ConfigError> {
        let load = |kind: PresetKind| -> Result<PresetTable, ConfigError> {
            let path = dir.join(format!("{}.txt", kind.file_stem()));
            let text = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
                path: path.clone(),
                source,
            })?;
            PresetTable::parse(kind, &text)
        };

        Ok(Self {
            mass: load(PresetKind::Mass)?,
            distance: load(PresetKind::Distance)?,
            time: load(PresetKind::Time)?,
        })
    }

    /// The tables in publishing order.
    pub fn tables(&self) -> [&PresetTable; 3] {
        [&self.mass, &self.distance, &self.time]
    }
}
