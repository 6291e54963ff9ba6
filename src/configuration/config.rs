//! Settings file for the simulator runtime
//!
//! A thin, `serde`-deserializable representation of the YAML settings file
//! consumed by the CLI binary:
//!
//! ```yaml
//! time_step: 0.0005   # integration step in years
//! paused: false
//! ```

use serde::Deserialize;

use crate::simulation::context::Settings;

/// YAML-facing settings.
#[derive(Deserialize, Debug)]
pub struct SettingsConfig {
    /// Integration step size in years.
    pub time_step: f64,
    /// Start paused. Defaults to running.
    pub paused: Option<bool>,
}

impl SettingsConfig {
    pub fn into_settings(self) -> Settings {
        Settings {
            paused: self.paused.unwrap_or(false),
            time_step: self.time_step,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn omitted_paused_defaults_to_running() {
        let cfg: SettingsConfig = serde_yaml::from_str("time_step: 0.001").unwrap();
        let settings = cfg.into_settings();
        assert!(!settings.paused);
        assert_eq!(settings.time_step, 0.001);
    }

    #[test]
    fn explicit_paused_is_kept() {
        let cfg: SettingsConfig = serde_yaml::from_str("time_step: 0.5\npaused: true").unwrap();
        assert!(cfg.into_settings().paused);
    }
}
