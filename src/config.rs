use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Tunables for the duty-cycle engine. `duty_levels` is the greyscale
/// depth K (load granularity); `control_period_ms` is one busy/sleep cycle
/// and should stay well under the display's ~1s utilization averaging;
/// `refresh_period_ms` paces the scroll/refresh loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub duty_levels: u32,
    pub control_period_ms: u64,
    pub refresh_period_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            duty_levels: 8,
            control_period_ms: 100,
            refresh_period_ms: 500,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse config {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.duty_levels == 0 {
            bail!("duty_levels must be at least 1");
        }
        if self.control_period_ms == 0 {
            bail!("control_period_ms must be at least 1");
        }
        if self.refresh_period_ms == 0 {
            bail!("refresh_period_ms must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_the_eight_level_variant() {
        let config = Config::default();
        assert_eq!(config.duty_levels, 8);
        assert_eq!(config.control_period_ms, 100);
        assert_eq!(config.refresh_period_ms, 500);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: Config = serde_json::from_str(r#"{"duty_levels": 4}"#).unwrap();
        assert_eq!(config.duty_levels, 4);
        assert_eq!(config.control_period_ms, 100);
    }

    #[test]
    fn zero_values_are_rejected() {
        let mut config = Config::default();
        config.duty_levels = 0;
        assert!(config.validate().is_err());
    }
}
