//! Engine configuration.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LutError;
use crate::transform::software::DEFAULT_PARALLEL_THRESHOLD;

/// Which cube backend the engine should prefer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendPreference {
    /// GPU when an adapter is present, software otherwise.
    #[default]
    Auto,
    /// Always the CPU path.
    Software,
    /// GPU, falling back to software if no adapter can be acquired.
    Gpu,
}

impl fmt::Display for BackendPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Software => write!(f, "software"),
            Self::Gpu => write!(f, "gpu"),
        }
    }
}

impl FromStr for BackendPreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "software" | "cpu" => Ok(Self::Software),
            "gpu" | "hardware" => Ok(Self::Gpu),
            other => Err(format!("unknown backend '{other}' (expected auto, software or gpu)")),
        }
    }
}

/// Runtime configuration for [`LutEngine`](crate::engine::LutEngine).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Preferred cube backend.
    pub backend: BackendPreference,
    /// Whether the software path may split work across rayon threads.
    pub parallel: bool,
    /// Minimum pixel count before the software path goes parallel.
    pub parallel_threshold: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            backend: BackendPreference::Auto,
            parallel: true,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by `HALDLUT_BACKEND` and `HALDLUT_PARALLEL`.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply environment overrides on top of `self`. Unparseable values are
    /// ignored with a warning.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(value) = std::env::var("HALDLUT_BACKEND") {
            match value.parse() {
                Ok(backend) => self.backend = backend,
                Err(e) => tracing::warn!("ignoring HALDLUT_BACKEND: {e}"),
            }
        }
        if let Ok(value) = std::env::var("HALDLUT_PARALLEL") {
            match value.as_str() {
                "0" | "false" | "off" => self.parallel = false,
                "1" | "true" | "on" => self.parallel = true,
                other => tracing::warn!("ignoring HALDLUT_PARALLEL={other}"),
            }
        }
        self
    }

    /// Parse a JSON config. Missing fields keep their defaults.
    pub fn from_json(text: &str) -> Result<Self, LutError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load a JSON config file.
    pub fn from_json_file(path: &Path) -> Result<Self, LutError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_preference_parses() {
        assert_eq!("GPU".parse(), Ok(BackendPreference::Gpu));
        assert_eq!("cpu".parse(), Ok(BackendPreference::Software));
        assert_eq!("auto".parse(), Ok(BackendPreference::Auto));
        assert!("metal".parse::<BackendPreference>().is_err());
    }

    #[test]
    fn test_json_partial_config_keeps_defaults() {
        let config = EngineConfig::from_json(r#"{ "backend": "software" }"#).unwrap();
        assert_eq!(config.backend, BackendPreference::Software);
        assert!(config.parallel);
        assert_eq!(config.parallel_threshold, DEFAULT_PARALLEL_THRESHOLD);
    }

    #[test]
    fn test_json_roundtrip() {
        let config = EngineConfig {
            backend: BackendPreference::Gpu,
            parallel: false,
            parallel_threshold: 12,
        };
        let text = serde_json::to_string(&config).unwrap();
        assert_eq!(EngineConfig::from_json(&text).unwrap(), config);
    }

    #[test]
    fn test_bad_json_is_config_error() {
        assert!(matches!(
            EngineConfig::from_json("{ backend: 3 }"),
            Err(LutError::Config(_))
        ));
    }

    #[test]
    fn test_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.json");
        std::fs::write(&path, r#"{ "parallel": false }"#).unwrap();
        let config = EngineConfig::from_json_file(&path).unwrap();
        assert!(!config.parallel);
        assert_eq!(config.backend, BackendPreference::Auto);
    }
}
