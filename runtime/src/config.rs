//! Engine configuration, loaded from TOML with environment overrides.
//!
//! ```toml
//! [telemetry]
//! filter = "info,tessera_runtime=debug"
//! format = "json"
//!
//! [machine]
//! reset_on_bind_failure = true
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const ENV_LOG: &str = "TESSERA_LOG";
pub const ENV_LOG_FORMAT: &str = "TESSERA_LOG_FORMAT";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub telemetry: TelemetryConfig,
    pub machine: MachineConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// `EnvFilter` directives, used when `RUST_LOG` is unset.
    pub filter: String,
    pub format: LogFormat,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    /// Reset the machine when `bind_values` fails instead of keeping the
    /// partially bound path.
    pub reset_on_bind_failure: bool,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            reset_on_bind_failure: true,
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Apply `TESSERA_LOG` and `TESSERA_LOG_FORMAT` from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(filter) = lookup(ENV_LOG).filter(|f| !f.trim().is_empty()) {
            self.telemetry.filter = filter;
        }
        if let Some(raw) = lookup(ENV_LOG_FORMAT) {
            match raw.parse() {
                Ok(format) => self.telemetry.format = format,
                Err(reason) => tracing::warn!(%reason, "Ignoring {ENV_LOG_FORMAT}"),
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn empty_document_uses_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert!(config.machine.reset_on_bind_failure);
        assert_eq!(config.telemetry.format, LogFormat::Pretty);
    }

    #[test]
    fn file_sections_override_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[telemetry]\nformat = \"json\"\n\n[machine]\nreset_on_bind_failure = false"
        )
        .unwrap();

        let config = EngineConfig::from_file(file.path()).unwrap();

        assert_eq!(config.telemetry.format, LogFormat::Json);
        assert_eq!(config.telemetry.filter, "info");
        assert!(!config.machine.reset_on_bind_failure);
    }

    #[test]
    fn missing_file_and_bad_syntax_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let missing = EngineConfig::from_file(dir.path().join("tessera.toml")).unwrap_err();
        assert!(matches!(missing, ConfigError::Io { .. }));

        let bad = EngineConfig::from_toml_str("[telemetry]\nformat = \"xml\"").unwrap_err();
        assert!(matches!(bad, ConfigError::Parse(_)));
    }

    #[test]
    fn overrides_replace_filter_and_format() {
        let vars: HashMap<&str, &str> = [(ENV_LOG, "debug"), (ENV_LOG_FORMAT, "Compact")].into();
        let config = EngineConfig::default().with_overrides(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.telemetry.filter, "debug");
        assert_eq!(config.telemetry.format, LogFormat::Compact);

        let config = EngineConfig::default().with_overrides(|key| (key == ENV_LOG_FORMAT).then(|| "xml".to_string()));
        assert_eq!(config.telemetry.format, LogFormat::Pretty);
    }
}
