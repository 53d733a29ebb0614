//! # Config Loader
//!
//! Reads a `HubConfig` from TOML or JSON and checks it before anything starts.
//! A missing file is not an error when the caller asks for defaults.
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let config = ConfigLoader::load_from_path(Path::new("sensor-hub.toml"))?;
//! println!("Bind: {}", config.server.bind);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod parser;
mod validator;

pub use contracts::HubConfig;
pub use parser::ConfigFormat;

use contracts::ContractError;
use std::path::Path;
use tracing::debug;

/// Stateless entry points for config handling
pub struct ConfigLoader;

impl ConfigLoader {
    /// Parse and validate the file at `path`.
    ///
    /// The format comes from the extension (`.toml` / `.json`).
    ///
    /// # Errors
    /// Unreadable file, unknown extension, decode failure, or a value out of range.
    pub fn load_from_path(path: &Path) -> Result<HubConfig, ContractError> {
        let format = format_of(path)?;
        let content = std::fs::read_to_string(path)?;
        debug!(path = %path.display(), ?format, "Loading config");
        Self::load_from_str(&content, format)
    }

    /// `load_from_path` when a path is given, validated defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<HubConfig, ContractError> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => {
                let config = HubConfig::default();
                validator::validate(&config)?;
                Ok(config)
            }
        }
    }

    /// Parse and validate an in-memory document
    pub fn load_from_str(content: &str, format: ConfigFormat) -> Result<HubConfig, ContractError> {
        let config = parser::parse(content, format)?;
        validator::validate(&config)?;
        Ok(config)
    }

    /// Re-check a config after overrides were applied
    pub fn validate(config: &HubConfig) -> Result<(), ContractError> {
        validator::validate(config)
    }

    pub fn to_toml(config: &HubConfig) -> Result<String, ContractError> {
        toml::to_string_pretty(config)
            .map_err(|e| ContractError::config_parse(format!("TOML serialize error: {e}")))
    }

    pub fn to_json(config: &HubConfig) -> Result<String, ContractError> {
        serde_json::to_string_pretty(config)
            .map_err(|e| ContractError::config_parse(format!("JSON serialize error: {e}")))
    }
}

fn format_of(path: &Path) -> Result<ConfigFormat, ContractError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .ok_or_else(|| ContractError::config_parse(format!("{} has no extension", path.display())))?;

    ConfigFormat::from_extension(ext)
        .ok_or_else(|| ContractError::config_parse(format!("unsupported config format: .{ext}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::StoreBackend;

    const SAMPLE_TOML: &str = r#"
[server]
bind = "127.0.0.1:3000"
max_body_bytes = 1048576

[buffer]
capacity = 500

[read]
default_limit = 50
max_limit = 200

[store]
backend = "file"
path = "data"

[observability]
log_format = "json"
log_level = "debug"
metrics_port = 9000
"#;

    #[test]
    fn test_load_from_str_toml() {
        let config = ConfigLoader::load_from_str(SAMPLE_TOML, ConfigFormat::Toml).unwrap();
        assert_eq!(config.buffer.capacity, 500);
        assert_eq!(config.store.backend, StoreBackend::File);
        assert_eq!(config.observability.metrics_port, Some(9000));
    }

    #[test]
    fn test_round_trip_toml() {
        let config = ConfigLoader::load_from_str(SAMPLE_TOML, ConfigFormat::Toml).unwrap();
        let serialized = ConfigLoader::to_toml(&config).unwrap();
        let again = ConfigLoader::load_from_str(&serialized, ConfigFormat::Toml).unwrap();
        assert_eq!(config, again);
    }

    #[test]
    fn test_round_trip_json() {
        let config = ConfigLoader::load_from_str(SAMPLE_TOML, ConfigFormat::Toml).unwrap();
        let json = ConfigLoader::to_json(&config).unwrap();
        let again = ConfigLoader::load_from_str(&json, ConfigFormat::Json).unwrap();
        assert_eq!(config, again);
    }

    #[test]
    fn test_validation_runs_after_parse() {
        let content = "[read]\ndefault_limit = 10\nmax_limit = 5\n";
        let result = ConfigLoader::load_from_str(content, ConfigFormat::Toml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("max_limit"));
    }

    #[test]
    fn test_load_or_default_without_path() {
        let config = ConfigLoader::load_or_default(None).unwrap();
        assert_eq!(config, HubConfig::default());
    }

    #[test]
    fn test_load_from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hub.toml");
        std::fs::write(&path, SAMPLE_TOML).unwrap();
        let config = ConfigLoader::load_or_default(Some(&path)).unwrap();
        assert_eq!(config.read.max_limit, 200);
    }

    #[test]
    fn test_load_from_path_rejects_unknown_extension() {
        let result = ConfigLoader::load_from_path(Path::new("hub.yaml"));
        assert!(matches!(result, Err(ContractError::ConfigParse { .. })));
    }
}
