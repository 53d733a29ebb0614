//! Config validation
//!
//! Rules:
//! - buffer capacity > 0
//! - read limits > 0 and default_limit <= max_limit
//! - server bind address parses as a socket address
//! - file backend has a path
//! - log format is known

use std::net::SocketAddr;

use contracts::{ContractError, HubConfig, StoreBackend};

const LOG_FORMATS: [&str; 3] = ["json", "pretty", "compact"];

/// Validate a HubConfig
///
/// Returns the first error encountered.
pub fn validate(config: &HubConfig) -> Result<(), ContractError> {
    validate_server(config)?;
    validate_buffer(config)?;
    validate_read(config)?;
    validate_store(config)?;
    validate_observability(config)?;
    Ok(())
}

fn validate_server(config: &HubConfig) -> Result<(), ContractError> {
    if config.server.bind.parse::<SocketAddr>().is_err() {
        return Err(ContractError::config_validation(
            "server.bind",
            format!("'{}' is not a socket address", config.server.bind),
        ));
    }
    if config.server.max_body_bytes == 0 {
        return Err(ContractError::config_validation(
            "server.max_body_bytes",
            "max_body_bytes must be > 0",
        ));
    }
    Ok(())
}

fn validate_buffer(config: &HubConfig) -> Result<(), ContractError> {
    if config.buffer.capacity == 0 {
        return Err(ContractError::config_validation(
            "buffer.capacity",
            "capacity must be > 0",
        ));
    }
    Ok(())
}

fn validate_read(config: &HubConfig) -> Result<(), ContractError> {
    let read = &config.read;
    if read.default_limit == 0 {
        return Err(ContractError::config_validation(
            "read.default_limit",
            "default_limit must be > 0",
        ));
    }
    if read.max_limit == 0 {
        return Err(ContractError::config_validation(
            "read.max_limit",
            "max_limit must be > 0",
        ));
    }
    if read.default_limit > read.max_limit {
        return Err(ContractError::config_validation(
            "read.default_limit / read.max_limit",
            format!(
                "default_limit ({}) must be <= max_limit ({})",
                read.default_limit, read.max_limit
            ),
        ));
    }
    Ok(())
}

fn validate_store(config: &HubConfig) -> Result<(), ContractError> {
    if config.store.backend == StoreBackend::File && config.store.path.is_none() {
        return Err(ContractError::config_validation(
            "store.path",
            "file backend requires a path",
        ));
    }
    Ok(())
}

fn validate_observability(config: &HubConfig) -> Result<(), ContractError> {
    let format = config.observability.log_format.to_lowercase();
    if !LOG_FORMATS.contains(&format.as_str()) {
        return Err(ContractError::config_validation(
            "observability.log_format",
            format!(
                "unknown log format '{}', expected one of {:?}",
                config.observability.log_format, LOG_FORMATS
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&HubConfig::default()).is_ok());
    }

    #[test]
    fn test_zero_capacity() {
        let mut config = HubConfig::default();
        config.buffer.capacity = 0;
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("buffer.capacity"));
    }

    #[test]
    fn test_default_limit_above_max() {
        let mut config = HubConfig::default();
        config.read.default_limit = 2000;
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("must be <="));
    }

    #[test]
    fn test_bad_bind_address() {
        let mut config = HubConfig::default();
        config.server.bind = "localhost".into();
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("server.bind"));
    }

    #[test]
    fn test_file_backend_needs_path() {
        let mut config = HubConfig::default();
        config.store.backend = StoreBackend::File;
        assert!(validate(&config).is_err());

        config.store.path = Some("/tmp/hub".into());
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_unknown_log_format() {
        let mut config = HubConfig::default();
        config.observability.log_format = "xml".into();
        let err = validate(&config).unwrap_err();
        assert!(matches!(err, ContractError::ConfigValidation { .. }));
    }
}
