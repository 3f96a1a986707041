use super::{types::Config, ConfigError, StorageBackend};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - SQLite key is not empty
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.storage.backend == StorageBackend::Sqlite && config.storage.key.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "storage.key cannot be empty for the sqlite backend".to_string(),
        ));
    }

    Ok(())
}
