use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - TMDB API key is not empty
/// - Image directory is set when image downloads are enabled
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.tmdb.api_key.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "tmdb.api_key cannot be empty".to_string(),
        ));
    }

    if config.images.enabled && config.images.dir.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "images.dir cannot be empty when images are enabled".to_string(),
        ));
    }

    Ok(())
}
