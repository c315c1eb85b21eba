use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use crate::external_catalog::{IgdbConfig, TmdbConfig};

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub images: ImagesConfig,
    pub tmdb: TmdbConfig,
    #[serde(default)]
    pub igdb: IgdbConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("reelog.db")
}

/// Poster download configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ImagesConfig {
    /// Download posters of newly cached titles (default: true)
    #[serde(default = "default_images_enabled")]
    pub enabled: bool,
    /// Directory posters are saved under (default: data/img)
    #[serde(default = "default_images_dir")]
    pub dir: PathBuf,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            enabled: default_images_enabled(),
            dir: default_images_dir(),
        }
    }
}

fn default_images_enabled() -> bool {
    true
}

fn default_images_dir() -> PathBuf {
    PathBuf::from("data/img")
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub images: ImagesConfig,
    pub tmdb: SanitizedTmdbConfig,
    pub igdb: SanitizedIgdbConfig,
}

/// Sanitized TMDB config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedTmdbConfig {
    pub api_key_configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    pub image_base_url: String,
}

/// Sanitized IGDB config (client credentials hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedIgdbConfig {
    pub client_id_configured: bool,
    pub client_secret_configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_url: Option<String>,
}

fn is_set(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.is_empty())
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            database: config.database.clone(),
            images: config.images.clone(),
            tmdb: SanitizedTmdbConfig {
                api_key_configured: !config.tmdb.api_key.is_empty(),
                base_url: config.tmdb.base_url.clone(),
                image_base_url: config.tmdb.image_base_url().to_string(),
            },
            igdb: SanitizedIgdbConfig {
                client_id_configured: is_set(&config.igdb.client_id),
                client_secret_configured: is_set(&config.igdb.client_secret),
                base_url: config.igdb.base_url.clone(),
                token_url: config.igdb.token_url.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal_config() {
        let toml = r#"
[tmdb]
api_key = "secret"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host.to_string(), "0.0.0.0");
        assert_eq!(config.database.path.to_str().unwrap(), "reelog.db");
        assert!(config.images.enabled);
        assert_eq!(config.images.dir.to_str().unwrap(), "data/img");
        assert!(config.igdb.client_id.is_none());
    }

    #[test]
    fn test_deserialize_full_config() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 9000

[database]
path = "/data/reelog.sqlite"

[images]
enabled = false
dir = "/srv/posters"

[tmdb]
api_key = "secret"
base_url = "http://tmdb.local/3"
image_base_url = "http://img.local/t/p"

[igdb]
client_id = "id"
client_secret = "shh"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.database.path.to_str().unwrap(), "/data/reelog.sqlite");
        assert!(!config.images.enabled);
        assert_eq!(config.tmdb.image_base_url(), "http://img.local/t/p");
        assert_eq!(config.igdb.client_secret.as_deref(), Some("shh"));
    }

    #[test]
    fn test_sanitized_config_hides_secrets() {
        let toml = r#"
[tmdb]
api_key = "tmdb-secret"

[igdb]
client_id = "id"
client_secret = ""
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let sanitized = SanitizedConfig::from(&config);

        assert!(sanitized.tmdb.api_key_configured);
        assert_eq!(sanitized.tmdb.image_base_url, "https://image.tmdb.org/t/p");
        assert!(sanitized.igdb.client_id_configured);
        assert!(!sanitized.igdb.client_secret_configured);

        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("tmdb-secret"));
    }
}
