//! IGDB (Internet Game Database) API client.
//!
//! IGDB authenticates through Twitch: a client id/secret pair is exchanged
//! for a short-lived bearer token (client-credentials grant). Queries use
//! the Apicalypse language in a POST body.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::credential::{Credential, CredentialHolder};
use super::types::GameSearchResult;
use super::{ExternalCatalogError, GameCatalog};
use crate::metrics;

const DEFAULT_BASE_URL: &str = "https://api.igdb.com/v4";
const DEFAULT_TOKEN_URL: &str = "https://id.twitch.tv/oauth2/token";
const TOKEN_GRANT_TYPE: &str = "client_credentials";

/// IGDB client configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IgdbConfig {
    /// Twitch application client id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    /// Twitch application client secret.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    /// Base URL (default: https://api.igdb.com/v4).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Token endpoint (default: https://id.twitch.tv/oauth2/token).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_url: Option<String>,
}

impl IgdbConfig {
    /// Both client id and secret are set and non-empty.
    pub fn has_credentials(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());
        present(&self.client_id) && present(&self.client_secret)
    }
}

/// IGDB API client.
pub struct IgdbClient {
    client: Client,
    base_url: String,
    token_url: String,
    client_id: Option<String>,
    client_secret: Option<String>,
    credentials: Arc<CredentialHolder>,
}

impl IgdbClient {
    /// Create a new IGDB client sharing the given credential holder.
    ///
    /// Missing client id/secret is not an error here; it surfaces on the
    /// first request that needs a token.
    pub fn new(
        config: IgdbConfig,
        credentials: Arc<CredentialHolder>,
    ) -> Result<Self, ExternalCatalogError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            client,
            base_url: config
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            token_url: config
                .token_url
                .unwrap_or_else(|| DEFAULT_TOKEN_URL.to_string()),
            client_id: config.client_id.filter(|s| !s.is_empty()),
            client_secret: config.client_secret.filter(|s| !s.is_empty()),
            credentials,
        })
    }

    fn client_credentials(&self) -> Result<(&str, &str), ExternalCatalogError> {
        match (&self.client_id, &self.client_secret) {
            (Some(id), Some(secret)) => Ok((id.as_str(), secret.as_str())),
            _ => Err(ExternalCatalogError::MissingConfig(
                "IGDB client id and/or secret not provided".to_string(),
            )),
        }
    }

    /// Return a valid access token, exchanging client credentials for a new
    /// one only when none is held or the held one has expired.
    pub async fn ensure_credential(&self) -> Result<String, ExternalCatalogError> {
        let (client_id, client_secret) = self.client_credentials()?;

        if let Some(token) = self.credentials.valid_token(Utc::now()).await {
            debug!("IGDB access token still valid, reusing it");
            return Ok(token);
        }

        debug!("IGDB access token missing or expired, requesting a new one");

        let response = self
            .client
            .post(&self.token_url)
            .query(&[
                ("client_id", client_id),
                ("client_secret", client_secret),
                ("grant_type", TOKEN_GRANT_TYPE),
            ])
            .send()
            .await
            .map_err(|e| ExternalCatalogError::AuthFailed(format!("token request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("IGDB token request rejected: status={}", status);
            return Err(ExternalCatalogError::AuthFailed(format!(
                "token endpoint returned {}: {}",
                status.as_u16(),
                body
            )));
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            ExternalCatalogError::AuthFailed(format!("failed to parse token response: {}", e))
        })?;

        let credential =
            Credential::from_expires_in(token.access_token.clone(), token.expires_in, Utc::now());
        debug!("IGDB token refreshed, expires at {}", credential.expires_at);
        self.credentials.store(credential).await;

        Ok(token.access_token)
    }

    /// Search games by name.
    pub async fn search_games(
        &self,
        query: &str,
    ) -> Result<Vec<GameSearchResult>, ExternalCatalogError> {
        let token = self.ensure_credential().await?;
        let (client_id, _) = self.client_credentials()?;

        debug!("IGDB game search: query='{}'", query);

        let response = self
            .client
            .post(format!("{}/games", self.base_url))
            .header("Client-ID", client_id)
            .bearer_auth(token)
            .body(search_body(query))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ExternalCatalogError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            ExternalCatalogError::Decode(format!("Failed to parse game search response: {}", e))
        })
    }
}

#[async_trait]
impl GameCatalog for IgdbClient {
    async fn search(&self, query: &str) -> Result<Vec<GameSearchResult>, ExternalCatalogError> {
        let result = self.search_games(query).await;

        let label = match &result {
            Ok(_) => "ok",
            Err(e) => e.label(),
        };
        metrics::CATALOG_REQUESTS
            .with_label_values(&["igdb", label])
            .inc();

        result
    }
}

/// Apicalypse body for a game search. Double quotes would terminate the
/// search string, so they are dropped from the query.
fn search_body(query: &str) -> String {
    let cleaned: String = query.chars().filter(|c| *c != '"').collect();
    format!(
        "fields name, cover.image_id, version_title, summary, first_release_date; search \"{}\";",
        cleaned.trim()
    )
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(alias = "accessToken")]
    access_token: String,
    #[serde(alias = "expiresIn")]
    expires_in: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{StubRoute, StubServer};
    use chrono::Duration as ChronoDuration;

    fn config(client_id: Option<&str>, client_secret: Option<&str>) -> IgdbConfig {
        IgdbConfig {
            client_id: client_id.map(String::from),
            client_secret: client_secret.map(String::from),
            base_url: Some("http://127.0.0.1:9".to_string()),
            token_url: Some("http://127.0.0.1:9/token".to_string()),
        }
    }

    #[test]
    fn test_search_body() {
        assert_eq!(
            search_body("zelda"),
            "fields name, cover.image_id, version_title, summary, first_release_date; search \"zelda\";"
        );
    }

    #[test]
    fn test_search_body_strips_quotes() {
        let body = search_body("the \"witcher\"; fields *");
        assert!(body.ends_with("search \"the witcher; fields *\";"));
    }

    #[test]
    fn test_token_response_accepts_both_casings() {
        let snake: TokenResponse =
            serde_json::from_str(r#"{"access_token":"a","expires_in":100,"token_type":"bearer"}"#)
                .unwrap();
        let camel: TokenResponse =
            serde_json::from_str(r#"{"accessToken":"b","expiresIn":200}"#).unwrap();

        assert_eq!(snake.access_token, "a");
        assert_eq!(snake.expires_in, 100);
        assert_eq!(camel.access_token, "b");
        assert_eq!(camel.expires_in, 200);
    }

    #[tokio::test]
    async fn test_ensure_credential_missing_config() {
        let client = IgdbClient::new(config(Some("id"), None), Arc::new(CredentialHolder::new()))
            .unwrap();

        let result = client.ensure_credential().await;
        assert!(matches!(result, Err(ExternalCatalogError::MissingConfig(_))));
    }

    #[test]
    fn test_has_credentials() {
        assert!(config(Some("id"), Some("secret")).has_credentials());
        assert!(!config(Some("id"), None).has_credentials());
        assert!(!config(None, Some("secret")).has_credentials());
        assert!(!config(Some(""), Some("secret")).has_credentials());
        assert!(!config(Some("id"), Some("")).has_credentials());
    }

    #[tokio::test]
    async fn test_empty_client_id_counts_as_missing() {
        let client = IgdbClient::new(
            config(Some(""), Some("secret")),
            Arc::new(CredentialHolder::new()),
        )
        .unwrap();

        let result = client.search("zelda").await;
        assert!(matches!(result, Err(ExternalCatalogError::MissingConfig(_))));
    }

    #[tokio::test]
    async fn test_ensure_credential_reuses_valid_token() {
        // The token endpoint is unreachable, so success proves no exchange happened.
        let holder = Arc::new(CredentialHolder::with_credential(Credential {
            access_token: "cached".to_string(),
            expires_at: Utc::now() + ChronoDuration::hours(1),
        }));
        let client = IgdbClient::new(config(Some("id"), Some("secret")), holder).unwrap();

        let token = client.ensure_credential().await.unwrap();
        assert_eq!(token, "cached");
    }

    #[tokio::test]
    async fn test_ensure_credential_refreshes_expired_token() {
        let holder = Arc::new(CredentialHolder::with_credential(Credential {
            access_token: "stale".to_string(),
            expires_at: Utc::now() - ChronoDuration::seconds(1),
        }));
        let client =
            IgdbClient::new(config(Some("id"), Some("secret")), Arc::clone(&holder)).unwrap();

        // Refresh is attempted against the unreachable endpoint and fails.
        let result = client.ensure_credential().await;
        assert!(matches!(result, Err(ExternalCatalogError::AuthFailed(_))));
        assert_eq!(holder.current().await.unwrap().access_token, "stale");
    }

    fn stub_config(server: &StubServer) -> IgdbConfig {
        IgdbConfig {
            client_id: Some("id".to_string()),
            client_secret: Some("secret".to_string()),
            base_url: Some(server.url()),
            token_url: Some(format!("{}/oauth2/token", server.url())),
        }
    }

    const TOKEN_BODY: &str = r#"{"access_token":"fresh","expires_in":3600,"token_type":"bearer"}"#;
    const GAMES_BODY: &str = r#"[{"id":1942,"name":"The Witcher 3: Wild Hunt","cover":{"id":89386,"image_id":"coaarl"}}]"#;

    #[tokio::test]
    async fn test_token_exchanged_once_and_reused() {
        let server = StubServer::start(vec![
            StubRoute::post("/oauth2/token", 200, TOKEN_BODY),
            StubRoute::post("/games", 200, GAMES_BODY),
        ])
        .await
        .unwrap();
        let holder = Arc::new(CredentialHolder::new());
        let client = IgdbClient::new(stub_config(&server), Arc::clone(&holder)).unwrap();

        let first = client.search("witcher").await.unwrap();
        let second = client.search("witcher").await.unwrap();

        assert_eq!(first.len(), 1);
        assert_eq!(first[0].name, "The Witcher 3: Wild Hunt");
        assert_eq!(first, second);
        assert_eq!(server.hits("POST", "/oauth2/token").await, 1);
        assert_eq!(server.hits("POST", "/games").await, 2);
        assert_eq!(holder.current().await.unwrap().access_token, "fresh");

        let requests = server.requests().await;
        let token_request = requests
            .iter()
            .find(|r| r.path == "/oauth2/token")
            .unwrap();
        assert!(token_request.query.contains("grant_type=client_credentials"));
        let search_request = requests.iter().find(|r| r.path == "/games").unwrap();
        assert!(search_request.body.contains("search \"witcher\";"));
    }

    #[tokio::test]
    async fn test_rejected_token_request_is_auth_failed() {
        let server = StubServer::start(vec![StubRoute::post(
            "/oauth2/token",
            400,
            r#"{"status":400,"message":"invalid client secret"}"#,
        )])
        .await
        .unwrap();
        let holder = Arc::new(CredentialHolder::new());
        let client = IgdbClient::new(stub_config(&server), Arc::clone(&holder)).unwrap();

        let result = client.search("zelda").await;

        assert!(matches!(result, Err(ExternalCatalogError::AuthFailed(_))));
        assert!(holder.current().await.is_none());
        assert_eq!(server.hits("POST", "/games").await, 0);
    }

    #[tokio::test]
    async fn test_search_server_error_keeps_status_and_body() {
        let server = StubServer::start(vec![
            StubRoute::post("/oauth2/token", 200, TOKEN_BODY),
            StubRoute::post("/games", 503, "igdb down"),
        ])
        .await
        .unwrap();
        let client =
            IgdbClient::new(stub_config(&server), Arc::new(CredentialHolder::new())).unwrap();

        match client.search("zelda").await {
            Err(ExternalCatalogError::Upstream { status, body }) => {
                assert_eq!(status, 503);
                assert_eq!(body, "igdb down");
            }
            other => panic!("expected upstream error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_search_invalid_json_is_decode_error() {
        let server = StubServer::start(vec![
            StubRoute::post("/oauth2/token", 200, TOKEN_BODY),
            StubRoute::post("/games", 200, "not json"),
        ])
        .await
        .unwrap();
        let client =
            IgdbClient::new(stub_config(&server), Arc::new(CredentialHolder::new())).unwrap();

        let result = client.search("zelda").await;

        assert!(matches!(result, Err(ExternalCatalogError::Decode(_))));
    }
}
