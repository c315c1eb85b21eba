//! Bearer credential cache for catalogs that use client-credentials auth.

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

/// An access token and the instant it stops being usable.
#[derive(Debug, Clone, PartialEq)]
pub struct Credential {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

impl Credential {
    /// Build a credential from a token response received at `now`.
    pub fn from_expires_in(
        access_token: impl Into<String>,
        expires_in_secs: i64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at: now + Duration::seconds(expires_in_secs),
        }
    }

    /// A credential is valid strictly before its expiry instant.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Owned holder for the current credential of one catalog client.
///
/// The lock only guards the stored value. Refreshing is done outside of it,
/// so two callers that both see an expired token will both refresh; the
/// holder keeps whichever result expires last.
#[derive(Debug, Default)]
pub struct CredentialHolder {
    current: RwLock<Option<Credential>>,
}

impl CredentialHolder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an already-known credential.
    pub fn with_credential(credential: Credential) -> Self {
        Self {
            current: RwLock::new(Some(credential)),
        }
    }

    /// The held token, if one exists and is still valid at `now`.
    pub async fn valid_token(&self, now: DateTime<Utc>) -> Option<String> {
        self.current
            .read()
            .await
            .as_ref()
            .filter(|c| c.is_valid_at(now))
            .map(|c| c.access_token.clone())
    }

    /// Store a freshly obtained credential unless a longer-lived one is
    /// already held. Returns whether the new credential was kept.
    pub async fn store(&self, credential: Credential) -> bool {
        let mut current = self.current.write().await;
        match current.as_ref() {
            Some(held) if held.expires_at >= credential.expires_at => false,
            _ => {
                *current = Some(credential);
                true
            }
        }
    }

    /// Snapshot of the held credential, valid or not.
    pub async fn current(&self) -> Option<Credential> {
        self.current.read().await.clone()
    }
}
