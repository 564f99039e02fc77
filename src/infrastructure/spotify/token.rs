//! Client-credentials access token

use std::fmt;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::domain::DomainError;

/// Application credentials for the client-credentials grant
#[derive(Clone)]
pub struct ClientCredentials {
    client_id: String,
    client_secret: String,
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

impl ClientCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// `Basic base64(id:secret)`
    pub fn basic_auth_header(&self) -> String {
        let raw = format!("{}:{}", self.client_id, self.client_secret);
        format!("Basic {}", STANDARD.encode(raw))
    }
}

/// Token endpoint response
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    pub expires_in: u64,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// Bearer token with an absolute expiry
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    access_token: String,
    token_type: String,
    expires_at: DateTime<Utc>,
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token_type", &self.token_type)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

impl AccessToken {
    pub fn new(access_token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: default_token_type(),
            expires_at,
        }
    }

    /// Placeholder held before the first renewal; never valid
    pub fn expired() -> Self {
        Self::new(String::new(), DateTime::<Utc>::default())
    }

    pub fn from_response(response: TokenResponse, issued_at: DateTime<Utc>) -> Result<Self, DomainError> {
        if response.access_token.is_empty() {
            return Err(DomainError::credential("Token endpoint returned an empty access token"));
        }

        let expires_at = i64::try_from(response.expires_in)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .and_then(|lifetime| issued_at.checked_add_signed(lifetime))
            .ok_or_else(|| {
                DomainError::credential(format!(
                    "Token endpoint returned an out of range expires_in: {}",
                    response.expires_in
                ))
            })?;

        Ok(Self {
            access_token: response.access_token,
            token_type: response.token_type,
            expires_at,
        })
    }

    pub fn secret(&self) -> &str {
        &self.access_token
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// True while the token stays valid for at least `margin` past now
    pub fn is_valid_for(&self, margin: Duration) -> bool {
        self.is_valid_at(Utc::now(), margin)
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>, margin: Duration) -> bool {
        chrono::Duration::from_std(margin)
            .ok()
            .and_then(|margin| now.checked_add_signed(margin))
            .is_some_and(|deadline| self.expires_at > deadline)
    }

    pub fn authorization_header(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARGIN: Duration = Duration::from_secs(300);

    #[test]
    fn test_basic_auth_header() {
        let credentials = ClientCredentials::new("id", "secret");
        // base64("id:secret")
        assert_eq!(credentials.basic_auth_header(), "Basic aWQ6c2VjcmV0");
    }

    #[test]
    fn test_credentials_debug_hides_secret() {
        let debug = format!("{:?}", ClientCredentials::new("id", "topsecret"));
        assert!(!debug.contains("topsecret"));
    }

    #[test]
    fn test_from_response_sets_absolute_expiry() {
        let issued_at = Utc::now();
        let response = TokenResponse {
            access_token: "abc".to_string(),
            token_type: "Bearer".to_string(),
            expires_in: 3600,
        };

        let token = AccessToken::from_response(response, issued_at).unwrap();
        assert_eq!(token.expires_at(), issued_at + chrono::Duration::seconds(3600));
        assert_eq!(token.authorization_header(), "Bearer abc");
    }

    #[test]
    fn test_empty_access_token_rejected() {
        let response = TokenResponse {
            access_token: String::new(),
            token_type: "Bearer".to_string(),
            expires_in: 3600,
        };

        let err = AccessToken::from_response(response, Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Credential { .. }));
    }

    #[test]
    fn test_validity_window() {
        let now = Utc::now();

        let fresh = AccessToken::new("a", now + chrono::Duration::minutes(60));
        assert!(fresh.is_valid_at(now, MARGIN));

        let near_expiry = AccessToken::new("a", now + chrono::Duration::minutes(4));
        assert!(!near_expiry.is_valid_at(now, MARGIN));

        // exactly at the margin counts as near expiry
        let boundary = AccessToken::new("a", now + chrono::Duration::minutes(5));
        assert!(!boundary.is_valid_at(now, MARGIN));
    }

    #[test]
    fn test_expired_placeholder_is_never_valid() {
        assert!(!AccessToken::expired().is_valid_for(Duration::ZERO));
    }

    #[test]
    fn test_token_type_defaults_to_bearer() {
        let response: TokenResponse =
            serde_json::from_value(serde_json::json!({"access_token": "x", "expires_in": 60}))
                .unwrap();
        assert_eq!(response.token_type, "Bearer");
    }
}
