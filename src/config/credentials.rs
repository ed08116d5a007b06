//! Read-only view of the agent's OAuth credential file.
//!
//! The file is owned by the agent (`claude login` writes it into the
//! provider's account directory). Its presence is the "authenticated"
//! signal; only `claudeAiOauth.{accessToken,refreshToken,expiresAt}` is read.

use super::layout::Layout;
use chrono::Utc;
use serde::Deserialize;
use std::fs;

/// Tokens expiring within this window are treated as already expired.
pub const EXPIRY_MARGIN_MS: i64 = 5 * 60 * 1000;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthCredentials {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
    /// Epoch milliseconds
    #[serde(default)]
    pub expires_at: i64,
}

#[derive(Deserialize)]
struct CredentialsFile {
    #[serde(rename = "claudeAiOauth")]
    claude_ai_oauth: Option<OAuthCredentials>,
}

impl OAuthCredentials {
    pub fn is_valid_at(&self, now_ms: i64) -> bool {
        self.expires_at > now_ms.saturating_add(EXPIRY_MARGIN_MS)
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now().timestamp_millis())
    }
}

/// Whether `claude login` has left a credential file for this provider.
pub fn is_authenticated(layout: &Layout, provider_id: &str) -> bool {
    layout.credentials_file(provider_id).is_file()
}

/// Parse the credential file. Missing, unreadable or token-less files yield
/// `None`.
pub fn read_credentials(layout: &Layout, provider_id: &str) -> Option<OAuthCredentials> {
    let raw = fs::read_to_string(layout.credentials_file(provider_id)).ok()?;
    parse_credentials(&raw)
}

/// Credentials that are present and not about to expire.
pub fn valid_credentials(layout: &Layout, provider_id: &str) -> Option<OAuthCredentials> {
    read_credentials(layout, provider_id).filter(OAuthCredentials::is_valid)
}

fn parse_credentials(raw: &str) -> Option<OAuthCredentials> {
    let file: CredentialsFile = serde_json::from_str(raw).ok()?;
    file.claude_ai_oauth
        .filter(|creds| !creds.access_token.is_empty())
}
