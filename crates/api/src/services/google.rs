//! Google ID token verification.
//!
//! The SPA obtains an ID token from Google Identity Services and posts it to
//! `/api/auth/google`. We hand the token to Google's `tokeninfo` endpoint,
//! which checks the signature, then validate the audience, issuer and expiry
//! ourselves against the configured OAuth client.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::db::customers::GoogleProfile;

const TOKENINFO_ENDPOINT: &str = "https://oauth2.googleapis.com/tokeninfo";
const VALID_ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];

/// Errors that can occur while verifying a Google ID token.
#[derive(Debug, thiserror::Error)]
pub enum GoogleError {
    /// HTTP request to Google failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Google rejected the token.
    #[error("token rejected by Google ({status})")]
    Rejected { status: u16 },

    /// The verification URL could not be built.
    #[error("invalid endpoint URL: {0}")]
    Endpoint(#[from] url::ParseError),

    /// The token is valid but not for us, or is missing required claims.
    #[error("invalid token: {0}")]
    InvalidToken(&'static str),
}

/// Claims returned by the `tokeninfo` endpoint. Numbers arrive as strings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenInfo {
    pub aud: Option<String>,
    pub iss: Option<String>,
    pub exp: Option<String>,
    pub sub: Option<String>,
    pub email: Option<String>,
    pub email_verified: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
}

/// Check `tokeninfo` claims against our client ID and the current time.
///
/// # Errors
///
/// Returns `GoogleError::InvalidToken` naming the first claim that fails.
pub fn validate_token_info(
    info: TokenInfo,
    client_id: &str,
    now: i64,
) -> Result<GoogleProfile, GoogleError> {
    if info.aud.as_deref() != Some(client_id) {
        return Err(GoogleError::InvalidToken("audience mismatch"));
    }

    if !info
        .iss
        .as_deref()
        .is_some_and(|iss| VALID_ISSUERS.contains(&iss))
    {
        return Err(GoogleError::InvalidToken("unexpected issuer"));
    }

    let exp = info
        .exp
        .as_deref()
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or(GoogleError::InvalidToken("missing expiry"))?;
    if exp <= now {
        return Err(GoogleError::InvalidToken("expired"));
    }

    let google_id = info
        .sub
        .filter(|s| !s.is_empty())
        .ok_or(GoogleError::InvalidToken("missing subject"))?;

    let email = info
        .email
        .filter(|s| !s.is_empty())
        .ok_or(GoogleError::InvalidToken("missing email"))?;

    if info.email_verified.as_deref() == Some("false") {
        return Err(GoogleError::InvalidToken("email not verified"));
    }

    // Accounts without a display name fall back to the email's local part.
    let name = info
        .name
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_owned());

    Ok(GoogleProfile {
        google_id,
        email,
        name,
        picture: info.picture.filter(|s| !s.is_empty()),
    })
}

/// Client for Google's token verification endpoint.
#[derive(Clone)]
pub struct GoogleClient {
    inner: Arc<GoogleClientInner>,
}

struct GoogleClientInner {
    client: reqwest::Client,
    client_id: String,
}

impl GoogleClient {
    /// Create a client that accepts tokens issued to `client_id`.
    ///
    /// # Errors
    ///
    /// Returns `GoogleError::Http` if the HTTP client cannot be built.
    pub fn new(client_id: &str) -> Result<Self, GoogleError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            inner: Arc::new(GoogleClientInner {
                client,
                client_id: client_id.to_owned(),
            }),
        })
    }

    /// Verify an ID token and return the profile it carries.
    ///
    /// # Errors
    ///
    /// Returns `GoogleError::Rejected` if Google doesn't accept the token,
    /// `GoogleError::InvalidToken` if its claims don't match this client, and
    /// `GoogleError::Http` on transport failures.
    #[tracing::instrument(skip_all)]
    pub async fn verify(&self, id_token: &str) -> Result<GoogleProfile, GoogleError> {
        let url = Url::parse_with_params(TOKENINFO_ENDPOINT, &[("id_token", id_token)])?;

        let response = self.inner.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(GoogleError::Rejected {
                status: response.status().as_u16(),
            });
        }

        let info: TokenInfo = response.json().await?;
        validate_token_info(info, &self.inner.client_id, chrono::Utc::now().timestamp())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const CLIENT_ID: &str = "test-client.apps.googleusercontent.com";
    const NOW: i64 = 1_700_000_000;

    fn info() -> TokenInfo {
        TokenInfo {
            aud: Some(CLIENT_ID.to_string()),
            iss: Some("https://accounts.google.com".to_string()),
            exp: Some((NOW + 600).to_string()),
            sub: Some("1098765".to_string()),
            email: Some("ada@example.com".to_string()),
            email_verified: Some("true".to_string()),
            name: Some("Ada Lovelace".to_string()),
            picture: Some("https://lh3.googleusercontent.com/a/pic".to_string()),
        }
    }

    #[test]
    fn test_valid_token() {
        let profile = validate_token_info(info(), CLIENT_ID, NOW).unwrap();
        assert_eq!(profile.google_id, "1098765");
        assert_eq!(profile.email, "ada@example.com");
        assert_eq!(profile.name, "Ada Lovelace");
        assert!(profile.picture.is_some());
    }

    #[test]
    fn test_bare_issuer_accepted() {
        let token = TokenInfo {
            iss: Some("accounts.google.com".to_string()),
            ..info()
        };
        assert!(validate_token_info(token, CLIENT_ID, NOW).is_ok());
    }

    #[test]
    fn test_wrong_audience() {
        let token = TokenInfo {
            aud: Some("someone-else.apps.googleusercontent.com".to_string()),
            ..info()
        };
        assert!(matches!(
            validate_token_info(token, CLIENT_ID, NOW),
            Err(GoogleError::InvalidToken("audience mismatch"))
        ));
    }

    #[test]
    fn test_wrong_issuer() {
        let token = TokenInfo {
            iss: Some("https://evil.example.com".to_string()),
            ..info()
        };
        assert!(validate_token_info(token, CLIENT_ID, NOW).is_err());
    }

    #[test]
    fn test_expired() {
        let token = TokenInfo {
            exp: Some((NOW - 1).to_string()),
            ..info()
        };
        assert!(matches!(
            validate_token_info(token, CLIENT_ID, NOW),
            Err(GoogleError::InvalidToken("expired"))
        ));
    }

    #[test]
    fn test_missing_email() {
        let token = TokenInfo {
            email: None,
            ..info()
        };
        assert!(matches!(
            validate_token_info(token, CLIENT_ID, NOW),
            Err(GoogleError::InvalidToken("missing email"))
        ));
    }

    #[test]
    fn test_unverified_email() {
        let token = TokenInfo {
            email_verified: Some("false".to_string()),
            ..info()
        };
        assert!(validate_token_info(token, CLIENT_ID, NOW).is_err());
    }

    #[test]
    fn test_name_falls_back_to_local_part() {
        let token = TokenInfo {
            name: None,
            ..info()
        };
        let profile = validate_token_info(token, CLIENT_ID, NOW).unwrap();
        assert_eq!(profile.name, "ada");
    }

    #[test]
    fn test_deserializes_tokeninfo_json() {
        let info: TokenInfo = serde_json::from_str(
            r#"{"aud":"x","iss":"accounts.google.com","exp":"1700000600","sub":"1",
                "email":"a@b.co","email_verified":"true","alg":"RS256","kid":"abc"}"#,
        )
        .unwrap();
        assert_eq!(info.exp.as_deref(), Some("1700000600"));
        assert!(info.name.is_none());
    }
}
