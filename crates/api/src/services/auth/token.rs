//! Signed bearer tokens (HS256 JWT).
//!
//! Customer and admin tokens share one claim set so the SPA can read
//! `isAdmin` without caring which login produced the token. `kind` is what
//! the server actually trusts when deciding which principal a token names.

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use bazaar_core::{AdminId, CustomerId};

use super::AuthError;
use crate::models::{AdminAccount, Customer};

/// Which login flow produced a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrincipalKind {
    Customer,
    Admin,
}

/// JWT payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub is_admin: bool,
    pub kind: PrincipalKind,
    pub iat: i64,
    pub exp: i64,
}

/// The authenticated caller of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    Customer {
        id: CustomerId,
        email: String,
        name: String,
    },
    Admin {
        id: AdminId,
        username: String,
    },
}

impl Principal {
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::Admin { .. })
    }

    /// The customer ID, for customer principals.
    #[must_use]
    pub const fn customer_id(&self) -> Option<CustomerId> {
        match self {
            Self::Customer { id, .. } => Some(*id),
            Self::Admin { .. } => None,
        }
    }
}

impl Claims {
    /// Turn decoded claims into a principal.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MalformedClaims` if the ID is invalid or a field the
    /// principal needs is absent.
    pub fn principal(&self) -> Result<Principal, AuthError> {
        match self.kind {
            PrincipalKind::Customer => Ok(Principal::Customer {
                id: CustomerId::try_new(self.user_id)
                    .ok_or(AuthError::MalformedClaims("user id"))?,
                email: self
                    .email
                    .clone()
                    .ok_or(AuthError::MalformedClaims("email"))?,
                name: self.name.clone().unwrap_or_default(),
            }),
            PrincipalKind::Admin => {
                if !self.is_admin {
                    return Err(AuthError::MalformedClaims("admin flag"));
                }
                Ok(Principal::Admin {
                    id: AdminId::try_new(self.user_id)
                        .ok_or(AuthError::MalformedClaims("user id"))?,
                    username: self
                        .username
                        .clone()
                        .ok_or(AuthError::MalformedClaims("username"))?,
                })
            }
        }
    }
}

/// Signing and verification keys plus the token lifetime.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for TokenKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenKeys")
            .field("keys", &"[REDACTED]")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenKeys {
    /// Derive HS256 keys from a shared secret.
    #[must_use]
    pub fn new(secret: &SecretString, ttl: Duration) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            ttl,
        }
    }

    /// Issue a token for a Google-authenticated customer.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenIssue` if signing fails.
    pub fn issue_customer(&self, customer: &Customer) -> Result<String, AuthError> {
        let (iat, exp) = self.window();
        self.sign(&Claims {
            user_id: customer.id.as_i32(),
            email: Some(customer.email.clone()),
            name: Some(customer.name.clone()),
            username: None,
            is_admin: false,
            kind: PrincipalKind::Customer,
            iat,
            exp,
        })
    }

    /// Issue a token for a back-office admin.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenIssue` if signing fails.
    pub fn issue_admin(&self, admin: &AdminAccount) -> Result<String, AuthError> {
        let (iat, exp) = self.window();
        self.sign(&Claims {
            user_id: admin.id.as_i32(),
            email: None,
            name: None,
            username: Some(admin.username.clone()),
            is_admin: true,
            kind: PrincipalKind::Admin,
            iat,
            exp,
        })
    }

    /// Verify a token's signature and expiry and return its claims.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if the token doesn't verify.
    pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "iat"]);
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(AuthError::InvalidToken)
    }

    fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(AuthError::TokenIssue)
    }

    fn window(&self) -> (i64, i64) {
        let now = Utc::now().timestamp();
        let ttl = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        (now, now.saturating_add(ttl))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn keys() -> TokenKeys {
        TokenKeys::new(
            &SecretString::from("kV8#qZ2!mP5$wX9@rT3&nL7*bH4^cF6%"),
            Duration::from_secs(7 * 24 * 60 * 60),
        )
    }

    fn customer() -> Customer {
        Customer {
            id: CustomerId::new(42),
            google_id: "google-sub-1".to_string(),
            email: "ada@example.com".to_string(),
            name: "Ada".to_string(),
            picture: None,
            is_admin: false,
            created_at: Utc::now(),
        }
    }

    fn admin() -> AdminAccount {
        AdminAccount {
            id: AdminId::new(3),
            username: "admin1".to_string(),
            password_hash: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_customer_token_round_trip() {
        let keys = keys();
        let token = keys.issue_customer(&customer()).unwrap();
        let claims = keys.decode(&token).unwrap();

        assert_eq!(claims.kind, PrincipalKind::Customer);
        assert!(!claims.is_admin);
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 60 * 60);
        assert_eq!(
            claims.principal().unwrap(),
            Principal::Customer {
                id: CustomerId::new(42),
                email: "ada@example.com".to_string(),
                name: "Ada".to_string(),
            }
        );
    }

    #[test]
    fn test_admin_token_round_trip() {
        let keys = keys();
        let token = keys.issue_admin(&admin()).unwrap();
        let principal = keys.decode(&token).unwrap().principal().unwrap();

        assert!(principal.is_admin());
        assert_eq!(principal.customer_id(), None);
    }

    #[test]
    fn test_claims_serialize_camel_case() {
        let keys = keys();
        let token = keys.issue_admin(&admin()).unwrap();
        let claims = keys.decode(&token).unwrap();
        let json = serde_json::to_value(&claims).unwrap();

        assert_eq!(json["userId"], 3);
        assert_eq!(json["isAdmin"], true);
        assert_eq!(json["kind"], "admin");
        assert!(json.get("email").is_none());
    }

    #[test]
    fn test_expired_token_rejected() {
        let keys = keys();
        let now = Utc::now().timestamp();
        let token = keys
            .sign(&Claims {
                user_id: 1,
                email: Some("ada@example.com".to_string()),
                name: None,
                username: None,
                is_admin: false,
                kind: PrincipalKind::Customer,
                iat: now - 7200,
                exp: now - 3600,
            })
            .unwrap();

        assert!(matches!(keys.decode(&token), Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn test_tampered_token_rejected() {
        let keys = keys();
        let token = keys.issue_customer(&customer()).unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        let forged = "eyJ1c2VySWQiOjEsImlzQWRtaW4iOnRydWUsImtpbmQiOiJhZG1pbiJ9";
        parts[1] = forged;

        assert!(keys.decode(&parts.join(".")).is_err());
    }

    #[test]
    fn test_other_secret_rejected() {
        let token = keys().issue_customer(&customer()).unwrap();
        let other = TokenKeys::new(
            &SecretString::from("Zp4!rQ8@vN2#xL6$wT9%kM3^hB7&jD5*"),
            Duration::from_secs(60),
        );

        assert!(other.decode(&token).is_err());
    }

    #[test]
    fn test_admin_kind_without_flag_is_malformed() {
        let claims = Claims {
            user_id: 1,
            email: None,
            name: None,
            username: Some("root".to_string()),
            is_admin: false,
            kind: PrincipalKind::Admin,
            iat: 0,
            exp: 0,
        };
        assert!(matches!(
            claims.principal(),
            Err(AuthError::MalformedClaims(_))
        ));
    }
}
