//! Bearer token issuance and validation
//!
//! Tokens are HS256 JWTs signed with a single shared secret. There is no
//! server-side session state: a token stays valid until `exp`, and rotating
//! the secret is the only way to invalidate outstanding tokens.

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use kinship_types::{UserId, UserProfile};
use serde::{Deserialize, Serialize};

use crate::{AuthConfig, AuthError};

/// Identity claims carried by a bearer token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: UserId,
    pub email: String,
    pub username: String,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiration (unix seconds)
    pub exp: i64,
}

impl Claims {
    /// Build claims for a user issued at the given instant
    pub fn new(user: &UserProfile, issued_at: DateTime<Utc>, ttl: chrono::Duration) -> Self {
        Self {
            user_id: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
        }
    }

    /// Check if the token is expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Signs and verifies bearer tokens
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: chrono::Duration,
}

impl TokenIssuer {
    /// Create a new token issuer from auth config
    pub fn new(config: &AuthConfig) -> Self {
        // Only the HMAC family is accepted; anything else in the header,
        // including "none", fails before signature checks.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        validation.leeway = 0;
        validation.validate_exp = true;

        Self {
            encoding_key: config.jwt_secret.encoding_key(),
            decoding_key: config.jwt_secret.decoding_key(),
            validation,
            ttl: config.token_ttl,
        }
    }

    /// Token lifetime
    pub fn ttl(&self) -> chrono::Duration {
        self.ttl
    }

    /// Issue a token for the user, valid from now
    pub fn issue(&self, user: &UserProfile) -> Result<String, AuthError> {
        self.issue_at(user, Utc::now())
    }

    /// Issue a token with an explicit issue time
    pub fn issue_at(&self, user: &UserProfile, issued_at: DateTime<Utc>) -> Result<String, AuthError> {
        let claims = Claims::new(user, issued_at, self.ttl);
        self.sign(&claims)
    }

    /// Sign arbitrary claims
    pub fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to sign token: {}", e);
            AuthError::Internal("failed to generate token".to_string())
        })
    }

    /// Validate a token and return its claims.
    ///
    /// Malformed, forged, wrong-algorithm and expired tokens all yield
    /// [`AuthError::InvalidOrExpiredToken`].
    pub fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                tracing::debug!("Token validation failed: {}", e);
                AuthError::InvalidOrExpiredToken
            })?;

        let claims = token_data.claims;

        // jsonwebtoken accepts exp == now; the lifetime is a half-open window
        if claims.is_expired() {
            tracing::debug!(user_id = %claims.user_id, "Token expired");
            return Err(AuthError::InvalidOrExpiredToken);
        }

        Ok(claims)
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl", &self.ttl)
            .field("algorithms", &self.validation.algorithms)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

    const SECRET: &str = "test-signing-secret-with-enough-bytes";

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(&AuthConfig::try_new(SECRET).unwrap())
    }

    fn user() -> UserProfile {
        UserProfile {
            id: UserId::new(),
            email: "a@x.com".to_string(),
            username: "alice".to_string(),
            first_name: None,
            last_name: None,
            bio: None,
            avatar_url: None,
            is_verified: false,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_issue_and_validate() {
        let issuer = issuer();
        let user = user();
        let token = issuer.issue(&user).unwrap();

        let claims = issuer.validate(&token).unwrap();
        assert_eq!(claims.user_id, user.id);
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.exp - claims.iat, 24 * 60 * 60);
    }

    #[test]
    fn test_expired_token_rejected() {
        let issuer = issuer();
        let issued_at = Utc::now() - chrono::Duration::hours(24) - chrono::Duration::seconds(1);
        let token = issuer.issue_at(&user(), issued_at).unwrap();
        assert!(matches!(
            issuer.validate(&token),
            Err(AuthError::InvalidOrExpiredToken)
        ));
    }

    #[test]
    fn test_token_just_inside_window_accepted() {
        let issuer = issuer();
        let issued_at = Utc::now() - chrono::Duration::hours(23);
        let token = issuer.issue_at(&user(), issued_at).unwrap();
        assert!(issuer.validate(&token).is_ok());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let other =
            TokenIssuer::new(&AuthConfig::try_new("another-secret-that-is-long-enough!").unwrap());
        let token = other.issue(&user()).unwrap();
        assert!(matches!(
            issuer().validate(&token),
            Err(AuthError::InvalidOrExpiredToken)
        ));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let issuer = issuer();
        let token = issuer.issue(&user()).unwrap();
        let parts: Vec<&str> = token.split('.').collect();

        let mut claims: serde_json::Value =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(parts[1]).unwrap()).unwrap();
        claims["username"] = serde_json::json!("mallory");
        let forged_payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).unwrap());

        let forged = format!("{}.{}.{}", parts[0], forged_payload, parts[2]);
        assert!(issuer.validate(&forged).is_err());
    }

    #[test]
    fn test_none_algorithm_rejected() {
        let issuer = issuer();
        let token = issuer.issue(&user()).unwrap();
        let payload = token.split('.').nth(1).unwrap();

        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let unsigned = format!("{header}.{payload}.");
        assert!(matches!(
            issuer.validate(&unsigned),
            Err(AuthError::InvalidOrExpiredToken)
        ));
    }

    #[test]
    fn test_non_hmac_algorithm_rejected() {
        let issuer = issuer();
        let token = issuer.issue(&user()).unwrap();
        let parts: Vec<&str> = token.split('.').collect();

        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#);
        let confused = format!("{header}.{}.{}", parts[1], parts[2]);
        assert!(issuer.validate(&confused).is_err());
    }

    #[test]
    fn test_other_hmac_variant_accepted() {
        let config = AuthConfig::try_new(SECRET).unwrap();
        let issuer = TokenIssuer::new(&config);
        let claims = Claims::new(&user(), Utc::now(), chrono::Duration::hours(1));
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &config.jwt_secret.encoding_key(),
        )
        .unwrap();
        assert_eq!(issuer.validate(&token).unwrap(), claims);
    }

    #[test]
    fn test_garbage_rejected() {
        let issuer = issuer();
        for input in ["", ".", "..", "a.b.c", "not a token"] {
            assert!(issuer.validate(input).is_err(), "accepted {input:?}");
        }
    }

    #[test]
    fn test_claims_wire_names() {
        let claims = Claims::new(&user(), Utc::now(), chrono::Duration::hours(24));
        let value = serde_json::to_value(&claims).unwrap();
        for key in ["user_id", "email", "username", "iat", "exp"] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
    }
}
