//! JWT access token creation and verification.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{config::Config, errors::Error, types::UserId};

/// JWT claims carried by every issued token
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: UserId,   // Subject (user ID)
    pub email: String, // User email
    pub iat: i64,      // Issued at
    pub exp: i64,      // Expiration time
}

/// Stateless HS256 token codec.
///
/// Holds the derived signing keys and the configured token lifetime. Validation
/// uses zero leeway: a token whose `exp` has passed is rejected immediately.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenCodec {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Build a codec from application configuration.
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let secret = config.secret_key.as_deref().ok_or_else(|| Error::Internal {
            operation: "token codec: secret_key is required".to_string(),
        })?;

        Ok(Self::new(secret, config.auth.token_ttl))
    }

    /// Issue a signed token for a user.
    pub fn issue(&self, user_id: UserId, email: &str) -> Result<String, Error> {
        let iat = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id,
            email: email.to_string(),
            iat,
            exp: iat + self.ttl.as_secs() as i64,
        };

        encode(&Header::default(), &claims, &self.encoding).map_err(|e| Error::Internal {
            operation: format!("create JWT: {e}"),
        })
    }

    /// Verify and decode a token.
    pub fn verify(&self, token: &str) -> Result<Claims, Error> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let token_data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| match e.kind() {
            // Client errors (401) - malformed tokens, invalid claims, expired tokens
            jsonwebtoken::errors::ErrorKind::InvalidToken
            | jsonwebtoken::errors::ErrorKind::InvalidSignature
            | jsonwebtoken::errors::ErrorKind::ExpiredSignature
            | jsonwebtoken::errors::ErrorKind::MissingRequiredClaim(_)
            | jsonwebtoken::errors::ErrorKind::InvalidIssuer
            | jsonwebtoken::errors::ErrorKind::InvalidAudience
            | jsonwebtoken::errors::ErrorKind::InvalidSubject
            | jsonwebtoken::errors::ErrorKind::ImmatureSignature
            | jsonwebtoken::errors::ErrorKind::Base64(_)
            | jsonwebtoken::errors::ErrorKind::Json(_)
            | jsonwebtoken::errors::ErrorKind::Utf8(_)
            | jsonwebtoken::errors::ErrorKind::InvalidAlgorithm => Error::InvalidToken,

            // Server errors (500) - key issues, internal failures
            jsonwebtoken::errors::ErrorKind::InvalidEcdsaKey
            | jsonwebtoken::errors::ErrorKind::InvalidRsaKey(_)
            | jsonwebtoken::errors::ErrorKind::RsaFailedSigning
            | jsonwebtoken::errors::ErrorKind::InvalidAlgorithmName
            | jsonwebtoken::errors::ErrorKind::InvalidKeyFormat
            | jsonwebtoken::errors::ErrorKind::MissingAlgorithm
            | jsonwebtoken::errors::ErrorKind::Crypto(_) => Error::Internal {
                operation: format!("JWT verification: {e}"),
            },

            // Catch-all for any future error variants (default to rejection)
            _ => Error::InvalidToken,
        })?;

        Ok(token_data.claims)
    }

    /// Verify a token and project out the user id.
    pub fn extract_user_id(&self, token: &str) -> Result<UserId, Error> {
        Ok(self.verify(token)?.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_codec() -> TokenCodec {
        TokenCodec::new("0123456789abcdef0123456789abcdef", Duration::from_secs(3600))
    }

    #[test]
    fn test_issue_and_verify_round_trip() {
        let codec = test_codec();

        let token = codec.issue(42, "test@example.com").unwrap();
        assert!(!token.is_empty());

        let claims = codec.verify(&token).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.email, "test@example.com");
        assert_eq!(claims.exp, claims.iat + 3600);

        assert_eq!(codec.extract_user_id(&token).unwrap(), 42);
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let codec = test_codec();
        let token = codec.issue(7, "victim@example.com").unwrap();

        // Flip one character in the payload segment
        let mut chars: Vec<char> = token.chars().collect();
        let mid = token.len() / 2;
        chars[mid] = if chars[mid] == 'a' { 'b' } else { 'a' };
        let tampered: String = chars.into_iter().collect();

        let result = codec.verify(&tampered);
        assert!(matches!(result.unwrap_err(), Error::InvalidToken));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let codec = test_codec();
        let other = TokenCodec::new("another-secret-that-is-long-enough!!", Duration::from_secs(3600));

        let token = codec.issue(7, "user@example.com").unwrap();
        let result = other.verify(&token);
        assert!(matches!(result.unwrap_err(), Error::InvalidToken));
    }

    #[test]
    fn test_expired_token_is_rejected_with_zero_leeway() {
        let codec = test_codec();

        // Manually craft a token whose exp is in the past
        let now = Utc::now();
        let claims = Claims {
            sub: 7,
            email: "late@example.com".to_string(),
            iat: (now - chrono::Duration::seconds(120)).timestamp(),
            exp: (now - chrono::Duration::seconds(30)).timestamp(),
        };
        let key = EncodingKey::from_secret("0123456789abcdef0123456789abcdef".as_bytes());
        let token = encode(&Header::default(), &claims, &key).unwrap();

        let result = codec.verify(&token);
        assert!(matches!(result.unwrap_err(), Error::InvalidToken));
    }

    #[test]
    fn test_malformed_tokens_are_rejected() {
        let codec = test_codec();

        for token in ["not.a.token", "invalid", "", "too.many.parts.in.this.token"] {
            let result = codec.verify(token);
            assert!(
                matches!(result.unwrap_err(), Error::InvalidToken),
                "Expected InvalidToken for token: {token}"
            );
        }
    }
}
