//! Session identity derived from the auth provider's access tokens.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::config::AuthConfig;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,
    #[error("invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
    #[error("token subject is not a user id")]
    InvalidSubject,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    #[serde(default)]
    pub email: Option<String>,
}

/// The signed-in member for one request. Every write takes this by value
/// instead of looking the user up again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub user_id: Uuid,
}

impl Session {
    pub fn new(user_id: Uuid) -> Self {
        Self { user_id }
    }
}

#[derive(Clone)]
pub struct AuthVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl AuthVerifier {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        match &config.audience {
            Some(audience) => validation.set_audience(&[audience.as_str()]),
            None => validation.validate_aud = false,
        }
        Self {
            key: DecodingKey::from_secret(config.jwt_secret.expose_secret().as_bytes()),
            validation,
        }
    }

    pub fn verify(&self, token: &str) -> Result<Session, AuthError> {
        let data = decode::<Claims>(token, &self.key, &self.validation)?;
        let user_id = Uuid::parse_str(&data.claims.sub).map_err(|_| AuthError::InvalidSubject)?;
        Ok(Session::new(user_id))
    }

    /// Verify the value of an `Authorization` header.
    pub fn verify_bearer(&self, header: Option<&str>) -> Result<Session, AuthError> {
        let token = header
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingToken)?;
        self.verify(token)
    }
}

#[cfg(test)]
mod tests {
    use jsonwebtoken::{EncodingKey, Header, encode};
    use secrecy::SecretString;

    use super::*;

    const SECRET: &str = "test-secret";

    fn verifier(audience: Option<&str>) -> AuthVerifier {
        AuthVerifier::new(&AuthConfig {
            jwt_secret: SecretString::from(SECRET.to_string()),
            audience: audience.map(str::to_string),
        })
    }

    fn token(sub: &str, secret: &str, extra: serde_json::Value) -> String {
        let exp = (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp();
        let mut claims = serde_json::json!({ "sub": sub, "exp": exp });
        if let (Some(obj), Some(extra)) = (claims.as_object_mut(), extra.as_object()) {
            obj.extend(extra.clone());
        }
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn valid_token_yields_session() {
        let user_id = Uuid::new_v4();
        let t = token(&user_id.to_string(), SECRET, serde_json::json!({}));
        let session = verifier(None)
            .verify_bearer(Some(&format!("Bearer {t}")))
            .unwrap();
        assert_eq!(session.user_id, user_id);
    }

    #[test]
    fn missing_header_is_rejected() {
        assert!(matches!(
            verifier(None).verify_bearer(None),
            Err(AuthError::MissingToken)
        ));
        assert!(matches!(
            verifier(None).verify_bearer(Some("Basic abc")),
            Err(AuthError::MissingToken)
        ));
    }

    #[test]
    fn wrong_signature_is_rejected() {
        let t = token(&Uuid::new_v4().to_string(), "other", serde_json::json!({}));
        assert!(matches!(
            verifier(None).verify(&t),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn non_uuid_subject_is_rejected() {
        let t = token("service-role", SECRET, serde_json::json!({}));
        assert!(matches!(
            verifier(None).verify(&t),
            Err(AuthError::InvalidSubject)
        ));
    }

    #[test]
    fn audience_is_checked_when_configured() {
        let user_id = Uuid::new_v4().to_string();
        let good = token(&user_id, SECRET, serde_json::json!({ "aud": "authenticated" }));
        let bad = token(&user_id, SECRET, serde_json::json!({ "aud": "anon" }));
        let v = verifier(Some("authenticated"));
        assert!(v.verify(&good).is_ok());
        assert!(v.verify(&bad).is_err());
    }
}
