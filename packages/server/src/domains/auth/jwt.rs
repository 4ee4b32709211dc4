use anyhow::Result;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::session::SESSION_TTL_HOURS;

/// Claims of a session token issued by this service.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,          // Subject (member_id as string)
    pub member_id: Uuid,      // Member UUID
    pub display_name: String, // For logging/debugging
    pub exp: i64,             // Expiration timestamp
    pub iat: i64,             // Issued at timestamp
    pub iss: String,          // Issuer
    pub jti: String,          // Session id
}

/// Claims of an identity token minted by the identity provider after the member
/// signed in there.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct IdentityClaims {
    pub sub: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
    pub exp: i64,
    pub iss: String,
}

/// JWT Service - verifies identity tokens, creates and verifies session tokens
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    identity_key: DecodingKey,
    identity_issuer: String,
}

impl JwtService {
    pub fn new(
        secret: &str,
        issuer: String,
        identity_secret: &str,
        identity_issuer: String,
    ) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            identity_key: DecodingKey::from_secret(identity_secret.as_bytes()),
            identity_issuer,
        }
    }

    /// Create a session token for a member. Expires with the session.
    pub fn create_token(
        &self,
        member_id: Uuid,
        display_name: String,
        session_id: Uuid,
    ) -> Result<String> {
        let now = chrono::Utc::now();
        let exp = now + chrono::Duration::hours(SESSION_TTL_HOURS);

        let claims = Claims {
            sub: member_id.to_string(),
            member_id,
            display_name,
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: self.issuer.clone(),
            jti: session_id.to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(Into::into)
    }

    /// Verify and decode a session token.
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.issuer]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(Into::into)
    }

    /// Verify an identity-provider token.
    pub fn verify_identity_token(&self, token: &str) -> Result<IdentityClaims> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.identity_issuer]);

        decode::<IdentityClaims>(token, &self.identity_key, &validation)
            .map(|data| data.claims)
            .map_err(Into::into)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn test_service() -> JwtService {
        JwtService::new(
            "test_secret_key",
            "test_issuer".to_string(),
            "identity_secret",
            "https://identity.test".to_string(),
        )
    }

    /// Mint an identity token the way the identity provider would.
    pub(crate) fn identity_token(sub: &str, name: Option<&str>, secret: &str, iss: &str) -> String {
        let claims = IdentityClaims {
            sub: sub.to_string(),
            name: name.map(String::from),
            email: Some(format!("{}@example.org", sub)),
            picture: None,
            exp: (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp(),
            iss: iss.to_string(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_create_and_verify_token() {
        let service = test_service();
        let member_id = Uuid::new_v4();
        let session_id = Uuid::new_v4();

        let token = service
            .create_token(member_id, "Asha".to_string(), session_id)
            .unwrap();

        let claims = service.verify_token(&token).unwrap();
        assert_eq!(claims.member_id, member_id);
        assert_eq!(claims.display_name, "Asha");
        assert_eq!(claims.jti, session_id.to_string());
        assert_eq!(claims.iss, "test_issuer");
    }

    #[test]
    fn test_invalid_token() {
        assert!(test_service().verify_token("invalid_token").is_err());
    }

    #[test]
    fn test_wrong_secret() {
        let other = JwtService::new(
            "another_secret",
            "test_issuer".to_string(),
            "identity_secret",
            "https://identity.test".to_string(),
        );
        let token = other
            .create_token(Uuid::new_v4(), "Asha".to_string(), Uuid::new_v4())
            .unwrap();
        assert!(test_service().verify_token(&token).is_err());
    }

    #[test]
    fn test_token_expires_in_a_day() {
        let service = test_service();
        let token = service
            .create_token(Uuid::new_v4(), "Asha".to_string(), Uuid::new_v4())
            .unwrap();
        let claims = service.verify_token(&token).unwrap();

        let expires_in = claims.exp - chrono::Utc::now().timestamp();
        assert!(expires_in > 23 * 3600);
        assert!(expires_in <= 24 * 3600);
    }

    #[test]
    fn test_verify_identity_token() {
        let service = test_service();
        let token = identity_token(
            "google-oauth2|42",
            Some("Asha Rao"),
            "identity_secret",
            "https://identity.test",
        );
        let claims = service.verify_identity_token(&token).unwrap();
        assert_eq!(claims.sub, "google-oauth2|42");
        assert_eq!(claims.name.as_deref(), Some("Asha Rao"));
    }

    #[test]
    fn test_identity_token_from_other_issuer_rejected() {
        let service = test_service();
        let token = identity_token("u1", None, "identity_secret", "https://evil.test");
        assert!(service.verify_identity_token(&token).is_err());
    }

    #[test]
    fn test_session_token_is_not_an_identity_token() {
        let service = test_service();
        let token = service
            .create_token(Uuid::new_v4(), "Asha".to_string(), Uuid::new_v4())
            .unwrap();
        assert!(service.verify_identity_token(&token).is_err());
    }
}
