use super::model::{resolve_roles, AppMetadata, AuthenticatedUser};
use crate::core::error::AppError;
use jsonwebtoken::{decode, decode_header, Algorithm, Validation};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use super::jwks::JwksClient;

pub struct JwtValidator {
    jwks_client: Arc<JwksClient>,
    issuer: String,
    audience: String,
    leeway: u64,
}

#[derive(Debug, Clone, Deserialize)]
struct Claims {
    // Standard JWT claims (validated by jsonwebtoken library)
    sub: String,
    #[serde(rename = "iss")]
    _iss: String,
    #[serde(rename = "aud")]
    _aud: AudienceClaim,
    #[serde(rename = "exp")]
    _exp: u64,

    // Provider claims
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    app_metadata: Option<AppMetadata>,
}

/// Audience can be either a single string or an array of strings
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
#[allow(dead_code)]
enum AudienceClaim {
    Single(String),
    Multiple(Vec<String>),
}

impl Claims {
    fn into_user(self) -> AuthenticatedUser {
        let roles = resolve_roles(self.app_metadata.as_ref(), self.role.as_deref());

        AuthenticatedUser {
            sub: self.sub,
            email: self.email.filter(|e| !e.is_empty()),
            phone: self.phone.filter(|p| !p.is_empty()),
            roles,
        }
    }
}

impl JwtValidator {
    pub fn new(
        jwks_client: Arc<JwksClient>,
        issuer: String,
        audience: String,
        leeway: Duration,
    ) -> Self {
        Self {
            jwks_client,
            issuer,
            audience,
            leeway: leeway.as_secs(),
        }
    }

    pub async fn validate_token(&self, token: &str) -> Result<AuthenticatedUser, AppError> {
        let header = decode_header(token).map_err(|e| AppError::Auth(e.to_string()))?;

        if header.alg != Algorithm::RS256 {
            return Err(AppError::Auth(format!(
                "Unsupported algorithm: {:?}. Only RS256 is allowed",
                header.alg
            )));
        }

        let kid = header
            .kid
            .ok_or_else(|| AppError::Auth("Missing kid in token header".to_string()))?;

        let decoding_key = self
            .jwks_client
            .get_key(&kid)
            .await
            .map_err(|e| AppError::Auth(e.to_string()))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.leeway = self.leeway;
        validation.validate_nbf = true;

        let token_data = decode::<Claims>(token, &decoding_key, &validation)
            .map_err(|e| AppError::Auth(e.to_string()))?;

        Ok(token_data.claims.into_user())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_into_user_reads_app_metadata_roles() {
        let claims: Claims = serde_json::from_value(serde_json::json!({
            "sub": "5b1f",
            "iss": "https://auth.example.test",
            "aud": "authenticated",
            "exp": 1_900_000_000u64,
            "email": "agent@example.test",
            "phone": "",
            "role": "authenticated",
            "app_metadata": { "provider": "email", "roles": ["agent"] }
        }))
        .unwrap();

        let user = claims.into_user();
        assert_eq!(user.sub, "5b1f");
        assert_eq!(user.roles, vec!["agent"]);
        assert_eq!(user.email.as_deref(), Some("agent@example.test"));
        assert!(user.phone.is_none());
    }

    #[test]
    fn test_claims_accept_audience_list() {
        let claims: Claims = serde_json::from_value(serde_json::json!({
            "sub": "5b1f",
            "iss": "https://auth.example.test",
            "aud": ["authenticated", "servicehub"],
            "exp": 1_900_000_000u64,
            "role": "admin"
        }))
        .unwrap();

        assert_eq!(claims.into_user().roles, vec!["admin"]);
    }

    #[tokio::test]
    async fn test_garbage_token_is_auth_error() {
        let validator = JwtValidator::new(
            Arc::new(JwksClient::new(
                "http://127.0.0.1:9/jwks",
                Duration::from_secs(60),
            )),
            "https://auth.example.test".to_string(),
            "authenticated".to_string(),
            Duration::from_secs(0),
        );

        let result = validator.validate_token("not-a-jwt").await;
        assert!(matches!(result, Err(AppError::Auth(_))));
    }
}
