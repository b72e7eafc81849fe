use async_trait::async_trait;
use jsonwebtoken::{decode, decode_header, Algorithm, Validation};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use super::jwks::JwksClient;
use super::model::{Principal, Role};
use super::resolver::IdentityResolver;
use crate::core::error::{AppError, Result};

/// Validates RS256 access tokens issued by the identity provider
pub struct JwtValidator {
    jwks_client: Arc<JwksClient>,
    issuer: String,
    audience: String,
    leeway: u64,
}

#[derive(Debug, Clone, Deserialize)]
struct Claims {
    sub: String,
    #[serde(rename = "iss")]
    _iss: String,
    #[serde(rename = "exp")]
    _exp: u64,
    #[serde(default)]
    roles: Vec<String>,
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

    pub async fn validate_token(&self, token: &str) -> Result<Principal> {
        let header = decode_header(token).map_err(|e| AppError::Unauthenticated(e.to_string()))?;

        if header.alg != Algorithm::RS256 {
            return Err(AppError::Unauthenticated(format!(
                "Unsupported algorithm: {:?}. Only RS256 is allowed",
                header.alg
            )));
        }

        let kid = header
            .kid
            .ok_or_else(|| AppError::Unauthenticated("Missing kid in token header".to_string()))?;

        let decoding_key = self
            .jwks_client
            .get_key(&kid)
            .await
            .map_err(|e| AppError::Unauthenticated(e.to_string()))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.leeway = self.leeway;
        validation.validate_nbf = true;

        let claims = decode::<Claims>(token, &decoding_key, &validation)
            .map_err(|e| AppError::Unauthenticated(e.to_string()))?
            .claims;

        Ok(principal_from_claims(claims))
    }
}

fn principal_from_claims(claims: Claims) -> Principal {
    let role = Role::from_claim_roles(&claims.roles);
    Principal::authenticated(role, claims.sub)
}

#[async_trait]
impl IdentityResolver for JwtValidator {
    async fn resolve(&self, credential: Option<&str>) -> Result<Principal> {
        match credential {
            None => Ok(Principal::guest()),
            Some(token) => self.validate_token(token).await,
        }
    }
}
