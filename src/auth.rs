//! Bearer token verification and per-request authorization guards

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
};

/// Roles granted by the identity provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RealmAccess {
    #[serde(default)]
    pub roles: Vec<String>,
}

/// JWT claims as issued by the identity provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_username: Option<String>,
    #[serde(default)]
    pub realm_access: RealmAccess,
    pub exp: i64,
    #[serde(default)]
    pub iat: i64,
}

/// Verified identity of the caller
#[derive(Debug, Clone)]
pub struct Caller {
    pub subject: String,
    pub username: String,
    pub roles: Vec<String>,
    pub is_librarian: bool,
    /// Raw bearer token, relayed downstream as-is
    pub token: String,
}

impl Caller {
    pub fn require_librarian(&self) -> AppResult<()> {
        if self.is_librarian {
            Ok(())
        } else {
            Err(AppError::Authorization("Librarian role required".to_string()))
        }
    }

    /// Only the user named in the path may act
    pub fn require_self(&self, username: &str) -> AppResult<()> {
        if self.username == username {
            Ok(())
        } else {
            Err(AppError::Authorization(format!(
                "Only {} may perform this operation",
                username
            )))
        }
    }

    pub fn require_self_or_librarian(&self, username: &str) -> AppResult<()> {
        if self.is_librarian || self.username == username {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "Librarian role or ownership required".to_string(),
            ))
        }
    }
}

/// Validates bearer tokens against the configured key
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
    librarian_role: String,
}

impl TokenVerifier {
    pub fn new(config: &AuthConfig) -> AppResult<Self> {
        let (key, algorithm) = match config.jwt_public_key.as_deref() {
            Some(pem) => {
                let key = DecodingKey::from_rsa_pem(pem.as_bytes())
                    .map_err(|e| AppError::Internal(format!("Invalid JWT public key: {}", e)))?;
                (key, Algorithm::RS256)
            }
            None => (
                DecodingKey::from_secret(config.jwt_secret.as_bytes()),
                Algorithm::HS256,
            ),
        };

        let mut validation = Validation::new(algorithm);
        if let Some(ref issuer) = config.issuer {
            validation.set_issuer(&[issuer]);
        }
        match config.audience {
            Some(ref audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        Ok(Self {
            key,
            validation,
            librarian_role: config.librarian_role.clone(),
        })
    }

    pub fn verify(&self, token: &str) -> AppResult<Caller> {
        let claims = decode::<Claims>(token, &self.key, &self.validation)
            .map_err(|e| AppError::Authentication(e.to_string()))?
            .claims;

        let is_librarian = claims
            .realm_access
            .roles
            .iter()
            .any(|role| role == &self.librarian_role);

        tracing::debug!(sub = %claims.sub, roles = ?claims.realm_access.roles, "Verified bearer token");

        Ok(Caller {
            username: claims
                .preferred_username
                .clone()
                .unwrap_or_else(|| claims.sub.clone()),
            subject: claims.sub,
            roles: claims.realm_access.roles,
            is_librarian,
            token: token.to_string(),
        })
    }
}
