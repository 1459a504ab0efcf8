/*!
 * # Authentication
 *
 * Tokens are issued by the upstream auth service; this module only checks
 * them. A request is accepted when it carries a valid HS256 bearer token
 * whose subject is the user ID of an active admin.
 */

use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::errors::ServiceError;
use crate::models::{AdminStatus, UserStatus};
use crate::repositories::OrderStore;

/// Claims of an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // User ID
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_uuid: Option<String>,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("No authentication token provided")]
    MissingToken,
    #[error("Token has expired")]
    TokenExpired,
    #[error("Invalid authentication token")]
    InvalidToken,
    #[error("Token subject is not a user ID")]
    InvalidSubject,
}

impl From<AuthError> for ServiceError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingToken => ServiceError::Unauthorized(err.to_string()),
            _ => ServiceError::Forbidden(err.to_string()),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_issuer: String,
}

impl From<&AppConfig> for AuthConfig {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            jwt_secret: cfg.jwt_secret.clone(),
            jwt_issuer: cfg.auth_issuer.clone(),
        }
    }
}

/// The admin a request acts as. `name` is what mutations record as their
/// author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminIdentity {
    pub admin_id: i64,
    pub user_id: i64,
    pub name: String,
}

#[derive(Clone)]
pub struct AuthService {
    config: AuthConfig,
    store: Arc<dyn OrderStore>,
}

impl AuthService {
    pub fn new(config: AuthConfig, store: Arc<dyn OrderStore>) -> Self {
        Self { config, store }
    }

    /// Validate a JWT token and extract the claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.config.jwt_issuer.as_str()]);

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })
    }

    /// Resolves a bearer token to an admin allowed to act.
    pub async fn authenticate(&self, token: &str) -> Result<AdminIdentity, ServiceError> {
        let claims = self.validate_token(token)?;
        let user_id: i64 = claims.sub.parse().map_err(|_| AuthError::InvalidSubject)?;

        let account = self.store.find_admin_by_user_id(user_id).await?.ok_or_else(|| {
            ServiceError::NotFound(format!("no admin for user {}", user_id))
        })?;

        if account.admin.status != AdminStatus::Active || account.user.status != UserStatus::Activated
        {
            warn!(user_id, "inactive admin rejected");
            return Err(ServiceError::InactiveAdmin(
                "Admin/user sedang berstatus tidak aktif.".into(),
            ));
        }

        debug!(user_id, admin_id = account.admin.id, "admin authenticated");
        Ok(AdminIdentity {
            admin_id: account.admin.id,
            user_id,
            name: account.user.name,
        })
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Extractor for handlers that must run as an active admin.
#[derive(Debug, Clone)]
pub struct AuthenticatedAdmin(pub AdminIdentity);

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedAdmin
where
    S: Send + Sync,
    AuthService: FromRef<S>,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth = AuthService::from_ref(state);
        let token = bearer_token(parts).ok_or(AuthError::MissingToken)?;
        auth.authenticate(token).await.map(AuthenticatedAdmin)
    }
}
