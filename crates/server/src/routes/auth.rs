use std::collections::{HashMap, HashSet};

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::errors::JsonApiError;
use crate::state::ServerState;

/// Roles allowed to read the catalog
pub const CATALOG_READ_ROLES: &[&str] = &["admin", "viewer"];

/// Authenticated caller, inserted into request extensions by the guard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub subject: String,
    pub roles: HashSet<String>,
}

impl Principal {
    pub fn has_any_role(&self, allowed: &[&str]) -> bool {
        allowed.iter().any(|r| self.roles.contains(*r))
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,
    #[error("invalid token: {0}")]
    InvalidToken(String),
    #[error("token signing failed: {0}")]
    Signing(String),
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    #[serde(default)]
    roles: Vec<String>,
    exp: usize,
}

/// Resolves bearer tokens to principals: static table first, then HS256 JWT.
pub struct TokenVerifier {
    static_tokens: HashMap<String, Principal>,
    jwt_secret: Option<String>,
}

impl TokenVerifier {
    pub fn new(static_tokens: HashMap<String, Principal>, jwt_secret: Option<String>) -> Self {
        let jwt_secret = jwt_secret.filter(|s| !s.trim().is_empty());
        Self { static_tokens, jwt_secret }
    }

    pub fn from_config(cfg: &configs::AuthConfig) -> Self {
        let static_tokens = cfg
            .static_tokens
            .iter()
            .map(|(token, entry)| {
                let principal = Principal {
                    subject: entry.subject.clone(),
                    roles: entry.roles.iter().cloned().collect(),
                };
                (token.clone(), principal)
            })
            .collect();
        Self::new(static_tokens, Some(cfg.jwt_secret.clone()))
    }

    pub fn verify(&self, token: &str) -> Result<Principal, AuthError> {
        if let Some(p) = self.static_tokens.get(token) {
            return Ok(p.clone());
        }
        let Some(secret) = &self.jwt_secret else {
            return Err(AuthError::InvalidToken("unknown token".into()));
        };

        let key = DecodingKey::from_secret(secret.as_bytes());
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        let data = decode::<Claims>(token, &key, &validation).map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        Ok(Principal { subject: data.claims.sub, roles: data.claims.roles.into_iter().collect() })
    }

    /// Sign a JWT accepted by `verify`; used by operators and tests to mint tokens.
    pub fn issue(&self, subject: &str, roles: &[&str], ttl: Duration) -> Result<String, AuthError> {
        let Some(secret) = &self.jwt_secret else {
            return Err(AuthError::Signing("jwt secret not configured".into()));
        };
        let exp = (Utc::now() + ttl).timestamp().max(0) as usize;
        let claims = Claims { sub: subject.to_string(), roles: roles.iter().map(|r| r.to_string()).collect(), exp };
        encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(secret.as_bytes()))
            .map_err(|e| AuthError::Signing(e.to_string()))
    }
}

fn bearer_token(req: &Request) -> Result<&str, AuthError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingToken)?;
    let (scheme, token) = header.split_once(' ').ok_or(AuthError::MissingToken)?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(AuthError::MissingToken);
    }
    Ok(token)
}

/// 目录读取接口的角色守卫：缺失/格式错误 401，令牌无效 401，角色不符 403
pub async fn require_catalog_reader(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, JsonApiError> {
    let path = req.uri().path().to_string();
    let token = match bearer_token(&req) {
        Ok(t) => t,
        Err(_) => {
            warn!(%path, "missing or malformed Authorization header (expect Bearer)");
            return Err(JsonApiError::unauthorized("Unauthorized"));
        }
    };

    let principal = match state.verifier.verify(token) {
        Ok(p) => p,
        Err(e) => {
            warn!(%path, err = %e, "token validation failed");
            return Err(JsonApiError::unauthorized("Invalid token"));
        }
    };

    if !principal.has_any_role(CATALOG_READ_ROLES) {
        warn!(%path, subject = %principal.subject, "caller lacks a catalog role");
        return Err(JsonApiError::forbidden());
    }

    debug!(%path, subject = %principal.subject, "caller authorized");
    req.extensions_mut().insert(principal);
    Ok(next.run(req).await)
}
