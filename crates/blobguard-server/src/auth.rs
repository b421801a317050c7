use std::collections::HashMap;

use async_trait::async_trait;
use axum::http::{header, HeaderMap};
use blobguard_types::Principal;

use crate::error::ServerResult;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Credentials {
    Bearer(String),
    Anonymous,
}

impl Credentials {
    /// Read an `Authorization: Bearer <token>` header. Anything else is anonymous.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| Self::Bearer(t.to_string()))
            .unwrap_or(Self::Anonymous)
    }
}

/// Turns request credentials into the principal the guard evaluates.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn authenticate(&self, credentials: &Credentials) -> ServerResult<Principal>;
}

/// Treats every request as anonymous.
pub struct AnonymousAuth;

#[async_trait]
impl AuthProvider for AnonymousAuth {
    async fn authenticate(&self, _credentials: &Credentials) -> ServerResult<Principal> {
        Ok(Principal::anonymous())
    }
}

/// Maps configured bearer tokens to user names.
///
/// Unknown tokens fall back to anonymous rather than failing: what the
/// request may read is decided by the guard, not here.
pub struct StaticTokenAuth {
    tokens: HashMap<String, String>,
}

impl StaticTokenAuth {
    pub fn new(tokens: HashMap<String, String>) -> Self {
        Self { tokens }
    }
}

#[async_trait]
impl AuthProvider for StaticTokenAuth {
    async fn authenticate(&self, credentials: &Credentials) -> ServerResult<Principal> {
        match credentials {
            Credentials::Bearer(token) => match self.tokens.get(token) {
                Some(name) => Ok(Principal::user(name.clone())),
                None => {
                    tracing::debug!("unknown bearer token, treating as anonymous");
                    Ok(Principal::anonymous())
                }
            },
            Credentials::Anonymous => Ok(Principal::anonymous()),
        }
    }
}
