//! Caller identity resolution
//!
//! Every tracker operation is scoped to a user id. Callers present an opaque
//! token which a resolver maps to that id.

use std::collections::HashMap;
use tracing::{debug, warn};

use crate::error::{FitLabError, Result};

/// Maps an identity token to a user id
pub trait IdentityResolver {
    fn resolve(&self, token: &str) -> Result<String>;
}

/// Extract the token from an `Authorization: Bearer <token>` header value
pub fn bearer_token(header: &str) -> Result<&str> {
    let header = header.trim();
    let (scheme, token) = header
        .split_once(' ')
        .ok_or_else(|| FitLabError::Auth("Missing Authorization header".to_string()))?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(FitLabError::Auth(format!("Unsupported scheme '{}'", scheme)));
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(FitLabError::Auth("Empty bearer token".to_string()));
    }
    Ok(token)
}

/// Fixed token table, typically loaded from the `[auth]` config section
#[derive(Debug, Clone, Default)]
pub struct StaticTokenResolver {
    tokens: HashMap<String, String>,
}

impl StaticTokenResolver {
    pub fn new(tokens: HashMap<String, String>) -> Self {
        Self { tokens }
    }

    pub fn with_token(mut self, token: impl Into<String>, uid: impl Into<String>) -> Self {
        self.tokens.insert(token.into(), uid.into());
        self
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl IdentityResolver for StaticTokenResolver {
    fn resolve(&self, token: &str) -> Result<String> {
        match self.tokens.get(token) {
            Some(uid) => {
                debug!(user_id = %uid, "Resolved identity token");
                Ok(uid.clone())
            }
            None => {
                warn!("Rejected unknown identity token");
                Err(FitLabError::Auth("Unknown identity token".to_string()))
            }
        }
    }
}
