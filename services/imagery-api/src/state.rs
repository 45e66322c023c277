//! Application state for the imagery API.

use anyhow::{Context, Result};

/// Environment variable holding the shared request secret.
const TOKEN_ENV_VAR: &str = "VALID_CSRF_TOKEN";

/// Shared application state.
///
/// The token secret is read once at startup and injected here so the
/// gate stays a plain function of its inputs; handlers never touch the
/// process environment.
pub struct AppState {
    /// Secret every request's `csrf_token` parameter must match.
    pub token_secret: String,
}

impl AppState {
    /// Create state with an explicit secret (used directly by tests).
    pub fn new(token_secret: impl Into<String>) -> Self {
        Self {
            token_secret: token_secret.into(),
        }
    }

    /// Create state from environment configuration.
    pub fn from_env() -> Result<Self> {
        let token_secret = std::env::var(TOKEN_ENV_VAR)
            .with_context(|| format!("{} must be set", TOKEN_ENV_VAR))?;
        if token_secret.is_empty() {
            anyhow::bail!("{} must not be empty", TOKEN_ENV_VAR);
        }
        Ok(Self::new(token_secret))
    }
}
