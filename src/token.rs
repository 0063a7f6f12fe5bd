//! GitHub token discovery
//!
//! The [`TokenProvider`] trait has these implementations:
//!
//! - [`StaticToken`]: a token given explicitly on the command line
//! - [`EnvToken`]: `GITHUB_TOKEN`, then `GH_TOKEN`
//! - [`GhCliToken`]: `gh auth token` from the GitHub CLI, if installed
//! - [`TokenChain`]: tries providers in order, first success wins

use crate::error::{Error, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::process::Command;
use tracing::debug;

/// Environment variables consulted by [`EnvToken`], in order
pub const TOKEN_ENV_VARS: &[&str] = &["GITHUB_TOKEN", "GH_TOKEN"];

/// Source of a GitHub API token
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Resolve a token
    ///
    /// # Errors
    /// [`Error::MissingToken`] when this source has no token.
    async fn token(&self) -> Result<String>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}

/// Token supplied up front
#[derive(Clone)]
pub struct StaticToken(String);

impl StaticToken {
    /// Wrap an explicit token
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl std::fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StaticToken(***)")
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn token(&self) -> Result<String> {
        non_empty(&self.0).ok_or_else(|| Error::MissingToken("explicit token is empty".into()))
    }

    fn name(&self) -> &'static str {
        "explicit"
    }
}

/// Token read from the process environment
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvToken;

#[async_trait]
impl TokenProvider for EnvToken {
    async fn token(&self) -> Result<String> {
        TOKEN_ENV_VARS
            .iter()
            .find_map(|var| std::env::var(var).ok().as_deref().and_then(non_empty))
            .ok_or_else(|| {
                Error::MissingToken(format!("none of {} is set", TOKEN_ENV_VARS.join(", ")))
            })
    }

    fn name(&self) -> &'static str {
        "environment"
    }
}

/// Token from `gh auth token --hostname <host>`
#[derive(Debug, Clone)]
pub struct GhCliToken {
    binary_path: PathBuf,
    host: String,
}

impl GhCliToken {
    /// Use the given `gh` binary for `host`
    pub fn new(binary_path: PathBuf, host: impl Into<String>) -> Self {
        Self {
            binary_path,
            host: host.into(),
        }
    }

    /// Attempt to find `gh` in PATH
    pub fn from_path(host: impl Into<String>) -> Option<Self> {
        which::which("gh").ok().map(|path| Self::new(path, host))
    }
}

#[async_trait]
impl TokenProvider for GhCliToken {
    async fn token(&self) -> Result<String> {
        let output = Command::new(&self.binary_path)
            .args(["auth", "token", "--hostname", &self.host])
            .output()
            .await
            .map_err(|e| Error::MissingToken(format!("failed to run gh: {}", e)))?;

        if !output.status.success() {
            return Err(Error::MissingToken(format!(
                "gh auth token exited with {:?}",
                output.status.code()
            )));
        }

        non_empty(&String::from_utf8_lossy(&output.stdout))
            .ok_or_else(|| Error::MissingToken("gh returned an empty token".into()))
    }

    fn name(&self) -> &'static str {
        "gh-cli"
    }
}

/// Ordered list of providers; the first that yields a token wins
pub struct TokenChain {
    providers: Vec<Box<dyn TokenProvider>>,
}

impl TokenChain {
    /// Chain the given providers
    pub fn new(providers: Vec<Box<dyn TokenProvider>>) -> Self {
        Self { providers }
    }

    /// Explicit token if given, otherwise environment, then `gh` for `host`
    pub fn default_for(explicit: Option<String>, host: &str) -> Self {
        let mut providers: Vec<Box<dyn TokenProvider>> = Vec::new();
        if let Some(token) = explicit {
            providers.push(Box::new(StaticToken::new(token)));
        }
        providers.push(Box::new(EnvToken));
        if let Some(gh) = GhCliToken::from_path(host) {
            providers.push(Box::new(gh));
        }
        Self::new(providers)
    }

    /// Names of the chained providers, in order
    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }
}

#[async_trait]
impl TokenProvider for TokenChain {
    async fn token(&self) -> Result<String> {
        for provider in &self.providers {
            match provider.token().await {
                Ok(token) => {
                    debug!(source = provider.name(), "resolved GitHub token");
                    return Ok(token);
                }
                Err(e) => {
                    debug!(source = provider.name(), error = %e, "token source unavailable");
                }
            }
        }
        Err(Error::MissingToken(
            "set GITHUB_TOKEN, pass --token, or log in with `gh auth login`".to_string(),
        ))
    }

    fn name(&self) -> &'static str {
        "chain"
    }
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
