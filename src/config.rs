//! Runtime settings read from the environment.
//!
//! A `.env` file in the working directory is honored. Command-line flags
//! take precedence over everything here.

use std::net::IpAddr;

use clap::ValueEnum;

use crate::resolve::BlockedPolicy;

/// Default listening port.
pub const DEFAULT_PORT: u16 = 8080;

/// Service settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Address the HTTP listener binds to.
    pub bind: IpAddr,
    /// Port the HTTP listener binds to.
    pub port: u16,
    /// Blocked policy applied when a request does not choose one.
    pub blocked_policy: BlockedPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind: IpAddr::from([0, 0, 0, 0]),
            port: DEFAULT_PORT,
            blocked_policy: BlockedPolicy::default(),
        }
    }
}

impl Settings {
    /// Load `.env` (if any) and read settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error naming the variable whose value cannot be parsed.
    pub fn from_env() -> Result<Self, String> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`, falling back to defaults for unset
    /// or empty variables.
    ///
    /// # Errors
    ///
    /// Returns an error naming the variable whose value cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut settings = Self::default();

        if let Some(port) = get("PORT") {
            settings.port =
                port.trim().parse().map_err(|e| format!("invalid PORT {port:?}: {e}"))?;
        }
        if let Some(bind) = get("BIND") {
            settings.bind =
                bind.trim().parse().map_err(|e| format!("invalid BIND {bind:?}: {e}"))?;
        }
        if let Some(policy) = get("ACTIONABLES_BLOCKED_POLICY") {
            settings.blocked_policy = BlockedPolicy::from_str(policy.trim(), true)
                .map_err(|e| format!("invalid ACTIONABLES_BLOCKED_POLICY {policy:?}: {e}"))?;
        }

        Ok(settings)
    }
}
