//! Connection settings for one Smaregi contract.

use std::fmt;

use crate::error::ConfigError;

/// Production endpoint for every procedure.
pub const DEFAULT_ENDPOINT: &str = "https://webapi.smaregi.jp/access/";

pub const ENV_CONTRACT_ID: &str = "SMAREGI_CONTRACT_ID";
pub const ENV_ACCESS_TOKEN: &str = "SMAREGI_ACCESS_TOKEN";
pub const ENV_ENDPOINT: &str = "SMAREGI_ENDPOINT";

/// Endpoint and credentials sent with every request.
///
/// The access token is obtained out of band; this crate never refreshes it.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub endpoint: String,
    pub contract_id: String,
    pub access_token: String,
}

impl ClientConfig {
    pub fn new(contract_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            contract_id: contract_id.into(),
            access_token: access_token.into(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Read `SMAREGI_CONTRACT_ID`, `SMAREGI_ACCESS_TOKEN` and the optional
    /// `SMAREGI_ENDPOINT`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like `from_env`, reading variables through `lookup`. Empty values
    /// count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &'static str| lookup(name).filter(|v| !v.is_empty());

        let contract_id = get(ENV_CONTRACT_ID).ok_or(ConfigError::Missing(ENV_CONTRACT_ID))?;
        let access_token = get(ENV_ACCESS_TOKEN).ok_or(ConfigError::Missing(ENV_ACCESS_TOKEN))?;
        let config = Self::new(contract_id, access_token);
        Ok(match get(ENV_ENDPOINT) {
            Some(endpoint) => config.with_endpoint(endpoint),
            None => config,
        })
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("endpoint", &self.endpoint)
            .field("contract_id", &self.contract_id)
            .field("access_token", &"<redacted>")
            .finish()
    }
}
