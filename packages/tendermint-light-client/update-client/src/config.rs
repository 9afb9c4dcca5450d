//! Genesis configuration of a client, loaded from TOML.
//!
//! ```toml
//! [client]
//! chain_id = "remote-1"
//! trusting_period_seconds = 1209600
//! unbonding_period_seconds = 1814400
//! max_clock_drift_seconds = 10
//!
//! [consensus_state]
//! height = 100
//! timestamp = 1700000100000000000
//! root = "0a0b0c"
//! next_validators_hash = "…64 upper case hex characters…"
//! ```
//!
//! `trust_level` defaults to 1/3 when omitted, and is otherwise given as
//! `trust_level = { numerator = 2, denominator = 3 }`.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use tendermint_light_client_verifier::types::TrustThreshold;
use thiserror::Error;

use crate::{
    client_state::ClientState, consensus_state::ConsensusState, error::UpdateClientError,
};

/// Errors loading a [`GenesisConfig`]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("failed to read config file {0}: {1}")]
    Io(String, #[source] std::io::Error),

    /// File is not valid TOML for a genesis config
    #[error("failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),

    /// Parameters do not describe a valid client
    #[error("invalid genesis: {0}")]
    Invalid(#[from] UpdateClientError),
}

/// Trust level as written in a config file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustLevelConfig {
    /// Numerator of the fraction
    pub numerator: u64,
    /// Denominator of the fraction
    pub denominator: u64,
}

impl Default for TrustLevelConfig {
    fn default() -> Self {
        Self {
            numerator: 1,
            denominator: 3,
        }
    }
}

impl TryFrom<TrustLevelConfig> for TrustThreshold {
    type Error = UpdateClientError;

    fn try_from(cfg: TrustLevelConfig) -> Result<Self, Self::Error> {
        Self::new(cfg.numerator, cfg.denominator).map_err(|e| {
            UpdateClientError::InvalidClientState {
                reason: format!(
                    "trust level {}/{}: {e}",
                    cfg.numerator, cfg.denominator
                ),
            }
        })
    }
}

/// Client parameters of a genesis config
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Chain id of the remote chain
    pub chain_id: String,
    /// Trust level for non-adjacent updates
    #[serde(default)]
    pub trust_level: TrustLevelConfig,
    /// Trusting period in seconds
    pub trusting_period_seconds: u64,
    /// Unbonding period in seconds
    pub unbonding_period_seconds: u64,
    /// Max clock drift in seconds
    pub max_clock_drift_seconds: u64,
}

/// Everything needed to create a client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisConfig {
    /// Client parameters
    pub client: ClientConfig,
    /// The initial trusted consensus state
    pub consensus_state: ConsensusState,
}

impl GenesisConfig {
    /// Load a `GenesisConfig` from a TOML file on disk.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .map_err(|e| ConfigError::Io(path_ref.display().to_string(), e))?;
        let cfg = toml::from_str(&contents)?;
        Ok(cfg)
    }

    /// Client and consensus state to create the client with, trusting the
    /// consensus state's height as both earliest and latest height.
    ///
    /// # Errors
    /// Returns an error if the resulting client state is invalid
    pub fn into_states(self) -> Result<(ClientState, ConsensusState), ConfigError> {
        let height = self.consensus_state.height;
        let client_state = ClientState {
            chain_id: self.client.chain_id,
            trust_level: self.client.trust_level.try_into()?,
            trusting_period_seconds: self.client.trusting_period_seconds,
            unbonding_period_seconds: self.client.unbonding_period_seconds,
            max_clock_drift_seconds: self.client.max_clock_drift_seconds,
            earliest_height: height,
            latest_height: height,
            frozen_height: None,
        };
        client_state.validate()?;
        Ok((client_state, self.consensus_state))
    }
}
