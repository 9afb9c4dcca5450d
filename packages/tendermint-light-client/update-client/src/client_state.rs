//! Client state of the tendermint light client

use serde::{Deserialize, Serialize};
use tendermint_light_client_verifier::types::TrustThreshold;

use crate::{ensure, error::UpdateClientError};

const NANOS_PER_SECOND: u128 = 1_000_000_000;

/// Per remote chain parameters and progress of the light client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientState {
    /// Chain id of the remote chain
    pub chain_id: String,
    /// Fraction of trusted voting power required for non-adjacent updates,
    /// within `[1/3, 1]` by construction
    pub trust_level: TrustThreshold,
    /// How long a trusted consensus state can be used as an anchor
    pub trusting_period_seconds: u64,
    /// Unbonding period of the remote chain
    pub unbonding_period_seconds: u64,
    /// Tolerated skew between header time and local time
    pub max_clock_drift_seconds: u64,
    /// Lowest height the client trusts, set at creation
    pub earliest_height: u64,
    /// Highest trusted height
    pub latest_height: u64,
    /// Set once misbehaviour has been established
    pub frozen_height: Option<u64>,
}

impl ClientState {
    /// Checks the client parameters.
    ///
    /// # Errors
    /// Returns [`UpdateClientError::InvalidClientState`] if the chain id is
    /// empty, the trusting period is zero or not shorter than the unbonding
    /// period, the clock drift is zero, or the tracked heights are
    /// inconsistent
    pub fn validate(&self) -> Result<(), UpdateClientError> {
        ensure!(!self.chain_id.is_empty(), invalid("chain id is empty"));
        ensure!(
            self.trusting_period_seconds > 0
                && self.trusting_period_seconds < self.unbonding_period_seconds,
            invalid("trusting period must be positive and less than unbonding period")
        );
        ensure!(
            self.max_clock_drift_seconds > 0,
            invalid("max clock drift must be positive")
        );
        ensure!(self.latest_height > 0, invalid("latest height is zero"));
        ensure!(
            self.earliest_height <= self.latest_height,
            invalid("earliest height is above latest height")
        );
        Ok(())
    }

    /// Whether misbehaviour has frozen the client
    #[must_use]
    pub const fn is_frozen(&self) -> bool {
        self.frozen_height.is_some()
    }

    /// Trusting period in nanoseconds
    #[must_use]
    pub fn trusting_period_nanos(&self) -> u128 {
        u128::from(self.trusting_period_seconds) * NANOS_PER_SECOND
    }

    /// Max clock drift in nanoseconds
    #[must_use]
    pub fn max_clock_drift_nanos(&self) -> u128 {
        u128::from(self.max_clock_drift_seconds) * NANOS_PER_SECOND
    }

    /// Whether a consensus state with `timestamp` is past the trusting
    /// period at `current_time`
    #[must_use]
    pub fn is_expired(&self, timestamp: u64, current_time: u64) -> bool {
        u128::from(current_time.saturating_sub(timestamp)) >= self.trusting_period_nanos()
    }
}

fn invalid(reason: impl Into<String>) -> UpdateClientError {
    UpdateClientError::InvalidClientState {
        reason: reason.into(),
    }
}
