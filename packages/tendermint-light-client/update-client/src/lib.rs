//! The update client state machine of the tendermint light client: verifies
//! headers of a remote chain against trusted state and decides when that
//! state advances, is backfilled, or is left untouched.
#![deny(
    missing_docs,
    clippy::nursery,
    clippy::pedantic,
    warnings,
    unused_crate_dependencies
)]

pub mod client;
pub mod client_state;
pub mod clock;
pub mod config;
pub mod consensus_state;
pub mod error;
pub mod header;
pub mod quorum;
pub mod store;
pub mod update;
pub mod verify;

#[cfg(test)]
mod test_utils;

pub use client::{ClientStatus, LightClient};
pub use client_state::ClientState;
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ConfigError, GenesisConfig};
pub use consensus_state::ConsensusState;
pub use error::UpdateClientError;
pub use header::Header;
pub use quorum::{verify_commit, QuorumTally};
pub use store::{MemoryStore, StoreError, TrustedStateStore};
pub use update::{check_header_and_update_state, UpdateClientOutput, UpdateResult};

pub use tendermint_light_client_verifier::{
    operations::{ProdVotingPowerCalculator, VotingPowerCalculator},
    types::{TrustThreshold, ValidatorSet},
};

/// Ensure that a condition is true, otherwise return an error.
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr) => {
        if !$cond {
            return Err($err);
        }
    };
}
