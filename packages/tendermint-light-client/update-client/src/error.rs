//! Error types for the update client

use tendermint::Hash;
use tendermint_light_client_verifier::types::TrustThreshold;
use thiserror::Error;

use crate::store::StoreError;

/// Reasons a header is rejected or a client operation fails
#[derive(Error, Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum UpdateClientError {
    /// Header fails structural validation
    #[error("malformed header: {reason}")]
    MalformedHeader {
        /// Reason for error
        reason: String,
    },

    /// No trusted consensus state to verify the header against
    #[error("no trusted consensus state below height {height}")]
    NoTrustedAnchor {
        /// Height of the header
        height: u64,
    },

    /// The trusting period has elapsed since the anchor's timestamp
    #[error(
        "trusted state at height {trusted_height} expired: anchor time {trusted_timestamp}, now {current_time}"
    )]
    Expired {
        /// Anchor height
        trusted_height: u64,
        /// Anchor timestamp
        trusted_timestamp: u64,
        /// Time of the check
        current_time: u64,
        /// Whether the latest trusted state has expired as well
        client_expired: bool,
    },

    /// Header time is beyond the allowed clock drift
    #[error("header time {header_time} is too far ahead of current time {current_time}")]
    FutureHeader {
        /// Header time
        header_time: u64,
        /// Time of the check
        current_time: u64,
    },

    /// Header time is not strictly between the enclosing trusted times
    #[error("header time {header_time} not after {prev_time} and before {next_time:?}")]
    NonMonotonicTime {
        /// Header time
        header_time: u64,
        /// Timestamp of the trusted state below the header
        prev_time: u64,
        /// Timestamp of the trusted state above the header, when backfilling
        next_time: Option<u64>,
    },

    /// Validator set does not match the trusted next validator set hash
    #[error("validator set hash {actual} does not match trusted hash {expected}")]
    ValidatorSetMismatch {
        /// Hash recorded in the trusted consensus state
        expected: Hash,
        /// Hash of the provided validator set
        actual: Hash,
    },

    /// Not enough trusted voting power signed the header
    #[error(
        "trusted validators signed {tallied}/{total}, need {}/{}",
        .trust_level.numerator(),
        .trust_level.denominator()
    )]
    InsufficientTrustOverlap {
        /// Trusted voting power with valid signatures
        tallied: u64,
        /// Total trusted voting power
        total: u64,
        /// Required fraction
        trust_level: TrustThreshold,
    },

    /// The commit lacks two thirds of its own validator set
    #[error("commit signed by {tallied}/{total} voting power, need 2/3")]
    QuorumNotReached {
        /// Voting power with valid signatures
        tallied: u64,
        /// Total voting power of the header's validator set
        total: u64,
    },

    /// The commit carries a duplicate or invalid signature from a
    /// validator of the set it is checked against
    #[error("invalid commit: {reason}")]
    InvalidCommit {
        /// Reason for error
        reason: String,
    },

    /// A different consensus state is already trusted at this height
    #[error("conflicting consensus state at height {height}")]
    ConflictingUpdate {
        /// Height of the conflict
        height: u64,
    },

    /// Client is frozen
    #[error("client is frozen at height {frozen_height}")]
    ClientFrozen {
        /// Height the client was frozen at
        frozen_height: u64,
    },

    /// No client exists for the chain
    #[error("client for chain {chain_id} not found")]
    ClientNotFound {
        /// Chain id
        chain_id: String,
    },

    /// A client already exists for the chain
    #[error("client for chain {chain_id} already exists")]
    ClientAlreadyExists {
        /// Chain id
        chain_id: String,
    },

    /// Client or consensus state parameters are invalid
    #[error("invalid client state: {reason}")]
    InvalidClientState {
        /// Reason for error
        reason: String,
    },

    /// Trusted state could not be read or written
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl UpdateClientError {
    /// Whether the client can no longer be updated after this error.
    ///
    /// An expired anchor is only terminal once the latest trusted state has
    /// expired too; a backfill from an old anchor does not stop a client
    /// whose latest state is fresh. Every other error only rejects the
    /// submitted header.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Expired {
                client_expired: true,
                ..
            } | Self::ConflictingUpdate { .. }
                | Self::ClientFrozen { .. }
        )
    }
}
