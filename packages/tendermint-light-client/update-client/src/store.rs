//! Storage of trusted client and consensus states

use std::{collections::BTreeMap, ops::Bound};

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

use crate::{client_state::ClientState, consensus_state::ConsensusState};

/// Errors raised by a [`TrustedStateStore`]
#[derive(Error, Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum StoreError {
    /// A state could not be encoded
    #[error("failed to serialize {what}: {source}")]
    Serialize {
        /// Kind of state
        what: &'static str,
        /// Codec error
        #[source]
        source: serde_json::Error,
    },

    /// Stored bytes could not be decoded
    #[error("failed to deserialize {what}: {source}")]
    Deserialize {
        /// Kind of state
        what: &'static str,
        /// Codec error
        #[source]
        source: serde_json::Error,
    },

    /// The backing storage failed
    #[error("storage backend failure: {reason}")]
    Backend {
        /// Reason for error
        reason: String,
    },
}

/// Per chain storage of the client state and height indexed consensus states.
///
/// Writes must be visible to subsequent reads on the same store.
pub trait TrustedStateStore {
    /// Client state of `chain_id`
    ///
    /// # Errors
    /// Returns an error if the store cannot be read
    fn client_state(&self, chain_id: &str) -> Result<Option<ClientState>, StoreError>;

    /// Overwrites the client state of `chain_id`
    ///
    /// # Errors
    /// Returns an error if the store cannot be written
    fn set_client_state(
        &mut self,
        chain_id: &str,
        client_state: ClientState,
    ) -> Result<(), StoreError>;

    /// Consensus state of `chain_id` at exactly `height`
    ///
    /// # Errors
    /// Returns an error if the store cannot be read
    fn consensus_state(
        &self,
        chain_id: &str,
        height: u64,
    ) -> Result<Option<ConsensusState>, StoreError>;

    /// Stores a consensus state at its own height
    ///
    /// # Errors
    /// Returns an error if the store cannot be written
    fn set_consensus_state(
        &mut self,
        chain_id: &str,
        consensus_state: ConsensusState,
    ) -> Result<(), StoreError>;

    /// Consensus state with the greatest height `<= height`
    ///
    /// # Errors
    /// Returns an error if the store cannot be read
    fn nearest_below_or_equal(
        &self,
        chain_id: &str,
        height: u64,
    ) -> Result<Option<ConsensusState>, StoreError>;

    /// Consensus state with the smallest height `> height`
    ///
    /// # Errors
    /// Returns an error if the store cannot be read
    fn nearest_above(
        &self,
        chain_id: &str,
        height: u64,
    ) -> Result<Option<ConsensusState>, StoreError>;

    /// Persists the result of one successful update. Either both states
    /// are written or neither is.
    ///
    /// # Errors
    /// Returns an error if the store cannot be written, in which case
    /// neither state has changed
    fn commit_update(
        &mut self,
        chain_id: &str,
        client_state: ClientState,
        consensus_state: ConsensusState,
    ) -> Result<(), StoreError>;
}

/// In-memory store keeping JSON encoded states, as a key value backend would
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    client_states: BTreeMap<String, Vec<u8>>,
    consensus_states: BTreeMap<String, BTreeMap<u64, Vec<u8>>>,
}

impl MemoryStore {
    /// Number of consensus states stored for `chain_id`
    #[must_use]
    pub fn consensus_state_count(&self, chain_id: &str) -> usize {
        self.consensus_states.get(chain_id).map_or(0, BTreeMap::len)
    }

    fn heights(&self, chain_id: &str) -> Option<&BTreeMap<u64, Vec<u8>>> {
        self.consensus_states.get(chain_id)
    }
}

fn encode<T: Serialize>(what: &'static str, value: &T) -> Result<Vec<u8>, StoreError> {
    serde_json::to_vec(value).map_err(|source| StoreError::Serialize { what, source })
}

fn decode<T: DeserializeOwned>(what: &'static str, bytes: &[u8]) -> Result<T, StoreError> {
    serde_json::from_slice(bytes).map_err(|source| StoreError::Deserialize { what, source })
}

fn decode_consensus_state(bytes: Option<&Vec<u8>>) -> Result<Option<ConsensusState>, StoreError> {
    bytes
        .map(|bz| decode("consensus state", bz))
        .transpose()
}

impl TrustedStateStore for MemoryStore {
    fn client_state(&self, chain_id: &str) -> Result<Option<ClientState>, StoreError> {
        self.client_states
            .get(chain_id)
            .map(|bz| decode("client state", bz))
            .transpose()
    }

    fn set_client_state(
        &mut self,
        chain_id: &str,
        client_state: ClientState,
    ) -> Result<(), StoreError> {
        let bz = encode("client state", &client_state)?;
        self.client_states.insert(chain_id.to_string(), bz);
        Ok(())
    }

    fn consensus_state(
        &self,
        chain_id: &str,
        height: u64,
    ) -> Result<Option<ConsensusState>, StoreError> {
        decode_consensus_state(self.heights(chain_id).and_then(|states| states.get(&height)))
    }

    fn set_consensus_state(
        &mut self,
        chain_id: &str,
        consensus_state: ConsensusState,
    ) -> Result<(), StoreError> {
        let bz = encode("consensus state", &consensus_state)?;
        self.consensus_states
            .entry(chain_id.to_string())
            .or_default()
            .insert(consensus_state.height, bz);
        Ok(())
    }

    fn commit_update(
        &mut self,
        chain_id: &str,
        client_state: ClientState,
        consensus_state: ConsensusState,
    ) -> Result<(), StoreError> {
        // encode both before touching either map
        let client_bz = encode("client state", &client_state)?;
        let consensus_bz = encode("consensus state", &consensus_state)?;

        self.consensus_states
            .entry(chain_id.to_string())
            .or_default()
            .insert(consensus_state.height, consensus_bz);
        self.client_states.insert(chain_id.to_string(), client_bz);
        Ok(())
    }

    fn nearest_below_or_equal(
        &self,
        chain_id: &str,
        height: u64,
    ) -> Result<Option<ConsensusState>, StoreError> {
        decode_consensus_state(
            self.heights(chain_id)
                .and_then(|states| states.range(..=height).next_back())
                .map(|(_, bz)| bz),
        )
    }

    fn nearest_above(
        &self,
        chain_id: &str,
        height: u64,
    ) -> Result<Option<ConsensusState>, StoreError> {
        decode_consensus_state(
            self.heights(chain_id)
                .and_then(|states| {
                    states
                        .range((Bound::Excluded(height), Bound::Unbounded))
                        .next()
                })
                .map(|(_, bz)| bz),
        )
    }
}
