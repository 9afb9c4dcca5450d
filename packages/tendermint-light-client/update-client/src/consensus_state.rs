//! Trusted consensus state at a single height

use serde::{Deserialize, Serialize};
use tendermint::Hash;

use crate::header::{unix_nanos, Header};

/// What the client trusts about the remote chain at one height
#[serde_with::serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusState {
    /// Height of the trusted block
    pub height: u64,
    /// Block time in unix nanoseconds
    pub timestamp: u64,
    /// Commitment root used by membership proofs
    #[serde_as(as = "serde_with::hex::Hex")]
    pub root: Vec<u8>,
    /// Hash of the validator set expected to sign the next block
    pub next_validators_hash: Hash,
}

impl From<&Header> for ConsensusState {
    fn from(header: &Header) -> Self {
        let block = &header.signed_header.header;
        Self {
            height: block.height.value(),
            timestamp: unix_nanos(block.time),
            root: block.app_hash.as_bytes().to_vec(),
            next_validators_hash: block.next_validators_hash,
        }
    }
}
