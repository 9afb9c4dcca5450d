//! Header processing: decides whether a verified header advances, backfills
//! or leaves the trusted state unchanged

use serde::{Deserialize, Serialize};
use tendermint_light_client_verifier::operations::VotingPowerCalculator;

use crate::{
    client_state::ClientState, consensus_state::ConsensusState, error::UpdateClientError,
    header::Header, store::TrustedStateStore, verify,
};

/// What an accepted header does to the trusted state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateResult {
    /// A new consensus state must be stored
    UpdateSuccess,
    /// The header's consensus state is already trusted
    NoOp,
}

/// The output of processing a header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateClientOutput {
    /// Client state after the update
    pub client_state: ClientState,
    /// Consensus state derived from the header
    pub consensus_state: ConsensusState,
    /// Height of the header
    pub height: u64,
    /// Height of the anchor the header was verified from, `None` for a no-op
    pub trusted_height: Option<u64>,
    /// Whether anything has to be stored
    pub result: UpdateResult,
}

/// Checks `header` against the trusted state in `store` and computes the
/// resulting client and consensus states. Nothing is written to `store`.
///
/// A header whose consensus state is already trusted is a no-op, though its
/// height still raises `latest_height` if an earlier write left the client
/// state behind its consensus states. A header above `latest_height`
/// advances it; a header at or below it backfills a gap without moving
/// `latest_height`.
///
/// # Errors
/// Returns an error if:
/// - The client is frozen
/// - The header is malformed, see [`Header::validate_basic`]
/// - Verification fails, see [`verify::verify_header`]
/// - A different consensus state is already trusted at the header height
/// - The store cannot be read
pub fn check_header_and_update_state<S: TrustedStateStore, C: VotingPowerCalculator>(
    client_state: &ClientState,
    store: &S,
    header: &Header,
    current_time: u64,
    calculator: &C,
) -> Result<UpdateClientOutput, UpdateClientError> {
    if let Some(frozen_height) = client_state.frozen_height {
        return Err(UpdateClientError::ClientFrozen { frozen_height });
    }

    header.validate_basic(&client_state.chain_id)?;

    let height = header.height();
    let new_consensus_state = ConsensusState::from(header);
    let existing = store.consensus_state(&client_state.chain_id, height)?;
    let new_client_state = ClientState {
        latest_height: client_state.latest_height.max(height),
        ..client_state.clone()
    };

    if existing.as_ref() == Some(&new_consensus_state) {
        tracing::info!(
            chain_id = %client_state.chain_id,
            height,
            "consensus state already trusted at this height"
        );
        return Ok(UpdateClientOutput {
            client_state: new_client_state,
            consensus_state: new_consensus_state,
            height,
            trusted_height: None,
            result: UpdateResult::NoOp,
        });
    }

    let trusted_height =
        verify::verify_header(client_state, store, header, current_time, calculator)?;

    if existing.is_some() {
        tracing::warn!(
            chain_id = %client_state.chain_id,
            height,
            "verified header conflicts with trusted consensus state"
        );
        return Err(UpdateClientError::ConflictingUpdate { height });
    }

    Ok(UpdateClientOutput {
        client_state: new_client_state,
        consensus_state: new_consensus_state,
        height,
        trusted_height: Some(trusted_height),
        result: UpdateResult::UpdateSuccess,
    })
}
