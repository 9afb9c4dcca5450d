//! Header verification against trusted consensus states

use tendermint_light_client_verifier::{operations::VotingPowerCalculator, types::TrustThreshold};

use crate::{
    client_state::ClientState, consensus_state::ConsensusState, ensure, error::UpdateClientError,
    header::Header, quorum, store::TrustedStateStore,
};

/// Verifies `header` against the closest trusted consensus state below it.
///
/// Header must have passed [`Header::validate_basic`]. Returns the height
/// of the trusted anchor the header was verified from.
///
/// A header directly above its anchor must be signed by the anchor's next
/// validator set. Any other header must carry the anchor's next validator
/// set as `trusted_validators`, be signed by at least `trust_level` of it,
/// and by two thirds of its own validator set.
///
/// # Errors
/// Returns an error if:
/// - There is no trusted anchor below the header, or the header is at or
///   below the earliest trusted height
/// - The anchor is outside the trusting period
/// - The header time is too far in the future
/// - The header time is not after the anchor, or not before the next
///   trusted state when backfilling
/// - Validator set hashes do not link to the anchor
/// - The commit carries a duplicate or invalid signature
/// - Signed voting power is insufficient
pub fn verify_header<S: TrustedStateStore, C: VotingPowerCalculator>(
    client_state: &ClientState,
    store: &S,
    header: &Header,
    current_time: u64,
    calculator: &C,
) -> Result<u64, UpdateClientError> {
    let chain_id = client_state.chain_id.as_str();
    let height = header.height();

    ensure!(
        height > client_state.earliest_height,
        UpdateClientError::NoTrustedAnchor { height }
    );
    let anchor = store
        .nearest_below_or_equal(chain_id, height - 1)?
        .ok_or(UpdateClientError::NoTrustedAnchor { height })?;
    let next = if height < client_state.latest_height {
        store.nearest_above(chain_id, height)?
    } else {
        None
    };

    check_trusting_period(client_state, store, &anchor, current_time)?;
    check_clock_drift(client_state, header.time(), current_time)?;
    check_monotonic_time(header.time(), &anchor, next.as_ref())?;

    if height == anchor.height + 1 {
        tracing::debug!(chain_id, height, trusted_height = anchor.height, "adjacent verification");
        verify_adjacent(&anchor, header, calculator)?;
    } else {
        tracing::debug!(chain_id, height, trusted_height = anchor.height, "skipping verification");
        verify_skipping(client_state, &anchor, header, calculator)?;
    }

    Ok(anchor.height)
}

fn check_trusting_period<S: TrustedStateStore>(
    client_state: &ClientState,
    store: &S,
    anchor: &ConsensusState,
    current_time: u64,
) -> Result<(), UpdateClientError> {
    if !client_state.is_expired(anchor.timestamp, current_time) {
        return Ok(());
    }

    let client_expired = anchor.height >= client_state.latest_height
        || store
            .consensus_state(&client_state.chain_id, client_state.latest_height)?
            .is_none_or(|latest| client_state.is_expired(latest.timestamp, current_time));

    Err(UpdateClientError::Expired {
        trusted_height: anchor.height,
        trusted_timestamp: anchor.timestamp,
        current_time,
        client_expired,
    })
}

fn check_clock_drift(
    client_state: &ClientState,
    header_time: u64,
    current_time: u64,
) -> Result<(), UpdateClientError> {
    ensure!(
        u128::from(header_time) <= u128::from(current_time) + client_state.max_clock_drift_nanos(),
        UpdateClientError::FutureHeader {
            header_time,
            current_time,
        }
    );
    Ok(())
}

fn check_monotonic_time(
    header_time: u64,
    prev: &ConsensusState,
    next: Option<&ConsensusState>,
) -> Result<(), UpdateClientError> {
    let after_prev = header_time > prev.timestamp;
    let before_next = next.is_none_or(|next| header_time < next.timestamp);
    ensure!(
        after_prev && before_next,
        UpdateClientError::NonMonotonicTime {
            header_time,
            prev_time: prev.timestamp,
            next_time: next.map(|next| next.timestamp),
        }
    );
    Ok(())
}

fn verify_adjacent<C: VotingPowerCalculator>(
    anchor: &ConsensusState,
    header: &Header,
    calculator: &C,
) -> Result<(), UpdateClientError> {
    let actual = header.validator_set.hash();
    ensure!(
        actual == anchor.next_validators_hash,
        UpdateClientError::ValidatorSetMismatch {
            expected: anchor.next_validators_hash,
            actual,
        }
    );
    verify_quorum(header, calculator)
}

fn verify_skipping<C: VotingPowerCalculator>(
    client_state: &ClientState,
    anchor: &ConsensusState,
    header: &Header,
    calculator: &C,
) -> Result<(), UpdateClientError> {
    let trusted_validators =
        header
            .trusted_validators
            .as_ref()
            .ok_or_else(|| UpdateClientError::MalformedHeader {
                reason: "trusted validators are required for a non-adjacent header".into(),
            })?;

    let actual = trusted_validators.hash();
    ensure!(
        actual == anchor.next_validators_hash,
        UpdateClientError::ValidatorSetMismatch {
            expected: anchor.next_validators_hash,
            actual,
        }
    );

    let overlap = quorum::trusted_overlap(
        calculator,
        &header.signed_header,
        trusted_validators,
        &header.validator_set,
        client_state.trust_level,
    )?;
    ensure!(
        overlap.is_met(),
        UpdateClientError::InsufficientTrustOverlap {
            tallied: overlap.tallied,
            total: overlap.total,
            trust_level: client_state.trust_level,
        }
    );

    verify_quorum(header, calculator)
}

fn verify_quorum<C: VotingPowerCalculator>(
    header: &Header,
    calculator: &C,
) -> Result<(), UpdateClientError> {
    let tally = quorum::verify_commit(
        calculator,
        &header.signed_header,
        &header.validator_set,
        TrustThreshold::TWO_THIRDS,
    )?;
    ensure!(
        tally.is_met(),
        UpdateClientError::QuorumNotReached {
            tallied: tally.tallied,
            total: tally.total,
        }
    );
    Ok(())
}
