//! Signed voting power of a commit against a validator set

use tendermint::block::signed_header::SignedHeader;
use tendermint_light_client_verifier::{
    operations::VotingPowerCalculator,
    types::{TrustThreshold, ValidatorSet},
};

use crate::error::UpdateClientError;

/// Voting power that validly signed a commit, against a required fraction
/// of a validator set's total power
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuorumTally {
    /// Power of the validators with a valid commit signature
    pub tallied: u64,
    /// Total power of the validator set
    pub total: u64,
    /// Required fraction of `total`
    pub threshold: TrustThreshold,
}

impl QuorumTally {
    /// Whether `tallied / total` is at least the threshold
    #[must_use]
    pub fn is_met(&self) -> bool {
        self.total > 0
            && u128::from(self.tallied) * u128::from(self.threshold.denominator())
                >= u128::from(self.total) * u128::from(self.threshold.numerator())
    }
}

/// Tallies the power of `validators` that signed the commit of
/// `signed_header` for its block. Signers outside `validators` are skipped.
///
/// # Errors
/// Returns [`UpdateClientError::InvalidCommit`] if a validator of the set
/// signed twice or its signature does not verify
pub fn verify_commit<C: VotingPowerCalculator>(
    calculator: &C,
    signed_header: &SignedHeader,
    validators: &ValidatorSet,
    threshold: TrustThreshold,
) -> Result<QuorumTally, UpdateClientError> {
    let tally = calculator
        .voting_power_in(signed_header, validators, threshold)
        .map_err(|e| invalid_commit(&e))?;

    Ok(QuorumTally {
        tallied: tally.tallied,
        total: tally.total,
        threshold,
    })
}

/// Tallies the power of `trusted` validators that signed the commit and are
/// still members of `untrusted` under the same public key, against the
/// total power of `trusted`.
///
/// # Errors
/// Returns [`UpdateClientError::InvalidCommit`] if a retained validator
/// signed twice or its signature does not verify
pub fn trusted_overlap<C: VotingPowerCalculator>(
    calculator: &C,
    signed_header: &SignedHeader,
    trusted: &ValidatorSet,
    untrusted: &ValidatorSet,
    trust_level: TrustThreshold,
) -> Result<QuorumTally, UpdateClientError> {
    let retained = trusted
        .validators()
        .iter()
        .filter(|validator| {
            untrusted
                .validator(validator.address)
                .is_some_and(|member| member.pub_key == validator.pub_key)
        })
        .cloned()
        .collect();

    // voting_power_in may stop counting once its threshold is exceeded
    // relative to the set it is given, so count the retained set in full
    let full = TrustThreshold::new(1, 1).map_err(|e| invalid_commit(&e))?;
    let signed = verify_commit(
        calculator,
        signed_header,
        &ValidatorSet::without_proposer(retained),
        full,
    )?;

    Ok(QuorumTally {
        tallied: signed.tallied,
        total: trusted.total_voting_power().value(),
        threshold: trust_level,
    })
}

fn invalid_commit(e: &impl ToString) -> UpdateClientError {
    UpdateClientError::InvalidCommit {
        reason: e.to_string(),
    }
}
