//! Headers submitted to update the client

use serde::{Deserialize, Serialize};
use tendermint::{block::signed_header::SignedHeader, Time};
use tendermint_light_client_verifier::{
    operations::commit_validator::{CommitValidator, ProdCommitValidator},
    types::ValidatorSet,
};

use crate::{ensure, error::UpdateClientError};

/// A signed header of the remote chain with the validator sets needed to
/// verify it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    /// Header and the commit finalizing it
    pub signed_header: SignedHeader,
    /// Validator set that signed the header
    pub validator_set: ValidatorSet,
    /// Validator set for the next height
    pub next_validator_set: ValidatorSet,
    /// Next validator set of the trusted anchor, required when the header
    /// is not adjacent to it
    pub trusted_validators: Option<ValidatorSet>,
}

impl Header {
    /// Height of the header
    #[must_use]
    pub fn height(&self) -> u64 {
        self.signed_header.header.height.value()
    }

    /// Block time in unix nanoseconds
    #[must_use]
    pub fn time(&self) -> u64 {
        unix_nanos(self.signed_header.header.time)
    }

    /// Stateless checks of the header against itself and the client's chain.
    ///
    /// # Errors
    /// Returns [`UpdateClientError::MalformedHeader`] if the header is for
    /// another chain or height zero, the commit does not match the header,
    /// the validator sets do not match the hashes in the header, or the
    /// commit does not carry exactly one entry per validator of the header's
    /// validator set
    pub fn validate_basic(&self, chain_id: &str) -> Result<(), UpdateClientError> {
        let block = &self.signed_header.header;
        let commit = &self.signed_header.commit;

        ensure!(
            block.chain_id.as_str() == chain_id,
            malformed(format!(
                "header chain id {} does not match client chain id {chain_id}",
                block.chain_id
            ))
        );
        ensure!(block.height.value() > 0, malformed("header height is zero"));
        ensure!(
            commit.height == block.height,
            malformed(format!(
                "commit height {} does not match header height {}",
                commit.height, block.height
            ))
        );
        ensure!(
            commit.block_id.hash == block.hash(),
            malformed("commit is for a different block")
        );
        ensure!(
            self.validator_set.hash() == block.validators_hash,
            malformed("validator set does not match header validators hash")
        );
        ensure!(
            self.next_validator_set.hash() == block.next_validators_hash,
            malformed("next validator set does not match header next validators hash")
        );

        // one signature slot per validator, every signer a member of the set
        let commit_validator = ProdCommitValidator::default();
        commit_validator
            .validate(&self.signed_header, &self.validator_set)
            .map_err(|e| malformed(e.to_string()))?;
        commit_validator
            .validate_full(&self.signed_header, &self.validator_set)
            .map_err(|e| malformed(e.to_string()))?;

        Ok(())
    }
}

/// Unix nanoseconds of `time`, zero before the epoch
pub(crate) fn unix_nanos(time: Time) -> u64 {
    u64::try_from(time.unix_timestamp_nanos()).unwrap_or_default()
}

fn malformed(reason: impl Into<String>) -> UpdateClientError {
    UpdateClientError::MalformedHeader {
        reason: reason.into(),
    }
}
