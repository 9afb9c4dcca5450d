//! Fixtures shared by the unit tests
#![allow(dead_code)]

use tendermint::{
    block::{signed_header::SignedHeader, CommitSig},
    Time,
};
use tendermint_light_client_verifier::types::{TrustThreshold, ValidatorSet};
use tendermint_testgen::{Commit, Generator, Header as TestgenHeader, Validator};

use crate::{
    client_state::ClientState, consensus_state::ConsensusState, header::Header,
    store::MemoryStore, store::TrustedStateStore,
};

pub const CHAIN_ID: &str = "remote-1";
pub const SECOND: u64 = 1_000_000_000;
const GENESIS_TIME: u64 = 1_700_000_000 * SECOND;

/// Block time of `height`, one second per block
pub const fn time_at(height: u64) -> u64 {
    GENESIS_TIME + height * SECOND
}

pub fn tm_time(nanos: u64) -> Time {
    Time::from_unix_timestamp(
        i64::try_from(nanos / SECOND).unwrap(),
        u32::try_from(nanos % SECOND).unwrap(),
    )
    .unwrap()
}

/// `count` validators named after `first..`, voting power 10 each
pub fn signers(first: u32, count: u32) -> Vec<Validator> {
    (first..first + count)
        .map(|i| Validator::new(&format!("validator-{i}")).voting_power(10))
        .collect()
}

pub fn validator_set(validators: &[Validator]) -> ValidatorSet {
    ValidatorSet::without_proposer(
        validators
            .iter()
            .map(|v| v.generate().unwrap())
            .collect(),
    )
}

pub fn client_state() -> ClientState {
    ClientState {
        chain_id: CHAIN_ID.to_string(),
        trust_level: TrustThreshold::ONE_THIRD,
        trusting_period_seconds: 14 * 24 * 60 * 60,
        unbonding_period_seconds: 21 * 24 * 60 * 60,
        max_clock_drift_seconds: 10,
        earliest_height: 100,
        latest_height: 100,
        frozen_height: None,
    }
}

pub fn consensus_state_at(height: u64, next_validators: &[Validator]) -> ConsensusState {
    ConsensusState {
        height,
        timestamp: time_at(height),
        root: height.to_be_bytes().to_vec(),
        next_validators_hash: validator_set(next_validators).hash(),
    }
}

/// Store holding the default client with a trusted state at height 100
pub fn store_with_anchor(validators: &[Validator]) -> MemoryStore {
    let mut store = MemoryStore::default();
    store.set_client_state(CHAIN_ID, client_state()).unwrap();
    store
        .set_consensus_state(CHAIN_ID, consensus_state_at(100, validators))
        .unwrap();
    store
}

pub struct HeaderBuilder {
    height: u64,
    time: u64,
    app_hash: Vec<u8>,
    validators: Vec<Validator>,
    next_validators: Vec<Validator>,
    signers: Option<Vec<Validator>>,
    trusted_validators: Option<Vec<Validator>>,
}

impl HeaderBuilder {
    pub fn new(height: u64) -> Self {
        let validators = signers(1, 4);
        Self {
            height,
            time: time_at(height),
            app_hash: height.to_be_bytes().to_vec(),
            next_validators: validators.clone(),
            validators,
            signers: None,
            trusted_validators: None,
        }
    }

    pub fn with_validators(mut self, validators: Vec<Validator>) -> Self {
        self.next_validators.clone_from(&validators);
        self.validators = validators;
        self
    }

    pub fn with_next_validators(mut self, validators: Vec<Validator>) -> Self {
        self.next_validators = validators;
        self
    }

    pub fn with_time(mut self, time: u64) -> Self {
        self.time = time;
        self
    }

    pub fn with_app_hash(mut self, app_hash: &[u8]) -> Self {
        self.app_hash = app_hash.to_vec();
        self
    }

    /// Signers of the commit, all validators when unset. Everyone else gets
    /// an absent vote.
    pub fn signed_by(mut self, signers: Vec<Validator>) -> Self {
        self.signers = Some(signers);
        self
    }

    pub fn with_trusted_validators(mut self, validators: Vec<Validator>) -> Self {
        self.trusted_validators = Some(validators);
        self
    }

    pub fn build(self) -> Header {
        let header = TestgenHeader::new(&self.validators)
            .next_validators(&self.next_validators)
            .chain_id(CHAIN_ID)
            .height(self.height)
            .time(tm_time(self.time))
            .app_hash(self.app_hash.try_into().unwrap());
        let mut commit = Commit::new(header.clone(), 1).generate().unwrap();

        if let Some(signers) = &self.signers {
            let addresses: Vec<_> = validator_set(signers)
                .validators()
                .iter()
                .map(|v| v.address)
                .collect();
            for sig in &mut commit.signatures {
                let keep = matches!(
                    sig,
                    CommitSig::BlockIdFlagCommit { validator_address, .. }
                        if addresses.contains(validator_address)
                );
                if !keep {
                    *sig = CommitSig::BlockIdFlagAbsent;
                }
            }
        }

        Header {
            signed_header: SignedHeader::new(header.generate().unwrap(), commit).unwrap(),
            validator_set: validator_set(&self.validators),
            next_validator_set: validator_set(&self.next_validators),
            trusted_validators: self.trusted_validators.as_deref().map(validator_set),
        }
    }
}
