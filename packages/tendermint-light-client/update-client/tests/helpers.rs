//! Common test utilities and fixtures for update client tests

#![allow(dead_code)]

use tendermint::{
    block::{signed_header::SignedHeader, CommitSig},
    Time,
};
use tendermint_light_client_update_client::{
    ClientState, ConsensusState, FixedClock, Header, LightClient, MemoryStore,
    ProdVotingPowerCalculator, TrustThreshold, UpdateClientError, UpdateClientOutput,
    UpdateResult, ValidatorSet,
};
use tendermint_testgen::{Commit, Generator, Header as TestgenHeader, Validator};

pub const CHAIN_ID: &str = "remote-1";
pub const SECOND: u64 = 1_000_000_000;
pub const GENESIS_HEIGHT: u64 = 100;
pub const TRUSTING_PERIOD_SECONDS: u64 = 14 * 24 * 60 * 60;
const GENESIS_TIME: u64 = 1_700_000_000 * SECOND;

pub type TestLightClient = LightClient<MemoryStore, FixedClock, ProdVotingPowerCalculator>;

/// Block time of `height`, one second per block
pub const fn time_at(height: u64) -> u64 {
    GENESIS_TIME + height * SECOND
}

fn tm_time(nanos: u64) -> Time {
    Time::from_unix_timestamp(
        i64::try_from(nanos / SECOND).expect("time fits i64"),
        u32::try_from(nanos % SECOND).expect("nanos fit u32"),
    )
    .expect("valid block time")
}

/// `count` validators named after `first..`, voting power 10 each
pub fn validators(first: u32, count: u32) -> Vec<Validator> {
    (first..first + count)
        .map(|i| Validator::new(&format!("validator-{i}")).voting_power(10))
        .collect()
}

pub fn validator_set(validators: &[Validator]) -> ValidatorSet {
    ValidatorSet::without_proposer(
        validators
            .iter()
            .map(|v| v.generate().expect("valid validator"))
            .collect(),
    )
}

pub fn genesis_client_state() -> ClientState {
    ClientState {
        chain_id: CHAIN_ID.to_string(),
        trust_level: TrustThreshold::ONE_THIRD,
        trusting_period_seconds: TRUSTING_PERIOD_SECONDS,
        unbonding_period_seconds: 21 * 24 * 60 * 60,
        max_clock_drift_seconds: 10,
        earliest_height: GENESIS_HEIGHT,
        latest_height: GENESIS_HEIGHT,
        frozen_height: None,
    }
}

/// Light client trusting height 100, whose next validators are `next_validators`
pub fn light_client_at_genesis(next_validators: &[Validator]) -> TestLightClient {
    let consensus_state = ConsensusState {
        height: GENESIS_HEIGHT,
        timestamp: time_at(GENESIS_HEIGHT),
        root: b"genesis-root".to_vec(),
        next_validators_hash: validator_set(next_validators).hash(),
    };
    let mut client = LightClient::new(
        MemoryStore::default(),
        FixedClock(time_at(GENESIS_HEIGHT) + SECOND),
        ProdVotingPowerCalculator::default(),
    );
    client
        .create_client(genesis_client_state(), consensus_state)
        .expect("genesis client is valid");
    client
}

/// Moves the client's clock to `secs_after` seconds after the block time of `height`
pub fn set_time_after(client: &mut TestLightClient, height: u64, secs_after: u64) {
    *client.clock_mut() = FixedClock(time_at(height) + secs_after * SECOND);
}

/// Parameters of a header to sign
pub struct HeaderSpec<'a> {
    pub height: u64,
    pub time: u64,
    pub app_hash: Vec<u8>,
    pub validators: &'a [Validator],
    pub next_validators: &'a [Validator],
    pub signers: &'a [Validator],
    pub trusted_validators: Option<&'a [Validator]>,
}

impl<'a> HeaderSpec<'a> {
    /// Header at `height` signed by all of `validators`, keeping the same set
    pub fn new(height: u64, validators: &'a [Validator]) -> Self {
        Self {
            height,
            time: time_at(height),
            app_hash: format!("root-{height}").into_bytes(),
            validators,
            next_validators: validators,
            signers: validators,
            trusted_validators: None,
        }
    }

    /// The generated testgen header, for building commits by hand
    pub fn testgen_header(&self) -> TestgenHeader {
        TestgenHeader::new(self.validators)
            .next_validators(self.next_validators)
            .chain_id(CHAIN_ID)
            .height(self.height)
            .time(tm_time(self.time))
            .app_hash(self.app_hash.clone().try_into().expect("valid app hash"))
    }

    /// Signs the header with `signers`, every other validator voting absent
    pub fn build(self) -> Header {
        let header = self.testgen_header();
        let mut commit = Commit::new(header.clone(), 1)
            .generate()
            .expect("commit generates");

        let signer_addresses: Vec<_> = validator_set(self.signers)
            .validators()
            .iter()
            .map(|v| v.address)
            .collect();
        for sig in &mut commit.signatures {
            let keep = matches!(
                sig,
                CommitSig::BlockIdFlagCommit { validator_address, .. }
                    if signer_addresses.contains(validator_address)
            );
            if !keep {
                *sig = CommitSig::BlockIdFlagAbsent;
            }
        }

        Header {
            signed_header: SignedHeader::new(header.generate().expect("header generates"), commit)
                .expect("commit matches header"),
            validator_set: validator_set(self.validators),
            next_validator_set: validator_set(self.next_validators),
            trusted_validators: self.trusted_validators.map(validator_set),
        }
    }
}

/// Test context: a named scenario and the client it runs against
pub struct TestContext {
    pub scenario: &'static str,
    pub client: TestLightClient,
}

impl TestContext {
    pub fn execute_update_client(
        &mut self,
        header: &Header,
    ) -> Result<UpdateClientOutput, UpdateClientError> {
        self.client.update_client(CHAIN_ID, header)
    }

    /// Helper for updates expected to store a new consensus state
    pub fn assert_update_success(&mut self, header: &Header) -> UpdateClientOutput {
        match self.execute_update_client(header) {
            Ok(output) => {
                println!("✅ Update client succeeded for {}", self.scenario);
                println!("   New height: {}", output.height);
                println!("   Trusted height: {:?}", output.trusted_height);
                assert_eq!(output.result, UpdateResult::UpdateSuccess);
                assert!(
                    output.trusted_height.is_some_and(|h| h < output.height),
                    "trusted height should be below the new height"
                );
                output
            }
            Err(e) => panic!("❌ Expected success but failed for {}: {e:?}", self.scenario),
        }
    }

    /// Helper for updates expected to fail; checks nothing was written
    pub fn assert_update_failure(&mut self, header: &Header) -> UpdateClientError {
        let count_before = self.client.store().consensus_state_count(CHAIN_ID);
        let client_state_before = self.client.client_state(CHAIN_ID).expect("client exists");

        match self.execute_update_client(header) {
            Ok(output) => panic!(
                "❌ Expected failure but got {:?} for {}",
                output.result, self.scenario
            ),
            Err(e) => {
                println!(
                    "✅ Update client correctly failed for {} with: {e}",
                    self.scenario
                );
                assert_eq!(
                    self.client.client_state(CHAIN_ID).expect("client exists"),
                    client_state_before
                );
                assert_eq!(
                    self.client.store().consensus_state_count(CHAIN_ID),
                    count_before
                );
                e
            }
        }
    }
}
