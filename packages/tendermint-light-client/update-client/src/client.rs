//! Light client driving header updates against a trusted state store

use serde::{Deserialize, Serialize};
use tendermint_light_client_verifier::operations::{
    ProdVotingPowerCalculator, VotingPowerCalculator,
};

use crate::{
    client_state::ClientState,
    clock::{Clock, SystemClock},
    consensus_state::ConsensusState,
    ensure,
    error::UpdateClientError,
    header::Header,
    store::TrustedStateStore,
    update::{check_header_and_update_state, UpdateClientOutput, UpdateResult},
};

/// Status of a client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientStatus {
    /// Client accepts updates
    Active,
    /// Latest trusted state is outside the trusting period
    Expired,
    /// Client was frozen after misbehaviour
    Frozen,
}

/// Tendermint light client over a trusted state store.
///
/// Mutating operations take `&mut self`, so updates to a client are
/// serialized by the owner of the `LightClient`.
#[derive(Debug)]
pub struct LightClient<S, C = SystemClock, V = ProdVotingPowerCalculator> {
    store: S,
    clock: C,
    calculator: V,
}

impl<S: TrustedStateStore> LightClient<S> {
    /// Light client using the wall clock and Ed25519 signature verification
    pub fn with_store(store: S) -> Self {
        Self::new(store, SystemClock, ProdVotingPowerCalculator::default())
    }
}

impl<S, C, V> LightClient<S, C, V>
where
    S: TrustedStateStore,
    C: Clock,
    V: VotingPowerCalculator,
{
    /// Creates a light client
    pub const fn new(store: S, clock: C, calculator: V) -> Self {
        Self {
            store,
            clock,
            calculator,
        }
    }

    /// Registers a client for `client_state.chain_id` with its initial
    /// trusted consensus state.
    ///
    /// # Errors
    /// Returns an error if the client state is invalid, the consensus state
    /// is not at the latest height, a client already exists for the chain,
    /// or the store fails
    pub fn create_client(
        &mut self,
        client_state: ClientState,
        consensus_state: ConsensusState,
    ) -> Result<(), UpdateClientError> {
        client_state.validate()?;
        ensure!(
            consensus_state.height == client_state.latest_height,
            UpdateClientError::InvalidClientState {
                reason: format!(
                    "consensus state height {} does not match latest height {}",
                    consensus_state.height, client_state.latest_height
                ),
            }
        );
        ensure!(
            client_state.frozen_height.is_none(),
            UpdateClientError::InvalidClientState {
                reason: "client cannot be created frozen".into(),
            }
        );

        let chain_id = client_state.chain_id.clone();
        ensure!(
            self.store.client_state(&chain_id)?.is_none(),
            UpdateClientError::ClientAlreadyExists { chain_id }
        );

        tracing::info!(
            chain_id = %chain_id,
            height = consensus_state.height,
            "creating client"
        );
        self.store
            .commit_update(&chain_id, client_state, consensus_state)?;
        Ok(())
    }

    /// Verifies `header` and, if it is new, persists the resulting client
    /// and consensus states in one store commit. A no-op header whose height
    /// is above the stored latest height still advances the client state.
    ///
    /// # Errors
    /// Returns an error if the client does not exist, the header is
    /// rejected (see [`check_header_and_update_state`]) or the store fails.
    /// Nothing is written on error.
    pub fn update_client(
        &mut self,
        chain_id: &str,
        header: &Header,
    ) -> Result<UpdateClientOutput, UpdateClientError> {
        let client_state = self.client_state(chain_id)?;
        let now = self.clock.now();

        let output =
            check_header_and_update_state(&client_state, &self.store, header, now, &self.calculator)
                .inspect_err(|e| {
                    tracing::warn!(
                        chain_id,
                        height = header.height(),
                        terminal = e.is_terminal(),
                        "header rejected: {e}"
                    );
                })?;

        if output.result == UpdateResult::UpdateSuccess {
            self.store.commit_update(
                chain_id,
                output.client_state.clone(),
                output.consensus_state.clone(),
            )?;
            tracing::info!(
                chain_id,
                height = output.height,
                trusted_height = output.trusted_height,
                latest_height = output.client_state.latest_height,
                "client updated"
            );
        } else if output.client_state != client_state {
            self.store
                .set_client_state(chain_id, output.client_state.clone())?;
            tracing::info!(
                chain_id,
                latest_height = output.client_state.latest_height,
                "latest height caught up with trusted consensus state"
            );
        }

        Ok(output)
    }

    /// Current status of the client of `chain_id`
    ///
    /// # Errors
    /// Returns an error if the client does not exist or the store fails
    pub fn status(&self, chain_id: &str) -> Result<ClientStatus, UpdateClientError> {
        let client_state = self.client_state(chain_id)?;
        if client_state.is_frozen() {
            return Ok(ClientStatus::Frozen);
        }

        let latest = self
            .store
            .consensus_state(chain_id, client_state.latest_height)?
            .ok_or(UpdateClientError::NoTrustedAnchor {
                height: client_state.latest_height,
            })?;

        if client_state.is_expired(latest.timestamp, self.clock.now()) {
            return Ok(ClientStatus::Expired);
        }
        Ok(ClientStatus::Active)
    }

    /// Freezes the client of `chain_id` at `height`, after misbehaviour
    /// such as a [`UpdateClientError::ConflictingUpdate`] has been
    /// established. A frozen client rejects all updates.
    ///
    /// # Errors
    /// Returns an error if the client does not exist, is already frozen or
    /// the store fails
    pub fn freeze_client(
        &mut self,
        chain_id: &str,
        height: u64,
    ) -> Result<ClientState, UpdateClientError> {
        let client_state = self.client_state(chain_id)?;
        if let Some(frozen_height) = client_state.frozen_height {
            return Err(UpdateClientError::ClientFrozen { frozen_height });
        }

        let frozen = ClientState {
            frozen_height: Some(height),
            ..client_state
        };
        self.store.set_client_state(chain_id, frozen.clone())?;
        tracing::warn!(chain_id, height, "client frozen");
        Ok(frozen)
    }

    /// Client state of `chain_id`
    ///
    /// # Errors
    /// Returns an error if the client does not exist or the store fails
    pub fn client_state(&self, chain_id: &str) -> Result<ClientState, UpdateClientError> {
        self.store
            .client_state(chain_id)?
            .ok_or_else(|| UpdateClientError::ClientNotFound {
                chain_id: chain_id.to_string(),
            })
    }

    /// The underlying store
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// The clock, mutable so tests can move time
    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// Consumes the client, returning the store
    pub fn into_store(self) -> S {
        self.store
    }
}
