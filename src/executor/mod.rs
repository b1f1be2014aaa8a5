//! Bridge executor - the facade every step talks to
//!
//! The executor owns the per-batch context (stored batch, action id,
//! message hash, retry counters) and delegates all chain I/O to the two
//! chain clients. It is the only component with chain access; steps are
//! pure control flow over the [`BridgeOperations`] surface.

use crate::batch::TransferBatch;
use crate::chain::{ActionId, BatchValidator, ChainClient, ForeignChainClient};
use crate::error::{BridgeError, BridgeResult};
use crate::metrics::StatusHandler;
use crate::signatures::SignaturesHolder;
use crate::topology::TopologyProvider;

use async_trait::async_trait;
use ethers::types::H256;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Number of sub-intervals the wait-on-foreign window is divided into.
const SPLITS: u32 = 10;

const MIN_RETRIES: u64 = 1;
const MIN_TIME_FOR_WAIT: Duration = Duration::from_secs(1);

/// The operation surface the steps are written against. Implemented by
/// [`BridgeExecutor`] and by the test stub.
///
/// Kept as one wide facade on purpose: several operations (batch storage,
/// status resolution) span both chains, so splitting along chain lines
/// would cut through the context.
#[async_trait]
pub trait BridgeOperations: Send {
    // leadership
    fn my_turn_as_leader_on_home(&mut self) -> bool;
    fn my_turn_as_leader_on_foreign(&mut self) -> bool;

    // batch acquisition and storage
    async fn get_pending_batch_from_foreign(&mut self) -> BridgeResult<Option<TransferBatch>>;
    fn store_batch(&mut self, batch: TransferBatch);
    async fn get_and_store_batch_from_home(&mut self, nonce: u64) -> BridgeResult<()>;
    fn stored_batch(&self) -> Option<&TransferBatch>;
    async fn get_last_executed_batch_id_from_foreign(&mut self) -> BridgeResult<u64>;

    // deposit nonce continuity, checked against the receiving chain
    async fn verify_deposit_nonces_against_home(&mut self) -> BridgeResult<()>;
    async fn verify_deposit_nonces_against_foreign(&mut self) -> BridgeResult<()>;

    // action id lifecycle
    async fn get_and_store_action_id_for_propose_transfer_on_home(
        &mut self,
    ) -> BridgeResult<ActionId>;
    async fn get_and_store_action_id_for_set_status_on_home(&mut self) -> BridgeResult<ActionId>;
    async fn get_and_store_action_id_for_set_status_on_foreign(
        &mut self,
    ) -> BridgeResult<ActionId>;
    fn stored_action_id(&self) -> ActionId;

    // proposal and signing on the home chain
    async fn was_transfer_proposed_on_home(&mut self) -> BridgeResult<bool>;
    async fn propose_transfer_on_home(&mut self) -> BridgeResult<()>;
    async fn was_set_status_proposed_on_home(&mut self) -> BridgeResult<bool>;
    async fn propose_set_status_on_home(&mut self) -> BridgeResult<()>;
    async fn was_action_signed_on_home(&mut self) -> BridgeResult<bool>;
    async fn sign_action_on_home(&mut self) -> BridgeResult<()>;
    async fn quorum_reached_on_home(&mut self) -> BridgeResult<bool>;
    async fn was_action_performed_on_home(&mut self) -> BridgeResult<bool>;
    async fn perform_action_on_home(&mut self) -> BridgeResult<()>;

    // set-status on the foreign chain
    async fn was_set_status_proposed_on_foreign(&mut self) -> BridgeResult<bool>;
    async fn propose_set_status_on_foreign(&mut self) -> BridgeResult<()>;
    async fn was_action_signed_on_foreign(&mut self) -> BridgeResult<bool>;
    async fn sign_action_on_foreign(&mut self) -> BridgeResult<()>;
    async fn quorum_reached_on_foreign(&mut self) -> BridgeResult<bool>;
    async fn was_action_performed_on_foreign(&mut self) -> BridgeResult<bool>;
    async fn perform_action_on_foreign(&mut self) -> BridgeResult<()>;

    // transfer execution on the foreign chain
    async fn was_transfer_performed_on_foreign(&mut self) -> BridgeResult<bool>;
    async fn sign_transfer_on_foreign(&mut self) -> BridgeResult<()>;
    async fn perform_transfer_on_foreign(&mut self) -> BridgeResult<()>;
    async fn is_transfer_quorum_reached_on_foreign(&mut self) -> BridgeResult<bool>;

    // timed waits
    async fn wait_for_transfer_confirmation(&mut self);
    async fn wait_and_return_final_batch_statuses_from_foreign(&mut self) -> Option<Vec<u8>>;
    async fn wait_and_return_final_batch_statuses_from_home(&mut self) -> Option<Vec<u8>>;

    // post execution
    fn resolve_new_deposits_statuses(&mut self, num_deposits: usize);
    fn set_stored_batch_statuses(&mut self, statuses: &[u8]);
    fn clear_stored_p2p_signatures(&mut self);
    async fn validate_stored_batch(&mut self) -> BridgeResult<bool>;
    async fn check_foreign_client_availability(&mut self) -> BridgeResult<()>;
    async fn check_home_client_availability(&mut self) -> BridgeResult<()>;

    // bounded retry counters
    fn process_max_quorum_retries_on_home(&mut self) -> bool;
    fn reset_quorum_retries_on_home(&mut self);
    fn process_max_quorum_retries_on_foreign(&mut self) -> bool;
    fn reset_quorum_retries_on_foreign(&mut self);
    fn process_max_was_proposed_retries(&mut self) -> bool;
    fn reset_was_proposed_retries(&mut self);
}

/// Retry bounds and wait windows for one executor.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    pub time_for_wait_on_foreign: Duration,
    pub max_quorum_retries_on_foreign: u64,
    pub max_quorum_retries_on_home: u64,
    pub max_retries_on_was_proposed: u64,
}

/// Collaborators for [`BridgeExecutor::new`]. All handles are required;
/// there is no nullable dependency.
pub struct BridgeExecutorArgs {
    pub foreign_client: Arc<dyn ForeignChainClient>,
    pub home_client: Arc<dyn ChainClient>,
    pub topology_on_foreign: Arc<dyn TopologyProvider>,
    pub topology_on_home: Arc<dyn TopologyProvider>,
    pub signatures_holder: Arc<dyn SignaturesHolder>,
    pub batch_validator: Arc<dyn BatchValidator>,
    pub status_handler: Arc<StatusHandler>,
    pub cancellation: CancellationToken,
    pub config: ExecutorConfig,
}

/// The production implementation of [`BridgeOperations`], shared by both
/// bridge directions with different step graphs on top.
pub struct BridgeExecutor {
    foreign_client: Arc<dyn ForeignChainClient>,
    home_client: Arc<dyn ChainClient>,
    topology_on_foreign: Arc<dyn TopologyProvider>,
    topology_on_home: Arc<dyn TopologyProvider>,
    signatures_holder: Arc<dyn SignaturesHolder>,
    batch_validator: Arc<dyn BatchValidator>,
    status: Arc<StatusHandler>,
    cancellation: CancellationToken,
    time_for_wait_on_foreign: Duration,
    max_quorum_retries_on_foreign: u64,
    max_quorum_retries_on_home: u64,
    max_retries_on_was_proposed: u64,

    batch: Option<TransferBatch>,
    action_id: ActionId,
    message_hash: H256,
    quorum_retries_on_foreign: u64,
    quorum_retries_on_home: u64,
    retries_on_was_proposed: u64,
}

impl BridgeExecutor {
    pub fn new(args: BridgeExecutorArgs) -> BridgeResult<Self> {
        let config = &args.config;
        if config.time_for_wait_on_foreign < MIN_TIME_FOR_WAIT {
            return Err(BridgeError::InvalidDuration {
                name: "time_for_wait_on_foreign",
                got_millis: config.time_for_wait_on_foreign.as_millis(),
                minimum_millis: MIN_TIME_FOR_WAIT.as_millis(),
            });
        }
        check_retry_bound(
            "max_quorum_retries_on_foreign",
            config.max_quorum_retries_on_foreign,
        )?;
        check_retry_bound("max_quorum_retries_on_home", config.max_quorum_retries_on_home)?;
        check_retry_bound(
            "max_retries_on_was_proposed",
            config.max_retries_on_was_proposed,
        )?;

        Ok(Self {
            foreign_client: args.foreign_client,
            home_client: args.home_client,
            topology_on_foreign: args.topology_on_foreign,
            topology_on_home: args.topology_on_home,
            signatures_holder: args.signatures_holder,
            batch_validator: args.batch_validator,
            status: args.status_handler,
            cancellation: args.cancellation,
            time_for_wait_on_foreign: args.config.time_for_wait_on_foreign,
            max_quorum_retries_on_foreign: args.config.max_quorum_retries_on_foreign,
            max_quorum_retries_on_home: args.config.max_quorum_retries_on_home,
            max_retries_on_was_proposed: args.config.max_retries_on_was_proposed,
            batch: None,
            action_id: crate::chain::INVALID_ACTION_ID,
            message_hash: H256::zero(),
            quorum_retries_on_foreign: 0,
            quorum_retries_on_home: 0,
            retries_on_was_proposed: 0,
        })
    }

    fn require_batch(&self) -> BridgeResult<&TransferBatch> {
        self.batch.as_ref().ok_or(BridgeError::NilBatch)
    }

    /// Records failed operations in the `last_error` status metric.
    fn noted<T>(&self, operation: &str, result: BridgeResult<T>) -> BridgeResult<T> {
        if let Err(err) = &result {
            self.status.set_last_error(format!("{}: {}", operation, err));
        }
        result
    }

    /// One sub-interval of the wait-on-foreign window. Returns false when
    /// the relayer is shutting down.
    async fn wait_tick(&self) -> bool {
        let interval = self.time_for_wait_on_foreign / SPLITS;
        tokio::select! {
            _ = self.cancellation.cancelled() => {
                debug!("closing timed wait due to cancellation");
                false
            }
            _ = tokio::time::sleep(interval) => true,
        }
    }

    async fn wait_and_return_final_batch_statuses(
        &self,
        client: &dyn ChainClient,
    ) -> Option<Vec<u8>> {
        for _ in 0..SPLITS {
            if !self.wait_tick().await {
                return None;
            }

            let batch_id = match self.require_batch() {
                Ok(batch) => batch.id,
                Err(_) => return None,
            };
            match client.get_transactions_statuses(batch_id).await {
                Ok(statuses) if !statuses.is_empty() => {
                    debug!("fetched final batch statuses {}", hex::encode(&statuses));
                    return Some(statuses);
                }
                Ok(_) => debug!("no batch status available yet"),
                Err(err) => debug!("error while fetching batch statuses: {}", err),
            }
        }

        None
    }
}

fn check_retry_bound(name: &'static str, value: u64) -> BridgeResult<()> {
    if value < MIN_RETRIES {
        return Err(BridgeError::InvalidValue {
            name,
            got: value,
            minimum: MIN_RETRIES,
        });
    }
    Ok(())
}

fn verify_deposit_nonces(batch: &TransferBatch, last_executed_nonce: u64) -> BridgeResult<()> {
    let mut expected = last_executed_nonce + 1;
    for deposit in &batch.deposits {
        if deposit.nonce != expected {
            return Err(BridgeError::InvalidDepositNonce {
                deposit: deposit.to_string(),
                nonce: deposit.nonce,
                expected,
            });
        }
        expected += 1;
    }

    Ok(())
}

#[async_trait]
impl BridgeOperations for BridgeExecutor {
    fn my_turn_as_leader_on_home(&mut self) -> bool {
        self.topology_on_home.my_turn_as_leader()
    }

    fn my_turn_as_leader_on_foreign(&mut self) -> bool {
        self.topology_on_foreign.my_turn_as_leader()
    }

    async fn get_pending_batch_from_foreign(&mut self) -> BridgeResult<Option<TransferBatch>> {
        let result = self.foreign_client.get_pending_batch().await;
        if let Ok(Some(batch)) = &result {
            self.status.set_num_batches(batch.id.saturating_sub(1));
        }
        self.noted("get_pending_batch_from_foreign", result)
    }

    fn store_batch(&mut self, batch: TransferBatch) {
        self.batch = Some(batch);
    }

    async fn get_and_store_batch_from_home(&mut self, nonce: u64) -> BridgeResult<()> {
        let result = async {
            let batch = self.home_client.get_batch(nonce).await?;
            if batch.id != nonce || batch.deposits.is_empty() {
                return Err(BridgeError::BatchNotFound {
                    requested: nonce,
                    fetched: batch.id,
                    num_deposits: batch.deposits.len(),
                });
            }
            Ok(batch)
        }
        .await;

        match self.noted("get_and_store_batch_from_home", result) {
            Ok(batch) => {
                info!("got batch {} from the home chain", batch.id);
                self.batch = Some(batch);
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    fn stored_batch(&self) -> Option<&TransferBatch> {
        self.batch.as_ref()
    }

    async fn get_last_executed_batch_id_from_foreign(&mut self) -> BridgeResult<u64> {
        let result = self.foreign_client.get_last_executed_batch_id().await;
        if let Ok(batch_id) = &result {
            self.status.set_num_batches(*batch_id);
        }
        self.noted("get_last_executed_batch_id_from_foreign", result)
    }

    async fn verify_deposit_nonces_against_home(&mut self) -> BridgeResult<()> {
        let result = async {
            let batch = self.require_batch()?;
            let last_nonce = self.home_client.get_last_executed_deposit_nonce().await?;
            verify_deposit_nonces(batch, last_nonce)
        }
        .await;
        self.noted("verify_deposit_nonces_against_home", result)
    }

    async fn verify_deposit_nonces_against_foreign(&mut self) -> BridgeResult<()> {
        let result = async {
            let batch = self.require_batch()?;
            let last_nonce = self
                .foreign_client
                .get_last_executed_deposit_nonce()
                .await?;
            verify_deposit_nonces(batch, last_nonce)
        }
        .await;
        self.noted("verify_deposit_nonces_against_foreign", result)
    }

    async fn get_and_store_action_id_for_propose_transfer_on_home(
        &mut self,
    ) -> BridgeResult<ActionId> {
        let result = async {
            let batch = self.require_batch()?;
            self.home_client
                .get_action_id_for_propose_transfer(batch)
                .await
        }
        .await;
        let action_id = self.noted("get_and_store_action_id_for_propose_transfer_on_home", result)?;
        self.action_id = action_id;
        Ok(action_id)
    }

    async fn get_and_store_action_id_for_set_status_on_home(&mut self) -> BridgeResult<ActionId> {
        let result = async {
            let batch = self.require_batch()?;
            self.home_client.get_action_id_for_set_status(batch).await
        }
        .await;
        let action_id = self.noted("get_and_store_action_id_for_set_status_on_home", result)?;
        self.action_id = action_id;
        Ok(action_id)
    }

    async fn get_and_store_action_id_for_set_status_on_foreign(
        &mut self,
    ) -> BridgeResult<ActionId> {
        let result = async {
            let batch = self.require_batch()?;
            self.foreign_client
                .get_action_id_for_set_status(batch)
                .await
        }
        .await;
        let action_id =
            self.noted("get_and_store_action_id_for_set_status_on_foreign", result)?;
        self.action_id = action_id;
        Ok(action_id)
    }

    fn stored_action_id(&self) -> ActionId {
        self.action_id
    }

    async fn was_transfer_proposed_on_home(&mut self) -> BridgeResult<bool> {
        let result = async {
            let batch = self.require_batch()?;
            self.home_client.was_transfer_proposed(batch).await
        }
        .await;
        self.noted("was_transfer_proposed_on_home", result)
    }

    async fn propose_transfer_on_home(&mut self) -> BridgeResult<()> {
        let result = async {
            let batch = self.require_batch()?;
            let hash = self.home_client.propose_transfer(batch).await?;
            info!(
                "proposed transfer on home, tx hash {:?}, batch id {}, action id {}",
                hash, batch.id, self.action_id
            );
            Ok(())
        }
        .await;
        self.noted("propose_transfer_on_home", result)
    }

    async fn was_set_status_proposed_on_home(&mut self) -> BridgeResult<bool> {
        let result = async {
            let batch = self.require_batch()?;
            self.home_client.was_set_status_proposed(batch).await
        }
        .await;
        self.noted("was_set_status_proposed_on_home", result)
    }

    async fn propose_set_status_on_home(&mut self) -> BridgeResult<()> {
        let result = async {
            let batch = self.require_batch()?;
            let hash = self.home_client.propose_set_status(batch).await?;
            info!(
                "proposed set status on home, tx hash {:?}, batch id {}",
                hash, batch.id
            );
            Ok(())
        }
        .await;
        self.noted("propose_set_status_on_home", result)
    }

    async fn was_action_signed_on_home(&mut self) -> BridgeResult<bool> {
        let result = self.home_client.was_signed(self.action_id).await;
        self.noted("was_action_signed_on_home", result)
    }

    async fn sign_action_on_home(&mut self) -> BridgeResult<()> {
        let result = async {
            let hash = self.home_client.sign(self.action_id).await?;
            info!(
                "signed proposed action on home, tx hash {:?}, action id {}",
                hash, self.action_id
            );
            Ok(())
        }
        .await;
        self.noted("sign_action_on_home", result)
    }

    async fn quorum_reached_on_home(&mut self) -> BridgeResult<bool> {
        let result = self.home_client.quorum_reached(self.action_id).await;
        self.noted("quorum_reached_on_home", result)
    }

    async fn was_action_performed_on_home(&mut self) -> BridgeResult<bool> {
        let result = self.home_client.was_action_executed(self.action_id).await;
        self.noted("was_action_performed_on_home", result)
    }

    async fn perform_action_on_home(&mut self) -> BridgeResult<()> {
        let result = async {
            let batch = self.require_batch()?;
            let hash = self.home_client.perform_action(self.action_id, batch).await?;
            info!(
                "sent perform action on home, tx hash {:?}, batch id {}, action id {}",
                hash, batch.id, self.action_id
            );
            Ok(())
        }
        .await;
        self.noted("perform_action_on_home", result)
    }

    async fn was_set_status_proposed_on_foreign(&mut self) -> BridgeResult<bool> {
        let result = async {
            let batch = self.require_batch()?;
            self.foreign_client.was_set_status_proposed(batch).await
        }
        .await;
        self.noted("was_set_status_proposed_on_foreign", result)
    }

    async fn propose_set_status_on_foreign(&mut self) -> BridgeResult<()> {
        let result = async {
            let batch = self.require_batch()?;
            let hash = self.foreign_client.propose_set_status(batch).await?;
            info!(
                "proposed set status on foreign, tx hash {:?}, batch id {}",
                hash, batch.id
            );
            Ok(())
        }
        .await;
        self.noted("propose_set_status_on_foreign", result)
    }

    async fn was_action_signed_on_foreign(&mut self) -> BridgeResult<bool> {
        let result = self.foreign_client.was_signed(self.action_id).await;
        self.noted("was_action_signed_on_foreign", result)
    }

    async fn sign_action_on_foreign(&mut self) -> BridgeResult<()> {
        let result = async {
            let hash = self.foreign_client.sign(self.action_id).await?;
            info!(
                "signed proposed action on foreign, tx hash {:?}, action id {}",
                hash, self.action_id
            );
            Ok(())
        }
        .await;
        self.noted("sign_action_on_foreign", result)
    }

    async fn quorum_reached_on_foreign(&mut self) -> BridgeResult<bool> {
        let result = self.foreign_client.quorum_reached(self.action_id).await;
        self.noted("quorum_reached_on_foreign", result)
    }

    async fn was_action_performed_on_foreign(&mut self) -> BridgeResult<bool> {
        let result = self.foreign_client.was_action_executed(self.action_id).await;
        self.noted("was_action_performed_on_foreign", result)
    }

    async fn perform_action_on_foreign(&mut self) -> BridgeResult<()> {
        let result = async {
            let batch = self.require_batch()?;
            let hash = self
                .foreign_client
                .perform_action(self.action_id, batch)
                .await?;
            info!(
                "sent perform action on foreign, tx hash {:?}, batch id {}, action id {}",
                hash, batch.id, self.action_id
            );
            Ok(())
        }
        .await;
        self.noted("perform_action_on_foreign", result)
    }

    async fn was_transfer_performed_on_foreign(&mut self) -> BridgeResult<bool> {
        let result = async {
            let batch = self.require_batch()?;
            self.foreign_client.was_transfer_executed(batch.id).await
        }
        .await;
        self.noted("was_transfer_performed_on_foreign", result)
    }

    async fn sign_transfer_on_foreign(&mut self) -> BridgeResult<()> {
        let result = async {
            let batch = self.require_batch()?;
            let hash = self.foreign_client.generate_message_hash(batch)?;
            info!(
                "generated message hash {:?} for batch id {}",
                hash, batch.id
            );
            self.foreign_client.broadcast_signature_for_message_hash(hash);
            Ok(hash)
        }
        .await;

        match self.noted("sign_transfer_on_foreign", result) {
            Ok(hash) => {
                self.message_hash = hash;
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    async fn perform_transfer_on_foreign(&mut self) -> BridgeResult<()> {
        let result = async {
            let batch = self.require_batch()?;
            let quorum_size = self.foreign_client.get_quorum_size().await?;
            debug!("fetched quorum size {}", quorum_size);

            let hash = self
                .foreign_client
                .execute_transfer(self.message_hash, batch, quorum_size)
                .await?;
            info!(
                "sent execute transfer on foreign, tx hash {:?}, batch id {}",
                hash, batch.id
            );
            Ok(())
        }
        .await;
        self.noted("perform_transfer_on_foreign", result)
    }

    async fn is_transfer_quorum_reached_on_foreign(&mut self) -> BridgeResult<bool> {
        let result = self
            .foreign_client
            .is_quorum_reached_for_hash(self.message_hash)
            .await;
        self.noted("is_transfer_quorum_reached_on_foreign", result)
    }

    async fn wait_for_transfer_confirmation(&mut self) {
        for _ in 0..SPLITS {
            if !self.wait_tick().await {
                return;
            }
            if let Ok(true) = self.was_transfer_performed_on_foreign().await {
                return;
            }
        }
    }

    async fn wait_and_return_final_batch_statuses_from_foreign(&mut self) -> Option<Vec<u8>> {
        let client = self.foreign_client.clone();
        self.wait_and_return_final_batch_statuses(client.as_ref())
            .await
    }

    async fn wait_and_return_final_batch_statuses_from_home(&mut self) -> Option<Vec<u8>> {
        let client = self.home_client.clone();
        self.wait_and_return_final_batch_statuses(client.as_ref())
            .await
    }

    fn resolve_new_deposits_statuses(&mut self, num_deposits: usize) {
        if let Some(batch) = self.batch.as_mut() {
            batch.resolve_new_deposits(num_deposits);
        }
    }

    fn set_stored_batch_statuses(&mut self, statuses: &[u8]) {
        if let Some(batch) = self.batch.as_mut() {
            let kept = batch.statuses.len().min(statuses.len());
            batch.statuses[..kept].copy_from_slice(&statuses[..kept]);
        }
    }

    fn clear_stored_p2p_signatures(&mut self) {
        self.signatures_holder.clear_stored_signatures();
        info!("cleared stored P2P signatures");
    }

    async fn validate_stored_batch(&mut self) -> BridgeResult<bool> {
        let result = async {
            let batch = self.require_batch()?;
            self.batch_validator.validate_batch(batch).await
        }
        .await;
        self.noted("validate_stored_batch", result)
    }

    async fn check_foreign_client_availability(&mut self) -> BridgeResult<()> {
        let result = self.foreign_client.check_client_availability().await;
        self.noted("check_foreign_client_availability", result)
    }

    async fn check_home_client_availability(&mut self) -> BridgeResult<()> {
        let result = self.home_client.check_client_availability().await;
        self.noted("check_home_client_availability", result)
    }

    fn process_max_quorum_retries_on_home(&mut self) -> bool {
        if self.quorum_retries_on_home < self.max_quorum_retries_on_home {
            self.quorum_retries_on_home += 1;
            return false;
        }

        true
    }

    fn reset_quorum_retries_on_home(&mut self) {
        self.quorum_retries_on_home = 0;
    }

    fn process_max_quorum_retries_on_foreign(&mut self) -> bool {
        if self.quorum_retries_on_foreign < self.max_quorum_retries_on_foreign {
            self.quorum_retries_on_foreign += 1;
            return false;
        }

        true
    }

    fn reset_quorum_retries_on_foreign(&mut self) {
        self.quorum_retries_on_foreign = 0;
    }

    fn process_max_was_proposed_retries(&mut self) -> bool {
        if self.retries_on_was_proposed < self.max_retries_on_was_proposed {
            self.retries_on_was_proposed += 1;
            return false;
        }

        true
    }

    fn reset_was_proposed_retries(&mut self) {
        self.retries_on_was_proposed = 0;
    }
}
