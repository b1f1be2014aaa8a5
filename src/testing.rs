//! Shared test doubles and fixtures

use crate::batch::{DepositTransfer, TransferBatch, STATUS_PENDING};
use crate::chain::{ActionId, BatchValidator, ChainClient, ForeignChainClient};
use crate::error::{BridgeError, BridgeResult};
use crate::executor::BridgeOperations;
use crate::signatures::SignaturesHolder;
use crate::topology::TopologyProvider;

use async_trait::async_trait;
use ethers::types::{H256, U256};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

pub(crate) fn test_deposit(nonce: u64) -> DepositTransfer {
    DepositTransfer {
        nonce,
        to: vec![1, 2, 3],
        displayable_to: format!("to{}", nonce),
        from: vec![4, 5, 6],
        displayable_from: format!("from{}", nonce),
        token: vec![7, 8, 9],
        displayable_token: format!("token{}", nonce),
        converted_token: vec![10, 11, 12],
        amount: U256::from(1000 + nonce),
    }
}

/// A two-deposit batch with contiguous nonces starting at 1.
pub(crate) fn test_batch(id: u64) -> TransferBatch {
    TransferBatch {
        id,
        deposits: vec![test_deposit(1), test_deposit(2)],
        statuses: vec![STATUS_PENDING, STATUS_PENDING],
    }
}

pub(crate) struct StubTopology {
    pub leader: bool,
}

impl TopologyProvider for StubTopology {
    fn my_turn_as_leader(&self) -> bool {
        self.leader
    }
}

pub(crate) struct StubValidator {
    pub ok: bool,
}

#[async_trait]
impl BatchValidator for StubValidator {
    async fn validate_batch(&self, _batch: &TransferBatch) -> BridgeResult<bool> {
        Ok(self.ok)
    }
}

#[derive(Default)]
pub(crate) struct StubSignaturesHolder {
    pub clear_calls: AtomicUsize,
}

impl SignaturesHolder for StubSignaturesHolder {
    fn signatures(&self, _message_hash: H256) -> Vec<Vec<u8>> {
        Vec::new()
    }

    fn clear_stored_signatures(&self) {
        self.clear_calls.fetch_add(1, Ordering::SeqCst);
    }
}

/// Configurable chain client double, usable as either side of the bridge.
/// `failing` makes the operation with that name return a transport error.
pub(crate) struct MockChain {
    pub pending_batch: Option<TransferBatch>,
    pub batch_by_id: Option<TransferBatch>,
    pub last_executed_batch_id: u64,
    pub last_executed_deposit_nonce: u64,
    pub action_id: ActionId,
    pub was_transfer_proposed: bool,
    pub was_set_status_proposed: bool,
    pub was_signed: bool,
    pub quorum_reached: bool,
    pub was_action_executed: bool,
    pub transactions_statuses: Vec<u8>,
    pub quorum_size: u64,
    pub hash_quorum_reached: bool,
    pub was_transfer_executed: AtomicBool,
    pub failing: Option<&'static str>,
    pub broadcasts: Mutex<Vec<H256>>,
    pub executed_transfers: Mutex<Vec<(H256, u64)>>,
}

impl Default for MockChain {
    fn default() -> Self {
        Self {
            pending_batch: None,
            batch_by_id: None,
            last_executed_batch_id: 0,
            last_executed_deposit_nonce: 0,
            action_id: 2,
            was_transfer_proposed: false,
            was_set_status_proposed: false,
            was_signed: false,
            quorum_reached: false,
            was_action_executed: false,
            transactions_statuses: Vec::new(),
            quorum_size: 3,
            hash_quorum_reached: false,
            was_transfer_executed: AtomicBool::new(false),
            failing: None,
            broadcasts: Mutex::new(Vec::new()),
            executed_transfers: Mutex::new(Vec::new()),
        }
    }
}

impl MockChain {
    fn maybe_fail(&self, operation: &'static str) -> BridgeResult<()> {
        if self.failing == Some(operation) {
            return Err(BridgeError::Client("expected error".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ChainClient for MockChain {
    async fn get_pending_batch(&self) -> BridgeResult<Option<TransferBatch>> {
        self.maybe_fail("get_pending_batch")?;
        Ok(self.pending_batch.clone())
    }

    async fn get_batch(&self, batch_id: u64) -> BridgeResult<TransferBatch> {
        self.maybe_fail("get_batch")?;
        self.batch_by_id
            .clone()
            .ok_or_else(|| BridgeError::Client(format!("no batch {}", batch_id)))
    }

    async fn get_last_executed_batch_id(&self) -> BridgeResult<u64> {
        self.maybe_fail("get_last_executed_batch_id")?;
        Ok(self.last_executed_batch_id)
    }

    async fn get_last_executed_deposit_nonce(&self) -> BridgeResult<u64> {
        self.maybe_fail("get_last_executed_deposit_nonce")?;
        Ok(self.last_executed_deposit_nonce)
    }

    async fn was_transfer_proposed(&self, _batch: &TransferBatch) -> BridgeResult<bool> {
        self.maybe_fail("was_transfer_proposed")?;
        Ok(self.was_transfer_proposed)
    }

    async fn propose_transfer(&self, _batch: &TransferBatch) -> BridgeResult<H256> {
        self.maybe_fail("propose_transfer")?;
        Ok(H256::repeat_byte(1))
    }

    async fn was_set_status_proposed(&self, _batch: &TransferBatch) -> BridgeResult<bool> {
        self.maybe_fail("was_set_status_proposed")?;
        Ok(self.was_set_status_proposed)
    }

    async fn propose_set_status(&self, _batch: &TransferBatch) -> BridgeResult<H256> {
        self.maybe_fail("propose_set_status")?;
        Ok(H256::repeat_byte(2))
    }

    async fn get_action_id_for_propose_transfer(
        &self,
        _batch: &TransferBatch,
    ) -> BridgeResult<ActionId> {
        self.maybe_fail("get_action_id_for_propose_transfer")?;
        Ok(self.action_id)
    }

    async fn get_action_id_for_set_status(
        &self,
        _batch: &TransferBatch,
    ) -> BridgeResult<ActionId> {
        self.maybe_fail("get_action_id_for_set_status")?;
        Ok(self.action_id)
    }

    async fn was_signed(&self, _action_id: ActionId) -> BridgeResult<bool> {
        self.maybe_fail("was_signed")?;
        Ok(self.was_signed)
    }

    async fn sign(&self, _action_id: ActionId) -> BridgeResult<H256> {
        self.maybe_fail("sign")?;
        Ok(H256::repeat_byte(3))
    }

    async fn quorum_reached(&self, _action_id: ActionId) -> BridgeResult<bool> {
        self.maybe_fail("quorum_reached")?;
        Ok(self.quorum_reached)
    }

    async fn was_action_executed(&self, _action_id: ActionId) -> BridgeResult<bool> {
        self.maybe_fail("was_action_executed")?;
        Ok(self.was_action_executed)
    }

    async fn perform_action(
        &self,
        _action_id: ActionId,
        _batch: &TransferBatch,
    ) -> BridgeResult<H256> {
        self.maybe_fail("perform_action")?;
        Ok(H256::repeat_byte(4))
    }

    async fn get_transactions_statuses(&self, _batch_id: u64) -> BridgeResult<Vec<u8>> {
        self.maybe_fail("get_transactions_statuses")?;
        Ok(self.transactions_statuses.clone())
    }

    async fn check_client_availability(&self) -> BridgeResult<()> {
        self.maybe_fail("check_client_availability")
    }
}

#[async_trait]
impl ForeignChainClient for MockChain {
    fn generate_message_hash(&self, batch: &TransferBatch) -> BridgeResult<H256> {
        if self.failing == Some("generate_message_hash") {
            return Err(BridgeError::Client("expected error".to_string()));
        }
        Ok(H256::from_low_u64_be(batch.id))
    }

    fn broadcast_signature_for_message_hash(&self, message_hash: H256) {
        self.broadcasts.lock().unwrap().push(message_hash);
    }

    async fn get_quorum_size(&self) -> BridgeResult<u64> {
        self.maybe_fail("get_quorum_size")?;
        Ok(self.quorum_size)
    }

    async fn execute_transfer(
        &self,
        message_hash: H256,
        _batch: &TransferBatch,
        quorum_size: u64,
    ) -> BridgeResult<H256> {
        self.maybe_fail("execute_transfer")?;
        self.executed_transfers
            .lock()
            .unwrap()
            .push((message_hash, quorum_size));
        self.was_transfer_executed.store(true, Ordering::SeqCst);
        Ok(H256::repeat_byte(5))
    }

    async fn is_quorum_reached_for_hash(&self, _message_hash: H256) -> BridgeResult<bool> {
        self.maybe_fail("is_quorum_reached_for_hash")?;
        Ok(self.hash_quorum_reached)
    }

    async fn was_transfer_executed(&self, _batch_id: u64) -> BridgeResult<bool> {
        self.maybe_fail("was_transfer_executed")?;
        Ok(self.was_transfer_executed.load(Ordering::SeqCst))
    }
}

/// Flag and counter driven stub of the whole executor surface, used by the
/// step and machine tests. `failing` injects one transport error into the
/// named operation; `last_error` remembers it so tests can detect when the
/// failure actually fired.
pub(crate) struct StubBridge {
    pub batch: Option<TransferBatch>,
    pub pending_batch: Option<TransferBatch>,
    pub failing: Option<&'static str>,
    pub last_error: Option<String>,

    pub my_turn_on_home: bool,
    pub my_turn_on_foreign: bool,
    pub was_transfer_proposed_on_home: bool,
    pub was_set_status_proposed_on_home: bool,
    pub was_set_status_proposed_on_foreign: bool,
    pub was_action_signed_on_home: bool,
    pub was_action_signed_on_foreign: bool,
    pub quorum_on_home: bool,
    pub quorum_on_foreign: bool,
    pub transfer_quorum_on_foreign: bool,
    pub was_action_performed_on_home: bool,
    pub was_action_performed_on_foreign: bool,
    pub was_transfer_performed_on_foreign: bool,
    pub max_quorum_retries_reached_on_home: bool,
    pub max_quorum_retries_reached_on_foreign: bool,
    pub max_was_proposed_retries_reached: bool,
    pub validate_ok: bool,
    pub last_executed_batch_id_on_foreign: u64,
    pub action_id: ActionId,
    pub final_statuses_from_foreign: Option<Vec<u8>>,
    pub final_statuses_from_home: Option<Vec<u8>>,
    /// Makes `wait_for_transfer_confirmation` observe the transfer, the way
    /// the real wait loop does once the leader's submission lands.
    pub confirmation_observes_transfer: bool,

    calls: HashMap<&'static str, usize>,
}

impl StubBridge {
    /// Everything already done on chain: every `was_*` predicate reports
    /// true, quorums are reached, fetches succeed.
    pub fn happy() -> Self {
        Self {
            batch: None,
            pending_batch: Some(test_batch(1)),
            failing: None,
            last_error: None,
            my_turn_on_home: true,
            my_turn_on_foreign: true,
            was_transfer_proposed_on_home: true,
            was_set_status_proposed_on_home: true,
            was_set_status_proposed_on_foreign: true,
            was_action_signed_on_home: true,
            was_action_signed_on_foreign: true,
            quorum_on_home: true,
            quorum_on_foreign: true,
            transfer_quorum_on_foreign: true,
            was_action_performed_on_home: true,
            was_action_performed_on_foreign: true,
            was_transfer_performed_on_foreign: true,
            max_quorum_retries_reached_on_home: false,
            max_quorum_retries_reached_on_foreign: false,
            max_was_proposed_retries_reached: false,
            validate_ok: true,
            last_executed_batch_id_on_foreign: 0,
            action_id: 2,
            final_statuses_from_foreign: Some(vec![3, 4]),
            final_statuses_from_home: Some(vec![3, 3]),
            confirmation_observes_transfer: false,
            calls: HashMap::new(),
        }
    }

    pub fn calls(&self, operation: &'static str) -> usize {
        self.calls.get(operation).copied().unwrap_or(0)
    }

    fn bump(&mut self, operation: &'static str) -> BridgeResult<()> {
        *self.calls.entry(operation).or_insert(0) += 1;
        if self.failing == Some(operation) {
            let err = BridgeError::Client("expected error".to_string());
            self.last_error = Some(format!("{}: {}", operation, err));
            return Err(err);
        }
        Ok(())
    }
}

#[async_trait]
impl BridgeOperations for StubBridge {
    fn my_turn_as_leader_on_home(&mut self) -> bool {
        let _ = self.bump("my_turn_as_leader_on_home");
        self.my_turn_on_home
    }

    fn my_turn_as_leader_on_foreign(&mut self) -> bool {
        let _ = self.bump("my_turn_as_leader_on_foreign");
        self.my_turn_on_foreign
    }

    async fn get_pending_batch_from_foreign(&mut self) -> BridgeResult<Option<TransferBatch>> {
        self.bump("get_pending_batch_from_foreign")?;
        Ok(self.pending_batch.clone())
    }

    fn store_batch(&mut self, batch: TransferBatch) {
        let _ = self.bump("store_batch");
        self.batch = Some(batch);
    }

    async fn get_and_store_batch_from_home(&mut self, _nonce: u64) -> BridgeResult<()> {
        self.bump("get_and_store_batch_from_home")?;
        self.batch = self.pending_batch.clone();
        Ok(())
    }

    fn stored_batch(&self) -> Option<&TransferBatch> {
        self.batch.as_ref()
    }

    async fn get_last_executed_batch_id_from_foreign(&mut self) -> BridgeResult<u64> {
        self.bump("get_last_executed_batch_id_from_foreign")?;
        Ok(self.last_executed_batch_id_on_foreign)
    }

    async fn verify_deposit_nonces_against_home(&mut self) -> BridgeResult<()> {
        self.bump("verify_deposit_nonces_against_home")
    }

    async fn verify_deposit_nonces_against_foreign(&mut self) -> BridgeResult<()> {
        self.bump("verify_deposit_nonces_against_foreign")
    }

    async fn get_and_store_action_id_for_propose_transfer_on_home(
        &mut self,
    ) -> BridgeResult<ActionId> {
        self.bump("get_and_store_action_id_for_propose_transfer_on_home")?;
        Ok(self.action_id)
    }

    async fn get_and_store_action_id_for_set_status_on_home(&mut self) -> BridgeResult<ActionId> {
        self.bump("get_and_store_action_id_for_set_status_on_home")?;
        Ok(self.action_id)
    }

    async fn get_and_store_action_id_for_set_status_on_foreign(
        &mut self,
    ) -> BridgeResult<ActionId> {
        self.bump("get_and_store_action_id_for_set_status_on_foreign")?;
        Ok(self.action_id)
    }

    fn stored_action_id(&self) -> ActionId {
        self.action_id
    }

    async fn was_transfer_proposed_on_home(&mut self) -> BridgeResult<bool> {
        self.bump("was_transfer_proposed_on_home")?;
        Ok(self.was_transfer_proposed_on_home)
    }

    async fn propose_transfer_on_home(&mut self) -> BridgeResult<()> {
        self.bump("propose_transfer_on_home")
    }

    async fn was_set_status_proposed_on_home(&mut self) -> BridgeResult<bool> {
        self.bump("was_set_status_proposed_on_home")?;
        Ok(self.was_set_status_proposed_on_home)
    }

    async fn propose_set_status_on_home(&mut self) -> BridgeResult<()> {
        self.bump("propose_set_status_on_home")
    }

    async fn was_action_signed_on_home(&mut self) -> BridgeResult<bool> {
        self.bump("was_action_signed_on_home")?;
        Ok(self.was_action_signed_on_home)
    }

    async fn sign_action_on_home(&mut self) -> BridgeResult<()> {
        self.bump("sign_action_on_home")
    }

    async fn quorum_reached_on_home(&mut self) -> BridgeResult<bool> {
        self.bump("quorum_reached_on_home")?;
        Ok(self.quorum_on_home)
    }

    async fn was_action_performed_on_home(&mut self) -> BridgeResult<bool> {
        self.bump("was_action_performed_on_home")?;
        Ok(self.was_action_performed_on_home)
    }

    async fn perform_action_on_home(&mut self) -> BridgeResult<()> {
        self.bump("perform_action_on_home")?;
        self.was_action_performed_on_home = true;
        Ok(())
    }

    async fn was_set_status_proposed_on_foreign(&mut self) -> BridgeResult<bool> {
        self.bump("was_set_status_proposed_on_foreign")?;
        Ok(self.was_set_status_proposed_on_foreign)
    }

    async fn propose_set_status_on_foreign(&mut self) -> BridgeResult<()> {
        self.bump("propose_set_status_on_foreign")
    }

    async fn was_action_signed_on_foreign(&mut self) -> BridgeResult<bool> {
        self.bump("was_action_signed_on_foreign")?;
        Ok(self.was_action_signed_on_foreign)
    }

    async fn sign_action_on_foreign(&mut self) -> BridgeResult<()> {
        self.bump("sign_action_on_foreign")
    }

    async fn quorum_reached_on_foreign(&mut self) -> BridgeResult<bool> {
        self.bump("quorum_reached_on_foreign")?;
        Ok(self.quorum_on_foreign)
    }

    async fn was_action_performed_on_foreign(&mut self) -> BridgeResult<bool> {
        self.bump("was_action_performed_on_foreign")?;
        Ok(self.was_action_performed_on_foreign)
    }

    async fn perform_action_on_foreign(&mut self) -> BridgeResult<()> {
        self.bump("perform_action_on_foreign")?;
        self.was_action_performed_on_foreign = true;
        Ok(())
    }

    async fn was_transfer_performed_on_foreign(&mut self) -> BridgeResult<bool> {
        self.bump("was_transfer_performed_on_foreign")?;
        Ok(self.was_transfer_performed_on_foreign)
    }

    async fn sign_transfer_on_foreign(&mut self) -> BridgeResult<()> {
        self.bump("sign_transfer_on_foreign")
    }

    async fn perform_transfer_on_foreign(&mut self) -> BridgeResult<()> {
        self.bump("perform_transfer_on_foreign")
    }

    async fn is_transfer_quorum_reached_on_foreign(&mut self) -> BridgeResult<bool> {
        self.bump("is_transfer_quorum_reached_on_foreign")?;
        Ok(self.transfer_quorum_on_foreign)
    }

    async fn wait_for_transfer_confirmation(&mut self) {
        let _ = self.bump("wait_for_transfer_confirmation");
        if self.confirmation_observes_transfer {
            self.was_transfer_performed_on_foreign = true;
        }
    }

    async fn wait_and_return_final_batch_statuses_from_foreign(&mut self) -> Option<Vec<u8>> {
        let _ = self.bump("wait_and_return_final_batch_statuses_from_foreign");
        self.final_statuses_from_foreign.clone()
    }

    async fn wait_and_return_final_batch_statuses_from_home(&mut self) -> Option<Vec<u8>> {
        let _ = self.bump("wait_and_return_final_batch_statuses_from_home");
        self.final_statuses_from_home.clone()
    }

    fn resolve_new_deposits_statuses(&mut self, num_deposits: usize) {
        let _ = self.bump("resolve_new_deposits_statuses");
        if let Some(batch) = self.batch.as_mut() {
            batch.resolve_new_deposits(num_deposits);
        }
    }

    fn set_stored_batch_statuses(&mut self, statuses: &[u8]) {
        let _ = self.bump("set_stored_batch_statuses");
        if let Some(batch) = self.batch.as_mut() {
            let kept = batch.statuses.len().min(statuses.len());
            batch.statuses[..kept].copy_from_slice(&statuses[..kept]);
        }
    }

    fn clear_stored_p2p_signatures(&mut self) {
        let _ = self.bump("clear_stored_p2p_signatures");
    }

    async fn validate_stored_batch(&mut self) -> BridgeResult<bool> {
        self.bump("validate_stored_batch")?;
        Ok(self.validate_ok)
    }

    async fn check_foreign_client_availability(&mut self) -> BridgeResult<()> {
        self.bump("check_foreign_client_availability")
    }

    async fn check_home_client_availability(&mut self) -> BridgeResult<()> {
        self.bump("check_home_client_availability")
    }

    fn process_max_quorum_retries_on_home(&mut self) -> bool {
        let _ = self.bump("process_max_quorum_retries_on_home");
        self.max_quorum_retries_reached_on_home
    }

    fn reset_quorum_retries_on_home(&mut self) {
        let _ = self.bump("reset_quorum_retries_on_home");
    }

    fn process_max_quorum_retries_on_foreign(&mut self) -> bool {
        let _ = self.bump("process_max_quorum_retries_on_foreign");
        self.max_quorum_retries_reached_on_foreign
    }

    fn reset_quorum_retries_on_foreign(&mut self) {
        let _ = self.bump("reset_quorum_retries_on_foreign");
    }

    fn process_max_was_proposed_retries(&mut self) -> bool {
        let _ = self.bump("process_max_was_proposed_retries");
        self.max_was_proposed_retries_reached
    }

    fn reset_was_proposed_retries(&mut self) {
        let _ = self.bump("reset_was_proposed_retries");
    }
}
