//! Chain client interfaces consumed by the bridge executor
//!
//! The executor never talks RPC directly; it goes through these traits.
//! The home chain hosts the action-id multisig contract (propose / sign /
//! quorum / perform), the foreign chain additionally exposes the
//! message-hash transfer execution surface. Concrete implementations are
//! wired in by the embedding process.

use crate::batch::TransferBatch;
use crate::error::BridgeResult;

use async_trait::async_trait;
use ethers::types::H256;

/// Action id assigned by a multisig contract to a proposed action.
pub type ActionId = u64;

/// Sentinel returned when an action id could not be fetched.
pub const INVALID_ACTION_ID: ActionId = 0;

/// Operations common to both chains of the bridge.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Returns the currently pending batch, if any.
    async fn get_pending_batch(&self) -> BridgeResult<Option<TransferBatch>>;

    /// Fetches a specific batch by its id.
    async fn get_batch(&self, batch_id: u64) -> BridgeResult<TransferBatch>;

    /// Last batch id originating on the opposite chain that this chain
    /// finished executing.
    async fn get_last_executed_batch_id(&self) -> BridgeResult<u64>;

    /// Last deposit nonce this chain executed.
    async fn get_last_executed_deposit_nonce(&self) -> BridgeResult<u64>;

    async fn was_transfer_proposed(&self, batch: &TransferBatch) -> BridgeResult<bool>;

    async fn propose_transfer(&self, batch: &TransferBatch) -> BridgeResult<H256>;

    async fn was_set_status_proposed(&self, batch: &TransferBatch) -> BridgeResult<bool>;

    async fn propose_set_status(&self, batch: &TransferBatch) -> BridgeResult<H256>;

    async fn get_action_id_for_propose_transfer(
        &self,
        batch: &TransferBatch,
    ) -> BridgeResult<ActionId>;

    async fn get_action_id_for_set_status(&self, batch: &TransferBatch)
        -> BridgeResult<ActionId>;

    /// Whether this relayer already signed the action.
    async fn was_signed(&self, action_id: ActionId) -> BridgeResult<bool>;

    /// Generates and submits this relayer's signature for the action.
    async fn sign(&self, action_id: ActionId) -> BridgeResult<H256>;

    /// Whether the contract accumulated at least quorum signatures.
    async fn quorum_reached(&self, action_id: ActionId) -> BridgeResult<bool>;

    async fn was_action_executed(&self, action_id: ActionId) -> BridgeResult<bool>;

    async fn perform_action(
        &self,
        action_id: ActionId,
        batch: &TransferBatch,
    ) -> BridgeResult<H256>;

    /// Final per-deposit statuses for an executed batch; empty while the
    /// execution has not settled yet.
    async fn get_transactions_statuses(&self, batch_id: u64) -> BridgeResult<Vec<u8>>;

    /// Self availability probe.
    async fn check_client_availability(&self) -> BridgeResult<()>;
}

/// Extra surface of the foreign chain: batch transfers are executed there
/// against a message hash signed out-of-band by the relayer set.
#[async_trait]
pub trait ForeignChainClient: ChainClient {
    /// Deterministic digest of a batch, the unit of signature collection.
    fn generate_message_hash(&self, batch: &TransferBatch) -> BridgeResult<H256>;

    /// Hands this relayer's signature for the hash to the P2P broadcaster.
    fn broadcast_signature_for_message_hash(&self, message_hash: H256);

    async fn get_quorum_size(&self) -> BridgeResult<u64>;

    /// Submits the execute-transfer call carrying the accumulated signatures.
    async fn execute_transfer(
        &self,
        message_hash: H256,
        batch: &TransferBatch,
        quorum_size: u64,
    ) -> BridgeResult<H256>;

    /// Quorum check keyed by message hash rather than action id.
    async fn is_quorum_reached_for_hash(&self, message_hash: H256) -> BridgeResult<bool>;

    async fn was_transfer_executed(&self, batch_id: u64) -> BridgeResult<bool>;
}

/// External validation gate consulted before a batch is acted upon.
#[async_trait]
pub trait BatchValidator: Send + Sync {
    async fn validate_batch(&self, batch: &TransferBatch) -> BridgeResult<bool>;
}
