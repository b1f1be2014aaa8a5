//! Home→foreign direction: a batch pending on the home chain is executed
//! on the foreign chain against collected peer signatures, then the final
//! statuses are reported back through the home multisig.

use super::Step;
use crate::executor::BridgeOperations;

use async_trait::async_trait;
use std::fmt;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HomeToForeignStep {
    GetPending,
    SignTransfer,
    WaitForTransferQuorum,
    PerformTransfer,
    WaitTransferConfirmation,
    ResolveSetStatus,
    ProposeSetStatus,
    SignProposedSetStatus,
    WaitForSetStatusQuorum,
    PerformSetStatus,
}

impl fmt::Display for HomeToForeignStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::GetPending => "GettingPendingBatchFromHome",
            Self::SignTransfer => "SigningTransferOnForeign",
            Self::WaitForTransferQuorum => "WaitingForQuorumOnForeign",
            Self::PerformTransfer => "PerformingTransferOnForeign",
            Self::WaitTransferConfirmation => "WaitingTransferConfirmation",
            Self::ResolveSetStatus => "ResolvingSetStatusOnHome",
            Self::ProposeSetStatus => "ProposingSetStatusOnHome",
            Self::SignProposedSetStatus => "SigningProposedSetStatusOnHome",
            Self::WaitForSetStatusQuorum => "WaitingForQuorumOnHome",
            Self::PerformSetStatus => "PerformingSetStatusOnHome",
        };
        f.write_str(name)
    }
}

#[async_trait]
impl Step for HomeToForeignStep {
    const INITIAL: Self = Self::GetPending;

    fn all() -> &'static [Self] {
        &[
            Self::GetPending,
            Self::SignTransfer,
            Self::WaitForTransferQuorum,
            Self::PerformTransfer,
            Self::WaitTransferConfirmation,
            Self::ResolveSetStatus,
            Self::ProposeSetStatus,
            Self::SignProposedSetStatus,
            Self::WaitForSetStatusQuorum,
            Self::PerformSetStatus,
        ]
    }

    async fn execute<E>(self, bridge: &mut E) -> Self
    where
        E: BridgeOperations,
    {
        match self {
            Self::GetPending => get_pending(bridge).await,
            Self::SignTransfer => sign_transfer(bridge).await,
            Self::WaitForTransferQuorum => wait_for_transfer_quorum(bridge).await,
            Self::PerformTransfer => perform_transfer(bridge).await,
            Self::WaitTransferConfirmation => wait_transfer_confirmation(bridge).await,
            Self::ResolveSetStatus => resolve_set_status(bridge).await,
            Self::ProposeSetStatus => propose_set_status(bridge).await,
            Self::SignProposedSetStatus => sign_proposed_set_status(bridge).await,
            Self::WaitForSetStatusQuorum => wait_for_set_status_quorum(bridge).await,
            Self::PerformSetStatus => perform_set_status(bridge).await,
        }
    }
}

use HomeToForeignStep::*;

async fn get_pending<E: BridgeOperations>(bridge: &mut E) -> HomeToForeignStep {
    bridge.reset_quorum_retries_on_foreign();
    bridge.reset_quorum_retries_on_home();
    bridge.reset_was_proposed_retries();

    let last_executed = match bridge.get_last_executed_batch_id_from_foreign().await {
        Ok(batch_id) => batch_id,
        Err(err) => {
            warn!("error fetching the last executed batch id from the foreign chain: {}", err);
            return GetPending;
        }
    };

    let nonce = last_executed + 1;
    if let Err(err) = bridge.get_and_store_batch_from_home(nonce).await {
        debug!("no executable batch {} on the home chain: {}", nonce, err);
        return GetPending;
    }

    if let Err(err) = bridge.verify_deposit_nonces_against_foreign().await {
        warn!("deposit nonces check failed: {}", err);
        return GetPending;
    }

    match bridge.validate_stored_batch().await {
        Ok(true) => {}
        Ok(false) => {
            warn!("batch was rejected by the validator");
            return GetPending;
        }
        Err(err) => {
            warn!("error validating the batch: {}", err);
            return GetPending;
        }
    }

    match bridge.was_transfer_performed_on_foreign().await {
        Ok(true) => {
            info!("transfer already performed on foreign");
            ResolveSetStatus
        }
        Ok(false) => SignTransfer,
        Err(err) => {
            warn!("error determining if the transfer was performed on foreign: {}", err);
            GetPending
        }
    }
}

async fn sign_transfer<E: BridgeOperations>(bridge: &mut E) -> HomeToForeignStep {
    if bridge.stored_batch().is_none() {
        warn!("no batch stored while signing the transfer");
        return GetPending;
    }

    if let Err(err) = bridge.sign_transfer_on_foreign().await {
        warn!("error signing the transfer on foreign: {}", err);
        return GetPending;
    }

    WaitForTransferQuorum
}

async fn wait_for_transfer_quorum<E: BridgeOperations>(bridge: &mut E) -> HomeToForeignStep {
    if bridge.process_max_quorum_retries_on_foreign() {
        debug!("max quorum retries reached on foreign, restarting");
        return GetPending;
    }

    match bridge.is_transfer_quorum_reached_on_foreign().await {
        Ok(true) => PerformTransfer,
        Ok(false) => WaitForTransferQuorum,
        Err(err) => {
            warn!("error while checking the transfer quorum on foreign: {}", err);
            GetPending
        }
    }
}

async fn perform_transfer<E: BridgeOperations>(bridge: &mut E) -> HomeToForeignStep {
    match bridge.was_transfer_performed_on_foreign().await {
        Ok(true) => {
            info!("transfer already performed on foreign");
            return ResolveSetStatus;
        }
        Ok(false) => {}
        Err(err) => {
            warn!("error determining if the transfer was performed on foreign: {}", err);
            return GetPending;
        }
    }

    if bridge.my_turn_as_leader_on_foreign() {
        if let Err(err) = bridge.perform_transfer_on_foreign().await {
            warn!("error performing the transfer on foreign: {}", err);
            return GetPending;
        }
    } else {
        debug!("not my turn as leader in this round");
    }

    WaitTransferConfirmation
}

async fn wait_transfer_confirmation<E: BridgeOperations>(bridge: &mut E) -> HomeToForeignStep {
    bridge.wait_for_transfer_confirmation().await;

    match bridge.was_transfer_performed_on_foreign().await {
        Ok(true) => {
            info!("transfer confirmed on foreign");
            ResolveSetStatus
        }
        Ok(false) => {
            debug!("transfer not confirmed within the wait window, restarting");
            GetPending
        }
        Err(err) => {
            warn!("error determining if the transfer was performed on foreign: {}", err);
            GetPending
        }
    }
}

async fn resolve_set_status<E: BridgeOperations>(bridge: &mut E) -> HomeToForeignStep {
    // the round's peer signatures are spent once the transfer is confirmed
    bridge.clear_stored_p2p_signatures();

    if bridge.stored_batch().is_none() {
        warn!("no batch stored while resolving the set status");
        return GetPending;
    }

    let statuses = match bridge.wait_and_return_final_batch_statuses_from_foreign().await {
        Some(statuses) if !statuses.is_empty() => statuses,
        _ => {
            warn!("no final batch statuses available on foreign");
            return GetPending;
        }
    };

    bridge.resolve_new_deposits_statuses(statuses.len());
    bridge.set_stored_batch_statuses(&statuses);

    ProposeSetStatus
}

async fn propose_set_status<E: BridgeOperations>(bridge: &mut E) -> HomeToForeignStep {
    if bridge.stored_batch().is_none() {
        warn!("no batch stored while proposing the set status");
        return GetPending;
    }

    match bridge.was_set_status_proposed_on_home().await {
        Ok(true) => {
            info!("set status already proposed on home");
            return SignProposedSetStatus;
        }
        Ok(false) => {}
        Err(err) => {
            warn!("error determining if the set status was proposed on home: {}", err);
            return GetPending;
        }
    }

    if bridge.process_max_was_proposed_retries() {
        debug!("max retries reached while waiting for the set status proposal, restarting");
        return GetPending;
    }

    if !bridge.my_turn_as_leader_on_home() {
        debug!("not my turn as leader in this round");
        return ProposeSetStatus;
    }

    if let Err(err) = bridge.propose_set_status_on_home().await {
        warn!("error proposing the set status on home: {}", err);
        return GetPending;
    }

    SignProposedSetStatus
}

async fn sign_proposed_set_status<E: BridgeOperations>(bridge: &mut E) -> HomeToForeignStep {
    if bridge.stored_batch().is_none() {
        warn!("no batch stored while signing the proposed set status");
        return GetPending;
    }

    let action_id = match bridge.get_and_store_action_id_for_set_status_on_home().await {
        Ok(action_id) => action_id,
        Err(err) => {
            warn!("error fetching the action id for the proposed set status: {}", err);
            return GetPending;
        }
    };
    debug!("fetched action id {} for the proposed set status", action_id);

    match bridge.was_action_signed_on_home().await {
        Ok(true) => info!("action {} already signed on home", action_id),
        Ok(false) => {
            if let Err(err) = bridge.sign_action_on_home().await {
                warn!("error signing the action on home: {}", err);
                return GetPending;
            }
        }
        Err(err) => {
            warn!("error determining if the action was signed on home: {}", err);
            return GetPending;
        }
    }

    WaitForSetStatusQuorum
}

async fn wait_for_set_status_quorum<E: BridgeOperations>(bridge: &mut E) -> HomeToForeignStep {
    if bridge.process_max_quorum_retries_on_home() {
        debug!("max quorum retries reached on home, restarting");
        return GetPending;
    }

    match bridge.quorum_reached_on_home().await {
        Ok(true) => PerformSetStatus,
        Ok(false) => WaitForSetStatusQuorum,
        Err(err) => {
            warn!("error while checking the quorum on home: {}", err);
            GetPending
        }
    }
}

async fn perform_set_status<E: BridgeOperations>(bridge: &mut E) -> HomeToForeignStep {
    match bridge.was_action_performed_on_home().await {
        Ok(true) => {
            info!("set status performed on home, round completed");
            return GetPending;
        }
        Ok(false) => {}
        Err(err) => {
            warn!("error determining if the set status was performed on home: {}", err);
            return GetPending;
        }
    }

    if bridge.my_turn_as_leader_on_home() {
        if let Err(err) = bridge.perform_action_on_home().await {
            warn!("error performing the set status on home: {}", err);
            return GetPending;
        }
    } else {
        debug!("not my turn as leader in this round");
    }

    PerformSetStatus
}
