//! Foreign→home direction: a pending batch on the foreign chain is
//! mirrored onto the home multisig, then the final statuses are reported
//! back to the foreign chain through its own set-status action.

use super::Step;
use crate::executor::BridgeOperations;

use async_trait::async_trait;
use std::fmt;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ForeignToHomeStep {
    GetPending,
    ProposeTransfer,
    SignProposedTransfer,
    WaitForTransferQuorum,
    PerformAction,
    ProposeSetStatus,
    SignProposedSetStatus,
    WaitForSetStatusQuorum,
    PerformSetStatus,
}

impl fmt::Display for ForeignToHomeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::GetPending => "GettingPendingBatchFromForeign",
            Self::ProposeTransfer => "ProposingTransferOnHome",
            Self::SignProposedTransfer => "SigningProposedTransferOnHome",
            Self::WaitForTransferQuorum => "WaitingForQuorumOnHome",
            Self::PerformAction => "PerformingActionOnHome",
            Self::ProposeSetStatus => "ProposingSetStatusOnForeign",
            Self::SignProposedSetStatus => "SigningProposedSetStatusOnForeign",
            Self::WaitForSetStatusQuorum => "WaitingForQuorumOnForeign",
            Self::PerformSetStatus => "PerformingSetStatusOnForeign",
        };
        f.write_str(name)
    }
}

#[async_trait]
impl Step for ForeignToHomeStep {
    const INITIAL: Self = Self::GetPending;

    fn all() -> &'static [Self] {
        &[
            Self::GetPending,
            Self::ProposeTransfer,
            Self::SignProposedTransfer,
            Self::WaitForTransferQuorum,
            Self::PerformAction,
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
            Self::ProposeTransfer => propose_transfer(bridge).await,
            Self::SignProposedTransfer => sign_proposed_transfer(bridge).await,
            Self::WaitForTransferQuorum => wait_for_transfer_quorum(bridge).await,
            Self::PerformAction => perform_action(bridge).await,
            Self::ProposeSetStatus => propose_set_status(bridge).await,
            Self::SignProposedSetStatus => sign_proposed_set_status(bridge).await,
            Self::WaitForSetStatusQuorum => wait_for_set_status_quorum(bridge).await,
            Self::PerformSetStatus => perform_set_status(bridge).await,
        }
    }
}

use ForeignToHomeStep::*;

async fn get_pending<E: BridgeOperations>(bridge: &mut E) -> ForeignToHomeStep {
    bridge.reset_quorum_retries_on_foreign();
    bridge.reset_quorum_retries_on_home();
    bridge.reset_was_proposed_retries();

    let batch = match bridge.get_pending_batch_from_foreign().await {
        Ok(Some(batch)) => batch,
        Ok(None) => {
            debug!("no new batch found on the foreign chain");
            return GetPending;
        }
        Err(err) => {
            warn!("error fetching the pending batch from the foreign chain: {}", err);
            return GetPending;
        }
    };

    info!("fetched new batch from the foreign chain {}", batch);
    bridge.store_batch(batch);

    if let Err(err) = bridge.verify_deposit_nonces_against_home().await {
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

    ProposeTransfer
}

async fn propose_transfer<E: BridgeOperations>(bridge: &mut E) -> ForeignToHomeStep {
    if bridge.stored_batch().is_none() {
        warn!("no batch stored while proposing the transfer");
        return GetPending;
    }

    match bridge.was_transfer_proposed_on_home().await {
        Ok(true) => {
            info!("transfer already proposed on home");
            return SignProposedTransfer;
        }
        Ok(false) => {}
        Err(err) => {
            warn!("error determining if the transfer was proposed on home: {}", err);
            return GetPending;
        }
    }

    if bridge.process_max_was_proposed_retries() {
        debug!("max retries reached while waiting for the transfer proposal, restarting");
        return GetPending;
    }

    if !bridge.my_turn_as_leader_on_home() {
        debug!("not my turn as leader in this round");
        return ProposeTransfer;
    }

    if let Err(err) = bridge.propose_transfer_on_home().await {
        warn!("error proposing the transfer on home: {}", err);
        return GetPending;
    }

    SignProposedTransfer
}

async fn sign_proposed_transfer<E: BridgeOperations>(bridge: &mut E) -> ForeignToHomeStep {
    if bridge.stored_batch().is_none() {
        warn!("no batch stored while signing the proposed transfer");
        return GetPending;
    }

    let action_id = match bridge.get_and_store_action_id_for_propose_transfer_on_home().await {
        Ok(action_id) => action_id,
        Err(err) => {
            warn!("error fetching the action id for the proposed transfer: {}", err);
            return GetPending;
        }
    };
    debug!("fetched action id {} for the proposed transfer", action_id);

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

    WaitForTransferQuorum
}

async fn wait_for_transfer_quorum<E: BridgeOperations>(bridge: &mut E) -> ForeignToHomeStep {
    if bridge.process_max_quorum_retries_on_home() {
        debug!("max quorum retries reached on home, restarting");
        return GetPending;
    }

    match bridge.quorum_reached_on_home().await {
        Ok(true) => PerformAction,
        Ok(false) => WaitForTransferQuorum,
        Err(err) => {
            warn!("error while checking the quorum on home: {}", err);
            GetPending
        }
    }
}

async fn perform_action<E: BridgeOperations>(bridge: &mut E) -> ForeignToHomeStep {
    match bridge.was_action_performed_on_home().await {
        Ok(true) => {
            info!("action performed on home");
            // the executed deposits now carry final statuses on home;
            // they feed the set-status report on the foreign side
            let statuses = match bridge.wait_and_return_final_batch_statuses_from_home().await {
                Some(statuses) if !statuses.is_empty() => statuses,
                _ => {
                    warn!("no final batch statuses available on home");
                    return GetPending;
                }
            };
            bridge.resolve_new_deposits_statuses(statuses.len());
            bridge.set_stored_batch_statuses(&statuses);
            return ProposeSetStatus;
        }
        Ok(false) => {}
        Err(err) => {
            warn!("error determining if the action was performed on home: {}", err);
            return GetPending;
        }
    }

    if bridge.my_turn_as_leader_on_home() {
        if let Err(err) = bridge.perform_action_on_home().await {
            warn!("error performing the action on home: {}", err);
            return GetPending;
        }
    } else {
        debug!("not my turn as leader in this round");
    }

    PerformAction
}

async fn propose_set_status<E: BridgeOperations>(bridge: &mut E) -> ForeignToHomeStep {
    if bridge.stored_batch().is_none() {
        warn!("no batch stored while proposing the set status");
        return GetPending;
    }

    match bridge.was_set_status_proposed_on_foreign().await {
        Ok(true) => {
            info!("set status already proposed on foreign");
            return SignProposedSetStatus;
        }
        Ok(false) => {}
        Err(err) => {
            warn!("error determining if the set status was proposed on foreign: {}", err);
            return GetPending;
        }
    }

    if bridge.process_max_was_proposed_retries() {
        debug!("max retries reached while waiting for the set status proposal, restarting");
        return GetPending;
    }

    if !bridge.my_turn_as_leader_on_foreign() {
        debug!("not my turn as leader in this round");
        return ProposeSetStatus;
    }

    if let Err(err) = bridge.propose_set_status_on_foreign().await {
        warn!("error proposing the set status on foreign: {}", err);
        return GetPending;
    }

    SignProposedSetStatus
}

async fn sign_proposed_set_status<E: BridgeOperations>(bridge: &mut E) -> ForeignToHomeStep {
    if bridge.stored_batch().is_none() {
        warn!("no batch stored while signing the proposed set status");
        return GetPending;
    }

    let action_id = match bridge.get_and_store_action_id_for_set_status_on_foreign().await {
        Ok(action_id) => action_id,
        Err(err) => {
            warn!("error fetching the action id for the proposed set status: {}", err);
            return GetPending;
        }
    };
    debug!("fetched action id {} for the proposed set status", action_id);

    match bridge.was_action_signed_on_foreign().await {
        Ok(true) => info!("action {} already signed on foreign", action_id),
        Ok(false) => {
            if let Err(err) = bridge.sign_action_on_foreign().await {
                warn!("error signing the action on foreign: {}", err);
                return GetPending;
            }
        }
        Err(err) => {
            warn!("error determining if the action was signed on foreign: {}", err);
            return GetPending;
        }
    }

    WaitForSetStatusQuorum
}

async fn wait_for_set_status_quorum<E: BridgeOperations>(bridge: &mut E) -> ForeignToHomeStep {
    if bridge.process_max_quorum_retries_on_foreign() {
        debug!("max quorum retries reached on foreign, restarting");
        return GetPending;
    }

    match bridge.quorum_reached_on_foreign().await {
        Ok(true) => PerformSetStatus,
        Ok(false) => WaitForSetStatusQuorum,
        Err(err) => {
            warn!("error while checking the quorum on foreign: {}", err);
            GetPending
        }
    }
}

async fn perform_set_status<E: BridgeOperations>(bridge: &mut E) -> ForeignToHomeStep {
    match bridge.was_action_performed_on_foreign().await {
        Ok(true) => {
            info!("set status performed on foreign, round completed");
            return GetPending;
        }
        Ok(false) => {}
        Err(err) => {
            warn!("error determining if the set status was performed on foreign: {}", err);
            return GetPending;
        }
    }

    if bridge.my_turn_as_leader_on_foreign() {
        if let Err(err) = bridge.perform_action_on_foreign().await {
            warn!("error performing the set status on foreign: {}", err);
            return GetPending;
        }
    } else {
        debug!("not my turn as leader in this round");
    }

    PerformSetStatus
}
