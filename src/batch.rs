//! Transfer batches and their deposits
//!
//! A batch is the atomic unit of bridging: an ordered run of deposits with
//! one status byte per deposit. Batches are created by a chain client when
//! a pending batch is observed and owned by exactly one executor at a time.

use ethers::types::U256;
use std::fmt;

/// Status byte for a deposit that was not processed yet
pub const STATUS_PENDING: u8 = 0;
/// Status byte for a successfully executed deposit
pub const STATUS_EXECUTED: u8 = 3;
/// Status byte for a rejected deposit
pub const STATUS_REJECTED: u8 = 4;

/// One transfer entry inside a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositTransfer {
    pub nonce: u64,
    pub to: Vec<u8>,
    pub displayable_to: String,
    pub from: Vec<u8>,
    pub displayable_from: String,
    pub token: Vec<u8>,
    pub displayable_token: String,
    /// Token identifier on the receiving chain, set at cross-chain mapping time
    pub converted_token: Vec<u8>,
    pub amount: U256,
}

impl fmt::Display for DepositTransfer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "to: {}, from: {}, token address: {}, amount: {}, deposit nonce: {}",
            self.displayable_to,
            self.displayable_from,
            self.displayable_token,
            self.amount,
            self.nonce
        )
    }
}

/// A unit of bridging work: deposits plus one status byte per deposit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferBatch {
    pub id: u64,
    pub deposits: Vec<DepositTransfer>,
    pub statuses: Vec<u8>,
}

impl TransferBatch {
    /// Reconciles the statuses with the number of deposits actually accepted
    /// on the receiving chain. Deposits past `new_count` are rejected; if the
    /// receiving chain reports more entries than we hold, trailing rejected
    /// bytes are appended so the two views stay the same length.
    pub fn resolve_new_deposits(&mut self, new_count: usize) {
        let old_count = self.statuses.len();
        if new_count < old_count {
            for status in self.statuses.iter_mut().skip(new_count) {
                *status = STATUS_REJECTED;
            }
        }
        for _ in old_count..new_count {
            self.statuses.push(STATUS_REJECTED);
        }
    }
}

impl fmt::Display for TransferBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Batch id {}:", self.id)?;
        for deposit in &self.deposits {
            writeln!(f, "  {}", deposit)?;
        }
        write!(f, "Statuses: {}", hex::encode(&self.statuses))
    }
}
