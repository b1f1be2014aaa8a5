//! Holder for transfer signatures received over the P2P network
//!
//! The P2P layer appends asynchronously; the executor reads between ticks
//! and clears once per completed round. A plain mutex is enough, nothing is
//! held across a suspension point.

use ethers::types::H256;
use std::sync::Mutex;
use tracing::debug;

/// A relayer signature over a batch message hash, as broadcast on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedMessage {
    pub message_hash: H256,
    pub public_key: Vec<u8>,
    pub signature: Vec<u8>,
}

/// Read/clear access to the accumulated peer signatures.
pub trait SignaturesHolder: Send + Sync {
    /// All signatures stored for the given message hash.
    fn signatures(&self, message_hash: H256) -> Vec<Vec<u8>>;

    /// Drops every stored signature. Called once per completed round.
    fn clear_stored_signatures(&self);
}

/// Mutex-guarded signatures store fed by the P2P message processor.
#[derive(Default)]
pub struct P2pSignaturesHolder {
    stored: Mutex<Vec<SignedMessage>>,
}

impl P2pSignaturesHolder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called by the P2P layer whenever a peer signature arrives. Duplicate
    /// (public key, hash) pairs replace the previous entry.
    pub fn add_stored_signature(&self, message: SignedMessage) {
        let mut stored = self.stored.lock().unwrap();
        stored.retain(|existing| {
            existing.public_key != message.public_key
                || existing.message_hash != message.message_hash
        });
        stored.push(message);
    }
}

impl SignaturesHolder for P2pSignaturesHolder {
    fn signatures(&self, message_hash: H256) -> Vec<Vec<u8>> {
        self.stored
            .lock()
            .unwrap()
            .iter()
            .filter(|message| message.message_hash == message_hash)
            .map(|message| message.signature.clone())
            .collect()
    }

    fn clear_stored_signatures(&self) {
        let mut stored = self.stored.lock().unwrap();
        debug!(num_signatures = stored.len(), "clearing stored signatures");
        stored.clear();
    }
}
