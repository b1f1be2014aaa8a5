//! Leader rotation over the whitelisted relayer set
//!
//! Time is partitioned into fixed rounds; the whitelisted public keys are
//! sorted and the leader of round `r` is entry `r mod N`. Every relayer
//! computes the same answer without coordination, and the whitelist may
//! change between calls.

use crate::error::{BridgeError, BridgeResult};

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::warn;

/// Answers the per-round leader question for one chain.
pub trait TopologyProvider: Send + Sync {
    fn my_turn_as_leader(&self) -> bool;
}

/// Source of the whitelisted relayer public keys.
pub trait RoleProvider: Send + Sync {
    fn whitelisted_public_keys(&self) -> Vec<Vec<u8>>;
}

/// Round-robin topology: rounds of `round_duration` wall-clock time,
/// leadership rotating through the sorted whitelist.
pub struct RoundRobinTopology {
    role_provider: Arc<dyn RoleProvider>,
    own_public_key: Vec<u8>,
    round_duration: Duration,
}

impl RoundRobinTopology {
    pub fn new(
        role_provider: Arc<dyn RoleProvider>,
        own_public_key: Vec<u8>,
        round_duration: Duration,
    ) -> BridgeResult<Self> {
        if own_public_key.is_empty() {
            return Err(BridgeError::Config(
                "empty own public key for the topology provider".to_string(),
            ));
        }
        if round_duration.is_zero() {
            return Err(BridgeError::InvalidDuration {
                name: "round_duration",
                got_millis: 0,
                minimum_millis: 1,
            });
        }

        Ok(Self {
            role_provider,
            own_public_key,
            round_duration,
        })
    }

    fn current_round(&self) -> u64 {
        let now_millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();

        (now_millis / self.round_duration.as_millis()) as u64
    }

    /// Leader of the given round, or `None` when the whitelist is empty.
    pub(crate) fn leader_for_round(&self, round: u64) -> Option<Vec<u8>> {
        let mut keys = self.role_provider.whitelisted_public_keys();
        if keys.is_empty() {
            return None;
        }

        keys.sort();
        keys.dedup();
        let index = (round % keys.len() as u64) as usize;
        Some(keys[index].clone())
    }

    fn is_whitelisted(&self) -> bool {
        self.role_provider
            .whitelisted_public_keys()
            .iter()
            .any(|key| key == &self.own_public_key)
    }
}

impl TopologyProvider for RoundRobinTopology {
    fn my_turn_as_leader(&self) -> bool {
        if !self.is_whitelisted() {
            warn!("relayer is not whitelisted, not electing a leader");
            return false;
        }

        self.leader_for_round(self.current_round())
            .map(|leader| leader == self.own_public_key)
            .unwrap_or(false)
    }
}
