//! Bridge relayer core - two-chain token bridge coordination
//!
//! A federated set of relayer nodes observes pending deposit batches on one
//! chain, collects multi-signature quorum for the mirrored action on the
//! other, executes it, and reports final statuses back. Each relayer runs
//! the same deterministic state machine; safety comes from on-chain quorum,
//! not from relayer consensus.
//!
//! The crate provides the per-direction step engine ([`steps`]), the driver
//! that ticks it ([`machine`]), the bridge executor facade the steps talk
//! to ([`executor`]), leader rotation ([`topology`]), the P2P signatures
//! holder ([`signatures`]), the gas oracle poller ([`gas`]) and the
//! metrics/status surface ([`metrics`]). Concrete chain RPC clients are
//! supplied by the embedding process through the traits in [`chain`].

pub mod batch;
pub mod chain;
pub mod config;
pub mod error;
pub mod executor;
pub mod gas;
pub mod machine;
pub mod metrics;
pub mod signatures;
pub mod steps;
pub mod topology;

#[cfg(test)]
pub(crate) mod testing;

pub use batch::{DepositTransfer, TransferBatch};
pub use chain::{ActionId, BatchValidator, ChainClient, ForeignChainClient, INVALID_ACTION_ID};
pub use config::Settings;
pub use error::{BridgeError, BridgeResult};
pub use executor::{BridgeExecutor, BridgeExecutorArgs, BridgeOperations, ExecutorConfig};
pub use gas::{GasPriceSelector, GasStation, GasStationConfig};
pub use machine::{StateMachine, StepsConfig};
pub use metrics::{MetricsServer, StatusHandler};
pub use signatures::{P2pSignaturesHolder, SignaturesHolder, SignedMessage};
pub use steps::{ForeignToHomeStep, HomeToForeignStep, Step};
pub use topology::{RoleProvider, RoundRobinTopology, TopologyProvider};
