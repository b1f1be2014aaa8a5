//! The per-direction step graphs of the bridge state machine
//!
//! Each direction is a closed set of step identifiers with a single
//! dispatch function. A step consumes the executor surface and returns the
//! identifier to run next; recoverable trouble returns the initial
//! identifier so the round restarts against whatever already happened
//! on chain.

pub mod foreign_to_home;
pub mod home_to_foreign;

pub use foreign_to_home::ForeignToHomeStep;
pub use home_to_foreign::HomeToForeignStep;

use crate::executor::BridgeOperations;

use async_trait::async_trait;
use std::fmt;
use std::hash::Hash;

/// A closed set of step identifiers forming one bridge direction.
#[async_trait]
pub trait Step:
    Copy + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync + Sized + 'static
{
    /// The identifier the machine starts on and rewinds to.
    const INITIAL: Self;

    /// Every identifier of the direction, in graph order.
    fn all() -> &'static [Self];

    /// Resolves a configured step name; unknown names are a construction
    /// error at the driver level.
    fn from_name(name: &str) -> Option<Self> {
        Self::all()
            .iter()
            .find(|step| step.to_string() == name)
            .copied()
    }

    /// Runs the step once and returns the identifier to execute next.
    async fn execute<E>(self, bridge: &mut E) -> Self
    where
        E: BridgeOperations;
}
