//! State machine driver
//!
//! Ticks the current step, advances to the identifier it returns, and paces
//! the loop by the configured per-step duration. Two directions run on two
//! independent driver instances; a driver never re-enters its own step.

use crate::error::{BridgeError, BridgeResult};
use crate::executor::BridgeOperations;
use crate::steps::Step;

use std::collections::HashMap;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

const MIN_STEP_DURATION: Duration = Duration::from_secs(1);

/// Per-step pacing override.
#[derive(Debug, Clone)]
pub struct StepConfig {
    pub name: String,
    pub duration_ms: u64,
}

/// Driver pacing configuration: a default tick duration plus optional
/// per-step overrides keyed by the step identifier name.
#[derive(Debug, Clone)]
pub struct StepsConfig {
    pub step_duration_ms: u64,
    pub steps: Vec<StepConfig>,
}

pub struct StateMachine<S: Step, E: BridgeOperations> {
    name: &'static str,
    current_step: S,
    bridge: E,
    default_duration: Duration,
    durations: HashMap<S, Duration>,
    cancellation: CancellationToken,
}

impl<S: Step, E: BridgeOperations> StateMachine<S, E> {
    /// Builds the driver for one direction. Unknown configured step names
    /// and sub-second pacing are construction errors.
    pub fn new(
        name: &'static str,
        bridge: E,
        config: &StepsConfig,
        cancellation: CancellationToken,
    ) -> BridgeResult<Self> {
        let default_duration = Duration::from_millis(config.step_duration_ms);
        if default_duration < MIN_STEP_DURATION {
            return Err(BridgeError::InvalidDuration {
                name: "step_duration_ms",
                got_millis: default_duration.as_millis(),
                minimum_millis: MIN_STEP_DURATION.as_millis(),
            });
        }

        let mut durations = HashMap::new();
        for step_config in &config.steps {
            let step = S::from_name(&step_config.name)
                .ok_or_else(|| BridgeError::UnknownStep(step_config.name.clone()))?;
            let duration = Duration::from_millis(step_config.duration_ms);
            if duration < MIN_STEP_DURATION {
                return Err(BridgeError::InvalidDuration {
                    name: "steps.duration_ms",
                    got_millis: duration.as_millis(),
                    minimum_millis: MIN_STEP_DURATION.as_millis(),
                });
            }
            durations.insert(step, duration);
        }

        Ok(Self {
            name,
            current_step: S::INITIAL,
            bridge,
            default_duration,
            durations,
            cancellation,
        })
    }

    /// Driver with default pacing and no cancellation wiring, for direct
    /// tick-by-tick testing.
    #[cfg(test)]
    pub(crate) fn for_tests(bridge: E) -> Self {
        Self {
            name: "test",
            current_step: S::INITIAL,
            bridge,
            default_duration: MIN_STEP_DURATION,
            durations: HashMap::new(),
            cancellation: CancellationToken::new(),
        }
    }

    pub fn current_step(&self) -> S {
        self.current_step
    }

    pub fn bridge(&self) -> &E {
        &self.bridge
    }

    pub fn bridge_mut(&mut self) -> &mut E {
        &mut self.bridge
    }

    /// Executes the current step once and advances to the returned
    /// identifier.
    pub async fn execute(&mut self) {
        let step = self.current_step;
        let next = step.execute(&mut self.bridge).await;
        if next != step {
            debug!("{}: step transition {} -> {}", self.name, step, next);
        }
        self.current_step = next;
    }

    fn current_duration(&self) -> Duration {
        self.durations
            .get(&self.current_step)
            .copied()
            .unwrap_or(self.default_duration)
    }

    /// Runs the machine until the cancellation token fires.
    pub async fn run(mut self) {
        info!("{}: state machine started on step {}", self.name, self.current_step);

        loop {
            let pace = self.current_duration();
            tokio::select! {
                _ = self.cancellation.cancelled() => {
                    info!("{}: state machine stopping", self.name);
                    return;
                }
                _ = tokio::time::sleep(pace) => {}
            }

            self.execute().await;
        }
    }
}
