//! Termination actuator: the only place that acts on the fleet.

use tracing::{info, warn};

use tapir_core::{ComputeControl, ExecutionMode, InstanceId, TapirResult};

/// What the actuator did with a termination request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The control API accepted the request.
    Terminated,
    /// Dry run: the request was logged and not sent.
    Skipped,
}

/// Sends termination requests to compute control, unless in dry-run mode.
pub struct TerminationActuator<C> {
    control: C,
    mode: ExecutionMode,
}

impl<C: ComputeControl> TerminationActuator<C> {
    pub fn new(control: C, mode: ExecutionMode) -> Self {
        Self { control, mode }
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    pub fn control(&self) -> &C {
        &self.control
    }

    /// Terminate `instance`. Errors from the control API propagate as-is.
    pub async fn terminate(&self, instance: &InstanceId) -> TapirResult<Termination> {
        match self.mode {
            ExecutionMode::DryRun => {
                info!(%instance, "dry run: skipping terminate");
                Ok(Termination::Skipped)
            }
            ExecutionMode::Live => {
                warn!(%instance, "terminating instance");
                self.control.terminate(instance).await?;
                info!(%instance, "termination requested");
                Ok(Termination::Terminated)
            }
        }
    }
}
