use crate::breakers::BreakerState;
use crate::bus::CommandBus;
use crate::error::CommandError;
use crate::mode::OperatingMode;
use std::sync::Arc;
use tracing::debug;

/// Identifies one in-flight command so its completion can be matched up.
pub type Ticket = u64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PanelCommand {
    SetDigitalOutputs {
        ticket: Ticket,
        outputs: BreakerState,
    },
    SetOperationMode {
        ticket: Ticket,
        mode: OperatingMode,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandOutcome {
    pub command: PanelCommand,
    pub result: Result<(), CommandError>,
}

/// Sends `command` over `bus`. Meant to run off the dispatch context; the
/// returned outcome goes back to `PowerPanel::complete`.
pub async fn dispatch(bus: Arc<dyn CommandBus>, command: PanelCommand) -> CommandOutcome {
    debug!("dispatching {:?}", command);
    let result = match command {
        PanelCommand::SetDigitalOutputs { outputs, .. } => bus.set_digital_outputs(outputs).await,
        PanelCommand::SetOperationMode { mode, .. } => bus.set_operation_mode(mode).await,
    };
    CommandOutcome { command, result }
}
