//! Seams to the robot middleware.

use crate::breakers::BreakerState;
use crate::diagnostics::DiagnosticReport;
use crate::error::CommandError;
use crate::mode::OperatingMode;
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Source of aggregated diagnostics reports.
pub trait TelemetryBus: Send + Sync {
    /// A fresh subscription. The stream ends when the underlying link closes.
    fn subscribe(&self) -> BoxStream<'static, DiagnosticReport>;
}

/// Remote calls the panel can make on the base.
#[async_trait]
pub trait CommandBus: Send + Sync {
    /// Writes all three outputs at once.
    async fn set_digital_outputs(&self, outputs: BreakerState) -> Result<(), CommandError>;

    async fn set_operation_mode(&self, mode: OperatingMode) -> Result<(), CommandError>;
}
