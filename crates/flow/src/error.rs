use crate::wizard::WizardPhase;
use thiserror::Error;

/// Failures reported by a [`BridgeGateway`](crate::ports::BridgeGateway).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("gateway did not answer in time")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("gateway rejected the request: {0}")]
    Rejected(String),
}

impl GatewayError {
    pub fn is_transport(&self) -> bool {
        matches!(self, GatewayError::Timeout | GatewayError::Network(_))
    }
}

#[derive(Debug, Error)]
pub enum FlowError {
    /// A handler was reached without the data every path guarantees.
    #[error("flow invariant violated: {0}")]
    Precondition(&'static str),

    #[error("flow already finished ({0:?})")]
    Finished(WizardPhase),

    #[error("entry store failed: {0}")]
    Store(#[source] anyhow::Error),
}

pub type FlowResult<T> = Result<T, FlowError>;
