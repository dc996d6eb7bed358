pub mod error;
pub mod gateway;
pub mod ports;
pub mod step;
pub mod store;
pub mod types;
pub mod wizard;

pub use error::{FlowError, GatewayError};
pub use gateway::DeconzGateway;
pub use ports::{BridgeGateway, EntryStore};
pub use step::{AbortReason, FieldKind, FormField, StepId, StepResult, UserInput};
pub use store::MemoryEntryStore;
pub use types::*;
pub use wizard::{FlowSource, SetupWizard, WizardPhase};
