use deconz_setup_flow::{FinalConfig, StepId, UserInput};
use serde::Serialize;

/// Work queued by a key press, run by the main loop after the next draw.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingStep {
    Start,
    Submit {
        step: StepId,
        input: Option<UserInput>,
    },
}

/// What gets printed once the terminal is restored.
#[derive(Debug, Serialize)]
pub struct ExportedEntry<'a> {
    pub title: &'a str,
    pub gateway: &'a FinalConfig,
}
