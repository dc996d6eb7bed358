use super::*;

impl App {
    /// Run the queued step against the wizard.
    pub async fn run_pending(&mut self) {
        let Some(pending) = self.pending.take() else {
            return;
        };

        let result = match pending {
            PendingStep::Start => {
                let source = self.source.take().unwrap_or(FlowSource::User);
                self.wizard.start(source).await
            }
            PendingStep::Submit { step, input } => self.wizard.handle(step, input).await,
        };
        self.is_loading = false;

        match result {
            Ok(step) => {
                self.clear_error();
                self.show_step(step);
            }
            Err(e) => self.report_error("Setup step failed", e),
        }
    }

    pub(super) fn queue_step(&mut self, step: StepId, input: Option<UserInput>) {
        self.loading_message = match (step, &input) {
            (StepId::Init, None) => "Searching for deCONZ gateways...",
            (StepId::Link, Some(_)) => "Requesting an API key...",
            _ => "Working...",
        }
        .to_string();
        self.is_loading = true;
        self.pending = Some(PendingStep::Submit { step, input });
    }

    pub(super) fn show_step(&mut self, step: StepResult) {
        let mut fields: Vec<FieldInput> = step.fields().iter().cloned().map(FieldInput::new).collect();

        // a form coming back with errors keeps what was typed into it
        let same_form = self.step.as_ref().and_then(StepResult::step_id) == step.step_id();
        if same_form {
            for field in fields.iter_mut().filter(|f| !f.is_select()) {
                if let Some(old) = self.fields.iter().find(|o| o.field.name == field.field.name) {
                    field.buffer = old.buffer.clone();
                }
            }
        } else {
            self.selected_field = 0;
        }

        if self.selected_field >= fields.len() {
            self.selected_field = 0;
        }
        if let StepResult::CreateEntry { title, .. } = &step {
            tracing::info!(title = %title, "Setup finished");
        }
        self.fields = fields;
        self.step = Some(step);
    }

    pub fn exported_entry(&self) -> Option<ExportedEntry<'_>> {
        match &self.step {
            Some(StepResult::CreateEntry { title, data }) => Some(ExportedEntry {
                title,
                gateway: data,
            }),
            _ => None,
        }
    }
}

/// Pick the flow source from `DECONZ_*` environment variables.
pub fn source_from_env(default_port: u16) -> FlowSource {
    source_from_vars(|key| std::env::var(key).ok(), default_port)
}

pub(super) fn source_from_vars(
    get: impl Fn(&str) -> Option<String>,
    default_port: u16,
) -> FlowSource {
    let non_empty = |key: &str| get(key).filter(|v| !v.trim().is_empty());

    let Some(host) = non_empty("DECONZ_HOST") else {
        return FlowSource::User;
    };
    let port = non_empty("DECONZ_PORT")
        .and_then(|p| p.trim().parse::<u16>().ok())
        .unwrap_or(default_port);

    FlowSource::Import(ImportConfig {
        host,
        port: Some(port),
        api_key: non_empty("DECONZ_API_KEY"),
        bridgeid: non_empty("DECONZ_BRIDGEID"),
    })
}
