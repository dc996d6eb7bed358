use super::*;

pub struct App {
    pub should_quit: bool,
    pub config: Config,
    pub keybinds: Keybinds,
    pub wizard: SetupWizard,
    pub store: Arc<MemoryEntryStore>,
    pub source: Option<FlowSource>,
    pub step: Option<StepResult>,
    pub fields: Vec<FieldInput>,
    pub selected_field: usize,
    pub pending: Option<PendingStep>,
    pub show_help: bool,
    pub is_loading: bool,
    pub loading_message: String,
    pub last_error: Option<String>,
    pub show_error_details: bool,
}

impl App {
    pub fn new(config: Config, gateway: Arc<dyn BridgeGateway>, source: FlowSource) -> Self {
        let store = Arc::new(MemoryEntryStore::new());
        let wizard =
            SetupWizard::new(gateway, store.clone()).with_default_port(config.bridge.default_port);
        let loading_message = match source {
            FlowSource::User => "Searching for deCONZ gateways...",
            _ => "Starting setup...",
        };

        Self {
            should_quit: false,
            config,
            keybinds: Keybinds,
            wizard,
            store,
            source: Some(source),
            step: None,
            fields: Vec::new(),
            selected_field: 0,
            pending: Some(PendingStep::Start),
            show_help: false,
            is_loading: true,
            loading_message: loading_message.to_string(),
            last_error: None,
            show_error_details: false,
        }
    }
}
