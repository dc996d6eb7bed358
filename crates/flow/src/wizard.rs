//! The setup wizard: discover, select, link, finalize.
//!
//! A [`SetupWizard`] serves exactly one flow. The host starts it with a
//! [`FlowSource`] and then feeds each rendered step back through
//! [`SetupWizard::handle`] until a terminal result (`CreateEntry` or `Abort`)
//! comes out. Transport failures never end the flow: they come back as the
//! same form with an error attached, and re-submitting is the retry.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{FlowError, FlowResult, GatewayError};
use crate::ports::{BridgeGateway, EntryStore};
use crate::step::{
    input_port, input_str, AbortReason, FormError, FormField, StepId, StepResult, UserInput,
    BASE_ERROR,
};
use crate::types::{
    CandidateBridge, DiscoveryInfo, FinalConfig, HassioInfo, ImportConfig, PartialConfig,
    DEFAULT_PORT,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardPhase {
    Start,
    AwaitSelection,
    AwaitLink,
    Finalized,
    Aborted,
}

impl WizardPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, WizardPhase::Finalized | WizardPhase::Aborted)
    }
}

/// What started the flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowSource {
    /// Opened by the user; runs discovery.
    User,
    /// A gateway announced on the network.
    Discovery(DiscoveryInfo),
    /// Settings from an older configuration.
    Import(ImportConfig),
    /// An add-on that already paired.
    Hassio(HassioInfo),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WizardState {
    pub selected: PartialConfig,
    pub candidates: Vec<CandidateBridge>,
}

pub struct SetupWizard {
    gateway: Arc<dyn BridgeGateway>,
    store: Arc<dyn EntryStore>,
    state: WizardState,
    phase: WizardPhase,
    hassio: Option<HassioInfo>,
    default_port: u16,
}

impl SetupWizard {
    pub fn new(gateway: Arc<dyn BridgeGateway>, store: Arc<dyn EntryStore>) -> Self {
        Self {
            gateway,
            store,
            state: WizardState::default(),
            phase: WizardPhase::Start,
            hassio: None,
            default_port: DEFAULT_PORT,
        }
    }

    /// Port offered on the manual form and used when none is given.
    pub fn with_default_port(mut self, port: u16) -> Self {
        if port != 0 {
            self.default_port = port;
        }
        self
    }

    pub fn phase(&self) -> WizardPhase {
        self.phase
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn selected(&self) -> &PartialConfig {
        &self.state.selected
    }

    pub fn candidates(&self) -> &[CandidateBridge] {
        &self.state.candidates
    }

    /// Enter the flow from `source`.
    pub async fn start(&mut self, source: FlowSource) -> FlowResult<StepResult> {
        self.ensure_active()?;
        match source {
            FlowSource::User => self.begin(None).await,
            FlowSource::Discovery(info) => self.discovery_push(info).await,
            FlowSource::Import(config) => self.import_legacy(config).await,
            FlowSource::Hassio(info) => self.addon_handoff(info).await,
        }
    }

    /// Submit (or re-render, with `None`) a step the wizard rendered earlier.
    pub async fn handle(&mut self, step: StepId, input: Option<UserInput>) -> FlowResult<StepResult> {
        self.ensure_active()?;
        debug!(step = %step, with_input = input.is_some(), "Handling step");
        match step {
            StepId::Init => self.begin(input).await,
            StepId::Select => self.select_bridge(input).await,
            StepId::Link => self.link(input).await,
            StepId::HassioConfirm => self.hassio_confirm(input).await,
        }
    }

    pub async fn begin(&mut self, input: Option<UserInput>) -> FlowResult<StepResult> {
        self.ensure_active()?;
        if let Some(input) = input {
            return self.select_bridge(Some(input)).await;
        }

        match self.gateway.discover().await {
            Ok(candidates) => {
                info!(count = candidates.len(), "Discovered gateways");
                self.state.candidates = candidates;
            }
            Err(e) => {
                warn!("Discovery failed, falling back to manual entry: {e}");
                self.state.candidates.clear();
            }
        }

        if self.state.candidates.is_empty() {
            self.phase = WizardPhase::Start;
            return Ok(self.manual_form(None));
        }
        self.phase = WizardPhase::AwaitSelection;
        Ok(self.selection_form())
    }

    pub async fn select_bridge(&mut self, input: Option<UserInput>) -> FlowResult<StepResult> {
        self.ensure_active()?;
        let Some(input) = input else {
            return Ok(self.entry_form());
        };

        let host = input_str(&input, "host").unwrap_or_default();
        if host.is_empty() {
            return Ok(self.entry_form().with_error("host", FormError::Required));
        }

        if let Some(candidate) = self.state.candidates.iter().find(|c| c.host == host) {
            debug!(host, "Selected discovered gateway");
            self.state.selected = PartialConfig::with_endpoint(&candidate.host, candidate.port);
        } else {
            let port = match input_port(&input, "port") {
                Ok(port) => port.unwrap_or(self.default_port),
                Err(e) => return Ok(self.entry_form().with_error("port", e)),
            };
            debug!(host, port, "Using manually entered gateway");
            self.state.selected = PartialConfig::with_endpoint(host, port);
        }

        self.link(None).await
    }

    pub async fn link(&mut self, input: Option<UserInput>) -> FlowResult<StepResult> {
        self.ensure_active()?;
        let host = self
            .state
            .selected
            .host
            .clone()
            .filter(|h| !h.is_empty())
            .ok_or(FlowError::Precondition("link reached without a selected gateway"))?;
        self.phase = WizardPhase::AwaitLink;
        if input.is_none() {
            return Ok(link_form());
        }

        let port = self.state.selected.port_or_default();

        if let Some(result) = self.single_instance_guard().await? {
            return Ok(result);
        }

        match self.gateway.pair(&host, port).await {
            Ok(api_key) if !api_key.is_empty() => {
                info!(host = %host, port, "Obtained API key");
                self.state.selected.api_key = Some(api_key);
                self.finalize().await
            }
            Ok(_) => Ok(link_form().with_error(BASE_ERROR, FormError::NoKey)),
            Err(GatewayError::Rejected(reason)) => {
                info!(host = %host, port, "Gateway refused pairing: {reason}");
                Ok(link_form().with_error(BASE_ERROR, FormError::NoKey))
            }
            Err(e) => {
                warn!(host = %host, port, "Pairing failed: {e}");
                Ok(link_form().with_error(BASE_ERROR, FormError::CannotConnect))
            }
        }
    }

    pub async fn discovery_push(&mut self, info: DiscoveryInfo) -> FlowResult<StepResult> {
        self.ensure_active()?;
        let existing = self
            .store
            .find_by_host(&info.host)
            .await
            .map_err(FlowError::Store)?;
        if existing.is_some() {
            info!(host = %info.host, "Announced gateway is already configured");
            return Ok(self.abort(AbortReason::AlreadyConfigured));
        }
        if let Some(result) = self.single_instance_guard().await? {
            return Ok(result);
        }
        if let Some(form) = self.check_endpoint(&info.host, info.port) {
            warn!(host = %info.host, port = info.port, "Announced gateway has an unusable address");
            return Ok(form);
        }

        self.state.selected = PartialConfig {
            bridgeid: info.serial.filter(|s| !s.is_empty()),
            ..PartialConfig::with_endpoint(info.host, info.port)
        };
        self.link(None).await
    }

    pub async fn import_legacy(&mut self, config: ImportConfig) -> FlowResult<StepResult> {
        self.ensure_active()?;
        let host = config.host.trim();
        let port = config.port.unwrap_or(self.default_port);
        if let Some(form) = self.check_endpoint(host, port) {
            return Ok(form);
        }

        self.state.selected = PartialConfig {
            host: Some(host.to_string()),
            port: Some(port),
            api_key: config.api_key.filter(|k| !k.is_empty()),
            bridgeid: config.bridgeid.filter(|b| !b.is_empty()),
        };

        if self.state.selected.has_api_key() {
            debug!(host, "Imported configuration carries an API key");
            return self.finalize().await;
        }
        self.link(None).await
    }

    pub async fn addon_handoff(&mut self, info: HassioInfo) -> FlowResult<StepResult> {
        self.ensure_active()?;
        if let Some(result) = self.single_instance_guard().await? {
            return Ok(result);
        }
        if let Some(form) = self.check_endpoint(&info.host, info.port) {
            warn!(addon = %info.addon, "Add-on handed over an unusable address");
            return Ok(form);
        }
        info!(addon = %info.addon, host = %info.host, "Add-on handed over a gateway");
        let form = hassio_form(&info.addon);
        self.hassio = Some(info);
        self.phase = WizardPhase::AwaitLink;
        Ok(form)
    }

    pub async fn hassio_confirm(&mut self, input: Option<UserInput>) -> FlowResult<StepResult> {
        self.ensure_active()?;
        let info = self
            .hassio
            .clone()
            .ok_or(FlowError::Precondition("hassio confirmation without a handoff"))?;
        if input.is_none() {
            return Ok(hassio_form(&info.addon));
        }

        self.state.selected = PartialConfig {
            host: Some(info.host.trim().to_string()),
            port: Some(info.port),
            api_key: Some(info.api_key).filter(|k| !k.is_empty()),
            bridgeid: Some(info.serial).filter(|s| !s.is_empty()),
        };
        if !self.state.selected.has_api_key() {
            info!(addon = %info.addon, "Add-on did not provide an API key, pairing instead");
            return self.link(None).await;
        }
        self.finalize().await
    }

    /// Turn the selection into an entry. Every caller has an API key by now.
    pub async fn finalize(&mut self) -> FlowResult<StepResult> {
        self.ensure_active()?;
        let selected = &self.state.selected;
        let host = selected
            .host
            .clone()
            .filter(|h| !h.is_empty())
            .ok_or(FlowError::Precondition("finalize without a host"))?;
        let api_key = selected
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or(FlowError::Precondition("finalize without an API key"))?;
        let port = selected.port_or_default();

        let bridgeid = match selected.bridgeid.clone().filter(|b| !b.is_empty()) {
            Some(id) => id,
            None => match self.gateway.read_config(&host, port, &api_key).await {
                Ok(identity) if !identity.bridgeid.is_empty() => identity.bridgeid,
                Ok(_) => {
                    warn!(host = %host, port, "Gateway reported an empty bridge id");
                    return Ok(self.abort(AbortReason::NoBridges));
                }
                Err(e) => {
                    warn!(host = %host, port, "Could not read bridge id: {e}");
                    return Ok(self.abort(AbortReason::NoBridges));
                }
            },
        };
        self.state.selected.bridgeid = Some(bridgeid.clone());

        let data = FinalConfig {
            bridgeid,
            host,
            port,
            api_key,
        };
        if !data.is_complete() {
            return Err(FlowError::Precondition("finalize with incomplete data"));
        }

        let title = data.title();
        self.store
            .create_entry(&title, &data)
            .await
            .map_err(FlowError::Store)?;
        info!(title = %title, host = %data.host, port = data.port, "Created entry");
        self.phase = WizardPhase::Finalized;
        Ok(StepResult::CreateEntry { title, data })
    }

    /// Abort when any entry exists; only one gateway per installation.
    async fn single_instance_guard(&mut self) -> FlowResult<Option<StepResult>> {
        let existing = self.store.find_any().await.map_err(FlowError::Store)?;
        Ok(existing.map(|entry| {
            info!(title = %entry.title, "A gateway is already configured");
            self.abort(AbortReason::OneInstanceOnly)
        }))
    }

    fn abort(&mut self, reason: AbortReason) -> StepResult {
        self.phase = WizardPhase::Aborted;
        StepResult::abort(reason)
    }

    fn ensure_active(&self) -> FlowResult<()> {
        if self.phase.is_terminal() {
            return Err(FlowError::Finished(self.phase));
        }
        Ok(())
    }

    fn selection_form(&self) -> StepResult {
        let hosts = self.state.candidates.iter().map(|c| c.host.clone()).collect();
        StepResult::form(StepId::Select).with_field(FormField::select("host", hosts))
    }

    /// The form a host/port submission came from.
    fn entry_form(&self) -> StepResult {
        if self.state.candidates.is_empty() {
            self.manual_form(None)
        } else {
            self.selection_form()
        }
    }

    fn manual_form(&self, host: Option<&str>) -> StepResult {
        let mut host_field = FormField::text("host");
        host_field.default = host.filter(|h| !h.is_empty()).map(str::to_string);
        StepResult::form(StepId::Init)
            .with_field(host_field)
            .with_field(FormField::port("port", self.default_port))
    }

    /// Send a handed-over address that cannot be used back to manual entry.
    fn check_endpoint(&mut self, host: &str, port: u16) -> Option<StepResult> {
        let host = host.trim();
        let error = if host.is_empty() {
            ("host", FormError::Required)
        } else if port == 0 {
            ("port", FormError::InvalidPort)
        } else {
            return None;
        };
        self.phase = WizardPhase::Start;
        self.state.candidates.clear();
        Some(self.manual_form(Some(host)).with_error(error.0, error.1))
    }
}

fn link_form() -> StepResult {
    StepResult::form(StepId::Link)
}

fn hassio_form(addon: &str) -> StepResult {
    StepResult::form(StepId::HassioConfirm).with_placeholder("addon", addon)
}
