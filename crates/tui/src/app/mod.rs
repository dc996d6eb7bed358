use crate::input::{collect_input, FieldInput};
use crate::keybinds::Keybinds;
use crate::Config;
use anyhow::Result;
use deconz_setup_flow::step::BASE_ERROR;
use deconz_setup_flow::{
    AbortReason, BridgeGateway, FinalConfig, FlowSource, ImportConfig, MemoryEntryStore,
    SetupWizard, StepId, StepResult, UserInput,
};
use ratatui::crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::Rect;
use ratatui::Frame;
use std::sync::Arc;

mod effects;
mod input;
mod render;
mod state;
mod types;

pub use effects::source_from_env;
pub use state::App;
pub use types::{ExportedEntry, PendingStep};

impl App {
    pub(super) fn report_error(&mut self, context: &str, error: impl std::fmt::Display) {
        let message = format!("{context}: {}", Self::redact_sensitive(&error.to_string()));
        self.last_error = Some(message.clone());
        tracing::warn!("{message}");
    }

    pub(super) fn clear_error(&mut self) {
        self.last_error = None;
        self.show_error_details = false;
    }

    /// Mask API keys carried in `/api/<key>/...` request paths.
    fn redact_sensitive(input: &str) -> String {
        const MARKER: &str = "/api/";
        let mut out = String::with_capacity(input.len());
        let mut rest = input;

        while let Some(pos) = rest.find(MARKER) {
            let (head, tail) = rest.split_at(pos + MARKER.len());
            out.push_str(head);
            let key_len = tail
                .find(|c: char| c == '/' || c == '?' || c.is_whitespace())
                .unwrap_or(tail.len());
            if key_len > 0 {
                out.push_str("[REDACTED]");
            }
            rest = &tail[key_len..];
        }
        out.push_str(rest);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::effects::source_from_vars;
    use super::*;
    use async_trait::async_trait;
    use deconz_setup_flow::{BridgeIdentity, CandidateBridge, GatewayError};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use std::collections::HashMap;

    struct StaticGateway {
        bridges: Vec<CandidateBridge>,
        locked: bool,
    }

    #[async_trait]
    impl BridgeGateway for StaticGateway {
        async fn discover(&self) -> Result<Vec<CandidateBridge>, GatewayError> {
            Ok(self.bridges.clone())
        }

        async fn pair(&self, _host: &str, _port: u16) -> Result<String, GatewayError> {
            if self.locked {
                Err(GatewayError::Rejected("link button not pressed".to_string()))
            } else {
                Ok("1234567890".to_string())
            }
        }

        async fn read_config(
            &self,
            _host: &str,
            _port: u16,
            _api_key: &str,
        ) -> Result<BridgeIdentity, GatewayError> {
            Ok(BridgeIdentity {
                bridgeid: "00212EFFFF012345".to_string(),
            })
        }
    }

    fn app_with(bridges: &[&str], locked: bool) -> App {
        let gateway = StaticGateway {
            bridges: bridges
                .iter()
                .enumerate()
                .map(|(i, host)| CandidateBridge {
                    id: format!("bridge-{i}"),
                    host: host.to_string(),
                    port: 80,
                })
                .collect(),
            locked,
        };
        App::new(Config::default(), Arc::new(gateway), FlowSource::User)
    }

    fn press(app: &mut App, code: KeyCode) -> bool {
        app.handle_event(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
            .unwrap()
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[tokio::test]
    async fn selecting_and_linking_produces_an_entry() {
        let mut app = app_with(&["10.0.0.2", "10.0.0.3"], false);
        app.run_pending().await;
        assert_eq!(
            app.step.as_ref().and_then(StepResult::step_id),
            Some(StepId::Select)
        );

        press(&mut app, KeyCode::Down);
        assert_eq!(app.fields[0].buffer, "10.0.0.3");
        press(&mut app, KeyCode::Enter);
        assert!(app.is_loading);
        app.run_pending().await;
        assert_eq!(
            app.step.as_ref().and_then(StepResult::step_id),
            Some(StepId::Link)
        );

        press(&mut app, KeyCode::Enter);
        app.run_pending().await;

        let exported = app.exported_entry().expect("entry created");
        assert_eq!(exported.title, "deCONZ-00212EFFFF012345");
        assert_eq!(exported.gateway.host, "10.0.0.3");
        assert_eq!(exported.gateway.api_key, "1234567890");
        assert_eq!(app.store.entries().await.len(), 1);

        assert!(press(&mut app, KeyCode::Enter));
    }

    #[tokio::test]
    async fn manual_entry_keeps_typed_values_after_an_error() {
        let mut app = app_with(&[], false);
        app.run_pending().await;
        assert_eq!(
            app.step.as_ref().and_then(StepResult::step_id),
            Some(StepId::Init)
        );

        press(&mut app, KeyCode::Enter);
        app.run_pending().await;

        let errors = app.step.as_ref().and_then(StepResult::errors).unwrap();
        assert_eq!(errors.get("host").map(String::as_str), Some("required"));

        type_text(&mut app, "192.168.1.20");
        press(&mut app, KeyCode::Enter);
        app.run_pending().await;
        assert_eq!(
            app.step.as_ref().and_then(StepResult::step_id),
            Some(StepId::Link)
        );
        assert_eq!(
            app.wizard.selected().host.as_deref(),
            Some("192.168.1.20")
        );
    }

    #[tokio::test]
    async fn locked_gateway_shows_no_key_on_the_link_form() {
        let mut app = app_with(&["10.0.0.2"], true);
        app.run_pending().await;
        press(&mut app, KeyCode::Enter);
        app.run_pending().await;
        press(&mut app, KeyCode::Enter);
        app.run_pending().await;

        let errors = app.step.as_ref().and_then(StepResult::errors).unwrap();
        assert_eq!(errors.get(BASE_ERROR).map(String::as_str), Some("no_key"));
        assert!(app.exported_entry().is_none());
    }

    #[tokio::test]
    async fn submitting_after_the_flow_finished_reports_an_error() {
        let mut app = app_with(&["10.0.0.2"], false);
        app.run_pending().await;
        press(&mut app, KeyCode::Enter);
        app.run_pending().await;
        press(&mut app, KeyCode::Enter);
        app.run_pending().await;
        assert!(app.exported_entry().is_some());

        app.queue_step(StepId::Link, None);
        app.run_pending().await;
        assert!(app.last_error.is_some());
        assert!(app.exported_entry().is_some());
    }

    #[tokio::test]
    async fn configured_default_port_prefills_manual_entry() {
        let mut config = Config::default();
        config.bridge.default_port = 8080;
        let gateway = StaticGateway {
            bridges: Vec::new(),
            locked: false,
        };
        let mut app = App::new(config, Arc::new(gateway), FlowSource::User);
        app.run_pending().await;

        assert_eq!(app.fields[1].field.name, "port");
        assert_eq!(app.fields[1].buffer, "8080");

        // an empty port falls back to the configured one
        app.fields[1].clear();
        type_text(&mut app, "10.0.0.7");
        press(&mut app, KeyCode::Enter);
        app.run_pending().await;
        assert_eq!(app.wizard.selected().port, Some(8080));
    }

    #[test]
    fn help_toggles_outside_text_fields() {
        let mut app = app_with(&[], false);
        app.is_loading = false;
        app.step = Some(StepResult::form(StepId::Link));
        press(&mut app, KeyCode::Char('?'));
        assert!(app.show_help);
        press(&mut app, KeyCode::Esc);
        assert!(!app.show_help);
    }

    #[test]
    fn keys_are_ignored_while_loading() {
        let mut app = app_with(&[], false);
        assert!(app.is_loading);
        assert!(!press(&mut app, KeyCode::Esc));
        assert_eq!(app.pending, Some(PendingStep::Start));
    }

    #[test]
    fn env_host_selects_import_source() {
        let vars: HashMap<&str, &str> = [
            ("DECONZ_HOST", "10.0.0.9"),
            ("DECONZ_PORT", "8080"),
            ("DECONZ_API_KEY", "ABCDEF"),
        ]
        .into_iter()
        .collect();

        let source = source_from_vars(|k| vars.get(k).map(|v| v.to_string()), 80);
        assert_eq!(
            source,
            FlowSource::Import(ImportConfig {
                host: "10.0.0.9".to_string(),
                port: Some(8080),
                api_key: Some("ABCDEF".to_string()),
                bridgeid: None,
            })
        );
    }

    #[test]
    fn env_without_host_is_a_user_flow() {
        let source = source_from_vars(|_| None, 80);
        assert_eq!(source, FlowSource::User);

        let source = source_from_vars(|k| (k == "DECONZ_HOST").then(|| "  ".to_string()), 80);
        assert_eq!(source, FlowSource::User);
    }

    #[test]
    fn redacts_api_keys_in_paths() {
        let redacted =
            App::redact_sensitive("GET http://10.0.0.2:80/api/ABCDEF1234/config failed");
        assert_eq!(
            redacted,
            "GET http://10.0.0.2:80/api/[REDACTED]/config failed"
        );
        assert_eq!(
            App::redact_sensitive("POST http://10.0.0.2/api failed"),
            "POST http://10.0.0.2/api failed"
        );
    }

    #[tokio::test]
    async fn renders_the_selection_form() {
        let mut app = app_with(&["10.0.0.2"], false);
        app.run_pending().await;

        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal.draw(|frame| app.render(frame)).unwrap();

        let buffer = terminal.backend().buffer();
        let screen: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(screen.contains("Select gateway"));
        assert!(screen.contains("10.0.0.2"));
    }
}
