use super::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use std::collections::BTreeMap;

impl App {
    pub fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        if self.is_loading {
            self.render_loading(frame, area);
            return;
        }

        match &self.step {
            Some(StepResult::Form {
                step_id,
                errors,
                placeholders,
                ..
            }) => self.render_form(frame, area, *step_id, errors, placeholders),
            Some(StepResult::CreateEntry { title, data }) => {
                self.render_created(frame, area, title, data)
            }
            Some(StepResult::Abort { reason }) => self.render_aborted(frame, area, *reason),
            None => self.render_failed(frame, area),
        }

        if self.show_help {
            self.render_help(frame, area);
        }

        if self.show_error_details {
            self.render_error_details(frame, area);
        }
    }

    fn render_loading(&self, frame: &mut Frame, area: Rect) {
        let text = format!("\n\n  {}  \n\n", self.loading_message);
        let paragraph = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).title(" deCONZ setup "))
            .centered();
        frame.render_widget(paragraph, area);
    }

    fn render_form(
        &self,
        frame: &mut Frame,
        area: Rect,
        step_id: StepId,
        errors: &BTreeMap<String, String>,
        placeholders: &BTreeMap<String, String>,
    ) {
        let error_style = Style::default().fg(Color::Red);
        let mut lines = vec![
            Line::from(""),
            Line::from(format!("  {}", step_description(step_id, placeholders))),
            Line::from(""),
        ];

        if let Some(code) = errors.get(BASE_ERROR) {
            lines.push(Line::styled(format!("  ! {}", error_text(code)), error_style));
            lines.push(Line::from(""));
        }

        for (idx, input) in self.fields.iter().enumerate() {
            let focused = idx == self.selected_field;
            let value = if input.is_select() {
                format!("< {} >", input.buffer)
            } else if focused {
                format!("{}_", input.buffer)
            } else {
                input.buffer.clone()
            };
            let style = if focused {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            lines.push(Line::from(vec![
                Span::raw(format!("  {:<6} ", field_label(&input.field.name))),
                Span::styled(value, style),
            ]));
            if let Some(code) = errors.get(&input.field.name) {
                lines.push(Line::styled(format!("         {}", error_text(code)), error_style));
            }
        }

        lines.push(Line::from(""));
        lines.push(Line::styled(
            format!("  {}", step_hint(step_id, &self.fields)),
            Style::default().fg(Color::DarkGray),
        ));
        if self.last_error.is_some() {
            lines.push(Line::styled("  [Shift+E] show error details", error_style));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" deCONZ setup - {} ", step_title(step_id))),
        );
        frame.render_widget(paragraph, area);
    }

    fn render_created(&self, frame: &mut Frame, area: Rect, title: &str, data: &FinalConfig) {
        let text = format!(
            "\n\n  Gateway configured: {}\n\n  Host:      {}\n  Port:      {}\n  Bridge id: {}\n  API key:   {}\n\n  Press [Enter] to exit and print the entry\n",
            title,
            data.host,
            data.port,
            data.bridgeid,
            mask_key(&data.api_key)
        );
        let paragraph = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).title(" deCONZ setup - Done "));
        frame.render_widget(paragraph, area);
    }

    fn render_aborted(&self, frame: &mut Frame, area: Rect, reason: AbortReason) {
        let text = format!(
            "\n\n  Setup stopped: {}\n  ({})\n\n  Press [Enter] to exit\n",
            reason.user_message(),
            reason
        );
        let paragraph = Paragraph::new(text)
            .style(Style::default().fg(Color::Red))
            .block(Block::default().borders(Borders::ALL).title(" deCONZ setup - Aborted "));
        frame.render_widget(paragraph, area);
    }

    fn render_failed(&self, frame: &mut Frame, area: Rect) {
        let details = self.last_error.as_deref().unwrap_or("Setup could not start.");
        let text = format!("\n\n  {}\n\n  Press [Enter] to exit\n", details);
        let paragraph = Paragraph::new(text)
            .wrap(Wrap { trim: false })
            .style(Style::default().fg(Color::Red))
            .block(Block::default().borders(Borders::ALL).title(" deCONZ setup - Error "));
        frame.render_widget(paragraph, area);
    }

    fn render_help(&self, frame: &mut Frame, area: Rect) {
        let help_text = self.keybinds.help_text();
        let popup_area = self.centered_rect(60, 70, area);

        frame.render_widget(Clear, popup_area);
        frame.render_widget(
            Paragraph::new(help_text).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Help - Press ? to close "),
            ),
            popup_area,
        );
    }

    fn render_error_details(&self, frame: &mut Frame, area: Rect) {
        let popup_area = self.centered_rect(60, 20, area);
        let details = self
            .last_error
            .as_deref()
            .unwrap_or("No error details available.");
        let text = format!("{}\n\n[Esc] or [Enter] to close", details);

        frame.render_widget(Clear, popup_area);
        frame.render_widget(
            Paragraph::new(text).wrap(Wrap { trim: false }).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Error Details "),
            ),
            popup_area,
        );
    }

    fn centered_rect(&self, percent_x: u16, percent_y: u16, r: Rect) -> Rect {
        let popup_layout = ratatui::layout::Layout::default()
            .direction(ratatui::layout::Direction::Vertical)
            .constraints([
                ratatui::layout::Constraint::Percentage((100 - percent_y) / 2),
                ratatui::layout::Constraint::Percentage(percent_y),
                ratatui::layout::Constraint::Percentage((100 - percent_y) / 2),
            ])
            .split(r);

        ratatui::layout::Layout::default()
            .direction(ratatui::layout::Direction::Horizontal)
            .constraints([
                ratatui::layout::Constraint::Percentage((100 - percent_x) / 2),
                ratatui::layout::Constraint::Percentage(percent_x),
                ratatui::layout::Constraint::Percentage((100 - percent_x) / 2),
            ])
            .split(popup_layout[1])[1]
    }
}

pub(super) fn step_title(step: StepId) -> &'static str {
    match step {
        StepId::Init => "Define gateway",
        StepId::Select => "Select gateway",
        StepId::Link => "Link with deCONZ",
        StepId::HassioConfirm => "Add-on gateway",
    }
}

pub(super) fn step_description(step: StepId, placeholders: &BTreeMap<String, String>) -> String {
    match step {
        StepId::Init => "No gateway was found automatically. Enter its address.".to_string(),
        StepId::Select => "Choose one of the gateways found on your network.".to_string(),
        StepId::Link => "Unlock your gateway to register: Phoscon App > Settings > Gateway > \
                         Advanced > Authenticate app, then press Enter."
            .to_string(),
        StepId::HassioConfirm => format!(
            "Connect to the deCONZ gateway provided by the add-on {}?",
            placeholders.get("addon").map(String::as_str).unwrap_or("(unknown)")
        ),
    }
}

fn step_hint(step: StepId, fields: &[FieldInput]) -> &'static str {
    match step {
        StepId::Select if fields.iter().any(FieldInput::is_select) => {
            "[↑/↓] choose  [Enter] continue  [Ctrl+R] search again  [Esc] quit"
        }
        StepId::Init => "[Tab] next field  [Enter] continue  [Ctrl+R] search again  [Esc] quit",
        StepId::HassioConfirm => "[Enter] confirm  [Esc] quit",
        _ => "[Enter] continue  [Esc] quit",
    }
}

pub(super) fn error_text(code: &str) -> &str {
    match code {
        "no_key" => "Couldn't get an API key. Unlock the gateway and try again.",
        "cannot_connect" => "Couldn't reach the gateway.",
        "required" => "This field is required.",
        "invalid_port" => "Port must be a number between 1 and 65535.",
        other => other,
    }
}

fn field_label(name: &str) -> &str {
    match name {
        "host" => "Host",
        "port" => "Port",
        other => other,
    }
}

fn mask_key(key: &str) -> String {
    let visible: String = key.chars().take(4).collect();
    format!("{visible}{}", "*".repeat(key.chars().count().saturating_sub(4)))
}
