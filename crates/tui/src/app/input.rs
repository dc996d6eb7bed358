use super::*;
use ratatui::crossterm::event::KeyEventKind;

impl App {
    pub fn handle_event(&mut self, event: Event) -> Result<bool> {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key_event(key),
            _ => Ok(false),
        }
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<bool> {
        if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Ok(true);
        }

        if self.is_loading {
            return Ok(false);
        }

        if self.show_help {
            if key.code == KeyCode::Esc || key.code == KeyCode::Char('?') {
                self.show_help = false;
            }
            return Ok(false);
        }

        if self.show_error_details {
            match key.code {
                KeyCode::Esc | KeyCode::Enter | KeyCode::Char('E') => {
                    self.show_error_details = false;
                }
                _ => {}
            }
            return Ok(false);
        }

        let Some(step_id) = self.step.as_ref().and_then(StepResult::step_id) else {
            // finished, aborted, or failed to start: any confirmation leaves
            return Ok(matches!(key.code, KeyCode::Enter | KeyCode::Esc));
        };

        if !self.editing_text() {
            match key.code {
                KeyCode::Char('?') => {
                    self.show_help = true;
                    return Ok(false);
                }
                KeyCode::Char('E') if self.last_error.is_some() => {
                    self.show_error_details = true;
                    return Ok(false);
                }
                _ => {}
            }
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('r') => {
                    // reloading the selection means searching again
                    let step = match step_id {
                        StepId::Select => StepId::Init,
                        other => other,
                    };
                    self.queue_step(step, None);
                }
                KeyCode::Char('u') => {
                    if let Some(field) = self.fields.get_mut(self.selected_field) {
                        field.clear();
                    }
                }
                _ => {}
            }
            return Ok(false);
        }

        match key.code {
            KeyCode::Esc => return Ok(true),
            KeyCode::Enter => {
                let input = collect_input(&self.fields);
                self.queue_step(step_id, Some(input));
            }
            KeyCode::Tab => self.focus_field(true),
            KeyCode::BackTab => self.focus_field(false),
            KeyCode::Up | KeyCode::Down => {
                let forward = key.code == KeyCode::Down;
                if let Some(field) = self.fields.get_mut(self.selected_field) {
                    field.cycle_option(forward);
                }
            }
            KeyCode::Backspace => {
                if let Some(field) = self.fields.get_mut(self.selected_field) {
                    field.handle_backspace();
                }
            }
            KeyCode::Char(c) => {
                if let Some(field) = self.fields.get_mut(self.selected_field) {
                    field.handle_char(c);
                }
            }
            _ => {}
        }

        Ok(false)
    }

    fn editing_text(&self) -> bool {
        self.fields
            .get(self.selected_field)
            .is_some_and(|f| !f.is_select())
    }

    fn focus_field(&mut self, forward: bool) {
        let count = self.fields.len();
        if count == 0 {
            return;
        }
        self.selected_field = if forward {
            (self.selected_field + 1) % count
        } else {
            (self.selected_field + count - 1) % count
        };
    }
}
