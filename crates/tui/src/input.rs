use deconz_setup_flow::{FieldKind, FormField, UserInput};
use serde_json::Value;

/// Edit buffer for one field of the form on screen.
#[derive(Debug, Clone)]
pub struct FieldInput {
    pub field: FormField,
    pub buffer: String,
    option_index: usize,
}

impl FieldInput {
    pub fn new(field: FormField) -> Self {
        let buffer = field.default.clone().unwrap_or_default();
        let option_index = field
            .options()
            .iter()
            .position(|o| Some(o) == field.default.as_ref())
            .unwrap_or(0);
        Self {
            field,
            buffer,
            option_index,
        }
    }

    pub fn is_select(&self) -> bool {
        matches!(self.field.kind, FieldKind::Select { .. })
    }

    pub fn handle_char(&mut self, c: char) {
        match self.field.kind {
            FieldKind::Select { .. } => {}
            FieldKind::Port if !c.is_ascii_digit() => {}
            _ => self.buffer.push(c),
        }
    }

    pub fn handle_backspace(&mut self) {
        if !self.is_select() {
            self.buffer.pop();
        }
    }

    pub fn clear(&mut self) {
        if !self.is_select() {
            self.buffer.clear();
        }
    }

    pub fn cycle_option(&mut self, forward: bool) {
        let options = self.field.options();
        if options.is_empty() {
            return;
        }
        self.option_index = if forward {
            (self.option_index + 1) % options.len()
        } else {
            (self.option_index + options.len() - 1) % options.len()
        };
        self.buffer = options[self.option_index].clone();
    }

    pub fn value(&self) -> Value {
        match self.field.kind {
            FieldKind::Port => self
                .buffer
                .parse::<u64>()
                .map(Value::from)
                .unwrap_or_else(|_| Value::String(self.buffer.clone())),
            _ => Value::String(self.buffer.clone()),
        }
    }
}

/// Collect every field into the submission the wizard expects.
pub fn collect_input(fields: &[FieldInput]) -> UserInput {
    fields
        .iter()
        .map(|f| (f.field.name.clone(), f.value()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_field_only_accepts_digits() {
        let mut input = FieldInput::new(FormField::port("port", 80));
        input.clear();
        for c in "8a0x8".chars() {
            input.handle_char(c);
        }
        assert_eq!(input.buffer, "808");
        assert_eq!(input.value(), Value::from(808u64));
    }

    #[test]
    fn select_field_cycles_options() {
        let mut input = FieldInput::new(FormField::select(
            "host",
            vec!["1.2.3.4".to_string(), "5.6.7.8".to_string()],
        ));
        assert_eq!(input.buffer, "1.2.3.4");
        input.handle_char('x');
        input.cycle_option(true);
        assert_eq!(input.buffer, "5.6.7.8");
        input.cycle_option(true);
        assert_eq!(input.buffer, "1.2.3.4");
        input.cycle_option(false);
        assert_eq!(input.buffer, "5.6.7.8");
    }

    #[test]
    fn collect_input_keys_by_field_name() {
        let mut host = FieldInput::new(FormField::text("host"));
        "10.0.0.2".chars().for_each(|c| host.handle_char(c));
        let port = FieldInput::new(FormField::port("port", 80));

        let input = collect_input(&[host, port]);
        assert_eq!(input["host"], "10.0.0.2");
        assert_eq!(input["port"], 80);
    }
}
