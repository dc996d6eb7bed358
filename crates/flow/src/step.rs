//! Results handed back to the host after each step.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use crate::types::FinalConfig;

/// Raw form submission, keyed by field name.
pub type UserInput = serde_json::Map<String, Value>;

/// Key of errors that belong to the whole form rather than one field.
pub const BASE_ERROR: &str = "base";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepId {
    /// Manual entry, or the retry point after a failed discovery.
    Init,
    Select,
    Link,
    HassioConfirm,
}

impl StepId {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepId::Init => "init",
            StepId::Select => "select",
            StepId::Link => "link",
            StepId::HassioConfirm => "hassio_confirm",
        }
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbortReason {
    AlreadyConfigured,
    OneInstanceOnly,
    NoBridges,
}

impl AbortReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            AbortReason::AlreadyConfigured => "already_configured",
            AbortReason::OneInstanceOnly => "one_instance_only",
            AbortReason::NoBridges => "no_bridges",
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            AbortReason::AlreadyConfigured => "This gateway is already configured.",
            AbortReason::OneInstanceOnly => "Only one deCONZ gateway can be configured.",
            AbortReason::NoBridges => "The gateway did not report its bridge id.",
        }
    }
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error codes placed in a form's error map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormError {
    NoKey,
    CannotConnect,
    Required,
    InvalidPort,
}

impl FormError {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormError::NoKey => "no_key",
            FormError::CannotConnect => "cannot_connect",
            FormError::Required => "required",
            FormError::InvalidPort => "invalid_port",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Port,
    Select { options: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    pub name: String,
    pub kind: FieldKind,
    pub required: bool,
    pub default: Option<String>,
}

impl FormField {
    pub fn text(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: FieldKind::Text,
            required: true,
            default: None,
        }
    }

    pub fn port(name: &str, default: u16) -> Self {
        Self {
            name: name.to_string(),
            kind: FieldKind::Port,
            required: true,
            default: Some(default.to_string()),
        }
    }

    pub fn select(name: &str, options: Vec<String>) -> Self {
        let default = options.first().cloned();
        Self {
            name: name.to_string(),
            kind: FieldKind::Select { options },
            required: true,
            default,
        }
    }

    /// Options of a select field, empty for free-form fields.
    pub fn options(&self) -> &[String] {
        match &self.kind {
            FieldKind::Select { options } => options,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StepResult {
    Form {
        step_id: StepId,
        fields: Vec<FormField>,
        errors: BTreeMap<String, String>,
        placeholders: BTreeMap<String, String>,
    },
    CreateEntry {
        title: String,
        data: FinalConfig,
    },
    Abort {
        reason: AbortReason,
    },
}

impl StepResult {
    pub fn form(step_id: StepId) -> Self {
        StepResult::Form {
            step_id,
            fields: Vec::new(),
            errors: BTreeMap::new(),
            placeholders: BTreeMap::new(),
        }
    }

    pub fn abort(reason: AbortReason) -> Self {
        StepResult::Abort { reason }
    }

    pub fn with_field(mut self, field: FormField) -> Self {
        if let StepResult::Form { fields, .. } = &mut self {
            fields.push(field);
        }
        self
    }

    pub fn with_error(mut self, key: &str, error: FormError) -> Self {
        if let StepResult::Form { errors, .. } = &mut self {
            errors.insert(key.to_string(), error.as_str().to_string());
        }
        self
    }

    pub fn with_placeholder(mut self, key: &str, value: &str) -> Self {
        if let StepResult::Form { placeholders, .. } = &mut self {
            placeholders.insert(key.to_string(), value.to_string());
        }
        self
    }

    pub fn step_id(&self) -> Option<StepId> {
        match self {
            StepResult::Form { step_id, .. } => Some(*step_id),
            _ => None,
        }
    }

    pub fn fields(&self) -> &[FormField] {
        match self {
            StepResult::Form { fields, .. } => fields,
            _ => &[],
        }
    }

    pub fn errors(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            StepResult::Form { errors, .. } => Some(errors),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, StepResult::Form { .. })
    }
}

pub(crate) fn input_str<'a>(input: &'a UserInput, key: &str) -> Option<&'a str> {
    input.get(key).and_then(Value::as_str).map(str::trim)
}

/// Port from a submission: absent means default, otherwise a number or numeric string.
pub(crate) fn input_port(input: &UserInput, key: &str) -> Result<Option<u16>, FormError> {
    let parsed = match input.get(key) {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => return Ok(None),
        Some(Value::Number(n)) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
        Some(Value::String(s)) => s.trim().parse::<u16>().ok(),
        Some(_) => None,
    };
    match parsed {
        Some(port) if port != 0 => Ok(Some(port)),
        _ => Err(FormError::InvalidPort),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input(value: Value) -> UserInput {
        value.as_object().cloned().expect("object")
    }

    #[test]
    fn port_accepts_numbers_and_numeric_strings() {
        assert_eq!(input_port(&input(json!({"port": 8080})), "port"), Ok(Some(8080)));
        assert_eq!(input_port(&input(json!({"port": " 443 "})), "port"), Ok(Some(443)));
        assert_eq!(input_port(&input(json!({})), "port"), Ok(None));
        assert_eq!(input_port(&input(json!({"port": ""})), "port"), Ok(None));
    }

    #[test]
    fn port_rejects_garbage() {
        assert_eq!(
            input_port(&input(json!({"port": "http"})), "port"),
            Err(FormError::InvalidPort)
        );
        assert_eq!(
            input_port(&input(json!({"port": 70000})), "port"),
            Err(FormError::InvalidPort)
        );
        assert_eq!(input_port(&input(json!({"port": 0})), "port"), Err(FormError::InvalidPort));
    }

    #[test]
    fn form_serializes_with_type_tag() {
        let form = StepResult::form(StepId::Link).with_error(BASE_ERROR, FormError::NoKey);
        let value = serde_json::to_value(&form).expect("serialize");
        assert_eq!(value["type"], "form");
        assert_eq!(value["step_id"], "link");
        assert_eq!(value["errors"]["base"], "no_key");
    }
}
