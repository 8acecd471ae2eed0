//! Form field specifications and the two validation checkpoints.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Custom acceptance predicate for a field's text.
pub type Predicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// How a field's input is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputKind {
    /// Free text, validated only on submit.
    Text,
    /// Numeric text, filtered on every keystroke by the field's predicate.
    Numeric,
}

/// The field that failed validation and the message to show for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub field_name: String,
    pub message: String,
}

impl ErrorInfo {
    pub fn new(field_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Declarative description of one form input.
#[derive(Clone)]
pub struct FieldSpec {
    pub name: String,
    pub label: String,
    pub kind: InputKind,
    pub required: bool,
    pub default_value: String,
    pub disabled: bool,
    pub error_message: String,
    pub validate: Option<Predicate>,
    pub description: String,
}

impl fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSpec")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("required", &self.required)
            .field("disabled", &self.disabled)
            .field("validate", &self.validate.is_some())
            .finish_non_exhaustive()
    }
}

impl FieldSpec {
    fn new(kind: InputKind, name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind,
            required: false,
            default_value: String::new(),
            disabled: false,
            error_message: String::new(),
            validate: None,
            description: String::new(),
        }
    }

    pub fn text(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(InputKind::Text, name, label)
    }

    pub fn numeric(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(InputKind::Numeric, name, label)
    }

    /// Mark the field required; `message` is shown when it is left empty.
    pub fn required(mut self, message: impl Into<String>) -> Self {
        self.required = true;
        self.error_message = message.into();
        self
    }

    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = value.into();
        self
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn validate(mut self, predicate: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        self.validate = Some(Arc::new(predicate));
        self
    }

    fn predicate_accepts(&self, text: &str) -> bool {
        self.validate.as_ref().is_none_or(|p| p(text))
    }

    /// Keystroke checkpoint: may `candidate` replace the buffered text?
    pub fn live_filter(&self, candidate: &str) -> bool {
        if self.disabled {
            return false;
        }
        match self.kind {
            InputKind::Numeric => self.predicate_accepts(candidate),
            InputKind::Text => true,
        }
    }

    fn failure(&self) -> ErrorInfo {
        if self.error_message.trim().is_empty() {
            ErrorInfo::new(&self.name, format!("Invalid {}", self.label))
        } else {
            ErrorInfo::new(&self.name, &self.error_message)
        }
    }

    /// Submit checkpoint.
    ///
    /// An absent predicate adds no constraint beyond required-ness, so a
    /// non-empty numeric value that no predicate inspects passes. Fields
    /// without their own message report `Invalid {label}`.
    pub fn submit_check(&self, value: &str) -> Result<(), ErrorInfo> {
        if self.disabled {
            return Ok(());
        }
        let empty = value.trim().is_empty();
        if self.required && empty {
            return Err(self.failure());
        }
        if self.kind == InputKind::Numeric && !empty && !self.predicate_accepts(value) {
            return Err(self.failure());
        }
        Ok(())
    }
}

/// Predicate for decimal amount entry at a given token precision.
///
/// Accepts partial input (`""`, `"12."`) so it can run on every keystroke.
pub fn decimal_input(decimals: u8) -> impl Fn(&str) -> bool + Send + Sync + 'static {
    move |text: &str| {
        let (int, frac) = match text.split_once('.') {
            Some((_, _)) if decimals == 0 => return false,
            Some((int, frac)) => (int, frac),
            None => (text, ""),
        };
        int.bytes().all(|b| b.is_ascii_digit())
            && frac.bytes().all(|b| b.is_ascii_digit())
            && frac.len() <= usize::from(decimals)
    }
}

/// Predicate that only lets digits and one decimal point through.
pub fn numeric_chars(text: &str) -> bool {
    text.bytes().filter(|b| *b == b'.').count() <= 1
        && text.bytes().all(|b| b.is_ascii_digit() || b == b'.')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amount_field() -> FieldSpec {
        FieldSpec::numeric("amount", "Amount")
            .required("Amount is required")
            .validate(decimal_input(2))
    }

    #[test]
    fn test_numeric_live_filter_uses_predicate() {
        let spec = amount_field();
        assert!(spec.live_filter(""));
        assert!(spec.live_filter("12."));
        assert!(spec.live_filter("12.34"));
        assert!(!spec.live_filter("12.345"));
        assert!(!spec.live_filter("12a"));
    }

    #[test]
    fn test_numeric_without_predicate_accepts_anything_live() {
        let spec = FieldSpec::numeric("n", "N");
        assert!(spec.live_filter("not a number"));
        assert!(spec.submit_check("not a number").is_ok());
    }

    #[test]
    fn test_text_fields_are_not_filtered_live() {
        let spec = FieldSpec::text("name", "Name")
            .required("Name is required")
            .validate(|_| false);
        assert!(spec.live_filter("anything"));
        // predicates only gate numeric fields
        assert!(spec.submit_check("anything").is_ok());
    }

    #[test]
    fn test_submit_check_required() {
        let spec = amount_field();
        let err = spec.submit_check("  ").unwrap_err();
        assert_eq!(err, ErrorInfo::new("amount", "Amount is required"));
        assert!(spec.submit_check("1.5").is_ok());

        let optional = FieldSpec::text("memo", "Memo");
        assert!(optional.submit_check("").is_ok());
    }

    #[test]
    fn test_submit_check_consults_numeric_predicate() {
        let spec = amount_field();
        assert!(spec.submit_check("1.234").is_err());
    }

    #[test]
    fn test_predicate_failure_without_message_uses_label() {
        let spec = FieldSpec::numeric("fee", "Forward fee").validate(decimal_input(2));
        let err = spec.submit_check("1.234").unwrap_err();
        assert_eq!(err, ErrorInfo::new("fee", "Invalid Forward fee"));
    }

    #[test]
    fn test_disabled_fields_are_exempt() {
        let spec = FieldSpec::numeric("decimals", "Decimals")
            .required("Decimals are required")
            .default_value("9")
            .disabled()
            .validate(|_| false);
        assert!(spec.submit_check("").is_ok());
        assert!(!spec.live_filter("1"));
    }

    #[test]
    fn test_decimal_input_predicate() {
        let whole = decimal_input(0);
        assert!(whole("10"));
        assert!(!whole("10."));

        let nine = decimal_input(9);
        assert!(nine(".123456789"));
        assert!(!nine("0.1234567891"));
        assert!(!nine("1.2.3"));
    }

    #[test]
    fn test_numeric_chars() {
        assert!(numeric_chars("0.001"));
        assert!(numeric_chars(""));
        assert!(!numeric_chars("1.2.3"));
        assert!(!numeric_chars("-1"));
    }
}
