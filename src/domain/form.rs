//! Controlled multi-field form with first-error-only submission.

use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::field::{ErrorInfo, FieldSpec};

/// Problems with the form definition or with a field lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormSpecError {
    #[error("Form has no fields")]
    NoFields,
    #[error("Field name must not be empty")]
    EmptyName,
    #[error("Duplicate field name: {0}")]
    DuplicateField(String),
    #[error("Unknown field: {0}")]
    UnknownField(String),
}

/// Values collected by a successful submit, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormValues(Vec<(String, String)>);

impl FormValues {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Result of [`FormEngine::handle_submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome<T> {
    /// No wallet is connected; the handler was not called.
    NotConnected,
    /// Validation failed on this field; the handler was not called.
    Invalid(ErrorInfo),
    /// The handler ran and returned this value.
    Submitted(T),
}

#[derive(Debug, Clone)]
struct FieldState {
    spec: FieldSpec,
    seed: String,
    value: String,
    error: Option<ErrorInfo>,
}

/// Form state driven by an ordered list of [`FieldSpec`]s.
#[derive(Debug, Clone)]
pub struct FormEngine {
    fields: Vec<FieldState>,
    disable_example: bool,
    submitted: bool,
}

impl FormEngine {
    /// Validate the field list and seed each value.
    ///
    /// Disabled fields start with their default; enabled fields start empty.
    pub fn register(specs: Vec<FieldSpec>) -> Result<Self, FormSpecError> {
        if specs.is_empty() {
            return Err(FormSpecError::NoFields);
        }

        let mut fields: Vec<FieldState> = Vec::with_capacity(specs.len());
        for spec in specs {
            if spec.name.trim().is_empty() {
                return Err(FormSpecError::EmptyName);
            }
            if fields.iter().any(|f| f.spec.name == spec.name) {
                return Err(FormSpecError::DuplicateField(spec.name));
            }
            let seed = if spec.disabled {
                spec.default_value.clone()
            } else {
                String::new()
            };
            fields.push(FieldState {
                spec,
                value: seed.clone(),
                seed,
                error: None,
            });
        }

        Ok(Self {
            fields,
            disable_example: false,
            submitted: false,
        })
    }

    /// Seed enabled fields from form-level defaults instead of empty text.
    pub fn with_defaults<K, V>(
        mut self,
        defaults: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Self, FormSpecError>
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        for (name, value) in defaults {
            let field = self.field_mut(name.as_ref())?;
            if !field.spec.disabled {
                field.seed = value.into();
                field.value = field.seed.clone();
            }
        }
        Ok(self)
    }

    /// Hide the "example" affordance on every field.
    pub fn without_examples(mut self) -> Self {
        self.disable_example = true;
        self
    }

    fn field(&self, name: &str) -> Result<&FieldState, FormSpecError> {
        self.fields
            .iter()
            .find(|f| f.spec.name == name)
            .ok_or_else(|| FormSpecError::UnknownField(name.to_string()))
    }

    fn field_mut(&mut self, name: &str) -> Result<&mut FieldState, FormSpecError> {
        self.fields
            .iter_mut()
            .find(|f| f.spec.name == name)
            .ok_or_else(|| FormSpecError::UnknownField(name.to_string()))
    }

    pub fn specs(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().map(|f| &f.spec)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn spec_at(&self, index: usize) -> Option<&FieldSpec> {
        self.fields.get(index).map(|f| &f.spec)
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.field(name).ok().map(|f| f.value.as_str())
    }

    pub fn error(&self, name: &str) -> Option<&ErrorInfo> {
        self.field(name).ok().and_then(|f| f.error.as_ref())
    }

    /// Current errors in declaration order.
    pub fn errors(&self) -> impl Iterator<Item = &ErrorInfo> {
        self.fields.iter().filter_map(|f| f.error.as_ref())
    }

    /// Replace a field's text if the live filter accepts it.
    ///
    /// Returns whether the value was taken. After the first submit attempt
    /// the field is re-validated on every accepted change.
    pub fn set_value(&mut self, name: &str, value: impl Into<String>) -> Result<bool, FormSpecError> {
        let revalidate = self.submitted;
        let field = self.field_mut(name)?;
        let value = value.into();
        if !field.spec.live_filter(&value) {
            return Ok(false);
        }
        if revalidate {
            field.error = field.spec.submit_check(&value).err();
        }
        field.value = value;
        Ok(true)
    }

    /// Drop a stale error, typically when the field gains focus.
    pub fn clear_error(&mut self, name: &str) -> Result<(), FormSpecError> {
        self.field_mut(name)?.error = None;
        Ok(())
    }

    /// Whether the "example" affordance is offered for a field.
    pub fn has_example(&self, name: &str) -> bool {
        !self.disable_example
            && self
                .field(name)
                .is_ok_and(|f| !f.spec.disabled && !f.spec.default_value.is_empty())
    }

    /// Fill a field with its declared default and clear its error.
    pub fn apply_example(&mut self, name: &str) -> Result<bool, FormSpecError> {
        if !self.has_example(name) {
            return Ok(false);
        }
        let field = self.field_mut(name)?;
        field.value = field.spec.default_value.clone();
        field.error = None;
        Ok(true)
    }

    /// Validate every field in declaration order.
    ///
    /// All failures are recorded on their fields, but only the first is
    /// returned so one attempt yields one message.
    pub fn submit(&mut self) -> Result<FormValues, ErrorInfo> {
        self.submitted = true;
        let mut first_error = None;
        for field in &mut self.fields {
            field.error = field.spec.submit_check(&field.value).err();
            if first_error.is_none() {
                first_error = field.error.clone();
            }
        }

        match first_error {
            Some(error) => Err(error),
            None => Ok(FormValues(
                self.fields
                    .iter()
                    .map(|f| (f.spec.name.clone(), f.value.clone()))
                    .collect(),
            )),
        }
    }

    /// Submit and hand the values to `on_submit` when valid and connected.
    pub async fn handle_submit<F, Fut>(
        &mut self,
        connected: bool,
        on_submit: F,
    ) -> SubmitOutcome<Fut::Output>
    where
        F: FnOnce(FormValues) -> Fut,
        Fut: Future,
    {
        if !connected {
            return SubmitOutcome::NotConnected;
        }
        match self.submit() {
            Ok(values) => SubmitOutcome::Submitted(on_submit(values).await),
            Err(error) => SubmitOutcome::Invalid(error),
        }
    }

    /// Return every field to its seed value and forget errors.
    pub fn reset(&mut self) {
        self.submitted = false;
        for field in &mut self.fields {
            field.value = field.seed.clone();
            field.error = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::field::decimal_input;

    fn transfer_form() -> FormEngine {
        FormEngine::register(vec![
            FieldSpec::text("recipient", "Recipient")
                .required("Recipient address is required")
                .default_value("0:abc"),
            FieldSpec::numeric("amount", "Amount")
                .required("Amount is required")
                .default_value("10")
                .validate(decimal_input(2)),
            FieldSpec::numeric("decimals", "Decimals")
                .default_value("2")
                .disabled(),
        ])
        .unwrap()
    }

    #[test]
    fn test_register_seeds_values() {
        let form = transfer_form();
        assert_eq!(form.value("recipient"), Some(""));
        assert_eq!(form.value("amount"), Some(""));
        assert_eq!(form.value("decimals"), Some("2"));
    }

    #[test]
    fn test_register_rejects_bad_specs() {
        assert_eq!(
            FormEngine::register(vec![]).unwrap_err(),
            FormSpecError::NoFields
        );
        assert_eq!(
            FormEngine::register(vec![FieldSpec::text(" ", "Blank")]).unwrap_err(),
            FormSpecError::EmptyName
        );
        assert_eq!(
            FormEngine::register(vec![FieldSpec::text("a", "A"), FieldSpec::numeric("a", "A")])
                .unwrap_err(),
            FormSpecError::DuplicateField("a".to_string())
        );
    }

    #[test]
    fn test_submit_surfaces_first_declared_error() {
        let mut form = transfer_form();
        let err = form.submit().unwrap_err();
        assert_eq!(err.field_name, "recipient");
        assert_eq!(err.message, "Recipient address is required");
        // both failures are still recorded on their fields
        assert_eq!(form.errors().count(), 2);
    }

    #[test]
    fn test_submit_collects_values_in_order() {
        let mut form = transfer_form();
        assert!(form.set_value("recipient", "0:abc").unwrap());
        assert!(form.set_value("amount", "1.5").unwrap());
        let values = form.submit().unwrap();
        let names: Vec<&str> = values.iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["recipient", "amount", "decimals"]);
        assert_eq!(values.get("amount"), Some("1.5"));
        assert_eq!(values.get("decimals"), Some("2"));
    }

    #[test]
    fn test_live_filter_keeps_previous_value() {
        let mut form = transfer_form();
        assert!(form.set_value("amount", "1.2").unwrap());
        assert!(!form.set_value("amount", "1.234").unwrap());
        assert_eq!(form.value("amount"), Some("1.2"));
        assert!(!form.set_value("decimals", "5").unwrap());
        assert!(form.set_value("missing", "x").is_err());
    }

    #[test]
    fn test_clear_error_and_revalidate_on_change() {
        let mut form = transfer_form();
        form.submit().unwrap_err();
        form.clear_error("recipient").unwrap();
        assert!(form.error("recipient").is_none());
        assert!(form.error("amount").is_some());

        form.set_value("amount", "3").unwrap();
        assert!(form.error("amount").is_none());
        form.set_value("amount", "").unwrap();
        assert!(form.error("amount").is_some());
    }

    #[test]
    fn test_apply_example_sets_default_and_clears_error() {
        let mut form = transfer_form();
        form.submit().unwrap_err();
        assert!(form.apply_example("amount").unwrap());
        assert_eq!(form.value("amount"), Some("10"));
        assert!(form.error("amount").is_none());

        assert!(!form.has_example("decimals"));
        assert!(!form.apply_example("decimals").unwrap());

        let mut plain = transfer_form().without_examples();
        assert!(!plain.apply_example("amount").unwrap());
        assert_eq!(plain.value("amount"), Some(""));
    }

    #[test]
    fn test_with_defaults_and_reset() {
        let mut form = transfer_form()
            .with_defaults([("amount", "5"), ("decimals", "7")])
            .unwrap();
        assert_eq!(form.value("amount"), Some("5"));
        assert_eq!(form.value("decimals"), Some("2"));

        form.set_value("amount", "6").unwrap();
        form.submit().unwrap_err();
        form.reset();
        assert_eq!(form.value("amount"), Some("5"));
        assert_eq!(form.errors().count(), 0);
    }

    #[test]
    fn test_seeded_value_failing_predicate_has_a_message() {
        // Defaults skip the live filter, so the predicate first runs at submit.
        let mut form = FormEngine::register(vec![
            FieldSpec::numeric("fee", "Forward fee").validate(decimal_input(2)),
        ])
        .unwrap()
        .with_defaults([("fee", "0.055")])
        .unwrap();
        let err = form.submit().unwrap_err();
        assert_eq!(err.message, "Invalid Forward fee");
    }

    #[tokio::test]
    async fn test_handle_submit_gates_on_connection_and_validity() {
        let mut form = transfer_form();
        let outcome = form.handle_submit(false, |_| async { 1 }).await;
        assert_eq!(outcome, SubmitOutcome::NotConnected);

        let outcome = form.handle_submit(true, |_| async { 1 }).await;
        assert!(matches!(outcome, SubmitOutcome::Invalid(ref e) if e.field_name == "recipient"));

        form.apply_example("recipient").unwrap();
        form.apply_example("amount").unwrap();
        let outcome = form
            .handle_submit(true, |values| async move { values.get("amount").map(str::to_string) })
            .await;
        assert_eq!(outcome, SubmitOutcome::Submitted(Some("10".to_string())));
    }
}
