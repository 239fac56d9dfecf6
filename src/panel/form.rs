//! Create/edit form input and client-side validation.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::entity::Entity;
use crate::error::ValidationErrors;
use crate::status::{valid_labels, Status};

/// Raw field values submitted through a create or edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    fields: BTreeMap<String, String>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    pub fn with(mut self, field: &str, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn set(&mut self, field: &str, value: impl Into<String>) {
        self.fields.insert(field.to_string(), value.into());
    }

    /// Parse `key=value` pairs as given on the command line.
    pub fn parse_pairs<S: AsRef<str>>(pairs: &[S]) -> Result<Self, ValidationErrors> {
        let mut form = FormData::new();
        let mut errors = ValidationErrors::new();

        for pair in pairs {
            let pair = pair.as_ref();
            match pair.split_once('=') {
                Some((key, value)) if !key.trim().is_empty() => {
                    form.set(&key.trim().to_lowercase().replace('-', "_"), value)
                }
                _ => errors.push(pair, "expected 'field=value'"),
            }
        }

        if errors.is_empty() {
            Ok(form)
        } else {
            Err(errors)
        }
    }

    /// Trimmed value; blank input counts as absent.
    pub fn value(&self, field: &str) -> Option<&str> {
        self.raw(field).filter(|v| !v.is_empty())
    }

    /// Trimmed value, including blank input.
    pub fn raw(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(|v| v.trim())
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Fields accepted by edit forms only.
pub const EDIT_ONLY_FIELDS: &[&str] = &["remove_tags"];

/// A module whose records can be created and edited through forms.
pub trait FromForm: Entity {
    /// Field names the module's forms accept.
    const FIELDS: &'static [&'static str];

    fn from_form(form: &FormData, sequence_number: u32) -> Result<Self, ValidationErrors>;

    fn update_from_form(form: &FormData) -> Result<Self::Update, ValidationErrors>;
}

/// Collects field errors while reading a form.
///
/// Each accessor records an error and returns a placeholder on bad input, so
/// one pass reports every problem; `finish` then decides the outcome.
pub struct FormValidator<'a> {
    form: &'a FormData,
    errors: ValidationErrors,
}

impl<'a> FormValidator<'a> {
    pub fn new(form: &'a FormData) -> Self {
        Self {
            form,
            errors: ValidationErrors::new(),
        }
    }

    pub fn reject_unknown(&mut self, known: &[&str]) {
        let unknown: Vec<String> = self
            .form
            .field_names()
            .filter(|name| !known.contains(name))
            .map(str::to_string)
            .collect();
        for name in unknown {
            self.errors.push(&name, "unknown field");
        }
    }

    /// Like `reject_unknown`, but edit-only fields are refused too.
    pub fn reject_unknown_on_create(&mut self, known: &[&str]) {
        let create_fields: Vec<&str> = known
            .iter()
            .copied()
            .filter(|f| !EDIT_ONLY_FIELDS.contains(f))
            .collect();
        self.reject_unknown(&create_fields);
    }

    pub fn required(&mut self, field: &str) -> String {
        match self.form.value(field) {
            Some(v) => v.to_string(),
            None => {
                self.errors.push(field, "is required");
                String::new()
            }
        }
    }

    pub fn optional(&mut self, field: &str) -> Option<String> {
        self.form.value(field).map(str::to_string)
    }

    pub fn email(&mut self, field: &str) -> String {
        let value = self.required(field);
        if !value.is_empty() && !is_email(&value) {
            self.errors.push(field, "must be an email address");
        }
        value
    }

    pub fn money(&mut self, field: &str) -> f64 {
        let form = self.form;
        match form.value(field) {
            Some(v) => self.parse_money(field, v).unwrap_or(0.0),
            None => {
                self.errors.push(field, "is required");
                0.0
            }
        }
    }

    pub fn optional_money(&mut self, field: &str) -> Option<f64> {
        let form = self.form;
        let value = form.value(field)?;
        self.parse_money(field, value)
    }

    pub fn percent(&mut self, field: &str) -> Option<u8> {
        let value = self.form.value(field)?;
        match value.trim_end_matches('%').trim().parse::<u8>() {
            Ok(p) if p <= 100 => Some(p),
            _ => {
                self.errors.push(field, "must be a whole percentage between 0 and 100");
                None
            }
        }
    }

    pub fn date(&mut self, field: &str) -> Option<NaiveDate> {
        let value = self.form.value(field)?;
        match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
            Ok(d) => Some(d),
            Err(_) => {
                self.errors.push(field, "must be a date (YYYY-MM-DD)");
                None
            }
        }
    }

    pub fn count(&mut self, field: &str) -> Option<u64> {
        let value = self.form.value(field)?;
        match value.parse::<u64>() {
            Ok(n) => Some(n),
            Err(_) => {
                self.errors.push(field, "must be a whole number");
                None
            }
        }
    }

    pub fn status<S: Status>(&mut self, field: &str) -> Option<S> {
        let value = self.form.value(field)?;
        match value.parse::<S>() {
            Ok(s) => Some(s),
            Err(_) => {
                self.errors
                    .push(field, format!("must be one of: {}", valid_labels::<S>()));
                None
            }
        }
    }

    /// Comma-separated list; blank entries are dropped.
    pub fn list(&mut self, field: &str) -> Vec<String> {
        self.form
            .value(field)
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Edit of a required text field: absent means unchanged, blank is an error.
    pub fn patch_required(&mut self, field: &str) -> Option<String> {
        match self.form.raw(field) {
            None => None,
            Some("") => {
                self.errors.push(field, "cannot be empty");
                None
            }
            Some(v) => Some(v.to_string()),
        }
    }

    /// Edit of an optional text field: blank clears it.
    pub fn patch_optional(&mut self, field: &str) -> Option<Option<String>> {
        self.form
            .raw(field)
            .map(|v| if v.is_empty() { None } else { Some(v.to_string()) })
    }

    pub fn patch_email(&mut self, field: &str) -> Option<String> {
        let value = self.patch_required(field)?;
        if !is_email(&value) {
            self.errors.push(field, "must be an email address");
        }
        Some(value)
    }

    pub fn patch_money(&mut self, field: &str) -> Option<f64> {
        let form = self.form;
        match form.raw(field) {
            None => None,
            Some("") => {
                self.errors.push(field, "cannot be empty");
                None
            }
            Some(v) => self.parse_money(field, v),
        }
    }

    /// Edit of an optional date: blank clears it.
    pub fn patch_date(&mut self, field: &str) -> Option<Option<NaiveDate>> {
        let form = self.form;
        match form.raw(field) {
            None => None,
            Some("") => Some(None),
            Some(_) => self.date(field).map(Some),
        }
    }

    pub fn finish(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }

    fn parse_money(&mut self, field: &str, value: &str) -> Option<f64> {
        let cleaned: String = value
            .chars()
            .filter(|c| !matches!(c, '$' | '€' | '£' | ',' | ' '))
            .collect();
        match cleaned.parse::<f64>() {
            Ok(n) if n.is_finite() && n >= 0.0 => Some(n),
            Ok(n) if n.is_finite() => {
                self.errors.push(field, "must not be negative");
                None
            }
            _ => {
                self.errors.push(field, "must be a number");
                None
            }
        }
    }
}

fn is_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::InvoiceStatus;

    #[test]
    fn test_parse_pairs() {
        let form = FormData::parse_pairs(&["name=Acme", "due-date=2025-01-31", "note=a=b"]).unwrap();
        assert_eq!(form.value("name"), Some("Acme"));
        assert_eq!(form.value("due_date"), Some("2025-01-31"));
        assert_eq!(form.value("note"), Some("a=b"));
    }

    #[test]
    fn test_parse_pairs_rejects_bare_words() {
        let errors = FormData::parse_pairs(&["name"]).unwrap_err();
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_required_blank_is_error() {
        let form = FormData::new().with("name", "   ");
        let mut v = FormValidator::new(&form);
        assert_eq!(v.required("name"), "");
        let errors = v.finish().unwrap_err();
        assert_eq!(errors.errors[0].field, "name");
    }

    #[test]
    fn test_money_parsing() {
        let form = FormData::new()
            .with("a", "$1,250.50")
            .with("b", "abc")
            .with("c", "-5");
        let mut v = FormValidator::new(&form);
        assert_eq!(v.money("a"), 1250.5);
        v.money("b");
        v.money("c");
        v.money("missing");
        let errors = v.finish().unwrap_err();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors.for_field("b")[0].message, "must be a number");
        assert_eq!(errors.for_field("c")[0].message, "must not be negative");
    }

    #[test]
    fn test_non_finite_money_is_not_a_number() {
        let form = FormData::new().with("nan", "NaN").with("inf", "inf").with("neg", "-inf");
        let mut v = FormValidator::new(&form);
        assert_eq!(v.money("nan"), 0.0);
        v.money("inf");
        v.money("neg");
        let errors = v.finish().unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.errors.iter().all(|e| e.message == "must be a number"));
    }

    #[test]
    fn test_percent_bounds() {
        let form = FormData::new().with("ok", "75%").with("bad", "150");
        let mut v = FormValidator::new(&form);
        assert_eq!(v.percent("ok"), Some(75));
        assert_eq!(v.percent("bad"), None);
        assert!(v.finish().is_err());
    }

    #[test]
    fn test_status_and_email() {
        let form = FormData::new()
            .with("status", "sent")
            .with("email", "not-an-email");
        let mut v = FormValidator::new(&form);
        assert_eq!(v.status::<InvoiceStatus>("status"), Some(InvoiceStatus::Sent));
        v.email("email");
        let errors = v.finish().unwrap_err();
        assert_eq!(errors.for_field("email").len(), 1);
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let form = FormData::new().with("name", "x").with("colour", "red");
        let mut v = FormValidator::new(&form);
        v.reject_unknown(&["name"]);
        let errors = v.finish().unwrap_err();
        assert_eq!(errors.errors[0].field, "colour");
    }

    #[test]
    fn test_patch_helpers() {
        let form = FormData::new()
            .with("company", "")
            .with("name", "")
            .with("due_date", "");
        let mut v = FormValidator::new(&form);
        assert_eq!(v.patch_optional("company"), Some(None));
        assert_eq!(v.patch_optional("phone"), None);
        assert_eq!(v.patch_date("due_date"), Some(None));
        assert_eq!(v.patch_required("name"), None);
        assert_eq!(v.finish().unwrap_err().len(), 1);
    }

    #[test]
    fn test_list_splits_commas() {
        let form = FormData::new().with("signers", "Ann, Bob,, Cy ");
        let mut v = FormValidator::new(&form);
        assert_eq!(v.list("signers"), vec!["Ann", "Bob", "Cy"]);
    }
}
