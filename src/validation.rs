//! Form fields and validation rules
//!
//! A field carries its value, a required flag and a semantic kind. Rules are
//! applied in a fixed order and the first failing rule wins. A failed field is
//! marked with an inline message; revalidating clears the previous mark first,
//! so validating twice yields the same state.

use regex::Regex;
use std::sync::OnceLock;

/// Semantic kind of a field, decides which rules apply after the required check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Generic,
    Email,
    PersonName,
    InstitutionName,
    /// Admin event form: 3..=100 characters
    EventName,
    /// Admin event form: 10..=500 characters
    Description,
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("static regex")
    })
}

fn person_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-zA-Z\s.'-]+$").expect("static regex"))
}

/// Check a single value against its rules.
///
/// Returns the human-readable message of the first failing rule. Kind rules
/// only run on non-empty values, so an optional empty field always passes.
pub fn check_value(value: &str, required: bool, kind: FieldKind, label: &str) -> Result<(), String> {
    let value = value.trim();

    if value.is_empty() {
        if required {
            return Err(format!("{label} is required"));
        }
        return Ok(());
    }

    let len = value.chars().count();
    match kind {
        FieldKind::Generic => Ok(()),
        FieldKind::Email => {
            if email_regex().is_match(value) {
                Ok(())
            } else {
                Err("Please enter a valid email address".to_string())
            }
        }
        FieldKind::PersonName => {
            if len < 2 {
                Err("Name must be at least 2 characters long".to_string())
            } else if !person_name_regex().is_match(value) {
                Err(
                    "Name can only contain letters, spaces, dots, hyphens, and apostrophes"
                        .to_string(),
                )
            } else {
                Ok(())
            }
        }
        FieldKind::InstitutionName => {
            if len < 2 {
                Err("College name must be at least 2 characters long".to_string())
            } else {
                Ok(())
            }
        }
        FieldKind::EventName => {
            if len < 3 {
                Err("Event name must be at least 3 characters long".to_string())
            } else if len > 100 {
                Err("Event name must be less than 100 characters".to_string())
            } else {
                Ok(())
            }
        }
        FieldKind::Description => {
            if len < 10 {
                Err("Event description must be at least 10 characters long".to_string())
            } else if len > 500 {
                Err("Event description must be less than 500 characters".to_string())
            } else {
                Ok(())
            }
        }
    }
}

/// A single input of a form
#[derive(Debug, Clone)]
pub struct Field {
    /// Wire name (form-encoded key)
    pub name: &'static str,
    pub label: String,
    pub value: String,
    pub required: bool,
    pub kind: FieldKind,
    /// Non-empty for select-style fields; the value cycles through these
    pub choices: Vec<String>,
    error: Option<String>,
}

impl Field {
    pub fn new(name: &'static str, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name,
            label: label.into(),
            value: String::new(),
            required: false,
            kind,
            choices: Vec::new(),
            error: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_choices(mut self, choices: Vec<String>) -> Self {
        self.choices = choices;
        self
    }

    pub fn is_choice(&self) -> bool {
        !self.choices.is_empty()
    }

    /// Label used in messages: explicit label, else the wire name, else "Field"
    pub fn display_label(&self) -> &str {
        let label = self.label.trim_end_matches('*').trim();
        if !label.is_empty() {
            label
        } else if !self.name.is_empty() {
            self.name
        } else {
            "Field"
        }
    }

    /// Inline message attached by the last failed validation
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_marked(&self) -> bool {
        self.error.is_some()
    }

    pub fn clear_mark(&mut self) {
        self.error = None;
    }

    /// Revalidate the field, replacing any previous mark
    pub fn validate(&mut self) -> bool {
        self.clear_mark();
        match check_value(&self.value, self.required, self.kind, self.display_label()) {
            Ok(()) => true,
            Err(message) => {
                self.error = Some(message);
                false
            }
        }
    }

    /// Typing into a field clears its mark
    pub fn push_char(&mut self, c: char) {
        if self.is_choice() {
            return;
        }
        self.value.push(c);
        self.clear_mark();
    }

    pub fn pop_char(&mut self) {
        if self.is_choice() {
            return;
        }
        self.value.pop();
        self.clear_mark();
    }

    /// Move a select-style field to the next/previous choice.
    /// The empty placeholder sits before the first choice.
    pub fn cycle_choice(&mut self, forward: bool) {
        if !self.is_choice() {
            return;
        }
        let slots = self.choices.len() + 1;
        let current = self
            .choices
            .iter()
            .position(|c| *c == self.value)
            .map(|i| i + 1)
            .unwrap_or(0);
        let next = if forward {
            (current + 1) % slots
        } else {
            (current + slots - 1) % slots
        };
        self.value = if next == 0 {
            String::new()
        } else {
            self.choices[next - 1].clone()
        };
        self.clear_mark();
    }

    /// Select a choice by value, ignored if it is not offered
    pub fn select(&mut self, value: &str) {
        if self.choices.iter().any(|c| c == value) {
            self.value = value.to_string();
        }
    }
}

/// Outcome of validating a whole form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormVerdict {
    pub valid: bool,
    /// First error in field order, the one surfaced as a toast
    pub first_error: Option<String>,
}

/// An ordered set of fields with a focus cursor
#[derive(Debug, Clone)]
pub struct Form {
    pub fields: Vec<Field>,
    pub focus: usize,
}

impl Form {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields, focus: 0 }
    }

    /// Validate every field (no short-circuit), marking each failure
    pub fn validate(&mut self) -> FormVerdict {
        let mut first_error = None;
        let mut valid = true;
        for field in &mut self.fields {
            if !field.validate() {
                valid = false;
                if first_error.is_none() {
                    first_error = field.error().map(str::to_string);
                }
            }
        }
        FormVerdict { valid, first_error }
    }

    /// Validate only the focused field (blur-style validation)
    pub fn validate_focused(&mut self) -> bool {
        match self.fields.get_mut(self.focus) {
            Some(field) => field.validate(),
            None => true,
        }
    }

    /// Clear values and marks, focus the first input
    pub fn reset(&mut self) {
        for field in &mut self.fields {
            field.value.clear();
            field.clear_mark();
        }
        self.focus = 0;
    }

    pub fn focused_mut(&mut self) -> Option<&mut Field> {
        self.fields.get_mut(self.focus)
    }

    pub fn focus_next(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + 1) % self.fields.len();
        }
    }

    pub fn focus_prev(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
        }
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    /// Trimmed value of a field, empty when absent
    pub fn value(&self, name: &str) -> String {
        self.field(name)
            .map(|f| f.value.trim().to_string())
            .unwrap_or_default()
    }
}

/// Public registration form: name, email, college, event
pub fn registration_form(events: &[String]) -> Form {
    Form::new(vec![
        Field::new("name", "Full Name *", FieldKind::PersonName).required(),
        Field::new("email", "Email Address *", FieldKind::Email).required(),
        Field::new("college", "College/Institution *", FieldKind::InstitutionName).required(),
        Field::new("event", "Select Event *", FieldKind::Generic)
            .required()
            .with_choices(events.to_vec()),
    ])
}

/// Admin add-event form
pub fn event_form() -> Form {
    Form::new(vec![
        Field::new("event_name", "Event Name *", FieldKind::EventName).required(),
        Field::new("description", "Description *", FieldKind::Description).required(),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_empty_fails_and_marks() {
        let mut field = Field::new("college", "College/Institution *", FieldKind::InstitutionName)
            .required();
        field.value = "   ".to_string();
        assert!(!field.validate());
        assert!(field.is_marked());
        assert_eq!(field.error(), Some("College/Institution is required"));

        // Re-validating with a value clears the previous mark
        field.value = "MIT".to_string();
        assert!(field.validate());
        assert!(!field.is_marked());
    }

    #[test]
    fn test_revalidation_is_idempotent() {
        let mut field = Field::new("email", "Email", FieldKind::Email).required();
        field.value = "nope".to_string();
        assert!(!field.validate());
        let first = field.error().map(str::to_string);
        assert!(!field.validate());
        assert_eq!(field.error().map(str::to_string), first);
    }

    #[test]
    fn test_email_shapes() {
        assert!(check_value("a@b.co", true, FieldKind::Email, "Email").is_ok());
        assert_eq!(
            check_value("not-an-email", true, FieldKind::Email, "Email"),
            Err("Please enter a valid email address".to_string())
        );
        assert!(check_value("a@b.c", true, FieldKind::Email, "Email").is_err());
        assert!(check_value("a@localhost", true, FieldKind::Email, "Email").is_err());
    }

    #[test]
    fn test_person_names() {
        assert!(check_value("O'Brien-Smith", true, FieldKind::PersonName, "Name").is_ok());
        assert!(check_value("J. R. Tolkien", true, FieldKind::PersonName, "Name").is_ok());
        assert_eq!(
            check_value("John123", true, FieldKind::PersonName, "Name"),
            Err("Name can only contain letters, spaces, dots, hyphens, and apostrophes"
                .to_string())
        );
        assert_eq!(
            check_value("J", true, FieldKind::PersonName, "Name"),
            Err("Name must be at least 2 characters long".to_string())
        );
    }

    #[test]
    fn test_institution_length() {
        assert!(check_value("X", true, FieldKind::InstitutionName, "College").is_err());
        assert!(check_value("XY", true, FieldKind::InstitutionName, "College").is_ok());
    }

    #[test]
    fn test_optional_empty_passes_kind_rules() {
        assert!(check_value("", false, FieldKind::Email, "Email").is_ok());
    }

    #[test]
    fn test_event_form_limits() {
        assert!(check_value("AI", true, FieldKind::EventName, "Event Name").is_err());
        assert!(check_value("Hack Night", true, FieldKind::EventName, "Event Name").is_ok());
        let long = "x".repeat(101);
        assert_eq!(
            check_value(&long, true, FieldKind::EventName, "Event Name"),
            Err("Event name must be less than 100 characters".to_string())
        );
        assert!(check_value("too short", true, FieldKind::Description, "Description").is_err());
        assert!(check_value("long enough text", true, FieldKind::Description, "D").is_ok());
    }

    #[test]
    fn test_form_checks_every_field_and_reports_first_error() {
        let mut form = registration_form(&["Hack Night".to_string()]);
        form.field_mut("email").unwrap().value = "bad".to_string();

        let verdict = form.validate();
        assert!(!verdict.valid);
        assert_eq!(verdict.first_error.as_deref(), Some("Full Name is required"));
        // No short-circuit: every failing field is marked
        assert!(form.fields.iter().all(|f| f.is_marked()));
        assert_eq!(
            form.field("email").unwrap().error(),
            Some("Please enter a valid email address")
        );
    }

    #[test]
    fn test_valid_registration_form() {
        let mut form = registration_form(&["Hack Night".to_string()]);
        form.field_mut("name").unwrap().value = "Jane Doe".to_string();
        form.field_mut("email").unwrap().value = "jane@example.org".to_string();
        form.field_mut("college").unwrap().value = "MIT".to_string();
        form.field_mut("event").unwrap().select("Hack Night");
        assert_eq!(
            form.validate(),
            FormVerdict {
                valid: true,
                first_error: None
            }
        );
    }

    #[test]
    fn test_typing_clears_mark() {
        let mut field = Field::new("name", "Name", FieldKind::PersonName).required();
        assert!(!field.validate());
        field.push_char('J');
        assert!(!field.is_marked());
    }

    #[test]
    fn test_choice_cycles_through_placeholder() {
        let mut field = Field::new("event", "Event", FieldKind::Generic)
            .with_choices(vec!["A".to_string(), "B".to_string()]);
        field.cycle_choice(true);
        assert_eq!(field.value, "A");
        field.cycle_choice(true);
        assert_eq!(field.value, "B");
        field.cycle_choice(true);
        assert_eq!(field.value, "");
        field.cycle_choice(false);
        assert_eq!(field.value, "B");
    }

    #[test]
    fn test_reset_clears_values_and_marks() {
        let mut form = event_form();
        form.field_mut("event_name").unwrap().value = "x".to_string();
        form.validate();
        form.focus = 1;
        form.reset();
        assert_eq!(form.focus, 0);
        assert!(form.fields.iter().all(|f| f.value.is_empty() && !f.is_marked()));
    }
}
