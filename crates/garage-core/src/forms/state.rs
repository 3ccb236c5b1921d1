//! Editable form state shared by the entity forms.

use super::rules::{validate, FieldErrors, FieldKind, FieldRule};

/// Maximum characters accepted in a single field.
const MAX_FIELD_INPUT: usize = 120;

/// Whether the form creates a new record or edits an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(i64),
}

impl FormMode {
    pub fn is_edit(&self) -> bool {
        matches!(self, FormMode::Edit(_))
    }
}

/// Field values, errors, focus, and the pending flag for one form.
///
/// Values are kept as raw strings aligned with the rule table; parsing
/// happens only when the payload is built after validation.
#[derive(Debug, Clone)]
pub struct FormState {
    rules: &'static [FieldRule],
    values: Vec<String>,
    errors: FieldErrors,
    focus: usize,
    mode: FormMode,
    submitting: bool,
    submit_error: Option<String>,
}

impl FormState {
    pub fn new(rules: &'static [FieldRule], mode: FormMode, values: Vec<String>) -> Self {
        let mut state = Self {
            rules,
            values: Vec::new(),
            errors: FieldErrors::new(),
            focus: 0,
            mode,
            submitting: false,
            submit_error: None,
        };
        state.reset(mode, values);
        state
    }

    /// Replace every value and clear errors, focus, and pending state.
    pub fn reset(&mut self, mode: FormMode, mut values: Vec<String>) {
        values.resize(self.rules.len(), String::new());
        self.values = values;
        self.mode = mode;
        self.errors.clear();
        self.focus = 0;
        self.submitting = false;
        self.submit_error = None;
    }

    pub fn rules(&self) -> &'static [FieldRule] {
        self.rules
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    fn index_of(&self, field: &str) -> Option<usize> {
        self.rules.iter().position(|r| r.field == field)
    }

    pub fn value(&self, field: &str) -> &str {
        self.index_of(field)
            .and_then(|i| self.values.get(i))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Set a field and re-validate it.
    pub fn set_value(&mut self, field: &str, value: impl Into<String>) {
        if let Some(i) = self.index_of(field) {
            self.values[i] = value.into();
            self.revalidate(i);
        }
    }

    fn revalidate(&mut self, index: usize) {
        let rule = &self.rules[index];
        match rule.check(&self.values[index]) {
            Some(message) => {
                self.errors.insert(rule.field, message.to_string());
            }
            None => {
                self.errors.remove(rule.field);
            }
        }
    }

    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn submit_error(&self) -> Option<&str> {
        self.submit_error.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    // ===== Focus & editing =====

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn focused_rule(&self) -> &FieldRule {
        &self.rules[self.focus]
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % self.rules.len();
    }

    pub fn focus_prev(&mut self) {
        self.focus = (self.focus + self.rules.len() - 1) % self.rules.len();
    }

    /// Type a character into the focused field. Select fields and control
    /// characters are ignored, as is input while a submit is pending.
    pub fn input_char(&mut self, c: char) {
        if self.submitting || c.is_control() {
            return;
        }
        let rule = self.rules[self.focus];
        if matches!(rule.kind, FieldKind::Select) {
            return;
        }
        if matches!(rule.kind, FieldKind::Number) && !(c.is_ascii_digit() || c == '-') {
            return;
        }
        let value = &mut self.values[self.focus];
        if value.chars().count() < MAX_FIELD_INPUT {
            value.push(c);
            self.revalidate(self.focus);
        }
    }

    pub fn backspace(&mut self) {
        if self.submitting || matches!(self.rules[self.focus].kind, FieldKind::Select) {
            return;
        }
        self.values[self.focus].pop();
        self.revalidate(self.focus);
    }

    // ===== Submission =====

    /// Validate every field. On success the form enters the pending state
    /// and `true` is returned; the caller then builds and sends the payload.
    /// Returns `false` while a previous submit is still pending.
    pub fn begin_submit(&mut self) -> bool {
        if self.submitting {
            return false;
        }
        self.errors = validate(self.rules, &self.values);
        if !self.errors.is_empty() {
            // Put the cursor on the first broken field
            if let Some(i) = self.rules.iter().position(|r| self.errors.contains_key(r.field)) {
                self.focus = i;
            }
            return false;
        }
        self.submit_error = None;
        self.submitting = true;
        true
    }

    /// The submit handler failed; keep the form open for another try.
    pub fn submit_failed(&mut self, message: impl Into<String>) {
        self.submitting = false;
        self.submit_error = Some(message.into());
    }

    pub(crate) fn parse_number(&self, field: &str) -> i64 {
        self.value(field).trim().parse().unwrap_or_default()
    }

    pub(crate) fn trimmed(&self, field: &str) -> String {
        self.value(field).trim().to_string()
    }
}
