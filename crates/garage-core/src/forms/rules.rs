//! Field rule tables and the validator that evaluates them.
//!
//! Validation is a pure function of the rule table and the raw field
//! values; nothing here knows about terminals or widgets.

use std::collections::BTreeMap;

/// Per-field error messages, keyed by field name.
pub type FieldErrors = BTreeMap<&'static str, String>;

pub const NOT_A_NUMBER: &str = "Введите число";

/// How a field is edited and parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    /// A choice among known ids, stored as the id's decimal string.
    Select,
}

/// Declared constraints for one form field. Every constraint carries the
/// message shown when it is violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub field: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: Option<&'static str>,
    pub min_len: Option<(usize, &'static str)>,
    pub max_len: Option<(usize, &'static str)>,
    pub min: Option<(i64, &'static str)>,
    pub max: Option<(i64, &'static str)>,
}

impl FieldRule {
    const fn new(field: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            field,
            label,
            kind,
            required: None,
            min_len: None,
            max_len: None,
            min: None,
            max: None,
        }
    }

    pub const fn text(field: &'static str, label: &'static str) -> Self {
        Self::new(field, label, FieldKind::Text)
    }

    pub const fn number(field: &'static str, label: &'static str) -> Self {
        Self::new(field, label, FieldKind::Number)
    }

    pub const fn select(field: &'static str, label: &'static str) -> Self {
        Self::new(field, label, FieldKind::Select)
    }

    pub const fn required(mut self, message: &'static str) -> Self {
        self.required = Some(message);
        self
    }

    pub const fn min_len(mut self, len: usize, message: &'static str) -> Self {
        self.min_len = Some((len, message));
        self
    }

    pub const fn max_len(mut self, len: usize, message: &'static str) -> Self {
        self.max_len = Some((len, message));
        self
    }

    pub const fn min(mut self, value: i64, message: &'static str) -> Self {
        self.min = Some((value, message));
        self
    }

    pub const fn max(mut self, value: i64, message: &'static str) -> Self {
        self.max = Some((value, message));
        self
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self.kind, FieldKind::Text)
    }

    /// Check one raw value. The first violated constraint wins, in the
    /// order required, numeric parse, min_len, max_len, min, max.
    pub fn check(&self, raw: &str) -> Option<&'static str> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            // Optional empty fields have nothing else to check
            return self.required;
        }

        if self.is_numeric() {
            let value = match trimmed.parse::<i64>() {
                Ok(value) => value,
                Err(_) => return Some(NOT_A_NUMBER),
            };
            if let Some((min, message)) = self.min {
                if value < min {
                    return Some(message);
                }
            }
            if let Some((max, message)) = self.max {
                if value > max {
                    return Some(message);
                }
            }
            return None;
        }

        let len = trimmed.chars().count();
        if let Some((min_len, message)) = self.min_len {
            if len < min_len {
                return Some(message);
            }
        }
        if let Some((max_len, message)) = self.max_len {
            if len > max_len {
                return Some(message);
            }
        }
        None
    }
}

/// Validate `values` (aligned with `rules` by index) against the table.
///
/// Missing trailing values are treated as empty.
pub fn validate(rules: &[FieldRule], values: &[String]) -> FieldErrors {
    rules
        .iter()
        .enumerate()
        .filter_map(|(i, rule)| {
            let raw = values.get(i).map(String::as_str).unwrap_or("");
            rule.check(raw).map(|message| (rule.field, message.to_string()))
        })
        .collect()
}
