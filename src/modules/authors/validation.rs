//! Rules a candidate book must satisfy before anything is written.

use serde::Serialize;

use super::models::{BookForCreation, BookForUpdate};

const TITLE_MAX_CHARS: usize = 100;
const DESCRIPTION_MAX_CHARS: usize = 500;

/// Field-level validation message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// The fields a book rule can inspect on any candidate payload.
pub trait BookFields {
    /// Symbolic name errors about the whole payload are attached to
    fn payload_name(&self) -> &'static str;
    fn title(&self) -> Option<&str>;
    fn description(&self) -> Option<&str>;
}

impl BookFields for BookForCreation {
    fn payload_name(&self) -> &'static str {
        "BookForCreation"
    }

    fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl BookFields for BookForUpdate {
    fn payload_name(&self) -> &'static str {
        "BookForUpdate"
    }

    fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// One invariant over a candidate book.
pub trait Rule: Send + Sync {
    fn check(&self, candidate: &dyn BookFields, errors: &mut Vec<FieldError>);
}

pub struct TitleRequired;

impl Rule for TitleRequired {
    fn check(&self, candidate: &dyn BookFields, errors: &mut Vec<FieldError>) {
        if candidate.title().map_or(true, |t| t.trim().is_empty()) {
            errors.push(FieldError::new("title", "title is required"));
        }
    }
}

/// Upper bound on a field's length, counted in UTF-16 code units.
pub struct MaxChars {
    pub field: &'static str,
    pub max: usize,
}

impl Rule for MaxChars {
    fn check(&self, candidate: &dyn BookFields, errors: &mut Vec<FieldError>) {
        let value = match self.field {
            "title" => candidate.title(),
            "description" => candidate.description(),
            _ => None,
        };
        if value.is_some_and(|v| v.encode_utf16().count() > self.max) {
            errors.push(FieldError::new(
                self.field,
                format!("{} must not exceed {} characters", self.field, self.max),
            ));
        }
    }
}

/// Title and description must not be identical; two unset fields count as identical.
pub struct DescriptionDiffersFromTitle;

impl Rule for DescriptionDiffersFromTitle {
    fn check(&self, candidate: &dyn BookFields, errors: &mut Vec<FieldError>) {
        if candidate.title() == candidate.description() {
            errors.push(FieldError::new(
                candidate.payload_name(),
                "description must differ from title",
            ));
        }
    }
}

/// Ordered rule list; every rule runs and all failures are reported together.
pub struct Validator {
    rules: Vec<Box<dyn Rule>>,
}

impl Validator {
    /// A validator with no rules
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Rules applied to every book mutation
    pub fn book_rules() -> Self {
        Self::empty()
            .with_rule(TitleRequired)
            .with_rule(MaxChars {
                field: "title",
                max: TITLE_MAX_CHARS,
            })
            .with_rule(MaxChars {
                field: "description",
                max: DESCRIPTION_MAX_CHARS,
            })
            .with_rule(DescriptionDiffersFromTitle)
    }

    pub fn with_rule(mut self, rule: impl Rule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn validate(&self, candidate: &dyn BookFields) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        for rule in &self.rules {
            rule.check(candidate, &mut errors);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::book_rules()
    }
}
