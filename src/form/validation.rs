//! Contact form validation rules
//!
//! Pure functions only. Every rule is evaluated so that all problems are
//! reported together, in field order.

use super::input::FormInput;

const MIN_MESSAGE_CHARS: usize = 10;

/// Result of validating a whole form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    errors: Vec<String>,
}

impl ValidationResult {
    /// True iff no rule was violated
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Messages in field-check order
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<String> {
        self.errors
    }

    /// All messages joined for a single-line notification
    pub fn message(&self) -> Option<String> {
        if self.errors.is_empty() {
            None
        } else {
            Some(self.errors.join(", "))
        }
    }
}

/// Validated form fields, by wire name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormFieldName {
    FirstName,
    LastName,
    Email,
    Company,
    InterestedIn,
    Message,
}

impl FormFieldName {
    /// Map a wire name to a validated field. Unvalidated fields return `None`.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "first_name" => Some(Self::FirstName),
            "last_name" => Some(Self::LastName),
            "email" => Some(Self::Email),
            "company" => Some(Self::Company),
            "interested_in" => Some(Self::InterestedIn),
            "message" => Some(Self::Message),
            _ => None,
        }
    }
}

/// Result of validating one field
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldValidation {
    pub is_valid: bool,
    pub message: String,
}

impl FieldValidation {
    fn ok() -> Self {
        Self {
            is_valid: true,
            message: String::new(),
        }
    }
}

/// Validate one field's value in isolation
pub fn validate_field(field: FormFieldName, value: &str) -> FieldValidation {
    match check_field(field, value) {
        Some(message) => FieldValidation {
            is_valid: false,
            message: message.to_string(),
        },
        None => FieldValidation::ok(),
    }
}

/// Validate a complete form
pub fn validate(input: &FormInput) -> ValidationResult {
    let checks = [
        (FormFieldName::FirstName, input.first_name.as_str()),
        (FormFieldName::LastName, input.last_name.as_str()),
        (FormFieldName::Email, input.email.as_str()),
        (FormFieldName::Company, input.company.as_str()),
        (FormFieldName::InterestedIn, input.interested_in.as_str()),
        (FormFieldName::Message, input.message.as_str()),
    ];

    let errors = checks
        .into_iter()
        .filter_map(|(field, value)| check_field(field, value))
        .map(str::to_string)
        .collect();

    ValidationResult { errors }
}

fn check_field(field: FormFieldName, value: &str) -> Option<&'static str> {
    let trimmed = value.trim();
    match field {
        FormFieldName::FirstName if trimmed.is_empty() => Some("First name is required"),
        FormFieldName::LastName if trimmed.is_empty() => Some("Last name is required"),
        FormFieldName::Email if trimmed.is_empty() => Some("Email address is required"),
        FormFieldName::Email if !is_valid_email(value) => {
            Some("Please enter a valid email address")
        }
        FormFieldName::Company if trimmed.is_empty() => Some("Company name is required"),
        FormFieldName::InterestedIn if trimmed.is_empty() => {
            Some("Please select what you're interested in")
        }
        FormFieldName::Message if trimmed.is_empty() => Some("Message is required"),
        FormFieldName::Message if trimmed.chars().count() < MIN_MESSAGE_CHARS => {
            Some("Message must be at least 10 characters long")
        }
        _ => None,
    }
}

/// `local@domain.tld` with no whitespace and exactly one `@`
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    // A dot with at least one character on each side
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}
