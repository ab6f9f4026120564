//! Contact form domain layer
//!
//! The raw [`FormInput`] record, the catalogues that feed its select fields,
//! and the pure validation rules applied before anything leaves the process.

mod catalog;
mod input;
mod validation;

pub use catalog::{prefill, service_options, urgency_options, SelectOption, ServiceType, Urgency};
pub use input::FormInput;
pub use validation::{
    is_valid_email, validate, validate_field, FieldValidation, FormFieldName, ValidationResult,
};
