//! Contact form input record

use serde::{Deserialize, Serialize};

/// Raw form record as entered by the visitor
///
/// Every field defaults to empty so partially filled drafts deserialize.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub company: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub message: String,
    /// Category selector ("interested in")
    pub interested_in: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_type: Option<String>,
    pub urgency: String,
}

impl FormInput {
    /// Full name as sent to the relay
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Relay subject line, preferring the service tag over the category
    pub fn subject(&self) -> String {
        let topic = self
            .service_type
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(Some(self.interested_in.as_str()).filter(|s| !s.is_empty()))
            .unwrap_or("General");
        format!("New Contact Request - {topic}")
    }

    /// Names of the fields that currently hold a value
    pub fn filled_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        let text = [
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("email", &self.email),
            ("company", &self.company),
            ("message", &self.message),
            ("interested_in", &self.interested_in),
            ("urgency", &self.urgency),
        ];
        for (name, value) in text {
            if !value.is_empty() {
                fields.push(name);
            }
        }
        if self.role.as_deref().is_some_and(|r| !r.is_empty()) {
            fields.push("role");
        }
        if self.service_type.as_deref().is_some_and(|s| !s.is_empty()) {
            fields.push("service_type");
        }
        fields
    }
}
