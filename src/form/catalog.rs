//! Service and urgency catalogues backing the form's select fields

use super::input::FormInput;
use serde::Serialize;

/// One entry of a select field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub value: &'static str,
    pub label: &'static str,
}

/// Consulting service a visitor can ask about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceType {
    RiskStrategy,
    ProgramBuild,
    AiMlIntelligence,
    FractionalLeadership,
    General,
    Other,
}

impl ServiceType {
    pub const ALL: [ServiceType; 6] = [
        ServiceType::RiskStrategy,
        ServiceType::ProgramBuild,
        ServiceType::AiMlIntelligence,
        ServiceType::FractionalLeadership,
        ServiceType::General,
        ServiceType::Other,
    ];

    /// Parse a wire slug such as `risk-strategy`
    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.slug() == slug)
    }

    pub fn slug(&self) -> &'static str {
        match self {
            ServiceType::RiskStrategy => "risk-strategy",
            ServiceType::ProgramBuild => "program-build",
            ServiceType::AiMlIntelligence => "ai-ml-intelligence",
            ServiceType::FractionalLeadership => "fractional-leadership",
            ServiceType::General => "general",
            ServiceType::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ServiceType::RiskStrategy => "Risk Strategy & Assessment",
            ServiceType::ProgramBuild => "Trust & Safety Program Build",
            ServiceType::AiMlIntelligence => "AI/ML Risk Intelligence",
            ServiceType::FractionalLeadership => "Fractional Leadership",
            ServiceType::General => "General Consultation",
            ServiceType::Other => "Other",
        }
    }

    /// Subject used for the "interested in" field; only core services have one
    fn subject(&self) -> Option<&'static str> {
        match self {
            ServiceType::General | ServiceType::Other => None,
            _ => Some(self.label()),
        }
    }

    /// Canned opening message for the core services
    fn canned_message(&self) -> Option<&'static str> {
        match self {
            ServiceType::RiskStrategy => Some(
                "I'm interested in discussing risk strategy and assessment services for our organization.",
            ),
            ServiceType::ProgramBuild => Some(
                "We're looking to build or enhance our trust & safety program and would like to explore your consulting services.",
            ),
            ServiceType::AiMlIntelligence => Some(
                "I'm interested in your AI/ML risk intelligence services and how they can help our organization.",
            ),
            ServiceType::FractionalLeadership => Some(
                "We're exploring fractional leadership options for our trust & safety organization.",
            ),
            ServiceType::General | ServiceType::Other => None,
        }
    }
}

/// How soon the visitor needs an answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Urgency {
    Low,
    Normal,
    High,
    Urgent,
}

impl Urgency {
    pub const ALL: [Urgency; 4] = [Urgency::Low, Urgency::Normal, Urgency::High, Urgency::Urgent];

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|u| u.slug() == slug)
    }

    pub fn slug(&self) -> &'static str {
        match self {
            Urgency::Low => "low",
            Urgency::Normal => "normal",
            Urgency::High => "high",
            Urgency::Urgent => "urgent",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Urgency::Low => "Low - General inquiry",
            Urgency::Normal => "Normal - Within a week",
            Urgency::High => "High - Within 2-3 days",
            Urgency::Urgent => "Urgent - ASAP",
        }
    }
}

/// Options for the service select field, in display order
pub fn service_options() -> Vec<SelectOption> {
    ServiceType::ALL
        .iter()
        .map(|s| SelectOption {
            value: s.slug(),
            label: s.label(),
        })
        .collect()
}

/// Options for the urgency select field, in display order
pub fn urgency_options() -> Vec<SelectOption> {
    Urgency::ALL
        .iter()
        .map(|u| SelectOption {
            value: u.slug(),
            label: u.label(),
        })
        .collect()
}

/// Pre-fill a form for a visitor arriving from a service's call to action
///
/// Values the visitor already typed win over the canned text, except
/// `interested_in`, which follows the chosen core service.
pub fn prefill(service_slug: &str, existing: FormInput) -> FormInput {
    let service = ServiceType::from_slug(service_slug);

    let interested_in = service
        .and_then(|s| s.subject())
        .map(str::to_string)
        .unwrap_or(existing.interested_in);

    let service_type = if service_slug.is_empty() {
        existing.service_type
    } else {
        Some(service_slug.to_string())
    };

    let message = if existing.message.is_empty() {
        service
            .and_then(|s| s.canned_message())
            .map(str::to_string)
            .unwrap_or_default()
    } else {
        existing.message
    };

    FormInput {
        interested_in,
        service_type,
        message,
        ..existing
    }
}
