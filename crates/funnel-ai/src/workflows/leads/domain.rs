use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Source recorded for leads that arrive without attribution.
pub const DEFAULT_LEAD_SOURCE: &str = "website";

/// Identifier wrapper for captured leads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LeadId(pub String);

/// Identifier wrapper for scoring rules.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RuleId(pub String);

/// Identifier wrapper for email templates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TemplateId(pub String);

/// Lead attribute a scoring rule inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleType {
    ResponseTime,
    MessageLength,
    Source,
    Tone,
}

impl RuleType {
    pub const fn label(self) -> &'static str {
        match self {
            RuleType::ResponseTime => "response_time",
            RuleType::MessageLength => "message_length",
            RuleType::Source => "source",
            RuleType::Tone => "tone",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "response_time" => Some(Self::ResponseTime),
            "message_length" => Some(Self::MessageLength),
            "source" => Some(Self::Source),
            "tone" => Some(Self::Tone),
            _ => None,
        }
    }
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Comparison applied between the resolved lead attribute and the rule operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    Equals,
    Contains,
    GreaterThan,
    LessThan,
}

impl ConditionOperator {
    pub const fn label(self) -> &'static str {
        match self {
            ConditionOperator::Equals => "equals",
            ConditionOperator::Contains => "contains",
            ConditionOperator::GreaterThan => "greater_than",
            ConditionOperator::LessThan => "less_than",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "equals" => Some(Self::Equals),
            "contains" => Some(Self::Contains),
            "greater_than" => Some(Self::GreaterThan),
            "less_than" => Some(Self::LessThan),
            _ => None,
        }
    }
}

impl fmt::Display for ConditionOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Configurable condition-to-points mapping used to rank lead quality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringRule {
    pub id: RuleId,
    pub name: String,
    pub rule_type: RuleType,
    pub condition_operator: ConditionOperator,
    pub condition_value: String,
    pub points: i32,
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl ScoringRule {
    /// Audit string recorded in the breakdown when the rule fires.
    pub fn reason(&self) -> String {
        format!(
            "{} {} {}",
            self.rule_type, self.condition_operator, self.condition_value
        )
    }
}

/// Attributes of a lead the scoring engine can inspect. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeadSnapshot {
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub response_time_minutes: Option<f64>,
    #[serde(default)]
    pub message_length: Option<f64>,
}

impl LeadSnapshot {
    pub fn source(&self) -> &str {
        self.source.as_deref().unwrap_or(DEFAULT_LEAD_SOURCE)
    }

    pub fn response_time_minutes(&self) -> f64 {
        self.response_time_minutes.unwrap_or(0.0)
    }

    /// Explicit length when supplied, otherwise the bio length in UTF-16 code units.
    pub fn message_length(&self) -> f64 {
        self.message_length.unwrap_or_else(|| {
            self.bio
                .as_deref()
                .map(|bio| bio.encode_utf16().count() as f64)
                .unwrap_or(0.0)
        })
    }
}

/// Lead captured through a funnel form, as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: LeadId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub response_time_minutes: Option<f64>,
    #[serde(default)]
    pub message_length: Option<f64>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub analyzed: bool,
}

impl Lead {
    pub fn snapshot(&self) -> LeadSnapshot {
        LeadSnapshot {
            bio: self.bio.clone(),
            source: self.source.clone(),
            response_time_minutes: self.response_time_minutes,
            message_length: self.message_length,
        }
    }
}

/// Email template row as managed by the template repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailTemplate {
    pub id: TemplateId,
    pub name: String,
    pub subject: String,
    pub body: String,
}
