use std::borrow::Cow;

use super::super::domain::{ConditionOperator, LeadSnapshot, RuleType, ScoringRule};

/// Tone analysis is not implemented; every lead resolves to this value.
pub(crate) const PLACEHOLDER_TONE: &str = "neutral";

/// Lead attribute after defaults have been applied.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum AttributeValue<'a> {
    Number(f64),
    Text(Cow<'a, str>),
}

impl AttributeValue<'_> {
    fn as_text(&self) -> Cow<'_, str> {
        match self {
            AttributeValue::Number(value) => Cow::Owned(format_number(*value)),
            AttributeValue::Text(text) => Cow::Borrowed(text.as_ref()),
        }
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            AttributeValue::Number(value) => Some(*value),
            AttributeValue::Text(text) => parse_number(text),
        }
    }
}

pub(crate) fn resolve_attribute(rule_type: RuleType, lead: &LeadSnapshot) -> AttributeValue<'_> {
    match rule_type {
        RuleType::ResponseTime => AttributeValue::Number(lead.response_time_minutes()),
        RuleType::MessageLength => AttributeValue::Number(lead.message_length()),
        RuleType::Source => AttributeValue::Text(Cow::Borrowed(lead.source())),
        RuleType::Tone => AttributeValue::Text(Cow::Borrowed(PLACEHOLDER_TONE)),
    }
}

pub(crate) fn matches(rule: &ScoringRule, lead: &LeadSnapshot) -> bool {
    let value = resolve_attribute(rule.rule_type, lead);
    let operand = rule.condition_value.as_str();

    match rule.condition_operator {
        ConditionOperator::Equals => value.as_text().to_lowercase() == operand.to_lowercase(),
        ConditionOperator::Contains => value
            .as_text()
            .to_lowercase()
            .contains(&operand.to_lowercase()),
        ConditionOperator::GreaterThan => compare(&value, operand, |lhs, rhs| lhs > rhs),
        ConditionOperator::LessThan => compare(&value, operand, |lhs, rhs| lhs < rhs),
    }
}

/// Numeric comparison where either side failing to parse is a non-match.
fn compare(value: &AttributeValue<'_>, operand: &str, op: fn(f64, f64) -> bool) -> bool {
    match (value.as_number(), parse_number(operand)) {
        (Some(lhs), Some(rhs)) => op(lhs, rhs),
        _ => false,
    }
}

pub(crate) fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    trimmed.parse::<f64>().ok().filter(|value| value.is_finite())
}

fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    value.to_string()
}
