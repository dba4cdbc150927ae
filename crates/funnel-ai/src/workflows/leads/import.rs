use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use super::domain::{ConditionOperator, RuleId, RuleType, ScoringRule};

#[derive(Debug, thiserror::Error)]
pub enum RuleImportError {
    #[error("failed to read scoring rule export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid scoring rule CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: {message}")]
    InvalidRow { row: usize, message: String },
}

/// Loads scoring rules from a CSV export so rule sets can be simulated offline.
pub struct ScoringRuleImporter;

impl ScoringRuleImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<ScoringRule>, RuleImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Parse rows in file order; the first data row is row 1.
    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<ScoringRule>, RuleImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut rules = Vec::new();

        for (index, record) in csv_reader.deserialize::<RuleRow>().enumerate() {
            let row_number = index + 1;
            let row = record?;
            rules.push(row.into_rule(row_number)?);
        }

        Ok(rules)
    }
}

#[derive(Debug, Deserialize)]
struct RuleRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    id: Option<String>,
    name: String,
    rule_type: String,
    condition_operator: String,
    #[serde(default)]
    condition_value: String,
    points: i32,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    is_active: Option<String>,
}

impl RuleRow {
    fn into_rule(self, row: usize) -> Result<ScoringRule, RuleImportError> {
        let rule_type = RuleType::parse(&self.rule_type).ok_or_else(|| RuleImportError::InvalidRow {
            row,
            message: format!("unknown rule_type '{}'", self.rule_type),
        })?;
        let condition_operator = ConditionOperator::parse(&self.condition_operator).ok_or_else(|| {
            RuleImportError::InvalidRow {
                row,
                message: format!("unknown condition_operator '{}'", self.condition_operator),
            }
        })?;
        let is_active = match self.is_active.as_deref() {
            None => true,
            Some(raw) => parse_flag(raw).ok_or_else(|| RuleImportError::InvalidRow {
                row,
                message: format!("is_active must be a boolean, got '{raw}'"),
            })?,
        };

        Ok(ScoringRule {
            id: RuleId(self.id.unwrap_or_else(|| format!("rule-{row:03}"))),
            name: self.name,
            rule_type,
            condition_operator,
            condition_value: self.condition_value,
            points: self.points,
            is_active,
            created_at: None,
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Some(true),
        "false" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
