mod breakdown;
mod rules;
mod templates;

pub use breakdown::{BreakdownEntry, ScoreBreakdown};
pub use templates::{RenderContext, RenderedEmail};

use super::domain::{EmailTemplate, LeadSnapshot, RuleId, ScoringRule};
use crate::config::ScoringConfig;

/// Stateless evaluator that applies scoring rules to a lead snapshot.
#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    config: ScoringConfig,
}

impl ScoringEngine {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Score `lead` against the active subset of `rules`, preserving rule order.
    pub fn evaluate(&self, lead: &LeadSnapshot, rules: &[ScoringRule]) -> ScoreResult {
        let mut components = Vec::new();
        let mut total_score: i64 = 0;

        for rule in rules.iter().filter(|rule| rule.is_active) {
            if !rules::matches(rule, lead) {
                continue;
            }

            total_score = total_score.saturating_add(i64::from(rule.points));
            components.push(ScoreComponent {
                rule_id: rule.id.clone(),
                rule_name: rule.name.clone(),
                points: rule.points,
                reason: rule.reason(),
            });
        }

        ScoreResult {
            total_score,
            components,
        }
    }

    /// Pick the template to pair with a score; `None` only when `catalogue` is empty.
    pub fn suggest_template<'a>(
        &self,
        catalogue: &'a [EmailTemplate],
        total_score: i64,
    ) -> Option<&'a EmailTemplate> {
        templates::suggest(catalogue, total_score, self.config.premium_threshold)
    }
}

/// A single rule that fired, kept per rule so name collisions never drop points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreComponent {
    pub rule_id: RuleId,
    pub rule_name: String,
    pub points: i32,
    pub reason: String,
}

/// Evaluation output describing the total and the rules that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreResult {
    pub total_score: i64,
    pub components: Vec<ScoreComponent>,
}

impl ScoreResult {
    /// Name-keyed projection for display and persistence.
    pub fn breakdown(&self) -> ScoreBreakdown {
        ScoreBreakdown::from_components(&self.components)
    }
}
