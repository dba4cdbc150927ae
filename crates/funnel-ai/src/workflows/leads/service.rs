use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::domain::{EmailTemplate, LeadId, LeadSnapshot};
use super::repository::{
    EmailError, EmailSender, LeadScoreRecord, LeadScoringRepository, OutboundEmail,
    RepositoryError,
};
use super::scoring::{RenderContext, RenderedEmail, ScoreResult, ScoringEngine};
use crate::config::ScoringConfig;

/// Service composing the scoring engine with the backend repository and email hook.
pub struct LeadScoringService<R, E> {
    repository: Arc<R>,
    email: Arc<E>,
    engine: ScoringEngine,
}

impl<R, E> LeadScoringService<R, E>
where
    R: LeadScoringRepository + 'static,
    E: EmailSender + 'static,
{
    pub fn new(repository: Arc<R>, email: Arc<E>, config: ScoringConfig) -> Self {
        Self {
            repository,
            email,
            engine: ScoringEngine::new(config),
        }
    }

    /// Score a stored lead against the active rules, optionally persisting the result.
    pub fn score_lead(
        &self,
        lead_id: &LeadId,
        persist: bool,
    ) -> Result<LeadScoreRecord, LeadScoringServiceError> {
        let lead = self
            .repository
            .fetch_lead(lead_id)?
            .ok_or(RepositoryError::NotFound)?;
        let rules = self.repository.active_rules()?;

        let result = self.engine.evaluate(&lead.snapshot(), &rules);
        let record = LeadScoreRecord::from_result(lead.id.clone(), &result, Utc::now());

        if persist {
            self.repository.upsert_score(record.clone())?;
            self.repository.mark_analyzed(&lead.id)?;
        }

        info!(
            lead_id = %lead.id.0,
            total_score = record.total_score,
            matched_rules = result.components.len(),
            persist,
            "lead scored"
        );

        Ok(record)
    }

    /// Evaluate a synthetic lead without touching stored leads or scores.
    pub fn simulate(
        &self,
        snapshot: &LeadSnapshot,
    ) -> Result<SimulationOutcome, LeadScoringServiceError> {
        let rules = self.repository.active_rules()?;
        let templates = self.repository.templates()?;

        let result = self.engine.evaluate(snapshot, &rules);
        let suggested_template = self
            .engine
            .suggest_template(&templates, result.total_score)
            .cloned();

        Ok(SimulationOutcome {
            result,
            suggested_template,
        })
    }

    /// Simulate `request.lead` and send the suggested template to `request.recipient`.
    pub fn send_test_email(
        &self,
        request: TestEmailRequest,
    ) -> Result<TestEmailReceipt, LeadScoringServiceError> {
        let outcome = self.simulate(&request.lead)?;
        let template = outcome
            .suggested_template
            .ok_or(LeadScoringServiceError::NoTemplates)?;

        let rendered = template.render(&RenderContext {
            name: request
                .recipient_name
                .clone()
                .unwrap_or_else(|| request.recipient.clone()),
            email: request.recipient.clone(),
            score: outcome.result.total_score,
        });

        self.email.send(OutboundEmail {
            recipient: request.recipient.clone(),
            email: rendered.clone(),
        })?;

        info!(
            template = %template.name,
            total_score = outcome.result.total_score,
            "test email dispatched"
        );

        Ok(TestEmailReceipt {
            recipient: request.recipient,
            total_score: outcome.result.total_score,
            template_name: template.name,
            email: rendered,
        })
    }

    /// Score up to `limit` unanalyzed leads; one failure never aborts the rest.
    pub fn score_unanalyzed(&self, limit: usize) -> Result<BatchScoreReport, LeadScoringServiceError> {
        let leads = self.repository.unanalyzed_leads(limit)?;
        let mut report = BatchScoreReport::default();

        for lead in leads {
            match self.score_lead(&lead.id, true) {
                Ok(record) => report.scored.push(BatchScoreEntry {
                    lead_id: record.lead_id,
                    total_score: record.total_score,
                }),
                Err(err) => {
                    warn!(lead_id = %lead.id.0, error = %err, "lead scoring failed");
                    report.failed.push(BatchScoreFailure {
                        lead_id: lead.id,
                        error: err.to_string(),
                    });
                }
            }
        }

        Ok(report)
    }

    /// Fetch the persisted score for a lead, if one has been calculated.
    pub fn latest_score(
        &self,
        lead_id: &LeadId,
    ) -> Result<LeadScoreRecord, LeadScoringServiceError> {
        let record = self
            .repository
            .fetch_score(lead_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }
}

/// Result of scoring a synthetic lead, paired with the template the heuristic picks.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationOutcome {
    pub result: ScoreResult,
    pub suggested_template: Option<EmailTemplate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestEmailRequest {
    pub recipient: String,
    #[serde(default)]
    pub recipient_name: Option<String>,
    #[serde(default)]
    pub lead: LeadSnapshot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestEmailReceipt {
    pub recipient: String,
    pub total_score: i64,
    pub template_name: String,
    pub email: RenderedEmail,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchScoreReport {
    pub scored: Vec<BatchScoreEntry>,
    pub failed: Vec<BatchScoreFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchScoreEntry {
    pub lead_id: LeadId,
    pub total_score: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchScoreFailure {
    pub lead_id: LeadId,
    pub error: String,
}

/// Error raised by the lead scoring service.
#[derive(Debug, thiserror::Error)]
pub enum LeadScoringServiceError {
    #[error("no email templates configured")]
    NoTemplates,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Email(#[from] EmailError),
}
