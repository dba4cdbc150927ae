use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{EmailTemplate, Lead, LeadId, ScoringRule};
use super::scoring::{RenderedEmail, ScoreBreakdown, ScoreResult};

/// Persisted score row, upserted once per lead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadScoreRecord {
    pub lead_id: LeadId,
    pub total_score: i64,
    pub score_breakdown: ScoreBreakdown,
    pub calculated_at: DateTime<Utc>,
}

impl LeadScoreRecord {
    pub fn from_result(lead_id: LeadId, result: &ScoreResult, calculated_at: DateTime<Utc>) -> Self {
        Self {
            lead_id,
            total_score: result.total_score,
            score_breakdown: result.breakdown(),
            calculated_at,
        }
    }
}

/// Storage abstraction over the hosted backend's lead, rule, template and score tables.
pub trait LeadScoringRepository: Send + Sync {
    fn fetch_lead(&self, id: &LeadId) -> Result<Option<Lead>, RepositoryError>;
    fn unanalyzed_leads(&self, limit: usize) -> Result<Vec<Lead>, RepositoryError>;
    fn mark_analyzed(&self, id: &LeadId) -> Result<(), RepositoryError>;
    /// Active rules, most recently created first.
    fn active_rules(&self) -> Result<Vec<ScoringRule>, RepositoryError>;
    fn templates(&self) -> Result<Vec<EmailTemplate>, RepositoryError>;
    fn upsert_score(&self, record: LeadScoreRecord) -> Result<(), RepositoryError>;
    fn fetch_score(&self, id: &LeadId) -> Result<Option<LeadScoreRecord>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Outbound email hook standing in for the delivery API.
pub trait EmailSender: Send + Sync {
    fn send(&self, email: OutboundEmail) -> Result<(), EmailError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundEmail {
    pub recipient: String,
    pub email: RenderedEmail,
}

/// Email dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("email transport unavailable: {0}")]
    Transport(String),
}
