//! Lead scoring: rule evaluation, template suggestion, and the service and
//! HTTP surfaces that host them.

pub mod domain;
pub mod import;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    ConditionOperator, EmailTemplate, Lead, LeadId, LeadSnapshot, RuleId, RuleType, ScoringRule,
    TemplateId, DEFAULT_LEAD_SOURCE,
};
pub use import::{RuleImportError, ScoringRuleImporter};
pub use repository::{
    EmailError, EmailSender, LeadScoreRecord, LeadScoringRepository, OutboundEmail,
    RepositoryError,
};
pub use router::{scoring_router, SimulationView, TemplateSummary};
pub use scoring::{
    BreakdownEntry, RenderContext, RenderedEmail, ScoreBreakdown, ScoreComponent, ScoreResult,
    ScoringEngine,
};
pub use service::{
    BatchScoreEntry, BatchScoreFailure, BatchScoreReport, LeadScoringService,
    LeadScoringServiceError, SimulationOutcome, TestEmailReceipt, TestEmailRequest,
};
