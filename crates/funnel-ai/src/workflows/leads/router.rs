use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{LeadId, LeadSnapshot, TemplateId};
use super::repository::{EmailSender, LeadScoringRepository, RepositoryError};
use super::scoring::ScoreBreakdown;
use super::service::{
    LeadScoringService, LeadScoringServiceError, SimulationOutcome, TestEmailRequest,
};

const DEFAULT_BATCH_LIMIT: usize = 25;

/// Router builder exposing HTTP endpoints for scoring, simulation and test sends.
pub fn scoring_router<R, E>(service: Arc<LeadScoringService<R, E>>) -> Router
where
    R: LeadScoringRepository + 'static,
    E: EmailSender + 'static,
{
    Router::new()
        .route("/api/v1/scoring/simulate", post(simulate_handler::<R, E>))
        .route("/api/v1/scoring/test-email", post(test_email_handler::<R, E>))
        .route(
            "/api/v1/leads/score-pending",
            post(score_pending_handler::<R, E>),
        )
        .route(
            "/api/v1/leads/:lead_id/score",
            post(score_lead_handler::<R, E>).get(latest_score_handler::<R, E>),
        )
        .with_state(service)
}

/// Public shape of a simulation: total, name-keyed breakdown and template pick.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationView {
    pub total_score: i64,
    pub breakdown: ScoreBreakdown,
    pub suggested_template: Option<TemplateSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TemplateSummary {
    pub id: TemplateId,
    pub name: String,
}

impl From<SimulationOutcome> for SimulationView {
    fn from(outcome: SimulationOutcome) -> Self {
        Self {
            total_score: outcome.result.total_score,
            breakdown: outcome.result.breakdown(),
            suggested_template: outcome.suggested_template.map(|template| TemplateSummary {
                id: template.id,
                name: template.name,
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ScoreLeadQuery {
    #[serde(default = "default_persist")]
    pub(crate) persist: bool,
}

fn default_persist() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub(crate) struct ScorePendingQuery {
    #[serde(default)]
    pub(crate) limit: Option<usize>,
}

pub(crate) async fn simulate_handler<R, E>(
    State(service): State<Arc<LeadScoringService<R, E>>>,
    axum::Json(snapshot): axum::Json<LeadSnapshot>,
) -> Response
where
    R: LeadScoringRepository + 'static,
    E: EmailSender + 'static,
{
    match service.simulate(&snapshot) {
        Ok(outcome) => {
            (StatusCode::OK, axum::Json(SimulationView::from(outcome))).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn test_email_handler<R, E>(
    State(service): State<Arc<LeadScoringService<R, E>>>,
    axum::Json(request): axum::Json<TestEmailRequest>,
) -> Response
where
    R: LeadScoringRepository + 'static,
    E: EmailSender + 'static,
{
    match service.send_test_email(request) {
        Ok(receipt) => (StatusCode::ACCEPTED, axum::Json(receipt)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn score_lead_handler<R, E>(
    State(service): State<Arc<LeadScoringService<R, E>>>,
    Path(lead_id): Path<String>,
    Query(query): Query<ScoreLeadQuery>,
) -> Response
where
    R: LeadScoringRepository + 'static,
    E: EmailSender + 'static,
{
    let id = LeadId(lead_id);
    match service.score_lead(&id, query.persist) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(LeadScoringServiceError::Repository(RepositoryError::NotFound)) => {
            let payload = json!({
                "error": format!("lead {} not found", id.0),
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn latest_score_handler<R, E>(
    State(service): State<Arc<LeadScoringService<R, E>>>,
    Path(lead_id): Path<String>,
) -> Response
where
    R: LeadScoringRepository + 'static,
    E: EmailSender + 'static,
{
    let id = LeadId(lead_id);
    match service.latest_score(&id) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(LeadScoringServiceError::Repository(RepositoryError::NotFound)) => {
            let payload = json!({
                "lead_id": id.0,
                "error": "score not calculated",
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn score_pending_handler<R, E>(
    State(service): State<Arc<LeadScoringService<R, E>>>,
    Query(query): Query<ScorePendingQuery>,
) -> Response
where
    R: LeadScoringRepository + 'static,
    E: EmailSender + 'static,
{
    let limit = query.limit.unwrap_or(DEFAULT_BATCH_LIMIT);
    match service.score_unanalyzed(limit) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: LeadScoringServiceError) -> Response {
    let status = match err {
        LeadScoringServiceError::NoTemplates => StatusCode::UNPROCESSABLE_ENTITY,
        LeadScoringServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        LeadScoringServiceError::Repository(RepositoryError::Unavailable(_))
        | LeadScoringServiceError::Email(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let payload = json!({
        "error": err.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
