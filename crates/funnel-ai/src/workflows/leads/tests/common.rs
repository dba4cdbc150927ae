use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{TimeZone, Utc};
use serde_json::Value;

use crate::config::ScoringConfig;
use crate::workflows::leads::domain::{
    ConditionOperator, EmailTemplate, Lead, LeadId, RuleId, RuleType, ScoringRule, TemplateId,
};
use crate::workflows::leads::repository::{
    EmailError, EmailSender, LeadScoreRecord, LeadScoringRepository, OutboundEmail,
    RepositoryError,
};
use crate::workflows::leads::scoring::ScoringEngine;
use crate::workflows::leads::service::LeadScoringService;

pub(super) fn rule(
    name: &str,
    rule_type: RuleType,
    condition_operator: ConditionOperator,
    condition_value: &str,
    points: i32,
) -> ScoringRule {
    ScoringRule {
        id: RuleId(format!("rule-{}", name.to_lowercase().replace(' ', "-"))),
        name: name.to_string(),
        rule_type,
        condition_operator,
        condition_value: condition_value.to_string(),
        points,
        is_active: true,
        created_at: None,
    }
}

pub(super) fn inactive(mut rule: ScoringRule) -> ScoringRule {
    rule.is_active = false;
    rule
}

pub(super) fn fast_responder() -> ScoringRule {
    rule(
        "Fast Responder",
        RuleType::ResponseTime,
        ConditionOperator::LessThan,
        "5",
        20,
    )
}

pub(super) fn lead(id: &str, response_time_minutes: Option<f64>) -> Lead {
    Lead {
        id: LeadId(id.to_string()),
        name: "Jordan Reyes".to_string(),
        email: format!("{id}@example.com"),
        bio: Some("Looking to automate our onboarding funnel".to_string()),
        source: Some("Referral".to_string()),
        response_time_minutes,
        message_length: None,
        created_at: Utc
            .with_ymd_and_hms(2025, 3, 14, 9, 30, 0)
            .single()
            .expect("valid timestamp"),
        analyzed: false,
    }
}

pub(super) fn template(id: &str, name: &str) -> EmailTemplate {
    EmailTemplate {
        id: TemplateId(id.to_string()),
        name: name.to_string(),
        subject: format!("{name} for {{{{name}}}}"),
        body: "Your score is {{score}}.".to_string(),
    }
}

pub(super) fn templates() -> Vec<EmailTemplate> {
    vec![
        template("tpl-basic", "Basic Nurture"),
        template("tpl-premium", "Premium Concierge"),
    ]
}

pub(super) fn scoring_engine() -> ScoringEngine {
    ScoringEngine::new(ScoringConfig::default())
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) leads: Arc<Mutex<BTreeMap<LeadId, Lead>>>,
    pub(super) rules: Arc<Mutex<Vec<ScoringRule>>>,
    pub(super) templates: Arc<Mutex<Vec<EmailTemplate>>>,
    pub(super) scores: Arc<Mutex<BTreeMap<LeadId, LeadScoreRecord>>>,
    pub(super) broken_leads: Arc<Mutex<HashSet<LeadId>>>,
}

impl MemoryRepository {
    pub(super) fn seeded(rules: Vec<ScoringRule>, templates: Vec<EmailTemplate>) -> Self {
        let repository = Self::default();
        *repository.rules.lock().expect("rules mutex poisoned") = rules;
        *repository.templates.lock().expect("templates mutex poisoned") = templates;
        repository
    }

    pub(super) fn add_lead(&self, lead: Lead) {
        self.leads
            .lock()
            .expect("leads mutex poisoned")
            .insert(lead.id.clone(), lead);
    }

    /// Listed as unanalyzed, but fetching it fails.
    pub(super) fn add_broken_lead(&self, lead: Lead) {
        self.broken_leads
            .lock()
            .expect("broken mutex poisoned")
            .insert(lead.id.clone());
        self.add_lead(lead);
    }

    pub(super) fn lead(&self, id: &str) -> Option<Lead> {
        self.leads
            .lock()
            .expect("leads mutex poisoned")
            .get(&LeadId(id.to_string()))
            .cloned()
    }

    pub(super) fn score_count(&self) -> usize {
        self.scores.lock().expect("scores mutex poisoned").len()
    }
}

impl LeadScoringRepository for MemoryRepository {
    fn fetch_lead(&self, id: &LeadId) -> Result<Option<Lead>, RepositoryError> {
        if self
            .broken_leads
            .lock()
            .expect("broken mutex poisoned")
            .contains(id)
        {
            return Err(RepositoryError::Unavailable("row lock timeout".to_string()));
        }
        Ok(self
            .leads
            .lock()
            .expect("leads mutex poisoned")
            .get(id)
            .cloned())
    }

    fn unanalyzed_leads(&self, limit: usize) -> Result<Vec<Lead>, RepositoryError> {
        Ok(self
            .leads
            .lock()
            .expect("leads mutex poisoned")
            .values()
            .filter(|lead| !lead.analyzed)
            .take(limit)
            .cloned()
            .collect())
    }

    fn mark_analyzed(&self, id: &LeadId) -> Result<(), RepositoryError> {
        let mut guard = self.leads.lock().expect("leads mutex poisoned");
        let lead = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        lead.analyzed = true;
        Ok(())
    }

    fn active_rules(&self) -> Result<Vec<ScoringRule>, RepositoryError> {
        Ok(self
            .rules
            .lock()
            .expect("rules mutex poisoned")
            .iter()
            .filter(|rule| rule.is_active)
            .cloned()
            .collect())
    }

    fn templates(&self) -> Result<Vec<EmailTemplate>, RepositoryError> {
        Ok(self
            .templates
            .lock()
            .expect("templates mutex poisoned")
            .clone())
    }

    fn upsert_score(&self, record: LeadScoreRecord) -> Result<(), RepositoryError> {
        self.scores
            .lock()
            .expect("scores mutex poisoned")
            .insert(record.lead_id.clone(), record);
        Ok(())
    }

    fn fetch_score(&self, id: &LeadId) -> Result<Option<LeadScoreRecord>, RepositoryError> {
        Ok(self
            .scores
            .lock()
            .expect("scores mutex poisoned")
            .get(id)
            .cloned())
    }
}

pub(super) struct UnavailableRepository;

impl LeadScoringRepository for UnavailableRepository {
    fn fetch_lead(&self, _id: &LeadId) -> Result<Option<Lead>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn unanalyzed_leads(&self, _limit: usize) -> Result<Vec<Lead>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn mark_analyzed(&self, _id: &LeadId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn active_rules(&self) -> Result<Vec<ScoringRule>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn templates(&self) -> Result<Vec<EmailTemplate>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn upsert_score(&self, _record: LeadScoreRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch_score(&self, _id: &LeadId) -> Result<Option<LeadScoreRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryEmail {
    sent: Arc<Mutex<Vec<OutboundEmail>>>,
}

impl MemoryEmail {
    pub(super) fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.lock().expect("email mutex poisoned").clone()
    }
}

impl EmailSender for MemoryEmail {
    fn send(&self, email: OutboundEmail) -> Result<(), EmailError> {
        self.sent.lock().expect("email mutex poisoned").push(email);
        Ok(())
    }
}

pub(super) struct BouncingEmail;

impl EmailSender for BouncingEmail {
    fn send(&self, _email: OutboundEmail) -> Result<(), EmailError> {
        Err(EmailError::Transport("smtp relay refused".to_string()))
    }
}

pub(super) fn build_service(
    rules: Vec<ScoringRule>,
    templates: Vec<EmailTemplate>,
) -> (
    LeadScoringService<MemoryRepository, MemoryEmail>,
    Arc<MemoryRepository>,
    Arc<MemoryEmail>,
) {
    let repository = Arc::new(MemoryRepository::seeded(rules, templates));
    let email = Arc::new(MemoryEmail::default());
    let service =
        LeadScoringService::new(repository.clone(), email.clone(), ScoringConfig::default());
    (service, repository, email)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 16 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
