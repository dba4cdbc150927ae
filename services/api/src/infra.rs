use chrono::{DateTime, Duration, TimeZone, Utc};
use funnel_ai::workflows::leads::{
    ConditionOperator, EmailError, EmailSender, EmailTemplate, Lead, LeadId, LeadScoreRecord,
    LeadScoringRepository, OutboundEmail, RepositoryError, RuleId, RuleType, ScoringRule,
    TemplateId,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::BTreeMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local stand-in for the hosted backend tables.
#[derive(Default, Clone)]
pub(crate) struct InMemoryLeadScoringRepository {
    leads: Arc<Mutex<BTreeMap<LeadId, Lead>>>,
    rules: Arc<Mutex<Vec<ScoringRule>>>,
    templates: Arc<Mutex<Vec<EmailTemplate>>>,
    scores: Arc<Mutex<BTreeMap<LeadId, LeadScoreRecord>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable("in-memory store poisoned".to_string()))
}

impl InMemoryLeadScoringRepository {
    pub(crate) fn seeded(
        rules: Vec<ScoringRule>,
        templates: Vec<EmailTemplate>,
        leads: Vec<Lead>,
    ) -> Result<Self, RepositoryError> {
        let repository = Self::default();
        *lock(&repository.rules)? = rules;
        *lock(&repository.templates)? = templates;
        {
            let mut guard = lock(&repository.leads)?;
            for lead in leads {
                guard.insert(lead.id.clone(), lead);
            }
        }
        Ok(repository)
    }
}

impl LeadScoringRepository for InMemoryLeadScoringRepository {
    fn fetch_lead(&self, id: &LeadId) -> Result<Option<Lead>, RepositoryError> {
        Ok(lock(&self.leads)?.get(id).cloned())
    }

    fn unanalyzed_leads(&self, limit: usize) -> Result<Vec<Lead>, RepositoryError> {
        let mut pending: Vec<Lead> = lock(&self.leads)?
            .values()
            .filter(|lead| !lead.analyzed)
            .cloned()
            .collect();
        pending.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        pending.truncate(limit);
        Ok(pending)
    }

    fn mark_analyzed(&self, id: &LeadId) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.leads)?;
        let lead = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        lead.analyzed = true;
        Ok(())
    }

    fn active_rules(&self) -> Result<Vec<ScoringRule>, RepositoryError> {
        let mut active: Vec<ScoringRule> = lock(&self.rules)?
            .iter()
            .filter(|rule| rule.is_active)
            .cloned()
            .collect();
        active.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(active)
    }

    fn templates(&self) -> Result<Vec<EmailTemplate>, RepositoryError> {
        Ok(lock(&self.templates)?.clone())
    }

    fn upsert_score(&self, record: LeadScoreRecord) -> Result<(), RepositoryError> {
        lock(&self.scores)?.insert(record.lead_id.clone(), record);
        Ok(())
    }

    fn fetch_score(&self, id: &LeadId) -> Result<Option<LeadScoreRecord>, RepositoryError> {
        Ok(lock(&self.scores)?.get(id).cloned())
    }
}

/// Captures outbound email instead of delivering it.
#[derive(Default, Clone)]
pub(crate) struct InMemoryEmailOutbox {
    sent: Arc<Mutex<Vec<OutboundEmail>>>,
}

impl EmailSender for InMemoryEmailOutbox {
    fn send(&self, email: OutboundEmail) -> Result<(), EmailError> {
        let mut guard = self
            .sent
            .lock()
            .map_err(|_| EmailError::Transport("outbox poisoned".to_string()))?;
        guard.push(email);
        Ok(())
    }
}

impl InMemoryEmailOutbox {
    pub(crate) fn sent(&self) -> Vec<OutboundEmail> {
        self.sent
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

fn seed_epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 6, 9, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

fn seed_rule(
    id: &str,
    name: &str,
    rule_type: RuleType,
    condition_operator: ConditionOperator,
    condition_value: &str,
    points: i32,
    created_offset_days: i64,
) -> ScoringRule {
    ScoringRule {
        id: RuleId(id.to_string()),
        name: name.to_string(),
        rule_type,
        condition_operator,
        condition_value: condition_value.to_string(),
        points,
        is_active: true,
        created_at: Some(seed_epoch() + Duration::days(created_offset_days)),
    }
}

/// Starter rule set used when no rule export is supplied.
pub(crate) fn default_rules() -> Vec<ScoringRule> {
    vec![
        seed_rule(
            "rule-fast",
            "Fast Responder",
            RuleType::ResponseTime,
            ConditionOperator::LessThan,
            "5",
            20,
            0,
        ),
        seed_rule(
            "rule-referral",
            "Referral Partner",
            RuleType::Source,
            ConditionOperator::Equals,
            "referral",
            30,
            1,
        ),
        seed_rule(
            "rule-detailed",
            "Detailed Inquiry",
            RuleType::MessageLength,
            ConditionOperator::GreaterThan,
            "200",
            15,
            2,
        ),
        seed_rule(
            "rule-slow",
            "Slow Responder",
            RuleType::ResponseTime,
            ConditionOperator::GreaterThan,
            "120",
            -15,
            3,
        ),
    ]
}

pub(crate) fn default_templates() -> Vec<EmailTemplate> {
    vec![
        EmailTemplate {
            id: TemplateId("tpl-basic".to_string()),
            name: "Basic Follow Up".to_string(),
            subject: "Thanks for your interest, {{name}}".to_string(),
            body: "Hi {{name}},\n\nThanks for reaching out. Here is our starter guide.".to_string(),
        },
        EmailTemplate {
            id: TemplateId("tpl-premium".to_string()),
            name: "Premium Strategy Call".to_string(),
            subject: "{{name}}, let's book your strategy call".to_string(),
            body: "Hi {{name}},\n\nYour inquiry stood out (score {{score}}). Pick a time that suits you.".to_string(),
        },
    ]
}

pub(crate) fn sample_leads() -> Vec<Lead> {
    let epoch = seed_epoch();
    vec![
        Lead {
            id: LeadId("lead-0001".to_string()),
            name: "Priya Natarajan".to_string(),
            email: "priya@example.com".to_string(),
            bio: Some("Agency owner running paid campaigns for twelve dental clinics; we need multi-step intake funnels with qualification questions, calendar booking and follow-up sequences that hand warm leads to front-desk staff.".to_string()),
            source: Some("Referral".to_string()),
            response_time_minutes: Some(2.0),
            message_length: None,
            created_at: epoch + Duration::days(10),
            analyzed: false,
        },
        Lead {
            id: LeadId("lead-0002".to_string()),
            name: "Marcus Lee".to_string(),
            email: "marcus@example.com".to_string(),
            bio: Some("Just browsing".to_string()),
            source: None,
            response_time_minutes: Some(240.0),
            message_length: None,
            created_at: epoch + Duration::days(11),
            analyzed: false,
        },
        Lead {
            id: LeadId("lead-0003".to_string()),
            name: "Elena Costa".to_string(),
            email: "elena@example.com".to_string(),
            bio: None,
            source: Some("webinar".to_string()),
            response_time_minutes: None,
            message_length: Some(64.0),
            created_at: epoch + Duration::days(12),
            analyzed: false,
        },
    ]
}
