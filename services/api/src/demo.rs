use crate::infra::{
    default_rules, default_templates, sample_leads, InMemoryEmailOutbox,
    InMemoryLeadScoringRepository,
};
use clap::Args;
use funnel_ai::config::ScoringConfig;
use funnel_ai::error::AppError;
use funnel_ai::workflows::leads::{
    LeadScoringRepository, LeadScoringService, LeadScoringServiceError, LeadSnapshot,
    RepositoryError, ScoreResult, ScoringEngine, ScoringRuleImporter, TestEmailRequest,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct SimulateArgs {
    /// Scoring rule CSV export. Defaults to the built-in starter rules.
    #[arg(long)]
    pub(crate) rules: Option<PathBuf>,
    /// Free-text bio or first message from the lead
    #[arg(long)]
    pub(crate) bio: Option<String>,
    /// Lead source (defaults to "website")
    #[arg(long)]
    pub(crate) source: Option<String>,
    /// Minutes the lead took to respond
    #[arg(long)]
    pub(crate) response_time: Option<f64>,
    /// Message length override (defaults to the bio length)
    #[arg(long)]
    pub(crate) message_length: Option<f64>,
    /// Score above which the premium template is suggested
    #[arg(long)]
    pub(crate) premium_threshold: Option<i32>,
    /// Print the result as JSON instead of a table
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Scoring rule CSV export. Defaults to the built-in starter rules.
    #[arg(long)]
    pub(crate) rules: Option<PathBuf>,
    /// Recipient for the simulated test email.
    #[arg(long, default_value = "marketing-ops@example.com")]
    pub(crate) recipient: String,
    /// Skip the test email portion of the demo.
    #[arg(long)]
    pub(crate) skip_email: bool,
}

pub(crate) fn run_simulation(args: SimulateArgs) -> Result<(), AppError> {
    let SimulateArgs {
        rules,
        bio,
        source,
        response_time,
        message_length,
        premium_threshold,
        json,
    } = args;

    let rules = match rules {
        Some(path) => ScoringRuleImporter::from_path(path)?,
        None => default_rules(),
    };
    let mut config = ScoringConfig::default();
    if let Some(threshold) = premium_threshold {
        config.premium_threshold = threshold;
    }

    let engine = ScoringEngine::new(config);
    let snapshot = LeadSnapshot {
        bio,
        source,
        response_time_minutes: response_time,
        message_length,
    };
    let result = engine.evaluate(&snapshot, &rules);
    let templates = default_templates();
    let suggested = engine.suggest_template(&templates, result.total_score);

    if json {
        let payload = serde_json::json!({
            "total_score": result.total_score,
            "breakdown": result.breakdown(),
            "suggested_template": suggested.map(|template| template.name.clone()),
        });
        match serde_json::to_string_pretty(&payload) {
            Ok(rendered) => println!("{rendered}"),
            Err(err) => println!("Simulation payload unavailable: {err}"),
        }
        return Ok(());
    }

    println!("Lead scoring simulation ({} rules loaded)", rules.len());
    println!(
        "Lead: source={} | response time {} min | message length {}",
        snapshot.source(),
        snapshot.response_time_minutes(),
        snapshot.message_length()
    );
    render_score(&result);
    match suggested {
        Some(template) => println!("Suggested template: {}", template.name),
        None => println!("Suggested template: none available"),
    }

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        rules,
        recipient,
        skip_email,
    } = args;

    let rules = match rules {
        Some(path) => ScoringRuleImporter::from_path(path)?,
        None => default_rules(),
    };

    println!("Lead scoring demo");
    let repository = Arc::new(
        InMemoryLeadScoringRepository::seeded(rules, default_templates(), sample_leads())
            .map_err(LeadScoringServiceError::from)?,
    );
    let outbox = Arc::new(InMemoryEmailOutbox::default());
    let service = LeadScoringService::new(
        repository.clone(),
        outbox.clone(),
        ScoringConfig::default(),
    );

    let report = service.score_unanalyzed(10)?;
    println!(
        "\nBatch analysis: {} scored, {} failed",
        report.scored.len(),
        report.failed.len()
    );
    for entry in &report.scored {
        let lead = match repository.fetch_lead(&entry.lead_id) {
            Ok(Some(lead)) => lead,
            Ok(None) | Err(RepositoryError::NotFound) => continue,
            Err(err) => {
                println!("  Lead lookup unavailable: {}", err);
                continue;
            }
        };
        println!("\n- {} <{}> score {}", lead.name, lead.email, entry.total_score);
        match service.latest_score(&entry.lead_id) {
            Ok(record) => {
                for (name, detail) in record.score_breakdown.iter() {
                    println!("    {:+} {} ({})", detail.points, name, detail.reason);
                }
            }
            Err(err) => println!("    Breakdown unavailable: {}", err),
        }
    }
    for failure in &report.failed {
        println!("- {} failed: {}", failure.lead_id.0, failure.error);
    }

    if skip_email {
        return Ok(());
    }

    println!("\nTest email simulation");
    let request = TestEmailRequest {
        recipient,
        recipient_name: Some("Marketing Ops".to_string()),
        lead: LeadSnapshot {
            bio: Some("Referred by a partner agency, ready to launch next week".to_string()),
            source: Some("referral".to_string()),
            response_time_minutes: Some(1.0),
            message_length: Some(260.0),
        },
    };
    match service.send_test_email(request) {
        Ok(receipt) => {
            println!(
                "- Score {} -> template '{}' sent to {}",
                receipt.total_score, receipt.template_name, receipt.recipient
            );
            println!("  Subject: {}", receipt.email.subject);
        }
        Err(err) => println!("  Test email not sent: {}", err),
    }
    println!("  Outbox size: {}", outbox.sent().len());

    Ok(())
}

fn render_score(result: &ScoreResult) {
    println!("Total score: {}", result.total_score);
    let breakdown = result.breakdown();
    if breakdown.is_empty() {
        println!("No rules matched");
        return;
    }

    println!("Breakdown");
    for (name, detail) in breakdown.iter() {
        println!("- {:+} {} ({})", detail.points, name, detail.reason);
    }
}
