use super::common::*;
use crate::workflows::leads::domain::{ConditionOperator, LeadSnapshot, RuleType};
use crate::workflows::leads::scoring::BreakdownEntry;

#[test]
fn fast_responder_scores_quick_replies() {
    let engine = scoring_engine();
    let lead = LeadSnapshot {
        response_time_minutes: Some(3.0),
        ..LeadSnapshot::default()
    };

    let result = engine.evaluate(&lead, &[fast_responder()]);

    assert_eq!(result.total_score, 20);
    let breakdown = result.breakdown();
    assert_eq!(breakdown.len(), 1);
    assert_eq!(
        breakdown.get("Fast Responder"),
        Some(&BreakdownEntry {
            points: 20,
            reason: "response_time less_than 5".to_string(),
        })
    );
}

#[test]
fn slow_replies_do_not_match() {
    let engine = scoring_engine();
    let lead = LeadSnapshot {
        response_time_minutes: Some(10.0),
        ..LeadSnapshot::default()
    };

    let result = engine.evaluate(&lead, &[fast_responder()]);

    assert_eq!(result.total_score, 0);
    assert!(result.breakdown().is_empty());
}

#[test]
fn empty_rule_set_scores_zero() {
    let result = scoring_engine().evaluate(&LeadSnapshot::default(), &[]);

    assert_eq!(result.total_score, 0);
    assert!(result.components.is_empty());
    assert!(result.breakdown().is_empty());
}

#[test]
fn inactive_rules_never_contribute() {
    let rules = vec![
        inactive(rule(
            "Website Visitor",
            RuleType::Source,
            ConditionOperator::Equals,
            "website",
            40,
        )),
        rule("Neutral Tone", RuleType::Tone, ConditionOperator::Equals, "neutral", 5),
    ];

    let result = scoring_engine().evaluate(&LeadSnapshot::default(), &rules);

    assert_eq!(result.total_score, 5);
    assert!(result.breakdown().get("Website Visitor").is_none());
}

#[test]
fn equality_and_substring_checks_ignore_case() {
    let rules = vec![
        rule("Site", RuleType::Source, ConditionOperator::Equals, "Website", 10),
        rule("Web", RuleType::Source, ConditionOperator::Contains, "WEB", 7),
    ];
    let lead = LeadSnapshot {
        source: Some("website".to_string()),
        ..LeadSnapshot::default()
    };

    let result = scoring_engine().evaluate(&lead, &rules);

    assert_eq!(result.total_score, 17);
}

#[test]
fn missing_source_defaults_to_website() {
    let rules = vec![rule(
        "Organic",
        RuleType::Source,
        ConditionOperator::Equals,
        "website",
        12,
    )];

    let result = scoring_engine().evaluate(&LeadSnapshot::default(), &rules);

    assert_eq!(result.total_score, 12);
}

#[test]
fn missing_response_time_defaults_to_zero() {
    let rules = vec![rule(
        "Instant",
        RuleType::ResponseTime,
        ConditionOperator::LessThan,
        "10",
        8,
    )];

    let result = scoring_engine().evaluate(&LeadSnapshot::default(), &rules);

    assert_eq!(result.total_score, 8);
}

#[test]
fn message_length_falls_back_to_bio_length() {
    let lead = LeadSnapshot {
        bio: Some("hello world".to_string()),
        ..LeadSnapshot::default()
    };
    assert_eq!(lead.message_length(), 11.0);

    let rules = vec![
        rule("Eleven", RuleType::MessageLength, ConditionOperator::Equals, "11", 3),
        rule("Wordy", RuleType::MessageLength, ConditionOperator::GreaterThan, "10", 4),
        rule("Terse", RuleType::MessageLength, ConditionOperator::LessThan, "11", 50),
    ];

    let result = scoring_engine().evaluate(&lead, &rules);

    assert_eq!(result.total_score, 7);
}

#[test]
fn bio_length_counts_utf16_code_units() {
    let lead = LeadSnapshot {
        bio: Some("hi 👋".to_string()),
        ..LeadSnapshot::default()
    };

    assert_eq!(lead.message_length(), 5.0);
}

#[test]
fn explicit_message_length_wins_over_bio() {
    let lead = LeadSnapshot {
        bio: Some("hello world".to_string()),
        message_length: Some(240.0),
        ..LeadSnapshot::default()
    };
    let rules = vec![rule(
        "Detailed",
        RuleType::MessageLength,
        ConditionOperator::GreaterThan,
        "200",
        15,
    )];

    assert_eq!(scoring_engine().evaluate(&lead, &rules).total_score, 15);
}

#[test]
fn malformed_numeric_operands_are_non_matches() {
    let rules = vec![
        rule("Garbage", RuleType::ResponseTime, ConditionOperator::LessThan, "soon", 10),
        rule("Blank", RuleType::MessageLength, ConditionOperator::GreaterThan, "", 10),
        rule("Textual", RuleType::Source, ConditionOperator::GreaterThan, "3", 10),
        rule("Valid", RuleType::ResponseTime, ConditionOperator::LessThan, " 30 ", 2),
    ];
    let lead = LeadSnapshot {
        response_time_minutes: Some(4.0),
        ..LeadSnapshot::default()
    };

    let result = scoring_engine().evaluate(&lead, &rules);

    assert_eq!(result.total_score, 2);
    assert_eq!(result.components.len(), 1);
    assert_eq!(result.components[0].rule_name, "Valid");
}

#[test]
fn tone_rules_resolve_against_neutral_placeholder() {
    let rules = vec![
        rule("Calm", RuleType::Tone, ConditionOperator::Equals, "Neutral", 6),
        rule("Angry", RuleType::Tone, ConditionOperator::Contains, "angry", -20),
    ];
    let lead = LeadSnapshot {
        bio: Some("I am angry about the delay".to_string()),
        ..LeadSnapshot::default()
    };

    assert_eq!(scoring_engine().evaluate(&lead, &rules).total_score, 6);
}

#[test]
fn negative_points_reduce_the_total() {
    let rules = vec![
        fast_responder(),
        rule("Cold Source", RuleType::Source, ConditionOperator::Contains, "purchased", -35),
    ];
    let lead = LeadSnapshot {
        source: Some("Purchased List".to_string()),
        response_time_minutes: Some(1.0),
        ..LeadSnapshot::default()
    };

    let result = scoring_engine().evaluate(&lead, &rules);

    assert_eq!(result.total_score, -15);
    assert_eq!(result.breakdown().total(), -15);
}

#[test]
fn breakdown_keeps_rule_evaluation_order() {
    let rules = vec![
        rule("Zulu", RuleType::Tone, ConditionOperator::Equals, "neutral", 1),
        rule("Alpha", RuleType::Source, ConditionOperator::Equals, "website", 2),
        rule("Mike", RuleType::ResponseTime, ConditionOperator::LessThan, "1", 3),
    ];

    let result = scoring_engine().evaluate(&LeadSnapshot::default(), &rules);
    let breakdown = result.breakdown();
    let names: Vec<&str> = breakdown.iter().map(|(name, _)| name).collect();

    assert_eq!(names, vec!["Zulu", "Alpha", "Mike"]);
}

#[test]
fn duplicate_rule_names_keep_total_and_breakdown_in_sync() {
    let mut second = rule("Engaged", RuleType::Source, ConditionOperator::Equals, "website", 25);
    second.id = crate::workflows::leads::domain::RuleId("rule-engaged-2".to_string());
    let rules = vec![
        rule("Engaged", RuleType::Tone, ConditionOperator::Equals, "neutral", 30),
        second,
    ];

    let result = scoring_engine().evaluate(&LeadSnapshot::default(), &rules);
    let breakdown = result.breakdown();

    assert_eq!(result.total_score, 55);
    assert_eq!(result.components.len(), 2);
    assert_eq!(breakdown.len(), 1);
    assert_eq!(breakdown.total(), result.total_score);
}

#[test]
fn totals_past_the_point_range_match_the_breakdown() {
    let mut offset = rule("Anchor", RuleType::ResponseTime, ConditionOperator::LessThan, "1", -1);
    offset.id = crate::workflows::leads::domain::RuleId("rule-anchor-2".to_string());
    let rules = vec![
        rule("Anchor", RuleType::Tone, ConditionOperator::Equals, "neutral", i32::MAX),
        rule("Website", RuleType::Source, ConditionOperator::Equals, "website", 1),
        offset,
    ];

    let result = scoring_engine().evaluate(&LeadSnapshot::default(), &rules);
    let breakdown = result.breakdown();

    assert_eq!(result.total_score, i64::from(i32::MAX));
    assert_eq!(breakdown.total(), result.total_score);
    assert_eq!(
        breakdown.get("Anchor").map(|entry| entry.points),
        Some(i64::from(i32::MAX) - 1)
    );

    let overflowing = vec![
        rule("Huge", RuleType::Tone, ConditionOperator::Equals, "neutral", i32::MAX),
        rule("Huger", RuleType::Source, ConditionOperator::Equals, "website", i32::MAX),
    ];
    let result = scoring_engine().evaluate(&LeadSnapshot::default(), &overflowing);

    assert_eq!(result.total_score, 2 * i64::from(i32::MAX));
    assert_eq!(result.breakdown().total(), result.total_score);
}

#[test]
fn evaluation_is_repeatable() {
    let rules = vec![
        fast_responder(),
        rule("Site", RuleType::Source, ConditionOperator::Contains, "site", 10),
    ];
    let lead = LeadSnapshot {
        response_time_minutes: Some(2.5),
        ..LeadSnapshot::default()
    };
    let engine = scoring_engine();

    assert_eq!(engine.evaluate(&lead, &rules), engine.evaluate(&lead, &rules));
}

#[test]
fn high_scoring_leads_get_the_premium_template() {
    let rules = vec![
        rule("Referral", RuleType::Source, ConditionOperator::Equals, "referral", 30),
        rule("Quick", RuleType::ResponseTime, ConditionOperator::LessThan, "15", 25),
    ];
    let lead = LeadSnapshot {
        source: Some("Referral".to_string()),
        response_time_minutes: Some(4.0),
        ..LeadSnapshot::default()
    };
    let engine = scoring_engine();

    let result = engine.evaluate(&lead, &rules);
    assert_eq!(result.total_score, 55);

    let catalogue = templates();
    let chosen = engine
        .suggest_template(&catalogue, result.total_score)
        .expect("template suggested");
    assert_eq!(chosen.name, "Premium Concierge");

    let without_premium = vec![template("tpl-a", "Follow Up"), template("tpl-b", "Basic")];
    let chosen = engine
        .suggest_template(&without_premium, result.total_score)
        .expect("template suggested");
    assert_eq!(chosen.name, "Follow Up");
}
