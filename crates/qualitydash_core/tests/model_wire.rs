use chrono::NaiveDate;
use qualitydash_core::{
    ConditionStatus, FreshnessPolicy, Level, ObjectiveStatus, Project, Reason, ReviewFreshness,
    WorkCycle,
};
use serde_json::json;

#[test]
fn condition_status_uses_snake_case_codes() {
    assert_eq!(
        serde_json::to_value(ConditionStatus::NotApplicable).unwrap(),
        json!("not_applicable")
    );
    let parsed: ConditionStatus = serde_json::from_value(json!("candidate")).unwrap();
    assert_eq!(parsed, ConditionStatus::Candidate);
    assert!(serde_json::from_value::<ConditionStatus>(json!("DO")).is_err());
}

#[test]
fn objective_status_is_tagged_by_kind() {
    let level = Level::new("Level 2", 2);
    let value = serde_json::to_value(ObjectiveStatus::Level(level.clone())).unwrap();
    assert_eq!(value["kind"], json!("level"));
    assert_eq!(value["value"]["name"], json!("Level 2"));
    assert_eq!(value["value"]["value"], json!(2));

    let reason = Reason::new("Not prioritized", 1);
    let value = serde_json::to_value(ObjectiveStatus::Reason(reason)).unwrap();
    assert_eq!(value["kind"], json!("reason"));
}

#[test]
fn freshness_policy_fills_missing_thresholds() {
    let policy: FreshnessPolicy = serde_json::from_value(json!({ "new_days": 14 })).unwrap();
    assert_eq!(policy.new_days, 14);
    assert_eq!(policy.acceptable_days, FreshnessPolicy::default().acceptable_days);
    assert_eq!(policy.overdue_days, FreshnessPolicy::default().overdue_days);
}

#[test]
fn review_freshness_serializes_snake_case() {
    let mut project = Project::new("Alpha");
    project.last_review = NaiveDate::from_ymd_opt(2024, 1, 1);
    let today = NaiveDate::from_ymd_opt(2024, 12, 1).unwrap();

    let freshness = project
        .review_freshness(today, &FreshnessPolicy::default())
        .unwrap();
    assert_eq!(freshness, ReviewFreshness::Unacceptable);
    assert_eq!(serde_json::to_value(freshness).unwrap(), json!("unacceptable"));
}

#[test]
fn work_cycle_dates_are_iso_strings() {
    let work_cycle = WorkCycle::new("2024 Q1", NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    let value = serde_json::to_value(&work_cycle).unwrap();
    assert_eq!(value["started_on"], json!("2024-01-01"));
    assert_eq!(value["is_current"], json!(false));
}
