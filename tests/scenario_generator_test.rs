use uuid::Uuid;

use quadrant::config::ScenarioParams;
use quadrant::scenarios::generator::{
    hire_cost, key_risk_score, suggest_actions, InternalCandidate, RoleCoverage,
    TeamRiskHiringSummary,
};

fn candidate(name: &str, gap_score: i32) -> InternalCandidate {
    InternalCandidate {
        employee_id: Uuid::new_v4(),
        name: name.to_string(),
        gap_score,
    }
}

fn role(name: &str, leadership: bool, spof: bool, candidates: Vec<InternalCandidate>) -> RoleCoverage {
    RoleCoverage {
        role_profile_id: Uuid::new_v4(),
        role_name: name.to_string(),
        is_leadership: leadership,
        single_point_of_failure: spof,
        hire_required: candidates.is_empty(),
        candidates,
    }
}

fn summary(roles: Vec<RoleCoverage>) -> TeamRiskHiringSummary {
    TeamRiskHiringSummary {
        track_id: Uuid::new_v4(),
        track_name: "Backend".to_string(),
        headcount: 5,
        key_risk_skills: vec![],
        roles,
    }
}

#[test]
fn one_or_two_owners_make_a_key_risk_skill() {
    assert_eq!(key_risk_score(1), Some(90));
    assert_eq!(key_risk_score(2), Some(65));
    assert_eq!(key_risk_score(3), None);
}

#[test]
fn hire_action_costs_follow_configured_multipliers() {
    let params = ScenarioParams::default();
    let lead = role("Engineering Lead", true, true, vec![]);
    let actions = suggest_actions(&summary(vec![lead]), &params);
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0].action_type, "hire");
    // 50_000 * 1.5 * 1.2
    assert_eq!(actions[0].estimated_cost, 90_000.0);
    assert_eq!(actions[0].priority, "high");
}

#[test]
fn covered_roles_never_produce_hire_actions() {
    let params = ScenarioParams::default();
    let covered = role("Backend Engineer", false, false, vec![candidate("Anna", 1)]);
    let actions = suggest_actions(&summary(vec![covered]), &params);
    assert!(actions.iter().all(|a| a.action_type != "hire"));
}

#[test]
fn at_most_two_candidates_per_role_get_actions() {
    let params = ScenarioParams::default();
    let crowded = role(
        "Platform Engineer",
        false,
        false,
        vec![
            candidate("Anna", 1),
            candidate("Boris", 4),
            candidate("Clara", 5),
            candidate("Dmitri", 6),
        ],
    );
    let actions = suggest_actions(&summary(vec![crowded]), &params);
    assert_eq!(actions.len(), 2);
}

#[test]
fn development_time_and_cost_scale_with_gap() {
    let params = ScenarioParams::default();
    let pair = role(
        "Data Engineer",
        false,
        false,
        vec![candidate("Anna", 2), candidate("Boris", 6)],
    );
    let actions = suggest_actions(&summary(vec![pair]), &params);
    assert_eq!(actions[0].action_type, "promote");
    assert_eq!(actions[0].estimated_months, Some(6));
    assert_eq!(actions[0].estimated_cost, 18_000.0);
    assert_eq!(actions[1].action_type, "develop");
    assert_eq!(actions[1].estimated_months, Some(12));
    assert_eq!(actions[1].estimated_cost, 36_000.0);
}

#[test]
fn tuned_params_change_the_economics() {
    let params = ScenarioParams {
        base_hire_cost: 10_000.0,
        leadership_hire_multiplier: 2.0,
        ..ScenarioParams::default()
    };
    let lead = role("Head of Data", true, false, vec![]);
    assert_eq!(hire_cost(&lead, &params), 20_000.0);
}
