use uuid::Uuid;

use quadrant::risk::store::{plan_risk_case, risk_rank, RiskPlan, LEVEL_HIGH, LEVEL_LOW, LEVEL_MEDIUM};

#[test]
fn ensure_is_idempotent_per_level() {
    let case_id = Uuid::new_v4();
    let active = vec![(case_id, LEVEL_HIGH.to_string())];
    // two identical requests resolve to the same case, no duplicate
    assert_eq!(plan_risk_case(&active, LEVEL_HIGH), RiskPlan::ReturnExisting(case_id));
    assert_eq!(plan_risk_case(&active, LEVEL_HIGH), RiskPlan::ReturnExisting(case_id));
}

#[test]
fn higher_level_escalates_in_place_instead_of_duplicating() {
    let case_id = Uuid::new_v4();
    let active = vec![(case_id, LEVEL_LOW.to_string())];
    assert_eq!(plan_risk_case(&active, LEVEL_MEDIUM), RiskPlan::Escalate(case_id));
    assert_eq!(plan_risk_case(&active, LEVEL_HIGH), RiskPlan::Escalate(case_id));
}

#[test]
fn lower_level_request_leaves_the_stronger_case_untouched() {
    let case_id = Uuid::new_v4();
    let active = vec![(case_id, LEVEL_HIGH.to_string())];
    assert_eq!(plan_risk_case(&active, LEVEL_MEDIUM), RiskPlan::ReturnExisting(case_id));
    assert_eq!(plan_risk_case(&active, LEVEL_LOW), RiskPlan::ReturnExisting(case_id));
}

#[test]
fn fresh_employee_opens_a_case() {
    assert_eq!(plan_risk_case(&[], LEVEL_MEDIUM), RiskPlan::Create);
}

#[test]
fn resolved_cases_do_not_block_new_ones() {
    // the store only feeds open/monitoring cases into the plan; an empty
    // active set after resolution means a new case is created
    assert_eq!(plan_risk_case(&[], LEVEL_HIGH), RiskPlan::Create);
}

#[test]
fn level_ordering_is_total() {
    assert!(risk_rank(LEVEL_HIGH) > risk_rank(LEVEL_MEDIUM));
    assert!(risk_rank(LEVEL_MEDIUM) > risk_rank(LEVEL_LOW));
    assert!(risk_rank(LEVEL_LOW) > risk_rank("nonsense"));
}
