use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

use crate::config::ScenarioParams;

/// A skill the team depends on that one or two people hold.
#[derive(Debug, Clone, Serialize)]
pub struct KeyRiskSkill {
    pub skill_id: Uuid,
    pub name: String,
    pub owners: usize,
    pub risk_score: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct InternalCandidate {
    pub employee_id: Uuid,
    pub name: String,
    pub gap_score: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoleCoverage {
    pub role_profile_id: Uuid,
    pub role_name: String,
    pub is_leadership: bool,
    /// A must-have skill of this role rests on a single holder in the team.
    pub single_point_of_failure: bool,
    pub candidates: Vec<InternalCandidate>,
    pub hire_required: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamRiskHiringSummary {
    pub track_id: Uuid,
    pub track_name: String,
    pub headcount: usize,
    pub key_risk_skills: Vec<KeyRiskSkill>,
    pub roles: Vec<RoleCoverage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioActionDraft {
    pub action_type: String,
    pub role_name: String,
    pub employee_id: Option<Uuid>,
    pub priority: String,
    pub estimated_cost: f64,
    pub estimated_months: Option<i32>,
    pub rationale: String,
}

pub fn key_risk_score(owners: usize) -> Option<i32> {
    match owners {
        1 => Some(90),
        2 => Some(65),
        _ => None,
    }
}

/// Development runway for closing a gap: small gaps close in half a year,
/// moderate ones in a year, anything wider is not worth estimating.
pub fn months_to_close_gap(gap_score: i32, params: &ScenarioParams) -> Option<i32> {
    if gap_score <= 3 {
        Some(params.short_gap_months)
    } else if gap_score <= 7 {
        Some(params.long_gap_months)
    } else {
        None
    }
}

pub fn hire_cost(role: &RoleCoverage, params: &ScenarioParams) -> f64 {
    let mut cost = params.base_hire_cost;
    if role.is_leadership {
        cost *= params.leadership_hire_multiplier;
    }
    if role.single_point_of_failure {
        cost *= params.priority_hire_multiplier;
    }
    cost
}

/// Turn a team risk summary into concrete hire/develop/promote drafts. All
/// costs and time windows come from `ScenarioParams`.
pub fn suggest_actions(
    summary: &TeamRiskHiringSummary,
    params: &ScenarioParams,
) -> Vec<ScenarioActionDraft> {
    let mut actions = Vec::new();

    for role in &summary.roles {
        if role.hire_required {
            let priority = if role.single_point_of_failure { "high" } else { "medium" };
            actions.push(ScenarioActionDraft {
                action_type: "hire".to_string(),
                role_name: role.role_name.clone(),
                employee_id: None,
                priority: priority.to_string(),
                estimated_cost: hire_cost(role, params),
                estimated_months: None,
                rationale: format!(
                    "No internal candidate within gap threshold {} for {}",
                    params.internal_candidate_gap_threshold, role.role_name
                ),
            });
            continue;
        }

        for candidate in role.candidates.iter().take(params.max_candidates_per_role) {
            let months = months_to_close_gap(candidate.gap_score, params);
            let action_type = if candidate.gap_score <= 3 { "promote" } else { "develop" };
            actions.push(ScenarioActionDraft {
                action_type: action_type.to_string(),
                role_name: role.role_name.clone(),
                employee_id: Some(candidate.employee_id),
                priority: if role.single_point_of_failure {
                    "high".to_string()
                } else {
                    "medium".to_string()
                },
                estimated_cost: months
                    .map(|m| m as f64 * params.develop_cost_per_month)
                    .unwrap_or(0.0),
                estimated_months: months,
                rationale: format!(
                    "{} is {} point(s) away from the {} profile",
                    candidate.name, candidate.gap_score, role.role_name
                ),
            });
        }
    }

    actions
}

/// Key risk skills from a team's ownership map: anything one or two people
/// hold, single holders first.
pub fn key_risk_skills(owners_by_skill: &HashMap<Uuid, (String, usize)>) -> Vec<KeyRiskSkill> {
    let mut skills: Vec<KeyRiskSkill> = owners_by_skill
        .iter()
        .filter_map(|(skill_id, (name, owners))| {
            key_risk_score(*owners).map(|risk_score| KeyRiskSkill {
                skill_id: *skill_id,
                name: name.clone(),
                owners: *owners,
                risk_score,
            })
        })
        .collect();
    skills.sort_by(|a, b| b.risk_score.cmp(&a.risk_score).then_with(|| a.name.cmp(&b.name)));
    skills
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> ScenarioParams {
        ScenarioParams::default()
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

    fn candidate(name: &str, gap_score: i32) -> InternalCandidate {
        InternalCandidate {
            employee_id: Uuid::new_v4(),
            name: name.to_string(),
            gap_score,
        }
    }

    fn summary(roles: Vec<RoleCoverage>) -> TeamRiskHiringSummary {
        TeamRiskHiringSummary {
            track_id: Uuid::new_v4(),
            track_name: "Backend".to_string(),
            headcount: 4,
            key_risk_skills: vec![],
            roles,
        }
    }

    #[test]
    fn key_risk_score_only_for_one_or_two_owners() {
        assert_eq!(key_risk_score(1), Some(90));
        assert_eq!(key_risk_score(2), Some(65));
        assert_eq!(key_risk_score(0), None);
        assert_eq!(key_risk_score(3), None);
    }

    #[test]
    fn hire_cost_multipliers_compound() {
        let p = params();
        let plain = role("Engineer", false, false, vec![]);
        assert_eq!(hire_cost(&plain, &p), 50_000.0);
        let lead = role("Team Lead", true, false, vec![]);
        assert_eq!(hire_cost(&lead, &p), 75_000.0);
        let critical_lead = role("Staff Lead", true, true, vec![]);
        assert_eq!(hire_cost(&critical_lead, &p), 90_000.0);
    }

    #[test]
    fn uncovered_role_yields_hire_action() {
        let actions = suggest_actions(&summary(vec![role("SRE", false, true, vec![])]), &params());
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].action_type, "hire");
        assert_eq!(actions[0].priority, "high");
        assert_eq!(actions[0].estimated_cost, 60_000.0);
        assert_eq!(actions[0].estimated_months, None);
    }

    #[test]
    fn covered_role_develops_best_two_candidates() {
        let candidates = vec![candidate("Anna", 2), candidate("Boris", 5), candidate("Clara", 6)];
        let actions = suggest_actions(
            &summary(vec![role("Data Engineer", false, false, candidates)]),
            &params(),
        );
        assert_eq!(actions.len(), 2);
        // small gap promotes in 6 months
        assert_eq!(actions[0].action_type, "promote");
        assert_eq!(actions[0].estimated_months, Some(6));
        assert_eq!(actions[0].estimated_cost, 18_000.0);
        // wider gap develops over a year
        assert_eq!(actions[1].action_type, "develop");
        assert_eq!(actions[1].estimated_months, Some(12));
        assert_eq!(actions[1].estimated_cost, 36_000.0);
    }

    #[test]
    fn very_wide_gap_has_no_estimate() {
        let p = params();
        assert_eq!(months_to_close_gap(3, &p), Some(6));
        assert_eq!(months_to_close_gap(7, &p), Some(12));
        assert_eq!(months_to_close_gap(8, &p), None);
    }

    #[test]
    fn key_risk_skills_sort_single_holders_first() {
        let mut owners = HashMap::new();
        owners.insert(Uuid::new_v4(), ("Kafka".to_string(), 2));
        owners.insert(Uuid::new_v4(), ("GoLang".to_string(), 1));
        owners.insert(Uuid::new_v4(), ("SQL".to_string(), 4));
        let skills = key_risk_skills(&owners);
        assert_eq!(skills.len(), 2);
        assert_eq!(skills[0].name, "GoLang");
        assert_eq!(skills[0].risk_score, 90);
        assert_eq!(skills[1].name, "Kafka");
        assert_eq!(skills[1].risk_score, 65);
    }
}
