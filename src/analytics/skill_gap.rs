use diesel::prelude::*;
use diesel::PgConnection;
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

use crate::shared::error::ServiceError;
use crate::shared::models::schema::{
    talent_role_assignments, talent_role_profiles, talent_role_requirements,
    talent_skill_ratings, talent_skills,
};
use crate::skills::{RoleProfile, RoleRequirement};

pub const DEFAULT_TOP_GAP_LIMIT: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct GapEntry {
    pub skill_id: Uuid,
    pub skill_name: String,
    pub required_level: i32,
    pub current_level: Option<i32>,
    /// current − required; `None` when the employee has never been rated on
    /// this skill.
    pub gap: Option<i32>,
    pub importance: i32,
    pub must_have: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmployeeGapReport {
    pub employee_id: Uuid,
    pub role_profile_id: Uuid,
    pub role_name: String,
    pub gaps: Vec<GapEntry>,
    pub must_have_gap_score: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoleGapSkill {
    pub skill_id: Uuid,
    pub skill_name: String,
    pub required_level: i32,
    pub importance: i32,
    pub avg_gap: f64,
    pub affected_employees: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoleGapReport {
    pub role_profile_id: Uuid,
    pub role_name: String,
    pub assigned_employees: usize,
    pub top_gaps: Vec<RoleGapSkill>,
}

/// Compute per-skill gaps against a requirement list, given the employee's
/// latest rating per skill.
pub fn compute_gaps(
    requirements: &[(RoleRequirement, String)],
    latest_ratings: &HashMap<Uuid, i32>,
) -> Vec<GapEntry> {
    requirements
        .iter()
        .map(|(req, skill_name)| {
            let current_level = latest_ratings.get(&req.skill_id).copied();
            GapEntry {
                skill_id: req.skill_id,
                skill_name: skill_name.clone(),
                required_level: req.required_level,
                current_level,
                gap: current_level.map(|current| current - req.required_level),
                importance: req.importance,
                must_have: req.must_have,
            }
        })
        .collect()
}

/// Aggregated shortfall across must-have requirements. A missing rating
/// counts as the full required level; surpluses do not offset deficits.
pub fn must_have_gap_score(gaps: &[GapEntry]) -> i32 {
    gaps.iter()
        .filter(|g| g.must_have)
        .map(|g| match g.current_level {
            Some(current) => (g.required_level - current).max(0),
            None => g.required_level,
        })
        .sum()
}

/// Order role-wide gaps: importance desc, then avg gap asc (worst shortfall
/// first), then affected employees desc; truncated to `limit`.
pub fn top_role_gaps(mut entries: Vec<RoleGapSkill>, limit: usize) -> Vec<RoleGapSkill> {
    entries.sort_by(|a, b| {
        b.importance
            .cmp(&a.importance)
            .then_with(|| {
                a.avg_gap
                    .partial_cmp(&b.avg_gap)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .then_with(|| b.affected_employees.cmp(&a.affected_employees))
    });
    entries.truncate(limit);
    entries
}

/// Latest rating per skill for one employee, most recent `rated_at` wins.
pub fn load_latest_ratings(
    conn: &mut PgConnection,
    employee_id: Uuid,
) -> Result<HashMap<Uuid, i32>, ServiceError> {
    let rows: Vec<(Uuid, i32)> = talent_skill_ratings::table
        .filter(talent_skill_ratings::employee_id.eq(employee_id))
        .order(talent_skill_ratings::rated_at.desc())
        .select((talent_skill_ratings::skill_id, talent_skill_ratings::level))
        .load(conn)?;

    let mut latest = HashMap::new();
    for (skill_id, level) in rows {
        latest.entry(skill_id).or_insert(level);
    }
    Ok(latest)
}

fn load_requirements_with_names(
    conn: &mut PgConnection,
    role_profile_id: Uuid,
) -> Result<Vec<(RoleRequirement, String)>, ServiceError> {
    let requirements: Vec<RoleRequirement> = talent_role_requirements::table
        .filter(talent_role_requirements::role_profile_id.eq(role_profile_id))
        .load(conn)?;

    let skill_ids: Vec<Uuid> = requirements.iter().map(|r| r.skill_id).collect();
    let names: HashMap<Uuid, String> = if skill_ids.is_empty() {
        HashMap::new()
    } else {
        talent_skills::table
            .filter(talent_skills::id.eq_any(&skill_ids))
            .select((talent_skills::id, talent_skills::name))
            .load::<(Uuid, String)>(conn)?
            .into_iter()
            .collect()
    };

    Ok(requirements
        .into_iter()
        .map(|req| {
            let name = names.get(&req.skill_id).cloned().unwrap_or_default();
            (req, name)
        })
        .collect())
}

/// Resolve the role an employee is measured against: the primary assignment,
/// or the first assignment when none is marked primary.
fn resolve_assigned_role(
    conn: &mut PgConnection,
    employee_id: Uuid,
) -> Result<RoleProfile, ServiceError> {
    let role_id: Option<Uuid> = talent_role_assignments::table
        .filter(talent_role_assignments::employee_id.eq(employee_id))
        .order((
            talent_role_assignments::is_primary.desc(),
            talent_role_assignments::assigned_at.asc(),
        ))
        .select(talent_role_assignments::role_profile_id)
        .first(conn)
        .optional()?;

    let role_id = role_id.ok_or(ServiceError::NotFound("ROLE_NOT_FOUND"))?;
    talent_role_profiles::table
        .filter(talent_role_profiles::id.eq(role_id))
        .first(conn)
        .optional()?
        .ok_or(ServiceError::NotFound("ROLE_NOT_FOUND"))
}

pub fn employee_gap_report(
    conn: &mut PgConnection,
    employee_id: Uuid,
) -> Result<EmployeeGapReport, ServiceError> {
    let role = resolve_assigned_role(conn, employee_id)?;
    let requirements = load_requirements_with_names(conn, role.id)?;
    let latest = load_latest_ratings(conn, employee_id)?;
    let gaps = compute_gaps(&requirements, &latest);
    let score = must_have_gap_score(&gaps);

    Ok(EmployeeGapReport {
        employee_id,
        role_profile_id: role.id,
        role_name: role.name,
        gaps,
        must_have_gap_score: score,
    })
}

/// The per-employee computation broadcast across everyone assigned to the
/// role, aggregated per skill.
pub fn role_gap_report(
    conn: &mut PgConnection,
    role_profile_id: Uuid,
    limit: usize,
) -> Result<RoleGapReport, ServiceError> {
    let role: RoleProfile = talent_role_profiles::table
        .filter(talent_role_profiles::id.eq(role_profile_id))
        .first(conn)
        .optional()?
        .ok_or(ServiceError::NotFound("ROLE_NOT_FOUND"))?;

    let employee_ids: Vec<Uuid> = talent_role_assignments::table
        .filter(talent_role_assignments::role_profile_id.eq(role_profile_id))
        .select(talent_role_assignments::employee_id)
        .load(conn)?;

    let requirements = load_requirements_with_names(conn, role_profile_id)?;

    // skill id -> (gap sum, rated count, affected count)
    let mut aggregate: HashMap<Uuid, (i64, usize, usize)> = HashMap::new();
    for employee_id in &employee_ids {
        let latest = load_latest_ratings(conn, *employee_id)?;
        for entry in compute_gaps(&requirements, &latest) {
            let slot = aggregate.entry(entry.skill_id).or_insert((0, 0, 0));
            if let Some(gap) = entry.gap {
                slot.0 += gap as i64;
                slot.1 += 1;
                if gap < 0 {
                    slot.2 += 1;
                }
            }
        }
    }

    let entries: Vec<RoleGapSkill> = requirements
        .iter()
        .map(|(req, skill_name)| {
            let (gap_sum, rated, affected) =
                aggregate.get(&req.skill_id).copied().unwrap_or((0, 0, 0));
            let avg_gap = if rated == 0 { 0.0 } else { gap_sum as f64 / rated as f64 };
            RoleGapSkill {
                skill_id: req.skill_id,
                skill_name: skill_name.clone(),
                required_level: req.required_level,
                importance: req.importance,
                avg_gap,
                affected_employees: affected,
            }
        })
        .collect();

    Ok(RoleGapReport {
        role_profile_id,
        role_name: role.name,
        assigned_employees: employee_ids.len(),
        top_gaps: top_role_gaps(entries, limit),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn requirement(
        skill_id: Uuid,
        required: i32,
        importance: i32,
        must_have: bool,
    ) -> (RoleRequirement, String) {
        (
            RoleRequirement {
                id: Uuid::new_v4(),
                role_profile_id: Uuid::nil(),
                skill_id,
                required_level: required,
                importance,
                must_have,
            },
            format!("skill-{required}"),
        )
    }

    #[test]
    fn gap_is_current_minus_required() {
        let skill_id = Uuid::new_v4();
        let requirements = vec![requirement(skill_id, 3, 2, false)];
        let mut ratings = HashMap::new();
        ratings.insert(skill_id, 5);
        let gaps = compute_gaps(&requirements, &ratings);
        assert_eq!(gaps[0].gap, Some(2));
        assert_eq!(gaps[0].current_level, Some(5));
    }

    #[test]
    fn unrated_skill_has_null_gap() {
        let requirements = vec![requirement(Uuid::new_v4(), 4, 1, true)];
        let gaps = compute_gaps(&requirements, &HashMap::new());
        assert_eq!(gaps[0].gap, None);
        assert_eq!(gaps[0].current_level, None);
    }

    #[test]
    fn must_have_score_counts_missing_ratings_as_full_gap() {
        let rated = Uuid::new_v4();
        let unrated = Uuid::new_v4();
        let optional = Uuid::new_v4();
        let requirements = vec![
            requirement(rated, 4, 1, true),
            requirement(unrated, 3, 1, true),
            requirement(optional, 5, 1, false),
        ];
        let mut ratings = HashMap::new();
        ratings.insert(rated, 2);
        let gaps = compute_gaps(&requirements, &ratings);
        // (4-2) + 3, the optional requirement is ignored
        assert_eq!(must_have_gap_score(&gaps), 5);
    }

    #[test]
    fn surplus_does_not_offset_deficit() {
        let strong = Uuid::new_v4();
        let weak = Uuid::new_v4();
        let requirements = vec![
            requirement(strong, 2, 1, true),
            requirement(weak, 4, 1, true),
        ];
        let mut ratings = HashMap::new();
        ratings.insert(strong, 5);
        ratings.insert(weak, 1);
        let gaps = compute_gaps(&requirements, &ratings);
        assert_eq!(must_have_gap_score(&gaps), 3);
    }

    #[test]
    fn top_gaps_sort_importance_then_avg_then_affected() {
        let mk = |importance, avg_gap, affected| RoleGapSkill {
            skill_id: Uuid::new_v4(),
            skill_name: String::new(),
            required_level: 3,
            importance,
            avg_gap,
            affected_employees: affected,
        };
        let sorted = top_role_gaps(
            vec![mk(1, -2.0, 4), mk(3, -0.5, 1), mk(3, -1.5, 2), mk(2, -3.0, 5)],
            3,
        );
        assert_eq!(sorted.len(), 3);
        assert_eq!(sorted[0].importance, 3);
        assert_eq!(sorted[0].avg_gap, -1.5);
        assert_eq!(sorted[1].importance, 3);
        assert_eq!(sorted[1].avg_gap, -0.5);
        assert_eq!(sorted[2].importance, 2);
    }

    #[test]
    fn top_gaps_truncate_to_limit() {
        let entries: Vec<RoleGapSkill> = (0..10)
            .map(|i| RoleGapSkill {
                skill_id: Uuid::new_v4(),
                skill_name: String::new(),
                required_level: 3,
                importance: i,
                avg_gap: 0.0,
                affected_employees: 0,
            })
            .collect();
        assert_eq!(top_role_gaps(entries, DEFAULT_TOP_GAP_LIMIT).len(), 5);
    }
}
