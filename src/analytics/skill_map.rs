use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use super::snapshot::SkillSnapshot;
use crate::shared::utils::round1;
use crate::talent::employee_level_rank;

/// Bucket for employees without a primary track.
pub const UNASSIGNED_POOL: &str = "Общий пул";

const MAX_KEY_HOLDERS: usize = 3;
const MAX_DOMINANT_SKILLS: usize = 5;
const MAX_TEAM_RISKS: usize = 3;

/// Coverage above which a low-severity team risk is noise, not signal.
const LOW_RISK_COVERAGE_CUTOFF: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_bus_factor(bus_factor: usize) -> Self {
        match bus_factor {
            0 | 1 => Self::High,
            2 => Self::Medium,
            _ => Self::Low,
        }
    }

    pub fn severity_weight(self) -> i32 {
        match self {
            Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct KeyHolder {
    pub employee_id: Uuid,
    pub name: String,
    pub skill_level: i32,
    pub employee_level: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkillMapEntry {
    pub skill_id: Uuid,
    pub name: String,
    pub kind: String,
    pub people_count: usize,
    pub average_level: f64,
    pub coverage: f64,
    pub bus_factor: usize,
    pub risk_level: RiskLevel,
    pub risk_score: i32,
    pub key_holders: Vec<KeyHolder>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DominantSkill {
    pub skill_id: Uuid,
    pub name: String,
    pub coverage: f64,
    pub average_level: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamRiskEntry {
    pub skill_id: Uuid,
    pub skill_name: String,
    pub severity: RiskLevel,
    pub coverage: f64,
    pub holders: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamSkillProfile {
    pub track_id: Option<Uuid>,
    pub team: String,
    pub headcount: usize,
    pub dominant_skills: Vec<DominantSkill>,
    pub risks: Vec<TeamRiskEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkillMap {
    pub total_employees: usize,
    pub skills: Vec<SkillMapEntry>,
    pub teams: Vec<TeamSkillProfile>,
}

pub fn risk_score_for_bus_factor(bus_factor: usize) -> i32 {
    if bus_factor == 0 {
        100
    } else {
        (100.0 / bus_factor as f64).round() as i32
    }
}

/// Build the full workspace skill map from a snapshot. Pure; all input comes
/// from `SkillSnapshot`.
pub fn build_skill_map(snapshot: &SkillSnapshot) -> SkillMap {
    let total_employees = snapshot.total_employees();

    let employee_by_id: HashMap<Uuid, &crate::talent::Employee> =
        snapshot.employees.iter().map(|e| (e.id, e)).collect();

    // skill id -> (employee id, level)
    let mut holders: HashMap<Uuid, Vec<(Uuid, i32)>> = HashMap::new();
    for assignment in &snapshot.assignments {
        if employee_by_id.contains_key(&assignment.employee_id) {
            holders
                .entry(assignment.skill_id)
                .or_default()
                .push((assignment.employee_id, assignment.level));
        }
    }

    let mut skills = Vec::with_capacity(snapshot.skills.len());
    for skill in &snapshot.skills {
        let skill_holders = holders.get(&skill.id).cloned().unwrap_or_default();
        let people_count = skill_holders.len();
        let average_level = if people_count == 0 {
            0.0
        } else {
            let sum: i32 = skill_holders.iter().map(|(_, level)| level).sum();
            round1(sum as f64 / people_count as f64)
        };
        let coverage = if total_employees == 0 {
            0.0
        } else {
            round1(people_count as f64 / total_employees as f64 * 100.0)
        };

        let mut ranked = skill_holders.clone();
        ranked.sort_by(|a, b| {
            b.1.cmp(&a.1).then_with(|| {
                let rank_a = employee_by_id
                    .get(&a.0)
                    .map(|e| employee_level_rank(&e.level))
                    .unwrap_or(0);
                let rank_b = employee_by_id
                    .get(&b.0)
                    .map(|e| employee_level_rank(&e.level))
                    .unwrap_or(0);
                rank_b.cmp(&rank_a)
            })
        });
        let key_holders = ranked
            .iter()
            .take(MAX_KEY_HOLDERS)
            .filter_map(|(employee_id, level)| {
                employee_by_id.get(employee_id).map(|e| KeyHolder {
                    employee_id: *employee_id,
                    name: e.name.clone(),
                    skill_level: *level,
                    employee_level: e.level.clone(),
                })
            })
            .collect();

        skills.push(SkillMapEntry {
            skill_id: skill.id,
            name: skill.name.clone(),
            kind: skill.kind.clone(),
            people_count,
            average_level,
            coverage,
            bus_factor: people_count,
            risk_level: RiskLevel::from_bus_factor(people_count),
            risk_score: risk_score_for_bus_factor(people_count),
            key_holders,
        });
    }

    let teams = build_team_profiles(snapshot, &skills);

    SkillMap {
        total_employees,
        skills,
        teams,
    }
}

fn build_team_profiles(
    snapshot: &SkillSnapshot,
    skills: &[SkillMapEntry],
) -> Vec<TeamSkillProfile> {
    let skill_by_id: HashMap<Uuid, &SkillMapEntry> =
        skills.iter().map(|s| (s.skill_id, s)).collect();

    // track id (None = unassigned pool) -> member ids
    let mut members: HashMap<Option<Uuid>, Vec<Uuid>> = HashMap::new();
    for employee in &snapshot.employees {
        members.entry(employee.track_id).or_default().push(employee.id);
    }

    let mut assignments_by_employee: HashMap<Uuid, Vec<(Uuid, i32)>> = HashMap::new();
    for assignment in &snapshot.assignments {
        assignments_by_employee
            .entry(assignment.employee_id)
            .or_default()
            .push((assignment.skill_id, assignment.level));
    }

    let mut ordered_groups: Vec<(Option<Uuid>, String)> = snapshot
        .tracks
        .iter()
        .map(|t| (Some(t.id), t.name.clone()))
        .collect();
    if members.contains_key(&None) {
        ordered_groups.push((None, UNASSIGNED_POOL.to_string()));
    }

    let mut profiles = Vec::new();
    for (track_id, team_name) in ordered_groups {
        let member_ids = match members.get(&track_id) {
            Some(ids) if !ids.is_empty() => ids,
            _ => continue,
        };
        let headcount = member_ids.len();

        // skill id -> (holders in team, level sum)
        let mut team_skills: HashMap<Uuid, (usize, i32)> = HashMap::new();
        for member in member_ids {
            if let Some(skill_levels) = assignments_by_employee.get(member) {
                for (skill_id, level) in skill_levels {
                    let entry = team_skills.entry(*skill_id).or_insert((0, 0));
                    entry.0 += 1;
                    entry.1 += level;
                }
            }
        }

        let mut dominant: Vec<DominantSkill> = team_skills
            .iter()
            .filter_map(|(skill_id, (count, level_sum))| {
                skill_by_id.get(skill_id).map(|s| DominantSkill {
                    skill_id: *skill_id,
                    name: s.name.clone(),
                    coverage: round1(*count as f64 / headcount as f64 * 100.0),
                    average_level: round1(*level_sum as f64 / *count as f64),
                })
            })
            .collect();
        dominant.sort_by(|a, b| {
            b.coverage
                .partial_cmp(&a.coverage)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.name.cmp(&b.name))
        });
        dominant.truncate(MAX_DOMINANT_SKILLS);

        let mut risks: Vec<TeamRiskEntry> = team_skills
            .iter()
            .filter_map(|(skill_id, (count, _))| {
                let skill = skill_by_id.get(skill_id)?;
                let coverage = round1(*count as f64 / headcount as f64 * 100.0);
                let severity = skill.risk_level;
                if severity == RiskLevel::Low && coverage > LOW_RISK_COVERAGE_CUTOFF {
                    return None;
                }
                Some(TeamRiskEntry {
                    skill_id: *skill_id,
                    skill_name: skill.name.clone(),
                    severity,
                    coverage,
                    holders: *count,
                })
            })
            .collect();
        risks.sort_by(|a, b| {
            b.severity
                .severity_weight()
                .cmp(&a.severity.severity_weight())
                .then_with(|| {
                    a.coverage
                        .partial_cmp(&b.coverage)
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .then_with(|| a.skill_name.cmp(&b.skill_name))
        });
        risks.truncate(MAX_TEAM_RISKS);

        profiles.push(TeamSkillProfile {
            track_id,
            team: team_name,
            headcount,
            dominant_skills: dominant,
            risks,
        });
    }

    profiles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skills::{EmployeeSkill, Skill};
    use crate::talent::{Employee, Track, LEVEL_JUNIOR, LEVEL_MIDDLE, LEVEL_SENIOR};
    use chrono::Utc;

    fn employee(name: &str, level: &str, track_id: Option<Uuid>) -> Employee {
        let now = Utc::now();
        Employee {
            id: Uuid::new_v4(),
            workspace_id: Uuid::nil(),
            name: name.to_string(),
            position: None,
            level: level.to_string(),
            track_id,
            track_level: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn skill(name: &str) -> Skill {
        Skill {
            id: Uuid::new_v4(),
            workspace_id: Uuid::nil(),
            name: name.to_string(),
            kind: "hard".to_string(),
            created_at: Utc::now(),
        }
    }

    fn assign(employee: &Employee, skill: &Skill, level: i32) -> EmployeeSkill {
        EmployeeSkill {
            id: Uuid::new_v4(),
            employee_id: employee.id,
            skill_id: skill.id,
            level,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn risk_level_follows_bus_factor() {
        assert_eq!(RiskLevel::from_bus_factor(0), RiskLevel::High);
        assert_eq!(RiskLevel::from_bus_factor(1), RiskLevel::High);
        assert_eq!(RiskLevel::from_bus_factor(2), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_bus_factor(3), RiskLevel::Low);
        assert_eq!(RiskLevel::from_bus_factor(12), RiskLevel::Low);
    }

    #[test]
    fn risk_score_is_inverse_bus_factor() {
        assert_eq!(risk_score_for_bus_factor(0), 100);
        assert_eq!(risk_score_for_bus_factor(1), 100);
        assert_eq!(risk_score_for_bus_factor(2), 50);
        assert_eq!(risk_score_for_bus_factor(3), 33);
    }

    #[test]
    fn unheld_skill_is_high_risk_with_zero_average() {
        let a = employee("Anna", LEVEL_SENIOR, None);
        let orphan = skill("Terraform");
        let snapshot = SkillSnapshot {
            employees: vec![a],
            skills: vec![orphan],
            tracks: vec![],
            assignments: vec![],
        };
        let map = build_skill_map(&snapshot);
        let entry = &map.skills[0];
        assert_eq!(entry.people_count, 0);
        assert_eq!(entry.average_level, 0.0);
        assert_eq!(entry.coverage, 0.0);
        assert_eq!(entry.risk_level, RiskLevel::High);
        assert_eq!(entry.risk_score, 100);
        assert!(entry.key_holders.is_empty());
    }

    #[test]
    fn single_holder_example_from_three_employees() {
        let a = employee("Anna", LEVEL_MIDDLE, None);
        let b = employee("Boris", LEVEL_JUNIOR, None);
        let c = employee("Clara", LEVEL_SENIOR, None);
        let golang = skill("GoLang");
        let assignments = vec![assign(&a, &golang, 4)];
        let snapshot = SkillSnapshot {
            employees: vec![a.clone(), b, c],
            skills: vec![golang],
            tracks: vec![],
            assignments,
        };
        let map = build_skill_map(&snapshot);
        let entry = &map.skills[0];
        assert_eq!(entry.coverage, 33.3);
        assert_eq!(entry.bus_factor, 1);
        assert_eq!(entry.risk_level, RiskLevel::High);
        assert_eq!(entry.key_holders.len(), 1);
        assert_eq!(entry.key_holders[0].employee_id, a.id);
        assert_eq!(entry.key_holders[0].skill_level, 4);
    }

    #[test]
    fn key_holders_capped_and_sorted_by_level_then_seniority() {
        let senior = employee("Sveta", LEVEL_SENIOR, None);
        let middle = employee("Mark", LEVEL_MIDDLE, None);
        let junior = employee("Jan", LEVEL_JUNIOR, None);
        let extra = employee("Olga", LEVEL_JUNIOR, None);
        let rust = skill("Rust");
        let assignments = vec![
            assign(&junior, &rust, 5),
            assign(&middle, &rust, 4),
            assign(&senior, &rust, 4),
            assign(&extra, &rust, 2),
        ];
        let snapshot = SkillSnapshot {
            employees: vec![senior.clone(), middle.clone(), junior.clone(), extra],
            skills: vec![rust],
            tracks: vec![],
            assignments,
        };
        let map = build_skill_map(&snapshot);
        let holders = &map.skills[0].key_holders;
        assert_eq!(holders.len(), 3);
        // highest skill level first, seniority breaks the level-4 tie
        assert_eq!(holders[0].employee_id, junior.id);
        assert_eq!(holders[1].employee_id, senior.id);
        assert_eq!(holders[2].employee_id, middle.id);
    }

    #[test]
    fn team_profiles_group_by_track_with_common_pool() {
        let track = Track {
            id: Uuid::new_v4(),
            workspace_id: Uuid::nil(),
            name: "Backend".to_string(),
            manager_id: None,
            created_at: Utc::now(),
        };
        let in_team = employee("Anna", LEVEL_MIDDLE, Some(track.id));
        let floater = employee("Boris", LEVEL_JUNIOR, None);
        let go = skill("GoLang");
        let assignments = vec![assign(&in_team, &go, 3), assign(&floater, &go, 2)];
        let snapshot = SkillSnapshot {
            employees: vec![in_team, floater],
            skills: vec![go],
            tracks: vec![track],
            assignments,
        };
        let map = build_skill_map(&snapshot);
        assert_eq!(map.teams.len(), 2);
        assert_eq!(map.teams[0].team, "Backend");
        assert_eq!(map.teams[0].headcount, 1);
        assert_eq!(map.teams[1].team, UNASSIGNED_POOL);
        assert_eq!(map.teams[1].headcount, 1);
    }

    #[test]
    fn low_severity_high_coverage_risks_are_suppressed() {
        let track = Track {
            id: Uuid::new_v4(),
            workspace_id: Uuid::nil(),
            name: "Platform".to_string(),
            manager_id: None,
            created_at: Utc::now(),
        };
        // three holders -> low severity globally; full team coverage -> suppressed
        let a = employee("Anna", LEVEL_MIDDLE, Some(track.id));
        let b = employee("Boris", LEVEL_MIDDLE, Some(track.id));
        let c = employee("Clara", LEVEL_MIDDLE, Some(track.id));
        let sql = skill("SQL");
        let assignments = vec![assign(&a, &sql, 3), assign(&b, &sql, 3), assign(&c, &sql, 3)];
        let snapshot = SkillSnapshot {
            employees: vec![a, b, c],
            skills: vec![sql],
            tracks: vec![track],
            assignments,
        };
        let map = build_skill_map(&snapshot);
        assert!(map.teams[0].risks.is_empty());
        assert_eq!(map.teams[0].dominant_skills.len(), 1);
        assert_eq!(map.teams[0].dominant_skills[0].coverage, 100.0);
    }
}
