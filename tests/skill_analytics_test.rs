use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use quadrant::analytics::skill_gap::{compute_gaps, must_have_gap_score, top_role_gaps, RoleGapSkill};
use quadrant::analytics::skill_map::{build_skill_map, RiskLevel, UNASSIGNED_POOL};
use quadrant::analytics::snapshot::SkillSnapshot;
use quadrant::skills::{EmployeeSkill, RoleRequirement, Skill};
use quadrant::talent::{Employee, LEVEL_JUNIOR, LEVEL_MIDDLE, LEVEL_SENIOR};

fn employee(name: &str, level: &str) -> Employee {
    let now = Utc::now();
    Employee {
        id: Uuid::new_v4(),
        workspace_id: Uuid::nil(),
        name: name.to_string(),
        position: None,
        level: level.to_string(),
        track_id: None,
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

fn requirement(skill_id: Uuid, required: i32, must_have: bool) -> (RoleRequirement, String) {
    (
        RoleRequirement {
            id: Uuid::new_v4(),
            role_profile_id: Uuid::nil(),
            skill_id,
            required_level: required,
            importance: 1,
            must_have,
        },
        String::new(),
    )
}

#[test]
fn every_unheld_skill_reads_as_high_risk() {
    let employees = vec![employee("Anna", LEVEL_SENIOR), employee("Boris", LEVEL_JUNIOR)];
    let skills = vec![skill("Kotlin"), skill("Kafka"), skill("Figma")];
    let snapshot = SkillSnapshot {
        employees,
        skills,
        tracks: vec![],
        assignments: vec![],
    };
    let map = build_skill_map(&snapshot);
    for entry in &map.skills {
        assert_eq!(entry.people_count, 0);
        assert_eq!(entry.average_level, 0.0);
        assert_eq!(entry.risk_level, RiskLevel::High);
        assert_eq!(entry.risk_score, 100);
    }
}

#[test]
fn risk_level_boundaries_match_bus_factor() {
    let holders = [
        (1usize, RiskLevel::High),
        (2, RiskLevel::Medium),
        (3, RiskLevel::Low),
        (5, RiskLevel::Low),
    ];
    for (count, expected) in holders {
        let employees: Vec<Employee> =
            (0..count).map(|i| employee(&format!("e{i}"), LEVEL_MIDDLE)).collect();
        let s = skill("Rust");
        let assignments: Vec<EmployeeSkill> =
            employees.iter().map(|e| assign(e, &s, 3)).collect();
        let snapshot = SkillSnapshot {
            employees,
            skills: vec![s],
            tracks: vec![],
            assignments,
        };
        let map = build_skill_map(&snapshot);
        assert_eq!(map.skills[0].risk_level, expected, "bus factor {count}");
        assert_eq!(map.skills[0].bus_factor, count);
    }
}

#[test]
fn golang_example_three_employees_one_holder() {
    let a = employee("Anna", LEVEL_MIDDLE);
    let b = employee("Boris", LEVEL_JUNIOR);
    let c = employee("Clara", LEVEL_SENIOR);
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
    assert_eq!(entry.average_level, 4.0);
    assert_eq!(entry.key_holders.len(), 1);
    assert_eq!(entry.key_holders[0].employee_id, a.id);

    // all three land in the unassigned pool
    assert_eq!(map.teams.len(), 1);
    assert_eq!(map.teams[0].team, UNASSIGNED_POOL);
    assert_eq!(map.teams[0].headcount, 3);
}

#[test]
fn gap_is_null_without_rating_and_signed_otherwise() {
    let rated = Uuid::new_v4();
    let unrated = Uuid::new_v4();
    let requirements = vec![requirement(rated, 3, false), requirement(unrated, 2, false)];
    let mut ratings = HashMap::new();
    ratings.insert(rated, 2);
    let gaps = compute_gaps(&requirements, &ratings);
    assert_eq!(gaps[0].gap, Some(-1));
    assert_eq!(gaps[1].gap, None);
}

#[test]
fn must_have_score_feeds_candidate_threshold() {
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    let requirements = vec![requirement(a, 4, true), requirement(b, 3, true)];
    let mut ratings = HashMap::new();
    ratings.insert(a, 3);
    ratings.insert(b, 3);
    let gaps = compute_gaps(&requirements, &ratings);
    assert_eq!(must_have_gap_score(&gaps), 1);
}

#[test]
fn role_gap_ordering_prefers_important_then_deepest() {
    let mk = |importance, avg_gap| RoleGapSkill {
        skill_id: Uuid::new_v4(),
        skill_name: String::new(),
        required_level: 3,
        importance,
        avg_gap,
        affected_employees: 1,
    };
    let top = top_role_gaps(vec![mk(1, -3.0), mk(2, -0.5), mk(2, -2.0)], 2);
    assert_eq!(top.len(), 2);
    assert_eq!(top[0].importance, 2);
    assert_eq!(top[0].avg_gap, -2.0);
    assert_eq!(top[1].avg_gap, -0.5);
}
