use diesel::prelude::*;
use diesel::PgConnection;
use uuid::Uuid;

use crate::shared::error::ServiceError;
use crate::shared::models::schema::{
    talent_employee_skills, talent_employees, talent_skills, talent_tracks,
};
use crate::skills::{EmployeeSkill, Skill};
use crate::talent::{Employee, Track};

/// The in-memory base dataset all analytics derive from: every active
/// employee, skill, track and skill assignment of one workspace. Rebuilt on
/// every call; workspaces are team-sized, so no caching.
#[derive(Debug, Clone)]
pub struct SkillSnapshot {
    pub employees: Vec<Employee>,
    pub skills: Vec<Skill>,
    pub tracks: Vec<Track>,
    pub assignments: Vec<EmployeeSkill>,
}

impl SkillSnapshot {
    pub fn total_employees(&self) -> usize {
        self.employees.len()
    }
}

pub fn load_snapshot(
    conn: &mut PgConnection,
    workspace_id: Uuid,
) -> Result<SkillSnapshot, ServiceError> {
    let employees: Vec<Employee> = talent_employees::table
        .filter(talent_employees::workspace_id.eq(workspace_id))
        .filter(talent_employees::is_active.eq(true))
        .order(talent_employees::name.asc())
        .load(conn)?;

    let skills: Vec<Skill> = talent_skills::table
        .filter(talent_skills::workspace_id.eq(workspace_id))
        .order(talent_skills::name.asc())
        .load(conn)?;

    let tracks: Vec<Track> = talent_tracks::table
        .filter(talent_tracks::workspace_id.eq(workspace_id))
        .order(talent_tracks::name.asc())
        .load(conn)?;

    let employee_ids: Vec<Uuid> = employees.iter().map(|e| e.id).collect();
    let assignments: Vec<EmployeeSkill> = if employee_ids.is_empty() {
        vec![]
    } else {
        talent_employee_skills::table
            .filter(talent_employee_skills::employee_id.eq_any(&employee_ids))
            .load(conn)?
    };

    Ok(SkillSnapshot {
        employees,
        skills,
        tracks,
        assignments,
    })
}
