use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::shared::error::ServiceError;
use crate::shared::models::schema::{
    talent_employee_skills, talent_employees, talent_role_assignments, talent_role_profiles,
    talent_role_requirements, talent_skill_ratings, talent_skills,
};
use crate::shared::state::AppState;
use crate::talent::WorkspaceQuery;

pub const RATING_SELF: &str = "self";
pub const RATING_MANAGER: &str = "manager";
pub const RATING_SYSTEM: &str = "system";

pub const SKILL_KINDS: [&str; 4] = ["hard", "soft", "product", "data"];

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Insertable)]
#[diesel(table_name = talent_skills)]
pub struct Skill {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub name: String,
    pub kind: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Insertable)]
#[diesel(table_name = talent_employee_skills)]
pub struct EmployeeSkill {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub skill_id: Uuid,
    pub level: i32,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Insertable)]
#[diesel(table_name = talent_skill_ratings)]
pub struct SkillRating {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub employee_id: Uuid,
    pub skill_id: Uuid,
    pub source: String,
    pub level: i32,
    pub rated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Insertable)]
#[diesel(table_name = talent_role_profiles)]
pub struct RoleProfile {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub name: String,
    pub track_id: Option<Uuid>,
    pub is_leadership: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Insertable)]
#[diesel(table_name = talent_role_requirements)]
pub struct RoleRequirement {
    pub id: Uuid,
    pub role_profile_id: Uuid,
    pub skill_id: Uuid,
    pub required_level: i32,
    pub importance: i32,
    pub must_have: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Insertable)]
#[diesel(table_name = talent_role_assignments)]
pub struct RoleAssignment {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub employee_id: Uuid,
    pub role_profile_id: Uuid,
    pub is_primary: bool,
    pub assigned_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateSkillRequest {
    pub name: String,
    pub kind: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetEmployeeSkillRequest {
    pub skill_id: Uuid,
    pub level: i32,
}

#[derive(Debug, Deserialize)]
pub struct AddRatingRequest {
    pub skill_id: Uuid,
    pub source: String,
    pub level: i32,
}

#[derive(Debug, Deserialize)]
pub struct CreateRoleProfileRequest {
    pub name: String,
    pub track_id: Option<Uuid>,
    pub is_leadership: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct AddRequirementRequest {
    pub skill_id: Uuid,
    pub required_level: i32,
    pub importance: Option<i32>,
    pub must_have: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct AssignRoleRequest {
    pub role_profile_id: Uuid,
    pub is_primary: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct RoleProfileDetail {
    pub profile: RoleProfile,
    pub requirements: Vec<RoleRequirement>,
}

fn validate_level(level: i32) -> Result<(), ServiceError> {
    if !(1..=5).contains(&level) {
        return Err(ServiceError::Validation(format!(
            "skill level must be between 1 and 5, got {level}"
        )));
    }
    Ok(())
}

pub async fn create_skill(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WorkspaceQuery>,
    Json(req): Json<CreateSkillRequest>,
) -> Result<Json<Skill>, ServiceError> {
    let mut conn = state.conn.get()?;
    let kind = req.kind.unwrap_or_else(|| "hard".to_string());
    if !SKILL_KINDS.contains(&kind.as_str()) {
        return Err(ServiceError::Validation(format!("unknown skill kind: {kind}")));
    }
    let skill = Skill {
        id: Uuid::new_v4(),
        workspace_id: query.workspace_id,
        name: req.name,
        kind,
        created_at: Utc::now(),
    };
    diesel::insert_into(talent_skills::table)
        .values(&skill)
        .execute(&mut conn)?;
    Ok(Json(skill))
}

pub async fn list_skills(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WorkspaceQuery>,
) -> Result<Json<Vec<Skill>>, ServiceError> {
    let mut conn = state.conn.get()?;
    let skills: Vec<Skill> = talent_skills::table
        .filter(talent_skills::workspace_id.eq(query.workspace_id))
        .order(talent_skills::name.asc())
        .load(&mut conn)?;
    Ok(Json(skills))
}

pub async fn delete_skill(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<axum::http::StatusCode, ServiceError> {
    let mut conn = state.conn.get()?;
    diesel::delete(
        talent_employee_skills::table.filter(talent_employee_skills::skill_id.eq(id)),
    )
    .execute(&mut conn)?;
    diesel::delete(talent_skills::table.filter(talent_skills::id.eq(id)))
        .execute(&mut conn)?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}

/// Set or update an employee's current level for a skill. One row per
/// (employee, skill); a second call replaces the level.
pub async fn set_employee_skill(
    State(state): State<Arc<AppState>>,
    Path(employee_id): Path<Uuid>,
    Json(req): Json<SetEmployeeSkillRequest>,
) -> Result<Json<EmployeeSkill>, ServiceError> {
    let mut conn = state.conn.get()?;
    validate_level(req.level)?;

    let existing: Option<EmployeeSkill> = talent_employee_skills::table
        .filter(talent_employee_skills::employee_id.eq(employee_id))
        .filter(talent_employee_skills::skill_id.eq(req.skill_id))
        .first(&mut conn)
        .optional()?;

    let now = Utc::now();
    let row = match existing {
        Some(mut row) => {
            diesel::update(
                talent_employee_skills::table.filter(talent_employee_skills::id.eq(row.id)),
            )
            .set((
                talent_employee_skills::level.eq(req.level),
                talent_employee_skills::updated_at.eq(now),
            ))
            .execute(&mut conn)?;
            row.level = req.level;
            row.updated_at = now;
            row
        }
        None => {
            let row = EmployeeSkill {
                id: Uuid::new_v4(),
                employee_id,
                skill_id: req.skill_id,
                level: req.level,
                updated_at: now,
            };
            diesel::insert_into(talent_employee_skills::table)
                .values(&row)
                .execute(&mut conn)?;
            row
        }
    };
    Ok(Json(row))
}

pub async fn remove_employee_skill(
    State(state): State<Arc<AppState>>,
    Path((employee_id, skill_id)): Path<(Uuid, Uuid)>,
) -> Result<axum::http::StatusCode, ServiceError> {
    let mut conn = state.conn.get()?;
    diesel::delete(
        talent_employee_skills::table
            .filter(talent_employee_skills::employee_id.eq(employee_id))
            .filter(talent_employee_skills::skill_id.eq(skill_id)),
    )
    .execute(&mut conn)?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}

/// Append a rating observation. Ratings are history; the gap engine reads
/// the latest one per (employee, skill) by `rated_at`.
pub async fn add_skill_rating(
    State(state): State<Arc<AppState>>,
    Path(employee_id): Path<Uuid>,
    Json(req): Json<AddRatingRequest>,
) -> Result<Json<SkillRating>, ServiceError> {
    let mut conn = state.conn.get()?;
    validate_level(req.level)?;
    if !matches!(req.source.as_str(), RATING_SELF | RATING_MANAGER | RATING_SYSTEM) {
        return Err(ServiceError::Validation(format!(
            "unknown rating source: {}",
            req.source
        )));
    }

    let workspace_id: Uuid = talent_employees::table
        .filter(talent_employees::id.eq(employee_id))
        .select(talent_employees::workspace_id)
        .first(&mut conn)
        .optional()?
        .ok_or(ServiceError::NotFound("EMPLOYEE_NOT_FOUND"))?;

    let rating = SkillRating {
        id: Uuid::new_v4(),
        workspace_id,
        employee_id,
        skill_id: req.skill_id,
        source: req.source,
        level: req.level,
        rated_at: Utc::now(),
    };
    diesel::insert_into(talent_skill_ratings::table)
        .values(&rating)
        .execute(&mut conn)?;
    Ok(Json(rating))
}

pub async fn create_role_profile(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WorkspaceQuery>,
    Json(req): Json<CreateRoleProfileRequest>,
) -> Result<Json<RoleProfile>, ServiceError> {
    let mut conn = state.conn.get()?;
    let profile = RoleProfile {
        id: Uuid::new_v4(),
        workspace_id: query.workspace_id,
        name: req.name,
        track_id: req.track_id,
        is_leadership: req.is_leadership.unwrap_or(false),
        created_at: Utc::now(),
    };
    diesel::insert_into(talent_role_profiles::table)
        .values(&profile)
        .execute(&mut conn)?;
    Ok(Json(profile))
}

pub async fn list_role_profiles(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WorkspaceQuery>,
) -> Result<Json<Vec<RoleProfile>>, ServiceError> {
    let mut conn = state.conn.get()?;
    let profiles: Vec<RoleProfile> = talent_role_profiles::table
        .filter(talent_role_profiles::workspace_id.eq(query.workspace_id))
        .order(talent_role_profiles::name.asc())
        .load(&mut conn)?;
    Ok(Json(profiles))
}

pub async fn get_role_profile(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<RoleProfileDetail>, ServiceError> {
    let mut conn = state.conn.get()?;
    let profile: RoleProfile = talent_role_profiles::table
        .filter(talent_role_profiles::id.eq(id))
        .first(&mut conn)
        .optional()?
        .ok_or(ServiceError::NotFound("ROLE_NOT_FOUND"))?;
    let requirements: Vec<RoleRequirement> = talent_role_requirements::table
        .filter(talent_role_requirements::role_profile_id.eq(id))
        .order(talent_role_requirements::importance.desc())
        .load(&mut conn)?;
    Ok(Json(RoleProfileDetail { profile, requirements }))
}

pub async fn add_role_requirement(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<AddRequirementRequest>,
) -> Result<Json<RoleRequirement>, ServiceError> {
    let mut conn = state.conn.get()?;
    validate_level(req.required_level)?;

    let requirement = RoleRequirement {
        id: Uuid::new_v4(),
        role_profile_id: id,
        skill_id: req.skill_id,
        required_level: req.required_level,
        importance: req.importance.unwrap_or(1),
        must_have: req.must_have.unwrap_or(false),
    };
    diesel::insert_into(talent_role_requirements::table)
        .values(&requirement)
        .execute(&mut conn)?;
    Ok(Json(requirement))
}

pub async fn remove_role_requirement(
    State(state): State<Arc<AppState>>,
    Path((_role_id, requirement_id)): Path<(Uuid, Uuid)>,
) -> Result<axum::http::StatusCode, ServiceError> {
    let mut conn = state.conn.get()?;
    diesel::delete(
        talent_role_requirements::table.filter(talent_role_requirements::id.eq(requirement_id)),
    )
    .execute(&mut conn)?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}

/// Assign a role to an employee. Marking the new assignment primary demotes
/// any previous primary role.
pub async fn assign_role(
    State(state): State<Arc<AppState>>,
    Path(employee_id): Path<Uuid>,
    Json(req): Json<AssignRoleRequest>,
) -> Result<Json<RoleAssignment>, ServiceError> {
    let mut conn = state.conn.get()?;

    let workspace_id: Uuid = talent_employees::table
        .filter(talent_employees::id.eq(employee_id))
        .select(talent_employees::workspace_id)
        .first(&mut conn)
        .optional()?
        .ok_or(ServiceError::NotFound("EMPLOYEE_NOT_FOUND"))?;

    let role_exists: i64 = talent_role_profiles::table
        .filter(talent_role_profiles::id.eq(req.role_profile_id))
        .count()
        .get_result(&mut conn)?;
    if role_exists == 0 {
        return Err(ServiceError::NotFound("ROLE_NOT_FOUND"));
    }

    let is_primary = req.is_primary.unwrap_or(false);
    if is_primary {
        diesel::update(
            talent_role_assignments::table
                .filter(talent_role_assignments::employee_id.eq(employee_id))
                .filter(talent_role_assignments::is_primary.eq(true)),
        )
        .set(talent_role_assignments::is_primary.eq(false))
        .execute(&mut conn)?;
    }

    let assignment = RoleAssignment {
        id: Uuid::new_v4(),
        workspace_id,
        employee_id,
        role_profile_id: req.role_profile_id,
        is_primary,
        assigned_at: Utc::now(),
    };
    diesel::insert_into(talent_role_assignments::table)
        .values(&assignment)
        .execute(&mut conn)?;
    Ok(Json(assignment))
}

pub async fn list_role_assignments(
    State(state): State<Arc<AppState>>,
    Path(employee_id): Path<Uuid>,
) -> Result<Json<Vec<RoleAssignment>>, ServiceError> {
    let mut conn = state.conn.get()?;
    let assignments: Vec<RoleAssignment> = talent_role_assignments::table
        .filter(talent_role_assignments::employee_id.eq(employee_id))
        .order(talent_role_assignments::assigned_at.desc())
        .load(&mut conn)?;
    Ok(Json(assignments))
}

pub fn configure_skills_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/app/skills", get(list_skills).post(create_skill))
        .route("/api/app/skills/:id", delete(delete_skill))
        .route("/api/app/employees/:id/skills", post(set_employee_skill))
        .route(
            "/api/app/employees/:id/skills/:skill_id",
            delete(remove_employee_skill),
        )
        .route("/api/app/employees/:id/ratings", post(add_skill_rating))
        .route(
            "/api/app/employees/:id/roles",
            get(list_role_assignments).post(assign_role),
        )
        .route("/api/app/roles", get(list_role_profiles).post(create_role_profile))
        .route("/api/app/roles/:id", get(get_role_profile))
        .route("/api/app/roles/:id/requirements", post(add_role_requirement))
        .route(
            "/api/app/roles/:id/requirements/:requirement_id",
            delete(remove_role_requirement),
        )
}
