use axum::{
    extract::{Path, Query, State},
    routing::{get, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::shared::error::ServiceError;
use crate::shared::models::schema::{
    talent_employees, talent_track_levels, talent_tracks,
};
use crate::shared::state::AppState;

pub const LEVEL_JUNIOR: &str = "junior";
pub const LEVEL_MIDDLE: &str = "middle";
pub const LEVEL_SENIOR: &str = "senior";

/// Seniority weight used when ordering key holders and candidates.
pub fn employee_level_rank(level: &str) -> i32 {
    match level {
        LEVEL_SENIOR => 3,
        LEVEL_MIDDLE => 2,
        LEVEL_JUNIOR => 1,
        _ => 0,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Insertable)]
#[diesel(table_name = talent_employees)]
pub struct Employee {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub name: String,
    pub position: Option<String>,
    pub level: String,
    pub track_id: Option<Uuid>,
    pub track_level: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Insertable)]
#[diesel(table_name = talent_tracks)]
pub struct Track {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub name: String,
    pub manager_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Insertable)]
#[diesel(table_name = talent_track_levels)]
pub struct TrackLevel {
    pub id: Uuid,
    pub track_id: Uuid,
    pub name: String,
    pub rank: i32,
}

#[derive(Debug, Deserialize)]
pub struct CreateEmployeeRequest {
    pub name: String,
    pub position: Option<String>,
    pub level: Option<String>,
    pub track_id: Option<Uuid>,
    pub track_level: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateEmployeeRequest {
    pub name: Option<String>,
    pub position: Option<String>,
    pub level: Option<String>,
    pub track_id: Option<Uuid>,
    pub track_level: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTrackRequest {
    pub name: String,
    pub manager_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct AddTrackLevelRequest {
    pub name: String,
    pub rank: i32,
}

#[derive(Debug, Deserialize)]
pub struct EmployeeListQuery {
    pub workspace_id: Uuid,
    pub search: Option<String>,
    pub track_id: Option<Uuid>,
    pub is_active: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct WorkspaceQuery {
    pub workspace_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct TalentStats {
    pub total_employees: i64,
    pub active_employees: i64,
    pub total_tracks: i64,
    pub unassigned_employees: i64,
}

fn valid_level(level: &str) -> bool {
    matches!(level, LEVEL_JUNIOR | LEVEL_MIDDLE | LEVEL_SENIOR)
}

pub async fn create_employee(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WorkspaceQuery>,
    Json(req): Json<CreateEmployeeRequest>,
) -> Result<Json<Employee>, ServiceError> {
    let mut conn = state.conn.get()?;
    let level = req.level.unwrap_or_else(|| LEVEL_JUNIOR.to_string());
    if !valid_level(&level) {
        return Err(ServiceError::Validation(format!("unknown level: {level}")));
    }
    let now = Utc::now();
    let employee = Employee {
        id: Uuid::new_v4(),
        workspace_id: query.workspace_id,
        name: req.name,
        position: req.position,
        level,
        track_id: req.track_id,
        track_level: req.track_level,
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    diesel::insert_into(talent_employees::table)
        .values(&employee)
        .execute(&mut conn)?;
    Ok(Json(employee))
}

pub async fn list_employees(
    State(state): State<Arc<AppState>>,
    Query(query): Query<EmployeeListQuery>,
) -> Result<Json<Vec<Employee>>, ServiceError> {
    let mut conn = state.conn.get()?;
    let limit = query.limit.unwrap_or(100);
    let offset = query.offset.unwrap_or(0);

    let mut q = talent_employees::table
        .filter(talent_employees::workspace_id.eq(query.workspace_id))
        .into_boxed();

    if let Some(is_active) = query.is_active {
        q = q.filter(talent_employees::is_active.eq(is_active));
    }
    if let Some(track_id) = query.track_id {
        q = q.filter(talent_employees::track_id.eq(track_id));
    }
    if let Some(search) = query.search {
        let pattern = format!("%{search}%");
        q = q.filter(
            talent_employees::name
                .ilike(pattern.clone())
                .or(talent_employees::position.ilike(pattern)),
        );
    }

    let employees: Vec<Employee> = q
        .order(talent_employees::name.asc())
        .limit(limit)
        .offset(offset)
        .load(&mut conn)?;
    Ok(Json(employees))
}

pub async fn get_employee(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Employee>, ServiceError> {
    let mut conn = state.conn.get()?;
    let employee: Employee = talent_employees::table
        .filter(talent_employees::id.eq(id))
        .first(&mut conn)
        .optional()?
        .ok_or(ServiceError::NotFound("EMPLOYEE_NOT_FOUND"))?;
    Ok(Json(employee))
}

pub async fn update_employee(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateEmployeeRequest>,
) -> Result<Json<Employee>, ServiceError> {
    let mut conn = state.conn.get()?;

    if let Some(level) = &req.level {
        if !valid_level(level) {
            return Err(ServiceError::Validation(format!("unknown level: {level}")));
        }
    }

    diesel::update(talent_employees::table.filter(talent_employees::id.eq(id)))
        .set(talent_employees::updated_at.eq(Utc::now()))
        .execute(&mut conn)?;

    if let Some(name) = req.name {
        diesel::update(talent_employees::table.filter(talent_employees::id.eq(id)))
            .set(talent_employees::name.eq(name))
            .execute(&mut conn)?;
    }
    if let Some(position) = req.position {
        diesel::update(talent_employees::table.filter(talent_employees::id.eq(id)))
            .set(talent_employees::position.eq(position))
            .execute(&mut conn)?;
    }
    if let Some(level) = req.level {
        diesel::update(talent_employees::table.filter(talent_employees::id.eq(id)))
            .set(talent_employees::level.eq(level))
            .execute(&mut conn)?;
    }
    if let Some(track_id) = req.track_id {
        diesel::update(talent_employees::table.filter(talent_employees::id.eq(id)))
            .set(talent_employees::track_id.eq(Some(track_id)))
            .execute(&mut conn)?;
    }
    if let Some(track_level) = req.track_level {
        diesel::update(talent_employees::table.filter(talent_employees::id.eq(id)))
            .set(talent_employees::track_level.eq(track_level))
            .execute(&mut conn)?;
    }
    if let Some(is_active) = req.is_active {
        diesel::update(talent_employees::table.filter(talent_employees::id.eq(id)))
            .set(talent_employees::is_active.eq(is_active))
            .execute(&mut conn)?;
    }

    let employee: Employee = talent_employees::table
        .filter(talent_employees::id.eq(id))
        .first(&mut conn)
        .optional()?
        .ok_or(ServiceError::NotFound("EMPLOYEE_NOT_FOUND"))?;
    Ok(Json(employee))
}

pub async fn delete_employee(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<axum::http::StatusCode, ServiceError> {
    let mut conn = state.conn.get()?;
    diesel::delete(talent_employees::table.filter(talent_employees::id.eq(id)))
        .execute(&mut conn)?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}

pub async fn create_track(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WorkspaceQuery>,
    Json(req): Json<CreateTrackRequest>,
) -> Result<Json<Track>, ServiceError> {
    let mut conn = state.conn.get()?;
    let track = Track {
        id: Uuid::new_v4(),
        workspace_id: query.workspace_id,
        name: req.name,
        manager_id: req.manager_id,
        created_at: Utc::now(),
    };
    diesel::insert_into(talent_tracks::table)
        .values(&track)
        .execute(&mut conn)?;
    Ok(Json(track))
}

pub async fn list_tracks(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WorkspaceQuery>,
) -> Result<Json<Vec<Track>>, ServiceError> {
    let mut conn = state.conn.get()?;
    let tracks: Vec<Track> = talent_tracks::table
        .filter(talent_tracks::workspace_id.eq(query.workspace_id))
        .order(talent_tracks::name.asc())
        .load(&mut conn)?;
    Ok(Json(tracks))
}

pub async fn set_track_manager(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<serde_json::Value>,
) -> Result<Json<Track>, ServiceError> {
    let mut conn = state.conn.get()?;
    let manager_id = req["manager_id"]
        .as_str()
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(|| ServiceError::Validation("manager_id required".into()))?;

    let exists: i64 = talent_employees::table
        .filter(talent_employees::id.eq(manager_id))
        .count()
        .get_result(&mut conn)?;
    if exists == 0 {
        return Err(ServiceError::NotFound("EMPLOYEE_NOT_FOUND"));
    }

    diesel::update(talent_tracks::table.filter(talent_tracks::id.eq(id)))
        .set(talent_tracks::manager_id.eq(Some(manager_id)))
        .execute(&mut conn)?;

    let track: Track = talent_tracks::table
        .filter(talent_tracks::id.eq(id))
        .first(&mut conn)
        .optional()?
        .ok_or(ServiceError::NotFound("TRACK_NOT_FOUND"))?;
    Ok(Json(track))
}

pub async fn add_track_level(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<AddTrackLevelRequest>,
) -> Result<Json<TrackLevel>, ServiceError> {
    let mut conn = state.conn.get()?;
    let level = TrackLevel {
        id: Uuid::new_v4(),
        track_id: id,
        name: req.name,
        rank: req.rank,
    };
    diesel::insert_into(talent_track_levels::table)
        .values(&level)
        .execute(&mut conn)?;
    Ok(Json(level))
}

pub async fn list_track_levels(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<TrackLevel>>, ServiceError> {
    let mut conn = state.conn.get()?;
    let levels: Vec<TrackLevel> = talent_track_levels::table
        .filter(talent_track_levels::track_id.eq(id))
        .order(talent_track_levels::rank.asc())
        .load(&mut conn)?;
    Ok(Json(levels))
}

pub async fn get_talent_stats(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WorkspaceQuery>,
) -> Result<Json<TalentStats>, ServiceError> {
    let mut conn = state.conn.get()?;

    let total_employees: i64 = talent_employees::table
        .filter(talent_employees::workspace_id.eq(query.workspace_id))
        .count()
        .get_result(&mut conn)
        .unwrap_or(0);

    let active_employees: i64 = talent_employees::table
        .filter(talent_employees::workspace_id.eq(query.workspace_id))
        .filter(talent_employees::is_active.eq(true))
        .count()
        .get_result(&mut conn)
        .unwrap_or(0);

    let total_tracks: i64 = talent_tracks::table
        .filter(talent_tracks::workspace_id.eq(query.workspace_id))
        .count()
        .get_result(&mut conn)
        .unwrap_or(0);

    let unassigned_employees: i64 = talent_employees::table
        .filter(talent_employees::workspace_id.eq(query.workspace_id))
        .filter(talent_employees::track_id.is_null())
        .filter(talent_employees::is_active.eq(true))
        .count()
        .get_result(&mut conn)
        .unwrap_or(0);

    Ok(Json(TalentStats {
        total_employees,
        active_employees,
        total_tracks,
        unassigned_employees,
    }))
}

pub fn configure_talent_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/app/employees", get(list_employees).post(create_employee))
        .route("/api/app/employees/stats", get(get_talent_stats))
        .route(
            "/api/app/employees/:id",
            get(get_employee).put(update_employee).delete(delete_employee),
        )
        .route("/api/app/tracks", get(list_tracks).post(create_track))
        .route("/api/app/tracks/:id/manager", put(set_track_manager))
        .route(
            "/api/app/tracks/:id/levels",
            get(list_track_levels).post(add_track_level),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_rank_orders_seniority() {
        assert!(employee_level_rank(LEVEL_SENIOR) > employee_level_rank(LEVEL_MIDDLE));
        assert!(employee_level_rank(LEVEL_MIDDLE) > employee_level_rank(LEVEL_JUNIOR));
        assert_eq!(employee_level_rank("contractor"), 0);
    }
}
