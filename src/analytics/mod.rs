pub mod skill_gap;
pub mod skill_map;
pub mod snapshot;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::shared::error::ServiceError;
use crate::shared::state::AppState;
use crate::talent::WorkspaceQuery;

pub use skill_gap::{EmployeeGapReport, RoleGapReport};
pub use skill_map::SkillMap;
pub use snapshot::SkillSnapshot;

#[derive(Debug, Deserialize)]
pub struct RoleGapQuery {
    pub limit: Option<usize>,
}

pub async fn get_skill_map(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WorkspaceQuery>,
) -> Result<Json<SkillMap>, ServiceError> {
    let mut conn = state.conn.get()?;
    let snapshot = snapshot::load_snapshot(&mut conn, query.workspace_id)?;
    Ok(Json(skill_map::build_skill_map(&snapshot)))
}

pub async fn get_employee_gaps(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<EmployeeGapReport>, ServiceError> {
    let mut conn = state.conn.get()?;
    Ok(Json(skill_gap::employee_gap_report(&mut conn, id)?))
}

pub async fn get_role_gaps(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(query): Query<RoleGapQuery>,
) -> Result<Json<RoleGapReport>, ServiceError> {
    let mut conn = state.conn.get()?;
    let limit = query.limit.unwrap_or(skill_gap::DEFAULT_TOP_GAP_LIMIT);
    Ok(Json(skill_gap::role_gap_report(&mut conn, id, limit)?))
}

pub fn configure_analytics_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/app/analytics/skill-map", get(get_skill_map))
        .route("/api/app/analytics/gaps/employee/:id", get(get_employee_gaps))
        .route("/api/app/analytics/gaps/role/:id", get(get_role_gaps))
}
