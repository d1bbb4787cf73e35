use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::shared::error::ServiceError;
use crate::shared::models::schema::workspaces;
use crate::shared::models::Workspace;
use crate::shared::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateWorkspaceRequest {
    pub name: String,
    pub slug: String,
    pub owner_id: Uuid,
}

pub async fn create_workspace(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateWorkspaceRequest>,
) -> Result<Json<Workspace>, ServiceError> {
    let mut conn = state.conn.get()?;
    let workspace = Workspace {
        id: Uuid::new_v4(),
        name: req.name,
        slug: req.slug,
        owner_id: req.owner_id,
        created_at: Utc::now(),
    };
    diesel::insert_into(workspaces::table)
        .values(&workspace)
        .execute(&mut conn)?;
    Ok(Json(workspace))
}

pub async fn list_workspaces(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Workspace>>, ServiceError> {
    let mut conn = state.conn.get()?;
    let rows: Vec<Workspace> = workspaces::table
        .order(workspaces::created_at.asc())
        .load(&mut conn)?;
    Ok(Json(rows))
}

pub async fn get_workspace(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Workspace>, ServiceError> {
    let mut conn = state.conn.get()?;
    let workspace: Workspace = workspaces::table
        .filter(workspaces::id.eq(id))
        .first(&mut conn)
        .optional()?
        .ok_or(ServiceError::NotFound("WORKSPACE_NOT_FOUND"))?;
    Ok(Json(workspace))
}

pub fn configure_workspaces_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/app/workspaces", get(list_workspaces).post(create_workspace))
        .route("/api/app/workspaces/:id", get(get_workspace))
}
