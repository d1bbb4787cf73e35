use axum::{
    extract::{Path, Query, State},
    routing::{get, put},
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::shared::error::ServiceError;
use crate::shared::models::schema::quests;
use crate::shared::state::AppState;
use crate::shared::utils::parse_date;
use crate::talent::WorkspaceQuery;

pub const QUEST_STATUSES: [&str; 4] = ["draft", "active", "completed", "archived"];

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Insertable)]
#[diesel(table_name = quests)]
pub struct Quest {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub due_on: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateQuestRequest {
    pub title: String,
    pub description: Option<String>,
    pub due_on: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetQuestStatusRequest {
    pub status: String,
}

pub async fn create_quest(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WorkspaceQuery>,
    Json(req): Json<CreateQuestRequest>,
) -> Result<Json<Quest>, ServiceError> {
    let mut conn = state.conn.get()?;
    let now = Utc::now();
    let quest = Quest {
        id: Uuid::new_v4(),
        workspace_id: query.workspace_id,
        title: req.title,
        description: req.description,
        status: "draft".to_string(),
        due_on: req.due_on.as_deref().and_then(parse_date),
        created_at: now,
        updated_at: now,
    };
    diesel::insert_into(quests::table)
        .values(&quest)
        .execute(&mut conn)?;
    Ok(Json(quest))
}

pub async fn list_quests(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WorkspaceQuery>,
) -> Result<Json<Vec<Quest>>, ServiceError> {
    let mut conn = state.conn.get()?;
    let rows: Vec<Quest> = quests::table
        .filter(quests::workspace_id.eq(query.workspace_id))
        .order(quests::created_at.desc())
        .load(&mut conn)?;
    Ok(Json(rows))
}

pub async fn set_quest_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<SetQuestStatusRequest>,
) -> Result<Json<Quest>, ServiceError> {
    let mut conn = state.conn.get()?;
    if !QUEST_STATUSES.contains(&req.status.as_str()) {
        return Err(ServiceError::Validation(format!(
            "unknown quest status: {}",
            req.status
        )));
    }
    diesel::update(quests::table.filter(quests::id.eq(id)))
        .set((quests::status.eq(&req.status), quests::updated_at.eq(Utc::now())))
        .execute(&mut conn)?;
    let quest: Quest = quests::table
        .filter(quests::id.eq(id))
        .first(&mut conn)
        .optional()?
        .ok_or(ServiceError::NotFound("QUEST_NOT_FOUND"))?;
    Ok(Json(quest))
}

pub fn configure_quests_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/app/quests", get(list_quests).post(create_quest))
        .route("/api/app/quests/:id/status", put(set_quest_status))
}
