use axum::{
    extract::{Path, Query, State},
    routing::{get, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::PgConnection;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::shared::error::ServiceError;
use crate::shared::models::schema::notifications;
use crate::shared::state::AppState;

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Insertable)]
#[diesel(table_name = notifications)]
pub struct Notification {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub recipient_id: Uuid,
    pub kind: String,
    pub title: String,
    pub body: Option<String>,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Insert a notification row. Callers treat this channel as best-effort:
/// they log and continue on failure rather than surfacing it.
pub fn notify(
    conn: &mut PgConnection,
    workspace_id: Uuid,
    recipient_id: Uuid,
    kind: &str,
    title: &str,
    body: Option<&str>,
) -> Result<Notification, ServiceError> {
    let notification = Notification {
        id: Uuid::new_v4(),
        workspace_id,
        recipient_id,
        kind: kind.to_string(),
        title: title.to_string(),
        body: body.map(|b| b.to_string()),
        read_at: None,
        created_at: Utc::now(),
    };
    diesel::insert_into(notifications::table)
        .values(&notification)
        .execute(conn)?;
    Ok(notification)
}

#[derive(Debug, Deserialize)]
pub struct NotificationListQuery {
    pub workspace_id: Uuid,
    pub recipient_id: Uuid,
    pub unread_only: Option<bool>,
    pub limit: Option<i64>,
}

pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NotificationListQuery>,
) -> Result<Json<Vec<Notification>>, ServiceError> {
    let mut conn = state.conn.get()?;
    let mut q = notifications::table
        .filter(notifications::workspace_id.eq(query.workspace_id))
        .filter(notifications::recipient_id.eq(query.recipient_id))
        .into_boxed();
    if query.unread_only.unwrap_or(false) {
        q = q.filter(notifications::read_at.is_null());
    }
    let rows: Vec<Notification> = q
        .order(notifications::created_at.desc())
        .limit(query.limit.unwrap_or(50))
        .load(&mut conn)?;
    Ok(Json(rows))
}

pub async fn mark_notification_read(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Notification>, ServiceError> {
    let mut conn = state.conn.get()?;
    diesel::update(notifications::table.filter(notifications::id.eq(id)))
        .set(notifications::read_at.eq(Some(Utc::now())))
        .execute(&mut conn)?;
    let row: Notification = notifications::table
        .filter(notifications::id.eq(id))
        .first(&mut conn)
        .optional()?
        .ok_or(ServiceError::NotFound("NOTIFICATION_NOT_FOUND"))?;
    Ok(Json(row))
}

pub fn configure_notifications_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/app/notifications", get(list_notifications))
        .route("/api/app/notifications/:id/read", put(mark_notification_read))
}
