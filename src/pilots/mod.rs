use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use log::warn;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::notifications::notify;
use crate::shared::error::ServiceError;
use crate::shared::models::schema::{
    pilot_run_notes, pilot_run_participants, pilot_run_steps, pilot_runs,
};
use crate::shared::state::AppState;
use crate::shared::utils::parse_date;
use crate::talent::WorkspaceQuery;

pub const PILOT_STATUSES: [&str; 5] = ["draft", "planned", "active", "completed", "cancelled"];
pub const STEP_STATUSES: [&str; 3] = ["not_started", "in_progress", "done"];

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Insertable)]
#[diesel(table_name = pilot_runs)]
pub struct PilotRun {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub name: String,
    pub objective: Option<String>,
    pub status: String,
    pub starts_on: Option<NaiveDate>,
    pub ends_on: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Insertable)]
#[diesel(table_name = pilot_run_steps)]
pub struct PilotRunStep {
    pub id: Uuid,
    pub pilot_run_id: Uuid,
    pub title: String,
    pub position: i32,
    pub status: String,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Insertable)]
#[diesel(table_name = pilot_run_participants)]
pub struct PilotRunParticipant {
    pub id: Uuid,
    pub pilot_run_id: Uuid,
    pub employee_id: Uuid,
    pub role: Option<String>,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Insertable)]
#[diesel(table_name = pilot_run_notes)]
pub struct PilotRunNote {
    pub id: Uuid,
    pub pilot_run_id: Uuid,
    pub author_id: Option<Uuid>,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePilotRequest {
    pub name: String,
    pub objective: Option<String>,
    pub starts_on: Option<String>,
    pub ends_on: Option<String>,
    pub steps: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct AddStepRequest {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct AddParticipantRequest {
    pub employee_id: Uuid,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddNoteRequest {
    pub author_id: Option<Uuid>,
    pub body: String,
}

#[derive(Debug, Serialize)]
pub struct PilotRunDetail {
    pub pilot: PilotRun,
    pub steps: Vec<PilotRunStep>,
    pub participants: Vec<PilotRunParticipant>,
    pub notes: Vec<PilotRunNote>,
}

fn load_pilot(conn: &mut diesel::PgConnection, id: Uuid) -> Result<PilotRun, ServiceError> {
    pilot_runs::table
        .filter(pilot_runs::id.eq(id))
        .first(conn)
        .optional()?
        .ok_or(ServiceError::NotFound("PILOT_NOT_FOUND"))
}

pub async fn create_pilot(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WorkspaceQuery>,
    Json(req): Json<CreatePilotRequest>,
) -> Result<Json<PilotRunDetail>, ServiceError> {
    let mut conn = state.conn.get()?;
    let now = Utc::now();
    let pilot = PilotRun {
        id: Uuid::new_v4(),
        workspace_id: query.workspace_id,
        name: req.name,
        objective: req.objective,
        status: "draft".to_string(),
        starts_on: req.starts_on.as_deref().and_then(parse_date),
        ends_on: req.ends_on.as_deref().and_then(parse_date),
        created_at: now,
        updated_at: now,
    };
    diesel::insert_into(pilot_runs::table)
        .values(&pilot)
        .execute(&mut conn)?;

    let steps: Vec<PilotRunStep> = req
        .steps
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(index, title)| PilotRunStep {
            id: Uuid::new_v4(),
            pilot_run_id: pilot.id,
            title,
            position: index as i32,
            status: "not_started".to_string(),
            completed_at: None,
        })
        .collect();
    if !steps.is_empty() {
        diesel::insert_into(pilot_run_steps::table)
            .values(&steps)
            .execute(&mut conn)?;
    }

    Ok(Json(PilotRunDetail {
        pilot,
        steps,
        participants: vec![],
        notes: vec![],
    }))
}

pub async fn list_pilots(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WorkspaceQuery>,
) -> Result<Json<Vec<PilotRun>>, ServiceError> {
    let mut conn = state.conn.get()?;
    let pilots: Vec<PilotRun> = pilot_runs::table
        .filter(pilot_runs::workspace_id.eq(query.workspace_id))
        .order(pilot_runs::created_at.desc())
        .load(&mut conn)?;
    Ok(Json(pilots))
}

pub async fn get_pilot(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<PilotRunDetail>, ServiceError> {
    let mut conn = state.conn.get()?;
    let pilot = load_pilot(&mut conn, id)?;
    let steps: Vec<PilotRunStep> = pilot_run_steps::table
        .filter(pilot_run_steps::pilot_run_id.eq(id))
        .order(pilot_run_steps::position.asc())
        .load(&mut conn)?;
    let participants: Vec<PilotRunParticipant> = pilot_run_participants::table
        .filter(pilot_run_participants::pilot_run_id.eq(id))
        .order(pilot_run_participants::joined_at.asc())
        .load(&mut conn)?;
    let notes: Vec<PilotRunNote> = pilot_run_notes::table
        .filter(pilot_run_notes::pilot_run_id.eq(id))
        .order(pilot_run_notes::created_at.desc())
        .load(&mut conn)?;
    Ok(Json(PilotRunDetail {
        pilot,
        steps,
        participants,
        notes,
    }))
}

/// Status is set explicitly by the caller; the service records it without a
/// transition guard. Activation and completion ping participants.
pub async fn set_pilot_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<SetStatusRequest>,
) -> Result<Json<PilotRun>, ServiceError> {
    let mut conn = state.conn.get()?;
    if !PILOT_STATUSES.contains(&req.status.as_str()) {
        return Err(ServiceError::Validation(format!(
            "unknown pilot status: {}",
            req.status
        )));
    }
    load_pilot(&mut conn, id)?;
    diesel::update(pilot_runs::table.filter(pilot_runs::id.eq(id)))
        .set((
            pilot_runs::status.eq(&req.status),
            pilot_runs::updated_at.eq(Utc::now()),
        ))
        .execute(&mut conn)?;
    let pilot = load_pilot(&mut conn, id)?;

    if matches!(req.status.as_str(), "active" | "completed") {
        let participant_ids: Vec<Uuid> = pilot_run_participants::table
            .filter(pilot_run_participants::pilot_run_id.eq(id))
            .select(pilot_run_participants::employee_id)
            .load(&mut conn)?;
        let title = if req.status == "active" {
            format!("Pilot started: {}", pilot.name)
        } else {
            format!("Pilot completed: {}", pilot.name)
        };
        for employee_id in participant_ids {
            if let Err(err) = notify(
                &mut conn,
                pilot.workspace_id,
                employee_id,
                "pilot_status",
                &title,
                pilot.objective.as_deref(),
            ) {
                warn!("failed to notify pilot participant {employee_id}: {err}");
            }
        }
    }

    Ok(Json(pilot))
}

pub async fn add_step(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<AddStepRequest>,
) -> Result<Json<PilotRunStep>, ServiceError> {
    let mut conn = state.conn.get()?;
    load_pilot(&mut conn, id)?;
    let next_position: i32 = pilot_run_steps::table
        .filter(pilot_run_steps::pilot_run_id.eq(id))
        .count()
        .get_result::<i64>(&mut conn)? as i32;
    let step = PilotRunStep {
        id: Uuid::new_v4(),
        pilot_run_id: id,
        title: req.title,
        position: next_position,
        status: "not_started".to_string(),
        completed_at: None,
    };
    diesel::insert_into(pilot_run_steps::table)
        .values(&step)
        .execute(&mut conn)?;
    Ok(Json(step))
}

pub async fn set_step_status(
    State(state): State<Arc<AppState>>,
    Path((_pilot_id, step_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<SetStatusRequest>,
) -> Result<Json<PilotRunStep>, ServiceError> {
    let mut conn = state.conn.get()?;
    if !STEP_STATUSES.contains(&req.status.as_str()) {
        return Err(ServiceError::Validation(format!(
            "unknown step status: {}",
            req.status
        )));
    }
    let completed_at = if req.status == "done" { Some(Utc::now()) } else { None };
    diesel::update(pilot_run_steps::table.filter(pilot_run_steps::id.eq(step_id)))
        .set((
            pilot_run_steps::status.eq(&req.status),
            pilot_run_steps::completed_at.eq(completed_at),
        ))
        .execute(&mut conn)?;
    let step: PilotRunStep = pilot_run_steps::table
        .filter(pilot_run_steps::id.eq(step_id))
        .first(&mut conn)
        .optional()?
        .ok_or(ServiceError::NotFound("PILOT_STEP_NOT_FOUND"))?;
    Ok(Json(step))
}

pub async fn add_participant(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<AddParticipantRequest>,
) -> Result<Json<PilotRunParticipant>, ServiceError> {
    let mut conn = state.conn.get()?;
    load_pilot(&mut conn, id)?;
    let participant = PilotRunParticipant {
        id: Uuid::new_v4(),
        pilot_run_id: id,
        employee_id: req.employee_id,
        role: req.role,
        joined_at: Utc::now(),
    };
    diesel::insert_into(pilot_run_participants::table)
        .values(&participant)
        .execute(&mut conn)?;
    Ok(Json(participant))
}

pub async fn remove_participant(
    State(state): State<Arc<AppState>>,
    Path((pilot_id, employee_id)): Path<(Uuid, Uuid)>,
) -> Result<axum::http::StatusCode, ServiceError> {
    let mut conn = state.conn.get()?;
    diesel::delete(
        pilot_run_participants::table
            .filter(pilot_run_participants::pilot_run_id.eq(pilot_id))
            .filter(pilot_run_participants::employee_id.eq(employee_id)),
    )
    .execute(&mut conn)?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}

pub async fn add_note(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<AddNoteRequest>,
) -> Result<Json<PilotRunNote>, ServiceError> {
    let mut conn = state.conn.get()?;
    load_pilot(&mut conn, id)?;
    let note = PilotRunNote {
        id: Uuid::new_v4(),
        pilot_run_id: id,
        author_id: req.author_id,
        body: req.body,
        created_at: Utc::now(),
    };
    diesel::insert_into(pilot_run_notes::table)
        .values(&note)
        .execute(&mut conn)?;
    Ok(Json(note))
}

pub fn configure_pilots_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/app/pilots", get(list_pilots).post(create_pilot))
        .route("/api/app/pilots/:id", get(get_pilot))
        .route("/api/app/pilots/:id/status", put(set_pilot_status))
        .route("/api/app/pilots/:id/steps", post(add_step))
        .route("/api/app/pilots/:id/steps/:step_id/status", put(set_step_status))
        .route("/api/app/pilots/:id/participants", post(add_participant))
        .route(
            "/api/app/pilots/:id/participants/:employee_id",
            delete(remove_participant),
        )
        .route("/api/app/pilots/:id/notes", post(add_note))
}
