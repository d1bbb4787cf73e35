use axum::{
    extract::{Path, Query, State},
    routing::{get, post, put},
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::shared::error::ServiceError;
use crate::shared::models::schema::{
    development_goals, one_on_ones, quarterly_reports, survey_responses,
};
use crate::shared::state::AppState;
use crate::shared::utils::parse_date;
use crate::talent::WorkspaceQuery;

pub const ONE_ON_ONE_STATUSES: [&str; 3] = ["scheduled", "done", "cancelled"];
pub const GOAL_STATUSES: [&str; 3] = ["active", "done", "dropped"];

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Insertable)]
#[diesel(table_name = one_on_ones)]
pub struct OneOnOne {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub manager_id: Uuid,
    pub employee_id: Uuid,
    pub scheduled_at: DateTime<Utc>,
    pub status: String,
    pub agenda: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Insertable)]
#[diesel(table_name = development_goals)]
pub struct DevelopmentGoal {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub employee_id: Uuid,
    pub title: String,
    pub status: String,
    pub due_on: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Insertable)]
#[diesel(table_name = quarterly_reports)]
pub struct QuarterlyReport {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub track_id: Option<Uuid>,
    pub quarter: String,
    pub summary: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Insertable)]
#[diesel(table_name = survey_responses)]
pub struct SurveyResponse {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub survey_name: String,
    pub employee_id: Uuid,
    pub status: String,
    pub requested_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct CreateOneOnOneRequest {
    pub manager_id: Uuid,
    pub employee_id: Uuid,
    pub scheduled_at: DateTime<Utc>,
    pub agenda: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateGoalRequest {
    pub employee_id: Uuid,
    pub title: String,
    pub due_on: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateReportRequest {
    pub track_id: Option<Uuid>,
    pub quarter: String,
    pub summary: String,
}

#[derive(Debug, Deserialize)]
pub struct RequestSurveyRequest {
    pub survey_name: String,
    pub employee_ids: Vec<Uuid>,
}

pub async fn create_one_on_one(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WorkspaceQuery>,
    Json(req): Json<CreateOneOnOneRequest>,
) -> Result<Json<OneOnOne>, ServiceError> {
    let mut conn = state.conn.get()?;
    let row = OneOnOne {
        id: Uuid::new_v4(),
        workspace_id: query.workspace_id,
        manager_id: req.manager_id,
        employee_id: req.employee_id,
        scheduled_at: req.scheduled_at,
        status: "scheduled".to_string(),
        agenda: req.agenda,
        created_at: Utc::now(),
    };
    diesel::insert_into(one_on_ones::table)
        .values(&row)
        .execute(&mut conn)?;
    Ok(Json(row))
}

pub async fn list_one_on_ones(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WorkspaceQuery>,
) -> Result<Json<Vec<OneOnOne>>, ServiceError> {
    let mut conn = state.conn.get()?;
    let rows: Vec<OneOnOne> = one_on_ones::table
        .filter(one_on_ones::workspace_id.eq(query.workspace_id))
        .order(one_on_ones::scheduled_at.asc())
        .load(&mut conn)?;
    Ok(Json(rows))
}

pub async fn set_one_on_one_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<SetStatusRequest>,
) -> Result<Json<OneOnOne>, ServiceError> {
    let mut conn = state.conn.get()?;
    if !ONE_ON_ONE_STATUSES.contains(&req.status.as_str()) {
        return Err(ServiceError::Validation(format!(
            "unknown one-on-one status: {}",
            req.status
        )));
    }
    diesel::update(one_on_ones::table.filter(one_on_ones::id.eq(id)))
        .set(one_on_ones::status.eq(&req.status))
        .execute(&mut conn)?;
    let row: OneOnOne = one_on_ones::table
        .filter(one_on_ones::id.eq(id))
        .first(&mut conn)
        .optional()?
        .ok_or(ServiceError::NotFound("ONE_ON_ONE_NOT_FOUND"))?;
    Ok(Json(row))
}

pub async fn create_goal(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WorkspaceQuery>,
    Json(req): Json<CreateGoalRequest>,
) -> Result<Json<DevelopmentGoal>, ServiceError> {
    let mut conn = state.conn.get()?;
    let now = Utc::now();
    let goal = DevelopmentGoal {
        id: Uuid::new_v4(),
        workspace_id: query.workspace_id,
        employee_id: req.employee_id,
        title: req.title,
        status: "active".to_string(),
        due_on: req.due_on.as_deref().and_then(parse_date),
        created_at: now,
        updated_at: now,
    };
    diesel::insert_into(development_goals::table)
        .values(&goal)
        .execute(&mut conn)?;
    Ok(Json(goal))
}

pub async fn list_goals(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WorkspaceQuery>,
) -> Result<Json<Vec<DevelopmentGoal>>, ServiceError> {
    let mut conn = state.conn.get()?;
    let rows: Vec<DevelopmentGoal> = development_goals::table
        .filter(development_goals::workspace_id.eq(query.workspace_id))
        .order(development_goals::created_at.desc())
        .load(&mut conn)?;
    Ok(Json(rows))
}

pub async fn set_goal_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<SetStatusRequest>,
) -> Result<Json<DevelopmentGoal>, ServiceError> {
    let mut conn = state.conn.get()?;
    if !GOAL_STATUSES.contains(&req.status.as_str()) {
        return Err(ServiceError::Validation(format!(
            "unknown goal status: {}",
            req.status
        )));
    }
    diesel::update(development_goals::table.filter(development_goals::id.eq(id)))
        .set((
            development_goals::status.eq(&req.status),
            development_goals::updated_at.eq(Utc::now()),
        ))
        .execute(&mut conn)?;
    let row: DevelopmentGoal = development_goals::table
        .filter(development_goals::id.eq(id))
        .first(&mut conn)
        .optional()?
        .ok_or(ServiceError::NotFound("GOAL_NOT_FOUND"))?;
    Ok(Json(row))
}

pub async fn create_report(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WorkspaceQuery>,
    Json(req): Json<CreateReportRequest>,
) -> Result<Json<QuarterlyReport>, ServiceError> {
    let mut conn = state.conn.get()?;
    let report = QuarterlyReport {
        id: Uuid::new_v4(),
        workspace_id: query.workspace_id,
        track_id: req.track_id,
        quarter: req.quarter,
        summary: req.summary,
        created_at: Utc::now(),
    };
    diesel::insert_into(quarterly_reports::table)
        .values(&report)
        .execute(&mut conn)?;
    Ok(Json(report))
}

pub async fn list_reports(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WorkspaceQuery>,
) -> Result<Json<Vec<QuarterlyReport>>, ServiceError> {
    let mut conn = state.conn.get()?;
    let rows: Vec<QuarterlyReport> = quarterly_reports::table
        .filter(quarterly_reports::workspace_id.eq(query.workspace_id))
        .order(quarterly_reports::created_at.desc())
        .load(&mut conn)?;
    Ok(Json(rows))
}

/// Fan out pending survey rows, one per employee.
pub async fn request_survey(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WorkspaceQuery>,
    Json(req): Json<RequestSurveyRequest>,
) -> Result<Json<Vec<SurveyResponse>>, ServiceError> {
    let mut conn = state.conn.get()?;
    let now = Utc::now();
    let rows: Vec<SurveyResponse> = req
        .employee_ids
        .iter()
        .map(|employee_id| SurveyResponse {
            id: Uuid::new_v4(),
            workspace_id: query.workspace_id,
            survey_name: req.survey_name.clone(),
            employee_id: *employee_id,
            status: "pending".to_string(),
            requested_at: now,
            submitted_at: None,
        })
        .collect();
    if !rows.is_empty() {
        diesel::insert_into(survey_responses::table)
            .values(&rows)
            .execute(&mut conn)?;
    }
    Ok(Json(rows))
}

pub async fn submit_survey(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SurveyResponse>, ServiceError> {
    let mut conn = state.conn.get()?;
    diesel::update(survey_responses::table.filter(survey_responses::id.eq(id)))
        .set((
            survey_responses::status.eq("submitted"),
            survey_responses::submitted_at.eq(Some(Utc::now())),
        ))
        .execute(&mut conn)?;
    let row: SurveyResponse = survey_responses::table
        .filter(survey_responses::id.eq(id))
        .first(&mut conn)
        .optional()?
        .ok_or(ServiceError::NotFound("SURVEY_NOT_FOUND"))?;
    Ok(Json(row))
}

pub fn configure_coaching_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/app/one-on-ones", get(list_one_on_ones).post(create_one_on_one))
        .route("/api/app/one-on-ones/:id/status", put(set_one_on_one_status))
        .route("/api/app/goals", get(list_goals).post(create_goal))
        .route("/api/app/goals/:id/status", put(set_goal_status))
        .route("/api/app/reports", get(list_reports).post(create_report))
        .route("/api/app/surveys/request", post(request_survey))
        .route("/api/app/surveys/:id/submit", put(submit_survey))
}
