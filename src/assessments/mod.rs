use axum::{
    extract::{Path, Query, State},
    routing::{get, post, put},
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use diesel::PgConnection;
use log::info;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::shared::error::ServiceError;
use crate::shared::models::schema::{
    assessment_cycle_participants, assessment_cycles, skill_assessments, talent_employees,
    talent_skill_ratings, talent_skills,
};
use crate::shared::state::AppState;
use crate::shared::utils::parse_date;
use crate::skills::{SkillRating, RATING_MANAGER, RATING_SELF, RATING_SYSTEM};
use crate::talent::WorkspaceQuery;

pub const CYCLE_DRAFT: &str = "draft";
pub const CYCLE_ACTIVE: &str = "active";
pub const CYCLE_CLOSED: &str = "closed";

pub const PARTICIPANT_PENDING: &str = "pending";
pub const PARTICIPANT_SUBMITTED: &str = "submitted";

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Insertable)]
#[diesel(table_name = assessment_cycles)]
pub struct AssessmentCycle {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub name: String,
    pub status: String,
    pub opens_on: Option<NaiveDate>,
    pub closes_on: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Insertable)]
#[diesel(table_name = assessment_cycle_participants)]
pub struct CycleParticipant {
    pub id: Uuid,
    pub cycle_id: Uuid,
    pub employee_id: Uuid,
    pub self_status: String,
    pub manager_status: String,
    pub final_status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Insertable)]
#[diesel(table_name = skill_assessments)]
pub struct SkillAssessment {
    pub id: Uuid,
    pub cycle_id: Uuid,
    pub employee_id: Uuid,
    pub skill_id: Uuid,
    pub self_level: Option<i32>,
    pub manager_level: Option<i32>,
    pub final_level: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCycleRequest {
    pub name: String,
    pub opens_on: Option<String>,
    pub closes_on: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetCycleStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct SubmitAssessmentRequest {
    pub employee_id: Uuid,
    pub skill_id: Uuid,
    pub source: String,
    pub level: i32,
}

#[derive(Debug, Serialize)]
pub struct CycleDetail {
    pub cycle: AssessmentCycle,
    pub participants: Vec<CycleParticipant>,
    pub assessments: Vec<SkillAssessment>,
}

fn load_cycle(conn: &mut PgConnection, id: Uuid) -> Result<AssessmentCycle, ServiceError> {
    assessment_cycles::table
        .filter(assessment_cycles::id.eq(id))
        .first(conn)
        .optional()?
        .ok_or(ServiceError::NotFound("CYCLE_NOT_FOUND"))
}

/// Fan out participant records and per-skill assessment rows for every
/// active employee in the workspace. Runs once, keyed off the transition
/// into "active"; re-activation inserts nothing because the participant set
/// is checked first.
fn initialize_cycle(conn: &mut PgConnection, cycle: &AssessmentCycle) -> Result<usize, ServiceError> {
    let existing: i64 = assessment_cycle_participants::table
        .filter(assessment_cycle_participants::cycle_id.eq(cycle.id))
        .count()
        .get_result(conn)?;
    if existing > 0 {
        return Ok(0);
    }

    let employee_ids: Vec<Uuid> = talent_employees::table
        .filter(talent_employees::workspace_id.eq(cycle.workspace_id))
        .filter(talent_employees::is_active.eq(true))
        .select(talent_employees::id)
        .load(conn)?;

    let skill_ids: Vec<Uuid> = talent_skills::table
        .filter(talent_skills::workspace_id.eq(cycle.workspace_id))
        .select(talent_skills::id)
        .load(conn)?;

    let participants: Vec<CycleParticipant> = employee_ids
        .iter()
        .map(|employee_id| CycleParticipant {
            id: Uuid::new_v4(),
            cycle_id: cycle.id,
            employee_id: *employee_id,
            self_status: PARTICIPANT_PENDING.to_string(),
            manager_status: PARTICIPANT_PENDING.to_string(),
            final_status: PARTICIPANT_PENDING.to_string(),
        })
        .collect();
    if !participants.is_empty() {
        diesel::insert_into(assessment_cycle_participants::table)
            .values(&participants)
            .execute(conn)?;
    }

    let mut rows: Vec<SkillAssessment> = Vec::with_capacity(employee_ids.len() * skill_ids.len());
    for employee_id in &employee_ids {
        for skill_id in &skill_ids {
            rows.push(SkillAssessment {
                id: Uuid::new_v4(),
                cycle_id: cycle.id,
                employee_id: *employee_id,
                skill_id: *skill_id,
                self_level: None,
                manager_level: None,
                final_level: None,
            });
        }
    }
    if !rows.is_empty() {
        diesel::insert_into(skill_assessments::table)
            .values(&rows)
            .execute(conn)?;
    }

    info!(
        "initialized cycle {} with {} participants and {} assessment rows",
        cycle.id,
        participants.len(),
        rows.len()
    );
    Ok(participants.len())
}

pub async fn create_cycle(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WorkspaceQuery>,
    Json(req): Json<CreateCycleRequest>,
) -> Result<Json<AssessmentCycle>, ServiceError> {
    let mut conn = state.conn.get()?;
    let cycle = AssessmentCycle {
        id: Uuid::new_v4(),
        workspace_id: query.workspace_id,
        name: req.name,
        status: CYCLE_DRAFT.to_string(),
        opens_on: req.opens_on.as_deref().and_then(parse_date),
        closes_on: req.closes_on.as_deref().and_then(parse_date),
        created_at: Utc::now(),
    };
    diesel::insert_into(assessment_cycles::table)
        .values(&cycle)
        .execute(&mut conn)?;
    Ok(Json(cycle))
}

pub async fn list_cycles(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WorkspaceQuery>,
) -> Result<Json<Vec<AssessmentCycle>>, ServiceError> {
    let mut conn = state.conn.get()?;
    let cycles: Vec<AssessmentCycle> = assessment_cycles::table
        .filter(assessment_cycles::workspace_id.eq(query.workspace_id))
        .order(assessment_cycles::created_at.desc())
        .load(&mut conn)?;
    Ok(Json(cycles))
}

pub async fn get_cycle(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<CycleDetail>, ServiceError> {
    let mut conn = state.conn.get()?;
    let cycle = load_cycle(&mut conn, id)?;
    let participants: Vec<CycleParticipant> = assessment_cycle_participants::table
        .filter(assessment_cycle_participants::cycle_id.eq(id))
        .load(&mut conn)?;
    let assessments: Vec<SkillAssessment> = skill_assessments::table
        .filter(skill_assessments::cycle_id.eq(id))
        .load(&mut conn)?;
    Ok(Json(CycleDetail {
        cycle,
        participants,
        assessments,
    }))
}

pub async fn set_cycle_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<SetCycleStatusRequest>,
) -> Result<Json<AssessmentCycle>, ServiceError> {
    let mut conn = state.conn.get()?;
    if !matches!(req.status.as_str(), CYCLE_DRAFT | CYCLE_ACTIVE | CYCLE_CLOSED) {
        return Err(ServiceError::Validation(format!(
            "unknown cycle status: {}",
            req.status
        )));
    }
    let cycle = load_cycle(&mut conn, id)?;
    let activating = req.status == CYCLE_ACTIVE && cycle.status != CYCLE_ACTIVE;

    diesel::update(assessment_cycles::table.filter(assessment_cycles::id.eq(id)))
        .set(assessment_cycles::status.eq(&req.status))
        .execute(&mut conn)?;
    let cycle = load_cycle(&mut conn, id)?;

    if activating {
        initialize_cycle(&mut conn, &cycle)?;
    }
    Ok(Json(cycle))
}

/// Record one rating inside a cycle. Writes the matching column of the
/// assessment row, flips the participant sub-status, and appends a rating
/// history row so the gap engine sees the new value.
pub async fn submit_assessment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<SubmitAssessmentRequest>,
) -> Result<Json<SkillAssessment>, ServiceError> {
    let mut conn = state.conn.get()?;
    if !(1..=5).contains(&req.level) {
        return Err(ServiceError::Validation(format!(
            "skill level must be between 1 and 5, got {}",
            req.level
        )));
    }
    let cycle = load_cycle(&mut conn, id)?;
    if cycle.status != CYCLE_ACTIVE {
        return Err(ServiceError::Validation(
            "cycle is not accepting submissions".to_string(),
        ));
    }

    let row: SkillAssessment = skill_assessments::table
        .filter(skill_assessments::cycle_id.eq(id))
        .filter(skill_assessments::employee_id.eq(req.employee_id))
        .filter(skill_assessments::skill_id.eq(req.skill_id))
        .first(&mut conn)
        .optional()?
        .ok_or(ServiceError::NotFound("ASSESSMENT_NOT_FOUND"))?;

    match req.source.as_str() {
        RATING_SELF => {
            diesel::update(skill_assessments::table.filter(skill_assessments::id.eq(row.id)))
                .set(skill_assessments::self_level.eq(Some(req.level)))
                .execute(&mut conn)?;
            diesel::update(
                assessment_cycle_participants::table
                    .filter(assessment_cycle_participants::cycle_id.eq(id))
                    .filter(assessment_cycle_participants::employee_id.eq(req.employee_id)),
            )
            .set(assessment_cycle_participants::self_status.eq(PARTICIPANT_SUBMITTED))
            .execute(&mut conn)?;
        }
        RATING_MANAGER => {
            diesel::update(skill_assessments::table.filter(skill_assessments::id.eq(row.id)))
                .set(skill_assessments::manager_level.eq(Some(req.level)))
                .execute(&mut conn)?;
            diesel::update(
                assessment_cycle_participants::table
                    .filter(assessment_cycle_participants::cycle_id.eq(id))
                    .filter(assessment_cycle_participants::employee_id.eq(req.employee_id)),
            )
            .set(assessment_cycle_participants::manager_status.eq(PARTICIPANT_SUBMITTED))
            .execute(&mut conn)?;
        }
        RATING_SYSTEM => {
            diesel::update(skill_assessments::table.filter(skill_assessments::id.eq(row.id)))
                .set(skill_assessments::final_level.eq(Some(req.level)))
                .execute(&mut conn)?;
            diesel::update(
                assessment_cycle_participants::table
                    .filter(assessment_cycle_participants::cycle_id.eq(id))
                    .filter(assessment_cycle_participants::employee_id.eq(req.employee_id)),
            )
            .set(assessment_cycle_participants::final_status.eq(PARTICIPANT_SUBMITTED))
            .execute(&mut conn)?;
        }
        other => {
            return Err(ServiceError::Validation(format!(
                "unknown rating source: {other}"
            )));
        }
    }

    let rating = SkillRating {
        id: Uuid::new_v4(),
        workspace_id: cycle.workspace_id,
        employee_id: req.employee_id,
        skill_id: req.skill_id,
        source: req.source,
        level: req.level,
        rated_at: Utc::now(),
    };
    diesel::insert_into(talent_skill_ratings::table)
        .values(&rating)
        .execute(&mut conn)?;

    let row: SkillAssessment = skill_assessments::table
        .filter(skill_assessments::id.eq(row.id))
        .first(&mut conn)?;
    Ok(Json(row))
}

pub fn configure_assessments_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/app/assessments", get(list_cycles).post(create_cycle))
        .route("/api/app/assessments/:id", get(get_cycle))
        .route("/api/app/assessments/:id/status", put(set_cycle_status))
        .route("/api/app/assessments/:id/submit", post(submit_assessment))
}
