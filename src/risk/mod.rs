pub mod store;

use axum::{
    extract::{Path, Query, State},
    routing::{get, post, put},
    Json, Router,
};
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::shared::error::ServiceError;
use crate::shared::models::schema::risk_cases;
use crate::shared::state::AppState;

pub use store::{ensure_risk_case, update_risk_case_status, EnsureRiskCase, RiskCase};

#[derive(Debug, Deserialize)]
pub struct RiskCaseListQuery {
    pub workspace_id: Uuid,
    pub employee_id: Option<Uuid>,
    pub status: Option<String>,
    pub level: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EnsureRiskCaseRequest {
    pub workspace_id: Uuid,
    pub employee_id: Uuid,
    pub level: String,
    pub source: Option<String>,
    pub reason: String,
    pub recommendation: Option<String>,
    pub owner_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
    pub resolution_note: Option<String>,
}

pub async fn list_risk_cases(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RiskCaseListQuery>,
) -> Result<Json<Vec<RiskCase>>, ServiceError> {
    // schema-gated feature: reads degrade to empty rather than erroring
    if !state.config.features.risk_cases {
        return Ok(Json(vec![]));
    }
    let mut conn = state.conn.get()?;

    let mut q = risk_cases::table
        .filter(risk_cases::workspace_id.eq(query.workspace_id))
        .into_boxed();
    if let Some(employee_id) = query.employee_id {
        q = q.filter(risk_cases::employee_id.eq(employee_id));
    }
    if let Some(status) = query.status {
        q = q.filter(risk_cases::status.eq(status));
    }
    if let Some(level) = query.level {
        q = q.filter(risk_cases::level.eq(level));
    }

    let cases: Vec<RiskCase> = q.order(risk_cases::created_at.desc()).load(&mut conn)?;
    Ok(Json(cases))
}

pub async fn get_risk_case(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<RiskCase>, ServiceError> {
    if !state.config.features.risk_cases {
        return Err(ServiceError::NotAvailable("RISK_CASES_NOT_AVAILABLE"));
    }
    let mut conn = state.conn.get()?;
    let case: RiskCase = risk_cases::table
        .filter(risk_cases::id.eq(id))
        .first(&mut conn)
        .optional()?
        .ok_or(ServiceError::NotFound("RISK_CASE_NOT_FOUND"))?;
    Ok(Json(case))
}

pub async fn handle_ensure_risk_case(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EnsureRiskCaseRequest>,
) -> Result<Json<RiskCase>, ServiceError> {
    if !state.config.features.risk_cases {
        return Err(ServiceError::NotAvailable("RISK_CASES_NOT_AVAILABLE"));
    }
    let mut conn = state.conn.get()?;
    let case = ensure_risk_case(
        &mut conn,
        EnsureRiskCase {
            workspace_id: req.workspace_id,
            employee_id: req.employee_id,
            level: req.level,
            source: req.source.unwrap_or_else(|| "manual".to_string()),
            reason: req.reason,
            recommendation: req.recommendation,
            owner_id: req.owner_id,
        },
    )?;
    Ok(Json(case))
}

pub async fn handle_update_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<RiskCase>, ServiceError> {
    if !state.config.features.risk_cases {
        return Err(ServiceError::NotAvailable("RISK_CASES_NOT_AVAILABLE"));
    }
    let mut conn = state.conn.get()?;
    let case = update_risk_case_status(&mut conn, id, &req.status, req.resolution_note)?;
    Ok(Json(case))
}

pub fn configure_risk_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/app/risk-cases", get(list_risk_cases))
        .route("/api/app/risk-cases/ensure", post(handle_ensure_risk_case))
        .route("/api/app/risk-cases/:id", get(get_risk_case))
        .route("/api/app/risk-cases/:id/status", put(handle_update_status))
}
