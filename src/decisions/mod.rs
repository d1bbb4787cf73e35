use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::shared::error::ServiceError;
use crate::shared::models::schema::{talent_decisions, talent_employees};
use crate::shared::state::AppState;
use crate::talent::WorkspaceQuery;

pub const DECISION_TYPES: [&str; 5] = ["promote", "develop", "reassign", "hold", "exit"];
pub const DECISION_STATUSES: [&str; 3] = ["proposed", "approved", "rejected"];

const CSV_HEADER: [&str; 7] = [
    "id",
    "employee",
    "decision",
    "quarter",
    "status",
    "rationale",
    "created_at",
];

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Insertable)]
#[diesel(table_name = talent_decisions)]
pub struct TalentDecision {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub employee_id: Uuid,
    pub decision_type: String,
    pub quarter: String,
    pub rationale: String,
    pub decided_by: Option<Uuid>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateDecisionRequest {
    pub employee_id: Uuid,
    pub decision_type: String,
    pub quarter: String,
    pub rationale: String,
    pub decided_by: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct SetDecisionStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct DecisionListQuery {
    pub workspace_id: Uuid,
    pub quarter: Option<String>,
    pub employee_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct DecisionExportQuery {
    pub workspace_id: Uuid,
    pub quarter: String,
}

/// Render decisions as CSV with the fixed column header. Every field is
/// double-quoted; zero rows produce exactly the header line.
pub fn decisions_csv(
    rows: &[TalentDecision],
    employee_names: &HashMap<Uuid, String>,
) -> Result<String, ServiceError> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(Vec::new());

    writer
        .write_record(CSV_HEADER)
        .map_err(|e| ServiceError::Database(e.to_string()))?;
    for row in rows {
        let employee = employee_names
            .get(&row.employee_id)
            .cloned()
            .unwrap_or_else(|| row.employee_id.to_string());
        writer
            .write_record([
                row.id.to_string().as_str(),
                employee.as_str(),
                row.decision_type.as_str(),
                row.quarter.as_str(),
                row.status.as_str(),
                row.rationale.as_str(),
                row.created_at.to_rfc3339().as_str(),
            ])
            .map_err(|e| ServiceError::Database(e.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ServiceError::Database(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ServiceError::Database(e.to_string()))
}

pub async fn create_decision(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WorkspaceQuery>,
    Json(req): Json<CreateDecisionRequest>,
) -> Result<Json<TalentDecision>, ServiceError> {
    let mut conn = state.conn.get()?;
    if !DECISION_TYPES.contains(&req.decision_type.as_str()) {
        return Err(ServiceError::Validation(format!(
            "unknown decision type: {}",
            req.decision_type
        )));
    }
    let decision = TalentDecision {
        id: Uuid::new_v4(),
        workspace_id: query.workspace_id,
        employee_id: req.employee_id,
        decision_type: req.decision_type,
        quarter: req.quarter,
        rationale: req.rationale,
        decided_by: req.decided_by,
        status: "proposed".to_string(),
        created_at: Utc::now(),
    };
    diesel::insert_into(talent_decisions::table)
        .values(&decision)
        .execute(&mut conn)?;
    Ok(Json(decision))
}

pub async fn list_decisions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DecisionListQuery>,
) -> Result<Json<Vec<TalentDecision>>, ServiceError> {
    let mut conn = state.conn.get()?;
    let mut q = talent_decisions::table
        .filter(talent_decisions::workspace_id.eq(query.workspace_id))
        .into_boxed();
    if let Some(quarter) = query.quarter {
        q = q.filter(talent_decisions::quarter.eq(quarter));
    }
    if let Some(employee_id) = query.employee_id {
        q = q.filter(talent_decisions::employee_id.eq(employee_id));
    }
    let rows: Vec<TalentDecision> =
        q.order(talent_decisions::created_at.desc()).load(&mut conn)?;
    Ok(Json(rows))
}

pub async fn set_decision_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<SetDecisionStatusRequest>,
) -> Result<Json<TalentDecision>, ServiceError> {
    let mut conn = state.conn.get()?;
    if !DECISION_STATUSES.contains(&req.status.as_str()) {
        return Err(ServiceError::Validation(format!(
            "unknown decision status: {}",
            req.status
        )));
    }
    diesel::update(talent_decisions::table.filter(talent_decisions::id.eq(id)))
        .set(talent_decisions::status.eq(&req.status))
        .execute(&mut conn)?;
    let decision: TalentDecision = talent_decisions::table
        .filter(talent_decisions::id.eq(id))
        .first(&mut conn)
        .optional()?
        .ok_or(ServiceError::NotFound("DECISION_NOT_FOUND"))?;
    Ok(Json(decision))
}

pub async fn export_decisions_csv(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DecisionExportQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let mut conn = state.conn.get()?;
    let rows: Vec<TalentDecision> = talent_decisions::table
        .filter(talent_decisions::workspace_id.eq(query.workspace_id))
        .filter(talent_decisions::quarter.eq(&query.quarter))
        .order(talent_decisions::created_at.asc())
        .load(&mut conn)?;

    let employee_ids: Vec<Uuid> = rows.iter().map(|r| r.employee_id).collect();
    let names: HashMap<Uuid, String> = if employee_ids.is_empty() {
        HashMap::new()
    } else {
        talent_employees::table
            .filter(talent_employees::id.eq_any(&employee_ids))
            .select((talent_employees::id, talent_employees::name))
            .load::<(Uuid, String)>(&mut conn)?
            .into_iter()
            .collect()
    };

    let body = decisions_csv(&rows, &names)?;
    let disposition = format!("attachment; filename=\"decisions-{}.csv\"", query.quarter);
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

pub fn configure_decisions_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/app/decisions", get(list_decisions).post(create_decision))
        .route("/api/app/decisions/export.csv", get(export_decisions_csv))
        .route("/api/app/decisions/:id/status", put(set_decision_status))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decision(quarter: &str, rationale: &str) -> TalentDecision {
        TalentDecision {
            id: Uuid::new_v4(),
            workspace_id: Uuid::nil(),
            employee_id: Uuid::new_v4(),
            decision_type: "promote".to_string(),
            quarter: quarter.to_string(),
            rationale: rationale.to_string(),
            decided_by: None,
            status: "proposed".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn empty_quarter_yields_header_only() {
        let csv = decisions_csv(&[], &HashMap::new()).unwrap();
        assert_eq!(
            csv,
            "\"id\",\"employee\",\"decision\",\"quarter\",\"status\",\"rationale\",\"created_at\"\n"
        );
    }

    #[test]
    fn fields_are_double_quoted() {
        let row = decision("2026-Q2", "strong delivery, mentors juniors");
        let mut names = HashMap::new();
        names.insert(row.employee_id, "Anna Petrova".to_string());
        let csv = decisions_csv(&[row], &names).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("\"Anna Petrova\""));
        assert!(lines[1].contains("\"2026-Q2\""));
        assert!(lines[1].contains("\"promote\""));
    }
}
