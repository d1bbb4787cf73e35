use chrono::Utc;
use diesel::prelude::*;
use diesel::PgConnection;
use log::warn;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::notifications::notify;
use crate::shared::error::ServiceError;
use crate::shared::models::schema::{risk_cases, workspaces};

pub const LEVEL_LOW: &str = "low";
pub const LEVEL_MEDIUM: &str = "medium";
pub const LEVEL_HIGH: &str = "high";

pub const STATUS_OPEN: &str = "open";
pub const STATUS_MONITORING: &str = "monitoring";
pub const STATUS_RESOLVED: &str = "resolved";

pub fn risk_rank(level: &str) -> i32 {
    match level {
        LEVEL_HIGH => 3,
        LEVEL_MEDIUM => 2,
        LEVEL_LOW => 1,
        _ => 0,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Insertable)]
#[diesel(table_name = risk_cases)]
pub struct RiskCase {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub employee_id: Uuid,
    pub level: String,
    pub status: String,
    pub source: String,
    pub reason: String,
    pub recommendation: Option<String>,
    pub owner_id: Option<Uuid>,
    pub resolved_at: Option<chrono::DateTime<Utc>>,
    pub resolution_note: Option<String>,
    pub created_at: chrono::DateTime<Utc>,
    pub updated_at: chrono::DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct EnsureRiskCase {
    pub workspace_id: Uuid,
    pub employee_id: Uuid,
    pub level: String,
    pub source: String,
    pub reason: String,
    pub recommendation: Option<String>,
    pub owner_id: Option<Uuid>,
}

/// What `ensure_risk_case` decided to do with the active case set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RiskPlan {
    /// No active case; open a new one.
    Create,
    /// An active case at this level or higher already exists.
    ReturnExisting(Uuid),
    /// An active case exists at a lower level; upgrade it in place.
    Escalate(Uuid),
}

/// Decide against the employee's active (open or monitoring) cases. At most
/// one active case per employee level survives this policy: equal or higher
/// levels absorb the request, lower ones escalate instead of duplicating.
pub fn plan_risk_case(active: &[(Uuid, String)], requested_level: &str) -> RiskPlan {
    let requested = risk_rank(requested_level);
    let strongest = active.iter().max_by_key(|(_, level)| risk_rank(level));
    match strongest {
        None => RiskPlan::Create,
        Some((id, level)) if risk_rank(level) >= requested => RiskPlan::ReturnExisting(*id),
        Some((id, _)) => RiskPlan::Escalate(*id),
    }
}

fn merge_text(existing: &str, incoming: &str) -> String {
    if existing.is_empty() || existing == incoming {
        incoming.to_string()
    } else {
        format!("{existing}; {incoming}")
    }
}

fn load_case(conn: &mut PgConnection, id: Uuid) -> Result<RiskCase, ServiceError> {
    risk_cases::table
        .filter(risk_cases::id.eq(id))
        .first(conn)
        .optional()?
        .ok_or(ServiceError::NotFound("RISK_CASE_NOT_FOUND"))
}

/// Case owner when set, workspace owner otherwise.
fn resolve_notification_recipient(
    conn: &mut PgConnection,
    case: &RiskCase,
) -> Result<Option<Uuid>, ServiceError> {
    if let Some(owner) = case.owner_id {
        return Ok(Some(owner));
    }
    let owner: Option<Uuid> = workspaces::table
        .filter(workspaces::id.eq(case.workspace_id))
        .select(workspaces::owner_id)
        .first(conn)
        .optional()?;
    Ok(owner)
}

/// Fire-and-forget: a failed notification is logged, never propagated.
fn notify_case_event(conn: &mut PgConnection, case: &RiskCase, kind: &str, title: &str) {
    let recipient = match resolve_notification_recipient(conn, case) {
        Ok(Some(recipient)) => recipient,
        Ok(None) => {
            warn!("risk case {} has no notification recipient", case.id);
            return;
        }
        Err(err) => {
            warn!("failed to resolve recipient for risk case {}: {err}", case.id);
            return;
        }
    };
    if let Err(err) = notify(
        conn,
        case.workspace_id,
        recipient,
        kind,
        title,
        Some(&case.reason),
    ) {
        warn!("failed to notify on risk case {}: {err}", case.id);
    }
}

/// Idempotent upsert of one employee's risk case. See `plan_risk_case` for
/// the decision rules; creation and escalation fire notifications, returning
/// an unchanged case fires nothing.
pub fn ensure_risk_case(
    conn: &mut PgConnection,
    req: EnsureRiskCase,
) -> Result<RiskCase, ServiceError> {
    if risk_rank(&req.level) == 0 {
        return Err(ServiceError::Validation(format!(
            "unknown risk level: {}",
            req.level
        )));
    }

    let active: Vec<(Uuid, String)> = risk_cases::table
        .filter(risk_cases::workspace_id.eq(req.workspace_id))
        .filter(risk_cases::employee_id.eq(req.employee_id))
        .filter(risk_cases::status.eq_any([STATUS_OPEN, STATUS_MONITORING]))
        .select((risk_cases::id, risk_cases::level))
        .load(conn)?;

    match plan_risk_case(&active, &req.level) {
        RiskPlan::ReturnExisting(id) => load_case(conn, id),
        RiskPlan::Escalate(id) => {
            let existing = load_case(conn, id)?;
            let reason = merge_text(&existing.reason, &req.reason);
            let recommendation = match (&existing.recommendation, &req.recommendation) {
                (Some(old), Some(new)) => Some(merge_text(old, new)),
                (None, Some(new)) => Some(new.clone()),
                (old, None) => old.clone(),
            };
            diesel::update(risk_cases::table.filter(risk_cases::id.eq(id)))
                .set((
                    risk_cases::level.eq(&req.level),
                    risk_cases::reason.eq(&reason),
                    risk_cases::recommendation.eq(recommendation.clone()),
                    risk_cases::updated_at.eq(Utc::now()),
                ))
                .execute(conn)?;
            let case = load_case(conn, id)?;
            notify_case_event(conn, &case, "risk_case_escalated", "Risk case escalated");
            Ok(case)
        }
        RiskPlan::Create => {
            let now = Utc::now();
            let case = RiskCase {
                id: Uuid::new_v4(),
                workspace_id: req.workspace_id,
                employee_id: req.employee_id,
                level: req.level,
                status: STATUS_OPEN.to_string(),
                source: req.source,
                reason: req.reason,
                recommendation: req.recommendation,
                owner_id: req.owner_id,
                resolved_at: None,
                resolution_note: None,
                created_at: now,
                updated_at: now,
            };
            diesel::insert_into(risk_cases::table)
                .values(&case)
                .execute(conn)?;
            notify_case_event(conn, &case, "risk_case_opened", "Risk case opened");
            Ok(case)
        }
    }
}

pub fn update_risk_case_status(
    conn: &mut PgConnection,
    id: Uuid,
    status: &str,
    resolution_note: Option<String>,
) -> Result<RiskCase, ServiceError> {
    if !matches!(status, STATUS_OPEN | STATUS_MONITORING | STATUS_RESOLVED) {
        return Err(ServiceError::Validation(format!(
            "unknown risk case status: {status}"
        )));
    }

    // make sure the case exists before touching it
    load_case(conn, id)?;

    let now = Utc::now();
    if status == STATUS_RESOLVED {
        diesel::update(risk_cases::table.filter(risk_cases::id.eq(id)))
            .set((
                risk_cases::status.eq(status),
                risk_cases::resolved_at.eq(Some(now)),
                risk_cases::resolution_note.eq(resolution_note.clone()),
                risk_cases::updated_at.eq(now),
            ))
            .execute(conn)?;
    } else {
        diesel::update(risk_cases::table.filter(risk_cases::id.eq(id)))
            .set((risk_cases::status.eq(status), risk_cases::updated_at.eq(now)))
            .execute(conn)?;
    }

    let case = load_case(conn, id)?;
    if status == STATUS_RESOLVED {
        notify_case_event(conn, &case, "risk_case_resolved", "Risk case resolved");
    }
    Ok(case)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_active_cases_creates() {
        assert_eq!(plan_risk_case(&[], LEVEL_LOW), RiskPlan::Create);
        assert_eq!(plan_risk_case(&[], LEVEL_HIGH), RiskPlan::Create);
    }

    #[test]
    fn same_level_is_idempotent() {
        let id = Uuid::new_v4();
        let active = vec![(id, LEVEL_MEDIUM.to_string())];
        assert_eq!(plan_risk_case(&active, LEVEL_MEDIUM), RiskPlan::ReturnExisting(id));
    }

    #[test]
    fn higher_request_escalates() {
        let id = Uuid::new_v4();
        let active = vec![(id, LEVEL_LOW.to_string())];
        assert_eq!(plan_risk_case(&active, LEVEL_HIGH), RiskPlan::Escalate(id));
        assert_eq!(plan_risk_case(&active, LEVEL_MEDIUM), RiskPlan::Escalate(id));
    }

    #[test]
    fn lower_request_returns_the_stronger_case() {
        let id = Uuid::new_v4();
        let active = vec![(id, LEVEL_HIGH.to_string())];
        assert_eq!(plan_risk_case(&active, LEVEL_LOW), RiskPlan::ReturnExisting(id));
        assert_eq!(plan_risk_case(&active, LEVEL_MEDIUM), RiskPlan::ReturnExisting(id));
    }

    #[test]
    fn strongest_active_case_wins() {
        let low_id = Uuid::new_v4();
        let high_id = Uuid::new_v4();
        let active = vec![
            (low_id, LEVEL_LOW.to_string()),
            (high_id, LEVEL_HIGH.to_string()),
        ];
        assert_eq!(plan_risk_case(&active, LEVEL_MEDIUM), RiskPlan::ReturnExisting(high_id));
    }

    #[test]
    fn merge_text_appends_once() {
        assert_eq!(merge_text("", "new"), "new");
        assert_eq!(merge_text("old", "new"), "old; new");
        assert_eq!(merge_text("same", "same"), "same");
    }

    #[test]
    fn rank_orders_levels() {
        assert!(risk_rank(LEVEL_HIGH) > risk_rank(LEVEL_MEDIUM));
        assert!(risk_rank(LEVEL_MEDIUM) > risk_rank(LEVEL_LOW));
        assert_eq!(risk_rank("unknown"), 0);
    }
}
