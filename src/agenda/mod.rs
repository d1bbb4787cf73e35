use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::analytics::skill_gap;
use crate::shared::error::ServiceError;
use crate::shared::models::schema::{
    development_goals, one_on_ones, pilot_run_participants, pilot_runs, quarterly_reports,
    survey_responses, talent_employees, talent_tracks,
};
use crate::shared::state::AppState;
use crate::shared::utils::quarter_label;

/// Skill-gap summaries are the most expensive agenda section; cap the fan-out.
const MAX_GAP_EMPLOYEES: usize = 20;

/// Pilot end dates within this window land on the agenda.
const PILOT_HORIZON_DAYS: i64 = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn weight(self) -> i32 {
        match self {
            Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
        }
    }
}

/// Due-date proximity rule: within 3 days is urgent, within 14 is worth
/// planning, everything else can wait.
pub fn priority_for_due(due: NaiveDate, today: NaiveDate) -> Priority {
    let days = (due - today).num_days();
    if days <= 3 {
        Priority::High
    } else if days <= 14 {
        Priority::Medium
    } else {
        Priority::Low
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AgendaItem {
    pub source: String,
    pub title: String,
    pub employee_id: Option<Uuid>,
    pub due_on: Option<NaiveDate>,
    pub priority: Priority,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActionItem {
    pub kind: String,
    pub title: String,
    pub priority: Priority,
}

/// Denormalized "what to do this week" snapshot. Never persisted; rebuilt on
/// every request.
#[derive(Debug, Clone, Serialize)]
pub struct ManagerAgenda {
    pub manager_id: Uuid,
    pub track_id: Uuid,
    pub track_name: String,
    pub team_size: usize,
    pub generated_at: DateTime<Utc>,
    pub items: Vec<AgendaItem>,
    pub actions: Vec<ActionItem>,
}

#[derive(Debug, Deserialize)]
pub struct AgendaQuery {
    pub workspace_id: Uuid,
    pub manager_id: Uuid,
}

pub fn sort_agenda_items(items: &mut [AgendaItem]) {
    items.sort_by(|a, b| {
        b.priority.weight().cmp(&a.priority.weight()).then_with(|| {
            match (a.due_on, b.due_on) {
                (Some(a_due), Some(b_due)) => a_due.cmp(&b_due),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            }
        })
    });
}

pub async fn get_manager_agenda(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AgendaQuery>,
) -> Result<Json<ManagerAgenda>, ServiceError> {
    let mut conn = state.conn.get()?;
    let now = Utc::now();
    let today = now.date_naive();

    // explicit manager -> track link; no name-matching fallback
    let track: (Uuid, String) = talent_tracks::table
        .filter(talent_tracks::workspace_id.eq(query.workspace_id))
        .filter(talent_tracks::manager_id.eq(query.manager_id))
        .select((talent_tracks::id, talent_tracks::name))
        .first(&mut conn)
        .optional()?
        .ok_or(ServiceError::NotFound("TRACK_NOT_FOUND"))?;
    let (track_id, track_name) = track;

    let team: Vec<(Uuid, String)> = talent_employees::table
        .filter(talent_employees::workspace_id.eq(query.workspace_id))
        .filter(talent_employees::track_id.eq(track_id))
        .filter(talent_employees::is_active.eq(true))
        .select((talent_employees::id, talent_employees::name))
        .order(talent_employees::name.asc())
        .load(&mut conn)?;
    let team_ids: Vec<Uuid> = team.iter().map(|(id, _)| *id).collect();

    let mut items: Vec<AgendaItem> = Vec::new();
    let mut actions: Vec<ActionItem> = Vec::new();

    // upcoming one-on-ones
    let upcoming: Vec<(Uuid, DateTime<Utc>)> = one_on_ones::table
        .filter(one_on_ones::workspace_id.eq(query.workspace_id))
        .filter(one_on_ones::manager_id.eq(query.manager_id))
        .filter(one_on_ones::status.eq("scheduled"))
        .filter(one_on_ones::scheduled_at.ge(now))
        .select((one_on_ones::employee_id, one_on_ones::scheduled_at))
        .order(one_on_ones::scheduled_at.asc())
        .load(&mut conn)?;
    for (employee_id, scheduled_at) in upcoming {
        let name = team
            .iter()
            .find(|(id, _)| *id == employee_id)
            .map(|(_, name)| name.clone())
            .unwrap_or_else(|| "team member".to_string());
        let due = scheduled_at.date_naive();
        items.push(AgendaItem {
            source: "one_on_one".to_string(),
            title: format!("1:1 with {name}"),
            employee_id: Some(employee_id),
            due_on: Some(due),
            priority: priority_for_due(due, today),
        });
    }

    // active and overdue development goals
    if !team_ids.is_empty() {
        let goals: Vec<(Uuid, Uuid, String, Option<NaiveDate>)> = development_goals::table
            .filter(development_goals::workspace_id.eq(query.workspace_id))
            .filter(development_goals::employee_id.eq_any(&team_ids))
            .filter(development_goals::status.eq("active"))
            .select((
                development_goals::id,
                development_goals::employee_id,
                development_goals::title,
                development_goals::due_on,
            ))
            .load(&mut conn)?;
        for (_, employee_id, title, due_on) in goals {
            let priority = match due_on {
                Some(due) if due < today => Priority::High,
                Some(due) => priority_for_due(due, today),
                None => Priority::Low,
            };
            let label = match due_on {
                Some(due) if due < today => format!("Overdue goal: {title}"),
                _ => format!("Goal check-in: {title}"),
            };
            items.push(AgendaItem {
                source: "development_goal".to_string(),
                title: label,
                employee_id: Some(employee_id),
                due_on,
                priority,
            });
        }
    }

    // pilots ending soon and pilots with nobody enrolled
    let pilots: Vec<(Uuid, String, Option<NaiveDate>)> = pilot_runs::table
        .filter(pilot_runs::workspace_id.eq(query.workspace_id))
        .filter(pilot_runs::status.eq("active"))
        .select((pilot_runs::id, pilot_runs::name, pilot_runs::ends_on))
        .load(&mut conn)?;
    for (pilot_id, name, ends_on) in pilots {
        if let Some(ends) = ends_on {
            let days_left = (ends - today).num_days();
            if (0..=PILOT_HORIZON_DAYS).contains(&days_left) {
                items.push(AgendaItem {
                    source: "pilot".to_string(),
                    title: format!("Pilot wraps up: {name}"),
                    employee_id: None,
                    due_on: Some(ends),
                    priority: priority_for_due(ends, today),
                });
            }
        }
        let participant_count: i64 = pilot_run_participants::table
            .filter(pilot_run_participants::pilot_run_id.eq(pilot_id))
            .count()
            .get_result(&mut conn)?;
        if participant_count == 0 {
            actions.push(ActionItem {
                kind: "pilot_participants".to_string(),
                title: format!("Pilot \"{name}\" has no participants"),
                priority: Priority::Medium,
            });
        }
    }

    // current-quarter report
    let quarter = quarter_label(today);
    let report_exists: i64 = quarterly_reports::table
        .filter(quarterly_reports::workspace_id.eq(query.workspace_id))
        .filter(quarterly_reports::track_id.eq(track_id))
        .filter(quarterly_reports::quarter.eq(&quarter))
        .count()
        .get_result(&mut conn)?;
    if report_exists == 0 {
        actions.push(ActionItem {
            kind: "quarterly_report".to_string(),
            title: format!("Quarterly report for {quarter} is missing"),
            priority: Priority::Medium,
        });
    }

    // per-employee skill-gap summaries, capped
    for (employee_id, name) in team.iter().take(MAX_GAP_EMPLOYEES) {
        let report = match skill_gap::employee_gap_report(&mut conn, *employee_id) {
            Ok(report) => report,
            // employees without a role assignment simply have no gap summary
            Err(ServiceError::NotFound(_)) => continue,
            Err(err) => return Err(err),
        };
        if report.must_have_gap_score > 0 {
            items.push(AgendaItem {
                source: "skill_gap".to_string(),
                title: format!(
                    "{name} is {} point(s) short of the {} profile",
                    report.must_have_gap_score, report.role_name
                ),
                employee_id: Some(*employee_id),
                due_on: None,
                priority: Priority::Medium,
            });
        }
    }

    // pending feedback surveys
    if state.config.features.surveys && !team_ids.is_empty() {
        let pending: i64 = survey_responses::table
            .filter(survey_responses::workspace_id.eq(query.workspace_id))
            .filter(survey_responses::employee_id.eq_any(&team_ids))
            .filter(survey_responses::status.eq("pending"))
            .count()
            .get_result(&mut conn)?;
        if pending > 0 {
            actions.push(ActionItem {
                kind: "feedback_surveys".to_string(),
                title: format!("{pending} feedback survey response(s) outstanding"),
                priority: Priority::Low,
            });
        }
    }

    sort_agenda_items(&mut items);
    actions.sort_by(|a, b| b.priority.weight().cmp(&a.priority.weight()));

    Ok(Json(ManagerAgenda {
        manager_id: query.manager_id,
        track_id,
        track_name,
        team_size: team.len(),
        generated_at: now,
        items,
        actions,
    }))
}

pub fn configure_agenda_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/app/agenda", get(get_manager_agenda))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn due_date_proximity_maps_to_priority() {
        let today = date(2026, 3, 10);
        assert_eq!(priority_for_due(date(2026, 3, 10), today), Priority::High);
        assert_eq!(priority_for_due(date(2026, 3, 13), today), Priority::High);
        assert_eq!(priority_for_due(date(2026, 3, 14), today), Priority::Medium);
        assert_eq!(priority_for_due(date(2026, 3, 24), today), Priority::Medium);
        assert_eq!(priority_for_due(date(2026, 3, 25), today), Priority::Low);
    }

    #[test]
    fn overdue_dates_are_high_priority() {
        let today = date(2026, 3, 10);
        assert_eq!(priority_for_due(date(2026, 3, 1), today), Priority::High);
    }

    #[test]
    fn items_sort_by_priority_then_due_date() {
        let mk = |priority, due_on| AgendaItem {
            source: String::new(),
            title: String::new(),
            employee_id: None,
            due_on,
            priority,
        };
        let mut items = vec![
            mk(Priority::Low, None),
            mk(Priority::High, Some(date(2026, 3, 12))),
            mk(Priority::High, Some(date(2026, 3, 11))),
            mk(Priority::Medium, Some(date(2026, 3, 20))),
        ];
        sort_agenda_items(&mut items);
        assert_eq!(items[0].due_on, Some(date(2026, 3, 11)));
        assert_eq!(items[1].due_on, Some(date(2026, 3, 12)));
        assert_eq!(items[2].priority, Priority::Medium);
        assert_eq!(items[3].priority, Priority::Low);
    }
}
