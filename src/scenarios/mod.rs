pub mod generator;

use axum::{
    extract::{Path, Query, State},
    routing::{get, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::PgConnection;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::analytics::skill_gap::{compute_gaps, must_have_gap_score, load_latest_ratings};
use crate::config::ScenarioParams;
use crate::shared::error::ServiceError;
use crate::shared::models::schema::{
    move_scenario_actions, move_scenarios, talent_employee_skills, talent_employees,
    talent_role_profiles, talent_role_requirements, talent_skills, talent_tracks,
};
use crate::shared::state::AppState;
use crate::skills::RoleRequirement;
use crate::talent::WorkspaceQuery;

pub use generator::{
    suggest_actions, InternalCandidate, KeyRiskSkill, RoleCoverage, ScenarioActionDraft,
    TeamRiskHiringSummary,
};

pub const SCENARIO_STATUSES: [&str; 4] = ["draft", "review", "approved", "archived"];

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Insertable)]
#[diesel(table_name = move_scenarios)]
pub struct MoveScenario {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub track_id: Option<Uuid>,
    pub title: String,
    pub status: String,
    pub summary: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Insertable)]
#[diesel(table_name = move_scenario_actions)]
pub struct MoveScenarioAction {
    pub id: Uuid,
    pub scenario_id: Uuid,
    pub action_type: String,
    pub role_name: String,
    pub employee_id: Option<Uuid>,
    pub priority: String,
    pub estimated_cost: f64,
    pub estimated_months: Option<i32>,
    pub rationale: String,
    pub position: i32,
}

#[derive(Debug, Serialize)]
pub struct MoveScenarioDetail {
    pub scenario: MoveScenario,
    pub actions: Vec<MoveScenarioAction>,
}

#[derive(Debug, Deserialize)]
pub struct CreateScenarioRequest {
    pub track_id: Option<Uuid>,
    pub title: String,
    pub summary: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetScenarioStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct TeamSummaryQuery {
    pub workspace_id: Uuid,
    pub track_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct SuggestScenarioRequest {
    pub workspace_id: Uuid,
    pub track_id: Uuid,
}

/// Team-local skill ownership plus per-role internal-candidate coverage.
pub fn build_team_risk_summary(
    conn: &mut PgConnection,
    workspace_id: Uuid,
    track_id: Uuid,
    params: &ScenarioParams,
) -> Result<TeamRiskHiringSummary, ServiceError> {
    let track_name: String = talent_tracks::table
        .filter(talent_tracks::id.eq(track_id))
        .filter(talent_tracks::workspace_id.eq(workspace_id))
        .select(talent_tracks::name)
        .first(conn)
        .optional()?
        .ok_or(ServiceError::NotFound("TRACK_NOT_FOUND"))?;

    let team_ids: Vec<Uuid> = talent_employees::table
        .filter(talent_employees::workspace_id.eq(workspace_id))
        .filter(talent_employees::track_id.eq(track_id))
        .filter(talent_employees::is_active.eq(true))
        .select(talent_employees::id)
        .load(conn)?;

    // skill id -> (name, distinct owners within the team)
    let mut owners_by_skill: HashMap<Uuid, (String, usize)> = HashMap::new();
    if !team_ids.is_empty() {
        let owned: Vec<Uuid> = talent_employee_skills::table
            .filter(talent_employee_skills::employee_id.eq_any(&team_ids))
            .select(talent_employee_skills::skill_id)
            .load(conn)?;
        let mut counts: HashMap<Uuid, usize> = HashMap::new();
        for skill_id in owned {
            *counts.entry(skill_id).or_insert(0) += 1;
        }
        let skill_ids: Vec<Uuid> = counts.keys().copied().collect();
        let names: HashMap<Uuid, String> = talent_skills::table
            .filter(talent_skills::id.eq_any(&skill_ids))
            .select((talent_skills::id, talent_skills::name))
            .load::<(Uuid, String)>(conn)?
            .into_iter()
            .collect();
        for (skill_id, count) in counts {
            let name = names.get(&skill_id).cloned().unwrap_or_default();
            owners_by_skill.insert(skill_id, (name, count));
        }
    }
    let key_risk = generator::key_risk_skills(&owners_by_skill);

    let roles: Vec<(Uuid, String, bool)> = talent_role_profiles::table
        .filter(talent_role_profiles::workspace_id.eq(workspace_id))
        .filter(talent_role_profiles::track_id.eq(track_id))
        .select((
            talent_role_profiles::id,
            talent_role_profiles::name,
            talent_role_profiles::is_leadership,
        ))
        .load(conn)?;

    let workforce: Vec<(Uuid, String)> = talent_employees::table
        .filter(talent_employees::workspace_id.eq(workspace_id))
        .filter(talent_employees::is_active.eq(true))
        .select((talent_employees::id, talent_employees::name))
        .load(conn)?;

    let mut coverage = Vec::with_capacity(roles.len());
    for (role_id, role_name, is_leadership) in roles {
        let requirements: Vec<RoleRequirement> = talent_role_requirements::table
            .filter(talent_role_requirements::role_profile_id.eq(role_id))
            .load(conn)?;
        let named: Vec<(RoleRequirement, String)> =
            requirements.into_iter().map(|r| (r, String::new())).collect();

        let single_point_of_failure = named.iter().any(|(req, _)| {
            req.must_have
                && owners_by_skill
                    .get(&req.skill_id)
                    .map(|(_, owners)| *owners <= 1)
                    .unwrap_or(true)
        });

        let mut candidates: Vec<InternalCandidate> = Vec::new();
        for (employee_id, name) in &workforce {
            let latest = load_latest_ratings(conn, *employee_id)?;
            let gaps = compute_gaps(&named, &latest);
            let score = must_have_gap_score(&gaps);
            if score <= params.internal_candidate_gap_threshold {
                candidates.push(InternalCandidate {
                    employee_id: *employee_id,
                    name: name.clone(),
                    gap_score: score,
                });
            }
        }
        candidates.sort_by(|a, b| a.gap_score.cmp(&b.gap_score).then_with(|| a.name.cmp(&b.name)));

        coverage.push(RoleCoverage {
            role_profile_id: role_id,
            role_name,
            is_leadership,
            single_point_of_failure,
            hire_required: candidates.is_empty(),
            candidates,
        });
    }

    Ok(TeamRiskHiringSummary {
        track_id,
        track_name,
        headcount: team_ids.len(),
        key_risk_skills: key_risk,
        roles: coverage,
    })
}

pub async fn get_team_risk_summary(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TeamSummaryQuery>,
) -> Result<Json<Vec<TeamRiskHiringSummary>>, ServiceError> {
    let mut conn = state.conn.get()?;
    let params = &state.config.scenario;

    let track_ids: Vec<Uuid> = match query.track_id {
        Some(track_id) => vec![track_id],
        None => talent_tracks::table
            .filter(talent_tracks::workspace_id.eq(query.workspace_id))
            .order(talent_tracks::name.asc())
            .select(talent_tracks::id)
            .limit(params.max_teams_per_summary as i64)
            .load(&mut conn)?,
    };

    let mut summaries = Vec::with_capacity(track_ids.len());
    for track_id in track_ids {
        summaries.push(build_team_risk_summary(
            &mut conn,
            query.workspace_id,
            track_id,
            params,
        )?);
    }
    Ok(Json(summaries))
}

/// Build a draft scenario straight from a team's risk summary.
pub async fn suggest_move_scenario(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SuggestScenarioRequest>,
) -> Result<Json<MoveScenarioDetail>, ServiceError> {
    let mut conn = state.conn.get()?;
    let params = &state.config.scenario;

    let summary = build_team_risk_summary(&mut conn, req.workspace_id, req.track_id, params)?;
    let drafts = suggest_actions(&summary, params);

    let now = Utc::now();
    let scenario = MoveScenario {
        id: Uuid::new_v4(),
        workspace_id: req.workspace_id,
        track_id: Some(req.track_id),
        title: format!("Move scenario: {}", summary.track_name),
        status: "draft".to_string(),
        summary: Some(format!(
            "{} key risk skill(s), {} role(s) reviewed",
            summary.key_risk_skills.len(),
            summary.roles.len()
        )),
        created_at: now,
        updated_at: now,
    };
    diesel::insert_into(move_scenarios::table)
        .values(&scenario)
        .execute(&mut conn)?;

    let actions: Vec<MoveScenarioAction> = drafts
        .into_iter()
        .enumerate()
        .map(|(index, draft)| MoveScenarioAction {
            id: Uuid::new_v4(),
            scenario_id: scenario.id,
            action_type: draft.action_type,
            role_name: draft.role_name,
            employee_id: draft.employee_id,
            priority: draft.priority,
            estimated_cost: draft.estimated_cost,
            estimated_months: draft.estimated_months,
            rationale: draft.rationale,
            position: index as i32,
        })
        .collect();
    if !actions.is_empty() {
        diesel::insert_into(move_scenario_actions::table)
            .values(&actions)
            .execute(&mut conn)?;
    }

    Ok(Json(MoveScenarioDetail { scenario, actions }))
}

pub async fn create_scenario(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WorkspaceQuery>,
    Json(req): Json<CreateScenarioRequest>,
) -> Result<Json<MoveScenario>, ServiceError> {
    let mut conn = state.conn.get()?;
    let now = Utc::now();
    let scenario = MoveScenario {
        id: Uuid::new_v4(),
        workspace_id: query.workspace_id,
        track_id: req.track_id,
        title: req.title,
        status: "draft".to_string(),
        summary: req.summary,
        created_at: now,
        updated_at: now,
    };
    diesel::insert_into(move_scenarios::table)
        .values(&scenario)
        .execute(&mut conn)?;
    Ok(Json(scenario))
}

pub async fn list_scenarios(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WorkspaceQuery>,
) -> Result<Json<Vec<MoveScenario>>, ServiceError> {
    let mut conn = state.conn.get()?;
    let rows: Vec<MoveScenario> = move_scenarios::table
        .filter(move_scenarios::workspace_id.eq(query.workspace_id))
        .order(move_scenarios::created_at.desc())
        .load(&mut conn)?;
    Ok(Json(rows))
}

pub async fn get_scenario(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<MoveScenarioDetail>, ServiceError> {
    let mut conn = state.conn.get()?;
    let scenario: MoveScenario = move_scenarios::table
        .filter(move_scenarios::id.eq(id))
        .first(&mut conn)
        .optional()?
        .ok_or(ServiceError::NotFound("SCENARIO_NOT_FOUND"))?;
    let actions: Vec<MoveScenarioAction> = move_scenario_actions::table
        .filter(move_scenario_actions::scenario_id.eq(id))
        .order(move_scenario_actions::position.asc())
        .load(&mut conn)?;
    Ok(Json(MoveScenarioDetail { scenario, actions }))
}

pub async fn set_scenario_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<SetScenarioStatusRequest>,
) -> Result<Json<MoveScenario>, ServiceError> {
    let mut conn = state.conn.get()?;
    if !SCENARIO_STATUSES.contains(&req.status.as_str()) {
        return Err(ServiceError::Validation(format!(
            "unknown scenario status: {}",
            req.status
        )));
    }
    diesel::update(move_scenarios::table.filter(move_scenarios::id.eq(id)))
        .set((
            move_scenarios::status.eq(&req.status),
            move_scenarios::updated_at.eq(Utc::now()),
        ))
        .execute(&mut conn)?;
    let scenario: MoveScenario = move_scenarios::table
        .filter(move_scenarios::id.eq(id))
        .first(&mut conn)
        .optional()?
        .ok_or(ServiceError::NotFound("SCENARIO_NOT_FOUND"))?;
    Ok(Json(scenario))
}

pub fn configure_scenarios_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/app/scenarios", get(list_scenarios).post(create_scenario))
        .route("/api/app/scenarios/team-risks", get(get_team_risk_summary))
        .route("/api/app/scenarios/suggest", post(suggest_move_scenario))
        .route("/api/app/scenarios/:id", get(get_scenario))
        .route("/api/app/scenarios/:id/status", put(set_scenario_status))
}
