use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Insertable, Identifiable)]
#[diesel(table_name = schema::workspaces)]
pub struct Workspace {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
}

pub mod schema {
    diesel::table! {
        workspaces (id) {
            id -> Uuid,
            name -> Text,
            slug -> Text,
            owner_id -> Uuid,
            created_at -> Timestamptz,
        }
    }

    diesel::table! {
        talent_employees (id) {
            id -> Uuid,
            workspace_id -> Uuid,
            name -> Text,
            position -> Nullable<Text>,
            level -> Text,
            track_id -> Nullable<Uuid>,
            track_level -> Nullable<Text>,
            is_active -> Bool,
            created_at -> Timestamptz,
            updated_at -> Timestamptz,
        }
    }

    diesel::table! {
        talent_tracks (id) {
            id -> Uuid,
            workspace_id -> Uuid,
            name -> Text,
            manager_id -> Nullable<Uuid>,
            created_at -> Timestamptz,
        }
    }

    diesel::table! {
        talent_track_levels (id) {
            id -> Uuid,
            track_id -> Uuid,
            name -> Text,
            rank -> Int4,
        }
    }

    diesel::table! {
        talent_skills (id) {
            id -> Uuid,
            workspace_id -> Uuid,
            name -> Text,
            kind -> Text,
            created_at -> Timestamptz,
        }
    }

    diesel::table! {
        talent_employee_skills (id) {
            id -> Uuid,
            employee_id -> Uuid,
            skill_id -> Uuid,
            level -> Int4,
            updated_at -> Timestamptz,
        }
    }

    diesel::table! {
        talent_skill_ratings (id) {
            id -> Uuid,
            workspace_id -> Uuid,
            employee_id -> Uuid,
            skill_id -> Uuid,
            source -> Text,
            level -> Int4,
            rated_at -> Timestamptz,
        }
    }

    diesel::table! {
        talent_role_profiles (id) {
            id -> Uuid,
            workspace_id -> Uuid,
            name -> Text,
            track_id -> Nullable<Uuid>,
            is_leadership -> Bool,
            created_at -> Timestamptz,
        }
    }

    diesel::table! {
        talent_role_requirements (id) {
            id -> Uuid,
            role_profile_id -> Uuid,
            skill_id -> Uuid,
            required_level -> Int4,
            importance -> Int4,
            must_have -> Bool,
        }
    }

    diesel::table! {
        talent_role_assignments (id) {
            id -> Uuid,
            workspace_id -> Uuid,
            employee_id -> Uuid,
            role_profile_id -> Uuid,
            is_primary -> Bool,
            assigned_at -> Timestamptz,
        }
    }

    diesel::table! {
        risk_cases (id) {
            id -> Uuid,
            workspace_id -> Uuid,
            employee_id -> Uuid,
            level -> Text,
            status -> Text,
            source -> Text,
            reason -> Text,
            recommendation -> Nullable<Text>,
            owner_id -> Nullable<Uuid>,
            resolved_at -> Nullable<Timestamptz>,
            resolution_note -> Nullable<Text>,
            created_at -> Timestamptz,
            updated_at -> Timestamptz,
        }
    }

    diesel::table! {
        move_scenarios (id) {
            id -> Uuid,
            workspace_id -> Uuid,
            track_id -> Nullable<Uuid>,
            title -> Text,
            status -> Text,
            summary -> Nullable<Text>,
            created_at -> Timestamptz,
            updated_at -> Timestamptz,
        }
    }

    diesel::table! {
        move_scenario_actions (id) {
            id -> Uuid,
            scenario_id -> Uuid,
            action_type -> Text,
            role_name -> Text,
            employee_id -> Nullable<Uuid>,
            priority -> Text,
            estimated_cost -> Float8,
            estimated_months -> Nullable<Int4>,
            rationale -> Text,
            position -> Int4,
        }
    }

    diesel::table! {
        pilot_runs (id) {
            id -> Uuid,
            workspace_id -> Uuid,
            name -> Text,
            objective -> Nullable<Text>,
            status -> Text,
            starts_on -> Nullable<Date>,
            ends_on -> Nullable<Date>,
            created_at -> Timestamptz,
            updated_at -> Timestamptz,
        }
    }

    diesel::table! {
        pilot_run_steps (id) {
            id -> Uuid,
            pilot_run_id -> Uuid,
            title -> Text,
            position -> Int4,
            status -> Text,
            completed_at -> Nullable<Timestamptz>,
        }
    }

    diesel::table! {
        pilot_run_participants (id) {
            id -> Uuid,
            pilot_run_id -> Uuid,
            employee_id -> Uuid,
            role -> Nullable<Text>,
            joined_at -> Timestamptz,
        }
    }

    diesel::table! {
        pilot_run_notes (id) {
            id -> Uuid,
            pilot_run_id -> Uuid,
            author_id -> Nullable<Uuid>,
            body -> Text,
            created_at -> Timestamptz,
        }
    }

    diesel::table! {
        assessment_cycles (id) {
            id -> Uuid,
            workspace_id -> Uuid,
            name -> Text,
            status -> Text,
            opens_on -> Nullable<Date>,
            closes_on -> Nullable<Date>,
            created_at -> Timestamptz,
        }
    }

    diesel::table! {
        assessment_cycle_participants (id) {
            id -> Uuid,
            cycle_id -> Uuid,
            employee_id -> Uuid,
            self_status -> Text,
            manager_status -> Text,
            final_status -> Text,
        }
    }

    diesel::table! {
        skill_assessments (id) {
            id -> Uuid,
            cycle_id -> Uuid,
            employee_id -> Uuid,
            skill_id -> Uuid,
            self_level -> Nullable<Int4>,
            manager_level -> Nullable<Int4>,
            final_level -> Nullable<Int4>,
        }
    }

    diesel::table! {
        quests (id) {
            id -> Uuid,
            workspace_id -> Uuid,
            title -> Text,
            description -> Nullable<Text>,
            status -> Text,
            due_on -> Nullable<Date>,
            created_at -> Timestamptz,
            updated_at -> Timestamptz,
        }
    }

    diesel::table! {
        talent_decisions (id) {
            id -> Uuid,
            workspace_id -> Uuid,
            employee_id -> Uuid,
            decision_type -> Text,
            quarter -> Text,
            rationale -> Text,
            decided_by -> Nullable<Uuid>,
            status -> Text,
            created_at -> Timestamptz,
        }
    }

    diesel::table! {
        notifications (id) {
            id -> Uuid,
            workspace_id -> Uuid,
            recipient_id -> Uuid,
            kind -> Text,
            title -> Text,
            body -> Nullable<Text>,
            read_at -> Nullable<Timestamptz>,
            created_at -> Timestamptz,
        }
    }

    diesel::table! {
        one_on_ones (id) {
            id -> Uuid,
            workspace_id -> Uuid,
            manager_id -> Uuid,
            employee_id -> Uuid,
            scheduled_at -> Timestamptz,
            status -> Text,
            agenda -> Nullable<Text>,
            created_at -> Timestamptz,
        }
    }

    diesel::table! {
        development_goals (id) {
            id -> Uuid,
            workspace_id -> Uuid,
            employee_id -> Uuid,
            title -> Text,
            status -> Text,
            due_on -> Nullable<Date>,
            created_at -> Timestamptz,
            updated_at -> Timestamptz,
        }
    }

    diesel::table! {
        quarterly_reports (id) {
            id -> Uuid,
            workspace_id -> Uuid,
            track_id -> Nullable<Uuid>,
            quarter -> Text,
            summary -> Text,
            created_at -> Timestamptz,
        }
    }

    diesel::table! {
        survey_responses (id) {
            id -> Uuid,
            workspace_id -> Uuid,
            survey_name -> Text,
            employee_id -> Uuid,
            status -> Text,
            requested_at -> Timestamptz,
            submitted_at -> Nullable<Timestamptz>,
        }
    }
}

pub use schema::*;
