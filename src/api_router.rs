//! Combines all API endpoints from the feature modules into a unified router.

use axum::Router;
use std::sync::Arc;

use crate::shared::state::AppState;

/// Configure all API routes from all modules
pub fn configure_api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(crate::workspaces::configure_workspaces_routes())
        .merge(crate::talent::configure_talent_routes())
        .merge(crate::skills::configure_skills_routes())
        .merge(crate::analytics::configure_analytics_routes())
        .merge(crate::risk::configure_risk_routes())
        .merge(crate::agenda::configure_agenda_routes())
        .merge(crate::scenarios::configure_scenarios_routes())
        .merge(crate::pilots::configure_pilots_routes())
        .merge(crate::assessments::configure_assessments_routes())
        .merge(crate::quests::configure_quests_routes())
        .merge(crate::coaching::configure_coaching_routes())
        .merge(crate::decisions::configure_decisions_routes())
        .merge(crate::notifications::configure_notifications_routes())
}
