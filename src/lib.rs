pub mod agenda;
pub mod analytics;
pub mod api_router;
pub mod assessments;
pub mod coaching;
pub mod config;
pub mod decisions;
pub mod notifications;
pub mod pilots;
pub mod quests;
pub mod risk;
pub mod scenarios;
pub mod shared;
pub mod skills;
pub mod talent;
pub mod workspaces;
