use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub features: FeatureFlags,
    pub scenario: ScenarioParams,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub username: String,
    pub password: String,
    pub server: String,
    pub port: u32,
    pub database: String,
}

/// Schema-dependent features are gated explicitly instead of probing the
/// database and string-matching "relation does not exist" errors.
#[derive(Debug, Clone)]
pub struct FeatureFlags {
    pub risk_cases: bool,
    pub surveys: bool,
}

/// Heuristic knobs for the move-scenario generator. The defaults are
/// illustrative planning values, not validated business figures; deployments
/// tune them via environment.
#[derive(Debug, Clone)]
pub struct ScenarioParams {
    pub base_hire_cost: f64,
    pub leadership_hire_multiplier: f64,
    pub priority_hire_multiplier: f64,
    pub develop_cost_per_month: f64,
    pub internal_candidate_gap_threshold: i32,
    pub short_gap_months: i32,
    pub long_gap_months: i32,
    pub max_teams_per_summary: usize,
    pub max_candidates_per_role: usize,
}

impl Default for ScenarioParams {
    fn default() -> Self {
        Self {
            base_hire_cost: 50_000.0,
            leadership_hire_multiplier: 1.5,
            priority_hire_multiplier: 1.2,
            develop_cost_per_month: 3_000.0,
            internal_candidate_gap_threshold: 6,
            short_gap_months: 6,
            long_gap_months: 12,
            max_teams_per_summary: 5,
            max_candidates_per_role: 2,
        }
    }
}

fn get_str(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn get_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn get_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .map(|v| v.to_lowercase() == "true" || v == "1")
        .unwrap_or(default)
}

impl AppConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let database = DatabaseConfig {
            username: get_str("TABLES_USERNAME", "quadrant"),
            password: get_str("TABLES_PASSWORD", ""),
            server: get_str("TABLES_SERVER", "localhost"),
            port: get_parsed("TABLES_PORT", 5432u32),
            database: get_str("TABLES_DATABASE", "quadrant"),
        };
        let defaults = ScenarioParams::default();
        Ok(AppConfig {
            server: ServerConfig {
                host: get_str("SERVER_HOST", "127.0.0.1"),
                port: get_parsed("SERVER_PORT", 8080u16),
            },
            database,
            features: FeatureFlags {
                risk_cases: get_bool("FEATURE_RISK_CASES", true),
                surveys: get_bool("FEATURE_SURVEYS", true),
            },
            scenario: ScenarioParams {
                base_hire_cost: get_parsed("SCENARIO_BASE_HIRE_COST", defaults.base_hire_cost),
                leadership_hire_multiplier: get_parsed(
                    "SCENARIO_LEADERSHIP_MULTIPLIER",
                    defaults.leadership_hire_multiplier,
                ),
                priority_hire_multiplier: get_parsed(
                    "SCENARIO_PRIORITY_MULTIPLIER",
                    defaults.priority_hire_multiplier,
                ),
                develop_cost_per_month: get_parsed(
                    "SCENARIO_DEVELOP_COST_PER_MONTH",
                    defaults.develop_cost_per_month,
                ),
                internal_candidate_gap_threshold: get_parsed(
                    "SCENARIO_GAP_THRESHOLD",
                    defaults.internal_candidate_gap_threshold,
                ),
                short_gap_months: defaults.short_gap_months,
                long_gap_months: defaults.long_gap_months,
                max_teams_per_summary: defaults.max_teams_per_summary,
                max_candidates_per_role: defaults.max_candidates_per_role,
            },
        })
    }

    pub fn database_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.database.username,
            self.database.password,
            self.database.server,
            self.database.port,
            self.database.database
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_defaults_match_documented_values() {
        let params = ScenarioParams::default();
        assert_eq!(params.base_hire_cost, 50_000.0);
        assert_eq!(params.internal_candidate_gap_threshold, 6);
        assert_eq!(params.short_gap_months, 6);
        assert_eq!(params.long_gap_months, 12);
        assert_eq!(params.max_teams_per_summary, 5);
    }
}
