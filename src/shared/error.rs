use axum::{response::IntoResponse, Json};

/// Service-level errors carry machine-readable codes; the API layer renders
/// them as the `{ "error": { "code", "message" } }` envelope.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Not found: {0}")]
    NotFound(&'static str),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Feature not available: {0}")]
    NotAvailable(&'static str),
    #[error("Database error: {0}")]
    Database(String),
    #[error("Connection error: {0}")]
    Connection(String),
}

impl ServiceError {
    pub fn code(&self) -> &str {
        match self {
            Self::NotFound(code) | Self::NotAvailable(code) => code,
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Connection(_) => "CONNECTION_ERROR",
        }
    }
}

impl From<diesel::result::Error> for ServiceError {
    fn from(err: diesel::result::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<diesel::r2d2::PoolError> for ServiceError {
    fn from(err: diesel::r2d2::PoolError) -> Self {
        Self::Connection(err.to_string())
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;
        let status = match &self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotAvailable(_) => StatusCode::CONFLICT,
            Self::Database(_) | Self::Connection(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(serde_json::json!({
            "error": { "code": self.code(), "message": self.to_string() }
        }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_stay_machine_readable() {
        assert_eq!(ServiceError::NotFound("EMPLOYEE_NOT_FOUND").code(), "EMPLOYEE_NOT_FOUND");
        assert_eq!(
            ServiceError::NotAvailable("RISK_CASES_NOT_AVAILABLE").code(),
            "RISK_CASES_NOT_AVAILABLE"
        );
        assert_eq!(ServiceError::Validation("bad level".into()).code(), "VALIDATION_ERROR");
    }
}
