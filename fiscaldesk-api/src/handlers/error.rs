use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use fiscal_rules::RuleError;
use fiscaldesk_agents::AgentError;
use shared_types::ErrorResponse;
use thiserror::Error;

use crate::database::DbError;

pub const NOT_UNDERSTOOD: &str = "could not understand message";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    External(String),
    #[error("{0}")]
    Persistence(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::MissingFields(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::External(_) | ApiError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        tracing::error!(status = self.status_code().as_u16(), "{}", self);

        let missing_fields = match self {
            ApiError::MissingFields(fields) => Some(fields.clone()),
            _ => None,
        };
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
            missing_fields,
        })
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound(_) => ApiError::NotFound(err.to_string()),
            DbError::Conflict(msg) | DbError::Invalid(msg) => ApiError::Validation(msg),
            DbError::Pool(_) | DbError::Sqlite(_) => ApiError::Persistence(err.to_string()),
        }
    }
}

impl From<RuleError> for ApiError {
    fn from(err: RuleError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<AgentError> for ApiError {
    fn from(err: AgentError) -> Self {
        match err {
            AgentError::Unparseable(_) => ApiError::External(NOT_UNDERSTOOD.to_string()),
            other => ApiError::External(other.to_string()),
        }
    }
}
