//! Error handling middleware - RFC 7807 compliant responses.

use actix_web::{HttpRequest, HttpResponse, ResponseError, error, http::StatusCode, web};
use quill_core::DomainError;
use quill_shared::ErrorResponse;
use std::fmt;

use crate::observability::RequestContext;

/// Application-level error type that converts to RFC 7807 responses.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Internal(String),
    /// The request deadline passed before storage answered.
    Timeout,
}

impl AppError {
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
            AppError::Timeout => write!(f, "Request timed out"),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Timeout => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error = match self {
            AppError::NotFound(detail) => ErrorResponse::not_found(detail),
            AppError::BadRequest(detail) => ErrorResponse::bad_request(detail),
            // Storage details stay in the logs
            AppError::Internal(_) => ErrorResponse::internal_error(),
            AppError::Timeout => ErrorResponse::service_unavailable("request timed out"),
        };

        HttpResponse::build(self.status_code()).json(error)
    }
}

// Conversion from domain errors
impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => AppError::BadRequest(msg),
            DomainError::NotFound { entity_type, key } => {
                AppError::NotFound(format!("no {} found for {}", entity_type, key))
            }
            DomainError::Storage(e) => AppError::Internal(e.to_string()),
        }
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;

/// JSON body settings: any content type, failures become logged 400s.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .content_type_required(false)
        .error_handler(|err: error::JsonPayloadError, req: &HttpRequest| {
            let err = AppError::BadRequest(format!("unable to parse request body: {}", err));
            RequestContext::of(req).fail(err).into()
        })
}

/// Query string settings: unknown or malformed parameters become logged 400s.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err: error::QueryPayloadError, req: &HttpRequest| {
        let err = AppError::BadRequest(format!("invalid request made: {}: {}", req.uri(), err));
        RequestContext::of(req).fail(err).into()
    })
}

#[cfg(test)]
mod tests {
    use quill_core::RepoError;

    use super::*;

    #[test]
    fn domain_errors_map_to_statuses() {
        let cases = [
            (DomainError::validation("title exceeds 150 characters."), 400),
            (DomainError::not_found("post", "id 7"), 404),
            (DomainError::Storage(RepoError::Query("boom".into())), 500),
            (
                DomainError::Storage(RepoError::NoRowsAffected("insert")),
                500,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(AppError::from(err).status_code().as_u16(), status);
        }
        assert_eq!(AppError::Timeout.status_code().as_u16(), 503);
    }

    #[test]
    fn not_found_names_the_missing_entity() {
        let err = AppError::from(DomainError::not_found("post", "id 7"));
        assert_eq!(err.to_string(), "Not found: no post found for id 7");
    }

    #[test]
    fn internal_details_are_not_exposed() {
        let err = AppError::from(DomainError::Storage(RepoError::Query("secret".into())));
        assert!(err.is_server_error());
        let resp = err.error_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
