use crate::flow::error::FlowError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Errors returned from API handlers
///
/// The JSON body is what the dashboard shows in its error notification.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: &'static str,
    message: String,
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "NotFound",
            ApiError::BadRequest(_) => "BadRequest",
            ApiError::Forbidden(_) => "Forbidden",
            ApiError::Conflict(_) => "Conflict",
            ApiError::Internal(_) => "InternalError",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: self.error_type(),
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<FlowError> for ApiError {
    fn from(err: FlowError) -> Self {
        let message = err.to_string();
        match err {
            FlowError::UnknownNode(_)
            | FlowError::UnknownEdge(_)
            | FlowError::SessionNotFound(_) => ApiError::NotFound(message),
            FlowError::DuplicateNode(_) | FlowError::DuplicateEdge(_) => ApiError::Conflict(message),
            FlowError::ConnectionNotAllowed { .. }
            | FlowError::DanglingEdge { .. }
            | FlowError::EdgeIdMismatch { .. }
            | FlowError::UnknownNodeType(_) => ApiError::BadRequest(message),
            FlowError::EditModeDisabled => ApiError::Forbidden(message),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    /// Domain rejections keep their status; anything else is a storage failure
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<FlowError>() {
            Ok(flow_err) => flow_err.into(),
            Err(other) => {
                tracing::error!("❌ Request failed: {:#}", other);
                ApiError::Internal(other.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::types::NodeType;

    #[test]
    fn flow_errors_map_to_statuses() {
        let cases = [
            (FlowError::UnknownNode("x".into()), StatusCode::NOT_FOUND),
            (FlowError::SessionNotFound("s".into()), StatusCode::NOT_FOUND),
            (FlowError::DuplicateEdge("a-to-b".into()), StatusCode::CONFLICT),
            (
                FlowError::ConnectionNotAllowed {
                    from: NodeType::SolarArray,
                    to: NodeType::Consumer,
                },
                StatusCode::BAD_REQUEST,
            ),
            (FlowError::EditModeDisabled, StatusCode::FORBIDDEN),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status_code(), status);
        }
    }

    #[test]
    fn anyhow_keeps_flow_error_status() {
        let err = anyhow::Error::from(FlowError::EditModeDisabled);
        assert_eq!(ApiError::from(err).status_code(), StatusCode::FORBIDDEN);

        let err = anyhow::anyhow!("disk full");
        assert_eq!(ApiError::from(err).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
