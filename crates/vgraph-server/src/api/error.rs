//! Error responses
//!
//! Every failure becomes `{"error": {"code", "message", "entity_id"?, "branch_id"?}}`
//! with a status chosen by error kind.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use vgraph_core::{GraphError, VgError, VgErrorKind};

#[derive(Debug)]
pub struct ApiError(pub VgError);

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: &'static str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    entity_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    branch_id: Option<&'a str>,
}

#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    error: ErrorBody<'a>,
}

pub fn status_for(kind: VgErrorKind) -> StatusCode {
    match kind {
        VgErrorKind::KeyConflict | VgErrorKind::VersionConflict => StatusCode::CONFLICT,
        VgErrorKind::DanglingReference => StatusCode::UNPROCESSABLE_ENTITY,
        VgErrorKind::NotFound => StatusCode::NOT_FOUND,
        VgErrorKind::Validation => StatusCode::BAD_REQUEST,
        VgErrorKind::LimitExceeded => StatusCode::PAYLOAD_TOO_LARGE,
        VgErrorKind::Persistence
        | VgErrorKind::Serialization
        | VgErrorKind::Io
        | VgErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(self.0.kind());
        if status.is_server_error() {
            tracing::error!(component = "api", err_code = self.0.code(), "{}", self.0);
        }
        let body = ErrorEnvelope {
            error: ErrorBody {
                code: self.0.code(),
                message: self.0.message(),
                entity_id: self.0.entity_id(),
                branch_id: self.0.branch_id(),
            },
        };
        (status, Json(body)).into_response()
    }
}

impl From<GraphError> for ApiError {
    fn from(err: GraphError) -> Self {
        ApiError(err.into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(
            VgError::new(VgErrorKind::Validation)
                .with_op("decode_body")
                .with_message(rejection.body_text()),
        )
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError(
            VgError::new(VgErrorKind::Validation)
                .with_op("decode_query")
                .with_message(rejection.body_text()),
        )
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
