//! Error-kind to status-code mapping for the REST boundary.
//!
//! Validation, unsupported-provider, and configuration failures are the
//! caller's to correct (400); anything raised by a delegated upstream call is
//! reported as 502 with the upstream's message. No retries happen here.

use axum::Json;
use axum::http::StatusCode;

use super::dto::ErrorResponse;
use crate::application::graph::GraphError;
use crate::application::rag::RagError;
use crate::domain::types::RequestError;
use crate::infrastructure::model::LlmError;

pub(crate) type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(body: ErrorResponse) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(body))
}

fn bad_gateway(body: ErrorResponse) -> ApiError {
    (StatusCode::BAD_GATEWAY, Json(body))
}

pub(crate) fn request_error(error: RequestError) -> ApiError {
    match error {
        RequestError::UnsupportedProvider { .. } => {
            bad_request(ErrorResponse::message(&error))
        }
        RequestError::Invalid { ref errors } => {
            bad_request(ErrorResponse::with_fields(&error, errors.clone()))
        }
    }
}

pub(crate) fn llm_error(error: LlmError) -> ApiError {
    match error {
        LlmError::Request(request) => request_error(request),
        LlmError::Configuration { .. } => bad_request(ErrorResponse::message(&error)),
        LlmError::Upstream { .. } => bad_gateway(ErrorResponse::message(&error)),
    }
}

pub(crate) fn rag_error(error: RagError) -> ApiError {
    match error {
        RagError::Request(request) => request_error(request),
        RagError::Configuration { .. } => bad_request(ErrorResponse::message(&error)),
        RagError::Vector(_) => bad_gateway(ErrorResponse::message(&error)),
    }
}

pub(crate) fn graph_error(error: GraphError) -> ApiError {
    match error {
        GraphError::Request(request) => request_error(request),
        GraphError::Configuration { .. } => bad_request(ErrorResponse::message(&error)),
        GraphError::Db(_) => bad_gateway(ErrorResponse::message(&error)),
    }
}
