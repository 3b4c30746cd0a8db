use crate::domain::types::{FieldError, Provider};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ProviderListResponse {
    pub providers: Vec<Provider>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldError>>,
}

impl ErrorResponse {
    pub fn message(error: impl ToString) -> Self {
        Self {
            error: error.to_string(),
            fields: None,
        }
    }

    pub fn with_fields(error: impl ToString, fields: Vec<FieldError>) -> Self {
        Self {
            error: error.to_string(),
            fields: Some(fields),
        }
    }
}
