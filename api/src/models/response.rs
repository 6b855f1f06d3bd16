use serde::Serialize;
use validator::ValidationErrors;

#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub success: bool,
    pub message: String,
}

impl ApiErrorResponse {
    pub fn new(message: String) -> Self {
        Self {
            success: false,
            message,
        }
    }
}

/// 422 body, with the per-field failures under `details`.
#[derive(Serialize)]
pub struct ValidationErrorResponse {
    pub success: bool,
    pub message: String,
    pub details: ValidationErrors,
}

impl From<ValidationErrors> for ValidationErrorResponse {
    fn from(details: ValidationErrors) -> Self {
        Self {
            success: false,
            message: "Validation error".to_string(),
            details,
        }
    }
}
