mod error;
mod extractor;
mod init;

pub mod models;
pub mod routers;

pub use error::ApiError;
pub use init::{setup_config, setup_db, setup_router};
use serde::Serialize;

/// Envelope for every successful JSON response. Failures use
/// [`crate::models::response::ApiErrorResponse`].
#[derive(Serialize, Debug)]
pub struct ApiResponse<T: Serialize> {
    success: bool,
    message: String,
    data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: &str, data: Option<T>) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            data,
        }
    }
}
