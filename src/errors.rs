use actix_web::http::StatusCode;
use actix_web::http::header::ContentType;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::render::RenderError;

/// Everything that can go wrong while serving a request.
///
/// The table widget only knows one failure shape, so every variant is
/// answered with the same opaque 503. The variants exist for the logs.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("invalid datatables {param} parameter: {value:?}")]
    InvalidParam { param: &'static str, value: String },

    #[error("malformed query string: {0}")]
    Query(#[from] actix_web::error::QueryPayloadError),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("blocking task error: {0}")]
    Task(#[from] actix_web::error::BlockingError),

    #[error("error encoding json response: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("error executing template: {0}")]
    Template(#[from] RenderError),
}

// TODO: answer InvalidParam and Query with a 400 once the table widget stops
// treating every non-200 the same way.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        StatusCode::SERVICE_UNAVAILABLE
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .content_type(ContentType::plaintext())
            .body("Internal server error")
    }
}
