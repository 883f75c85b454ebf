use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;

use crate::error::AppError;

/// `Json` whose rejections come back as `{"error","code"}` with status 422
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(err) => {
                AppError::InvalidInput(format!("Invalid request body: {}", err.body_text()))
            }
            JsonRejection::JsonSyntaxError(err) => {
                AppError::InvalidInput(format!("JSON syntax error: {}", err.body_text()))
            }
            JsonRejection::MissingJsonContentType(_) => AppError::InvalidInput(
                "Missing `Content-Type: application/json` header".to_string(),
            ),
            JsonRejection::BytesRejection(_) => {
                AppError::Internal("Failed to read request body".to_string())
            }
            _ => AppError::InvalidInput(rejection.body_text()),
        }
    }
}
