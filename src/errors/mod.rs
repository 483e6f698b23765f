pub mod api;
pub mod auth;
pub mod read;
pub mod thermostat;
pub mod validation;

pub use api::ApiError;
pub use auth::AuthError;
pub use read::ReadError;
pub use thermostat::ThermostatError;
pub use validation::FieldErrors;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use uuid::Uuid;

/// `{"success": false, "error": {field: [reasons]}}` with 422.
fn render_errors(errors: &FieldErrors) -> Response {
    let body = Json(json!({
        "success": false,
        "error": errors,
    }));

    (StatusCode::UNPROCESSABLE_ENTITY, body).into_response()
}

/// `{"success": false, "error": "unauthorized"}` with 401, the same body for
/// every authorization failure.
fn render_unauthorized() -> Response {
    let body = Json(json!({
        "success": false,
        "error": "unauthorized",
    }));

    (StatusCode::UNAUTHORIZED, body).into_response()
}

/// `{"success": false}` with 404, no hint at what is missing.
fn render_not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "success": false }))).into_response()
}

/// `{"success": false}` with 500. The cause stays in the log, tagged with an
/// error id to correlate against client reports.
fn render_internal(error: impl std::fmt::Display) -> Response {
    let error_id = Uuid::new_v4();
    tracing::error!(error_id = ?error_id, "Internal error: {}", error);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "success": false })),
    )
        .into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::AuthError(_) => render_unauthorized(),
            ApiError::ThermostatError(e) => match e {
                ThermostatError::ThermostatNotFound => render_not_found(),
                ThermostatError::Invalid(errors) => render_errors(&errors),
            },
            ApiError::ReadError(e) => match e {
                ReadError::Invalid(errors) => render_errors(&errors),
                ReadError::ReadNotFound | ReadError::ThermostatMissing => render_not_found(),
                ReadError::Database(e) => render_internal(e),
            },
            ApiError::DatabaseError(e) => render_internal(e),
        }
    }
}
