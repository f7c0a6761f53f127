//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use aqrobloom_domain::error::{FacilityError, NotFoundError};

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`FacilityError`] to an HTTP response with appropriate status code.
#[derive(Debug)]
pub struct ApiError(FacilityError);

impl From<FacilityError> for ApiError {
    fn from(err: FacilityError) -> Self {
        Self(err)
    }
}

impl From<NotFoundError> for ApiError {
    fn from(err: NotFoundError) -> Self {
        Self(FacilityError::NotFound(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            FacilityError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string()),
            FacilityError::Unavailable => {
                tracing::warn!("request rejected, facility engine unavailable");
                (StatusCode::SERVICE_UNAVAILABLE, self.0.to_string())
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
