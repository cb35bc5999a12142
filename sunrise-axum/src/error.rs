use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sunrise_core::errors::SunriseError;

#[derive(Debug)]
pub struct SunriseAxumError(pub anyhow::Error);

impl From<anyhow::Error> for SunriseAxumError {
    fn from(e: anyhow::Error) -> Self {
        Self(e)
    }
}

impl From<SunriseError> for SunriseAxumError {
    fn from(e: SunriseError) -> Self {
        Self(e.into_anyhow())
    }
}

impl IntoResponse for SunriseAxumError {
    fn into_response(self) -> Response {
        // Anything that isn't a SunriseError goes out as a GeneralError
        let safe = SunriseError::normalize(self.0).sanitize_for_client();
        let status = StatusCode::from_u16(safe.code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(safe.to_json())).into_response()
    }
}
