pub mod ssl;
pub mod sunrise;

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use sunrise_core::{Redirect, SunriseError};

use crate::SunriseAxumError;

/// Answer with the redirect's status and `Location` header.
pub fn redirect_response(redirect: &Redirect) -> Response {
    let status = StatusCode::from_u16(redirect.status).unwrap_or(StatusCode::MOVED_PERMANENTLY);
    match HeaderValue::from_str(&redirect.location) {
        Ok(location) => (status, [(header::LOCATION, location)]).into_response(),
        Err(_) => SunriseAxumError::from(SunriseError::general_error(format!(
            "Invalid redirect location: {}",
            redirect.location
        )))
        .into_response(),
    }
}
