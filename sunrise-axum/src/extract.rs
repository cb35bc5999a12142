use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use sunrise_core::{SiteUrls, SunriseError, TenantContext};

use crate::SunriseAxumError;

/// The site and network resolved for this request.
///
/// Rejects with a 500 when the bootstrap layer is not installed or was skipped.
#[derive(Debug, Clone)]
pub struct CurrentSite(pub TenantContext);

impl<S> FromRequestParts<S> for CurrentSite
where
    S: Send + Sync,
{
    type Rejection = SunriseAxumError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<TenantContext>()
            .cloned()
            .map(CurrentSite)
            .ok_or_else(|| SunriseError::general_error("No site resolved for this request").into())
    }
}

/// Home and site URLs of the current site.
#[derive(Debug, Clone)]
pub struct CurrentUrls(pub SiteUrls);

impl<S> FromRequestParts<S> for CurrentUrls
where
    S: Send + Sync,
{
    type Rejection = SunriseAxumError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SiteUrls>()
            .cloned()
            .map(CurrentUrls)
            .ok_or_else(|| SunriseError::general_error("No site resolved for this request").into())
    }
}
