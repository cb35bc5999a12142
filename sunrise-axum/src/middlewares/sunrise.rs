//! Per-request multisite bootstrap.
//!
//! Resolves the site and network for the request host before any handler
//! runs. On success the [`TenantContext`], the site's [`SiteUrls`] and,
//! when configured, the [`SslPolicy`] are inserted into the request
//! extensions. All of them come from one config snapshot. Every other outcome answers the
//! request right here: canonical-domain redirects, the no-site redirect,
//! not-found and fatal configuration errors.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use sunrise_core::{Failure, Resolution, SiteUrls, SslPolicy, SunriseError, TenantContext, UrlFixer};
use tracing::{error, warn};

use super::redirect_response;
use crate::request::request_info;
use crate::{SunriseAxumError, SunriseAxumState};

pub async fn bootstrap(State(state): State<SunriseAxumState>, mut req: Request, next: Next) -> Response {
    let info = request_info(req.headers(), req.uri());
    let resolver = state.app.resolver();

    match resolver.resolve(&info).await {
        Ok(Resolution::Ready(ctx)) => {
            let settings = resolver.settings();
            let policy = SslPolicy::from_settings(settings);
            let urls = SiteUrls::new(&ctx, UrlFixer::from_settings(settings).as_ref(), policy.as_ref());
            req.extensions_mut().insert::<TenantContext>(ctx);
            req.extensions_mut().insert::<SiteUrls>(urls);
            if let Some(policy) = policy {
                req.extensions_mut().insert::<SslPolicy>(policy);
            }
            next.run(req).await
        }
        Ok(Resolution::Redirect(redirect)) => redirect_response(&redirect),
        Ok(Resolution::Skipped) => next.run(req).await,
        Err(err) => {
            let err = SunriseError::normalize(err);
            match resolver.fail_gracefully(&err) {
                Failure::Redirect(redirect) => {
                    warn!(host = %info.host, "no site found, redirecting to {}", redirect.location);
                    redirect_response(&redirect)
                }
                Failure::NotFound { domain, path } => {
                    warn!("nothing to serve for {domain}{path}: {err}");
                    SunriseAxumError::from(err).into_response()
                }
                Failure::Fatal { .. } => {
                    error!(host = %info.host, "multisite bootstrap failed: {err}");
                    SunriseAxumError::from(err).into_response()
                }
            }
        }
    }
}
