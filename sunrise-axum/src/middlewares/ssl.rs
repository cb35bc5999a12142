//! HTTPS enforcement for the sites configured as HTTPS-only.
//!
//! Both layers run inside [`bootstrap`](super::sunrise::bootstrap) and use
//! the [`SslPolicy`] it left in the request extensions. Without one, or
//! without a resolved site, they do nothing.

use axum::body::{to_bytes, Body, HttpBody};
use axum::extract::Request;
use axum::http::header;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use sunrise_core::{SslPolicy, SunriseError, TenantContext};
use tracing::warn;

use super::redirect_response;
use crate::request::request_info;
use crate::SunriseAxumError;

/// Largest body `https_links` will buffer for rewriting.
pub const MAX_REWRITE_BYTES: usize = 8 * 1024 * 1024;

/// Redirect plain-HTTP requests for HTTPS-only sites to their `https://` URL.
pub async fn enforce_https(mut req: Request, next: Next) -> Response {
    let Some(policy) = req.extensions().get::<SslPolicy>().cloned() else {
        return next.run(req).await;
    };

    let info = request_info(req.headers(), req.uri());
    if let Some(ctx) = req.extensions_mut().get_mut::<TenantContext>() {
        if let Some(redirect) = policy.enforce(ctx, &info) {
            return redirect_response(&redirect);
        }
    }

    next.run(req).await
}

/// Upgrade `http://<site domain>` links in textual responses of HTTPS-only sites.
///
/// Bodies of unknown length or larger than [`MAX_REWRITE_BYTES`] are passed
/// through untouched.
pub async fn https_links(req: Request, next: Next) -> Response {
    let policy = req.extensions().get::<SslPolicy>().cloned();
    let ctx = req.extensions().get::<TenantContext>().cloned();

    let res = next.run(req).await;

    let (Some(policy), Some(ctx)) = (policy, ctx) else {
        return res;
    };
    if !policy.is_ssl_site(&ctx) || !is_text(&res) || !fits_in_buffer(&res) {
        return res;
    }

    let (mut parts, body) = res.into_parts();
    let bytes = match to_bytes(body, MAX_REWRITE_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(site = %ctx.site.id, "failed to read response body: {e}");
            return SunriseAxumError::from(
                SunriseError::general_error("Failed to read response body").with_source(anyhow::Error::new(e)),
            )
            .into_response();
        }
    };

    let body = match std::str::from_utf8(&bytes) {
        Ok(text) => {
            let rewritten = policy.make_url_https(&ctx, text).into_owned();
            parts.headers.remove(header::CONTENT_LENGTH);
            Body::from(rewritten)
        }
        Err(_) => Body::from(bytes),
    };

    Response::from_parts(parts, body)
}

fn is_text(res: &Response) -> bool {
    res.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("text/") || ct.starts_with("application/json"))
}

fn fits_in_buffer(res: &Response) -> bool {
    let declared = res
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());
    let len = declared.or_else(|| res.body().size_hint().upper());

    len.is_some_and(|len| len <= MAX_REWRITE_BYTES as u64)
}
