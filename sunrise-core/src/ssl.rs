//! Which sites must be served over HTTPS, and the redirect/rewrite that follows.

use std::borrow::Cow;

use tracing::debug;

use crate::config::MultisiteSettings;
use crate::request::{Redirect, RequestInfo};
use crate::resolver::normalize_host;
use crate::tenant::TenantContext;

/// HTTPS-only networks and sites, matched by id or domain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SslPolicy {
    pub global: bool,
    pub networks: Vec<String>,
    pub sites: Vec<String>,
}

impl SslPolicy {
    /// Active only for multisite installs with at least one SSL key configured.
    pub fn from_settings(settings: &MultisiteSettings) -> Option<Self> {
        if !settings.multisite || !settings.ssl_configured {
            return None;
        }
        Some(Self {
            global: settings.ssl_global.unwrap_or(false),
            networks: settings.ssl_networks.clone(),
            sites: settings.ssl_sites.clone(),
        })
    }

    pub fn is_ssl_site(&self, ctx: &TenantContext) -> bool {
        if self.global {
            return true;
        }

        let network_id = ctx.network.id.to_string();
        if self
            .networks
            .iter()
            .any(|n| *n == network_id || *n == ctx.network.domain)
        {
            return true;
        }

        let site_id = ctx.site.id.to_string();
        self.sites.iter().any(|s| *s == site_id || *s == ctx.site.domain)
    }

    /// Flag the context for HTTPS admin/login and, if the request came in
    /// over plain HTTP, return the redirect to its HTTPS twin.
    pub fn enforce(&self, ctx: &mut TenantContext, request: &RequestInfo) -> Option<Redirect> {
        if !self.is_ssl_site(ctx) {
            return None;
        }

        ctx.force_ssl_admin = true;
        ctx.force_ssl_login = true;
        if request.secure {
            return None;
        }

        debug!(site = %ctx.site.id, "redirecting to https");
        Some(Redirect::permanent(format!(
            "https://{}{}",
            normalize_host(&request.host),
            request.request_uri
        )))
    }

    /// Rewrite `http://<site domain>` links to `https://` for HTTPS sites.
    pub fn make_url_https<'a>(&self, ctx: &TenantContext, content: &'a str) -> Cow<'a, str> {
        if !self.is_ssl_site(ctx) || ctx.site.domain.is_empty() {
            return Cow::Borrowed(content);
        }

        let insecure = format!("http://{}", ctx.site.domain);
        if !content.contains(&insecure) {
            return Cow::Borrowed(content);
        }
        Cow::Owned(content.replace(&insecure, &format!("https://{}", ctx.site.domain)))
    }
}
