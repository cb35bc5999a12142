//! Sunrise: map a request host onto its site and network.
//!
//! Only subdomain installs are supported. Resolution runs once per request:
//!
//! 1. normalize the host and build the candidate domains
//!    (`www.` stripped, or `www.` added for bare two-label domains)
//! 2. look up the site with the longest matching domain at `/`,
//!    falling back to a network lookup with the same candidates
//! 3. redirect when the match lives on a different domain than requested
//! 4. fill in the network's main site id, memoized in the object cache

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::cache::ObjectCache;
use crate::config::MultisiteSettings;
use crate::errors::{ErrorKind, SunriseError, SunriseResult};
use crate::model::{Network, NetworkId, Site, SiteId};
use crate::request::{Redirect, RequestInfo};
use crate::store::{NetworkQuery, SiteQuery, SiteStore};
use crate::tenant::TenantContext;

const MAIN_SITE_CACHE_GROUP: &str = "site-options";

/// Outcome of a successful bootstrap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Site and network are known; hand the context downstream.
    Ready(TenantContext),
    /// The host is served canonically from another domain.
    Redirect(Redirect),
    /// Multisite is off, nothing to resolve.
    Skipped,
}

/// What to do once resolution has failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    Redirect(Redirect),
    NotFound { domain: String, path: String },
    Fatal { status: u16, message: String },
}

pub struct SiteResolver {
    settings: MultisiteSettings,
    store: Arc<dyn SiteStore>,
    cache: Arc<dyn ObjectCache>,
}

impl SiteResolver {
    pub fn new(settings: MultisiteSettings, store: Arc<dyn SiteStore>, cache: Arc<dyn ObjectCache>) -> Self {
        Self { settings, store, cache }
    }

    pub fn settings(&self) -> &MultisiteSettings {
        &self.settings
    }

    #[instrument(skip(self, request), fields(host = %request.host))]
    pub async fn resolve(&self, request: &RequestInfo) -> SunriseResult<Resolution> {
        if !self.settings.multisite {
            return Ok(Resolution::Skipped);
        }

        if !self.settings.subdomain_install {
            crate::bail_sunrise!(unsupported_installation);
        }

        if self.settings.installing {
            debug!("installing, using placeholder site and network");
            return Ok(Resolution::Ready(TenantContext::installing()));
        }

        let domain = normalize_host(&request.host);
        if domain.is_empty() {
            crate::bail_sunrise!(bad_request, "Request has no host");
        }
        let domains = candidate_domains(&domain);

        let mut site = self.detect_site(&domains).await;
        let network = match site.as_mut() {
            Some(site) => {
                if site.domain != domain {
                    debug!(canonical = %site.domain, "redirecting to site domain");
                    return Ok(Resolution::Redirect(canonical_redirect(request, &site.domain)));
                }
                if site.network_id.is_unset() {
                    site.network_id = NetworkId::PRIMARY;
                }
                self.network_by_id(site.network_id).await
            }
            None => {
                let network = self.detect_network(&domains).await;
                if let Some(network) = &network {
                    if network.domain != domain {
                        debug!(canonical = %network.domain, "redirecting to network domain");
                        return Ok(Resolution::Redirect(canonical_redirect(request, &network.domain)));
                    }
                }
                network
            }
        };

        let Some(mut network) = network else {
            return Err(SunriseError::network_not_found(domain).into_anyhow());
        };
        let Some(site) = site else {
            return Err(SunriseError::site_not_found(domain).into_anyhow());
        };

        if network.main_site_id.is_none() {
            network.main_site_id = if site.is_root_of(&network) {
                Some(site.id)
            } else {
                self.detect_main_site_id(&network).await
            };
        }

        debug!(site = %site.id, network = %network.id, "resolved");
        Ok(Resolution::Ready(TenantContext::new(site, network)))
    }

    async fn detect_site(&self, domains: &[String]) -> Option<Site> {
        let query = SiteQuery::new()
            .domain_in(domains.iter().cloned())
            .path("/")
            .longest_domain_first()
            .limit(1);

        match self.store.find_sites(&query).await {
            Ok(sites) => sites.into_iter().next(),
            Err(e) => {
                warn!("site lookup failed: {e}");
                None
            }
        }
    }

    async fn network_by_id(&self, id: NetworkId) -> Option<Network> {
        self.store.get_network(id).await.unwrap_or_else(|e| {
            warn!("network {id} lookup failed: {e}");
            None
        })
    }

    async fn detect_network(&self, domains: &[String]) -> Option<Network> {
        let query = NetworkQuery::new()
            .domain_in(domains.iter().cloned())
            .path("/")
            .longest_domain_first()
            .limit(1);

        match self.store.find_networks(&query).await {
            Ok(networks) => networks.into_iter().next(),
            Err(e) => {
                warn!("network lookup failed: {e}");
                None
            }
        }
    }

    async fn detect_main_site_id(&self, network: &Network) -> Option<SiteId> {
        let key = format!("network:{}:main_site", network.id);

        let cached = self
            .cache
            .get(MAIN_SITE_CACHE_GROUP, &key)
            .await
            .and_then(|v| v.parse::<u64>().ok());

        let id = match cached {
            Some(id) => id,
            None => {
                let query = SiteQuery::new()
                    .domain(network.domain.clone())
                    .path(network.path.clone())
                    .network(network.id)
                    .limit(1);

                let id = match self.store.find_sites(&query).await {
                    Ok(sites) => sites.first().map_or(0, |s| s.id.0),
                    Err(e) => {
                        warn!("main site lookup for network {} failed: {e}", network.id);
                        0
                    }
                };
                self.cache.add(MAIN_SITE_CACHE_GROUP, &key, id.to_string()).await;
                id
            }
        };

        (id != 0).then_some(SiteId(id))
    }

    /// Decide how a failed resolution ends the request.
    pub fn fail_gracefully(&self, err: &SunriseError) -> Failure {
        fail_gracefully(&self.settings, err)
    }
}

/// Decide how a failed resolution ends the request.
///
/// Unknown networks are always "not found". Unknown sites go to the
/// configured no-site redirect when there is one.
pub fn fail_gracefully(settings: &MultisiteSettings, err: &SunriseError) -> Failure {
    let domain = err.domain.clone().unwrap_or_default();
    match err.kind {
        ErrorKind::NetworkNotFound => Failure::NotFound {
            domain,
            path: "/".to_string(),
        },
        ErrorKind::SiteNotFound => match settings.no_blog_redirect() {
            Some(url) => Failure::Redirect(Redirect::found(url)),
            None => Failure::NotFound {
                domain,
                path: "/".to_string(),
            },
        },
        _ => Failure::Fatal {
            status: err.code(),
            message: err.message.clone(),
        },
    }
}

/// Lowercase the host, drop stray backslashes and a default port.
pub fn normalize_host(host: &str) -> String {
    let domain = host.replace('\\', "").trim().to_lowercase();
    if let Some(stripped) = domain.strip_suffix(":80") {
        return stripped.to_string();
    }
    if let Some(stripped) = domain.strip_suffix(":443") {
        return stripped.to_string();
    }
    domain
}

/// The domain itself plus its `www.` twin, when it has one.
pub fn candidate_domains(domain: &str) -> Vec<String> {
    let mut domains = vec![domain.to_string()];
    if let Some(bare) = domain.strip_prefix("www.") {
        domains.push(bare.to_string());
    } else if domain.matches('.').count() == 1 {
        domains.push(format!("www.{domain}"));
    }
    domains
}

fn canonical_redirect(request: &RequestInfo, domain: &str) -> Redirect {
    Redirect::permanent(format!("{}://{}{}", request.scheme(), domain, request.request_uri))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::memory::MemoryStore;
    use crate::SunriseConfig;

    fn resolver(store: MemoryStore) -> (SiteResolver, Arc<MemoryStore>, Arc<MemoryCache>) {
        resolver_with(store, MultisiteSettings::default())
    }

    fn resolver_with(
        store: MemoryStore,
        settings: MultisiteSettings,
    ) -> (SiteResolver, Arc<MemoryStore>, Arc<MemoryCache>) {
        let store = Arc::new(store);
        let cache = Arc::new(MemoryCache::new());
        let resolver = SiteResolver::new(settings, store.clone(), cache.clone());
        (resolver, store, cache)
    }

    fn ready(resolution: Resolution) -> TenantContext {
        match resolution {
            Resolution::Ready(ctx) => ctx,
            other => panic!("expected Ready, got {other:?}"),
        }
    }

    fn kind_of(err: anyhow::Error) -> ErrorKind {
        SunriseError::from_anyhow(&err).unwrap().kind
    }

    #[test]
    fn www_hosts_also_try_the_bare_domain() {
        assert_eq!(candidate_domains("www.example.com"), vec!["www.example.com", "example.com"]);
        assert_eq!(candidate_domains("www.a.b.example.com"), vec!["www.a.b.example.com", "a.b.example.com"]);
    }

    #[test]
    fn bare_two_label_hosts_also_try_www() {
        assert_eq!(candidate_domains("example.com"), vec!["example.com", "www.example.com"]);
        assert_eq!(candidate_domains("a.example.com"), vec!["a.example.com"]);
        assert_eq!(candidate_domains("localhost"), vec!["localhost"]);
    }

    #[test]
    fn default_ports_are_stripped() {
        assert_eq!(normalize_host("Example.COM:80"), "example.com");
        assert_eq!(normalize_host("example.com:443"), "example.com");
        assert_eq!(normalize_host("example.com:8080"), "example.com:8080");
    }

    #[tokio::test]
    async fn resolves_site_and_network() {
        let (resolver, _, _) = resolver(
            MemoryStore::new()
                .with_network(Network::new(1, "example.com"))
                .with_site(Site::new(1, 1, "example.com"))
                .with_site(Site::new(2, 1, "shop.example.com")),
        );

        let ctx = ready(resolver.resolve(&RequestInfo::new("shop.example.com", "/cart")).await.unwrap());
        assert_eq!(ctx.site_id(), SiteId(2));
        assert_eq!(ctx.network_id(), NetworkId(1));
        assert_eq!(ctx.network.main_site_id, Some(SiteId(1)));
        assert!(!ctx.is_main_site());
    }

    #[tokio::test]
    async fn redirects_to_canonical_site_domain() {
        let (resolver, _, _) = resolver(
            MemoryStore::new()
                .with_network(Network::new(1, "example.com"))
                .with_site(Site::new(1, 1, "example.com")),
        );

        let resolution = resolver
            .resolve(&RequestInfo::new("www.example.com:443", "/about?x=1").secure(true))
            .await
            .unwrap();

        assert_eq!(
            resolution,
            Resolution::Redirect(Redirect::permanent("https://example.com/about?x=1"))
        );
    }

    #[tokio::test]
    async fn redirects_to_canonical_network_domain_when_no_site() {
        let (resolver, _, _) = resolver(MemoryStore::new().with_network(Network::new(4, "www.example.org")));

        let resolution = resolver.resolve(&RequestInfo::new("example.org", "/")).await.unwrap();
        assert_eq!(
            resolution,
            Resolution::Redirect(Redirect::permanent("http://www.example.org/"))
        );
    }

    #[tokio::test]
    async fn nothing_matching_is_network_not_found() {
        let (resolver, _, _) = resolver(MemoryStore::new());

        let err = resolver.resolve(&RequestInfo::new("nowhere.test", "/")).await.unwrap_err();
        assert_eq!(kind_of(err), ErrorKind::NetworkNotFound);
    }

    #[tokio::test]
    async fn network_without_site_is_site_not_found() {
        let (resolver, _, _) = resolver(MemoryStore::new().with_network(Network::new(1, "example.com")));

        let err = resolver.resolve(&RequestInfo::new("example.com", "/")).await.unwrap_err();
        let found = SunriseError::from_anyhow(&err).unwrap();
        assert_eq!(found.kind, ErrorKind::SiteNotFound);
        assert_eq!(found.domain.as_deref(), Some("example.com"));
    }

    #[tokio::test]
    async fn site_with_missing_network_is_network_not_found() {
        let (resolver, _, _) = resolver(MemoryStore::new().with_site(Site::new(1, 9, "example.com")));

        let err = resolver.resolve(&RequestInfo::new("example.com", "/")).await.unwrap_err();
        assert_eq!(kind_of(err), ErrorKind::NetworkNotFound);
    }

    #[tokio::test]
    async fn unset_network_falls_back_to_primary() {
        let (resolver, _, _) = resolver(
            MemoryStore::new()
                .with_network(Network::new(1, "example.com"))
                .with_site(Site::new(5, 0, "example.com")),
        );

        let ctx = ready(resolver.resolve(&RequestInfo::new("example.com", "/")).await.unwrap());
        assert_eq!(ctx.site.network_id, NetworkId::PRIMARY);
    }

    #[tokio::test]
    async fn main_site_is_taken_from_root_site_without_lookup() {
        let (resolver, store, cache) = resolver(
            MemoryStore::new()
                .with_network(Network::new(1, "a.example.com"))
                .with_site(Site::new(7, 1, "a.example.com")),
        );

        let ctx = ready(resolver.resolve(&RequestInfo::new("a.example.com", "/")).await.unwrap());
        assert_eq!(ctx.network.main_site_id, Some(SiteId(7)));
        assert!(ctx.is_main_site());
        // only the site detection query ran, and nothing was cached
        assert_eq!(store.site_queries(), 1);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn main_site_lookup_is_memoized() {
        let (resolver, store, cache) = resolver(
            MemoryStore::new()
                .with_network(Network::new(1, "example.com"))
                .with_site(Site::new(1, 1, "example.com"))
                .with_site(Site::new(2, 1, "blog.example.com")),
        );
        let request = RequestInfo::new("blog.example.com", "/");

        resolver.resolve(&request).await.unwrap();
        assert_eq!(store.site_queries(), 2);
        assert_eq!(
            cache.get(MAIN_SITE_CACHE_GROUP, "network:1:main_site").await.as_deref(),
            Some("1")
        );

        let ctx = ready(resolver.resolve(&request).await.unwrap());
        assert_eq!(ctx.network.main_site_id, Some(SiteId(1)));
        assert_eq!(store.site_queries(), 3);
    }

    #[tokio::test]
    async fn missing_main_site_is_cached_as_zero() {
        let (resolver, _, cache) = resolver(
            MemoryStore::new()
                .with_network(Network::new(1, "example.com"))
                .with_site(Site::new(2, 1, "blog.example.com")),
        );

        let ctx = ready(resolver.resolve(&RequestInfo::new("blog.example.com", "/")).await.unwrap());
        assert_eq!(ctx.network.main_site_id, None);
        assert_eq!(
            cache.get(MAIN_SITE_CACHE_GROUP, "network:1:main_site").await.as_deref(),
            Some("0")
        );
    }

    #[tokio::test]
    async fn known_main_site_is_kept() {
        let (resolver, store, _) = resolver(
            MemoryStore::new()
                .with_network(Network::new(1, "example.com").with_main_site(SiteId(3)))
                .with_site(Site::new(2, 1, "blog.example.com")),
        );

        let ctx = ready(resolver.resolve(&RequestInfo::new("blog.example.com", "/")).await.unwrap());
        assert_eq!(ctx.network.main_site_id, Some(SiteId(3)));
        assert_eq!(store.site_queries(), 1);
    }

    #[tokio::test]
    async fn subdirectory_install_is_rejected() {
        let mut config = SunriseConfig::new();
        config.set("multisite.subdomain_install", "false");
        let (resolver, _, _) = resolver_with(MemoryStore::new(), config.snapshot().settings());

        let err = resolver.resolve(&RequestInfo::new("example.com", "/")).await.unwrap_err();
        assert_eq!(kind_of(err), ErrorKind::UnsupportedInstallation);
    }

    #[tokio::test]
    async fn installing_uses_placeholders_without_lookups() {
        let mut config = SunriseConfig::new();
        config.set("multisite.installing", "true");
        let (resolver, store, _) = resolver_with(MemoryStore::new(), config.snapshot().settings());

        let ctx = ready(resolver.resolve(&RequestInfo::new("anything.test", "/")).await.unwrap());
        assert_eq!(ctx, TenantContext::installing());
        assert_eq!(store.site_queries(), 0);
    }

    #[tokio::test]
    async fn single_site_mode_is_skipped() {
        let mut config = SunriseConfig::new();
        config.set("multisite.enabled", "false");
        let (resolver, _, _) = resolver_with(MemoryStore::new(), config.snapshot().settings());

        let resolution = resolver.resolve(&RequestInfo::new("example.com", "/")).await.unwrap();
        assert_eq!(resolution, Resolution::Skipped);
    }

    #[test]
    fn unknown_site_follows_no_blog_redirect() {
        let mut config = SunriseConfig::new();
        config.set("multisite.no_blog_redirect", "https://example.com/signup/");
        let settings = config.snapshot().settings();

        assert_eq!(
            fail_gracefully(&settings, &SunriseError::site_not_found("x.example.com")),
            Failure::Redirect(Redirect::found("https://example.com/signup/"))
        );
        assert_eq!(
            fail_gracefully(&settings, &SunriseError::network_not_found("x.example.com")),
            Failure::NotFound {
                domain: "x.example.com".into(),
                path: "/".into()
            }
        );
    }

    #[test]
    fn unsupported_installation_is_fatal() {
        let failure = fail_gracefully(&MultisiteSettings::default(), &SunriseError::unsupported_installation());
        assert!(matches!(failure, Failure::Fatal { status: 500, .. }));
    }
}
