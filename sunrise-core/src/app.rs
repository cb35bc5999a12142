use std::sync::{Arc, RwLock};

use crate::admins::{AdminRoster, Privileges};
use crate::cache::{MemoryCache, ObjectCache};
use crate::config::{ConfigSnapshot, MultisiteSettings, SunriseConfig};
use crate::resolver::SiteResolver;
use crate::ssl::SslPolicy;
use crate::store::{SiteStore, UserStore};
use crate::urls::UrlFixer;

struct SunriseAppInner {
    config: RwLock<SunriseConfig>,
    sites: Arc<dyn SiteStore>,
    users: Arc<dyn UserStore>,
    cache: Arc<dyn ObjectCache>,
}

/// SunriseApp is the central container of a multisite bootstrap.
///
/// Framework-agnostic. Holds:
/// - config
/// - site/network store
/// - user store
/// - object cache
///
/// and builds the per-request services from a config snapshot.
pub struct SunriseApp {
    inner: Arc<SunriseAppInner>,
}

impl Clone for SunriseApp {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl SunriseApp {
    pub fn new(sites: Arc<dyn SiteStore>, users: Arc<dyn UserStore>) -> Self {
        Self::with_cache(sites, users, Arc::new(MemoryCache::new()))
    }

    pub fn with_cache(sites: Arc<dyn SiteStore>, users: Arc<dyn UserStore>, cache: Arc<dyn ObjectCache>) -> Self {
        Self {
            inner: Arc::new(SunriseAppInner {
                config: RwLock::new(SunriseConfig::new()),
                sites,
                users,
                cache,
            }),
        }
    }

    pub fn set<K, V>(&self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        if let Ok(mut config) = self.inner.config.write() {
            config.set(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let config = self.inner.config.read().ok()?;
        config.get(key).map(|v| v.to_string())
    }

    /// Pull `PREFIX__A__B` environment variables in as `a.b`.
    pub fn load_env(&self, prefix: &str) {
        if let Ok(mut config) = self.inner.config.write() {
            config.load_env(prefix);
        }
    }

    pub fn config_snapshot(&self) -> ConfigSnapshot {
        self.inner
            .config
            .read()
            .map(|config| config.snapshot())
            .unwrap_or_default()
    }

    pub fn settings(&self) -> MultisiteSettings {
        self.config_snapshot().settings()
    }

    pub fn sites(&self) -> Arc<dyn SiteStore> {
        Arc::clone(&self.inner.sites)
    }

    pub fn users(&self) -> Arc<dyn UserStore> {
        Arc::clone(&self.inner.users)
    }

    pub fn cache(&self) -> Arc<dyn ObjectCache> {
        Arc::clone(&self.inner.cache)
    }

    pub fn resolver(&self) -> SiteResolver {
        SiteResolver::new(self.settings(), self.sites(), self.cache())
    }

    pub fn ssl_policy(&self) -> Option<SslPolicy> {
        SslPolicy::from_settings(&self.settings())
    }

    pub fn url_fixer(&self) -> Option<UrlFixer> {
        UrlFixer::from_settings(&self.settings())
    }

    pub fn privileges(&self) -> Option<Privileges> {
        AdminRoster::from_settings(&self.settings()).map(|roster| Privileges::new(roster, self.users()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::model::{Network, Site};
    use crate::request::RequestInfo;
    use crate::resolver::Resolution;

    fn app() -> SunriseApp {
        let store = Arc::new(
            MemoryStore::new()
                .with_network(Network::new(1, "example.com"))
                .with_site(Site::new(1, 1, "example.com")),
        );
        SunriseApp::new(store.clone(), store)
    }

    #[test]
    fn optional_services_follow_config() {
        let app = app();
        assert!(app.ssl_policy().is_none());
        assert!(app.url_fixer().is_none());
        assert!(app.privileges().is_none());

        app.set("ssl.global", "true");
        app.set("core.directory", "wp");
        app.set("admins.global", "root");

        assert!(app.ssl_policy().unwrap().global);
        assert_eq!(app.url_fixer().unwrap().directory(), "wp");
        assert_eq!(app.privileges().unwrap().roster().global, vec!["root"]);
    }

    #[tokio::test]
    async fn resolver_sees_latest_config() {
        let app = app();
        let request = RequestInfo::new("example.com", "/");

        assert!(matches!(app.resolver().resolve(&request).await.unwrap(), Resolution::Ready(_)));

        app.set("multisite.enabled", "false");
        assert_eq!(app.resolver().resolve(&request).await.unwrap(), Resolution::Skipped);
    }
}
