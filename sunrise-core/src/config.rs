//! # Sunrise Configuration
//!
//! Sunrise keeps configuration in a plain string key/value store, the
//! same `set()` / `get()` shape the rest of the framework uses, and turns
//! a snapshot of it into typed [`MultisiteSettings`] once per request.
//!
//! ## Setting and reading values
//! ```rust
//! use sunrise_core::SunriseConfig;
//! let mut config = SunriseConfig::new();
//!
//! config.set("ssl.sites", "shop.example.com, 7");
//! config.set("core.directory", "/wp/");
//!
//! let settings = config.snapshot().settings();
//! assert_eq!(settings.ssl_sites, vec!["shop.example.com", "7"]);
//! assert_eq!(settings.core_directory.as_deref(), Some("wp"));
//! ```
//!
//! ## Environment overrides
//! `SUNRISE__SSL__GLOBAL=true` becomes `ssl.global`, see [`SunriseConfig::load_env`].
//!
//! ## Keys
//! | key | meaning |
//! |---|---|
//! | `multisite.enabled` | run the bootstrap at all (default `true`) |
//! | `multisite.subdomain_install` | subdomain install (default `true`); `false` is rejected |
//! | `multisite.installing` | serve the placeholder site/network |
//! | `multisite.no_blog_redirect` | where unknown sites are sent |
//! | `ssl.global`, `ssl.networks`, `ssl.sites` | HTTPS-only networks and sites |
//! | `core.directory` | subdirectory the core lives in |
//! | `admins.global`, `admins.network.<id>` | admin logins |
//! | `db.prefix` | table prefix used for capability meta keys |

use std::collections::HashMap;

use crate::model::NetworkId;

/// Placeholder value of `multisite.no_blog_redirect` meaning "no redirect".
pub const SITEURL_PLACEHOLDER: &str = "%siteurl%";

const DEFAULT_DB_PREFIX: &str = "wp_";

#[derive(Debug, Default)]
pub struct SunriseConfig {
    values: HashMap<String, String>,
}

impl SunriseConfig {
    /// Create an empty config store.
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Set a configuration key to a string value.
    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.values.insert(key.into(), value.into());
    }

    /// Get a configuration value by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|s| s.as_str())
    }

    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Copy every `PREFIX__A__B` environment variable in as `a.b`.
    pub fn load_env(&mut self, prefix: &str) {
        self.load_vars(prefix, std::env::vars());
    }

    pub(crate) fn load_vars<I>(&mut self, prefix: &str, vars: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let prefix = format!("{}__", prefix.trim_end_matches('_'));
        for (key, value) in vars {
            if let Some(stripped) = key.strip_prefix(&prefix) {
                let normalized = stripped.to_lowercase().replace("__", ".");
                self.set(normalized, value);
            }
        }
    }

    pub fn snapshot(&self) -> ConfigSnapshot {
        ConfigSnapshot::new(self.values.clone())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConfigSnapshot {
    map: HashMap<String, String>,
}

impl ConfigSnapshot {
    pub(crate) fn new(map: HashMap<String, String>) -> Self {
        Self { map }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(|s| s.as_str())
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned()
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(|v| v.trim().parse::<u64>().ok())
    }

    /// Accepts `true/false`, `1/0`, `yes/no` and `on/off`.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(|v| match v.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Some(true),
            "false" | "0" | "no" | "off" | "" => Some(false),
            _ => None,
        })
    }

    /// Comma separated list, each entry trimmed. `None` when the key is absent.
    pub fn get_list(&self, key: &str) -> Option<Vec<String>> {
        self.get(key).map(split_list)
    }

    /// Typed view of everything the bootstrap reads.
    pub fn settings(&self) -> MultisiteSettings {
        let network_admins = self
            .map
            .iter()
            .filter_map(|(key, value)| {
                let id = key.strip_prefix("admins.network.")?.parse::<u64>().ok()?;
                Some((NetworkId(id), split_list(value)))
            })
            .collect();

        MultisiteSettings {
            multisite: self.get_bool("multisite.enabled").unwrap_or(true),
            subdomain_install: self.get_bool("multisite.subdomain_install").unwrap_or(true),
            installing: self.get_bool("multisite.installing").unwrap_or(false),
            no_blog_redirect: self.get_string("multisite.no_blog_redirect"),
            ssl_global: self.get_bool("ssl.global"),
            ssl_networks: self.get_list("ssl.networks").unwrap_or_default(),
            ssl_sites: self.get_list("ssl.sites").unwrap_or_default(),
            ssl_configured: self.map.contains_key("ssl.global")
                || self.map.contains_key("ssl.networks")
                || self.map.contains_key("ssl.sites"),
            core_directory: self
                .get("core.directory")
                .map(|dir| dir.trim_matches('/').to_string())
                .filter(|dir| !dir.is_empty()),
            global_admins: self.get_list("admins.global"),
            network_admins,
            db_prefix: self
                .get_string("db.prefix")
                .unwrap_or_else(|| DEFAULT_DB_PREFIX.to_string()),
        }
    }
}

/// Typed multisite settings, read once per request from a [`ConfigSnapshot`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultisiteSettings {
    pub multisite: bool,
    pub subdomain_install: bool,
    pub installing: bool,
    pub no_blog_redirect: Option<String>,
    /// `Some` when `ssl.global` is set at all, even to `false`.
    pub ssl_global: Option<bool>,
    pub ssl_networks: Vec<String>,
    pub ssl_sites: Vec<String>,
    pub ssl_configured: bool,
    /// Trimmed of slashes; `None` when unset or empty.
    pub core_directory: Option<String>,
    /// `None` when `admins.global` is not configured.
    pub global_admins: Option<Vec<String>>,
    pub network_admins: HashMap<NetworkId, Vec<String>>,
    pub db_prefix: String,
}

impl Default for MultisiteSettings {
    fn default() -> Self {
        ConfigSnapshot::default().settings()
    }
}

impl MultisiteSettings {
    /// Redirect target for unknown sites, ignoring the `%siteurl%` placeholder.
    pub fn no_blog_redirect(&self) -> Option<&str> {
        self.no_blog_redirect
            .as_deref()
            .filter(|url| !url.is_empty() && *url != SITEURL_PLACEHOLDER)
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',').map(|s| s.trim().to_string()).collect()
}
