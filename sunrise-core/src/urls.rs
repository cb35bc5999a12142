//! URL fixing for installs where the core lives in a subdirectory.
//!
//! The home URL must never carry the directory, the site URL always must,
//! and network-level site URLs get it inserted in front of the path.

use crate::config::MultisiteSettings;
use crate::ssl::SslPolicy;
use crate::tenant::TenantContext;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlFixer {
    directory: String,
}

impl UrlFixer {
    /// `None` when `directory` is empty once slashes are trimmed.
    pub fn new(directory: &str) -> Option<Self> {
        let directory = directory.trim_matches('/');
        if directory.is_empty() {
            return None;
        }
        Some(Self {
            directory: directory.to_string(),
        })
    }

    /// Active only for multisite installs with a core directory configured.
    pub fn from_settings(settings: &MultisiteSettings) -> Option<Self> {
        if !settings.multisite {
            return None;
        }
        settings.core_directory.as_deref().and_then(Self::new)
    }

    pub fn directory(&self) -> &str {
        &self.directory
    }

    /// `https://site.com/wp` → `https://site.com`.
    pub fn fix_home_url(&self, value: &str) -> String {
        let suffix = format!("/{}", self.directory);
        value.strip_suffix(&suffix).unwrap_or(value).to_string()
    }

    /// `https://site.com` → `https://site.com/wp`.
    pub fn fix_site_url(&self, value: &str) -> String {
        let suffix = format!("/{}", self.directory);
        if value.ends_with(&suffix) {
            value.to_string()
        } else {
            format!("{value}{suffix}")
        }
    }

    /// `https://site.com/wp-admin/network/`, `wp-admin/network/`
    /// → `https://site.com/wp/wp-admin/network/`.
    ///
    /// `url` is expected to end with `path`; when it doesn't, it is used as is.
    pub fn fix_network_site_url(&self, url: &str, path: &str) -> String {
        let path = path.trim_start_matches('/');
        let base = url.strip_suffix(path).unwrap_or(url);

        let dir_slash = format!("{}/", self.directory);
        if base.ends_with(&dir_slash) {
            format!("{base}{path}")
        } else {
            format!("{base}{dir_slash}{path}")
        }
    }
}

/// Home and site URLs of the current site, after the directory fix and
/// the HTTPS upgrade have been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SiteUrls {
    pub home: String,
    pub site: String,
    #[cfg_attr(feature = "serde", serde(skip))]
    network_base: String,
    #[cfg_attr(feature = "serde", serde(skip))]
    fixer: Option<UrlFixer>,
}

impl SiteUrls {
    pub fn new(ctx: &TenantContext, fixer: Option<&UrlFixer>, ssl: Option<&SslPolicy>) -> Self {
        let raw = format!("http://{}{}", ctx.site.domain, ctx.site.path.trim_end_matches('/'));

        let home = fixer.map_or_else(|| raw.clone(), |f| f.fix_home_url(&raw));
        let site = fixer.map_or_else(|| raw.clone(), |f| f.fix_site_url(&raw));
        let (home, site) = match ssl {
            Some(policy) => (
                policy.make_url_https(ctx, &home).into_owned(),
                policy.make_url_https(ctx, &site).into_owned(),
            ),
            None => (home, site),
        };

        let scheme = if site.starts_with("https://") { "https" } else { "http" };
        Self {
            home,
            site,
            network_base: format!("{scheme}://{}{}", ctx.network.domain, ctx.network.path),
            fixer: fixer.cloned(),
        }
    }

    /// URL of `path` on the network's main domain, inside the core directory.
    pub fn network_site_url(&self, path: &str) -> String {
        let url = format!("{}{}", self.network_base, path.trim_start_matches('/'));
        match &self.fixer {
            Some(fixer) => fixer.fix_network_site_url(&url, path),
            None => url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Network, Site};

    fn fixer() -> UrlFixer {
        UrlFixer::new("/wp/").unwrap()
    }

    #[test]
    fn home_url_loses_the_directory() {
        assert_eq!(fixer().fix_home_url("https://site.com/wp"), "https://site.com");
        assert_eq!(fixer().fix_home_url("https://site.com"), "https://site.com");
        assert_eq!(fixer().fix_home_url("https://site.com/swp"), "https://site.com/swp");
    }

    #[test]
    fn site_url_gains_the_directory_once() {
        assert_eq!(fixer().fix_site_url("https://site.com"), "https://site.com/wp");
        assert_eq!(fixer().fix_site_url("https://site.com/wp"), "https://site.com/wp");
    }

    #[test]
    fn network_site_url_inserts_directory_before_path() {
        assert_eq!(
            fixer().fix_network_site_url("https://site.com/wp-admin/network/", "/wp-admin/network/"),
            "https://site.com/wp/wp-admin/network/"
        );
        assert_eq!(
            fixer().fix_network_site_url("https://site.com/wp/wp-login.php", "wp-login.php"),
            "https://site.com/wp/wp-login.php"
        );
        assert_eq!(fixer().fix_network_site_url("https://site.com/", ""), "https://site.com/wp/");
    }

    #[test]
    fn site_urls_combine_directory_and_https() {
        let ctx = TenantContext::new(Site::new(2, 1, "shop.example.com"), Network::new(1, "example.com"));
        let ssl = SslPolicy {
            sites: vec!["2".into()],
            ..SslPolicy::default()
        };

        let urls = SiteUrls::new(&ctx, Some(&fixer()), Some(&ssl));
        assert_eq!(urls.home, "https://shop.example.com");
        assert_eq!(urls.site, "https://shop.example.com/wp");
        assert_eq!(urls.network_site_url("/wp-admin/network/"), "https://example.com/wp/wp-admin/network/");

        let plain = SiteUrls::new(&ctx, None, None);
        assert_eq!(plain.site, "http://shop.example.com");
        assert_eq!(plain.network_site_url("wp-login.php"), "http://example.com/wp-login.php");
    }

    #[test]
    fn blank_directory_disables_fixer() {
        assert_eq!(UrlFixer::new("//"), None);
        assert_eq!(UrlFixer::from_settings(&MultisiteSettings::default()), None);
    }
}
