//! Request-scoped multisite context.

use crate::model::{Network, NetworkId, Site, SiteId};

/// The site and network the current request resolved to.
///
/// Built once by the resolver and then passed to everything downstream,
/// so nothing has to reach for process-wide "current site" state.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TenantContext {
    pub site: Site,
    pub network: Network,
    /// Set by the SSL policy when admin screens must be served over HTTPS.
    pub force_ssl_admin: bool,
    /// Set by the SSL policy when the login screen must be served over HTTPS.
    pub force_ssl_login: bool,
}

impl TenantContext {
    pub fn new(site: Site, network: Network) -> Self {
        Self {
            site,
            network,
            force_ssl_admin: false,
            force_ssl_login: false,
        }
    }

    /// Context used while installing, with no lookups behind it.
    pub fn installing() -> Self {
        Self::new(Site::installing(), Network::installing())
    }

    pub fn site_id(&self) -> SiteId {
        self.site.id
    }

    pub fn network_id(&self) -> NetworkId {
        self.network.id
    }

    pub fn is_public(&self) -> bool {
        self.site.public
    }

    /// Whether the current site is its network's main site.
    pub fn is_main_site(&self) -> bool {
        self.network.main_site_id == Some(self.site.id)
    }
}
