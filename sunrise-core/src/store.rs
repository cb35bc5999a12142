use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::model::{Network, NetworkId, Site, SiteId, User, UserId};

/// Filter for site lookups, shaped after the queries the bootstrap needs:
/// "any of these domains at `/`, longest domain first" and
/// "the site at exactly this domain/path in this network".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteQuery {
    pub domain_in: Vec<String>,
    pub domain: Option<String>,
    pub path: Option<String>,
    pub network_id: Option<NetworkId>,
    /// Sort by domain length, longest first.
    pub longest_domain_first: bool,
    pub limit: Option<usize>,
}

impl SiteQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn domain_in<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.domain_in = domains.into_iter().map(Into::into).collect();
        self
    }

    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn network(mut self, id: NetworkId) -> Self {
        self.network_id = Some(id);
        self
    }

    pub fn longest_domain_first(mut self) -> Self {
        self.longest_domain_first = true;
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    /// Whether `site` passes every filter set on this query.
    pub fn matches(&self, site: &Site) -> bool {
        (self.domain_in.is_empty() || self.domain_in.iter().any(|d| *d == site.domain))
            && self.domain.as_ref().map_or(true, |d| *d == site.domain)
            && self.path.as_ref().map_or(true, |p| *p == site.path)
            && self.network_id.map_or(true, |n| n == site.network_id)
    }
}

/// Filter for network lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkQuery {
    pub domain_in: Vec<String>,
    pub path: Option<String>,
    pub longest_domain_first: bool,
    pub limit: Option<usize>,
}

impl NetworkQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn domain_in<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.domain_in = domains.into_iter().map(Into::into).collect();
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn longest_domain_first(mut self) -> Self {
        self.longest_domain_first = true;
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    pub fn matches(&self, network: &Network) -> bool {
        (self.domain_in.is_empty() || self.domain_in.iter().any(|d| *d == network.domain))
            && self.path.as_ref().map_or(true, |p| *p == network.path)
    }
}

/// Backing store for sites and networks.
///
/// Every lookup is a single authoritative attempt. Callers treat an `Err`
/// the same as an empty result.
///
/// All methods have default implementations that return
/// "Method not implemented", so a store can override only
/// what it actually supports.
#[async_trait]
pub trait SiteStore: Send + Sync {
    /// Sites matching `query`, honouring its ordering and limit.
    async fn find_sites(&self, _query: &SiteQuery) -> Result<Vec<Site>> {
        Err(anyhow!("Method not implemented: find_sites"))
    }

    /// Networks matching `query`, honouring its ordering and limit.
    async fn find_networks(&self, _query: &NetworkQuery) -> Result<Vec<Network>> {
        Err(anyhow!("Method not implemented: find_networks"))
    }

    async fn get_network(&self, _id: NetworkId) -> Result<Option<Network>> {
        Err(anyhow!("Method not implemented: get_network"))
    }

    async fn network_ids(&self) -> Result<Vec<NetworkId>> {
        Err(anyhow!("Method not implemented: network_ids"))
    }

    async fn site_ids(&self) -> Result<Vec<SiteId>> {
        Err(anyhow!("Method not implemented: site_ids"))
    }
}

/// Backing store for user accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_user(&self, _id: UserId) -> Result<Option<User>> {
        Err(anyhow!("Method not implemented: get_user"))
    }
}
