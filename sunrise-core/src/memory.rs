//! In-memory [`SiteStore`] / [`UserStore`], used by tests and the demo app.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::model::{Network, NetworkId, Site, SiteId, User, UserId};
use crate::store::{NetworkQuery, SiteQuery, SiteStore, UserStore};

#[derive(Debug, Default)]
pub struct MemoryStore {
    sites: RwLock<Vec<Site>>,
    networks: RwLock<Vec<Network>>,
    users: RwLock<HashMap<UserId, User>>,
    site_queries: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_site(self, site: Site) -> Self {
        self.insert_site(site);
        self
    }

    pub fn with_network(self, network: Network) -> Self {
        self.insert_network(network);
        self
    }

    pub fn with_user(self, user: User) -> Self {
        self.insert_user(user);
        self
    }

    pub fn insert_site(&self, site: Site) {
        if let Ok(mut sites) = self.sites.write() {
            sites.retain(|s| s.id != site.id);
            sites.push(site);
        }
    }

    pub fn insert_network(&self, network: Network) {
        if let Ok(mut networks) = self.networks.write() {
            networks.retain(|n| n.id != network.id);
            networks.push(network);
        }
    }

    pub fn insert_user(&self, user: User) {
        if let Ok(mut users) = self.users.write() {
            users.insert(user.id, user);
        }
    }

    /// Number of `find_sites` calls served so far.
    pub fn site_queries(&self) -> usize {
        self.site_queries.load(Ordering::Relaxed)
    }
}

#[cfg(feature = "serde")]
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct Seed {
    networks: Vec<Network>,
    sites: Vec<Site>,
    users: Vec<User>,
}

#[cfg(feature = "serde")]
impl MemoryStore {
    /// Build a store from `{"networks": [...], "sites": [...], "users": [...]}`.
    pub fn from_json(raw: &str) -> Result<Self> {
        let seed: Seed = serde_json::from_str(raw)?;
        let store = Self::new();
        seed.networks.into_iter().for_each(|n| store.insert_network(n));
        seed.sites.into_iter().for_each(|s| store.insert_site(s));
        seed.users.into_iter().for_each(|u| store.insert_user(u));
        Ok(store)
    }
}

fn poisoned<T>(_: T) -> anyhow::Error {
    anyhow!("memory store lock poisoned")
}

#[async_trait]
impl SiteStore for MemoryStore {
    async fn find_sites(&self, query: &SiteQuery) -> Result<Vec<Site>> {
        self.site_queries.fetch_add(1, Ordering::Relaxed);

        let sites = self.sites.read().map_err(poisoned)?;
        let mut found: Vec<Site> = sites.iter().filter(|s| query.matches(s)).cloned().collect();
        if query.longest_domain_first {
            // stable: ties keep insertion order
            found.sort_by_key(|s| Reverse(s.domain.len()));
        }
        if let Some(limit) = query.limit {
            found.truncate(limit);
        }
        Ok(found)
    }

    async fn find_networks(&self, query: &NetworkQuery) -> Result<Vec<Network>> {
        let networks = self.networks.read().map_err(poisoned)?;
        let mut found: Vec<Network> = networks.iter().filter(|n| query.matches(n)).cloned().collect();
        if query.longest_domain_first {
            found.sort_by_key(|n| Reverse(n.domain.len()));
        }
        if let Some(limit) = query.limit {
            found.truncate(limit);
        }
        Ok(found)
    }

    async fn get_network(&self, id: NetworkId) -> Result<Option<Network>> {
        let networks = self.networks.read().map_err(poisoned)?;
        Ok(networks.iter().find(|n| n.id == id).cloned())
    }

    async fn network_ids(&self) -> Result<Vec<NetworkId>> {
        let networks = self.networks.read().map_err(poisoned)?;
        let mut ids: Vec<NetworkId> = networks.iter().map(|n| n.id).collect();
        ids.sort();
        Ok(ids)
    }

    async fn site_ids(&self) -> Result<Vec<SiteId>> {
        let sites = self.sites.read().map_err(poisoned)?;
        let mut ids: Vec<SiteId> = sites.iter().map(|s| s.id).collect();
        ids.sort();
        Ok(ids)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        let users = self.users.read().map_err(poisoned)?;
        Ok(users.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> MemoryStore {
        MemoryStore::new()
            .with_network(Network::new(1, "example.com"))
            .with_site(Site::new(1, 1, "example.com"))
            .with_site(Site::new(2, 1, "www.example.com"))
            .with_site(Site::new(3, 1, "example.com").with_path("/blog/"))
    }

    #[tokio::test]
    async fn longest_domain_wins_and_limit_applies() {
        let store = store();
        let query = SiteQuery::new()
            .domain_in(["example.com", "www.example.com"])
            .path("/")
            .longest_domain_first()
            .limit(1);

        let found = store.find_sites(&query).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, SiteId(2));
        assert_eq!(store.site_queries(), 1);
    }

    #[tokio::test]
    async fn path_filter_excludes_subdirectory_sites() {
        let store = store();
        let found = store
            .find_sites(&SiteQuery::new().domain("example.com").path("/"))
            .await
            .unwrap();

        assert_eq!(found.iter().map(|s| s.id).collect::<Vec<_>>(), vec![SiteId(1)]);
    }

    #[tokio::test]
    async fn reinserting_replaces_by_id() {
        let store = store();
        store.insert_network(Network::new(1, "example.org"));

        let network = store.get_network(NetworkId(1)).await.unwrap().unwrap();
        assert_eq!(network.domain, "example.org");
        assert_eq!(store.network_ids().await.unwrap(), vec![NetworkId(1)]);
    }
}
