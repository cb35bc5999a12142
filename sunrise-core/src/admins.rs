//! Global admins (across all networks) versus per-network admins.
//!
//! Logins come from configuration: `admins.global` lists the global admins,
//! `admins.network.<id>` the admins of network `<id>`. Only global admins may
//! manage networks and global users, or edit another global admin.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::warn;

use crate::config::MultisiteSettings;
use crate::model::{NetworkId, SiteId, User, UserId};
use crate::store::UserStore;

/// Meta capability that denies whatever it is added to.
pub const DO_NOT_ALLOW: &str = "do_not_allow";

/// Capabilities reserved to global admins.
pub const GLOBAL_CAPS: &[&str] = &[
    "manage_cache",
    "manage_networks",
    "create_networks",
    "delete_networks",
    "delete_network",
    "manage_global_users",
];

/// A single meta query clause, or a group of them joined by a relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaQuery {
    Exists { key: String },
    Group { relation: Relation, queries: Vec<MetaQuery> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    And,
    Or,
}

/// The slice of a user listing query the admin scoping touches.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserQuery {
    /// `0` lists users across every site.
    pub blog_id: u64,
    pub meta_query: Option<MetaQuery>,
}

/// Login lists, split per network.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminRoster {
    pub global: Vec<String>,
    pub networks: HashMap<NetworkId, Vec<String>>,
}

impl AdminRoster {
    /// Active only for multisite installs that configure global admins
    /// or admins for the primary network.
    pub fn from_settings(settings: &MultisiteSettings) -> Option<Self> {
        if !settings.multisite {
            return None;
        }
        if settings.global_admins.is_none() && !settings.network_admins.contains_key(&NetworkId::PRIMARY) {
            return None;
        }
        Some(Self {
            global: settings.global_admins.clone().unwrap_or_default(),
            networks: settings.network_admins.clone(),
        })
    }

    pub fn network(&self, id: NetworkId) -> &[String] {
        self.networks.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Global admins followed by the admins of `network`, without duplicates.
    pub fn super_admins(&self, network: NetworkId) -> Vec<String> {
        let mut seen = HashSet::new();
        self.global
            .iter()
            .chain(self.network(network))
            .filter(|login| seen.insert(login.as_str()))
            .cloned()
            .collect()
    }
}

/// Capability filtering backed by an [`AdminRoster`] and a user store.
pub struct Privileges {
    roster: AdminRoster,
    users: Arc<dyn UserStore>,
}

impl Privileges {
    pub fn new(roster: AdminRoster, users: Arc<dyn UserStore>) -> Self {
        Self { roster, users }
    }

    pub fn roster(&self) -> &AdminRoster {
        &self.roster
    }

    async fn user(&self, id: UserId) -> Option<User> {
        self.users.get_user(id).await.unwrap_or_else(|e| {
            warn!("user {id} lookup failed: {e}");
            None
        })
    }

    async fn login_in(&self, id: UserId, logins: &[String]) -> bool {
        if logins.is_empty() {
            return false;
        }
        match self.user(id).await {
            Some(user) => logins.iter().any(|l| *l == user.login),
            None => false,
        }
    }

    pub async fn is_global_admin(&self, user: UserId) -> bool {
        self.login_in(user, &self.roster.global).await
    }

    pub async fn is_network_admin(&self, user: UserId, network: NetworkId) -> bool {
        self.login_in(user, self.roster.network(network)).await
    }

    /// Add [`DO_NOT_ALLOW`] to `caps` when `cap` is reserved to global admins.
    ///
    /// `args` are the extra arguments of the capability check; for
    /// `edit_user` the first one is the user being edited.
    pub async fn map_meta_cap(&self, mut caps: Vec<String>, cap: &str, user: UserId, args: &[UserId]) -> Vec<String> {
        if GLOBAL_CAPS.contains(&cap) {
            if !self.is_global_admin(user).await {
                caps.push(DO_NOT_ALLOW.to_string());
            }
        } else if cap == "edit_user" {
            if let Some(&target) = args.first() {
                if !self.is_global_admin(user).await && self.is_global_admin(target).await {
                    caps.push(DO_NOT_ALLOW.to_string());
                }
            }
        }
        caps
    }

    /// Networks `user` administers: all of them for global admins.
    /// `None` when there are none.
    pub async fn user_networks(&self, user: UserId, all: &[NetworkId]) -> Option<Vec<NetworkId>> {
        let networks = if self.is_global_admin(user).await {
            all.to_vec()
        } else {
            let mut mine = Vec::new();
            for &network in all {
                if self.is_network_admin(user, network).await {
                    mine.push(network);
                }
            }
            mine
        };

        (!networks.is_empty()).then_some(networks)
    }

    /// Restrict a cross-site user listing to users with a role on at least
    /// one of `sites`, unless the caller may manage global users anyway.
    pub fn scope_user_query(&self, query: &mut UserQuery, can_manage_global_users: bool, sites: &[SiteId], db_prefix: &str) {
        if can_manage_global_users || query.blog_id > 0 {
            return;
        }

        let site_queries = MetaQuery::Group {
            relation: Relation::Or,
            queries: sites
                .iter()
                .map(|&site| MetaQuery::Exists {
                    key: format!("{}capabilities", blog_prefix(db_prefix, site)),
                })
                .collect(),
        };

        query.meta_query = Some(match query.meta_query.take() {
            None => site_queries,
            Some(existing) => MetaQuery::Group {
                relation: Relation::And,
                queries: vec![existing, site_queries],
            },
        });
    }
}

/// Table prefix of a site: the base prefix for the primary site, `<base><id>_` otherwise.
pub fn blog_prefix(base: &str, site: SiteId) -> String {
    if site == SiteId::PRIMARY {
        base.to_string()
    } else {
        format!("{base}{site}_")
    }
}
