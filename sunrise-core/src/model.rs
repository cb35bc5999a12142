//! Records the bootstrap works with: sites, networks and users.
//!
//! These are read-only snapshots handed out by a [`SiteStore`](crate::SiteStore).
//! The only field the resolver ever fills in is [`Network::main_site_id`].

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identifier of a single site (tenant).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct SiteId(pub u64);

/// Identifier of a network (group of sites).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct NetworkId(pub u64);

/// Identifier of a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct UserId(pub u64);

impl NetworkId {
    /// Network every orphaned site falls back to.
    pub const PRIMARY: NetworkId = NetworkId(1);

    /// `0` is what the store reports for "no network recorded".
    pub fn is_unset(&self) -> bool {
        self.0 == 0
    }
}

impl SiteId {
    pub const PRIMARY: SiteId = SiteId(1);
}

macro_rules! display_id {
    ($($ty:ty),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self.0)
                }
            }

            impl From<u64> for $ty {
                fn from(v: u64) -> Self {
                    Self(v)
                }
            }
        )*
    };
}

display_id!(SiteId, NetworkId, UserId);

/// One site within the multisite installation, addressed by domain + path.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Site {
    pub id: SiteId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub network_id: NetworkId,
    pub domain: String,
    #[cfg_attr(feature = "serde", serde(default = "root_path"))]
    pub path: String,
    #[cfg_attr(feature = "serde", serde(default = "public_default"))]
    pub public: bool,
}

impl Site {
    pub fn new(id: u64, network_id: u64, domain: impl Into<String>) -> Self {
        Self {
            id: SiteId(id),
            network_id: NetworkId(network_id),
            domain: domain.into(),
            path: "/".to_string(),
            public: true,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_public(mut self, public: bool) -> Self {
        self.public = public;
        self
    }

    /// Stand-in used while the installation is being set up.
    pub fn installing() -> Self {
        Self::new(1, 1, "")
    }

    /// True when this site sits at the same domain and path as `network`.
    pub fn is_root_of(&self, network: &Network) -> bool {
        self.domain == network.domain && self.path == network.path
    }
}

/// A group of sites sharing network-level configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Network {
    pub id: NetworkId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub main_site_id: Option<SiteId>,
    pub domain: String,
    #[cfg_attr(feature = "serde", serde(default = "root_path"))]
    pub path: String,
}

impl Network {
    pub fn new(id: u64, domain: impl Into<String>) -> Self {
        Self {
            id: NetworkId(id),
            main_site_id: None,
            domain: domain.into(),
            path: "/".to_string(),
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_main_site(mut self, id: SiteId) -> Self {
        self.main_site_id = Some(id);
        self
    }

    pub fn installing() -> Self {
        Self::new(1, "").with_main_site(SiteId::PRIMARY)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct User {
    pub id: UserId,
    pub login: String,
}

impl User {
    pub fn new(id: u64, login: impl Into<String>) -> Self {
        Self {
            id: UserId(id),
            login: login.into(),
        }
    }
}

#[cfg(feature = "serde")]
fn root_path() -> String {
    "/".to_string()
}

#[cfg(feature = "serde")]
fn public_default() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn installing_placeholders_point_at_each_other() {
        let site = Site::installing();
        let network = Network::installing();

        assert_eq!(site.id, SiteId(1));
        assert_eq!(site.network_id, network.id);
        assert_eq!(network.main_site_id, Some(site.id));
        assert!(site.is_root_of(&network));
        assert!(site.public);
    }

    #[test]
    fn root_of_requires_domain_and_path() {
        let network = Network::new(1, "a.example.com");

        assert!(Site::new(3, 1, "a.example.com").is_root_of(&network));
        assert!(!Site::new(3, 1, "a.example.com").with_path("/blog/").is_root_of(&network));
        assert!(!Site::new(3, 1, "b.example.com").is_root_of(&network));
    }
}
