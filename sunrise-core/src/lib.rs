//! sunrise-core: framework-agnostic multisite bootstrap.
//!
//! Resolves the site and network a request belongs to from its host, and
//! carries the small per-request policies that hang off that result:
//! core-directory URL fixing, HTTPS-only sites and global admins.

pub mod admins;
pub mod app;
pub mod cache;
pub mod config;
pub mod errors;
pub mod memory;
pub mod model;
pub mod request;
pub mod resolver;
pub mod ssl;
pub mod store;
pub mod tenant;
pub mod urls;

pub use admins::{AdminRoster, MetaQuery, Privileges, Relation, UserQuery};
pub use app::SunriseApp;
pub use cache::{MemoryCache, NoCache, ObjectCache};
pub use config::{ConfigSnapshot, MultisiteSettings, SunriseConfig};
pub use errors::{ErrorKind, SunriseError, SunriseResult};
pub use memory::MemoryStore;
pub use model::{Network, NetworkId, Site, SiteId, User, UserId};
pub use request::{Redirect, RequestInfo};
pub use resolver::{candidate_domains, fail_gracefully, normalize_host, Failure, Resolution, SiteResolver};
pub use ssl::SslPolicy;
pub use store::{NetworkQuery, SiteQuery, SiteStore, UserStore};
pub use tenant::TenantContext;
pub use urls::{SiteUrls, UrlFixer};
