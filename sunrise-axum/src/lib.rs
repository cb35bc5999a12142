//! sunrise-axum: Axum adapter for Sunrise.
//!
//! Wraps an axum router in the multisite bootstrap: every request is
//! resolved to its site and network before it reaches a handler, which
//! can then pick the result up with [`CurrentSite`] / [`CurrentUrls`].

pub mod app;
pub mod extract;
pub mod middlewares;
pub mod request;
pub mod state;
mod error;
pub use error::SunriseAxumError;
pub use extract::{CurrentSite, CurrentUrls};
pub use state::SunriseAxumState;

pub use app::{axum, AxumApp};
