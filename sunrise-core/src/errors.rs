//! # Errors
//!
//! Sunrise carries a small set of structured errors through `anyhow`.
//! Core goals:
//! - every failure knows its HTTP status, name and class name
//! - can be carried through anyhow::Error (resolver, middleware)
//! - transport-agnostic (the adapter crate decides how to serialize)
//!
//! Redirects are not errors: the resolver returns them as values.
//!
//! If you enable feature `serde`, you also get:
//! - `data` as serde_json::Value
//! - `to_json()` helper

use std::fmt;

use anyhow::Error as AnyError;

/// A convenience result type for Sunrise core APIs.
pub type SunriseResult<T> = std::result::Result<T, AnyError>;

/// Failure classes with their status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BadRequest,              // 400
    Forbidden,               // 403
    NetworkNotFound,         // 404
    SiteNotFound,            // 404
    UnsupportedInstallation, // 500
    GeneralError,            // 500
}

impl ErrorKind {
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::BadRequest => 400,
            ErrorKind::Forbidden => 403,
            ErrorKind::NetworkNotFound => 404,
            ErrorKind::SiteNotFound => 404,
            ErrorKind::UnsupportedInstallation => 500,
            ErrorKind::GeneralError => 500,
        }
    }

    /// Error `name` (e.g. "SiteNotFound")
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "BadRequest",
            ErrorKind::Forbidden => "Forbidden",
            ErrorKind::NetworkNotFound => "NetworkNotFound",
            ErrorKind::SiteNotFound => "SiteNotFound",
            ErrorKind::UnsupportedInstallation => "UnsupportedInstallation",
            ErrorKind::GeneralError => "GeneralError",
        }
    }

    /// Kebab-cased `className`
    pub fn class_name(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "bad-request",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::NetworkNotFound => "network-not-found",
            ErrorKind::SiteNotFound => "site-not-found",
            ErrorKind::UnsupportedInstallation => "unsupported-installation",
            ErrorKind::GeneralError => "general-error",
        }
    }

    /// Not-found kinds go through the graceful failure path instead of a bare error page.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ErrorKind::NetworkNotFound | ErrorKind::SiteNotFound)
    }
}

#[cfg(feature = "serde")]
pub type ErrorValue = serde_json::Value;

#[cfg(not(feature = "serde"))]
pub type ErrorValue = std::sync::Arc<dyn std::any::Any + Send + Sync>;

/// A structured Sunrise error that can live inside `anyhow::Error`.
#[derive(Debug)]
pub struct SunriseError {
    pub kind: ErrorKind,
    pub message: String,
    /// Host the failing request asked for, when there is one.
    pub domain: Option<String>,
    pub data: Option<ErrorValue>,
    pub source: Option<AnyError>,
}

impl SunriseError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            domain: None,
            data: None,
            source: None,
        }
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_data(mut self, data: ErrorValue) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_source(mut self, source: AnyError) -> Self {
        self.source = Some(source);
        self
    }

    pub fn code(&self) -> u16 {
        self.kind.status_code()
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn class_name(&self) -> &'static str {
        self.kind.class_name()
    }

    pub fn into_anyhow(self) -> AnyError {
        AnyError::new(self)
    }

    /// Find a `SunriseError` anywhere in an `anyhow` context chain.
    pub fn from_anyhow(err: &AnyError) -> Option<&SunriseError> {
        err.chain().find_map(|e| e.downcast_ref::<SunriseError>())
    }

    /// Turn any error into a SunriseError:
    /// - if it's already a SunriseError, keep it
    /// - if one sits further down the chain, surface it
    /// - otherwise wrap as GeneralError
    pub fn normalize(err: AnyError) -> SunriseError {
        let other = match err.downcast::<SunriseError>() {
            Ok(e) => return e,
            Err(other) => other,
        };
        let nested = SunriseError::from_anyhow(&other).map(SunriseError::sanitize_for_client);
        match nested {
            Some(found) => found.with_source(other),
            None => SunriseError::new(ErrorKind::GeneralError, other.to_string()).with_source(other),
        }
    }

    /// Copy without the inner `source`, safe to show to clients.
    pub fn sanitize_for_client(&self) -> SunriseError {
        SunriseError {
            kind: self.kind,
            message: self.message.clone(),
            domain: self.domain.clone(),
            data: self.data.clone(),
            source: None,
        }
    }

    // ---- Constructors ----

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadRequest, msg)
    }
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden, msg)
    }
    pub fn network_not_found(domain: impl Into<String>) -> Self {
        let domain = domain.into();
        Self::new(ErrorKind::NetworkNotFound, format!("No network found for {domain}")).with_domain(domain)
    }
    pub fn site_not_found(domain: impl Into<String>) -> Self {
        let domain = domain.into();
        Self::new(ErrorKind::SiteNotFound, format!("No site found for {domain}")).with_domain(domain)
    }
    pub fn unsupported_installation() -> Self {
        Self::new(
            ErrorKind::UnsupportedInstallation,
            "This multisite does not support a subdirectory installation.",
        )
    }
    pub fn general_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::GeneralError, msg)
    }
}

impl fmt::Display for SunriseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.name(), self.code(), self.message)
    }
}

impl std::error::Error for SunriseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

#[cfg(feature = "serde")]
impl SunriseError {
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::json;

        let mut base = json!({
            "name": self.name(),
            "message": self.message,
            "code": self.code(),
            "className": self.class_name(),
        });

        if let Some(domain) = &self.domain {
            base["domain"] = json!(domain);
        }
        if let Some(d) = &self.data {
            base["data"] = d.clone();
        }
        base
    }
}

/// Convenience helper for "bail with SunriseError".
#[macro_export]
macro_rules! bail_sunrise {
    ($ctor:ident) => {
        return Err($crate::errors::SunriseError::$ctor().into_anyhow());
    };
    ($ctor:ident, $msg:expr) => {
        return Err($crate::errors::SunriseError::$ctor($msg).into_anyhow());
    };
    ($ctor:ident, $fmt:expr, $($arg:tt)*) => {
        return Err($crate::errors::SunriseError::$ctor(format!($fmt, $($arg)*)).into_anyhow());
    };
}
