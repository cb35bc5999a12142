//! Transport-neutral view of an incoming request and of redirects.

/// What the bootstrap needs to know about the incoming request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestInfo {
    /// Raw `Host` header, possibly with a port.
    pub host: String,
    /// Path plus query string, as the client sent it.
    pub request_uri: String,
    /// Whether the request arrived over HTTPS.
    pub secure: bool,
}

impl RequestInfo {
    pub fn new(host: impl Into<String>, request_uri: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            request_uri: request_uri.into(),
            secure: false,
        }
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn scheme(&self) -> &'static str {
        if self.secure {
            "https"
        } else {
            "http"
        }
    }
}

/// A redirect the transport should answer with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub location: String,
    pub status: u16,
}

impl Redirect {
    /// 301 Moved Permanently.
    pub fn permanent(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            status: 301,
        }
    }

    /// 302 Found.
    pub fn found(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            status: 302,
        }
    }
}
