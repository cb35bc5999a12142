use axum::http::{HeaderMap, Uri};
use sunrise_core::RequestInfo;

/// Build the transport-neutral request view from HTTP parts.
///
/// The host comes from the `Host` header, falling back to the URI
/// authority. A request counts as secure when its URI scheme is `https`
/// or a proxy says so via `x-forwarded-proto` / `x-forwarded-ssl`.
pub fn request_info(headers: &HeaderMap, uri: &Uri) -> RequestInfo {
    let host = headers
        .get(axum::http::header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| uri.authority().map(|a| a.to_string()))
        .unwrap_or_default();

    let request_uri = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string());

    RequestInfo::new(host, request_uri).secure(is_secure(headers, uri))
}

fn is_secure(headers: &HeaderMap, uri: &Uri) -> bool {
    if uri.scheme_str() == Some("https") {
        return true;
    }

    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.trim().to_ascii_lowercase())
    };

    header("x-forwarded-proto").is_some_and(|v| v.split(',').next().map(str::trim) == Some("https"))
        || header("x-forwarded-ssl").is_some_and(|v| v == "on")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn host_header_wins_over_authority() {
        let mut headers = HeaderMap::new();
        headers.insert("host", HeaderValue::from_static("Shop.Example.com:80"));
        let uri: Uri = "http://ignored.test/cart?x=1".parse().unwrap();

        let info = request_info(&headers, &uri);
        assert_eq!(info.host, "Shop.Example.com:80");
        assert_eq!(info.request_uri, "/cart?x=1");
        assert!(!info.secure);
    }

    #[test]
    fn forwarded_proto_marks_secure() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-proto", HeaderValue::from_static("https, http"));
        let uri: Uri = "/".parse().unwrap();

        assert!(request_info(&headers, &uri).secure);
    }

    #[test]
    fn forwarded_ssl_marks_secure() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-ssl", HeaderValue::from_static("on"));
        let uri: Uri = "/".parse().unwrap();

        assert!(request_info(&headers, &uri).secure);
    }
}
