use axum::extract::{ConnectInfo, Request};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use std::net::{IpAddr, SocketAddr};

/// Request extension carrying the client address the sign-in limiter keys
/// on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClientIp(pub IpAddr);

/// Resolves the caller's address and stashes it in request extensions.
///
/// Proxy headers win over the socket: `X-Forwarded-For` (first entry of
/// the list), then `X-Real-IP`, then the connection's own address. When a
/// proxy header is present but unparseable, no address is recorded.
/// `ConnectInfo` is optional so the router also runs under test harnesses
/// that drive it without a real socket.
pub async fn extract_client_ip(
    connect_info: Option<ConnectInfo<SocketAddr>>,
    mut request: Request,
    next: Next,
) -> Response {
    let headers = request.headers();
    let ip = if headers.contains_key("x-forwarded-for") || headers.contains_key("x-real-ip") {
        ip_from_headers(headers)
    } else {
        connect_info.map(|ConnectInfo(addr)| addr.ip())
    };

    if let Some(ip) = ip {
        request.extensions_mut().insert(ClientIp(ip));
    }

    next.run(request).await
}

fn ip_from_headers(headers: &HeaderMap) -> Option<IpAddr> {
    if let Some(forwarded) = headers.get("x-forwarded-for") {
        // Comma-separated chain; the first entry is the original client.
        return forwarded
            .to_str()
            .ok()
            .and_then(|list| list.split(',').next())
            .and_then(|first| first.trim().parse().ok());
    }
    headers
        .get("x-real-ip")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn test_forwarded_for_takes_first_entry() {
        let map = headers(&[("x-forwarded-for", "203.0.113.9, 10.0.0.1")]);
        assert_eq!(
            ip_from_headers(&map),
            Some("203.0.113.9".parse::<IpAddr>().unwrap())
        );
    }

    #[test]
    fn test_real_ip_is_the_fallback_header() {
        let map = headers(&[("x-real-ip", "198.51.100.4")]);
        assert_eq!(
            ip_from_headers(&map),
            Some("198.51.100.4".parse::<IpAddr>().unwrap())
        );
    }

    #[test]
    fn test_garbage_proxy_header_yields_none() {
        let map = headers(&[("x-forwarded-for", "not-an-ip")]);
        assert_eq!(ip_from_headers(&map), None);
    }
}
