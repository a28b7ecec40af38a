//! Outbound request construction.

use crate::{Result, TransportError};
use http::{HeaderMap, Method};
use meridian_discovery::Endpoint;
use url::Url;

/// One request, built fresh for each call.
#[derive(Debug)]
pub(crate) struct OutboundRequest<'a> {
    method: Method,
    path: &'a str,
    body: Option<Vec<u8>>,
    headers: HeaderMap,
}

impl<'a> OutboundRequest<'a> {
    pub(crate) fn new(
        method: Method,
        path: &'a str,
        body: Option<Vec<u8>>,
        headers: HeaderMap,
    ) -> Self {
        Self {
            method,
            path,
            body,
            headers,
        }
    }

    /// `{scheme}://{address}:{port}{path}`, with the path appended verbatim.
    pub(crate) fn url(&self, scheme: &str, endpoint: &Endpoint) -> Result<Url> {
        let raw = format!("{}://{}{}", scheme, endpoint.authority(), self.path);
        Url::parse(&raw)
            .map_err(|e| TransportError::Build(format!("invalid URL {}: {}", raw, e)).into())
    }

    /// Build the request against `endpoint`.
    pub(crate) fn build(
        self,
        client: &reqwest::Client,
        scheme: &str,
        endpoint: &Endpoint,
    ) -> Result<reqwest::Request> {
        let url = self.url(scheme, endpoint)?;

        let mut builder = client.request(self.method, url);
        if let Some(body) = self.body {
            builder = builder.body(body);
        }

        let mut request = builder
            .build()
            .map_err(|e| TransportError::Build(e.to_string()))?;

        // append keeps every value of a multi-valued header, in order
        let headers = request.headers_mut();
        for (name, value) in self.headers.iter() {
            headers.append(name.clone(), value.clone());
        }

        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn test_url_plain() {
        let request = OutboundRequest::new(Method::GET, "/users?page=2", None, HeaderMap::new());
        let url = request.url("http", &Endpoint::new("10.0.0.1", 8080)).unwrap();
        assert_eq!(url.as_str(), "http://10.0.0.1:8080/users?page=2");
    }

    #[test]
    fn test_url_tls() {
        let request = OutboundRequest::new(Method::GET, "/health", None, HeaderMap::new());
        let url = request.url("https", &Endpoint::new("api.internal", 8443)).unwrap();
        assert_eq!(url.as_str(), "https://api.internal:8443/health");
    }

    #[test]
    fn test_url_ipv6() {
        let request = OutboundRequest::new(Method::GET, "/", None, HeaderMap::new());
        let url = request.url("http", &Endpoint::new("::1", 9000)).unwrap();
        assert_eq!(url.as_str(), "http://[::1]:9000/");
    }

    #[test]
    fn test_url_resolves_dot_segments() {
        let request = OutboundRequest::new(Method::GET, "/a/../b/./c?x=1", None, HeaderMap::new());
        let url = request.url("http", &Endpoint::new("10.0.0.1", 80)).unwrap();
        assert_eq!(url.path(), "/b/c");
        assert_eq!(url.query(), Some("x=1"));
        assert_eq!(url.as_str(), "http://10.0.0.1/b/c?x=1");
    }

    #[test]
    fn test_build_preserves_multi_valued_headers() {
        let mut headers = HeaderMap::new();
        headers.append("x-tag", HeaderValue::from_static("first"));
        headers.append("x-tag", HeaderValue::from_static("second"));
        headers.insert("x-request-id", HeaderValue::from_static("abc"));

        let request = OutboundRequest::new(
            Method::POST,
            "/items",
            Some(b"payload".to_vec()),
            headers,
        )
        .build(
            &reqwest::Client::new(),
            "http",
            &Endpoint::new("127.0.0.1", 80),
        )
        .unwrap();

        let tags: Vec<&str> = request
            .headers()
            .get_all("x-tag")
            .iter()
            .map(|v| v.to_str().unwrap())
            .collect();
        assert_eq!(tags, vec!["first", "second"]);
        assert_eq!(request.headers()["x-request-id"], "abc");
        assert_eq!(request.method(), Method::POST);
        assert_eq!(
            request.body().and_then(|b| b.as_bytes()),
            Some(&b"payload"[..])
        );
    }
}
