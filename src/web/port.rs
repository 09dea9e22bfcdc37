//! Port mapping between the HTTP and HTTPS sides of a deployment.

use std::collections::BTreeMap;

use super::request::HttpRequest;

/// Pairs of HTTP and HTTPS ports served by the same application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortMapper {
    http_to_https: BTreeMap<i32, i32>,
}

impl PortMapper {
    /// Creates a mapper with no pairs.
    pub fn empty() -> Self {
        Self {
            http_to_https: BTreeMap::new(),
        }
    }

    /// Adds an HTTP/HTTPS pair.
    pub fn with_mapping(mut self, http_port: i32, https_port: i32) -> Self {
        self.http_to_https.insert(http_port, https_port);
        self
    }

    /// Returns the HTTP port paired with an HTTPS port.
    pub fn lookup_http_port(&self, https_port: i32) -> Option<i32> {
        self.http_to_https
            .iter()
            .find(|(_, https)| **https == https_port)
            .map(|(http, _)| *http)
    }

    /// Returns the HTTPS port paired with an HTTP port.
    pub fn lookup_https_port(&self, http_port: i32) -> Option<i32> {
        self.http_to_https.get(&http_port).copied()
    }
}

impl Default for PortMapper {
    /// `80 <-> 443` and `8080 <-> 8443`.
    fn default() -> Self {
        Self::empty().with_mapping(80, 443).with_mapping(8080, 8443)
    }
}

/// Determines the port a request was really made on.
pub trait PortResolver {
    /// Returns the port of the request, corrected for port-mapped deployments.
    fn server_port(&self, request: &HttpRequest) -> i32;
}

/// Resolves ports through a [`PortMapper`].
///
/// A request whose scheme disagrees with its port (an `http` request arriving
/// on the mapped HTTPS port, e.g. behind a TLS-terminating proxy) is reported on
/// the paired port of its own scheme.
#[derive(Debug, Clone, Default)]
pub struct DefaultPortResolver {
    mapper: PortMapper,
}

impl DefaultPortResolver {
    /// Creates a resolver using the given mapper.
    pub fn new(mapper: PortMapper) -> Self {
        Self { mapper }
    }
}

impl PortResolver for DefaultPortResolver {
    fn server_port(&self, request: &HttpRequest) -> i32 {
        let port = request.server_port();
        let mapped = match request.scheme().to_ascii_lowercase().as_str() {
            "http" => self.mapper.lookup_http_port(port),
            "https" => self.mapper.lookup_https_port(port),
            _ => None,
        };
        mapped.unwrap_or(port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_mapper_pairs_standard_ports() {
        let mapper = PortMapper::default();
        assert_eq!(mapper.lookup_https_port(80), Some(443));
        assert_eq!(mapper.lookup_http_port(8443), Some(8080));
        assert_eq!(mapper.lookup_http_port(80), None);
    }

    #[test]
    fn resolver_keeps_consistent_ports() {
        let resolver = DefaultPortResolver::default();
        let request = HttpRequest::new();
        assert_eq!(resolver.server_port(&request), 80);
    }

    #[test]
    fn resolver_maps_http_on_https_port() {
        let resolver = DefaultPortResolver::default();
        let mut request = HttpRequest::new();
        request.set_server_port(443);
        assert_eq!(resolver.server_port(&request), 80);
    }

    #[test]
    fn resolver_maps_https_on_http_port() {
        let resolver = DefaultPortResolver::default();
        let mut request = HttpRequest::new();
        request.set_scheme("https");
        request.set_server_port(8080);
        assert_eq!(resolver.server_port(&request), 8443);
    }

    #[test]
    fn unknown_ports_pass_through() {
        let resolver = DefaultPortResolver::new(PortMapper::empty());
        let mut request = HttpRequest::new();
        request.set_server_port(9000);
        assert_eq!(resolver.server_port(&request), 9000);
    }
}
