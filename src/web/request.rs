//! Owned snapshot of an incoming HTTP request.

use std::collections::BTreeMap;

use super::cookie::Cookie;
use super::locale::Locale;

/// An incoming request, reduced to the parts the saved-request and
/// authentication-details types read from it.
///
/// The snapshot holds plain owned data so framework integrations can fill it
/// from their own request types. Header names are matched case-insensitively.
///
/// # Examples
///
/// ```
/// use security_json::web::HttpRequest;
///
/// let mut request = HttpRequest::new();
/// request.set_method("GET");
/// request.set_request_uri("/app/orders");
/// request.add_header("X-Auth-Token", "12");
///
/// assert_eq!(request.header_values("x-auth-token"), ["12"]);
/// assert_eq!(request.request_url(), "http://localhost/app/orders");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    method: String,
    scheme: String,
    server_name: String,
    server_port: i32,
    context_path: String,
    servlet_path: String,
    request_uri: String,
    path_info: Option<String>,
    query_string: Option<String>,
    headers: Vec<(String, Vec<String>)>,
    cookies: Vec<Cookie>,
    locales: Vec<Locale>,
    parameters: BTreeMap<String, Vec<String>>,
    remote_addr: String,
    session_id: Option<String>,
}

impl HttpRequest {
    /// Creates a request for `http://localhost` with no headers or cookies.
    pub fn new() -> Self {
        Self {
            method: String::new(),
            scheme: "http".to_string(),
            server_name: "localhost".to_string(),
            server_port: 80,
            context_path: String::new(),
            servlet_path: String::new(),
            request_uri: String::new(),
            path_info: None,
            query_string: None,
            headers: Vec::new(),
            cookies: Vec::new(),
            locales: vec![Locale::new("en")],
            parameters: BTreeMap::new(),
            remote_addr: "127.0.0.1".to_string(),
            session_id: None,
        }
    }

    /// Sets the HTTP method.
    pub fn set_method(&mut self, method: impl Into<String>) {
        self.method = method.into();
    }

    /// Sets the scheme, e.g. `https`.
    pub fn set_scheme(&mut self, scheme: impl Into<String>) {
        self.scheme = scheme.into();
    }

    /// Sets the server host name.
    pub fn set_server_name(&mut self, server_name: impl Into<String>) {
        self.server_name = server_name.into();
    }

    /// Sets the port the request arrived on.
    pub fn set_server_port(&mut self, port: i32) {
        self.server_port = port;
    }

    /// Sets the application context path.
    pub fn set_context_path(&mut self, path: impl Into<String>) {
        self.context_path = path.into();
    }

    /// Sets the servlet path.
    pub fn set_servlet_path(&mut self, path: impl Into<String>) {
        self.servlet_path = path.into();
    }

    /// Sets the request URI, without the query string.
    pub fn set_request_uri(&mut self, uri: impl Into<String>) {
        self.request_uri = uri.into();
    }

    /// Sets the extra path information.
    pub fn set_path_info(&mut self, path_info: Option<String>) {
        self.path_info = path_info;
    }

    /// Sets the query string.
    pub fn set_query_string(&mut self, query: Option<String>) {
        self.query_string = query;
    }

    /// Appends a header value. Values for the same name, in any case, are kept
    /// together under the first spelling seen.
    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self
            .headers
            .iter()
            .position(|(existing, _)| existing.eq_ignore_ascii_case(&name))
        {
            Some(index) => self.headers[index].1.push(value),
            None => self.headers.push((name, vec![value])),
        }
    }

    /// Adds a cookie.
    pub fn add_cookie(&mut self, cookie: Cookie) {
        self.cookies.push(cookie);
    }

    /// Appends a parameter value.
    pub fn add_parameter(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.parameters.entry(name.into()).or_default().push(value.into());
    }

    /// Replaces the preferred locales, most preferred first.
    ///
    /// An empty list resets to `en`.
    pub fn set_locales(&mut self, locales: Vec<Locale>) {
        self.locales = if locales.is_empty() {
            vec![Locale::new("en")]
        } else {
            locales
        };
    }

    /// Sets the client address.
    pub fn set_remote_addr(&mut self, addr: impl Into<String>) {
        self.remote_addr = addr.into();
    }

    /// Sets the id of the session the request belongs to.
    pub fn set_session_id(&mut self, session_id: Option<String>) {
        self.session_id = session_id;
    }

    /// Returns the HTTP method.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Returns the scheme.
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Returns the server host name.
    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    /// Returns the port the request arrived on.
    pub fn server_port(&self) -> i32 {
        self.server_port
    }

    /// Returns the context path.
    pub fn context_path(&self) -> &str {
        &self.context_path
    }

    /// Returns the servlet path.
    pub fn servlet_path(&self) -> &str {
        &self.servlet_path
    }

    /// Returns the request URI.
    pub fn request_uri(&self) -> &str {
        &self.request_uri
    }

    /// Returns the extra path information.
    pub fn path_info(&self) -> Option<&str> {
        self.path_info.as_deref()
    }

    /// Returns the query string.
    pub fn query_string(&self) -> Option<&str> {
        self.query_string.as_deref()
    }

    /// Returns the header names in insertion order.
    pub fn header_names(&self) -> impl Iterator<Item = &str> {
        self.headers.iter().map(|(name, _)| name.as_str())
    }

    /// Returns every value of a header, matching the name case-insensitively.
    pub fn header_values(&self, name: &str) -> &[String] {
        self.headers
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, values)| values.as_slice())
            .unwrap_or(&[])
    }

    /// Returns the cookies.
    pub fn cookies(&self) -> &[Cookie] {
        &self.cookies
    }

    /// Returns the preferred locales.
    pub fn locales(&self) -> &[Locale] {
        &self.locales
    }

    /// Returns the parameters by name.
    pub fn parameters(&self) -> &BTreeMap<String, Vec<String>> {
        &self.parameters
    }

    /// Returns the client address.
    pub fn remote_addr(&self) -> &str {
        &self.remote_addr
    }

    /// Returns the session id, if the request belongs to a session.
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Rebuilds the URL the client asked for, without the query string.
    ///
    /// The port is left out when it is the scheme's default.
    pub fn request_url(&self) -> String {
        let default_port = matches!(
            (self.scheme.to_ascii_lowercase().as_str(), self.server_port),
            ("http", 80) | ("https", 443)
        );
        if default_port || self.server_port <= 0 {
            format!("{}://{}{}", self.scheme, self.server_name, self.request_uri)
        } else {
            format!(
                "{}://{}:{}{}",
                self.scheme, self.server_name, self.server_port, self.request_uri
            )
        }
    }
}

impl Default for HttpRequest {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_request_has_servlet_defaults() {
        let request = HttpRequest::new();
        assert_eq!(request.method(), "");
        assert_eq!(request.request_url(), "http://localhost");
        assert_eq!(request.locales(), [Locale::new("en")]);
        assert_eq!(request.remote_addr(), "127.0.0.1");
        assert!(request.session_id().is_none());
    }

    #[test]
    fn headers_merge_case_insensitively() {
        let mut request = HttpRequest::new();
        request.add_header("Accept", "text/html");
        request.add_header("accept", "application/json");

        assert_eq!(request.header_names().collect::<Vec<_>>(), ["Accept"]);
        assert_eq!(request.header_values("ACCEPT"), ["text/html", "application/json"]);
        assert!(request.header_values("missing").is_empty());
    }

    #[test]
    fn request_url_keeps_non_default_ports() {
        let mut request = HttpRequest::new();
        request.set_scheme("https");
        request.set_server_name("example.com");
        request.set_server_port(8443);
        request.set_request_uri("/login");
        assert_eq!(request.request_url(), "https://example.com:8443/login");

        request.set_server_port(443);
        assert_eq!(request.request_url(), "https://example.com/login");
    }

    #[test]
    fn parameters_collect_multiple_values() {
        let mut request = HttpRequest::new();
        request.add_parameter("tag", "a");
        request.add_parameter("tag", "b");
        assert_eq!(request.parameters()["tag"], ["a", "b"]);
    }

    #[test]
    fn empty_locales_fall_back_to_english() {
        let mut request = HttpRequest::new();
        request.set_locales(Vec::new());
        assert_eq!(request.locales(), [Locale::new("en")]);
    }
}
