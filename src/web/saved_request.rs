//! Requests saved across an authentication round trip.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::codec;
use crate::descriptor::{mapped_codec, Descriptor, MappedType, Property, TypeInfo};
use crate::error::Error;
use crate::mapper::{ObjectReader, ObjectWriter};
use crate::typing::ARRAY_LIST;

use super::cookie::{Cookie, SavedCookie};
use super::locale::Locale;
use super::port::PortResolver;
use super::request::HttpRequest;

const DEFAULT_SERVER_PORT: i32 = 80;

// Conditional request headers, never saved.
const SKIPPED_HEADERS: [&str; 2] = ["If-Modified-Since", "If-None-Match"];

static DEFAULT_SAVED_REQUEST: Descriptor = Descriptor {
    type_id: "org.springframework.security.web.savedrequest.DefaultSavedRequest",
    type_info: TypeInfo::Default,
    ignore_unknown: true,
    properties: &[
        Property::optional("cookies", "cookies"),
        Property::optional("locales", "locales"),
        Property::optional("headers", "headers"),
        Property::optional("parameters", "parameters"),
        Property::optional("contextPath", "context_path"),
        Property::optional("method", "method"),
        Property::optional("pathInfo", "path_info"),
        Property::optional("queryString", "query_string"),
        Property::optional("requestURI", "request_uri"),
        Property::optional("requestURL", "request_url"),
        Property::optional("scheme", "scheme"),
        Property::optional("serverName", "server_name"),
        Property::optional("servletPath", "servlet_path"),
        Property::optional("serverPort", "server_port"),
    ],
};

/// A request captured before redirecting the client to authenticate, so it
/// can be replayed afterwards.
///
/// Header names are looked up case-insensitively. Cookies are kept as
/// [`SavedCookie`]s and handed back as [`Cookie`]s.
///
/// # Examples
///
/// ```
/// use security_json::web::{DefaultPortResolver, DefaultSavedRequest, HttpRequest};
///
/// let mut request = HttpRequest::new();
/// request.set_method("GET");
/// request.set_request_uri("/orders");
/// request.set_query_string(Some("page=2".to_string()));
/// request.add_header("If-None-Match", "\"abc\"");
///
/// let saved = DefaultSavedRequest::from_request(&request, &DefaultPortResolver::default());
/// assert_eq!(saved.redirect_url(), "http://localhost/orders?page=2");
/// assert_eq!(saved.header_names().count(), 0);
/// assert!(saved.does_request_match(&request, &DefaultPortResolver::default()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultSavedRequest {
    cookies: Vec<SavedCookie>,
    locales: Vec<Locale>,
    headers: BTreeMap<HeaderName, Vec<String>>,
    parameters: BTreeMap<String, Vec<String>>,
    context_path: Option<String>,
    method: Option<String>,
    path_info: Option<String>,
    query_string: Option<String>,
    request_uri: Option<String>,
    request_url: Option<String>,
    scheme: Option<String>,
    server_name: Option<String>,
    servlet_path: Option<String>,
    server_port: i32,
}

impl DefaultSavedRequest {
    /// Starts building a saved request from explicit parts.
    pub fn builder() -> SavedRequestBuilder {
        SavedRequestBuilder::new()
    }

    /// Captures an incoming request.
    ///
    /// Conditional headers are dropped and the port is taken from the resolver.
    pub fn from_request(request: &HttpRequest, port_resolver: &dyn PortResolver) -> Self {
        let mut headers = BTreeMap::new();
        for name in request.header_names() {
            if SKIPPED_HEADERS.iter().any(|h| h.eq_ignore_ascii_case(name)) {
                tracing::trace!(header = name, "not saving conditional header");
                continue;
            }
            for value in request.header_values(name) {
                insert_header(&mut headers, name, value.clone());
            }
        }

        Self {
            cookies: request.cookies().iter().map(SavedCookie::from).collect(),
            locales: request.locales().to_vec(),
            headers,
            parameters: request.parameters().clone(),
            context_path: Some(request.context_path().to_string()),
            method: Some(request.method().to_string()),
            path_info: request.path_info().map(str::to_owned),
            query_string: request.query_string().map(str::to_owned),
            request_uri: Some(request.request_uri().to_string()),
            request_url: Some(request.request_url()),
            scheme: Some(request.scheme().to_string()),
            server_name: Some(request.server_name().to_string()),
            servlet_path: Some(request.servlet_path().to_string()),
            server_port: port_resolver.server_port(request),
        }
    }

    /// Returns the saved cookies as transport cookies.
    pub fn cookies(&self) -> Vec<Cookie> {
        self.cookies.iter().map(SavedCookie::to_cookie).collect()
    }

    /// Returns the saved header names, sorted ignoring case.
    pub fn header_names(&self) -> impl Iterator<Item = &str> {
        self.headers.keys().map(|name| name.0.as_str())
    }

    /// Returns the values of a header, matching the name case-insensitively.
    pub fn header_values(&self, name: &str) -> &[String] {
        self.headers
            .get(&HeaderName(name.to_string()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Returns the saved parameter names, sorted.
    pub fn parameter_names(&self) -> impl Iterator<Item = &str> {
        self.parameters.keys().map(String::as_str)
    }

    /// Returns the values of a parameter.
    pub fn parameter_values(&self, name: &str) -> &[String] {
        self.parameters.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns all parameters by name.
    pub fn parameters(&self) -> &BTreeMap<String, Vec<String>> {
        &self.parameters
    }

    /// Returns the locales, most preferred first.
    pub fn locales(&self) -> &[Locale] {
        &self.locales
    }

    /// Returns the HTTP method.
    pub fn method(&self) -> Option<&str> {
        self.method.as_deref()
    }

    /// Returns the context path.
    pub fn context_path(&self) -> Option<&str> {
        self.context_path.as_deref()
    }

    /// Returns the extra path information.
    pub fn path_info(&self) -> Option<&str> {
        self.path_info.as_deref()
    }

    /// Returns the query string.
    pub fn query_string(&self) -> Option<&str> {
        self.query_string.as_deref()
    }

    /// Returns the request URI.
    pub fn request_uri(&self) -> Option<&str> {
        self.request_uri.as_deref()
    }

    /// Returns the request URL.
    pub fn request_url(&self) -> Option<&str> {
        self.request_url.as_deref()
    }

    /// Returns the scheme.
    pub fn scheme(&self) -> Option<&str> {
        self.scheme.as_deref()
    }

    /// Returns the server host name.
    pub fn server_name(&self) -> Option<&str> {
        self.server_name.as_deref()
    }

    /// Returns the servlet path.
    pub fn servlet_path(&self) -> Option<&str> {
        self.servlet_path.as_deref()
    }

    /// Returns the server port.
    pub fn server_port(&self) -> i32 {
        self.server_port
    }

    /// Returns the full URL to send the client back to, query string included.
    ///
    /// The port is left out when it is the scheme's default.
    pub fn redirect_url(&self) -> String {
        let scheme = self.scheme.as_deref().unwrap_or("http");
        let server_name = self.server_name.as_deref().unwrap_or_default();
        let default_port = matches!(
            (scheme.to_ascii_lowercase().as_str(), self.server_port),
            ("http", 80) | ("https", 443)
        );

        let mut url = if default_port {
            format!("{}://{}", scheme, server_name)
        } else {
            format!("{}://{}:{}", scheme, server_name, self.server_port)
        };
        url.push_str(self.request_uri.as_deref().unwrap_or_default());
        if let Some(query) = self.query_string.as_deref() {
            url.push('?');
            url.push_str(query);
        }
        url
    }

    /// Returns true if `request` is a replay of the saved request.
    ///
    /// Path, query, URI, URL, scheme, host, resolved port, context and servlet
    /// paths must all agree. A saved `GET` never matches another method.
    pub fn does_request_match(&self, request: &HttpRequest, port_resolver: &dyn PortResolver) -> bool {
        if !property_equals("pathInfo", self.path_info.as_deref(), request.path_info())
            || !property_equals("queryString", self.query_string.as_deref(), request.query_string())
            || !property_equals("requestURI", self.request_uri.as_deref(), Some(request.request_uri()))
        {
            return false;
        }

        if self.method.as_deref() == Some("GET") && request.method() != "GET" {
            tracing::debug!(method = request.method(), "saved GET request does not match");
            return false;
        }

        let port = port_resolver.server_port(request);
        if self.server_port != port {
            tracing::debug!(
                saved = self.server_port,
                current = port,
                "serverPort did not match"
            );
            return false;
        }

        let request_url = request.request_url();
        property_equals("requestURL", self.request_url.as_deref(), Some(request_url.as_str()))
            && property_equals("scheme", self.scheme.as_deref(), Some(request.scheme()))
            && property_equals("serverName", self.server_name.as_deref(), Some(request.server_name()))
            && property_equals("contextPath", self.context_path.as_deref(), Some(request.context_path()))
            && property_equals("servletPath", self.servlet_path.as_deref(), Some(request.servlet_path()))
    }
}

fn property_equals(property: &'static str, saved: Option<&str>, current: Option<&str>) -> bool {
    let equal = saved == current;
    if equal {
        tracing::trace!(property, "saved request property matched");
    } else {
        tracing::debug!(property, ?saved, ?current, "saved request property did not match");
    }
    equal
}

/// Header name ordered and compared ignoring ASCII case. The first spelling
/// inserted is the one kept.
#[derive(Debug, Clone)]
struct HeaderName(String);

impl HeaderName {
    fn folded(&self) -> impl Iterator<Item = u8> + '_ {
        self.0.bytes().map(|b| b.to_ascii_lowercase())
    }
}

impl AsRef<str> for HeaderName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq for HeaderName {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for HeaderName {}

impl PartialOrd for HeaderName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeaderName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.folded().cmp(other.folded())
    }
}

fn insert_header(headers: &mut BTreeMap<HeaderName, Vec<String>>, name: &str, value: String) {
    headers
        .entry(HeaderName(name.to_string()))
        .or_default()
        .push(value);
}

impl MappedType for DefaultSavedRequest {
    fn descriptor() -> &'static Descriptor {
        &DEFAULT_SAVED_REQUEST
    }

    fn write_properties(&self, out: &mut ObjectWriter<'_>) {
        let mapper = out.mapper();
        let cookies = self.cookies();
        let headers = codec::encode_map(mapper, &self.headers, |values| {
            codec::encode_sequence(mapper, ARRAY_LIST, values)
        });
        let parameters =
            codec::encode_map(mapper, &self.parameters, |values| codec::encode_string_array(values));

        out.property("cookies", &cookies)
            .property("locales", &self.locales)
            .raw("headers", headers)
            .raw("parameters", parameters)
            .property("contextPath", &self.context_path)
            .property("method", &self.method)
            .property("pathInfo", &self.path_info)
            .property("queryString", &self.query_string)
            .property("requestURI", &self.request_uri)
            .property("requestURL", &self.request_url)
            .property("scheme", &self.scheme)
            .property("serverName", &self.server_name)
            .property("servletPath", &self.servlet_path)
            .property("serverPort", &self.server_port);
    }

    fn read_properties(input: &mut ObjectReader<'_>) -> Result<Self, Error> {
        let cookies: Vec<Cookie> = input.optional("cookies")?.unwrap_or_default();
        let saved_headers: BTreeMap<String, Vec<String>> = input
            .optional_with("headers", |value, mapper| {
                codec::decode_map(value, mapper, |values| codec::decode_sequence(values, mapper))
            })?
            .unwrap_or_default();
        let mut headers = BTreeMap::new();
        for (name, values) in saved_headers {
            for value in values {
                insert_header(&mut headers, &name, value);
            }
        }
        let parameters: BTreeMap<String, Vec<String>> = input
            .optional_with("parameters", |value, mapper| {
                codec::decode_map(value, mapper, codec::decode_string_array)
            })?
            .unwrap_or_default();

        Ok(Self {
            cookies: cookies.iter().map(SavedCookie::from).collect(),
            locales: input.optional("locales")?.unwrap_or_default(),
            headers,
            parameters,
            context_path: input.optional("contextPath")?,
            method: input.optional("method")?,
            path_info: input.optional("pathInfo")?,
            query_string: input.optional("queryString")?,
            request_uri: input.optional("requestURI")?,
            request_url: input.optional("requestURL")?,
            scheme: input.optional("scheme")?,
            server_name: input.optional("serverName")?,
            servlet_path: input.optional("servletPath")?,
            server_port: input.optional("serverPort")?.unwrap_or(DEFAULT_SERVER_PORT),
        })
    }
}

mapped_codec!(DefaultSavedRequest);

/// Builder for a [`DefaultSavedRequest`].
///
/// Unset strings stay `null` and the port defaults to `80`.
#[derive(Debug, Clone)]
pub struct SavedRequestBuilder {
    request: DefaultSavedRequest,
}

impl SavedRequestBuilder {
    fn new() -> Self {
        Self {
            request: DefaultSavedRequest {
                cookies: Vec::new(),
                locales: Vec::new(),
                headers: BTreeMap::new(),
                parameters: BTreeMap::new(),
                context_path: None,
                method: None,
                path_info: None,
                query_string: None,
                request_uri: None,
                request_url: None,
                scheme: None,
                server_name: None,
                servlet_path: None,
                server_port: DEFAULT_SERVER_PORT,
            },
        }
    }

    /// Sets the cookies.
    pub fn cookies(mut self, cookies: impl IntoIterator<Item = Cookie>) -> Self {
        self.request.cookies = cookies.into_iter().map(SavedCookie::from).collect();
        self
    }

    /// Appends a header value, merging names case-insensitively.
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        insert_header(&mut self.request.headers, name, value.into());
        self
    }

    /// Replaces all headers.
    pub fn headers(mut self, headers: BTreeMap<String, Vec<String>>) -> Self {
        self.request.headers = BTreeMap::new();
        for (name, values) in headers {
            for value in values {
                insert_header(&mut self.request.headers, &name, value);
            }
        }
        self
    }

    /// Sets the locales.
    pub fn locales(mut self, locales: Vec<Locale>) -> Self {
        self.request.locales = locales;
        self
    }

    /// Appends a parameter value.
    pub fn parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.request
            .parameters
            .entry(name.into())
            .or_default()
            .push(value.into());
        self
    }

    /// Replaces all parameters.
    pub fn parameters(mut self, parameters: BTreeMap<String, Vec<String>>) -> Self {
        self.request.parameters = parameters;
        self
    }

    /// Sets the context path.
    pub fn context_path(mut self, path: impl Into<String>) -> Self {
        self.request.context_path = Some(path.into());
        self
    }

    /// Sets the HTTP method.
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.request.method = Some(method.into());
        self
    }

    /// Sets the extra path information.
    pub fn path_info(mut self, path_info: impl Into<String>) -> Self {
        self.request.path_info = Some(path_info.into());
        self
    }

    /// Sets the query string.
    pub fn query_string(mut self, query: impl Into<String>) -> Self {
        self.request.query_string = Some(query.into());
        self
    }

    /// Sets the request URI.
    pub fn request_uri(mut self, uri: impl Into<String>) -> Self {
        self.request.request_uri = Some(uri.into());
        self
    }

    /// Sets the request URL.
    pub fn request_url(mut self, url: impl Into<String>) -> Self {
        self.request.request_url = Some(url.into());
        self
    }

    /// Sets the scheme.
    pub fn scheme(mut self, scheme: impl Into<String>) -> Self {
        self.request.scheme = Some(scheme.into());
        self
    }

    /// Sets the server host name.
    pub fn server_name(mut self, server_name: impl Into<String>) -> Self {
        self.request.server_name = Some(server_name.into());
        self
    }

    /// Sets the servlet path.
    pub fn servlet_path(mut self, path: impl Into<String>) -> Self {
        self.request.servlet_path = Some(path.into());
        self
    }

    /// Sets the server port.
    pub fn server_port(mut self, port: i32) -> Self {
        self.request.server_port = port;
        self
    }

    /// Finishes the saved request.
    pub fn build(self) -> DefaultSavedRequest {
        self.request
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MappingErrorKind;
    use crate::mapper::ObjectMapper;
    use crate::web::{DefaultPortResolver, WebModule};
    use serde_json::json;

    fn mapper() -> ObjectMapper {
        ObjectMapper::builder().register_module(WebModule).build()
    }

    fn get_request() -> HttpRequest {
        let mut request = HttpRequest::new();
        request.set_method("GET");
        request.set_context_path("/app");
        request.set_request_uri("/app/orders");
        request.add_header("Accept", "text/html");
        request
    }

    #[test]
    fn conditional_headers_are_not_saved() {
        let mut request = get_request();
        request.add_header("if-modified-since", "Mon, 01 Jan 2024 00:00:00 GMT");
        request.add_header("If-None-Match", "\"v1\"");

        let saved = DefaultSavedRequest::from_request(&request, &DefaultPortResolver::default());
        assert_eq!(saved.header_names().collect::<Vec<_>>(), ["Accept"]);
        assert_eq!(saved.header_values("accept"), ["text/html"]);
    }

    #[test]
    fn builder_merges_header_names_ignoring_case() {
        let saved = DefaultSavedRequest::builder()
            .header("X-Trace", "1")
            .header("x-trace", "2")
            .build();
        assert_eq!(saved.header_values("X-TRACE"), ["1", "2"]);
    }

    #[test]
    fn headers_are_written_in_case_insensitive_order() {
        let saved = DefaultSavedRequest::builder()
            .header("X-Auth", "token")
            .header("accept", "text/html")
            .header("Content-Type", "text/plain")
            .build();

        let text = mapper().to_string(&saved).unwrap();
        assert!(text.contains(concat!(
            r#""headers":{"@class":"java.util.TreeMap","#,
            r#""accept":["java.util.ArrayList",["text/html"]],"#,
            r#""Content-Type":["java.util.ArrayList",["text/plain"]],"#,
            r#""X-Auth":["java.util.ArrayList",["token"]]}"#
        )));
        assert_eq!(
            saved.header_names().collect::<Vec<_>>(),
            ["accept", "Content-Type", "X-Auth"]
        );

        let back: DefaultSavedRequest = mapper().from_str(&text).unwrap();
        assert_eq!(back.header_values("x-auth"), ["token"]);
        assert_eq!(back, saved);
    }

    #[test]
    fn unset_builder_fields_serialize_as_null() {
        let json = mapper().to_value(&DefaultSavedRequest::builder().build());
        assert_eq!(json["method"], serde_json::Value::Null);
        assert_eq!(json["serverPort"], json!(80));
        assert_eq!(json["cookies"], json!(["java.util.ArrayList", []]));
        assert_eq!(json["parameters"], json!({ "@class": "java.util.TreeMap" }));
    }

    #[test]
    fn parameters_are_plain_string_arrays() {
        let saved = DefaultSavedRequest::builder()
            .parameter("tag", "a")
            .parameter("tag", "b")
            .build();
        let json = mapper().to_value(&saved);
        assert_eq!(
            json["parameters"],
            json!({ "@class": "java.util.TreeMap", "tag": ["a", "b"] })
        );

        let back: DefaultSavedRequest = mapper().from_value(json).unwrap();
        assert_eq!(back.parameter_values("tag"), ["a", "b"]);
    }

    #[test]
    fn empty_object_reads_with_defaults() {
        let saved: DefaultSavedRequest = mapper()
            .from_value(json!({
                "@class": "org.springframework.security.web.savedrequest.DefaultSavedRequest"
            }))
            .unwrap();
        assert_eq!(saved, DefaultSavedRequest::builder().build());
    }

    #[test]
    fn untyped_header_values_are_rejected_with_path() {
        let err = mapper()
            .from_value::<DefaultSavedRequest>(json!({
                "@class": "org.springframework.security.web.savedrequest.DefaultSavedRequest",
                "headers": { "@class": "java.util.TreeMap", "x-auth-token": "12" }
            }))
            .unwrap_err();
        match err {
            Error::Mapping(e) => {
                assert_eq!(e.kind, MappingErrorKind::InvalidValue);
                assert_eq!(e.path(), "headers.x-auth-token");
            }
            Error::Json(_) => panic!("expected mapping error"),
        }
    }

    #[test]
    fn replayed_request_matches() {
        let request = get_request();
        let resolver = DefaultPortResolver::default();
        let saved = DefaultSavedRequest::from_request(&request, &resolver);
        assert!(saved.does_request_match(&request, &resolver));
    }

    #[test]
    fn saved_get_does_not_match_post() {
        let resolver = DefaultPortResolver::default();
        let saved = DefaultSavedRequest::from_request(&get_request(), &resolver);

        let mut post = get_request();
        post.set_method("POST");
        assert!(!saved.does_request_match(&post, &resolver));
    }

    #[test]
    fn different_query_does_not_match() {
        let resolver = DefaultPortResolver::default();
        let saved = DefaultSavedRequest::from_request(&get_request(), &resolver);

        let mut other = get_request();
        other.set_query_string(Some("page=3".to_string()));
        assert!(!saved.does_request_match(&other, &resolver));
    }

    #[test]
    fn redirect_url_keeps_non_default_port() {
        let saved = DefaultSavedRequest::builder()
            .scheme("https")
            .server_name("example.com")
            .server_port(8443)
            .request_uri("/app/orders")
            .query_string("page=2")
            .build();
        assert_eq!(saved.redirect_url(), "https://example.com:8443/app/orders?page=2");
    }
}
