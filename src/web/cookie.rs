//! Transport cookies and their saved copies.

use crate::descriptor::{mapped_codec, Descriptor, MappedType, Property, TypeInfo};
use crate::error::Error;
use crate::mapper::{ObjectReader, ObjectWriter};

/// `max_age` of a cookie that lives until the browser closes.
pub const SESSION_MAX_AGE: i32 = -1;

static COOKIE: Descriptor = Descriptor {
    type_id: "javax.servlet.http.Cookie",
    type_info: TypeInfo::Default,
    ignore_unknown: true,
    properties: &[
        Property::required("name", "name"),
        Property::required("value", "value"),
        Property::optional("comment", "comment"),
        Property::optional("maxAge", "max_age"),
        Property::optional("path", "path"),
        Property::optional("secure", "is_secure"),
        Property::optional("version", "version"),
        Property::optional("isHttpOnly", "is_http_only"),
        Property::optional("domain", "domain"),
    ],
};

static SAVED_COOKIE: Descriptor = Descriptor {
    type_id: "org.springframework.security.web.savedrequest.SavedCookie",
    type_info: TypeInfo::Default,
    ignore_unknown: true,
    properties: &[
        Property::required("name", "name"),
        Property::required("value", "value"),
        Property::optional("comment", "comment"),
        Property::optional("domain", "domain"),
        Property::optional("maxAge", "max_age"),
        Property::optional("path", "path"),
        Property::optional("version", "version"),
        Property::optional("secure", "is_secure"),
    ],
};

/// An HTTP cookie as seen by the servlet layer.
///
/// Unset attributes keep their transport defaults: `max_age` is
/// [`SESSION_MAX_AGE`], `version` is `0`, and the flags are off.
///
/// # Examples
///
/// ```
/// use security_json::Cookie;
///
/// let cookie = Cookie::new("SESSION", "123456789")
///     .with_path("/")
///     .with_http_only(true);
///
/// assert_eq!(cookie.max_age(), -1);
/// assert_eq!(cookie.path(), Some("/"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    name: String,
    value: String,
    comment: Option<String>,
    domain: Option<String>,
    max_age: i32,
    path: Option<String>,
    secure: bool,
    version: i32,
    http_only: bool,
}

impl Cookie {
    /// Creates a session cookie with default attributes.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            comment: None,
            domain: None,
            max_age: SESSION_MAX_AGE,
            path: None,
            secure: false,
            version: 0,
            http_only: false,
        }
    }

    /// Sets the comment.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Sets the domain.
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Sets the maximum age in seconds.
    pub fn with_max_age(mut self, max_age: i32) -> Self {
        self.max_age = max_age;
        self
    }

    /// Sets the path.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Sets the secure flag.
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Sets the cookie version.
    pub fn with_version(mut self, version: i32) -> Self {
        self.version = version;
        self
    }

    /// Sets the HTTP-only flag.
    pub fn with_http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    /// Returns the name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns the comment.
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Returns the domain.
    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    /// Returns the maximum age in seconds.
    pub fn max_age(&self) -> i32 {
        self.max_age
    }

    /// Returns the path.
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Returns the secure flag.
    pub fn is_secure(&self) -> bool {
        self.secure
    }

    /// Returns the version.
    pub fn version(&self) -> i32 {
        self.version
    }

    /// Returns the HTTP-only flag.
    pub fn is_http_only(&self) -> bool {
        self.http_only
    }
}

impl MappedType for Cookie {
    fn descriptor() -> &'static Descriptor {
        &COOKIE
    }

    fn write_properties(&self, out: &mut ObjectWriter<'_>) {
        out.property("name", &self.name)
            .property("value", &self.value)
            .property("comment", &self.comment)
            .property("maxAge", &self.max_age)
            .property("path", &self.path)
            .property("secure", &self.secure)
            .property("version", &self.version)
            .property("isHttpOnly", &self.http_only)
            .property("domain", &self.domain);
    }

    fn read_properties(input: &mut ObjectReader<'_>) -> Result<Self, Error> {
        Ok(Self {
            name: input.required("name")?,
            value: input.required("value")?,
            comment: input.optional("comment")?,
            max_age: input.optional("maxAge")?.unwrap_or(SESSION_MAX_AGE),
            path: input.optional("path")?,
            secure: input.optional("secure")?.unwrap_or(false),
            version: input.optional("version")?.unwrap_or(0),
            http_only: input.optional("isHttpOnly")?.unwrap_or(false),
            domain: input.optional("domain")?,
        })
    }
}

/// A serializable copy of a [`Cookie`] kept inside a saved request.
///
/// The HTTP-only flag is not retained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedCookie {
    name: String,
    value: String,
    comment: Option<String>,
    domain: Option<String>,
    max_age: i32,
    path: Option<String>,
    version: i32,
    secure: bool,
}

impl SavedCookie {
    /// Returns the name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns the comment.
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Returns the domain.
    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    /// Returns the maximum age in seconds.
    pub fn max_age(&self) -> i32 {
        self.max_age
    }

    /// Returns the path.
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Returns the version.
    pub fn version(&self) -> i32 {
        self.version
    }

    /// Returns the secure flag.
    pub fn is_secure(&self) -> bool {
        self.secure
    }

    /// Rebuilds a transport cookie from the saved copy.
    pub fn to_cookie(&self) -> Cookie {
        Cookie {
            name: self.name.clone(),
            value: self.value.clone(),
            comment: self.comment.clone(),
            domain: self.domain.clone(),
            max_age: self.max_age,
            path: self.path.clone(),
            secure: self.secure,
            version: self.version,
            http_only: false,
        }
    }
}

impl From<&Cookie> for SavedCookie {
    fn from(cookie: &Cookie) -> Self {
        Self {
            name: cookie.name.clone(),
            value: cookie.value.clone(),
            comment: cookie.comment.clone(),
            domain: cookie.domain.clone(),
            max_age: cookie.max_age,
            path: cookie.path.clone(),
            version: cookie.version,
            secure: cookie.secure,
        }
    }
}

impl From<Cookie> for SavedCookie {
    fn from(cookie: Cookie) -> Self {
        Self::from(&cookie)
    }
}

impl MappedType for SavedCookie {
    fn descriptor() -> &'static Descriptor {
        &SAVED_COOKIE
    }

    fn write_properties(&self, out: &mut ObjectWriter<'_>) {
        out.property("name", &self.name)
            .property("value", &self.value)
            .property("comment", &self.comment)
            .property("domain", &self.domain)
            .property("maxAge", &self.max_age)
            .property("path", &self.path)
            .property("version", &self.version)
            .property("secure", &self.secure);
    }

    fn read_properties(input: &mut ObjectReader<'_>) -> Result<Self, Error> {
        Ok(Self {
            name: input.required("name")?,
            value: input.required("value")?,
            comment: input.optional("comment")?,
            domain: input.optional("domain")?,
            max_age: input.optional("maxAge")?.unwrap_or(SESSION_MAX_AGE),
            path: input.optional("path")?,
            version: input.optional("version")?.unwrap_or(0),
            secure: input.optional("secure")?.unwrap_or(false),
        })
    }
}

mapped_codec!(Cookie, SavedCookie);
