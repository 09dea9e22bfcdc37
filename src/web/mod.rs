//! Web-layer types and their registrar.
//!
//! This module holds the types a web application persists between requests:
//! transport cookies, CSRF tokens, saved requests and authentication details.
//! [`WebModule`] registers all of them with a mapper.
//!
//! It also provides [`HttpRequest`], an owned snapshot that framework
//! integrations fill from their own request type, and the port handling used
//! when a saved request is compared with a replayed one.
//!
//! # Example Flow
//!
//! ```
//! use security_json::web::{DefaultPortResolver, DefaultSavedRequest, HttpRequest, WebModule};
//! use security_json::ObjectMapper;
//!
//! let mapper = ObjectMapper::builder().register_module(WebModule).build();
//! let resolver = DefaultPortResolver::default();
//!
//! // 1. Capture the request before sending the client to log in
//! let mut request = HttpRequest::new();
//! request.set_method("GET");
//! request.set_request_uri("/reports");
//! let saved = DefaultSavedRequest::from_request(&request, &resolver);
//!
//! // 2. Store it as JSON
//! let json = mapper.to_string(&saved).unwrap();
//!
//! // 3. Read it back after login and check the replay
//! let restored: DefaultSavedRequest = mapper.from_str(&json).unwrap();
//! assert!(restored.does_request_match(&request, &resolver));
//! ```

mod cookie;
mod csrf;
mod details;
mod locale;
mod port;
mod request;
mod saved_request;

pub use cookie::{Cookie, SavedCookie, SESSION_MAX_AGE};
pub use csrf::DefaultCsrfToken;
pub use details::WebAuthenticationDetails;
pub use locale::Locale;
pub use port::{DefaultPortResolver, PortMapper, PortResolver};
pub use request::HttpRequest;
pub use saved_request::{DefaultSavedRequest, SavedRequestBuilder};

use crate::module::{Module, SetupContext};

/// Registers the web types: [`Cookie`], [`SavedCookie`], [`DefaultCsrfToken`],
/// [`DefaultSavedRequest`] and [`WebAuthenticationDetails`].
#[derive(Debug, Clone, Copy, Default)]
pub struct WebModule;

impl Module for WebModule {
    fn name(&self) -> &'static str {
        "WebModule"
    }

    fn setup(&self, cx: &mut SetupContext<'_>) {
        cx.enable_default_typing();
        cx.register::<Cookie>();
        cx.register::<SavedCookie>();
        cx.register::<DefaultCsrfToken>();
        cx.register::<DefaultSavedRequest>();
        cx.register::<WebAuthenticationDetails>();
    }
}
