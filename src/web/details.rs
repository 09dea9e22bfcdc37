use crate::descriptor::{mapped_codec, Descriptor, MappedType, Property, TypeInfo};
use crate::error::Error;
use crate::mapper::{ObjectReader, ObjectWriter};

use super::request::HttpRequest;

static WEB_AUTHENTICATION_DETAILS: Descriptor = Descriptor {
    type_id: "org.springframework.security.web.authentication.WebAuthenticationDetails",
    type_info: TypeInfo::Default,
    ignore_unknown: true,
    properties: &[
        Property::required("remoteAddress", "remote_address"),
        Property::required("sessionId", "session_id"),
    ],
};

/// Where an authentication request came from: the client address and the
/// session it belonged to.
///
/// Both keys must be present on the wire; `sessionId` may be `null`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebAuthenticationDetails {
    remote_address: String,
    session_id: Option<String>,
}

impl WebAuthenticationDetails {
    /// Creates details from their parts.
    pub fn new(remote_address: impl Into<String>, session_id: Option<String>) -> Self {
        Self {
            remote_address: remote_address.into(),
            session_id,
        }
    }

    /// Records the client address and session of a request.
    pub fn from_request(request: &HttpRequest) -> Self {
        Self::new(request.remote_addr(), request.session_id().map(str::to_owned))
    }

    /// Returns the client address.
    pub fn remote_address(&self) -> &str {
        &self.remote_address
    }

    /// Returns the session id, if there was a session.
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }
}

impl MappedType for WebAuthenticationDetails {
    fn descriptor() -> &'static Descriptor {
        &WEB_AUTHENTICATION_DETAILS
    }

    fn write_properties(&self, out: &mut ObjectWriter<'_>) {
        out.property("remoteAddress", &self.remote_address)
            .property("sessionId", &self.session_id);
    }

    fn read_properties(input: &mut ObjectReader<'_>) -> Result<Self, Error> {
        Ok(Self {
            remote_address: input.required("remoteAddress")?,
            session_id: input.required("sessionId")?,
        })
    }
}

mapped_codec!(WebAuthenticationDetails);
