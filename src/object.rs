//! The closed set of registered security types.

use serde_json::Value;

use crate::authority::{GrantedAuthority, SimpleGrantedAuthority};
use crate::codec::JsonCodec;
use crate::descriptor::MappedType;
use crate::error::Error;
use crate::mapper::ObjectMapper;
use crate::user::User;
use crate::web::{
    Cookie, DefaultCsrfToken, DefaultSavedRequest, SavedCookie, WebAuthenticationDetails,
};

/// Any value a mapper can read without being told its type up front.
///
/// Decoding dispatches on the payload's `@class` key over the registered
/// types. Encoding writes the wrapped value unchanged.
///
/// # Examples
///
/// ```
/// use security_json::{security_modules, ObjectMapper, SecurityObject};
///
/// let mapper = ObjectMapper::builder()
///     .register_modules(security_modules())
///     .build();
///
/// let json = r#"{"@class":"org.springframework.security.web.csrf.DefaultCsrfToken","token":"1","parameterName":"_csrf","headerName":"X-CSRF-TOKEN"}"#;
/// match mapper.from_str::<SecurityObject>(json).unwrap() {
///     SecurityObject::CsrfToken(token) => assert_eq!(token.token(), "1"),
///     other => panic!("unexpected {:?}", other),
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SecurityObject {
    /// A granted authority
    Authority(GrantedAuthority),
    /// User details
    User(User),
    /// A transport cookie
    Cookie(Cookie),
    /// A saved copy of a cookie
    SavedCookie(SavedCookie),
    /// A CSRF token
    CsrfToken(DefaultCsrfToken),
    /// A saved request
    SavedRequest(DefaultSavedRequest),
    /// Web authentication details
    AuthenticationDetails(WebAuthenticationDetails),
}

impl SecurityObject {
    /// Returns the `@class` type id of the wrapped value.
    pub fn type_id(&self) -> &'static str {
        match self {
            SecurityObject::Authority(GrantedAuthority::Simple(_)) => {
                SimpleGrantedAuthority::descriptor().type_id
            }
            SecurityObject::User(_) => User::descriptor().type_id,
            SecurityObject::Cookie(_) => Cookie::descriptor().type_id,
            SecurityObject::SavedCookie(_) => SavedCookie::descriptor().type_id,
            SecurityObject::CsrfToken(_) => DefaultCsrfToken::descriptor().type_id,
            SecurityObject::SavedRequest(_) => DefaultSavedRequest::descriptor().type_id,
            SecurityObject::AuthenticationDetails(_) => {
                WebAuthenticationDetails::descriptor().type_id
            }
        }
    }
}

impl JsonCodec for SecurityObject {
    fn encode(&self, mapper: &ObjectMapper) -> Value {
        match self {
            SecurityObject::Authority(v) => v.encode(mapper),
            SecurityObject::User(v) => v.encode(mapper),
            SecurityObject::Cookie(v) => v.encode(mapper),
            SecurityObject::SavedCookie(v) => v.encode(mapper),
            SecurityObject::CsrfToken(v) => v.encode(mapper),
            SecurityObject::SavedRequest(v) => v.encode(mapper),
            SecurityObject::AuthenticationDetails(v) => v.encode(mapper),
        }
    }

    fn decode(value: Value, mapper: &ObjectMapper) -> Result<Self, Error> {
        mapper.read_any(value)
    }
}

macro_rules! from_variant {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for SecurityObject {
                fn from(value: $ty) -> Self {
                    SecurityObject::$variant(value)
                }
            }
        )*
    };
}

from_variant!(
    Authority(GrantedAuthority),
    User(User),
    Cookie(Cookie),
    SavedCookie(SavedCookie),
    CsrfToken(DefaultCsrfToken),
    SavedRequest(DefaultSavedRequest),
    AuthenticationDetails(WebAuthenticationDetails),
);

impl From<SimpleGrantedAuthority> for SecurityObject {
    fn from(authority: SimpleGrantedAuthority) -> Self {
        SecurityObject::Authority(authority.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MappingErrorKind;
    use crate::module::security_modules;
    use serde_json::json;

    fn mapper() -> ObjectMapper {
        ObjectMapper::builder()
            .register_modules(security_modules())
            .build()
    }

    #[test]
    fn read_any_selects_the_concrete_type() {
        let object: SecurityObject = mapper()
            .from_value(json!({
                "@class": "org.springframework.security.core.authority.SimpleGrantedAuthority",
                "role": "ROLE_USER"
            }))
            .unwrap();

        assert_eq!(
            object,
            SecurityObject::from(SimpleGrantedAuthority::new("ROLE_USER"))
        );
        assert_eq!(
            object.type_id(),
            "org.springframework.security.core.authority.SimpleGrantedAuthority"
        );
    }

    #[test]
    fn encode_matches_the_wrapped_value() {
        let mapper = mapper();
        let cookie = Cookie::new("SESSION", "1");
        assert_eq!(
            mapper.to_value(&SecurityObject::from(cookie.clone())),
            mapper.to_value(&cookie)
        );
    }

    #[test]
    fn read_any_needs_a_type_id() {
        let err = mapper()
            .from_value::<SecurityObject>(json!({ "name": "SESSION", "value": "1" }))
            .unwrap_err();
        assert!(matches!(err.kind(), Some(MappingErrorKind::MissingTypeId { .. })));
    }

    #[test]
    fn read_any_rejects_unregistered_types() {
        let err = mapper()
            .from_value::<SecurityObject>(json!({ "@class": "java.lang.Runtime" }))
            .unwrap_err();
        assert_eq!(
            err.kind(),
            Some(&MappingErrorKind::UnknownType {
                type_id: "java.lang.Runtime".to_string()
            })
        );
    }

    #[test]
    fn read_any_only_sees_registered_modules() {
        let core_only = ObjectMapper::builder()
            .register_module(crate::module::CoreModule)
            .build();
        let err = core_only
            .from_value::<SecurityObject>(json!({
                "@class": "javax.servlet.http.Cookie",
                "name": "SESSION",
                "value": "1"
            }))
            .unwrap_err();
        assert!(matches!(err.kind(), Some(MappingErrorKind::UnknownType { .. })));
    }
}
