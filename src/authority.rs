//! Granted authorities.

use std::cmp::Ordering;
use std::fmt;

use serde_json::Value;

use crate::codec::{self, JsonCodec};
use crate::descriptor::{mapped_codec, Descriptor, MappedType, Property, TypeInfo};
use crate::error::{Error, MappingError, MappingErrorKind};
use crate::mapper::{unknown_type, ObjectMapper, ObjectReader, ObjectWriter};
use crate::typing::TYPE_PROPERTY;

static SIMPLE_GRANTED_AUTHORITY: Descriptor = Descriptor {
    type_id: "org.springframework.security.core.authority.SimpleGrantedAuthority",
    type_info: TypeInfo::Always,
    ignore_unknown: true,
    properties: &[Property::required("role", "authority")],
};

/// An authority backed by a single role string, e.g. `ROLE_USER`.
///
/// On the wire the authority string is exposed under the key `role`:
///
/// ```json
/// {"@class":"org.springframework.security.core.authority.SimpleGrantedAuthority","role":"ROLE_USER"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SimpleGrantedAuthority {
    role: String,
}

impl SimpleGrantedAuthority {
    /// Creates an authority for the given role.
    pub fn new(role: impl Into<String>) -> Self {
        Self { role: role.into() }
    }

    /// Returns the authority string.
    pub fn authority(&self) -> &str {
        &self.role
    }
}

impl fmt::Display for SimpleGrantedAuthority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.role)
    }
}

impl MappedType for SimpleGrantedAuthority {
    fn descriptor() -> &'static Descriptor {
        &SIMPLE_GRANTED_AUTHORITY
    }

    fn write_properties(&self, out: &mut ObjectWriter<'_>) {
        out.property("role", &self.role);
    }

    fn read_properties(input: &mut ObjectReader<'_>) -> Result<Self, Error> {
        let role: String = input.required("role")?;
        if role.trim().is_empty() {
            return Err(input.invalid("role", "a blank role is not a valid authority"));
        }
        Ok(Self { role })
    }
}

mapped_codec!(SimpleGrantedAuthority);

/// Any authority that can be granted to a principal.
///
/// The variant is selected on read from the `@class` discriminator. The set of
/// variants is closed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum GrantedAuthority {
    /// A role-string authority
    Simple(SimpleGrantedAuthority),
}

impl GrantedAuthority {
    /// Returns the authority string.
    pub fn authority(&self) -> &str {
        match self {
            GrantedAuthority::Simple(a) => a.authority(),
        }
    }
}

impl From<SimpleGrantedAuthority> for GrantedAuthority {
    fn from(authority: SimpleGrantedAuthority) -> Self {
        GrantedAuthority::Simple(authority)
    }
}

// Authorities sort by their authority string, like a user's authority set.
impl Ord for GrantedAuthority {
    fn cmp(&self, other: &Self) -> Ordering {
        self.authority().cmp(other.authority())
    }
}

impl PartialOrd for GrantedAuthority {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for GrantedAuthority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.authority())
    }
}

impl JsonCodec for GrantedAuthority {
    fn encode(&self, mapper: &ObjectMapper) -> Value {
        match self {
            GrantedAuthority::Simple(a) => a.encode(mapper),
        }
    }

    fn decode(value: Value, mapper: &ObjectMapper) -> Result<Self, Error> {
        let simple = SimpleGrantedAuthority::descriptor().type_id;
        let type_id = match value.get(TYPE_PROPERTY) {
            Some(Value::String(type_id)) => Some(type_id.clone()),
            Some(other) => {
                return Err(codec::unexpected("a type id string", other).within(TYPE_PROPERTY))
            }
            None => None,
        };
        match type_id {
            Some(type_id) if type_id == simple => {
                SimpleGrantedAuthority::decode(value, mapper).map(GrantedAuthority::Simple)
            }
            Some(type_id) => match mapper.registered_type_id(&value) {
                Some(registered) => Err(MappingError::new(
                    MappingErrorKind::TypeMismatch {
                        expected: simple,
                        found: registered.to_string(),
                    },
                    "not an authority type",
                )
                .into()),
                None => Err(unknown_type(type_id)),
            },
            None => Err(MappingError::new(
                MappingErrorKind::MissingTypeId { expected: simple },
                "authorities are polymorphic and must carry their concrete type",
            )
            .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::CoreModule;
    use serde_json::json;

    fn mapper() -> ObjectMapper {
        ObjectMapper::builder().register_module(CoreModule).build()
    }

    #[test]
    fn authority_is_written_under_role() {
        let json = mapper().to_value(&SimpleGrantedAuthority::new("ROLE_USER"));
        assert_eq!(
            json,
            json!({
                "@class": "org.springframework.security.core.authority.SimpleGrantedAuthority",
                "role": "ROLE_USER"
            })
        );
        assert!(json.get("authority").is_none());
    }

    #[test]
    fn blank_role_is_rejected() {
        let err = mapper()
            .from_value::<SimpleGrantedAuthority>(json!({
                "@class": "org.springframework.security.core.authority.SimpleGrantedAuthority",
                "role": "  "
            }))
            .unwrap_err();

        match err {
            Error::Mapping(e) => {
                assert_eq!(e.kind, MappingErrorKind::InvalidValue);
                assert_eq!(e.path(), "role");
            }
            Error::Json(_) => panic!("expected mapping error"),
        }
    }

    #[test]
    fn polymorphic_authority_dispatches_on_type_id() {
        let authority: GrantedAuthority = mapper()
            .from_value(json!({
                "@class": "org.springframework.security.core.authority.SimpleGrantedAuthority",
                "role": "ROLE_ADMIN"
            }))
            .unwrap();
        assert_eq!(authority.authority(), "ROLE_ADMIN");
    }

    #[test]
    fn polymorphic_authority_needs_type_id() {
        let err = mapper()
            .from_value::<GrantedAuthority>(json!({ "role": "ROLE_ADMIN" }))
            .unwrap_err();
        assert!(matches!(err.kind(), Some(MappingErrorKind::MissingTypeId { .. })));
    }

    #[test]
    fn polymorphic_authority_rejects_non_string_type_id() {
        let err = mapper()
            .from_value::<GrantedAuthority>(json!({ "@class": 7, "role": "ROLE_ADMIN" }))
            .unwrap_err();

        match err {
            Error::Mapping(e) => {
                assert_eq!(e.kind, MappingErrorKind::InvalidValue);
                assert_eq!(e.path(), "@class");
            }
            Error::Json(_) => panic!("expected mapping error"),
        }
    }

    #[test]
    fn polymorphic_authority_rejects_unknown_types() {
        let err = mapper()
            .from_value::<GrantedAuthority>(json!({
                "@class": "com.example.CustomAuthority",
                "role": "ROLE_ADMIN"
            }))
            .unwrap_err();
        assert_eq!(
            err.kind(),
            Some(&MappingErrorKind::UnknownType {
                type_id: "com.example.CustomAuthority".to_string()
            })
        );
    }

    #[test]
    fn polymorphic_authority_rejects_other_registered_types() {
        let err = mapper()
            .from_value::<GrantedAuthority>(json!({
                "@class": "org.springframework.security.core.userdetails.User",
                "username": "admin"
            }))
            .unwrap_err();
        assert!(matches!(err.kind(), Some(MappingErrorKind::TypeMismatch { .. })));
    }

    #[test]
    fn authorities_order_by_authority_string() {
        let a = GrantedAuthority::from(SimpleGrantedAuthority::new("ROLE_ADMIN"));
        let b = GrantedAuthority::from(SimpleGrantedAuthority::new("ROLE_USER"));
        assert!(a < b);
        assert_eq!(b.to_string(), "ROLE_USER");
    }
}
