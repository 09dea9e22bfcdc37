//! Per-type mapping descriptors.
//!
//! A [`Descriptor`] is a static table describing the serialized shape of one
//! domain type: its type id, the external key of every property, which keys are
//! needed to reconstruct the value, and whether extra keys are tolerated.
//! [`MappedType`] ties a descriptor to the write and read rules of the type.

use crate::error::Error;
use crate::mapper::{ObjectReader, ObjectWriter};

/// Whether a type writes its `@class` key regardless of the mapper policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeInfo {
    /// Always embed the type id
    Always,
    /// Embed the type id only when default typing is enabled
    Default,
}

/// One externally visible property of a mapped type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Property {
    /// Key used on the wire, in both directions
    pub key: &'static str,
    /// Name of the accessor on the domain type that supplies the value
    pub accessor: &'static str,
    /// Whether the key must be present to reconstruct the value
    pub required: bool,
}

impl Property {
    /// A property the reconstruction rule cannot do without.
    pub const fn required(key: &'static str, accessor: &'static str) -> Self {
        Self {
            key,
            accessor,
            required: true,
        }
    }

    /// A property that falls back to the type's default when absent.
    pub const fn optional(key: &'static str, accessor: &'static str) -> Self {
        Self {
            key,
            accessor,
            required: false,
        }
    }
}

/// Static mapping table for one domain type.
///
/// # Example
///
/// ```
/// use security_json::{MappedType, SimpleGrantedAuthority};
///
/// let descriptor = SimpleGrantedAuthority::descriptor();
/// assert_eq!(descriptor.key_for_accessor("authority"), Some("role"));
/// assert_eq!(descriptor.required_keys().collect::<Vec<_>>(), vec!["role"]);
/// ```
#[derive(Debug)]
pub struct Descriptor {
    /// Discriminator written under `@class`
    pub type_id: &'static str,
    /// Type-embedding rule for this type
    pub type_info: TypeInfo,
    /// Whether unknown input keys are ignored rather than rejected
    pub ignore_unknown: bool,
    /// Every property, in wire order
    pub properties: &'static [Property],
}

impl Descriptor {
    /// Looks up a property by its external key.
    pub fn property(&self, key: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.key == key)
    }

    /// Returns the external key under which an accessor is exposed.
    pub fn key_for_accessor(&self, accessor: &str) -> Option<&'static str> {
        self.properties
            .iter()
            .find(|p| p.accessor == accessor)
            .map(|p| p.key)
    }

    /// Returns the keys that must be present on read.
    pub fn required_keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.properties.iter().filter(|p| p.required).map(|p| p.key)
    }

    /// Returns true if `key` is a declared property.
    pub fn declares(&self, key: &str) -> bool {
        self.property(key).is_some()
    }
}

/// A domain type with a descriptor and explicit write/read rules.
///
/// Implementations write every declared key, in descriptor order, and read the
/// required keys with [`ObjectReader::required`].
pub trait MappedType: Sized {
    /// Returns the static descriptor of this type.
    fn descriptor() -> &'static Descriptor;

    /// Writes every declared property.
    fn write_properties(&self, out: &mut ObjectWriter<'_>);

    /// Reconstructs the value from its properties.
    fn read_properties(input: &mut ObjectReader<'_>) -> Result<Self, Error>;
}

/// Implements [`JsonCodec`](crate::JsonCodec) for mapped types by delegating to the mapper.
macro_rules! mapped_codec {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $crate::codec::JsonCodec for $ty {
                fn encode(&self, mapper: &$crate::mapper::ObjectMapper) -> serde_json::Value {
                    mapper.write_object(self)
                }

                fn decode(
                    value: serde_json::Value,
                    mapper: &$crate::mapper::ObjectMapper,
                ) -> Result<Self, $crate::error::Error> {
                    mapper.read_object(value)
                }
            }
        )*
    };
}

pub(crate) use mapped_codec;
