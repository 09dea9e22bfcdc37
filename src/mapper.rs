use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::codec::{self, JsonCodec};
use crate::config::{DefaultTyping, MapperConfig, UnknownProperties};
use crate::descriptor::{Descriptor, MappedType, TypeInfo};
use crate::error::{Error, MappingError, MappingErrorKind};
use crate::module::{Module, SetupContext};
use crate::object::SecurityObject;
use crate::typing::TYPE_PROPERTY;

type DecodeAny = fn(&ObjectMapper, Value) -> Result<SecurityObject, Error>;

/// A registered type: its descriptor plus a reader producing the polymorphic form.
#[derive(Clone, Copy)]
pub(crate) struct Registration {
    pub(crate) descriptor: &'static Descriptor,
    decode_any: DecodeAny,
}

fn decode_any<T>(mapper: &ObjectMapper, value: Value) -> Result<SecurityObject, Error>
where
    T: MappedType + Into<SecurityObject>,
{
    mapper.read_object::<T>(value).map(Into::into)
}

/// Builder for an [`ObjectMapper`].
///
/// Modules and individual types are registered here; the configuration is fixed
/// once [`build`](Self::build) is called.
///
/// # Examples
///
/// ```
/// use security_json::{ObjectMapper, WebModule, DefaultTyping};
///
/// let mapper = ObjectMapper::builder()
///     .register_module(WebModule)
///     .build();
///
/// // The web module needs type ids to read its types back
/// assert_eq!(mapper.config().default_typing, DefaultTyping::NonFinal);
/// ```
pub struct MapperBuilder {
    config: MapperConfig,
    registry: HashMap<&'static str, Registration>,
    modules: Vec<&'static str>,
}

impl MapperBuilder {
    /// Creates a builder with the default configuration and no registered types.
    pub fn new() -> Self {
        Self {
            config: MapperConfig::default(),
            registry: HashMap::new(),
            modules: Vec::new(),
        }
    }

    /// Replaces the whole configuration.
    ///
    /// Call this before registering modules: modules adjust the configuration
    /// they find.
    pub fn with_config(mut self, config: MapperConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the type-embedding policy.
    pub fn default_typing(mut self, typing: DefaultTyping) -> Self {
        self.config.default_typing = typing;
        self
    }

    /// Sets the unknown-key policy.
    pub fn unknown_properties(mut self, policy: UnknownProperties) -> Self {
        self.config.unknown_properties = policy;
        self
    }

    /// Registers a single mapped type.
    pub fn register<T>(mut self) -> Self
    where
        T: MappedType + Into<SecurityObject>,
    {
        self.add_type::<T>();
        self
    }

    /// Registers a module, deduplicating modules already registered.
    pub fn register_module(mut self, module: impl Module) -> Self {
        self.add_module(&module);
        self
    }

    /// Registers every module in order.
    pub fn register_modules<I>(mut self, modules: I) -> Self
    where
        I: IntoIterator<Item = Box<dyn Module>>,
    {
        for module in modules {
            self.add_module(module.as_ref());
        }
        self
    }

    /// Freezes the configuration and registry into an [`ObjectMapper`].
    pub fn build(self) -> ObjectMapper {
        tracing::debug!(
            types = self.registry.len(),
            modules = ?self.modules,
            default_typing = ?self.config.default_typing,
            unknown_properties = ?self.config.unknown_properties,
            "object mapper built"
        );
        ObjectMapper {
            config: self.config,
            registry: self.registry,
            modules: self.modules,
        }
    }

    pub(crate) fn config(&self) -> &MapperConfig {
        &self.config
    }

    pub(crate) fn config_mut(&mut self) -> &mut MapperConfig {
        &mut self.config
    }

    pub(crate) fn add_type<T>(&mut self)
    where
        T: MappedType + Into<SecurityObject>,
    {
        let descriptor = T::descriptor();
        let registration = Registration {
            descriptor,
            decode_any: decode_any::<T>,
        };
        if self.registry.insert(descriptor.type_id, registration).is_some() {
            tracing::debug!(type_id = descriptor.type_id, "type registered again");
        } else {
            tracing::trace!(type_id = descriptor.type_id, "type registered");
        }
    }

    fn add_module(&mut self, module: &dyn Module) {
        let name = module.name();
        if self.modules.contains(&name) {
            tracing::debug!(module = name, "module already registered, skipping");
            return;
        }

        tracing::debug!(module = name, "registering module");
        module.setup(&mut SetupContext::new(self));
        self.modules.push(name);
    }
}

impl Default for MapperBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The mapping engine.
///
/// An `ObjectMapper` is immutable once built and can be shared across threads.
/// Use [`to_string`](Self::to_string) and [`from_str`](Self::from_str) for text,
/// or the `_value` variants to work with [`serde_json::Value`].
///
/// # Examples
///
/// ```
/// use security_json::{security_modules, ObjectMapper, SimpleGrantedAuthority};
///
/// let mapper = ObjectMapper::builder()
///     .register_modules(security_modules())
///     .build();
///
/// let json = r#"{"@class":"org.springframework.security.core.authority.SimpleGrantedAuthority","role":"ROLE_USER"}"#;
/// let authority: SimpleGrantedAuthority = mapper.from_str(json).unwrap();
/// assert_eq!(authority.authority(), "ROLE_USER");
/// assert_eq!(mapper.to_string(&authority).unwrap(), json);
/// ```
#[derive(Debug)]
pub struct ObjectMapper {
    config: MapperConfig,
    registry: HashMap<&'static str, Registration>,
    modules: Vec<&'static str>,
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("type_id", &self.descriptor.type_id)
            .finish()
    }
}

impl ObjectMapper {
    /// Starts building a mapper.
    pub fn builder() -> MapperBuilder {
        MapperBuilder::new()
    }

    /// Returns the configuration the mapper was built with.
    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    /// Returns true if a type id is registered.
    pub fn is_registered(&self, type_id: &str) -> bool {
        self.registry.contains_key(type_id)
    }

    /// Returns the names of the registered modules, in registration order.
    pub fn modules(&self) -> &[&'static str] {
        &self.modules
    }

    /// Converts a value into JSON.
    pub fn to_value<T: JsonCodec>(&self, value: &T) -> Value {
        value.encode(self)
    }

    /// Reconstructs a value from JSON.
    pub fn from_value<T: JsonCodec>(&self, value: Value) -> Result<T, Error> {
        T::decode(value, self)
    }

    /// Serializes a value to a compact JSON string.
    pub fn to_string<T: JsonCodec>(&self, value: &T) -> Result<String, Error> {
        Ok(serde_json::to_string(&self.to_value(value))?)
    }

    /// Serializes a value to an indented JSON string.
    pub fn to_string_pretty<T: JsonCodec>(&self, value: &T) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(&self.to_value(value))?)
    }

    /// Parses a JSON string and reconstructs a value from it.
    pub fn from_str<T: JsonCodec>(&self, json: &str) -> Result<T, Error> {
        let value: Value = serde_json::from_str(json)?;
        self.from_value(value)
    }

    /// Writes a mapped type as a JSON object.
    ///
    /// The object starts with `@class` when the type's descriptor or the
    /// mapper's typing policy asks for it, followed by every declared property.
    pub fn write_object<T: MappedType>(&self, value: &T) -> Value {
        let descriptor = T::descriptor();
        let mut writer = ObjectWriter {
            mapper: self,
            descriptor,
            map: Map::new(),
        };
        if self.embeds_type_id(descriptor) {
            writer.map.insert(
                TYPE_PROPERTY.to_string(),
                Value::String(descriptor.type_id.to_string()),
            );
        }
        value.write_properties(&mut writer);

        debug_assert!(
            descriptor
                .properties
                .iter()
                .all(|p| writer.map.contains_key(p.key)),
            "{} did not write every declared property",
            descriptor.type_id
        );
        Value::Object(writer.map)
    }

    /// Reads a mapped type from a JSON object.
    ///
    /// # Errors
    ///
    /// Fails when the type is not registered, when `@class` is missing but
    /// required, names an unknown or different type, when an unknown key is
    /// found under a strict policy, or when the type's own reconstruction
    /// rule fails.
    pub fn read_object<T: MappedType>(&self, value: Value) -> Result<T, Error> {
        let descriptor = T::descriptor();
        let mut map = match value {
            Value::Object(map) => map,
            other => return Err(codec::unexpected("an object", &other)),
        };

        self.resolve_type_id(&mut map, descriptor)?;
        self.check_unknown_properties(&map, descriptor)?;

        let mut reader = ObjectReader {
            mapper: self,
            descriptor,
            map,
        };
        T::read_properties(&mut reader)
    }

    /// Reads any registered type, dispatching on its `@class` key.
    pub(crate) fn read_any(&self, value: Value) -> Result<SecurityObject, Error> {
        let type_id = match value.get(TYPE_PROPERTY) {
            Some(Value::String(type_id)) => type_id.clone(),
            Some(other) => {
                return Err(codec::unexpected("a type id string", other).within(TYPE_PROPERTY))
            }
            None => {
                return Err(MappingError::new(
                    MappingErrorKind::MissingTypeId {
                        expected: "a registered security type",
                    },
                    "polymorphic values must carry their concrete type",
                )
                .into())
            }
        };

        match self.registry.get(type_id.as_str()) {
            Some(registration) => (registration.decode_any)(self, value),
            None => {
                tracing::debug!(type_id = %type_id, "unresolvable type id");
                Err(unknown_type(type_id))
            }
        }
    }

    /// Returns the type id carried by a polymorphic payload, if it is registered.
    pub(crate) fn registered_type_id(&self, value: &Value) -> Option<&'static str> {
        value
            .get(TYPE_PROPERTY)
            .and_then(Value::as_str)
            .and_then(|id| self.registry.get(id))
            .map(|r| r.descriptor.type_id)
    }

    fn embeds_type_id(&self, descriptor: &Descriptor) -> bool {
        descriptor.type_info == TypeInfo::Always || self.config.default_typing.is_enabled()
    }

    fn resolve_type_id(
        &self,
        map: &mut Map<String, Value>,
        descriptor: &'static Descriptor,
    ) -> Result<(), Error> {
        if !self.is_registered(descriptor.type_id) {
            return Err(unknown_type(descriptor.type_id.to_string()));
        }

        match map.remove(TYPE_PROPERTY) {
            Some(Value::String(type_id)) if type_id == descriptor.type_id => Ok(()),
            Some(Value::String(type_id)) if self.is_registered(&type_id) => {
                let message = format!("payload holds {}", type_id);
                Err(MappingError::new(
                    MappingErrorKind::TypeMismatch {
                        expected: descriptor.type_id,
                        found: type_id,
                    },
                    message,
                )
                .into())
            }
            Some(Value::String(type_id)) => Err(unknown_type(type_id)),
            Some(other) => Err(codec::unexpected("a type id string", &other).within(TYPE_PROPERTY)),
            None if self.embeds_type_id(descriptor) => Err(MappingError::new(
                MappingErrorKind::MissingTypeId {
                    expected: descriptor.type_id,
                },
                format!("'{}' is required to read {}", TYPE_PROPERTY, descriptor.type_id),
            )
            .into()),
            None => Ok(()),
        }
    }

    fn check_unknown_properties(
        &self,
        map: &Map<String, Value>,
        descriptor: &'static Descriptor,
    ) -> Result<(), Error> {
        let ignore = self.config.ignores_unknown(descriptor.ignore_unknown);
        for key in map.keys().filter(|key| !descriptor.declares(key)) {
            if ignore {
                tracing::trace!(type_id = descriptor.type_id, property = %key, "ignoring unknown property");
                continue;
            }
            return Err(MappingError::new(
                MappingErrorKind::UnknownProperty {
                    type_id: descriptor.type_id,
                    property: key.clone(),
                },
                format!("{} does not declare it", descriptor.type_id),
            )
            .into());
        }
        Ok(())
    }
}

pub(crate) fn unknown_type(type_id: String) -> Error {
    let message = format!("'{}' is not registered with this mapper", type_id);
    MappingError::new(MappingErrorKind::UnknownType { type_id }, message).into()
}

/// Collects the properties of one object during serialization.
pub struct ObjectWriter<'a> {
    mapper: &'a ObjectMapper,
    descriptor: &'static Descriptor,
    map: Map<String, Value>,
}

impl<'a> ObjectWriter<'a> {
    /// Returns the mapper driving this write.
    pub fn mapper(&self) -> &'a ObjectMapper {
        self.mapper
    }

    /// Writes a declared property.
    pub fn property<T: JsonCodec>(&mut self, key: &'static str, value: &T) -> &mut Self {
        let encoded = value.encode(self.mapper);
        self.raw(key, encoded)
    }

    /// Writes a declared property from an already encoded value.
    pub fn raw(&mut self, key: &'static str, value: Value) -> &mut Self {
        debug_assert!(
            self.descriptor.declares(key),
            "{} does not declare '{}'",
            self.descriptor.type_id,
            key
        );
        self.map.insert(key.to_string(), value);
        self
    }
}

/// Hands the properties of one object to a reconstruction rule.
pub struct ObjectReader<'a> {
    mapper: &'a ObjectMapper,
    descriptor: &'static Descriptor,
    map: Map<String, Value>,
}

impl<'a> ObjectReader<'a> {
    /// Returns the mapper driving this read.
    pub fn mapper(&self) -> &'a ObjectMapper {
        self.mapper
    }

    /// Reads a key that must be present. The value itself may be `null` when
    /// `T` is an `Option`.
    pub fn required<T: JsonCodec>(&mut self, key: &'static str) -> Result<T, Error> {
        let value = self.take_required(key)?;
        T::decode(value, self.mapper).map_err(|e| e.within(key))
    }

    /// Reads a key that may be absent or `null`.
    pub fn optional<T: JsonCodec>(&mut self, key: &'static str) -> Result<Option<T>, Error> {
        self.optional_with(key, |value, mapper| T::decode(value, mapper))
    }

    /// Reads a key that may be absent or `null` with a custom decoder.
    pub fn optional_with<T>(
        &mut self,
        key: &'static str,
        decode: impl FnOnce(Value, &ObjectMapper) -> Result<T, Error>,
    ) -> Result<Option<T>, Error> {
        match self.take(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => decode(value, self.mapper).map(Some).map_err(|e| e.within(key)),
        }
    }

    /// Builds an invalid-value error located at `key`.
    pub fn invalid(&self, key: &'static str, message: impl Into<String>) -> Error {
        Error::from(MappingError::invalid(format!(
            "{} of {}",
            message.into(),
            self.descriptor.type_id
        )))
        .within(key)
    }

    fn take_required(&mut self, key: &'static str) -> Result<Value, Error> {
        self.take(key)
            .ok_or_else(|| MappingError::missing_property(self.descriptor.type_id, key).into())
    }

    fn take(&mut self, key: &'static str) -> Option<Value> {
        debug_assert!(
            self.descriptor.declares(key),
            "{} does not declare '{}'",
            self.descriptor.type_id,
            key
        );
        self.map.remove(key)
    }
}
