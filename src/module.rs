//! Aggregate registrars.
//!
//! A [`Module`] registers the descriptors of one functional area against a
//! [`MapperBuilder`] and makes sure the builder embeds type ids, because the
//! registered types are read back through polymorphic references.

use crate::authority::SimpleGrantedAuthority;
use crate::config::{DefaultTyping, MapperConfig};
use crate::descriptor::MappedType;
use crate::mapper::MapperBuilder;
use crate::object::SecurityObject;
use crate::user::User;
use crate::web::WebModule;

/// A batch of type registrations for one functional area.
pub trait Module {
    /// Unique module name, used to skip repeated registrations.
    fn name(&self) -> &'static str;

    /// Registers the module's types and adjusts the configuration.
    fn setup(&self, cx: &mut SetupContext<'_>);
}

/// The registration surface a [`Module`] sees during setup.
pub struct SetupContext<'a> {
    builder: &'a mut MapperBuilder,
}

impl<'a> SetupContext<'a> {
    pub(crate) fn new(builder: &'a mut MapperBuilder) -> Self {
        Self { builder }
    }

    /// Returns the configuration as it stands.
    pub fn config(&self) -> &MapperConfig {
        self.builder.config()
    }

    /// Registers a mapped type.
    pub fn register<T>(&mut self)
    where
        T: MappedType + Into<SecurityObject>,
    {
        self.builder.add_type::<T>();
    }

    /// Turns default typing on if it is off.
    ///
    /// An already enabled policy is left as it is, and no other setting is
    /// touched.
    pub fn enable_default_typing(&mut self) {
        let config = self.builder.config_mut();
        if config.default_typing == DefaultTyping::Disabled {
            config.default_typing = DefaultTyping::NonFinal;
            tracing::info!(
                default_typing = ?config.default_typing,
                "enabled default typing for polymorphic security types"
            );
        }
    }
}

/// Registers the core types: [`SimpleGrantedAuthority`] and [`User`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CoreModule;

impl Module for CoreModule {
    fn name(&self) -> &'static str {
        "CoreModule"
    }

    fn setup(&self, cx: &mut SetupContext<'_>) {
        cx.enable_default_typing();
        cx.register::<SimpleGrantedAuthority>();
        cx.register::<User>();
    }
}

/// Returns every module this crate provides, in registration order.
///
/// # Examples
///
/// ```
/// use security_json::{security_modules, ObjectMapper};
///
/// let mapper = ObjectMapper::builder()
///     .register_modules(security_modules())
///     .build();
///
/// assert_eq!(mapper.modules(), &["CoreModule", "WebModule"]);
/// ```
pub fn security_modules() -> Vec<Box<dyn Module>> {
    vec![Box::new(CoreModule), Box::new(WebModule)]
}
