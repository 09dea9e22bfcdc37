//! Mapper configuration.
//!
//! The configuration is a plain value handed to [`MapperBuilder`](crate::MapperBuilder)
//! before the mapper is built. It derives `Deserialize` so host applications can keep
//! it next to the rest of their settings:
//!
//! ```
//! use security_json::{DefaultTyping, MapperConfig, UnknownProperties};
//!
//! let config: MapperConfig =
//!     serde_json::from_str(r#"{ "unknown_properties": "fail" }"#).unwrap();
//!
//! assert_eq!(config.default_typing, DefaultTyping::Disabled);
//! assert_eq!(config.unknown_properties, UnknownProperties::Fail);
//! ```

use serde::{Deserialize, Serialize};

/// Global policy for embedding concrete type names in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultTyping {
    /// Only types whose descriptor demands it carry `@class`; collections are plain
    #[default]
    Disabled,
    /// Every mapped object carries `@class` and collections use typed wrappers
    NonFinal,
}

impl DefaultTyping {
    /// Returns true when type information is embedded by default.
    pub fn is_enabled(self) -> bool {
        matches!(self, DefaultTyping::NonFinal)
    }
}

/// How keys that no descriptor declares are treated on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownProperties {
    /// Follow each descriptor's own `ignore_unknown` declaration
    #[default]
    Declared,
    /// Always ignore unknown keys
    Ignore,
    /// Always fail with an unknown-property error
    Fail,
}

/// Configuration applied to an [`ObjectMapper`](crate::ObjectMapper) at build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MapperConfig {
    /// Type-embedding policy
    pub default_typing: DefaultTyping,
    /// Unknown-key policy
    pub unknown_properties: UnknownProperties,
}

impl MapperConfig {
    /// Decides whether an unknown key is tolerated for a type.
    pub(crate) fn ignores_unknown(&self, declared: bool) -> bool {
        match self.unknown_properties {
            UnknownProperties::Declared => declared,
            UnknownProperties::Ignore => true,
            UnknownProperties::Fail => false,
        }
    }
}
