use std::fmt;

use serde_json::Value;

use crate::codec::{self, JsonCodec};
use crate::error::{Error, MappingError};
use crate::mapper::ObjectMapper;

/// A language with an optional country and variant, written as `en`, `en_US`
/// or `en_US_POSIX`.
///
/// The root locale has no language and is written as the empty string.
/// Locales are scalars on the wire and never carry a type wrapper.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Locale {
    language: String,
    country: Option<String>,
    variant: Option<String>,
}

impl Locale {
    /// Creates a language-only locale. An empty language gives the root locale.
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into().to_ascii_lowercase(),
            country: None,
            variant: None,
        }
    }

    /// The root locale, written as `""`.
    pub fn root() -> Self {
        Self::default()
    }

    /// Creates a locale for a language in a country.
    pub fn with_country(language: impl Into<String>, country: impl Into<String>) -> Self {
        let country = country.into().to_ascii_uppercase();
        Self {
            language: language.into().to_ascii_lowercase(),
            country: Some(country).filter(|c| !c.is_empty()),
            variant: None,
        }
    }

    /// Sets the variant, kept as given. An empty variant clears it.
    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = Some(variant.into()).filter(|v| !v.is_empty());
        self
    }

    /// Parses `en`, `en_US`, `en_US_POSIX` or the `en-US` language-tag form.
    ///
    /// The empty string is the root locale. Everything after the country
    /// separator is the variant.
    pub fn parse(tag: &str) -> Option<Self> {
        let tag = tag.trim();
        let mut parts = tag.splitn(3, ['_', '-']);
        let language = parts.next().unwrap_or_default();
        if !language.chars().all(|c| c.is_ascii_alphabetic()) {
            return None;
        }
        let country = parts.next().unwrap_or_default();
        if !country.chars().all(|c| c.is_ascii_alphanumeric()) {
            return None;
        }
        let variant = parts.next().unwrap_or_default();
        if !tag.is_empty() && language.is_empty() && country.is_empty() && variant.is_empty() {
            return None;
        }

        Some(Self::with_country(language, country).with_variant(variant))
    }

    /// Returns the lowercase language code, empty for the root locale.
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Returns the uppercase country code, if any.
    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }

    /// Returns the variant, if any.
    pub fn variant(&self) -> Option<&str> {
        self.variant.as_deref()
    }

    /// Returns true for the root locale.
    pub fn is_root(&self) -> bool {
        self.language.is_empty() && self.country.is_none() && self.variant.is_none()
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.language)?;
        match (&self.country, &self.variant) {
            (Some(country), Some(variant)) => write!(f, "_{}_{}", country, variant),
            (Some(country), None) => write!(f, "_{}", country),
            (None, Some(variant)) => write!(f, "__{}", variant),
            (None, None) => Ok(()),
        }
    }
}

impl JsonCodec for Locale {
    fn encode(&self, _mapper: &ObjectMapper) -> Value {
        Value::String(self.to_string())
    }

    fn decode(value: Value, _mapper: &ObjectMapper) -> Result<Self, Error> {
        match &value {
            Value::String(tag) => Locale::parse(tag)
                .ok_or_else(|| MappingError::invalid(format!("'{}' is not a locale", tag)).into()),
            other => Err(codec::unexpected("a locale string", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_underscore_form() {
        assert_eq!(Locale::new("en").to_string(), "en");
        assert_eq!(Locale::with_country("fr", "ca").to_string(), "fr_CA");
        assert_eq!(
            Locale::with_country("en", "US").with_variant("POSIX").to_string(),
            "en_US_POSIX"
        );
        assert_eq!(Locale::new("en").with_variant("POSIX").to_string(), "en__POSIX");
        assert_eq!(Locale::root().to_string(), "");
    }

    #[test]
    fn parse_accepts_both_separators() {
        assert_eq!(Locale::parse("en_US"), Some(Locale::with_country("en", "US")));
        assert_eq!(Locale::parse("en-us"), Some(Locale::with_country("en", "US")));
        assert_eq!(Locale::parse("*"), None);
        assert_eq!(Locale::parse("en_U$"), None);
        assert_eq!(Locale::parse("_"), None);
    }

    #[test]
    fn parse_keeps_the_variant() {
        let locale = Locale::parse("en_US_POSIX").unwrap();
        assert_eq!(locale.country(), Some("US"));
        assert_eq!(locale.variant(), Some("POSIX"));
        assert_eq!(Locale::parse("en__POSIX"), Some(Locale::new("en").with_variant("POSIX")));
        assert_eq!(
            Locale::parse("ja_JP_JP_#u-ca-japanese").unwrap().variant(),
            Some("JP_#u-ca-japanese")
        );
    }

    #[test]
    fn empty_tag_is_the_root_locale() {
        assert_eq!(Locale::parse(""), Some(Locale::root()));
        assert!(Locale::new("").is_root());
        assert_eq!(Locale::new(""), Locale::root());
    }

    #[test]
    fn written_locales_read_back_unchanged() {
        let mapper = ObjectMapper::builder().build();
        for locale in [
            Locale::root(),
            Locale::new("en"),
            Locale::with_country("en", "US").with_variant("POSIX"),
            Locale::new("de").with_variant("1901"),
            Locale::with_country("", "US"),
        ] {
            let json = locale.encode(&mapper);
            let back = Locale::decode(json.clone(), &mapper).unwrap();
            assert_eq!(back, locale, "{}", json);
            assert_eq!(back.encode(&mapper), json);
        }
    }

    #[test]
    fn non_string_locale_is_rejected() {
        let mapper = ObjectMapper::builder().build();
        assert!(Locale::decode(Value::from(3), &mapper).is_err());
    }
}
