use std::fmt;

/// Errors that can occur while mapping security objects to and from JSON.
#[derive(Debug)]
pub enum Error {
    /// The JSON was well formed but could not be mapped onto the target type
    Mapping(MappingError),
    /// The input was not valid JSON, or JSON could not be written
    Json(serde_json::Error),
}

impl Error {
    /// Returns the mapping failure kind, if this is a mapping error.
    pub fn kind(&self) -> Option<&MappingErrorKind> {
        match self {
            Error::Mapping(e) => Some(&e.kind),
            Error::Json(_) => None,
        }
    }

    /// Prefixes the error path with a property key.
    pub(crate) fn within(self, key: &str) -> Self {
        match self {
            Error::Mapping(mut e) => {
                e.path.insert(0, PathSegment::Key(key.to_string()));
                Error::Mapping(e)
            }
            other => other,
        }
    }

    /// Prefixes the error path with a sequence index.
    pub(crate) fn within_index(self, index: usize) -> Self {
        match self {
            Error::Mapping(mut e) => {
                e.path.insert(0, PathSegment::Index(index));
                Error::Mapping(e)
            }
            other => other,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Mapping(e) => write!(f, "Mapping failed: {}", e),
            Error::Json(e) => write!(f, "Invalid JSON: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Mapping(e) => Some(e),
            Error::Json(e) => Some(e),
        }
    }
}

impl From<MappingError> for Error {
    fn from(e: MappingError) -> Self {
        Error::Mapping(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Json(e)
    }
}

/// A mapping failure with details about what failed and where.
#[derive(Debug)]
pub struct MappingError {
    /// The kind of failure that occurred
    pub kind: MappingErrorKind,
    /// Human-readable message explaining the failure
    pub message: String,
    path: Vec<PathSegment>,
}

impl MappingError {
    /// Creates a new mapping error at the root of the document.
    pub fn new(kind: MappingErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            path: Vec::new(),
        }
    }

    pub(crate) fn missing_property(type_id: &'static str, property: &'static str) -> Self {
        Self::new(
            MappingErrorKind::MissingProperty { type_id, property },
            format!("'{}' is required to construct {}", property, type_id),
        )
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::new(MappingErrorKind::InvalidValue, message)
    }

    /// Returns the location of the failing value, e.g. `cookies[0].name`.
    ///
    /// Empty when the failure concerns the document root.
    pub fn path(&self) -> String {
        let mut out = String::new();
        for segment in &self.path {
            match segment {
                PathSegment::Key(key) => {
                    if !out.is_empty() {
                        out.push('.');
                    }
                    out.push_str(key);
                }
                PathSegment::Index(index) => {
                    out.push_str(&format!("[{}]", index));
                }
            }
        }
        out
    }
}

impl fmt::Display for MappingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)?;
        if !self.path.is_empty() {
            write!(f, " (at {})", self.path())?;
        }
        Ok(())
    }
}

impl std::error::Error for MappingError {}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PathSegment {
    Key(String),
    Index(usize),
}

/// The kind of mapping failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingErrorKind {
    /// A key the reconstruction rule requires is absent
    MissingProperty {
        /// Type being reconstructed
        type_id: &'static str,
        /// The absent key
        property: &'static str,
    },
    /// Type information is required but the `@class` key is absent
    MissingTypeId {
        /// Type the reader expected to find
        expected: &'static str,
    },
    /// The discriminator names a type the mapper does not know
    UnknownType {
        /// The unresolvable type id
        type_id: String,
    },
    /// The discriminator names a known type that is not the requested one
    TypeMismatch {
        /// Type the reader asked for
        expected: &'static str,
        /// Type named by the payload
        found: String,
    },
    /// An unrecognized key was found while unknown keys are rejected
    UnknownProperty {
        /// Type being reconstructed
        type_id: &'static str,
        /// The unrecognized key
        property: String,
    },
    /// A value has the wrong JSON shape or breaks a domain constraint
    InvalidValue,
}

impl fmt::Display for MappingErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MappingErrorKind::MissingProperty { property, .. } => {
                write!(f, "Missing required property '{}'", property)
            }
            MappingErrorKind::MissingTypeId { .. } => write!(f, "Missing type id"),
            MappingErrorKind::UnknownType { type_id } => write!(f, "Unknown type '{}'", type_id),
            MappingErrorKind::TypeMismatch { expected, .. } => {
                write!(f, "Type mismatch, expected '{}'", expected)
            }
            MappingErrorKind::UnknownProperty { property, .. } => {
                write!(f, "Unrecognized property '{}'", property)
            }
            MappingErrorKind::InvalidValue => write!(f, "Invalid value"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_joins_keys_and_indices() {
        let err = Error::from(MappingError::invalid("expected a JSON string"))
            .within("name")
            .within_index(0)
            .within("cookies");

        match err {
            Error::Mapping(e) => assert_eq!(e.path(), "cookies[0].name"),
            Error::Json(_) => panic!("expected mapping error"),
        }
    }

    #[test]
    fn display_includes_kind_message_and_path() {
        let err = Error::from(MappingError::missing_property("example.Type", "role")).within("inner");
        let text = err.to_string();

        assert!(text.contains("Missing required property 'role'"));
        assert!(text.contains("example.Type"));
        assert!(text.ends_with("(at inner)"));
    }

    #[test]
    fn root_errors_have_empty_path() {
        let err = MappingError::new(
            MappingErrorKind::UnknownType {
                type_id: "java.lang.Runtime".to_string(),
            },
            "not registered",
        );
        assert_eq!(err.path(), "");
        assert!(!err.to_string().contains("(at"));
    }

    #[test]
    fn json_errors_have_no_kind() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = Error::from(json_err).within("ignored");
        assert!(err.kind().is_none());
    }
}
