use crate::descriptor::{mapped_codec, Descriptor, MappedType, Property, TypeInfo};
use crate::error::{Error, MappingError};
use crate::mapper::{ObjectReader, ObjectWriter};

static DEFAULT_CSRF_TOKEN: Descriptor = Descriptor {
    type_id: "org.springframework.security.web.csrf.DefaultCsrfToken",
    type_info: TypeInfo::Default,
    ignore_unknown: true,
    properties: &[
        Property::required("token", "token"),
        Property::required("parameterName", "parameter_name"),
        Property::required("headerName", "header_name"),
    ],
};

/// A CSRF token together with the request parameter and header that carry it.
///
/// All three parts are non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultCsrfToken {
    token: String,
    parameter_name: String,
    header_name: String,
}

impl DefaultCsrfToken {
    /// Creates a token.
    ///
    /// # Errors
    ///
    /// Returns an invalid-value error when any part is empty.
    pub fn new(
        header_name: impl Into<String>,
        parameter_name: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self, Error> {
        let token = Self {
            token: token.into(),
            parameter_name: parameter_name.into(),
            header_name: header_name.into(),
        };
        for (part, value) in [
            ("headerName", &token.header_name),
            ("parameterName", &token.parameter_name),
            ("token", &token.token),
        ] {
            if value.is_empty() {
                return Err(MappingError::invalid(format!("{} cannot be empty", part)).into());
            }
        }
        Ok(token)
    }

    /// Returns the token value.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Returns the name of the request parameter carrying the token.
    pub fn parameter_name(&self) -> &str {
        &self.parameter_name
    }

    /// Returns the name of the header carrying the token.
    pub fn header_name(&self) -> &str {
        &self.header_name
    }
}

impl MappedType for DefaultCsrfToken {
    fn descriptor() -> &'static Descriptor {
        &DEFAULT_CSRF_TOKEN
    }

    fn write_properties(&self, out: &mut ObjectWriter<'_>) {
        out.property("token", &self.token)
            .property("parameterName", &self.parameter_name)
            .property("headerName", &self.header_name);
    }

    fn read_properties(input: &mut ObjectReader<'_>) -> Result<Self, Error> {
        let mut read = |key: &'static str| -> Result<String, Error> {
            let value: String = input.required(key)?;
            if value.is_empty() {
                return Err(input.invalid(key, "an empty value is not allowed"));
            }
            Ok(value)
        };
        Ok(Self {
            token: read("token")?,
            parameter_name: read("parameterName")?,
            header_name: read("headerName")?,
        })
    }
}

mapped_codec!(DefaultCsrfToken);
