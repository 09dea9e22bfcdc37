//! User details.

use std::collections::BTreeSet;

use crate::authority::GrantedAuthority;
use crate::codec;
use crate::descriptor::{mapped_codec, Descriptor, MappedType, Property, TypeInfo};
use crate::error::Error;
use crate::mapper::{ObjectReader, ObjectWriter};
use crate::typing::UNMODIFIABLE_SET;

static USER: Descriptor = Descriptor {
    type_id: "org.springframework.security.core.userdetails.User",
    type_info: TypeInfo::Always,
    ignore_unknown: true,
    properties: &[
        Property::required("username", "username"),
        Property::optional("password", "password"),
        Property::required("accountNonExpired", "is_account_non_expired"),
        Property::required("accountNonLocked", "is_account_non_locked"),
        Property::required("credentialsNonExpired", "is_credentials_non_expired"),
        Property::required("enabled", "is_enabled"),
        Property::required("authorities", "authorities"),
    ],
};

/// Core user information: credentials, account status flags and authorities.
///
/// Authorities are kept sorted by their authority string. The password is
/// written as `null` once [`erase_credentials`](Self::erase_credentials) has run.
///
/// # Examples
///
/// ```
/// use security_json::{GrantedAuthority, SimpleGrantedAuthority, User};
///
/// let role = GrantedAuthority::from(SimpleGrantedAuthority::new("ROLE_USER"));
/// let mut user = User::new("admin", "1234", [role]).with_account_non_locked(false);
/// user.erase_credentials();
///
/// assert!(user.password().is_none());
/// assert!(!user.is_account_non_locked());
/// assert_eq!(user.authorities().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    username: String,
    password: Option<String>,
    enabled: bool,
    account_non_expired: bool,
    credentials_non_expired: bool,
    account_non_locked: bool,
    authorities: BTreeSet<GrantedAuthority>,
}

impl User {
    /// Creates an enabled, unexpired, unlocked user.
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        authorities: impl IntoIterator<Item = GrantedAuthority>,
    ) -> Self {
        Self {
            username: username.into(),
            password: Some(password.into()),
            enabled: true,
            account_non_expired: true,
            credentials_non_expired: true,
            account_non_locked: true,
            authorities: authorities.into_iter().collect(),
        }
    }

    /// Sets whether the user is enabled.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Sets whether the account is unexpired.
    pub fn with_account_non_expired(mut self, value: bool) -> Self {
        self.account_non_expired = value;
        self
    }

    /// Sets whether the credentials are unexpired.
    pub fn with_credentials_non_expired(mut self, value: bool) -> Self {
        self.credentials_non_expired = value;
        self
    }

    /// Sets whether the account is unlocked.
    pub fn with_account_non_locked(mut self, value: bool) -> Self {
        self.account_non_locked = value;
        self
    }

    /// Drops the password.
    pub fn erase_credentials(&mut self) {
        self.password = None;
    }

    /// Returns the username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the password, unless it was erased.
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// Returns true if the user is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns true if the account has not expired.
    pub fn is_account_non_expired(&self) -> bool {
        self.account_non_expired
    }

    /// Returns true if the credentials have not expired.
    pub fn is_credentials_non_expired(&self) -> bool {
        self.credentials_non_expired
    }

    /// Returns true if the account is not locked.
    pub fn is_account_non_locked(&self) -> bool {
        self.account_non_locked
    }

    /// Returns the authorities, sorted by authority string.
    pub fn authorities(&self) -> &BTreeSet<GrantedAuthority> {
        &self.authorities
    }
}

impl MappedType for User {
    fn descriptor() -> &'static Descriptor {
        &USER
    }

    fn write_properties(&self, out: &mut ObjectWriter<'_>) {
        let authorities = codec::encode_sequence(out.mapper(), UNMODIFIABLE_SET, &self.authorities);
        out.property("username", &self.username)
            .property("password", &self.password)
            .property("accountNonExpired", &self.account_non_expired)
            .property("accountNonLocked", &self.account_non_locked)
            .property("credentialsNonExpired", &self.credentials_non_expired)
            .property("enabled", &self.enabled)
            .raw("authorities", authorities);
    }

    fn read_properties(input: &mut ObjectReader<'_>) -> Result<Self, Error> {
        let username: String = input.required("username")?;
        if username.is_empty() {
            return Err(input.invalid("username", "an empty username is not allowed"));
        }
        let authorities: Vec<GrantedAuthority> = input.required("authorities")?;

        Ok(Self {
            username,
            password: input.optional("password")?,
            account_non_expired: input.required("accountNonExpired")?,
            account_non_locked: input.required("accountNonLocked")?,
            credentials_non_expired: input.required("credentialsNonExpired")?,
            enabled: input.required("enabled")?,
            authorities: authorities.into_iter().collect(),
        })
    }
}

mapped_codec!(User);
