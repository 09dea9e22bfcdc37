//! Self-describing JSON mapping for security domain objects.
//!
//! This crate reads and writes authorities, users, cookies, CSRF tokens, saved
//! requests and web authentication details in a JSON form that carries its own
//! type information, so a payload can be read back without the caller naming
//! the concrete type.
//!
//! # Core Types
//!
//! - [`ObjectMapper`]: Immutable mapping engine built by a [`MapperBuilder`]
//! - [`Module`]: Registers the descriptors of one functional area and enables default typing
//! - [`Descriptor`]: Static table of wire keys for one type
//! - [`SecurityObject`]: Closed set of types readable through `@class` dispatch
//! - [`MapperConfig`]: Typing and unknown-key policy, fixed at build time
//!
//! # Wire Format
//!
//! With default typing enabled, every mapped object starts with an `@class` key,
//! lists are written as `["java.util.ArrayList", [..]]` and maps carry
//! `"@class": "java.util.TreeMap"`.
//!
//! # Examples
//!
//! ```
//! use security_json::{security_modules, GrantedAuthority, ObjectMapper, SimpleGrantedAuthority, User};
//!
//! let mapper = ObjectMapper::builder()
//!     .register_modules(security_modules())
//!     .build();
//!
//! let user = User::new(
//!     "admin",
//!     "1234",
//!     [GrantedAuthority::from(SimpleGrantedAuthority::new("ROLE_ADMIN"))],
//! );
//!
//! let json = mapper.to_string(&user).unwrap();
//! assert!(json.contains(r#""authorities":["java.util.Collections$UnmodifiableSet",["#));
//!
//! let back: User = mapper.from_str(&json).unwrap();
//! assert_eq!(back, user);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod authority;
pub mod codec;
mod config;
mod descriptor;
mod error;
mod mapper;
mod module;
mod object;
pub mod typing;
mod user;
pub mod web;

pub use authority::{GrantedAuthority, SimpleGrantedAuthority};
pub use codec::JsonCodec;
pub use config::{DefaultTyping, MapperConfig, UnknownProperties};
pub use descriptor::{Descriptor, MappedType, Property, TypeInfo};
pub use error::{Error, MappingError, MappingErrorKind};
pub use mapper::{MapperBuilder, ObjectMapper, ObjectReader, ObjectWriter};
pub use module::{security_modules, CoreModule, Module, SetupContext};
pub use object::SecurityObject;
pub use user::User;
pub use web::{
    Cookie, DefaultCsrfToken, DefaultSavedRequest, SavedCookie, WebAuthenticationDetails,
    WebModule,
};
