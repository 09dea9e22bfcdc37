//! Property tests for the mapping engine.
//!
//! These tests check that values survive a write/read cycle under every typing
//! policy and that tolerated unknown keys never change the result.

use proptest::prelude::*;
use security_json::web::Locale;
use security_json::{
    security_modules, Cookie, DefaultSavedRequest, DefaultTyping, GrantedAuthority,
    MappingErrorKind, ObjectMapper, SimpleGrantedAuthority, UnknownProperties, User,
};
use serde_json::Value;

fn typed_mapper() -> ObjectMapper {
    ObjectMapper::builder()
        .register_modules(security_modules())
        .build()
}

// Strategy: Generate role strings
fn arb_role() -> impl Strategy<Value = String> {
    prop::string::string_regex("ROLE_[A-Z_]{1,12}").unwrap()
}

// Strategy: Generate cookies with arbitrary attributes
fn arb_cookie() -> impl Strategy<Value = Cookie> {
    (
        prop::string::string_regex("[A-Za-z][A-Za-z0-9_-]{0,15}").unwrap(),
        prop::string::string_regex("[ -~]{0,24}").unwrap(),
        prop::option::of(prop::string::string_regex("/[a-z/]{0,10}").unwrap()),
        prop::option::of(prop::string::string_regex("[a-z]{1,8}\\.com").unwrap()),
        -1i32..100_000,
        any::<bool>(),
        0i32..2,
    )
        .prop_map(|(name, value, path, domain, max_age, secure, version)| {
            let mut cookie = Cookie::new(name, value)
                .with_max_age(max_age)
                .with_secure(secure)
                .with_version(version);
            if let Some(path) = path {
                cookie = cookie.with_path(path);
            }
            if let Some(domain) = domain {
                cookie = cookie.with_domain(domain);
            }
            cookie
        })
}

// Strategy: Generate header maps with lowercase names
fn arb_headers() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::vec(
        (
            prop::string::string_regex("[a-z][a-z-]{0,12}").unwrap(),
            prop::string::string_regex("[ -~]{0,16}").unwrap(),
        ),
        0..5,
    )
}

fn arb_typing() -> impl Strategy<Value = DefaultTyping> {
    prop_oneof![Just(DefaultTyping::Disabled), Just(DefaultTyping::NonFinal)]
}

proptest! {
    /// Property: An authority reads back as the same role under either typing policy
    #[test]
    fn proptest_authority_round_trip(role in arb_role(), typing in arb_typing()) {
        let mapper = ObjectMapper::builder()
            .default_typing(typing)
            .register::<SimpleGrantedAuthority>()
            .build();

        let authority = SimpleGrantedAuthority::new(role);
        let back: SimpleGrantedAuthority = mapper.from_value(mapper.to_value(&authority)).unwrap();
        prop_assert_eq!(back, authority);
    }

    /// Property: A user with any authority set reads back unchanged
    #[test]
    fn proptest_user_round_trip(
        username in "[a-z]{1,12}",
        password in prop::option::of("[ -~]{0,16}"),
        roles in prop::collection::vec(arb_role(), 0..6),
        flags in any::<(bool, bool, bool, bool)>(),
    ) {
        let mapper = typed_mapper();
        let authorities = roles
            .into_iter()
            .map(|role| GrantedAuthority::from(SimpleGrantedAuthority::new(role)));
        let mut user = User::new(username, password.clone().unwrap_or_default(), authorities)
            .with_enabled(flags.0)
            .with_account_non_expired(flags.1)
            .with_credentials_non_expired(flags.2)
            .with_account_non_locked(flags.3);
        if password.is_none() {
            user.erase_credentials();
        }

        let back: User = mapper.from_str(&mapper.to_string(&user).unwrap()).unwrap();
        prop_assert_eq!(back, user);
    }

    /// Property: Saved requests keep cookie order, header values and locales
    #[test]
    fn proptest_saved_request_round_trip(
        cookies in prop::collection::vec(arb_cookie(), 0..4),
        headers in arb_headers(),
        port in 1i32..65_536,
        query in prop::option::of("[a-z]{1,5}=[0-9]{1,3}"),
    ) {
        let mapper = typed_mapper();
        let mut builder = DefaultSavedRequest::builder()
            .cookies(cookies.clone())
            .locales(vec![Locale::with_country("en", "US"), Locale::new("fr")])
            .method("GET")
            .scheme("https")
            .server_name("example.com")
            .server_port(port)
            .request_uri("/app/orders");
        if let Some(query) = query {
            builder = builder.query_string(query);
        }
        for (name, value) in &headers {
            builder = builder.header(name, value.clone());
        }
        let saved = builder.build();

        let back: DefaultSavedRequest = mapper.from_value(mapper.to_value(&saved)).unwrap();

        // The HTTP-only flag is not kept by saved cookies
        let expected: Vec<Cookie> = cookies.iter().map(|c| c.clone().with_http_only(false)).collect();
        prop_assert_eq!(back.cookies(), expected);
        for (name, _) in &headers {
            prop_assert_eq!(back.header_values(name), saved.header_values(name));
        }
        prop_assert_eq!(back, saved);
    }

    /// Property: Extra keys never change what a tolerant mapper reads
    #[test]
    fn proptest_unknown_keys_are_ignored(
        role in arb_role(),
        extra_key in "[a-z]{1,10}",
        extra_value in any::<i64>(),
    ) {
        prop_assume!(extra_key != "role");
        let mapper = typed_mapper();
        let authority = SimpleGrantedAuthority::new(role);

        let mut json = mapper.to_value(&authority);
        json.as_object_mut()
            .unwrap()
            .insert(extra_key, Value::from(extra_value));

        let back: SimpleGrantedAuthority = mapper.from_value(json).unwrap();
        prop_assert_eq!(back, authority);
    }

    /// Property: A strict mapper names the first unknown key it meets
    #[test]
    fn proptest_strict_mapper_rejects_extra_keys(
        cookie in arb_cookie(),
        extra_key in "x[a-z]{1,8}",
    ) {
        let mapper = ObjectMapper::builder()
            .unknown_properties(UnknownProperties::Fail)
            .register_modules(security_modules())
            .build();

        let mut json = mapper.to_value(&cookie);
        json.as_object_mut()
            .unwrap()
            .insert(extra_key.clone(), Value::Bool(true));

        let err = mapper.from_value::<Cookie>(json).unwrap_err();
        let is_unknown_property = matches!(
            err.kind(),
            Some(MappingErrorKind::UnknownProperty { property, .. }) if *property == extra_key
        );
        prop_assert!(is_unknown_property);
    }
}
