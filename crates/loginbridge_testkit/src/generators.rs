//! Property-based test generators using proptest.
//!
//! Provides strategies for versions, form fields and logins that keep the
//! invariants the mapper relies on: at most one field of each reserved type,
//! and distinct custom field names that never collide with reserved ones.

use loginbridge_protocol::{CredentialEntry, FormField, FormFieldType, SearchType, Version};
use proptest::prelude::*;

/// Strategy for generating versions.
pub fn version_strategy() -> impl Strategy<Value = Version> {
    (0u16..4, 0u16..12).prop_map(|(major, minor)| Version::new(major, minor))
}

/// Strategy for generating site URLs.
pub fn host_strategy() -> impl Strategy<Value = String> {
    (
        prop::sample::select(vec!["http", "https"]),
        prop::string::string_regex("[a-z]{1,8}(\\.[a-z]{2,3}){1,2}").expect("Invalid regex"),
        prop::option::of(prop::string::string_regex("/[a-z]{1,6}").expect("Invalid regex")),
    )
        .prop_map(|(scheme, host, path)| format!("{scheme}://{host}{}", path.unwrap_or_default()))
}

/// Strategy for generating non-reserved field types.
pub fn custom_field_type_strategy() -> impl Strategy<Value = FormFieldType> {
    prop::sample::select(
        FormFieldType::ALL
            .iter()
            .copied()
            .filter(|field_type| !field_type.is_reserved())
            .collect::<Vec<_>>(),
    )
}

/// Strategy for generating search types.
pub fn search_type_strategy() -> impl Strategy<Value = SearchType> {
    prop_oneof![
        Just(SearchType::All),
        Just(SearchType::ExcludeForms),
        Just(SearchType::ExcludeRealms),
    ]
}

/// Strategy for generating a login a store can hold without losing data.
///
/// Holds an optional user name, an optional password and up to four custom
/// fields with distinct names.
pub fn login_strategy() -> impl Strategy<Value = CredentialEntry> {
    let custom = prop::collection::btree_map(
        prop::string::string_regex("[a-z][a-z0-9_]{0,7}").expect("Invalid regex"),
        (
            prop::string::string_regex("[ -~]{0,16}").expect("Invalid regex"),
            custom_field_type_strategy(),
        ),
        0..4,
    );

    (
        host_strategy(),
        prop::string::string_regex("[A-Za-z0-9 ]{0,16}").expect("Invalid regex"),
        prop::option::of(prop::string::string_regex("[a-z]{1,8}").expect("Invalid regex")),
        prop::option::of(prop::string::string_regex("[ -~]{1,16}").expect("Invalid regex")),
        custom,
    )
        .prop_map(|(host, title, username, password, custom)| {
            let mut login = CredentialEntry::new(host, title);
            if let Some(username) = username {
                login = login.with_field(FormField::username("User", username));
            }
            if let Some(password) = password {
                login = login.with_field(FormField::password("Pass", password));
            }
            for (name, (value, field_type)) in custom {
                login = login.with_field(FormField::new(name, value, field_type));
            }
            login
        })
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loginbridge_core::{FieldMapper, MemoryProtection, NativeEntry};
    use loginbridge_protocol::Compatibility;
    use loginbridge_server::{VersionGate, MIN_CLIENT_VERSION, SERVER_VERSION};

    #[test]
    fn default_gate_has_a_client_threshold() {
        let gate = VersionGate::default();
        let mut clients: Vec<Version> = (0u16..3)
            .flat_map(|major| (0u16..12).map(move |minor| Version::new(major, minor)))
            .collect();
        clients.sort();

        let verdicts: Vec<_> = clients
            .iter()
            .map(|&client| gate.check(client, Version::new(0, 0)))
            .collect();
        let threshold = verdicts
            .iter()
            .position(|verdict| *verdict != Compatibility::ClientTooOld)
            .unwrap();

        assert_eq!(clients[threshold], MIN_CLIENT_VERSION);
        assert!(verdicts[..threshold]
            .iter()
            .all(|verdict| *verdict == Compatibility::ClientTooOld));
        assert!(verdicts[threshold..]
            .iter()
            .all(|verdict| *verdict == Compatibility::Compatible));

        assert_eq!(
            gate.check(MIN_CLIENT_VERSION, SERVER_VERSION),
            Compatibility::Compatible
        );
        assert_eq!(
            gate.check(Version::new(0, 3), SERVER_VERSION),
            Compatibility::ClientTooOld
        );
    }

    proptest! {
        #![proptest_config(PropTestConfig::quick().to_proptest_config())]

        #[test]
        fn version_text_parses_back(version in version_strategy()) {
            prop_assert_eq!(version.to_string().parse::<Version>().unwrap(), version);
        }

        #[test]
        fn upgrading_a_client_never_makes_it_too_old(
            a in version_strategy(),
            b in version_strategy(),
            min_server in version_strategy(),
            server in version_strategy(),
            min_client in version_strategy(),
        ) {
            let (older, newer) = if a <= b { (a, b) } else { (b, a) };
            let gate = VersionGate::new(server, min_client);

            let before = gate.check(older, min_server);
            let after = gate.check(newer, min_server);
            if before != Compatibility::ClientTooOld {
                prop_assert_ne!(after, Compatibility::ClientTooOld);
            }
            if before == Compatibility::Compatible {
                prop_assert_eq!(after, Compatibility::Compatible);
            }
        }

        #[test]
        fn stored_login_reads_back(login in login_strategy()) {
            let mapper = FieldMapper::new(MemoryProtection::default());
            let mut entry = NativeEntry::new();
            mapper.apply_wire(&login, &mut entry);
            let wire = mapper.to_wire(&entry, false);

            prop_assert_eq!(&wire.host_name, &login.host_name);
            prop_assert_eq!(&wire.title, &login.title);
            prop_assert_eq!(wire.form_fields.len(), login.form_fields.len());
            for field in &login.form_fields {
                let read = wire
                    .form_fields
                    .iter()
                    .find(|f| f.name == field.name && f.field_type == field.field_type);
                prop_assert!(read.is_some(), "missing field {}", field.name);
                prop_assert_eq!(&read.unwrap().value, &field.value);
            }
        }
    }
}
