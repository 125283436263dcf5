//! Translation between native entries and wire-format logins.
//!
//! A form field lives in the native entry as a type key
//! (`Form field <name> type`) plus, for non-reserved types, a value key
//! (`Form field <name> value`). Password and user name fields keep their value
//! in the entry's reserved `Password` / `UserName` slots instead.

use crate::config::MemoryProtection;
use crate::entry::{schema, NativeEntry, ProtectedString};
use loginbridge_protocol::{CredentialEntry, FormField, FormFieldType};
use tracing::trace;

/// Human-readable label for a form field.
pub fn display_name(field_type: FormFieldType, name: &str) -> String {
    match field_type {
        FormFieldType::Password => "Password".to_string(),
        FormFieldType::Username => "User name".to_string(),
        _ => name.to_string(),
    }
}

/// Stateless mapper between [`NativeEntry`] and [`CredentialEntry`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldMapper {
    protection: MemoryProtection,
}

impl FieldMapper {
    /// Creates a mapper writing with the given protection policy.
    pub fn new(protection: MemoryProtection) -> Self {
        Self { protection }
    }

    /// Returns the protection policy.
    pub fn protection(&self) -> MemoryProtection {
        self.protection
    }

    /// Builds the wire form of `entry`.
    ///
    /// Fields come out in the order their type keys were inserted. Type tags
    /// this version does not know are skipped.
    pub fn to_wire(&self, entry: &NativeEntry, is_exact_match: bool) -> CredentialEntry {
        let mut form_fields = Vec::new();

        for (key, tag) in entry.strings.iter() {
            let Some(name) = schema::parse_field_type_key(key) else {
                continue;
            };
            let Some(field_type) = FormFieldType::from_tag(tag.as_str()) else {
                trace!(field = name, tag = tag.as_str(), "skipping field of unknown type");
                continue;
            };

            let value = match field_type {
                FormFieldType::Password => entry.password(),
                FormFieldType::Username => entry.username(),
                _ => entry.strings.read_safe(&schema::field_value_key(name)),
            };

            form_fields.push(FormField {
                name: name.to_string(),
                display_name: display_name(field_type, name),
                value: value.to_string(),
                field_type,
            });
        }

        CredentialEntry {
            host_name: entry.url().to_string(),
            form_action_url: entry.form_match_url().to_string(),
            http_realm: entry.http_realm().to_string(),
            title: entry.title().to_string(),
            form_fields,
            is_exact_match,
            unique_id: entry.id().to_hex(),
        }
    }

    /// Writes `login` into `entry` in place.
    ///
    /// URL, form match URL, realm and title are always overwritten. The entry
    /// is neither created nor persisted here.
    pub fn apply_wire(&self, login: &CredentialEntry, entry: &mut NativeEntry) {
        let policy = self.protection;

        for field in &login.form_fields {
            match field.field_type {
                FormFieldType::Password => {
                    entry.strings.set(
                        schema::PASSWORD,
                        ProtectedString::new(field.value.as_str(), policy.protect_password),
                    );
                    set_reserved_type(entry, &field.name, FormFieldType::Password);
                }
                FormFieldType::Username => {
                    entry.strings.set(
                        schema::USER_NAME,
                        ProtectedString::new(field.value.as_str(), policy.protect_user_name),
                    );
                    set_reserved_type(entry, &field.name, FormFieldType::Username);
                }
                other => {
                    entry.strings.set(
                        schema::field_value_key(&field.name),
                        ProtectedString::plain(field.value.as_str()),
                    );
                    entry.strings.set(
                        schema::field_type_key(&field.name),
                        ProtectedString::plain(other.as_str()),
                    );
                }
            }
        }

        entry.strings.set(
            schema::URL,
            ProtectedString::new(login.host_name.as_str(), policy.protect_url),
        );
        entry.strings.set(
            schema::FORM_MATCH_URL,
            ProtectedString::new(login.form_action_url.as_str(), policy.protect_url),
        );
        entry.strings.set(
            schema::FORM_HTTP_REALM,
            ProtectedString::new(login.http_realm.as_str(), policy.protect_url),
        );
        entry.strings.set(
            schema::TITLE,
            ProtectedString::new(login.title.as_str(), policy.protect_title),
        );
    }
}

/// Points the reserved slot of `field_type` at field `name`.
///
/// Any other field already tagged with the same reserved type is dropped, so an
/// entry never carries two password or two user name fields.
fn set_reserved_type(entry: &mut NativeEntry, name: &str, field_type: FormFieldType) {
    let tag = field_type.as_str();
    let stale: Vec<String> = entry
        .strings
        .iter()
        .filter(|(key, value)| {
            value.as_str() == tag
                && schema::parse_field_type_key(key).is_some_and(|other| other != name)
        })
        .map(|(key, _)| key.to_string())
        .collect();
    for key in stale {
        entry.strings.remove(&key);
    }
    entry
        .strings
        .set(schema::field_type_key(name), ProtectedString::plain(tag));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn native(pairs: &[(&str, &str)]) -> NativeEntry {
        let mut entry = NativeEntry::new();
        for (k, v) in pairs {
            entry.strings.set(*k, ProtectedString::plain(*v));
        }
        entry
    }

    #[test]
    fn to_wire_reads_reserved_slots() {
        let entry = native(&[
            ("URL", "https://example.com"),
            ("Form match URL", "https://example.com/login"),
            ("Title", "Example"),
            ("UserName", "alice"),
            ("Password", "s3cret"),
            ("Form field user type", "username"),
            ("Form field pass type", "password"),
        ]);

        let login = FieldMapper::default().to_wire(&entry, true);

        assert_eq!(login.host_name, "https://example.com");
        assert_eq!(login.form_action_url, "https://example.com/login");
        assert_eq!(login.title, "Example");
        assert!(login.is_exact_match);
        assert_eq!(login.unique_id, entry.id().to_hex());
        assert_eq!(login.form_fields.len(), 2);
        assert_eq!(login.form_fields[0].name, "user");
        assert_eq!(login.form_fields[0].value, "alice");
        assert_eq!(login.form_fields[0].display_name, "User name");
        assert_eq!(login.form_fields[1].value, "s3cret");
        assert_eq!(login.form_fields[1].display_name, "Password");
    }

    #[test]
    fn to_wire_keeps_insertion_order_and_skips_unknown() {
        let entry = native(&[
            ("Form field zeta type", "text"),
            ("Form field zeta value", "z"),
            ("Form field hidden type", "hidden"),
            ("Form field alpha type", "checkbox"),
            ("Form field alpha value", "on"),
        ]);

        let login = FieldMapper::default().to_wire(&entry, false);
        let names: Vec<_> = login.form_fields.iter().map(|f| f.name.as_str()).collect();

        assert_eq!(names, vec!["zeta", "alpha"]);
        assert_eq!(login.form_fields[1].field_type, FormFieldType::Checkbox);
        assert_eq!(login.form_fields[1].value, "on");
        assert_eq!(login.form_fields[1].display_name, "alpha");
    }

    #[test]
    fn to_wire_missing_value_key_is_empty() {
        let entry = native(&[("Form field q type", "select")]);
        let login = FieldMapper::default().to_wire(&entry, false);
        assert_eq!(login.form_fields[0].value, "");
    }

    #[test]
    fn apply_wire_writes_schema_keys() {
        let login = CredentialEntry::new("https://example.com", "Example")
            .with_form_action_url("https://example.com/login")
            .with_http_realm("")
            .with_field(FormField::username("user", "alice"))
            .with_field(FormField::password("pass", "s3cret"))
            .with_field(FormField::text("pin", "1234"));

        let mut entry = NativeEntry::new();
        FieldMapper::default().apply_wire(&login, &mut entry);

        assert_eq!(entry.strings.read_safe("URL"), "https://example.com");
        assert_eq!(entry.strings.read_safe("Form match URL"), "https://example.com/login");
        assert_eq!(entry.strings.read_safe("Form HTTP realm"), "");
        assert_eq!(entry.strings.read_safe("Title"), "Example");
        assert_eq!(entry.strings.read_safe("UserName"), "alice");
        assert_eq!(entry.strings.read_safe("Password"), "s3cret");
        assert_eq!(entry.strings.read_safe("Form field user type"), "username");
        assert_eq!(entry.strings.read_safe("Form field pass type"), "password");
        assert_eq!(entry.strings.read_safe("Form field pin type"), "text");
        assert_eq!(entry.strings.read_safe("Form field pin value"), "1234");
        assert!(!entry.strings.contains_key("Form field pass value"));
    }

    #[test]
    fn apply_wire_follows_protection_policy() {
        let login = CredentialEntry::new("https://example.com", "Example")
            .with_field(FormField::username("user", "alice"))
            .with_field(FormField::password("pass", "s3cret"));

        let mut entry = NativeEntry::new();
        FieldMapper::new(MemoryProtection::default().protect_url(true)).apply_wire(&login, &mut entry);

        assert!(entry.strings.get("Password").unwrap().is_protected());
        assert!(!entry.strings.get("UserName").unwrap().is_protected());
        assert!(entry.strings.get("URL").unwrap().is_protected());
        assert!(entry.strings.get("Form match URL").unwrap().is_protected());
        assert!(!entry.strings.get("Title").unwrap().is_protected());
        assert!(!entry.strings.get("Form field pass type").unwrap().is_protected());
    }

    #[test]
    fn apply_wire_writes_choice_fields() {
        let login = CredentialEntry::new("https://example.com", "Example")
            .with_field(FormField::new("remember", "yes", FormFieldType::Checkbox))
            .with_field(FormField::new("plan", "pro", FormFieldType::Select))
            .with_field(FormField::new("tier", "b", FormFieldType::Radio));

        let mapper = FieldMapper::default();
        let mut entry = NativeEntry::new();
        mapper.apply_wire(&login, &mut entry);

        assert_eq!(entry.strings.read_safe("Form field remember type"), "checkbox");
        assert_eq!(entry.strings.read_safe("Form field plan value"), "pro");

        let back = mapper.to_wire(&entry, false);
        let types: Vec<_> = back.form_fields.iter().map(|f| f.field_type).collect();
        assert_eq!(
            types,
            vec![FormFieldType::Checkbox, FormFieldType::Select, FormFieldType::Radio]
        );
    }

    #[test]
    fn renamed_password_field_replaces_old_one() {
        let mapper = FieldMapper::default();
        let mut entry = NativeEntry::new();

        let first = CredentialEntry::new("https://example.com", "Example")
            .with_field(FormField::password("pass", "one"));
        mapper.apply_wire(&first, &mut entry);

        let second = CredentialEntry::new("https://example.com", "Example")
            .with_field(FormField::password("pwd", "two"));
        mapper.apply_wire(&second, &mut entry);

        let login = mapper.to_wire(&entry, false);
        let passwords: Vec<_> = login
            .form_fields
            .iter()
            .filter(|f| f.field_type == FormFieldType::Password)
            .collect();
        assert_eq!(passwords.len(), 1);
        assert_eq!(passwords[0].name, "pwd");
        assert_eq!(passwords[0].value, "two");
    }

    #[test]
    fn roundtrip_preserves_attributes() {
        let login = CredentialEntry::new("https://example.com:8443", "Example")
            .with_form_action_url("https://example.com:8443/auth")
            .with_http_realm("Members")
            .with_field(FormField::username("u", "bob"))
            .with_field(FormField::password("p", "pw"))
            .with_field(FormField::text("t", "note"));

        let mapper = FieldMapper::default();
        let mut entry = NativeEntry::new();
        mapper.apply_wire(&login, &mut entry);
        let back = mapper.to_wire(&entry, false);

        assert_eq!(back.host_name, login.host_name);
        assert_eq!(back.form_action_url, login.form_action_url);
        assert_eq!(back.http_realm, login.http_realm);
        assert_eq!(back.title, login.title);
        let triples = |e: &CredentialEntry| {
            let mut v: Vec<_> = e
                .form_fields
                .iter()
                .map(|f| (f.name.clone(), f.field_type.as_str(), f.value.clone()))
                .collect();
            v.sort();
            v
        };
        assert_eq!(triples(&back), triples(&login));
    }
}
