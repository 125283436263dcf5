//! Native entry key schema.
//!
//! These key names are shared with the password database and must not change.
//! Nothing outside this module spells them out.

/// Site URL (scheme, host and port).
pub const URL: &str = "URL";
/// Form action URL.
pub const FORM_MATCH_URL: &str = "Form match URL";
/// HTTP authentication realm.
pub const FORM_HTTP_REALM: &str = "Form HTTP realm";
/// Reserved user name slot.
pub const USER_NAME: &str = "UserName";
/// Reserved password slot.
pub const PASSWORD: &str = "Password";
/// Entry title.
pub const TITLE: &str = "Title";
/// Lowercase title key written by early clients; read only.
pub const LEGACY_TITLE: &str = "title";

const FIELD_PREFIX: &str = "Form field ";
const TYPE_SUFFIX: &str = " type";
const VALUE_SUFFIX: &str = " value";

/// Key holding the type tag of form field `name`.
pub fn field_type_key(name: &str) -> String {
    format!("{FIELD_PREFIX}{name}{TYPE_SUFFIX}")
}

/// Key holding the value of non-reserved form field `name`.
pub fn field_value_key(name: &str) -> String {
    format!("{FIELD_PREFIX}{name}{VALUE_SUFFIX}")
}

/// Extracts the field name from a type key.
///
/// Returns `None` for any other key, including a type key with an empty name.
pub fn parse_field_type_key(key: &str) -> Option<&str> {
    key.strip_prefix(FIELD_PREFIX)?
        .strip_suffix(TYPE_SUFFIX)
        .filter(|name| !name.is_empty())
}
