//! Wire-format login records.

use serde::{Deserialize, Serialize};

/// Type of a form field carried by a login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormFieldType {
    /// Password input. Backed by the entry's reserved password slot.
    Password,
    /// User name input. Backed by the entry's reserved user name slot.
    Username,
    /// Free text input.
    Text,
    /// Radio button.
    Radio,
    /// Select list.
    Select,
    /// Checkbox.
    Checkbox,
}

impl FormFieldType {
    /// All field types, in declaration order.
    pub const ALL: [FormFieldType; 6] = [
        FormFieldType::Password,
        FormFieldType::Username,
        FormFieldType::Text,
        FormFieldType::Radio,
        FormFieldType::Select,
        FormFieldType::Checkbox,
    ];

    /// Returns the tag stored in the native entry's type key.
    pub fn as_str(&self) -> &'static str {
        match self {
            FormFieldType::Password => "password",
            FormFieldType::Username => "username",
            FormFieldType::Text => "text",
            FormFieldType::Radio => "radio",
            FormFieldType::Select => "select",
            FormFieldType::Checkbox => "checkbox",
        }
    }

    /// Parses a stored type tag. Unknown tags yield `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == tag)
    }

    /// Returns true for the two types with a reserved native slot.
    pub fn is_reserved(&self) -> bool {
        matches!(self, FormFieldType::Password | FormFieldType::Username)
    }
}

/// One named, typed value of a login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    /// Field label as it appears in the form.
    pub name: String,
    /// Human-readable label computed by the server.
    pub display_name: String,
    /// Field value.
    pub value: String,
    /// Field type.
    pub field_type: FormFieldType,
}

impl FormField {
    /// Creates a field. The display name is left empty for the server to fill.
    pub fn new(name: impl Into<String>, value: impl Into<String>, field_type: FormFieldType) -> Self {
        Self {
            name: name.into(),
            display_name: String::new(),
            value: value.into(),
            field_type,
        }
    }

    /// Creates a password field.
    pub fn password(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, value, FormFieldType::Password)
    }

    /// Creates a user name field.
    pub fn username(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, value, FormFieldType::Username)
    }

    /// Creates a text field.
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, value, FormFieldType::Text)
    }
}

/// A login record as exchanged with remote callers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialEntry {
    /// Scheme, host and port of the site (no path).
    pub host_name: String,
    /// Form action URL.
    pub form_action_url: String,
    /// HTTP authentication realm.
    pub http_realm: String,
    /// Entry title.
    pub title: String,
    /// Form fields in stored order.
    pub form_fields: Vec<FormField>,
    /// Whether the entry matched the query exactly. Only meaningful in responses.
    pub is_exact_match: bool,
    /// Lowercase hex id of the backing entry; empty before the entry is stored.
    pub unique_id: String,
}

impl CredentialEntry {
    /// Creates an entry for the given site.
    pub fn new(host_name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            host_name: host_name.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    /// Sets the form action URL.
    pub fn with_form_action_url(mut self, url: impl Into<String>) -> Self {
        self.form_action_url = url.into();
        self
    }

    /// Sets the HTTP realm.
    pub fn with_http_realm(mut self, realm: impl Into<String>) -> Self {
        self.http_realm = realm.into();
        self
    }

    /// Appends a form field.
    pub fn with_field(mut self, field: FormField) -> Self {
        self.form_fields.push(field);
        self
    }

    /// Returns the first field of the given type.
    pub fn field_of_type(&self, field_type: FormFieldType) -> Option<&FormField> {
        self.form_fields.iter().find(|f| f.field_type == field_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_tags() {
        for t in FormFieldType::ALL {
            assert_eq!(FormFieldType::from_tag(t.as_str()), Some(t));
        }
        assert_eq!(FormFieldType::from_tag("hidden"), None);
        assert_eq!(FormFieldType::from_tag("Password"), None);
    }

    #[test]
    fn reserved_types() {
        assert!(FormFieldType::Password.is_reserved());
        assert!(FormFieldType::Username.is_reserved());
        assert!(!FormFieldType::Checkbox.is_reserved());
    }

    #[test]
    fn builder() {
        let entry = CredentialEntry::new("https://example.com", "Example")
            .with_form_action_url("https://example.com/login")
            .with_field(FormField::username("user", "alice"))
            .with_field(FormField::password("pass", "s3cret"));

        assert_eq!(entry.form_fields.len(), 2);
        assert_eq!(
            entry.field_of_type(FormFieldType::Password).map(|f| f.value.as_str()),
            Some("s3cret")
        );
    }
}
