use serde::{Deserialize, Serialize};

/// A single tag attached to an account. Not deduplicated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub text: String,
}

impl Label {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    #[default]
    Ldap,
    Local,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub labels: Vec<Label>,
    /// Freeform label text, kept verbatim and never derived from `labels`.
    #[serde(rename = "labelsRaw")]
    pub labels_raw: String,
    #[serde(rename = "type")]
    pub account_type: AccountType,
    pub login: String,
    #[serde(default)]
    pub password: Option<String>,
}

impl Account {
    /// A blank record as created by [`crate::AccountStore::add_empty`].
    pub fn empty(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            labels: Vec::new(),
            labels_raw: String::new(),
            account_type: AccountType::Ldap,
            login: String::new(),
            password: None,
        }
    }
}
