use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The resolved representation of the current user.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    pub realm: String,
    pub username: String,
    pub roles: Vec<String>,
    pub attributes: HashMap<String, String>,
}

impl Identity {
    /// Construct a new Identity with optional roles and attributes.
    pub fn new(
        realm: impl Into<String>,
        username: impl Into<String>,
        roles: Option<Vec<String>>,
        attributes: Option<HashMap<String, String>>,
    ) -> Self {
        Identity {
            realm: realm.into(),
            username: username.into(),
            roles: roles.unwrap_or_default(),
            attributes: attributes.unwrap_or_default(),
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}
