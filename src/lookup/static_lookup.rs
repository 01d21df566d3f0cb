use std::collections::HashMap;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{IdentityLookup, LookupOutcome};
use crate::models::Identity;

/// StaticLookupConfig pins the identity in configuration, e.g. for kiosks and local runs.
#[derive(Deserialize, Serialize, Debug, JsonSchema, Clone)]
pub struct StaticLookupConfig {
    /// A friendly name for logs.
    pub name: String,
    pub realm: String,
    /// When absent, the lookup resolves as anonymous.
    pub username: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

pub struct StaticLookup {
    pub config: StaticLookupConfig,
}

impl StaticLookup {
    pub fn new(config: &StaticLookupConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }
}

#[async_trait]
impl IdentityLookup for StaticLookup {
    fn get_name(&self) -> &str {
        &self.config.name
    }

    fn get_type(&self) -> &str {
        "static"
    }

    async fn lookup(&self) -> Result<LookupOutcome, String> {
        match &self.config.username {
            Some(username) => {
                debug!("Static lookup '{}' resolved '{}'", self.config.name, username);
                Ok(LookupOutcome::Authenticated(Identity::new(
                    self.config.realm.clone(),
                    username.clone(),
                    Some(self.config.roles.clone()),
                    Some(self.config.attributes.clone()),
                )))
            }
            None => Ok(LookupOutcome::Anonymous),
        }
    }
}
