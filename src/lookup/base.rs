use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::disabled_lookup::DisabledLookup;
use super::static_lookup::{StaticLookup, StaticLookupConfig};
use super::whoami_lookup::{WhoAmILookup, WhoAmILookupConfig};
use crate::models::Identity;

/// Result of a successful identity lookup.
///
/// "Not authenticated" is a normal answer, not an error. Errors are reserved for
/// transport-level failures.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    Authenticated(Identity),
    Anonymous,
}

/// Configuration options for the identity lookup collaborator.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone)]
#[serde(tag = "type")]
pub enum LookupConfig {
    #[serde(rename = "who-am-i")]
    WhoAmI(WhoAmILookupConfig),
    #[serde(rename = "static")]
    Static(StaticLookupConfig),
}

/// Resolves the current identity once at startup.
#[async_trait]
pub trait IdentityLookup: Send + Sync {
    fn get_name(&self) -> &str;
    fn get_type(&self) -> &str;
    async fn lookup(&self) -> Result<LookupOutcome, String>;
}

/// Create the identity lookup from config. No config means lookups are disabled and
/// every check resolves to anonymous.
pub fn create_identity_lookup(config: Option<&LookupConfig>) -> Arc<dyn IdentityLookup> {
    match config {
        Some(LookupConfig::WhoAmI(cfg)) => Arc::new(WhoAmILookup::new(cfg)),
        Some(LookupConfig::Static(cfg)) => Arc::new(StaticLookup::new(cfg)),
        None => {
            info!("No identity lookup configured; the auth check will resolve as anonymous");
            Arc::new(DisabledLookup::new())
        }
    }
}
