use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::lookup::LookupConfig;

/// Settings for the startup auth check and the gate that waits on it.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct AuthConfig {
    /// Upper bound for the identity lookup. Exceeding it resolves the check as anonymous.
    #[serde(default = "default_timeout_in_ms")]
    pub timeout_in_ms: u64,
    /// Upper bound for a navigation suspended at the gate. Unbounded when absent.
    #[serde(default)]
    pub gate_wait_timeout_in_ms: Option<u64>,
    /// The identity lookup collaborator. Lookups are disabled when absent.
    #[serde(default)]
    pub lookup: Option<LookupConfig>,
}

fn default_timeout_in_ms() -> u64 {
    3000
}

impl Default for AuthConfig {
    fn default() -> Self {
        AuthConfig {
            timeout_in_ms: default_timeout_in_ms(),
            gate_wait_timeout_in_ms: None,
            lookup: None,
        }
    }
}
