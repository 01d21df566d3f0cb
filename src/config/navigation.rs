use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Maintenance mode: when enabled, every non-exempt path is sent to `page`.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct MaintenanceConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_maintenance_page")]
    pub page: String,
    /// Path prefixes that stay reachable during maintenance.
    #[serde(default)]
    pub exempt_prefixes: Vec<String>,
}

fn default_maintenance_page() -> String {
    "/maintenance".to_string()
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        MaintenanceConfig {
            enabled: false,
            page: default_maintenance_page(),
            exempt_prefixes: Vec::new(),
        }
    }
}

/// Which paths need an identity and where anonymous users are sent.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct AccessConfig {
    #[serde(default = "default_login_path")]
    pub login_path: String,
    #[serde(default = "default_home_path")]
    pub home_path: String,
    /// Reachable without an identity.
    #[serde(default = "default_public_prefixes")]
    pub public_prefixes: Vec<String>,
    /// Only for anonymous users; authenticated users are sent to `home_path`.
    #[serde(default = "default_guest_only")]
    pub guest_only: Vec<String>,
}

fn default_login_path() -> String {
    "/login".to_string()
}

fn default_home_path() -> String {
    "/".to_string()
}

fn default_public_prefixes() -> Vec<String> {
    vec![default_login_path()]
}

fn default_guest_only() -> Vec<String> {
    vec![default_login_path()]
}

impl Default for AccessConfig {
    fn default() -> Self {
        AccessConfig {
            login_path: default_login_path(),
            home_path: default_home_path(),
            public_prefixes: default_public_prefixes(),
            guest_only: default_guest_only(),
        }
    }
}
