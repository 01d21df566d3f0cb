use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

use super::auth::AuthConfig;
use super::logging::LoggingConfig;
use super::navigation::{AccessConfig, MaintenanceConfig};

/// Environment variable naming the YAML config file.
pub const CONFIG_PATH_ENV: &str = "AUTHGATE_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "./config.yaml";
const ENV_PREFIX: &str = "AUTHGATE_";

/// A top-level enum for versioned configurations.
#[derive(Deserialize, Serialize, JsonSchema)]
#[serde(tag = "version")]
pub enum Config {
    #[serde(rename = "1.0.0")]
    ConfigV1(ConfigV1),
}

/// Main config for v1.0.0.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct ConfigV1 {
    pub bind_address: String,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub maintenance: MaintenanceConfig,
    #[serde(default)]
    pub access: AccessConfig,
}

impl From<Config> for ConfigV1 {
    fn from(config: Config) -> Self {
        // handle configuration migration between versions here when necessary
        match config {
            Config::ConfigV1(c) => c,
        }
    }
}

/// Load config from the YAML file named by `AUTHGATE_CONFIG` (default `./config.yaml`),
/// with `AUTHGATE_`-prefixed environment overrides. Nested keys use `__`, e.g.
/// `AUTHGATE_MAINTENANCE__ENABLED=true`.
pub fn load_config() -> Result<ConfigV1, figment::Error> {
    let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    load_config_from(&path)
}

pub fn load_config_from(path: &str) -> Result<ConfigV1, figment::Error> {
    Figment::new()
        .merge(Yaml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).ignore(&["CONFIG"]).split("__"))
        .extract::<Config>()
        .map(ConfigV1::from)
}

/// Print the JSON schema for the configuration to stdout.
pub fn print_schema() -> Result<(), serde_json::Error> {
    let schema = schema_for!(Config);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
