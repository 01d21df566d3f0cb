use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::StatusCode;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use super::{IdentityLookup, LookupOutcome};
use crate::models::Identity;

/// The config needed to ask an identity service who the current user is.
#[derive(Deserialize, Serialize, Debug, JsonSchema, Clone)]
pub struct WhoAmILookupConfig {
    pub name: String,
    /// Base URI of the identity service; `/who-am-i` is appended.
    pub uri: String,
    pub realm: String,
    /// Sent as a Bearer token when present.
    pub token: Option<String>,
}

/// A lookup that calls a who-am-i endpoint.
pub struct WhoAmILookup {
    pub config: WhoAmILookupConfig,
    client: reqwest::Client,
}

impl WhoAmILookup {
    pub fn new(config: &WhoAmILookupConfig) -> Self {
        info!(
            "Creating who-am-i lookup for realm '{}', name='{}'",
            config.realm, config.name
        );
        Self {
            config: config.clone(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl IdentityLookup for WhoAmILookup {
    fn get_name(&self) -> &str {
        &self.config.name
    }

    fn get_type(&self) -> &str {
        "who-am-i"
    }

    async fn lookup(&self) -> Result<LookupOutcome, String> {
        query(
            &self.client,
            &self.config.uri,
            self.config.token.as_deref(),
            &self.config.realm,
        )
        .await
    }
}

/// Queries `{uri}/who-am-i`. 401 and 403 mean "not authenticated"; any other non-success
/// status is an error.
async fn query(
    client: &reqwest::Client,
    uri: &str,
    token: Option<&str>,
    realm: &str,
) -> Result<LookupOutcome, String> {
    let url = format!("{}/who-am-i", uri.trim_end_matches('/'));

    debug!("Sending who-am-i request to: {}", url);
    let mut request = client.get(&url);
    if let Some(token) = token {
        request = request.bearer_auth(token);
    }
    let response = request
        .send()
        .await
        .map_err(|e| format!("Error sending request: {}", e))?;

    match response.status() {
        status if status.is_success() => {
            let body = response
                .text()
                .await
                .map_err(|e| format!("Error reading response body: {}", e))?;
            let info: Value =
                serde_json::from_str(&body).map_err(|e| format!("Error parsing JSON: {}", e))?;
            parse_identity(&info, realm).map(LookupOutcome::Authenticated)
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(LookupOutcome::Anonymous),
        status => Err(format!("Unexpected status code: {}", status)),
    }
}

fn parse_identity(info: &Value, realm: &str) -> Result<Identity, String> {
    let username = info["uid"]
        .as_str()
        .or_else(|| info["username"].as_str())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| "who-am-i response has no username".to_string())?;

    let roles = info["roles"].as_array().map(|roles| {
        roles
            .iter()
            .filter_map(|role| role.as_str().map(str::to_string))
            .collect::<Vec<_>>()
    });

    let mut attributes = HashMap::new();
    if let Some(email) = info["email"].as_str() {
        attributes.insert("email".to_string(), email.to_string());
    }

    Ok(Identity::new(realm, username, roles, Some(attributes)))
}
