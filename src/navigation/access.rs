use async_trait::async_trait;
use tracing::debug;

use super::base::{matches_prefix, Decision, Navigation, NavigationContext, RouteMiddleware};
use crate::config::AccessConfig;
use crate::utils::url::{encode_component, with_query};

/// Decides what an authenticated or anonymous user may open.
///
/// Runs after the auth gate, so the identity it reads is final.
pub struct AccessPolicy {
    login_path: String,
    home_path: String,
    public_prefixes: Vec<String>,
    guest_only: Vec<String>,
}

impl AccessPolicy {
    pub fn new(config: &AccessConfig) -> Self {
        AccessPolicy {
            login_path: config.login_path.clone(),
            home_path: config.home_path.clone(),
            public_prefixes: config.public_prefixes.clone(),
            guest_only: config.guest_only.clone(),
        }
    }

    fn login_redirect(&self, navigation: &Navigation) -> String {
        let query = format!("redirect={}", encode_component(&navigation.full_path()));
        with_query(&self.login_path, &query)
    }
}

#[async_trait]
impl RouteMiddleware for AccessPolicy {
    fn get_name(&self) -> &str {
        "access"
    }

    async fn handle(&self, navigation: &Navigation, ctx: &NavigationContext) -> Decision {
        let path = navigation.path.as_str();
        let authenticated = ctx.auth.identity().is_some();

        if self.guest_only.iter().any(|p| matches_prefix(path, p)) {
            return if authenticated {
                Decision::Redirect(self.home_path.clone())
            } else {
                Decision::Proceed
            };
        }

        if authenticated || self.public_prefixes.iter().any(|p| matches_prefix(path, p)) {
            return Decision::Proceed;
        }

        debug!(path, "anonymous navigation to a protected path");
        Decision::Redirect(self.login_redirect(navigation))
    }
}
