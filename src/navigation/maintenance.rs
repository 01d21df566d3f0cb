use async_trait::async_trait;
use tracing::debug;

use super::base::{matches_prefix, Decision, Navigation, NavigationContext, RouteMiddleware};
use crate::config::MaintenanceConfig;

/// Sends every non-exempt navigation to the maintenance page while maintenance is on.
pub struct MaintenanceGuard {
    page: String,
    home_path: String,
    exempt_prefixes: Vec<String>,
}

impl MaintenanceGuard {
    pub fn new(config: &MaintenanceConfig, home_path: &str) -> Self {
        MaintenanceGuard {
            page: config.page.clone(),
            home_path: home_path.to_string(),
            exempt_prefixes: config.exempt_prefixes.clone(),
        }
    }

    fn is_exempt(&self, path: &str) -> bool {
        self.exempt_prefixes
            .iter()
            .any(|prefix| matches_prefix(path, prefix))
    }
}

#[async_trait]
impl RouteMiddleware for MaintenanceGuard {
    fn get_name(&self) -> &str {
        "maintenance"
    }

    async fn handle(&self, navigation: &Navigation, ctx: &NavigationContext) -> Decision {
        let on_page = navigation.path == self.page;

        if !ctx.maintenance_enabled() {
            // Nothing to show on the maintenance page outside maintenance.
            if on_page {
                return Decision::Redirect(self.home_path.clone());
            }
            return Decision::Proceed;
        }

        if on_page || self.is_exempt(&navigation.path) {
            Decision::Proceed
        } else {
            debug!(path = navigation.path.as_str(), "maintenance mode; redirecting");
            Decision::Redirect(self.page.clone())
        }
    }
}
