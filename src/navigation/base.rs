use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};
use uuid::Uuid;

use super::access::AccessPolicy;
use super::gate_middleware::AuthGate;
use super::maintenance::MaintenanceGuard;
use crate::config::ConfigV1;
use crate::gate::AuthStateHolder;
use crate::metrics::Metrics;
use crate::utils::url::with_query;

/// A single navigation attempt.
#[derive(Debug, Clone)]
pub struct Navigation {
    pub id: Uuid,
    pub path: String,
    pub query: Option<String>,
    /// Navigations sharing a session supersede each other.
    pub session: Option<String>,
}

impl Navigation {
    pub fn new(path: impl Into<String>) -> Self {
        Navigation {
            id: Uuid::new_v4(),
            path: path.into(),
            query: None,
            session: None,
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        let query = query.into();
        self.query = (!query.is_empty()).then_some(query);
        self
    }

    pub fn with_session(mut self, session: impl Into<String>) -> Self {
        self.session = Some(session.into());
        self
    }

    /// Path plus query string, as the user requested it.
    pub fn full_path(&self) -> String {
        with_query(&self.path, self.query.as_deref().unwrap_or(""))
    }
}

/// What a middleware decided about a navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Proceed,
    Redirect(String),
    Abort(String),
}

impl Decision {
    pub fn label(&self) -> &'static str {
        match self {
            Decision::Proceed => "proceed",
            Decision::Redirect(_) => "redirect",
            Decision::Abort(_) => "abort",
        }
    }
}

/// Shared state handed to every middleware invocation.
///
/// Built once by startup and dropped at shutdown.
pub struct NavigationContext {
    pub auth: Arc<AuthStateHolder>,
    maintenance: AtomicBool,
}

impl NavigationContext {
    pub fn new(auth: Arc<AuthStateHolder>, maintenance_enabled: bool) -> Self {
        NavigationContext {
            auth,
            maintenance: AtomicBool::new(maintenance_enabled),
        }
    }

    pub fn maintenance_enabled(&self) -> bool {
        self.maintenance.load(Ordering::Acquire)
    }

    pub fn set_maintenance(&self, enabled: bool) {
        let previous = self.maintenance.swap(enabled, Ordering::AcqRel);
        if previous != enabled {
            info!(
                event_name = "navigation.maintenance.toggled",
                event_domain = "navigation",
                enabled,
                "maintenance mode changed"
            );
        }
    }
}

/// A navigation interceptor. Runs before the route is resolved.
#[async_trait]
pub trait RouteMiddleware: Send + Sync {
    fn get_name(&self) -> &str;
    async fn handle(&self, navigation: &Navigation, ctx: &NavigationContext) -> Decision;
}

/// Ordered middlewares; the first non-`Proceed` decision wins.
pub struct MiddlewareChain {
    middlewares: Vec<Box<dyn RouteMiddleware>>,
}

impl MiddlewareChain {
    pub fn new(middlewares: Vec<Box<dyn RouteMiddleware>>) -> Self {
        MiddlewareChain { middlewares }
    }

    /// The auth gate first, then maintenance mode, then the access policy.
    pub fn from_config(config: &ConfigV1, metrics: Metrics) -> Self {
        info!("Creating navigation middlewares...");
        Self::new(vec![
            Box::new(AuthGate::new(
                config.auth.gate_wait_timeout_in_ms,
                metrics,
            )),
            Box::new(MaintenanceGuard::new(
                &config.maintenance,
                &config.access.home_path,
            )),
            Box::new(AccessPolicy::new(&config.access)),
        ])
    }

    pub fn names(&self) -> Vec<&str> {
        self.middlewares.iter().map(|m| m.get_name()).collect()
    }

    pub async fn run(&self, navigation: &Navigation, ctx: &NavigationContext) -> Decision {
        for middleware in &self.middlewares {
            let decision = middleware.handle(navigation, ctx).await;
            if decision != Decision::Proceed {
                debug!(
                    navigation_id = %navigation.id,
                    path = navigation.path.as_str(),
                    middleware = middleware.get_name(),
                    decision = ?decision,
                    "navigation diverted"
                );
                return decision;
            }
        }
        Decision::Proceed
    }
}

/// True when `path` is `prefix` or lies below it (segment-wise).
pub fn matches_prefix(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || prefix.ends_with('/') || rest.starts_with('/'),
        None => false,
    }
}
