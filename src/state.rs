//! Shared application state.
//!
//! Contains the state that is shared across all request handlers: configuration, the
//! auth check state, the navigator and the metrics registry.

use crate::config::ConfigV1;
use crate::gate::AuthStateHolder;
use crate::metrics::Metrics;
use crate::navigation::Navigator;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded at startup.
    pub config: Arc<ConfigV1>,
    /// The startup auth check state, also reachable through the navigator's context.
    pub auth: Arc<AuthStateHolder>,
    /// Runs navigations through the middleware chain.
    pub navigator: Arc<Navigator>,
    pub metrics: Metrics,
}
