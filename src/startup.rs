//! Application startup and server initialization.
//!
//! Builds the navigation context (auth state, initializer, middleware chain), starts the
//! startup auth check exactly once, and serves HTTP until shutdown.

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::ConfigV1;
use crate::gate::{AuthInitializer, AuthStateHolder, Subscription};
use crate::lookup::create_identity_lookup;
use crate::metrics::{Metrics, MetricsRecorder};
use crate::navigation::{MiddlewareChain, NavigationContext, Navigator};
use crate::routes;
use crate::state::AppState;

/// Everything the server owns for its lifetime. Dropping it tears the context down.
pub struct Application {
    pub state: AppState,
    pub initializer: Arc<AuthInitializer>,
    _phase_metrics: Subscription,
}

/// Wires the application together without starting the auth check.
pub fn build(config: Arc<ConfigV1>) -> Application {
    let metrics = Metrics::new();
    let auth = Arc::new(AuthStateHolder::new());
    metrics.record_phase(auth.phase());

    let phase_metrics = {
        let metrics = metrics.clone();
        auth.subscribe(move |event| metrics.record_phase(event.to))
    };

    let lookup = create_identity_lookup(config.auth.lookup.as_ref());
    let initializer = Arc::new(AuthInitializer::new(
        auth.clone(),
        lookup,
        Duration::from_millis(config.auth.timeout_in_ms),
        metrics.clone(),
    ));

    let context = Arc::new(NavigationContext::new(
        auth.clone(),
        config.maintenance.enabled,
    ));
    let chain = MiddlewareChain::from_config(&config, metrics.clone());
    info!("Navigation middlewares: {}", chain.names().join(" -> "));
    let navigator = Arc::new(Navigator::new(chain, context, metrics.clone()));

    Application {
        state: AppState {
            config,
            auth,
            navigator,
            metrics,
        },
        initializer,
        _phase_metrics: phase_metrics,
    }
}

/// Initializes and runs the application server.
///
/// The auth check starts before the listener is bound, so the first navigation may
/// already find it done; navigations arriving earlier wait at the gate.
///
/// # Errors
///
/// Returns an error if the server fails to bind to the configured address
/// or encounters a runtime error during execution.
pub async fn run(config: Arc<ConfigV1>) -> Result<(), Box<dyn std::error::Error>> {
    let app = build(config.clone());
    let auth_check = app.initializer.clone().spawn();

    let router = routes::create_router(app.state.clone());
    let listener = TcpListener::bind(&config.bind_address).await?;
    info!("Starting server on {}", config.bind_address);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped; tearing down navigation context");
    if !auth_check.is_finished() {
        warn!("Auth check still running at shutdown; aborting it");
        auth_check.abort();
    }
    drop(app);
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
