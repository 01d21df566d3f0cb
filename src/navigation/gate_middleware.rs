use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::base::{Decision, Navigation, NavigationContext, RouteMiddleware};
use crate::metrics::{Metrics, MetricsRecorder};
use crate::utils::log_throttle::LogThrottle;

const SUSPENDED_LOG_WINDOW: Duration = Duration::from_secs(10);

/// Holds navigations back until the startup auth check is done.
pub struct AuthGate {
    wait_timeout: Option<Duration>,
    metrics: Metrics,
    throttle: LogThrottle,
}

impl AuthGate {
    pub fn new(wait_timeout_in_ms: Option<u64>, metrics: Metrics) -> Self {
        AuthGate {
            wait_timeout: wait_timeout_in_ms.map(Duration::from_millis),
            metrics,
            throttle: LogThrottle::new(SUSPENDED_LOG_WINDOW),
        }
    }
}

#[async_trait]
impl RouteMiddleware for AuthGate {
    fn get_name(&self) -> &str {
        "auth-gate"
    }

    async fn handle(&self, navigation: &Navigation, ctx: &NavigationContext) -> Decision {
        if ctx.auth.phase().is_done() {
            return Decision::Proceed;
        }

        if let Some(suppressed_count) = self.throttle.should_emit("gate.suspended") {
            info!(
                event_name = "gate.navigation.suspended",
                event_domain = "gate",
                navigation_id = %navigation.id,
                path = navigation.path.as_str(),
                phase = ctx.auth.phase().as_str(),
                suppressed_count,
                "navigation suspended until the auth check finishes"
            );
        }

        let started_at = Instant::now();
        let released = match self.wait_timeout {
            Some(limit) => timeout(limit, ctx.auth.wait_done()).await.ok(),
            None => Some(ctx.auth.wait_done().await),
        };
        let waited = started_at.elapsed().as_secs_f64();

        match released {
            Some(snapshot) => {
                self.metrics.record_gate_wait("released", waited);
                debug!(
                    navigation_id = %navigation.id,
                    path = navigation.path.as_str(),
                    authenticated = snapshot.identity.is_some(),
                    "navigation released"
                );
                Decision::Proceed
            }
            None => {
                self.metrics.record_gate_wait("timeout", waited);
                warn!(
                    event_name = "gate.navigation.timeout",
                    event_domain = "gate",
                    navigation_id = %navigation.id,
                    path = navigation.path.as_str(),
                    "auth check did not finish in time; aborting navigation"
                );
                Decision::Abort("auth check did not finish in time".to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::{AuthStateHolder, Phase};
    use crate::models::Identity;
    use std::sync::Arc;
    use std::task::Poll;

    fn context() -> Arc<NavigationContext> {
        Arc::new(NavigationContext::new(Arc::new(AuthStateHolder::new()), false))
    }

    #[tokio::test]
    async fn test_proceeds_immediately_when_done() {
        let ctx = context();
        ctx.auth.finish(None).unwrap();
        let gate = AuthGate::new(None, Metrics::new());
        let navigation = Navigation::new("/settings");

        let mut handle = gate.handle(&navigation, &ctx);
        assert_eq!(futures::poll!(handle.as_mut()), Poll::Ready(Decision::Proceed));
        assert_eq!(ctx.auth.waiter_count(), 0);
    }

    #[tokio::test]
    async fn test_suspends_until_done() {
        let ctx = context();
        ctx.auth.set_phase(Phase::Checking).unwrap();
        let gate = AuthGate::new(None, Metrics::new());
        let navigation = Navigation::new("/dashboard");

        let mut handle = gate.handle(&navigation, &ctx);
        assert!(futures::poll!(handle.as_mut()).is_pending());
        assert!(futures::poll!(handle.as_mut()).is_pending());

        ctx.auth
            .finish(Some(Identity::new("example", "user-42", None, None)))
            .unwrap();
        assert_eq!(handle.await, Decision::Proceed);
    }

    #[tokio::test]
    async fn test_two_navigations_released_once_each() {
        let ctx = context();
        let gate = Arc::new(AuthGate::new(None, Metrics::new()));

        let spawn_navigation = |path: &'static str| {
            let ctx = ctx.clone();
            let gate = gate.clone();
            tokio::spawn(async move {
                let decision = gate.handle(&Navigation::new(path), &ctx).await;
                decision
            })
        };
        let first = spawn_navigation("/dashboard");
        let second = spawn_navigation("/reports");

        while ctx.auth.waiter_count() < 2 {
            tokio::task::yield_now().await;
        }
        ctx.auth.set_phase(Phase::Checking).unwrap();
        assert!(!first.is_finished());

        ctx.auth.finish(None).unwrap();
        assert_eq!(first.await.unwrap(), Decision::Proceed);
        assert_eq!(second.await.unwrap(), Decision::Proceed);
        assert_eq!(ctx.auth.waiter_count(), 0);
    }

    #[tokio::test]
    async fn test_abandoned_navigation_releases_waiter() {
        let ctx = context();
        let gate = AuthGate::new(None, Metrics::new());
        let navigation = Navigation::new("/dashboard");

        let mut handle = gate.handle(&navigation, &ctx);
        assert!(futures::poll!(handle.as_mut()).is_pending());
        assert_eq!(ctx.auth.waiter_count(), 1);

        drop(handle);
        assert_eq!(ctx.auth.waiter_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_timeout_aborts_navigation() {
        let ctx = context();
        ctx.auth.set_phase(Phase::Checking).unwrap();
        let gate = AuthGate::new(Some(250), Metrics::new());

        let decision = gate.handle(&Navigation::new("/dashboard"), &ctx).await;

        assert!(matches!(decision, Decision::Abort(_)));
        assert_eq!(ctx.auth.phase(), Phase::Checking);
        assert_eq!(ctx.auth.waiter_count(), 0);
    }
}
