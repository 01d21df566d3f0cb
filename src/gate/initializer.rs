use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::FutureExt;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::holder::AuthStateHolder;
use super::phase::Phase;
use crate::lookup::{IdentityLookup, LookupOutcome};
use crate::metrics::{Metrics, MetricsRecorder};
use crate::models::Identity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// This call performed the identity lookup.
    Performed,
    /// Another call already started the check; nothing was done.
    AlreadyStarted,
}

/// Runs the startup auth check: Unchecked -> Checking -> Done.
pub struct AuthInitializer {
    holder: Arc<AuthStateHolder>,
    lookup: Arc<dyn IdentityLookup>,
    lookup_timeout: Duration,
    metrics: Metrics,
    started: AtomicBool,
}

/// Finishes the check as anonymous if `run` is dropped mid-lookup.
struct FinishOnDrop<'a> {
    holder: &'a AuthStateHolder,
    armed: bool,
}

impl Drop for FinishOnDrop<'_> {
    fn drop(&mut self) {
        if self.armed && self.holder.finish(None).is_ok() {
            warn!(
                event_name = "gate.initializer.cancelled",
                event_domain = "gate",
                "auth check cancelled; treating the user as logged out"
            );
        }
    }
}

impl AuthInitializer {
    pub fn new(
        holder: Arc<AuthStateHolder>,
        lookup: Arc<dyn IdentityLookup>,
        lookup_timeout: Duration,
        metrics: Metrics,
    ) -> Self {
        AuthInitializer {
            holder,
            lookup,
            lookup_timeout,
            metrics,
            started: AtomicBool::new(false),
        }
    }

    /// Performs the identity lookup at most once per initializer.
    ///
    /// Lookup errors, timeouts and panics all end in `Done` without identity.
    pub async fn run(&self) -> RunOutcome {
        if self
            .started
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Auth check already started; skipping");
            return RunOutcome::AlreadyStarted;
        }

        if let Err(e) = self.holder.set_phase(Phase::Checking) {
            warn!("Auth check started in an unexpected phase: {}", e);
            return RunOutcome::Performed;
        }
        let mut guard = FinishOnDrop {
            holder: &self.holder,
            armed: true,
        };

        info!(
            event_name = "gate.lookup.started",
            event_domain = "gate",
            lookup_name = self.lookup.get_name(),
            lookup_type = self.lookup.get_type(),
            "resolving identity"
        );

        let started_at = Instant::now();
        let identity = self.resolve().await;
        let result = match &identity {
            Ok(Some(_)) => "authenticated",
            Ok(None) => "anonymous",
            Err(reason) => *reason,
        };
        self.metrics
            .record_lookup(result, started_at.elapsed().as_secs_f64());

        guard.armed = false;
        let identity = identity.unwrap_or(None);
        let username = identity.as_ref().map(|i| i.username.clone());
        match self.holder.finish(identity) {
            Ok(()) => info!(
                event_name = "gate.lookup.finished",
                event_domain = "gate",
                result,
                username = username.as_deref().unwrap_or("-"),
                "auth check done"
            ),
            Err(e) => warn!("Could not record auth check result: {}", e),
        }

        RunOutcome::Performed
    }

    /// `Err` carries the metric label for a failed lookup.
    async fn resolve(&self) -> Result<Option<Identity>, &'static str> {
        let attempt = AssertUnwindSafe(self.lookup.lookup()).catch_unwind();
        match timeout(self.lookup_timeout, attempt).await {
            Ok(Ok(Ok(LookupOutcome::Authenticated(identity)))) => Ok(Some(identity)),
            Ok(Ok(Ok(LookupOutcome::Anonymous))) => Ok(None),
            Ok(Ok(Err(e))) => {
                warn!(
                    "Lookup '{}' failed; treating the user as logged out: {}",
                    self.lookup.get_name(),
                    e
                );
                Err("error")
            }
            Ok(Err(_)) => {
                warn!(
                    "Lookup '{}' panicked; treating the user as logged out",
                    self.lookup.get_name()
                );
                Err("panicked")
            }
            Err(_) => {
                warn!(
                    "Lookup '{}' timed out after {:?}; treating the user as logged out",
                    self.lookup.get_name(),
                    self.lookup_timeout
                );
                Err("timeout")
            }
        }
    }

    /// Runs the check on the tokio runtime.
    pub fn spawn(self: Arc<Self>) -> JoinHandle<RunOutcome> {
        tokio::spawn(async move { self.run().await })
    }
}
