use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::oneshot;
use tracing::debug;
use uuid::Uuid;

use super::base::{Decision, MiddlewareChain, Navigation, NavigationContext};
use crate::metrics::{Metrics, MetricsRecorder};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    Completed(Decision),
    /// A newer navigation in the same session replaced this one before it resolved.
    Superseded,
}

type PendingMap = HashMap<String, (Uuid, oneshot::Sender<()>)>;

/// Runs navigations through the middleware chain.
///
/// At most one navigation per session is pending; a newer one cancels the older, which
/// drops its suspended middlewares (and with them any gate waiter).
pub struct Navigator {
    chain: MiddlewareChain,
    context: Arc<NavigationContext>,
    metrics: Metrics,
    pending: Mutex<PendingMap>,
}

/// Clears this navigation's pending entry unless a newer one already replaced it.
struct PendingEntry<'a> {
    navigator: &'a Navigator,
    session: String,
    id: Uuid,
}

impl Drop for PendingEntry<'_> {
    fn drop(&mut self) {
        let mut pending = self.navigator.lock_pending();
        if pending
            .get(&self.session)
            .is_some_and(|(current, _)| *current == self.id)
        {
            pending.remove(&self.session);
        }
    }
}

impl Navigator {
    pub fn new(chain: MiddlewareChain, context: Arc<NavigationContext>, metrics: Metrics) -> Self {
        Navigator {
            chain,
            context,
            metrics,
            pending: Mutex::new(HashMap::new()),
        }
    }

    pub fn context(&self) -> &Arc<NavigationContext> {
        &self.context
    }

    fn lock_pending(&self) -> MutexGuard<'_, PendingMap> {
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn pending_count(&self) -> usize {
        self.lock_pending().len()
    }

    pub async fn navigate(&self, navigation: Navigation) -> NavigationOutcome {
        let session = match navigation.session.clone() {
            Some(session) => session,
            None => return NavigationOutcome::Completed(self.resolve(&navigation).await),
        };

        let (cancel_tx, cancel_rx) = oneshot::channel();
        let previous = self
            .lock_pending()
            .insert(session.clone(), (navigation.id, cancel_tx));
        if let Some((previous_id, cancel)) = previous {
            debug!(
                session = session.as_str(),
                superseded = %previous_id,
                navigation_id = %navigation.id,
                "superseding pending navigation"
            );
            let _ = cancel.send(());
        }
        let _entry = PendingEntry {
            navigator: self,
            session,
            id: navigation.id,
        };

        tokio::select! {
            decision = self.resolve(&navigation) => NavigationOutcome::Completed(decision),
            Ok(()) = cancel_rx => {
                self.metrics.record_navigation("superseded");
                NavigationOutcome::Superseded
            }
        }
    }

    async fn resolve(&self, navigation: &Navigation) -> Decision {
        let decision = self.chain.run(navigation, &self.context).await;
        self.metrics.record_navigation(decision.label());
        decision
    }
}
