//! Process-wide auth check state.
//!
//! `AuthStateHolder` owns the tri-state phase and the resolved identity. It is written by
//! the initializer only and read by every navigation. Observers either register callbacks
//! through [`AuthStateHolder::subscribe`] or await [`AuthStateHolder::wait_done`].

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::phase::{Phase, PhaseError};
use crate::models::Identity;

pub type SubscriptionId = u64;

/// Passed to subscriber callbacks once per transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseEvent {
    pub from: Phase,
    pub to: Phase,
    /// The id of the subscription being notified, usable with [`AuthStateHolder::unsubscribe`].
    pub subscription: SubscriptionId,
}

type Callback = Arc<dyn Fn(&PhaseEvent) + Send + Sync>;

/// A consistent view of the auth check state.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct AuthSnapshot {
    pub phase: Phase,
    pub identity: Option<Identity>,
    pub checked_at: Option<DateTime<Utc>>,
}

struct HolderInner {
    phase: Phase,
    identity: Option<Identity>,
    checked_at: Option<DateTime<Utc>>,
    subscribers: Vec<(SubscriptionId, Callback)>,
    next_id: SubscriptionId,
}

pub struct AuthStateHolder {
    inner: Mutex<HolderInner>,
    phase_tx: watch::Sender<Phase>,
}

impl AuthStateHolder {
    pub fn new() -> Self {
        let (phase_tx, _) = watch::channel(Phase::Unchecked);
        AuthStateHolder {
            inner: Mutex::new(HolderInner {
                phase: Phase::Unchecked,
                identity: None,
                checked_at: None,
                subscribers: Vec::new(),
                next_id: 0,
            }),
            phase_tx,
        }
    }

    // Callbacks never run under the lock, so a poisoned mutex still holds consistent data.
    fn lock(&self) -> MutexGuard<'_, HolderInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn phase(&self) -> Phase {
        self.lock().phase
    }

    pub fn identity(&self) -> Option<Identity> {
        self.lock().identity.clone()
    }

    pub fn snapshot(&self) -> AuthSnapshot {
        let inner = self.lock();
        AuthSnapshot {
            phase: inner.phase,
            identity: inner.identity.clone(),
            checked_at: inner.checked_at,
        }
    }

    /// Moves the phase forward.
    ///
    /// Returns `Ok(true)` on a transition, `Ok(false)` when `phase` is already current and
    /// `PhaseError::Regression` when it would move backward. Reaching `Done` this way
    /// records "no identity".
    pub fn set_phase(&self, phase: Phase) -> Result<bool, PhaseError> {
        self.transition(phase, None, false)
    }

    /// Transitions to `Done` and stores `identity` in the same critical section.
    pub fn finish(&self, identity: Option<Identity>) -> Result<(), PhaseError> {
        self.transition(Phase::Done, identity, true).map(|_| ())
    }

    fn transition(
        &self,
        to: Phase,
        identity: Option<Identity>,
        reject_repeat: bool,
    ) -> Result<bool, PhaseError> {
        let (from, callbacks) = {
            let mut inner = self.lock();
            let from = inner.phase;
            if to < from {
                return Err(PhaseError::Regression { from, to });
            }
            if to == from {
                if reject_repeat && from.is_done() {
                    return Err(PhaseError::AlreadyDone);
                }
                return Ok(false);
            }

            inner.phase = to;
            if to.is_done() {
                inner.identity = identity;
                inner.checked_at = Some(Utc::now());
            }
            // Published under the lock so waiters never read a stale identity.
            self.phase_tx.send_replace(to);
            (from, inner.subscribers.clone())
        };

        info!(
            event_name = "gate.phase.transition",
            event_domain = "gate",
            from = from.as_str(),
            to = to.as_str(),
            subscribers = callbacks.len(),
            "auth check phase changed"
        );
        Self::notify(from, to, callbacks);
        Ok(true)
    }

    fn notify(from: Phase, to: Phase, callbacks: Vec<(SubscriptionId, Callback)>) {
        for (id, callback) in callbacks {
            let event = PhaseEvent {
                from,
                to,
                subscription: id,
            };
            if catch_unwind(AssertUnwindSafe(|| callback(&event))).is_err() {
                warn!(
                    event_name = "gate.subscriber.panicked",
                    event_domain = "gate",
                    subscription = id,
                    to = to.as_str(),
                    "phase subscriber panicked; continuing with remaining subscribers"
                );
            }
        }
    }

    /// Registers `callback` to run once per phase transition.
    ///
    /// Every subscriber registered when a transition happens is invoked exactly once for
    /// it, even if another callback unsubscribes it meanwhile. Dropping the returned
    /// guard unsubscribes.
    pub fn subscribe<F>(self: &Arc<Self>, callback: F) -> Subscription
    where
        F: Fn(&PhaseEvent) + Send + Sync + 'static,
    {
        let mut inner = self.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.subscribers.push((id, Arc::new(callback)));
        debug!(subscription = id, "phase subscriber registered");

        Subscription {
            id,
            holder: Arc::downgrade(self),
        }
    }

    /// Removes a subscription. Safe to call from inside a callback.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut inner = self.lock();
        let before = inner.subscribers.len();
        inner.subscribers.retain(|(sub_id, _)| *sub_id != id);
        inner.subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    /// Resolves once the phase is `Done`, immediately if it already is.
    ///
    /// Dropping the future before completion releases the waiter.
    pub async fn wait_done(&self) -> AuthSnapshot {
        let mut rx = self.phase_tx.subscribe();
        // The sender lives as long as `self`, so this cannot observe a closed channel.
        let _ = rx.wait_for(|phase| phase.is_done()).await;
        self.snapshot()
    }

    /// Number of `wait_done` futures currently pending.
    pub fn waiter_count(&self) -> usize {
        self.phase_tx.receiver_count()
    }
}

impl Default for AuthStateHolder {
    fn default() -> Self {
        Self::new()
    }
}

/// Unsubscribes from the holder when dropped.
pub struct Subscription {
    id: SubscriptionId,
    holder: Weak<AuthStateHolder>,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Returns `false` if the subscription was already removed.
    pub fn unsubscribe(self) -> bool {
        self.release()
    }

    fn release(&self) -> bool {
        match self.holder.upgrade() {
            Some(holder) => holder.unsubscribe(self.id),
            None => false,
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}
