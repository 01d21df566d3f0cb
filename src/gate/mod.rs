//! Startup auth-gate sequencing.
//!
//! The [`AuthStateHolder`] records whether the startup identity check has finished, the
//! [`AuthInitializer`] performs that check once, and the navigation gate waits on the
//! holder before any route decision is made.

pub mod holder;
pub mod initializer;
pub mod phase;

pub use holder::{AuthSnapshot, AuthStateHolder, PhaseEvent, Subscription, SubscriptionId};
pub use initializer::{AuthInitializer, RunOutcome};
pub use phase::{Phase, PhaseError};
