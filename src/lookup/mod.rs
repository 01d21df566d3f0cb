pub mod base;
pub mod disabled_lookup;
pub mod static_lookup;
pub mod whoami_lookup;

// Re-export the primary lookup items so code outside can do
// "use crate::lookup::{IdentityLookup, create_identity_lookup};"
pub use base::{create_identity_lookup, IdentityLookup, LookupConfig, LookupOutcome};
