use super::{IdentityLookup, LookupOutcome};
use async_trait::async_trait;

/// A lookup that never finds an identity, used when none is configured.
pub struct DisabledLookup;

impl DisabledLookup {
    pub fn new() -> Self {
        DisabledLookup
    }
}

impl Default for DisabledLookup {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityLookup for DisabledLookup {
    fn get_name(&self) -> &str {
        "disabled"
    }

    fn get_type(&self) -> &str {
        "disabled"
    }

    async fn lookup(&self) -> Result<LookupOutcome, String> {
        Ok(LookupOutcome::Anonymous)
    }
}
