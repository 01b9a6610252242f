//! Admin authorization configuration.

use crew_core::actor::Actor;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AdminConfig {
    /// Email domain whose addresses are admins (e.g. `fitlab.io`).
    ///
    /// Empty disables the check: every actor is treated as an admin.
    #[serde(default)]
    pub email_domain: String,
}

impl AdminConfig {
    /// Whether admin checks are enforced.
    #[must_use]
    pub fn is_enforced(&self) -> bool {
        !self.email_domain.trim().is_empty()
    }

    #[must_use]
    pub fn is_admin(&self, actor: &Actor) -> bool {
        !self.is_enforced() || actor.has_email_domain(&self.email_domain)
    }
}
