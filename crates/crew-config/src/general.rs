//! General application configuration.

use crew_core::enums::ActorKind;
use serde::{Deserialize, Serialize};

/// Default result limit.
const fn default_limit() -> u32 {
    20
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Actor id used when `--actor` is not given (an agent name or an email).
    #[serde(default)]
    pub actor: String,

    /// Kind of contributor the default actor is.
    #[serde(default)]
    pub actor_kind: ActorKind,

    /// Default result limit for list/search commands.
    #[serde(default = "default_limit")]
    pub default_limit: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            actor: String::new(),
            actor_kind: ActorKind::default(),
            default_limit: default_limit(),
        }
    }
}

impl GeneralConfig {
    /// Whether a default actor is configured.
    #[must_use]
    pub fn has_actor(&self) -> bool {
        !self.actor.trim().is_empty()
    }
}
