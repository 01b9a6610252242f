//! The identity performing a coordination operation.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::ActorKind;
use crate::errors::CoreError;

/// Who is acting, and which kind of contributor they are.
///
/// `id` is free-form (an agent name or an email address). Only its email
/// domain matters for admin checks.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Actor {
    pub id: String,
    pub kind: ActorKind,
}

impl Actor {
    /// # Errors
    ///
    /// Returns `CoreError::Validation` if `id` is blank.
    pub fn new(id: impl Into<String>, kind: ActorKind) -> Result<Self, CoreError> {
        let id = id.into().trim().to_string();
        if id.is_empty() {
            return Err(CoreError::Validation(
                "actor id must not be empty (pass --actor or set general.actor)".into(),
            ));
        }
        Ok(Self { id, kind })
    }

    /// Whether the actor id is an email address in `domain`.
    ///
    /// Compared case-insensitively against the text after the last `@`.
    #[must_use]
    pub fn has_email_domain(&self, domain: &str) -> bool {
        let domain = domain.trim().trim_start_matches('@');
        if domain.is_empty() {
            return false;
        }
        self.id
            .rsplit_once('@')
            .is_some_and(|(local, host)| !local.is_empty() && host.eq_ignore_ascii_case(domain))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("coach@fitlab.io", "fitlab.io", true)]
    #[case("Coach@FITLAB.IO", "fitlab.io", true)]
    #[case("coach@fitlab.io", "@fitlab.io", true)]
    #[case("coach@evil-fitlab.io", "fitlab.io", false)]
    #[case("fitlab.io", "fitlab.io", false)]
    #[case("@fitlab.io", "fitlab.io", false)]
    #[case("coach@fitlab.io", "", false)]
    fn email_domain_match(#[case] id: &str, #[case] domain: &str, #[case] expected: bool) {
        let actor = Actor::new(id, ActorKind::Human).unwrap();
        assert_eq!(actor.has_email_domain(domain), expected);
    }

    #[test]
    fn blank_actor_rejected() {
        assert!(matches!(
            Actor::new("  ", ActorKind::AiAgent),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn actor_id_is_trimmed() {
        let actor = Actor::new(" agent-7 ", ActorKind::AiAgent).unwrap();
        assert_eq!(actor.id, "agent-7");
    }
}
