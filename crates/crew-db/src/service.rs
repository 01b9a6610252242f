//! Service layer orchestrating task mutations with their audit trail.
//!
//! `CrewService` wraps `CrewDb` (raw database access) together with the
//! coordination settings every operation needs: the stale policy and the
//! admin rule. All repo methods are implemented as `impl CrewService`.

use crew_config::AdminConfig;
use crew_core::actor::Actor;
use crew_core::errors::CoreError;
use crew_core::lifecycle::StalePolicy;

use crate::CrewDb;
use crate::error::DatabaseError;

/// Orchestrates task mutations.
///
/// Every mutation method follows this protocol:
/// 1. Read the current row
/// 2. Decide using the crew-core rules
/// 3. Conditional write guarded by the state that was read
/// 4. Append audit entry
pub struct CrewService {
    db: CrewDb,
    policy: StalePolicy,
    admin: AdminConfig,
}

impl CrewService {
    /// Create a new service wrapping a local database.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn new_local(
        db_path: &str,
        policy: StalePolicy,
        admin: AdminConfig,
    ) -> Result<Self, DatabaseError> {
        let db = CrewDb::open_local(db_path).await?;
        Ok(Self::from_db(db, policy, admin))
    }

    /// Create a service backed by a synced Turso embedded replica.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the replica cannot be opened.
    pub async fn new_synced(
        local_replica_path: &str,
        remote_url: &str,
        auth_token: &str,
        policy: StalePolicy,
        admin: AdminConfig,
    ) -> Result<Self, DatabaseError> {
        let db = CrewDb::open_synced(local_replica_path, remote_url, auth_token).await?;
        Ok(Self::from_db(db, policy, admin))
    }

    /// Create from an existing `CrewDb` (for testing).
    #[must_use]
    pub const fn from_db(db: CrewDb, policy: StalePolicy, admin: AdminConfig) -> Self {
        Self { db, policy, admin }
    }

    /// Access the underlying database.
    #[must_use]
    pub const fn db(&self) -> &CrewDb {
        &self.db
    }

    #[must_use]
    pub const fn policy(&self) -> &StalePolicy {
        &self.policy
    }

    #[must_use]
    pub const fn admin(&self) -> &AdminConfig {
        &self.admin
    }

    /// Whether `actor` passes the admin check.
    #[must_use]
    pub fn is_admin(&self, actor: &Actor) -> bool {
        self.admin.is_admin(actor)
    }

    /// Push local state to and pull from the remote primary, if replicated.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the sync fails.
    pub async fn sync(&self) -> Result<(), DatabaseError> {
        self.db.sync().await
    }

    /// Reject `actor` unless it passes the admin check.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Unauthorized` naming the attempted `action`.
    pub(crate) fn require_admin(&self, actor: &Actor, action: &str) -> Result<(), DatabaseError> {
        if self.is_admin(actor) {
            return Ok(());
        }
        tracing::warn!(actor = %actor.id, action, "admin check failed");
        Err(CoreError::Unauthorized {
            actor: actor.id.clone(),
            action: action.to_string(),
        }
        .into())
    }
}
