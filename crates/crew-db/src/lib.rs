//! # crew-db
//!
//! libSQL task store and coordination service for Crew.
//!
//! Holds the task board and its audit trail. Every state change that can
//! race (claim, release, review, completion) is a conditional `UPDATE` whose
//! `WHERE` clause re-checks the state the decision was made on; a write that
//! changes zero rows lost the race.
//!
//! Uses the `libsql` crate: local files for single-machine boards, Turso
//! embedded replicas when several machines share one board.

pub mod error;
pub mod helpers;
mod migrations;
pub mod repos;
pub mod service;
pub mod updates;

mod test_support;

use error::DatabaseError;
use libsql::Builder;

/// Central database handle.
///
/// Wraps a libSQL database and connection. Provides ID generation and
/// replica sync; repository methods live on [`service::CrewService`].
pub struct CrewDb {
    db: libsql::Database,
    conn: libsql::Connection,
    synced: bool,
}

impl CrewDb {
    /// Open a local-only database at the given path (no cloud sync).
    ///
    /// Runs migrations automatically on first open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        Self::init(db, false).await
    }

    /// Open a Turso embedded replica stored at `local_replica_path`.
    ///
    /// Writes go to the remote primary; `read_your_writes` makes them visible
    /// locally before the next sync. Pulls remote state once before migrating.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the replica cannot be built, the initial
    /// sync fails, or migrations fail.
    pub async fn open_synced(
        local_replica_path: &str,
        remote_url: &str,
        auth_token: &str,
    ) -> Result<Self, DatabaseError> {
        let db = Builder::new_remote_replica(
            local_replica_path,
            remote_url.to_string(),
            auth_token.to_string(),
        )
        .read_your_writes(true)
        .build()
        .await?;
        db.sync().await?;
        Self::init(db, true).await
    }

    async fn init(db: libsql::Database, synced: bool) -> Result<Self, DatabaseError> {
        let conn = db.connect()?;

        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        let crew_db = Self { db, conn, synced };
        crew_db.run_migrations().await?;
        Ok(crew_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    #[must_use]
    pub const fn is_synced_replica(&self) -> bool {
        self.synced
    }

    /// Pull remote changes into the local replica. No-op for local databases.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the sync round-trip fails.
    pub async fn sync(&self) -> Result<(), DatabaseError> {
        if self.synced {
            self.db.sync().await?;
        }
        Ok(())
    }

    /// Generate a prefixed ID via libSQL. Returns e.g., `"tsk-a3f8b2c1"`.
    ///
    /// Uses `randomblob(4)` in SQL to produce 8-char hex, then prepends the prefix.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or returns no rows.
    pub async fn generate_id(&self, prefix: &str) -> Result<String, DatabaseError> {
        generate_id_with(&self.conn, prefix).await
    }
}

/// [`CrewDb::generate_id`] on an arbitrary connection, so IDs can be minted
/// inside an open transaction.
pub(crate) async fn generate_id_with(
    conn: &libsql::Connection,
    prefix: &str,
) -> Result<String, DatabaseError> {
    let mut rows = conn
        .query(
            &format!("SELECT '{prefix}-' || lower(hex(randomblob(4)))"),
            (),
        )
        .await?;
    let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
    Ok(row.get::<String>(0)?)
}
