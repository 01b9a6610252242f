//! Task store (libSQL / Turso) configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Database file. Relative paths resolve against the project root;
    /// empty means `.crew/crew.db`.
    #[serde(default)]
    pub path: String,

    /// Remote primary URL (e.g. `libsql://crew-tasks-myorg.turso.io`).
    /// When set together with `auth_token`, `path` becomes an embedded replica.
    #[serde(default)]
    pub url: String,

    /// Database auth token for the remote primary.
    #[serde(default)]
    pub auth_token: String,
}

impl StoreConfig {
    /// Whether a remote primary is configured.
    #[must_use]
    pub fn is_remote(&self) -> bool {
        !self.url.is_empty() && !self.auth_token.is_empty()
    }

    /// Resolve the local database path for a project.
    #[must_use]
    pub fn db_path(&self, project_root: &Path) -> PathBuf {
        if self.path.is_empty() {
            return project_root.join(crate::PROJECT_DIR).join("crew.db");
        }
        let path = PathBuf::from(&self.path);
        if path.is_absolute() {
            path
        } else {
            project_root.join(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_local() {
        let config = StoreConfig::default();
        assert!(!config.is_remote());
        assert_eq!(
            config.db_path(Path::new("/work/app")),
            PathBuf::from("/work/app/.crew/crew.db")
        );
    }

    #[test]
    fn remote_needs_url_and_token() {
        let mut config = StoreConfig {
            url: "libsql://crew-tasks.turso.io".into(),
            ..Default::default()
        };
        assert!(!config.is_remote());
        config.auth_token = "token".into();
        assert!(config.is_remote());
    }

    #[test]
    fn relative_path_resolves_against_root() {
        let config = StoreConfig {
            path: "data/tasks.db".into(),
            ..Default::default()
        };
        assert_eq!(
            config.db_path(Path::new("/work/app")),
            PathBuf::from("/work/app/data/tasks.db")
        );

        let config = StoreConfig {
            path: "/var/lib/crew.db".into(),
            ..Default::default()
        };
        assert_eq!(
            config.db_path(Path::new("/work/app")),
            PathBuf::from("/var/lib/crew.db")
        );
    }
}
