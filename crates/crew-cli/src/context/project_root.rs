use std::path::{Path, PathBuf};

use crew_config::PROJECT_DIR;

/// Walk upwards from `start` until a `.crew` directory is found.
#[must_use]
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(PROJECT_DIR).is_dir() {
            return Some(current);
        }
        if !current.pop() {
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::find_project_root;

    #[test]
    fn finds_project_root_in_current_directory() {
        let temp = TempDir::new().expect("tempdir should create");
        std::fs::create_dir(temp.path().join(".crew")).expect(".crew should create");

        let found = find_project_root(temp.path());
        assert_eq!(found.as_deref(), Some(temp.path()));
    }

    #[test]
    fn finds_project_root_in_parent_directory() {
        let temp = TempDir::new().expect("tempdir should create");
        std::fs::create_dir(temp.path().join(".crew")).expect(".crew should create");
        std::fs::create_dir_all(temp.path().join("app/src/workouts"))
            .expect("nested dirs should create");

        let found = find_project_root(&temp.path().join("app/src/workouts"));
        assert_eq!(found.as_deref(), Some(temp.path()));
    }

    #[test]
    fn crew_file_is_not_a_project_marker() {
        let temp = TempDir::new().expect("tempdir should create");
        std::fs::write(temp.path().join(".crew"), "").expect("file should write");
        std::fs::create_dir_all(temp.path().join("a")).expect("nested dir should create");

        // Only a directory counts; the walk continues past this root.
        let found = find_project_root(&temp.path().join("a"));
        assert_ne!(found.as_deref(), Some(temp.path()));
    }
}
