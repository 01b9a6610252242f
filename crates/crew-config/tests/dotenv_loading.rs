//! `.env` in the project root flows through figment's env layer.
//!
//! Kept in its own test binary: dotenvy writes to the process environment.

use crew_config::{CrewConfig, PROJECT_DIR};
use pretty_assertions::assert_eq;

#[test]
fn project_dotenv_overrides_project_toml() {
    let root = tempfile::tempdir().expect("tempdir should create");
    std::fs::create_dir(root.path().join(PROJECT_DIR)).expect(".crew should create");
    std::fs::write(
        root.path().join(PROJECT_DIR).join("config.toml"),
        "[general]\nactor = \"coach@fitlab.io\"\n\n[coordination]\nstale_after_secs = 3600\n",
    )
    .expect("config should write");
    std::fs::write(
        root.path().join(".env"),
        "CREW_GENERAL__ACTOR=agent-dotenv\nCREW_GENERAL__ACTOR_KIND=ai_agent\n",
    )
    .expect(".env should write");

    let config = CrewConfig::load_with_dotenv(Some(root.path())).expect("config loads");

    assert_eq!(config.general.actor, "agent-dotenv");
    assert_eq!(config.general.actor_kind.as_str(), "ai_agent");
    assert_eq!(config.coordination.stale_after_secs, 3600);
    assert_eq!(
        config.store.db_path(root.path()),
        root.path().join(PROJECT_DIR).join("crew.db")
    );
}
