use std::path::{Path, PathBuf};

use anyhow::Context;
use crew_config::{CrewConfig, PROJECT_DIR};
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::InitArgs;
use crate::context::AppContext;
use crate::output::output;

const GITIGNORE: &str = "crew.db*\n.env\n";

#[derive(Debug, Serialize)]
struct InitResponse {
    project_root: PathBuf,
    config_path: PathBuf,
    config_written: bool,
    db_path: PathBuf,
}

/// Handle `crew init`: create `.crew/`, write a default config, and migrate the store.
pub async fn handle(args: &InitArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let project_root = match flags.project.as_deref() {
        Some(path) => PathBuf::from(path),
        None => std::env::current_dir().context("failed to read current directory")?,
    };

    let config_written = write_project_files(&project_root, args.force)?;
    let config = CrewConfig::load_with_dotenv(Some(&project_root))
        .context("failed to load crew configuration")?;
    let db_path = config.store.db_path(&project_root);

    // Opening the store applies the schema.
    let ctx = AppContext::init(project_root.clone(), config, flags).await?;
    tracing::info!(root = %ctx.project_root.display(), "crew project initialized");

    let response = InitResponse {
        config_path: project_root.join(PROJECT_DIR).join("config.toml"),
        project_root,
        config_written,
        db_path,
    };
    output(&response, flags.format)
}

/// Returns whether `config.toml` was (re)written.
fn write_project_files(project_root: &Path, force: bool) -> anyhow::Result<bool> {
    let crew_dir = project_root.join(PROJECT_DIR);
    std::fs::create_dir_all(&crew_dir)
        .with_context(|| format!("failed to create {}", crew_dir.display()))?;

    let gitignore = crew_dir.join(".gitignore");
    if !gitignore.exists() {
        std::fs::write(&gitignore, GITIGNORE)
            .with_context(|| format!("failed to write {}", gitignore.display()))?;
    }

    let config_path = crew_dir.join("config.toml");
    if config_path.exists() && !force {
        return Ok(false);
    }
    let rendered = toml::to_string_pretty(&CrewConfig::default())
        .context("failed to render default configuration")?;
    std::fs::write(&config_path, rendered)
        .with_context(|| format!("failed to write {}", config_path.display()))?;
    Ok(true)
}
