use std::path::PathBuf;

use anyhow::Context;
use crew_config::CrewConfig;
use crew_core::actor::Actor;
use crew_core::enums::ActorKind;
use crew_db::service::CrewService;

use crate::cli::GlobalFlags;
use crate::commands::shared::parse::parse_enum;

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub service: CrewService,
    pub config: CrewConfig,
    pub project_root: PathBuf,
    /// `None` when neither `--actor` nor `general.actor` is set; read-only
    /// commands do not need one.
    pub actor: Option<Actor>,
}

impl AppContext {
    /// Open the task store and resolve the acting identity.
    pub async fn init(
        project_root: PathBuf,
        config: CrewConfig,
        flags: &GlobalFlags,
    ) -> anyhow::Result<Self> {
        let actor = resolve_actor(flags, &config)?;
        let policy = config.coordination.stale_policy()?;
        let admin = config.admin.clone();

        let db_path = config.store.db_path(&project_root);
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let db_path_str = db_path.to_string_lossy();

        let service = if config.store.is_remote() {
            CrewService::new_synced(
                &db_path_str,
                &config.store.url,
                &config.store.auth_token,
                policy,
                admin,
            )
            .await
            .context("failed to open synced crew store")?
        } else {
            CrewService::new_local(&db_path_str, policy, admin)
                .await
                .context("failed to open crew store")?
        };

        tracing::debug!(
            db = %db_path.display(),
            remote = config.store.is_remote(),
            actor = ?actor.as_ref().map(|a| a.id.as_str()),
            "crew context ready"
        );

        Ok(Self {
            service,
            config,
            project_root,
            actor,
        })
    }

    /// The acting identity, for commands that mutate the board.
    pub fn require_actor(&self) -> anyhow::Result<&Actor> {
        self.actor.as_ref().ok_or_else(|| {
            anyhow::anyhow!(
                "no actor configured. Pass --actor or set general.actor (CREW_GENERAL__ACTOR)."
            )
        })
    }
}

/// `--actor`/`--kind` win over `general.actor`/`general.actor_kind`.
fn resolve_actor(flags: &GlobalFlags, config: &CrewConfig) -> anyhow::Result<Option<Actor>> {
    let kind = match flags.kind.as_deref() {
        Some(raw) => parse_enum::<ActorKind>(raw, "kind")?,
        None => config.general.actor_kind,
    };
    let id = flags
        .actor
        .clone()
        .filter(|id| !id.trim().is_empty())
        .or_else(|| config.general.has_actor().then(|| config.general.actor.clone()));

    id.map(|id| Actor::new(id, kind).context("invalid actor"))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use pretty_assertions::assert_eq;

    fn flags(actor: Option<&str>, kind: Option<&str>) -> GlobalFlags {
        GlobalFlags {
            format: OutputFormat::Json,
            limit: None,
            quiet: false,
            verbose: false,
            project: None,
            actor: actor.map(String::from),
            kind: kind.map(String::from),
        }
    }

    #[test]
    fn flag_overrides_config_actor() {
        let mut config = CrewConfig::default();
        config.general.actor = "coach@fitlab.io".into();

        let actor = resolve_actor(&flags(Some("agent-3"), Some("ai-agent")), &config)
            .unwrap()
            .unwrap();
        assert_eq!(actor.id, "agent-3");
        assert_eq!(actor.kind, ActorKind::AiAgent);

        let actor = resolve_actor(&flags(None, None), &config).unwrap().unwrap();
        assert_eq!(actor.id, "coach@fitlab.io");
        assert_eq!(actor.kind, ActorKind::Human);
    }

    #[test]
    fn missing_actor_is_none() {
        let actor = resolve_actor(&flags(None, None), &CrewConfig::default()).unwrap();
        assert!(actor.is_none());
    }

    #[test]
    fn invalid_kind_is_rejected() {
        assert!(resolve_actor(&flags(Some("a"), Some("robot")), &CrewConfig::default()).is_err());
    }
}
