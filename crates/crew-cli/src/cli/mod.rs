use clap::Parser;

pub mod global;
pub mod root_commands;
pub mod subcommands;

pub use global::{GlobalFlags, OutputFormat};
pub use root_commands::Commands;

/// Top-level CLI parser for the `crew` binary.
#[derive(Debug, Parser)]
#[command(
    name = "crew",
    version,
    about = "Crew - shared task board for human and AI contributors"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, table, raw
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Max results to return
    #[arg(short, long, global = true)]
    pub limit: Option<u32>,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Project root path (defaults to auto-detect via .crew)
    #[arg(short, long, global = true)]
    pub project: Option<String>,

    /// Acting identity: an agent name or an email address
    #[arg(short, long, global = true)]
    pub actor: Option<String>,

    /// Kind of contributor acting: ai-agent or human
    #[arg(short, long, global = true)]
    pub kind: Option<String>,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            limit: self.limit,
            quiet: self.quiet,
            verbose: self.verbose,
            project: self.project.clone(),
            actor: self.actor.clone(),
            kind: self.kind.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::{Cli, Commands, GlobalFlags, OutputFormat};
    use crate::cli::subcommands::TaskCommands;

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_before_subcommand() {
        let cli = Cli::try_parse_from([
            "crew", "--format", "table", "--limit", "10", "--verbose", "sweep",
        ])
        .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Table);
        assert_eq!(cli.limit, Some(10));
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Sweep(_)));
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["crew", "sweep", "--format", "raw", "--quiet"])
            .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Raw);
        assert!(cli.quiet);
        assert!(matches!(cli.command, Commands::Sweep(_)));
    }

    #[test]
    fn output_format_rejects_invalid_value() {
        let parsed = Cli::try_parse_from(["crew", "--format", "xml", "sweep"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn global_flags_extraction_copies_values() {
        let cli = Cli::try_parse_from([
            "crew",
            "--project",
            "/tmp/demo",
            "--actor",
            "agent-7",
            "--kind",
            "ai-agent",
            "sweep",
        ])
        .expect("cli should parse");
        let flags: GlobalFlags = cli.global_flags();
        assert_eq!(flags.project.as_deref(), Some("/tmp/demo"));
        assert_eq!(flags.actor.as_deref(), Some("agent-7"));
        assert_eq!(flags.kind.as_deref(), Some("ai-agent"));
    }

    #[test]
    fn claim_accepts_title_id_or_next() {
        let cli = Cli::try_parse_from(["crew", "claim", "Build streak badges"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Claim(ref args) if args.title.as_deref() == Some("Build streak badges")
        ));

        let cli = Cli::try_parse_from(["crew", "claim", "--id", "tsk-00000001"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Claim(ref args) if args.id.as_deref() == Some("tsk-00000001")
        ));

        let cli = Cli::try_parse_from(["crew", "claim"]).unwrap();
        assert!(matches!(cli.command, Commands::Claim(ref args) if args.title.is_none()));

        assert!(Cli::try_parse_from(["crew", "claim", "A title", "--next"]).is_err());
        assert!(Cli::try_parse_from(["crew", "claim", "A title", "--id", "tsk-1"]).is_err());
    }

    #[test]
    fn complete_keeps_title_then_notes_shape() {
        let cli = Cli::try_parse_from(["crew", "complete", "Macro charts", "done, see PR"]).unwrap();
        match cli.command {
            Commands::Complete(args) => {
                assert_eq!(args.title.as_deref(), Some("Macro charts"));
                assert_eq!(args.notes.as_deref(), Some("done, see PR"));
                assert!(!args.direct);
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let cli = Cli::try_parse_from([
            "crew", "complete", "--id", "tsk-1", "--direct", "-m", "shipped",
        ])
        .unwrap();
        match cli.command {
            Commands::Complete(args) => {
                assert_eq!(args.id.as_deref(), Some("tsk-1"));
                assert_eq!(args.notes_flag.as_deref(), Some("shipped"));
                assert!(args.direct);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn task_create_collects_tags() {
        let cli = Cli::try_parse_from([
            "crew",
            "task",
            "create",
            "--title",
            "Rest timer",
            "--tag",
            "ui",
            "--tag",
            "workout",
        ])
        .unwrap();
        match cli.command {
            Commands::Task {
                action: TaskCommands::Create { title, tags, .. },
            } => {
                assert_eq!(title, "Rest timer");
                assert_eq!(tags, vec!["ui".to_string(), "workout".to_string()]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn watch_interval_override() {
        let cli = Cli::try_parse_from(["crew", "watch", "--interval-secs", "5"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Watch(ref args) if args.interval_secs == Some(5)
        ));
    }
}
