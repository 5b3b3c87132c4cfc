//! Clap derive structures for the `manifester` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// manifester -- keep Munki manifests in step with your MDM and Okta
#[derive(Debug, Parser)]
#[command(
    name = "manifester",
    version,
    about = "Reconcile Munki manifests from an MDM roster and Okta groups",
    long_about = "Builds one Munki manifest per managed computer from a Kandji or Jamf\n\
        roster, removes manifests for retired computers, and links each\n\
        computer to the department manifests of its user's Okta groups.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "MANIFESTER_CONFIG", global = true)]
    pub config_file: Option<PathBuf>,

    /// Munki manifests directory (overrides config)
    #[arg(long, short = 'm', global = true)]
    pub manifest_dir: Option<PathBuf>,

    /// MDM backend (overrides config)
    #[arg(long, global = true)]
    pub mdm: Option<MdmArg>,

    /// Log intended changes without touching the manifests directory
    #[arg(long, short = 'n', global = true)]
    pub dry_run: bool,

    /// Output format
    #[arg(long, short = 'o', default_value = "table", global = true)]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors and suppress normal output
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MdmArg {
    Kandji,
    Jamf,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run one reconciliation pass
    Run,

    /// List the MDM roster
    #[command(alias = "dev")]
    Devices,

    /// List department groups and their members
    #[command(alias = "dept")]
    Departments,

    /// Manage configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file path
    Path,

    /// Write a starter config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show the effective configuration (secrets redacted)
    Show,

    /// Read a secret from stdin and store it in the system keyring
    SetSecret {
        /// Which secret to store
        secret: SecretKind,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SecretKind {
    /// Kandji API token
    MdmToken,
    /// Jamf API account password
    MdmPassword,
    /// Okta API token
    OktaToken,
}

impl SecretKind {
    /// Keyring entry name.
    pub fn key(self) -> &'static str {
        match self {
            Self::MdmToken => "mdm/token",
            Self::MdmPassword => "mdm/password",
            Self::OktaToken => "okta/token",
        }
    }
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
