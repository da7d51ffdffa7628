use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "medfund",
    about = "Medical crowdfunding ledger: applications, donations, loans and recharges",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Ledger file
    #[arg(long, global = true, default_value = "medfund-ledger.json")]
    pub store: PathBuf,

    /// Engine configuration (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Call a ledger function with ordered string arguments
    Invoke(InvokeArgs),
    /// Show an application
    Info(InfoArgs),
    /// Reconcile an application against its sub-ledgers
    Audit(AuditArgs),
    /// List the functions of the invocation surface
    Functions,
    /// Print the effective engine configuration
    Config,
}

#[derive(Args)]
pub struct InvokeArgs {
    pub function: String,
    #[arg(allow_hyphen_values = true)]
    pub args: Vec<String>,
}

#[derive(Args)]
pub struct InfoArgs {
    pub application: String,
}

#[derive(Args)]
pub struct AuditArgs {
    pub application: String,
}
