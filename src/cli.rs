use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "reeltrack")]
#[command(about = "Tracks media libraries and reports added and removed titles")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    // running without a subcommand is the same as `scan`
    #[command(flatten)]
    pub scan: ScanArgs,
}

impl Cli {
    pub fn into_command(self) -> Command {
        self.command.unwrap_or(Command::Scan(self.scan))
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Scan the libraries, record new titles, and write the reports
    Scan(ScanArgs),

    /// Print every recorded title
    List(ListArgs),

    /// Delete every record with the given display name
    Forget(ForgetArgs),
}

impl Command {
    pub fn inventory(&self) -> &InventoryArgs {
        match self {
            Command::Scan(args) => &args.inventory,
            Command::List(args) => &args.inventory,
            Command::Forget(args) => &args.inventory,
        }
    }
}

// where the config and inventory live, shared by every subcommand
#[derive(Parser, Clone, Default)]
pub struct InventoryArgs {
    /// Config file (defaults to config.toml next to the program)
    #[arg(long, env = "REELTRACK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Inventory database (defaults to movies.db next to the program)
    #[arg(long, env = "REELTRACK_DB")]
    pub db: Option<PathBuf>,

    /// Show detailed output including diagnostics
    #[arg(long, short = 'v', default_value_t = false)]
    pub verbose: bool,
}

#[derive(Parser, Clone, Default)]
pub struct ScanArgs {
    /// Extra library roots, appended to the configured ones
    pub roots: Vec<PathBuf>,

    #[command(flatten)]
    pub inventory: InventoryArgs,

    /// Directory the reports are written to (defaults to the working directory)
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Skip poster lookups entirely
    #[arg(long, default_value_t = false)]
    pub no_lookup: bool,

    /// Per-lookup timeout, e.g. "10s" or "1500ms"
    #[arg(long, value_parser = humantime::parse_duration)]
    pub lookup_timeout: Option<Duration>,

    /// OMDb API key used for poster lookups
    #[arg(long, env = "REELTRACK_OMDB_KEY", hide_env_values = true)]
    pub omdb_key: Option<String>,
}

#[derive(Parser)]
pub struct ListArgs {
    #[command(flatten)]
    pub inventory: InventoryArgs,
}

#[derive(Parser)]
pub struct ForgetArgs {
    /// Display name to delete
    pub name: String,

    #[command(flatten)]
    pub inventory: InventoryArgs,
}
