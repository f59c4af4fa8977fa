//! rolecut - group cut frames into per-character folders by face identity.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{ConfigCommand, DefaultsCommand, DeleteCommand, GroupCommand, ListCommand};

/// rolecut - group cut frames into per-character folders.
///
/// Faces are matched against identities learned from the same folder in two
/// passes; each identity becomes a role_<label> folder, and images without a
/// matching face go to role_other.
///
/// Configuration is stored in ~/.rolecut/rolecut/ and supports multiple
/// grouping profiles, similar to kubectl's context management.
#[derive(Parser)]
#[command(name = "rolecut")]
#[command(about = "Group images into role folders by face identity")]
#[command(version)]
pub struct Cli {
    /// Config file (default is ~/.rolecut/rolecut/config.yaml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Profile name to use
    #[arg(short = 'p', long, global = true)]
    pub profile: Option<String>,

    /// Output file (default: stdout)
    #[arg(short = 'o', long, global = true)]
    pub output: Option<String>,

    /// Output as JSON (for piping)
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Group a folder of images into role folders
    Group(GroupCommand),
    /// Delete a role folder
    Delete(DeleteCommand),
    /// List the images a grouping would visit
    List(ListCommand),
    /// Manage grouping profiles
    Config(ConfigCommand),
    /// Show or clear remembered defaults
    Defaults(DefaultsCommand),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::Group(cmd) => cmd.run(&cli),
        Commands::Delete(cmd) => cmd.run(&cli),
        Commands::List(cmd) => cmd.run(&cli),
        Commands::Config(cmd) => cmd.run(&cli),
        Commands::Defaults(cmd) => cmd.run(&cli),
    }
}
