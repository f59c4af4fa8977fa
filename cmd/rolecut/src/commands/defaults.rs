//! Remembered defaults of the group command.

use std::collections::BTreeMap;

use clap::{Args, Subcommand};

use super::{open_defaults, output, print_info, print_success};
use crate::Cli;

/// Show or clear the values remembered from the last group run.
///
/// Stored in ~/.rolecut/rolecut/cache/defaults.redb
#[derive(Args)]
pub struct DefaultsCommand {
    #[command(subcommand)]
    command: DefaultsSubcommand,
}

#[derive(Subcommand)]
enum DefaultsSubcommand {
    /// Print every remembered value
    Show,
    /// Forget every remembered value
    Clear,
}

impl DefaultsCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let defaults = open_defaults()?;
        match &self.command {
            DefaultsSubcommand::Show => {
                let entries: BTreeMap<String, serde_json::Value> =
                    defaults.entries()?.into_iter().collect();
                if entries.is_empty() {
                    print_info("Nothing remembered yet");
                    return Ok(());
                }
                output(cli).write(&entries)
            }
            DefaultsSubcommand::Clear => {
                let n = defaults.clear()?;
                print_success(&format!("Forgot {} remembered values", n));
                Ok(())
            }
        }
    }
}
