//! Profile management commands.

use clap::{Args, Subcommand};

use rolecut_cli::Profile;

use super::{get_config, output, print_success};
use crate::Cli;

/// Manage grouping profiles.
///
/// Profiles store named threshold settings, similar to kubectl's context
/// management. Unset fields fall back to the built-in defaults; 0 is kept
/// as given.
///
/// Configuration is stored in ~/.rolecut/rolecut/config.yaml
#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    command: ConfigSubcommand,
}

#[derive(Subcommand)]
enum ConfigSubcommand {
    /// Add or replace a profile
    #[command(name = "set-profile")]
    SetProfile {
        /// Profile name
        name: String,
        /// Base similarity threshold
        #[arg(long)]
        base_threshold: Option<f32>,
        /// Minimum face detection score
        #[arg(long)]
        detection_threshold: Option<f32>,
        /// Threshold multiplier at zero clarity
        #[arg(long)]
        clarity_floor: Option<f32>,
        /// Threshold multiplier added per unit of clarity
        #[arg(long)]
        clarity_range: Option<f32>,
        /// Laplacian variance that counts as fully sharp
        #[arg(long)]
        clarity_scale: Option<f64>,
    },
    /// Delete a profile
    #[command(name = "delete-profile")]
    DeleteProfile {
        /// Profile name
        name: String,
    },
    /// Set the current profile
    #[command(name = "use-profile")]
    UseProfile {
        /// Profile name
        name: String,
    },
    /// Display the current profile
    #[command(name = "get-profile")]
    GetProfile,
    /// List all profiles
    #[command(name = "list-profiles", alias = "get-profiles")]
    ListProfiles,
    /// View the current configuration
    View,
}

impl ConfigCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        match &self.command {
            ConfigSubcommand::SetProfile {
                name,
                base_threshold,
                detection_threshold,
                clarity_floor,
                clarity_range,
                clarity_scale,
            } => {
                let mut cfg = get_config(cli)?;

                let profile = Profile {
                    name: name.clone(),
                    base_threshold: *base_threshold,
                    detection_threshold: *detection_threshold,
                    clarity_floor: *clarity_floor,
                    clarity_range: *clarity_range,
                    clarity_scale: *clarity_scale,
                };
                profile.grouping_config().validate()?;
                profile.clarity_config().validate()?;

                cfg.set_profile(name, profile)?;
                print_success(&format!("Profile \"{}\" saved", name));
                Ok(())
            }

            ConfigSubcommand::DeleteProfile { name } => {
                let mut cfg = get_config(cli)?;
                cfg.delete_profile(name)?;
                print_success(&format!("Profile \"{}\" deleted", name));
                Ok(())
            }

            ConfigSubcommand::UseProfile { name } => {
                let mut cfg = get_config(cli)?;
                cfg.use_profile(name)?;
                print_success(&format!("Switched to profile \"{}\"", name));
                Ok(())
            }

            ConfigSubcommand::GetProfile => {
                let cfg = get_config(cli)?;
                if cfg.current_profile.is_empty() {
                    println!("No current profile set");
                } else {
                    println!("{}", cfg.current_profile);
                }
                Ok(())
            }

            ConfigSubcommand::ListProfiles => {
                let cfg = get_config(cli)?;

                if cfg.profiles.is_empty() {
                    println!("No profiles configured");
                    return Ok(());
                }

                println!(
                    "{:<8} {:<20} {:<10} {:<10} {}",
                    "CURRENT", "NAME", "BASE", "DETECTION", "CLARITY"
                );

                for (name, p) in &cfg.profiles {
                    let current = if name == &cfg.current_profile { "*" } else { "" };
                    let g = p.grouping_config();
                    let c = p.clarity_config();
                    println!(
                        "{:<8} {:<20} {:<10} {:<10} {}+{}/{}",
                        current,
                        name,
                        g.threshold.base,
                        g.detection_threshold,
                        g.threshold.floor,
                        g.threshold.range,
                        c.scale
                    );
                }
                Ok(())
            }

            ConfigSubcommand::View => {
                let cfg = get_config(cli)?;
                output(cli).write(&cfg)
            }
        }
    }
}
