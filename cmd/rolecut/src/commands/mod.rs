//! CLI commands module.

mod config;
mod defaults;
mod delete;
mod group;
mod list;
mod util;

pub use config::ConfigCommand;
pub use defaults::DefaultsCommand;
pub use delete::DeleteCommand;
pub use group::GroupCommand;
pub use list::ListCommand;

// Re-export utils for use in commands
pub(crate) use util::*;
