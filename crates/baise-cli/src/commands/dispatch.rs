use baise_config::BaiseConfig;

use crate::cli::{Commands, GlobalFlags};
use crate::commands;

/// Dispatch a parsed command to the corresponding handler module.
pub fn dispatch(
    command: Commands,
    config: &BaiseConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match command {
        Commands::Schema { action } => commands::schema::handle(&action, config, flags),
        Commands::Validate(args) => commands::validate::handle(&args, config, flags),
    }
}
