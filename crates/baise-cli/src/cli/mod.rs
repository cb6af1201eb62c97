use clap::Parser;

pub mod global;
pub mod root_commands;

pub use global::{GlobalFlags, OutputFormat};
pub use root_commands::{Commands, SchemaCommands, ValidateArgs};

/// Top-level CLI parser for the `baise` binary.
#[derive(Debug, Parser)]
#[command(name = "baise", version, about = "BAISE labeling-platform schema tools")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, raw
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub const fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            quiet: self.quiet,
            verbose: self.verbose,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clap::{CommandFactory, Parser};
    use pretty_assertions::assert_eq;

    use super::{Cli, Commands, OutputFormat, SchemaCommands};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_before_subcommand() {
        let cli = Cli::try_parse_from(["baise", "--format", "raw", "--verbose", "schema", "list"])
            .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Raw);
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::Schema {
                action: SchemaCommands::List
            }
        ));
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["baise", "schema", "show", "tasks", "--quiet"])
            .expect("cli should parse");

        assert!(cli.quiet);
        assert_eq!(cli.format, OutputFormat::Json);
        match cli.command {
            Commands::Schema {
                action: SchemaCommands::Show { collection },
            } => assert_eq!(collection, "tasks"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn output_format_rejects_invalid_value() {
        let parsed = Cli::try_parse_from(["baise", "--format", "table", "schema", "list"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn validate_takes_collection_and_file() {
        let cli = Cli::try_parse_from([
            "baise",
            "validate",
            "customers",
            "fixtures/customers.json",
            "--check-references",
        ])
        .expect("cli should parse");

        match cli.command {
            Commands::Validate(args) => {
                assert_eq!(args.collection, "customers");
                assert_eq!(args.file, PathBuf::from("fixtures/customers.json"));
                assert!(args.check_references);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn export_dir_is_optional() {
        let cli = Cli::try_parse_from(["baise", "schema", "export"]).expect("cli should parse");
        assert!(matches!(
            cli.command,
            Commands::Schema {
                action: SchemaCommands::Export { dir: None }
            }
        ));
    }
}
