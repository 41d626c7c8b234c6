//! # seis-prov-validate entry point
//!
//! Parses command-line arguments and dispatches to the handlers. Without a
//! subcommand the single positional argument is the file to validate.

use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use seisprov_cli::definitions::{run_definitions, DefinitionsArgs};
use seisprov_cli::validate::{run_validate, ValidateArgs};

/// SEIS-PROV validator.
///
/// Checks W3C PROV documents (PROV-XML or PROV-JSON) against the SEIS-PROV
/// rules for seismological provenance.
#[derive(Parser, Debug)]
#[command(
    name = "seis-prov-validate",
    version,
    about,
    long_about = None,
    args_conflicts_with_subcommands = true
)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Log line format.
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(flatten)]
    validate: ValidateArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check a tree of definition files and assemble the rule schema.
    Definitions(DefinitionsArgs),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    match cli.log_format {
        LogFormat::Text => subscriber.init(),
        LogFormat::Json => subscriber.json().init(),
    }

    let result = match &cli.command {
        Some(Commands::Definitions(args)) => run_definitions(args),
        None => run_validate(&cli.validate),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_parse_positional_file() {
        let cli = Cli::try_parse_from(["seis-prov-validate", "trace.xml"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.validate.file, Some(PathBuf::from("trace.xml")));
        assert!(!cli.validate.strict);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_parse_validate_flags() {
        let cli = Cli::try_parse_from([
            "seis-prov-validate",
            "-vv",
            "--strict",
            "--schema",
            "rules.json",
            "--config",
            "seisprov.yaml",
            "--json",
            "trace.json",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(cli.validate.strict);
        assert!(cli.validate.json);
        assert_eq!(cli.validate.schema, Some(PathBuf::from("rules.json")));
        assert_eq!(cli.validate.config, Some(PathBuf::from("seisprov.yaml")));
    }

    #[test]
    fn test_parse_definitions() {
        let cli = Cli::try_parse_from([
            "seis-prov-validate",
            "definitions",
            "defs",
            "--output",
            "schema.json",
        ])
        .unwrap();
        let Some(Commands::Definitions(args)) = cli.command else {
            panic!("expected the definitions command");
        };
        assert_eq!(args.dir, PathBuf::from("defs"));
        assert_eq!(args.output, Some(PathBuf::from("schema.json")));
    }

    #[test]
    fn test_log_format_json() {
        let cli =
            Cli::try_parse_from(["seis-prov-validate", "--log-format", "json", "a.xml"]).unwrap();
        assert_eq!(cli.log_format, LogFormat::Json);
    }

    #[test]
    fn test_verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
