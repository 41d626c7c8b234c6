//! # Validate Command
//!
//! Validates one PROV-XML or PROV-JSON file and prints the result. Settings
//! are layered: defaults, then `--config`, then `SEISPROV_SCHEMA` and
//! `SEISPROV_STRICT`, then `--schema` and `--strict`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use seisprov_validate::{NamespacePolicy, ValidationResult, Validator, ValidatorConfig};

/// Arguments for validating a file.
#[derive(Args, Debug, Default)]
pub struct ValidateArgs {
    /// The PROV-XML or PROV-JSON file to validate.
    pub file: Option<PathBuf>,

    /// Rule schema to validate against instead of the embedded one.
    #[arg(long)]
    pub schema: Option<PathBuf>,

    /// Treat a missing SEIS-PROV namespace as an error.
    #[arg(long)]
    pub strict: bool,

    /// YAML configuration file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print the result as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Resolve the validator configuration for `args`.
pub fn build_config(
    args: &ValidateArgs,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ValidatorConfig> {
    let config = match &args.config {
        Some(path) => ValidatorConfig::from_file(path)
            .with_context(|| format!("loading configuration {}", path.display()))?,
        None => ValidatorConfig::default(),
    };
    let mut config = config
        .with_overrides_from(env)
        .context("applying environment overrides")?;
    if let Some(schema) = &args.schema {
        config = config.with_schema_path(schema);
    }
    if args.strict {
        config = config.with_policy(NamespacePolicy::Strict);
    }
    Ok(config)
}

/// Execute the validate command. Returns 0 for a valid file, 1 otherwise.
pub fn run_validate(args: &ValidateArgs) -> Result<u8> {
    let file = args
        .file
        .as_deref()
        .context("no file given; run with --help for usage")?;
    let config = build_config(args, |name| std::env::var(name).ok())?;
    tracing::debug!(?config, file = %file.display(), "validating");

    let validator = Validator::new(config).context("loading the rule schema")?;
    let result = validator.validate(file);

    if args.json {
        println!("{}", render_json(&result));
    } else {
        println!("{result}");
    }
    Ok(exit_code(&result))
}

/// The exit code for a result.
pub fn exit_code(result: &ValidationResult) -> u8 {
    if result.is_valid() {
        0
    } else {
        1
    }
}

/// Machine-readable rendering of a result.
pub fn render_json(result: &ValidationResult) -> String {
    let value = serde_json::json!({
        "valid": result.is_valid(),
        "errors": result.errors,
        "warnings": result.warnings,
        "categories": result
            .categories()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>(),
    });
    serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_flags_override_environment() {
        let args = ValidateArgs {
            schema: Some(PathBuf::from("/rules/flag.json")),
            strict: true,
            ..ValidateArgs::default()
        };
        let config = build_config(&args, |name| match name {
            "SEISPROV_SCHEMA" => Some("/rules/env.json".to_string()),
            "SEISPROV_STRICT" => Some("false".to_string()),
            _ => None,
        })
        .unwrap();
        assert!(config.is_strict());
        assert_eq!(config.schema_path, Some(PathBuf::from("/rules/flag.json")));
    }

    #[test]
    fn test_environment_applies_without_flags() {
        let config = build_config(&ValidateArgs::default(), |name| {
            (name == "SEISPROV_STRICT").then(|| "1".to_string())
        })
        .unwrap();
        assert!(config.is_strict());
        assert!(config.schema_path.is_none());
    }

    #[test]
    fn test_config_file_then_flags() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seisprov.yaml");
        std::fs::write(&path, "schema_path: custom.json\n").unwrap();
        let args = ValidateArgs {
            config: Some(path),
            ..ValidateArgs::default()
        };
        let config = build_config(&args, no_env).unwrap();
        assert_eq!(config.schema_path, Some(dir.path().join("custom.json")));
        assert!(!config.is_strict());
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let args = ValidateArgs {
            config: Some(PathBuf::from("/definitely/not/here.yaml")),
            ..ValidateArgs::default()
        };
        let err = build_config(&args, no_env).unwrap_err();
        assert!(format!("{err:#}").contains("loading configuration"));
    }

    #[test]
    fn test_run_reports_exit_codes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "just text\n").unwrap();
        let args = ValidateArgs {
            file: Some(path),
            ..ValidateArgs::default()
        };
        assert_eq!(run_validate(&args).unwrap(), 1);
        assert!(run_validate(&ValidateArgs::default()).is_err());
    }

    #[test]
    fn test_render_json() {
        let result = ValidationResult::default();
        let value: serde_json::Value = serde_json::from_str(&render_json(&result)).unwrap();
        assert_eq!(value["valid"], true);
        assert_eq!(value["errors"], serde_json::json!([]));
        assert_eq!(exit_code(&result), 0);
    }
}
