//! # Definitions Command
//!
//! Checks a tree of per-record definition files and assembles them into a
//! rule schema.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use seisprov_schema::{assemble, Assembly, DEFAULT_NAMESPACE};

/// Arguments for the definitions command.
#[derive(Args, Debug)]
pub struct DefinitionsArgs {
    /// Directory holding the definition files.
    pub dir: PathBuf,

    /// Write the assembled rule schema to this file.
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Namespace URI recorded in the assembled schema.
    #[arg(long, default_value = DEFAULT_NAMESPACE)]
    pub namespace: String,
}

/// Execute the definitions command. Returns 0 if every file passed.
pub fn run_definitions(args: &DefinitionsArgs) -> Result<u8> {
    let assembly = assemble(&args.dir, &args.namespace)
        .with_context(|| format!("reading definitions from {}", args.dir.display()))?;
    print!("{}", summary(&assembly));

    if !assembly.is_ok() {
        return Ok(1);
    }
    if let Some(output) = &args.output {
        write_schema(&assembly, output)?;
        println!("Wrote {}", output.display());
    }
    Ok(0)
}

/// Human-readable report of an assembly.
pub fn summary(assembly: &Assembly) -> String {
    let mut text = format!("Checked {} definition files.\n", assembly.files().len());
    if assembly.is_ok() {
        text.push_str("All definitions are valid.\n");
        return text;
    }
    text.push_str(&format!("Found {} problem(s):\n", assembly.issues().len()));
    for issue in assembly.issues() {
        text.push_str(&format!("  {issue}\n"));
    }
    text
}

fn write_schema(assembly: &Assembly, output: &Path) -> Result<()> {
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    std::fs::write(output, assembly.to_json_string())
        .with_context(|| format!("writing {}", output.display()))
}
