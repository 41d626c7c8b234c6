//! # seisprov-cli — SEIS-PROV Command-Line Interface
//!
//! Provides the `seis-prov-validate` binary:
//!
//! ```bash
//! seis-prov-validate processing_chain.xml
//! seis-prov-validate --strict --schema rules/seis_prov.json trace.json
//! seis-prov-validate definitions definitions/ --output schemas/seis_prov.json
//! ```
//!
//! ## Crate Policy
//!
//! - Argument parsing lives in `main.rs`; handlers live in their modules.
//! - Handlers return the process exit code; operational failures are
//!   `anyhow` errors logged by `main`.
//! - Validation logic stays in `seisprov-validate` and `seisprov-schema`.

pub mod definitions;
pub mod validate;
