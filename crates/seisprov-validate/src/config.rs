//! Validator configuration.
//!
//! Defaults validate against the embedded rule schema in the SEIS-PROV 0.1
//! namespace and only warn when a document does not declare that
//! namespace. A YAML file, environment variables and explicit setters
//! override the defaults in that order.
//!
//! ```yaml
//! namespace: "http://seisprov.org/seis_prov/0.1/#"
//! namespace_policy: strict
//! schema_path: /etc/seisprov/seis_prov.json
//! ```

use std::path::{Path, PathBuf};

use seisprov_schema::DEFAULT_NAMESPACE;
use serde::{Deserialize, Serialize};

/// Environment variable naming a rule schema file.
pub const ENV_SCHEMA: &str = "SEISPROV_SCHEMA";

/// Environment variable switching on the strict namespace policy.
pub const ENV_STRICT: &str = "SEISPROV_STRICT";

/// What to do with a document that does not declare the target namespace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamespacePolicy {
    /// Warn and report the document as valid.
    #[default]
    Lenient,
    /// Report an error.
    Strict,
}

/// Settings of a [`Validator`](crate::Validator).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidatorConfig {
    /// Target namespace URI.
    pub namespace: String,
    /// Handling of documents without the target namespace.
    pub namespace_policy: NamespacePolicy,
    /// Rule schema file; `None` uses the embedded schema.
    pub schema_path: Option<PathBuf>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            namespace_policy: NamespacePolicy::default(),
            schema_path: None,
        }
    }
}

impl ValidatorConfig {
    /// Parse a YAML configuration. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] for invalid YAML or unknown keys.
    pub fn from_yaml_str(text: &str, source_name: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(text).map_err(|e| ConfigError::Parse {
            path: source_name.to_string(),
            reason: e.to_string(),
        })
    }

    /// Read a YAML configuration file.
    ///
    /// A relative `schema_path` is resolved against the file's directory.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Read`] if the file cannot be read, otherwise as
    /// [`ValidatorConfig::from_yaml_str`].
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let mut config = Self::from_yaml_str(&text, &path.display().to_string())?;
        if let Some(dir) = path.parent() {
            config.schema_path = config
                .schema_path
                .map(|schema| if schema.is_relative() { dir.join(schema) } else { schema });
        }
        Ok(config)
    }

    /// Apply `SEISPROV_SCHEMA` and `SEISPROV_STRICT` from the process
    /// environment.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidEnv`] for an unrecognized `SEISPROV_STRICT`.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// As [`ValidatorConfig::with_env_overrides`].
    pub fn with_overrides_from(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(schema) = lookup(ENV_SCHEMA).filter(|s| !s.trim().is_empty()) {
            self.schema_path = Some(PathBuf::from(schema));
        }
        if let Some(raw) = lookup(ENV_STRICT) {
            let strict = parse_flag(&raw).ok_or_else(|| ConfigError::InvalidEnv {
                var: ENV_STRICT.to_string(),
                value: raw.clone(),
            })?;
            self.namespace_policy = if strict {
                NamespacePolicy::Strict
            } else {
                NamespacePolicy::Lenient
            };
        }
        Ok(self)
    }

    /// Set the target namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Set the namespace policy.
    pub fn with_policy(mut self, policy: NamespacePolicy) -> Self {
        self.namespace_policy = policy;
        self
    }

    /// Set the rule schema file.
    pub fn with_schema_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.schema_path = Some(path.into());
        self
    }

    /// True under [`NamespacePolicy::Strict`].
    pub fn is_strict(&self) -> bool {
        self.namespace_policy == NamespacePolicy::Strict
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("cannot read configuration '{path}': {reason}")]
    Read {
        /// File path.
        path: String,
        /// I/O error text.
        reason: String,
    },
    /// The configuration is not valid YAML or has unknown keys.
    #[error("invalid configuration '{path}': {reason}")]
    Parse {
        /// File path or source name.
        path: String,
        /// Parser message.
        reason: String,
    },
    /// An environment variable has an unusable value.
    #[error("invalid value '{value}' for {var}")]
    InvalidEnv {
        /// Variable name.
        var: String,
        /// The value found.
        value: String,
    },
}
