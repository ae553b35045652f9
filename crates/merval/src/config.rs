//! Linter configuration.
//!
//! Configuration is TOML. Every rule runs by default; a file can switch
//! rules off by name and remap the severity of findings by error code:
//!
//! ```toml
//! [rules]
//! disabled = ["sequence-undeclared-participant"]
//!
//! [rules.severity]
//! E300 = "warning"
//! ```

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use log::{debug, info};
use serde::{Deserialize, Deserializer, de::Error as _};
use thiserror::Error;

use merval_parser::{
    error::{ErrorCode, Severity},
    validate::rule_names,
};

use crate::MervalError;

/// File name looked up in the working directory when no path is given.
pub const LOCAL_CONFIG: &str = "merval.toml";

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration: {0}")]
    Parse(String),

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Linter configuration loaded from a TOML file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LintConfig {
    /// Rule selection section
    #[serde(default)]
    pub rules: RulesConfig,
}

/// Rule selection section
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RulesConfig {
    /// Names of validation rules that should not run
    #[serde(default)]
    pub disabled: Vec<String>,

    /// Severity overrides keyed by error code
    #[serde(default, deserialize_with = "severity_overrides")]
    pub severity: BTreeMap<ErrorCode, Severity>,
}

fn severity_overrides<'de, D>(deserializer: D) -> Result<BTreeMap<ErrorCode, Severity>, D::Error>
where
    D: Deserializer<'de>,
{
    BTreeMap::<String, String>::deserialize(deserializer)?
        .into_iter()
        .map(|(code, severity)| {
            let code = code
                .parse::<ErrorCode>()
                .map_err(|_| D::Error::custom(format!("unknown error code `{code}`")))?;
            let severity = severity.parse::<Severity>().map_err(|_| {
                D::Error::custom(format!("invalid severity `{severity}` for {code}"))
            })?;
            Ok((code, severity))
        })
        .collect()
}

impl LintConfig {
    /// Parse and validate configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML, unknown keys,
    /// unknown error codes or unknown severities, and
    /// [`ConfigError::Validation`] when a disabled rule does not exist.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: LintConfig =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every disabled rule names a built-in rule.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let known: Vec<&str> = rule_names().collect();
        match self
            .rules
            .disabled
            .iter()
            .find(|name| !known.contains(&name.as_str()))
        {
            Some(name) => Err(ConfigError::Validation(format!(
                "unknown rule `{name}` in `rules.disabled`"
            ))),
            None => Ok(()),
        }
    }

    pub fn is_disabled(&self, rule: &str) -> bool {
        self.rules.disabled.iter().any(|name| name == rule)
    }

    /// The configured severity for findings with `code`, if overridden.
    pub fn severity_for(&self, code: ErrorCode) -> Option<Severity> {
        self.rules.severity.get(&code).copied()
    }
}

/// Find and load configuration
///
/// Search order:
/// 1. Explicit path if provided
/// 2. `merval.toml` in the working directory
/// 3. Default config if none found
///
/// # Errors
///
/// Returns error if:
/// - Explicit path is provided but file doesn't exist
/// - Config file exists but cannot be read, parsed or validated
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<LintConfig, MervalError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    let local_config = Path::new(LOCAL_CONFIG);
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    debug!("No configuration file found, using default configuration");
    Ok(LintConfig::default())
}

fn load_config_file(path: &Path) -> Result<LintConfig, MervalError> {
    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }

    let content = fs::read_to_string(path)?;
    Ok(LintConfig::from_toml_str(&content)?)
}
