//! Category table and entry filter configuration.
//!
//! This module loads the category table that drives category mode, along with the
//! filtering rules every operation honours. Supported filtering strategies:
//! - Protected names that no operation ever touches
//! - Hidden entries (names starting with ".")
//! - Glob pattern matching on the entry name
//! - Regex pattern matching on the entry name
//!
//! # Configuration File Format
//!
//! Configuration is stored in TOML (or JSON, chosen by file extension):
//!
//! ```toml
//! [filters]
//! include_hidden = true
//! protected = ["dirsort.toml"]
//!
//! [filters.exclude]
//! patterns = ["*.part"]
//! regex = []
//!
//! [categories]
//! programs = ["exe", "EXE", "msi"]
//!
//! [categories.documents]
//! pdf = ["pdf", "PDF"]
//! text = ["txt"]
//! ```
//!
//! A JSON document without a `categories` key is read as a bare category table.

use crate::file_category::CategoryTable;
use glob::Pattern;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the configuration file looked up in the current directory.
pub const LOCAL_CONFIG_FILE: &str = "dirsort.toml";

/// Name of the legacy JSON category file looked up in the current directory.
pub const LEGACY_CATEGORIES_FILE: &str = "categories.json";

/// Built-in configuration used when no file is found.
const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

/// Errors that can occur during configuration loading and filter compilation.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    #[error("Configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),
    /// Invalid TOML/JSON syntax or structure.
    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),
    /// Invalid glob pattern provided.
    #[error("Invalid glob pattern '{0}'")]
    InvalidGlobPattern(String),
    /// Invalid regex pattern provided with the actual error reason.
    #[error("Invalid regex pattern '{pattern}': {reason}")]
    InvalidRegexPattern {
        /// The regex pattern that failed to compile.
        pattern: String,
        /// The reason why the pattern is invalid.
        reason: String,
    },
    /// IO error while reading configuration.
    #[error("IO error reading configuration: {0}")]
    IoError(String),
}

/// Full configuration: entry filters plus the category table.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub filters: FilterRules,
    pub categories: CategoryTable,
}

/// Root-level filter rules configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FilterRules {
    /// Whether entries starting with "." take part in operations. Defaults to true.
    #[serde(default = "default_include_hidden")]
    pub include_hidden: bool,

    /// Exact names no operation may move or rename.
    #[serde(default)]
    pub protected: Vec<String>,

    /// Rules for excluding entries.
    #[serde(default)]
    pub exclude: ExcludeRules,
}

fn default_include_hidden() -> bool {
    true
}

impl Default for FilterRules {
    fn default() -> Self {
        Self {
            include_hidden: default_include_hidden(),
            protected: Vec::new(),
            exclude: ExcludeRules::default(),
        }
    }
}

/// Rules for excluding entries from every operation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExcludeRules {
    /// Glob patterns matched against the entry name (e.g. "*.part", "~$*").
    #[serde(default)]
    pub patterns: Vec<String>,

    /// Regex patterns matched against the entry name.
    #[serde(default)]
    pub regex: Vec<String>,
}

impl Config {
    /// Load configuration from a file, with fallback to the built-in defaults.
    ///
    /// Attempts to load configuration in the following order:
    /// 1. If `config_path` is provided, load from that file
    /// 2. Look for `dirsort.toml`, then `categories.json` in the current directory
    /// 3. Look for `~/.config/dirsort/config.toml`
    /// 4. Fall back to the built-in configuration
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly provided file is missing, or if any file that
    /// is found cannot be read or parsed.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        for local in [LOCAL_CONFIG_FILE, LEGACY_CATEGORIES_FILE] {
            let local = PathBuf::from(local);
            if local.exists() {
                return Self::load_from_file(&local);
            }
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("dirsort")
                .join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        tracing::debug!("no configuration file found, using built-in categories");
        Self::builtin()
    }

    /// Load configuration from a specific file. `.json` files are parsed as JSON,
    /// anything else as TOML.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ConfigNotFound` if the file does not exist.
    /// Returns `ConfigError::ConfigInvalid` if parsing fails.
    /// Returns `ConfigError::IoError` if the file cannot be read.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        tracing::debug!(path = %path.display(), "loading configuration");

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
    }

    /// Parses a JSON document, accepting either the full shape or a bare category table.
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let value: serde_json::Value =
            serde_json::from_str(content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))?;
        if value.get("categories").is_some() {
            return serde_json::from_str(content)
                .map_err(|e| ConfigError::ConfigInvalid(e.to_string()));
        }

        // Re-parse from text: `Value` maps do not keep document order.
        let categories: CategoryTable =
            serde_json::from_str(content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))?;
        Ok(Config {
            filters: FilterRules::default(),
            categories,
        })
    }

    /// Returns the built-in configuration.
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_toml_str(DEFAULT_CONFIG)
    }

    /// Compiles the filter rules, keeping the category table alongside.
    ///
    /// # Errors
    ///
    /// Returns an error if any regex or glob patterns are invalid.
    pub fn compile(self) -> Result<(CategoryTable, CompiledFilters), ConfigError> {
        let filters = CompiledFilters::new(self.filters)?;
        Ok((self.categories, filters))
    }
}

/// Compiled filter structures for matching entry names.
#[derive(Debug, Clone)]
pub struct CompiledFilters {
    include_hidden: bool,
    protected: HashSet<String>,
    exclude_patterns: Vec<Pattern>,
    exclude_regexes: Vec<Regex>,
}

impl Default for CompiledFilters {
    fn default() -> Self {
        Self {
            include_hidden: true,
            protected: HashSet::new(),
            exclude_patterns: Vec::new(),
            exclude_regexes: Vec::new(),
        }
    }
}

impl CompiledFilters {
    /// Create compiled filters from filter rules.
    ///
    /// # Errors
    ///
    /// Returns an error if any glob or regex patterns are invalid.
    pub fn new(rules: FilterRules) -> Result<Self, ConfigError> {
        let exclude_patterns = rules
            .exclude
            .patterns
            .iter()
            .map(|pattern| {
                Pattern::new(pattern).map_err(|_| ConfigError::InvalidGlobPattern(pattern.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let exclude_regexes = rules
            .exclude
            .regex
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| ConfigError::InvalidRegexPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            include_hidden: rules.include_hidden,
            protected: rules.protected.into_iter().collect(),
            exclude_patterns,
            exclude_regexes,
        })
    }

    /// Names that are always excluded, regardless of the call.
    pub fn protected(&self) -> impl Iterator<Item = &str> {
        self.protected.iter().map(String::as_str)
    }

    /// Check if an entry name passes the filters.
    ///
    /// Checks are performed in this order, with early termination:
    /// 1. Protected name - excluded
    /// 2. Hidden entry with hidden entries disabled - excluded
    /// 3. Glob pattern match - excluded
    /// 4. Regex pattern match - excluded
    /// 5. Default: included
    pub fn should_include(&self, name: &str) -> bool {
        if self.protected.contains(name) {
            return false;
        }

        if !self.include_hidden && name.starts_with('.') {
            return false;
        }

        if self
            .exclude_patterns
            .iter()
            .any(|pattern| pattern.matches(name))
        {
            return false;
        }

        !self.exclude_regexes.iter().any(|regex| regex.is_match(name))
    }
}
