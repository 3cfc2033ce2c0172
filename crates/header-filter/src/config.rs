use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// How header-name rules are interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Literal, case-sensitive name equality.
    #[default]
    Exact,
    /// `*` wildcard patterns over header names.
    Pattern,
}

impl MatchMode {
    /// Mode selected by a `pattern_match` flag.
    #[must_use]
    pub const fn from_pattern_flag(pattern_match: bool) -> Self {
        if pattern_match {
            Self::Pattern
        } else {
            Self::Exact
        }
    }
}

/// Declarative filter configuration, usually loaded from YAML.
///
/// ```yaml
/// header_names: [x, "time*"]
/// pattern_match: true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Header names (or wildcard patterns) to remove, in declaration order.
    pub header_names: Vec<String>,
    /// Interpret `header_names` as wildcard patterns. Defaults to exact matching.
    #[serde(default)]
    pub pattern_match: bool,
}

impl FilterConfig {
    /// Matching mode selected by this config.
    #[must_use]
    pub const fn mode(&self) -> MatchMode {
        MatchMode::from_pattern_flag(self.pattern_match)
    }
}

/// Errors raised while building a [`HeaderFilter`](crate::HeaderFilter).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No rules were supplied.
    #[error("at least one header name to remove is required")]
    NoRules,
    /// A rule is empty or whitespace only.
    #[error("header_names[{index}] must be a non-empty string")]
    EmptyRule {
        /// Position of the offending rule.
        index: usize,
    },
    /// A wildcard pattern could not be compiled.
    #[error("header pattern '{pattern}' is invalid: {source}")]
    InvalidPattern {
        /// The rule as written.
        pattern: String,
        /// Underlying regex failure.
        #[source]
        source: regex::Error,
    },
    /// The config file could not be read.
    #[error("failed to open filter config {path:?}: {source}")]
    Io {
        /// Path that failed to open.
        path: PathBuf,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },
    /// The config document is not valid YAML for [`FilterConfig`].
    #[error("malformed filter config: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
