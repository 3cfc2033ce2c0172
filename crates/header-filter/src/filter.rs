use crate::config::{ConfigError, FilterConfig, MatchMode};
use crate::pattern::glob_to_regex;
use message_core::{Message, MessageTransformer, TransformError};
use regex::RegexSet;
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone)]
enum Matcher {
    Exact(HashSet<String>),
    Pattern(RegexSet),
}

/// Removes configured headers from messages.
///
/// Cheap to clone and safe to share across threads; the compiled rules are
/// never mutated after construction.
#[derive(Debug, Clone)]
pub struct HeaderFilter {
    rules: Vec<String>,
    mode: MatchMode,
    matcher: Matcher,
}

impl HeaderFilter {
    /// Build a filter from `rules` interpreted according to `mode`.
    ///
    /// Fails when `rules` is empty, when any rule is blank, or when a pattern
    /// cannot be compiled.
    pub fn new<I, S>(rules: I, mode: MatchMode) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let rules: Vec<String> = rules.into_iter().map(Into::into).collect();
        if rules.is_empty() {
            return Err(ConfigError::NoRules);
        }
        if let Some(index) = rules.iter().position(|r| r.trim().is_empty()) {
            return Err(ConfigError::EmptyRule { index });
        }

        let matcher = match mode {
            MatchMode::Exact => Matcher::Exact(rules.iter().cloned().collect()),
            MatchMode::Pattern => Matcher::Pattern(compile_patterns(&rules)?),
        };
        debug!(mode = ?mode, rules = rules.len(), "header filter configured");
        Ok(Self { rules, mode, matcher })
    }

    /// Filter removing headers whose names equal one of `rules`.
    pub fn exact<I, S>(rules: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(rules, MatchMode::Exact)
    }

    /// Filter removing headers whose names match one of the wildcard `rules`.
    pub fn pattern<I, S>(rules: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(rules, MatchMode::Pattern)
    }

    /// Build from a declarative [`FilterConfig`].
    pub fn from_config(config: &FilterConfig) -> Result<Self, ConfigError> {
        Self::new(config.header_names.iter().cloned(), config.mode())
    }

    /// Parse a YAML [`FilterConfig`] document and build the filter.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: FilterConfig = serde_yaml::from_str(yaml)?;
        Self::from_config(&config)
    }

    /// Load a YAML [`FilterConfig`] from `path` and build the filter.
    pub fn load_from_yaml_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let f = File::open(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        let config: FilterConfig = serde_yaml::from_reader(BufReader::new(f))?;
        Self::from_config(&config)
    }

    /// Rules in declaration order.
    #[must_use]
    pub fn rules(&self) -> &[String] {
        &self.rules
    }

    /// Matching mode.
    #[must_use]
    pub const fn mode(&self) -> MatchMode {
        self.mode
    }

    /// Whether a header named `name` would be removed.
    #[must_use]
    pub fn is_match(&self, name: &str) -> bool {
        match &self.matcher {
            Matcher::Exact(names) => names.contains(name),
            Matcher::Pattern(set) => set.is_match(name),
        }
    }

    /// Copy of `message` without the matched headers.
    #[must_use]
    pub fn transform<P: Clone>(&self, message: &Message<P>) -> Message<P> {
        self.transform_owned(message.clone())
    }

    /// Like [`transform`](Self::transform), reusing the message's payload.
    #[must_use]
    pub fn transform_owned<P>(&self, message: Message<P>) -> Message<P> {
        message.retain_headers(|name, _| !self.is_match(name))
    }
}

impl<P> MessageTransformer<P> for HeaderFilter {
    fn transform_message(&self, message: Message<P>) -> Result<Message<P>, TransformError> {
        Ok(self.transform_owned(message))
    }
}

fn compile_patterns(rules: &[String]) -> Result<RegexSet, ConfigError> {
    // Compile one by one first so the error names the offending rule.
    for rule in rules {
        regex::Regex::new(&glob_to_regex(rule))
            .map_err(|source| ConfigError::InvalidPattern { pattern: rule.clone(), source })?;
    }
    RegexSet::new(rules.iter().map(|r| glob_to_regex(r))).map_err(|source| {
        ConfigError::InvalidPattern { pattern: rules.join(", "), source }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn star_is_literal_in_exact_mode() {
        let f = HeaderFilter::exact(["time*"]).unwrap();
        assert!(f.is_match("time*"));
        assert!(!f.is_match("time"));
    }

    #[test]
    fn exact_is_case_sensitive() {
        let f = HeaderFilter::exact(["X"]).unwrap();
        assert!(f.is_match("X"));
        assert!(!f.is_match("x"));
    }

    #[test]
    fn duplicate_rules_are_accepted() {
        let f = HeaderFilter::pattern(["a*", "a*", "ab"]).unwrap();
        assert_eq!(f.rules().len(), 3);
        assert!(f.is_match("abc"));
    }

    #[test]
    fn shared_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<HeaderFilter>();
    }
}
