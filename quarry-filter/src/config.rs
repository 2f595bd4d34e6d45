//! Parser configuration.

use std::env;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{FilterError, FilterResult};

/// Environment variable selecting the [`MultiKeyStrategy`].
pub const ENV_MULTI_KEY: &str = "QUARRY_PARSE_MULTI_KEY";

/// Environment variable setting [`ParseConfig::max_depth`].
pub const ENV_MAX_DEPTH: &str = "QUARRY_PARSE_MAX_DEPTH";

const DEFAULT_MAX_DEPTH: usize = 100;

/// How the parser treats a document with more than one top-level key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiKeyStrategy {
    /// Keep the whole document as a single `Raw` node.
    #[default]
    Passthrough,
    /// Parse each pair and join them with `And`, in document order.
    Conjunction,
}

impl fmt::Display for MultiKeyStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Passthrough => f.write_str("passthrough"),
            Self::Conjunction => f.write_str("conjunction"),
        }
    }
}

impl FromStr for MultiKeyStrategy {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "passthrough" => Ok(Self::Passthrough),
            "conjunction" | "and" => Ok(Self::Conjunction),
            other => Err(FilterError::config(format!(
                "unknown multi-key strategy: {}",
                other
            ))),
        }
    }
}

/// Configuration for [`Filter::from_document_with`](crate::Filter::from_document_with).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseConfig {
    /// Handling of multi-key documents.
    pub multi_key: MultiKeyStrategy,
    /// Nesting depth beyond which pairs are kept as `Raw` nodes.
    ///
    /// This bounds the parser's own recursion only. The raw tail is still
    /// cloned, compared and dropped by `bson`, which recurses over its full
    /// depth.
    pub max_depth: usize,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            multi_key: MultiKeyStrategy::Passthrough,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParseConfig {
    /// Create a builder for configuration.
    pub fn builder() -> ParseConfigBuilder {
        ParseConfigBuilder::new()
    }

    /// Load configuration from `QUARRY_PARSE_*` environment variables.
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> FilterResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through a variable lookup function.
    pub fn from_lookup<F>(lookup: F) -> FilterResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Self::builder();

        if let Some(strategy) = lookup(ENV_MULTI_KEY) {
            builder = builder.multi_key(strategy.trim().parse()?);
        }

        if let Some(depth) = lookup(ENV_MAX_DEPTH) {
            let depth = depth.trim().parse::<usize>().map_err(|e| {
                FilterError::config(format!("invalid {}: {}", ENV_MAX_DEPTH, e))
            })?;
            builder = builder.max_depth(depth);
        }

        builder.build()
    }
}

/// Builder for parser configuration.
#[derive(Debug, Default)]
pub struct ParseConfigBuilder {
    multi_key: Option<MultiKeyStrategy>,
    max_depth: Option<usize>,
}

impl ParseConfigBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the multi-key strategy.
    pub fn multi_key(mut self, strategy: MultiKeyStrategy) -> Self {
        self.multi_key = Some(strategy);
        self
    }

    /// Set the maximum nesting depth.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> FilterResult<ParseConfig> {
        let max_depth = self.max_depth.unwrap_or(DEFAULT_MAX_DEPTH);
        if max_depth == 0 {
            return Err(FilterError::config("max_depth must be at least 1"));
        }

        Ok(ParseConfig {
            multi_key: self.multi_key.unwrap_or_default(),
            max_depth,
        })
    }
}
