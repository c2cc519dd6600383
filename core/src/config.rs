//! Index and query configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_LIMIT: usize = 5;
pub const DEFAULT_MIN_SCORE: f64 = 0.0;

/// Vocabulary pruning settings applied on every fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Minimum number of documents a term must occur in.
    #[serde(default = "default_min_df")]
    pub min_df: u32,
    /// Keep at most this many terms, most frequent first. `None` is unlimited.
    #[serde(default)]
    pub max_features: Option<usize>,
}
fn default_min_df() -> u32 { 1 }

impl Default for IndexConfig {
    fn default() -> Self {
        Self { min_df: default_min_df(), max_features: None }
    }
}

impl IndexConfig {
    pub fn validate(&self) -> Result<()> {
        if self.min_df == 0 {
            return Err(Error::InvalidConfig("min_df must be at least 1".into()));
        }
        if self.max_features == Some(0) {
            return Err(Error::InvalidConfig("max_features must be at least 1".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default = "default_min_score")]
    pub min_score: f64,
}
fn default_limit() -> usize { DEFAULT_LIMIT }
fn default_min_score() -> f64 { DEFAULT_MIN_SCORE }

impl Default for SearchParams {
    fn default() -> Self {
        Self { limit: DEFAULT_LIMIT, min_score: DEFAULT_MIN_SCORE }
    }
}

impl SearchParams {
    pub fn new(limit: usize, min_score: f64) -> Self { Self { limit, min_score } }

    pub fn validate(&self) -> Result<()> {
        if self.limit == 0 {
            return Err(Error::InvalidParameter("limit must be at least 1".into()));
        }
        if !self.min_score.is_finite() {
            return Err(Error::InvalidParameter(format!("min_score must be finite, got {}", self.min_score)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_from_empty_json() {
        let cfg: IndexConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, IndexConfig::default());
        let params: SearchParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.limit, 5);
        assert_eq!(params.min_score, 0.0);
    }

    #[test]
    fn rejects_zero_values() {
        assert!(IndexConfig { min_df: 0, max_features: None }.validate().is_err());
        assert!(IndexConfig { min_df: 1, max_features: Some(0) }.validate().is_err());
        assert!(SearchParams::new(0, 0.0).validate().is_err());
        assert!(SearchParams::new(3, f64::NAN).validate().is_err());
        assert!(SearchParams::new(3, 0.5).validate().is_ok());
    }
}
