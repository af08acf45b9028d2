use crate::table::ColumnRange;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Parameters for one ranking run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankConfig {
    /// Control columns the stability score is computed over
    pub control: ColumnRange,
    /// Columns emitted as per-sample ratios; must contain `control`
    pub full: ColumnRange,
    /// Candidates kept per target gene
    pub top_n: usize,
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            control: ColumnRange::new("C1", "C9"),
            full: ColumnRange::new("C1", "T9"),
            top_n: 10,
        }
    }
}

impl RankConfig {
    pub fn validate(&self) -> Result<()> {
        if self.top_n == 0 {
            return Err(Error::InvalidTopN);
        }
        Ok(())
    }

    /// Parse a JSON document; missing fields keep their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: RankConfig =
            serde_json::from_str(json).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RankConfig::default();
        assert_eq!(config.control.to_string(), "C1:C9");
        assert_eq!(config.full.to_string(), "C1:T9");
        assert_eq!(config.top_n, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let config = RankConfig::from_json_str(r#"{"top_n": 3}"#).unwrap();
        assert_eq!(config.top_n, 3);
        assert_eq!(config.control, ColumnRange::new("C1", "C9"));

        let config = RankConfig::from_json_str(
            r#"{"control": {"start": "A1", "end": "A4"}, "full": {"start": "A1", "end": "B4"}}"#,
        )
        .unwrap();
        assert_eq!(config.control, ColumnRange::new("A1", "A4"));
        assert_eq!(config.full, ColumnRange::new("A1", "B4"));
    }

    #[test]
    fn test_zero_top_n_rejected() {
        let err = RankConfig::from_json_str(r#"{"top_n": 0}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidTopN));
    }

    #[test]
    fn test_malformed_json() {
        let err = RankConfig::from_json_str("{top_n:").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }
}
