use crate::score::is_degenerate;
use crate::{Error, Result};

/// One ranked (target, candidate) pair
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateResult {
    /// `"<target_id>/<candidate_id>"`
    pub id: String,
    /// Normalized dispersion of the control ratios; may be NaN or infinite
    pub ndiv: f64,
    /// Target/candidate ratio per full-range sample, aligned with
    /// [`ResultSet::sample_names`]
    pub ratios: Vec<f64>,
}

impl CandidateResult {
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        is_degenerate(self.ndiv)
    }
}

/// Ranked candidates for one or more targets, sharing one column layout
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultSet {
    pub sample_names: Vec<String>,
    pub rows: Vec<CandidateResult>,
}

impl ResultSet {
    pub fn new(sample_names: Vec<String>) -> Self {
        Self {
            sample_names,
            rows: Vec::new(),
        }
    }

    pub fn with_rows(sample_names: Vec<String>, rows: Vec<CandidateResult>) -> Self {
        Self { sample_names, rows }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Concatenate another result set with the same sample columns
    pub fn append(&mut self, mut other: ResultSet) -> Result<()> {
        if self.sample_names != other.sample_names {
            return Err(Error::HeaderMismatch {
                expected: self.sample_names.clone(),
                actual: other.sample_names,
            });
        }
        self.rows.append(&mut other.rows);
        Ok(())
    }

    /// Number of rows whose score is NaN or infinite
    pub fn degenerate_count(&self) -> usize {
        self.rows.iter().filter(|r| r.is_degenerate()).count()
    }
}
