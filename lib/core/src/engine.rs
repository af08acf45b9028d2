//! Candidate ranking
//!
//! [`RankingEngine`] resolves the control and full column ranges once, then
//! ranks every row of the table against a target row by ascending `ndiv`.
//! Targets are independent of each other, so a batch of targets can be
//! ranked in parallel and concatenated afterwards.

use crate::config::RankConfig;
use crate::result::{CandidateResult, ResultSet};
use crate::score::{ndiv_order, TargetContext};
use crate::table::{ColumnRange, ColumnSelection, ExpressionTable};
use crate::{Error, Result};
use rayon::prelude::*;
use std::ops::Range;

/// Ranks candidate index genes for target rows of one table
#[derive(Debug, Clone)]
pub struct RankingEngine<'a> {
    table: &'a ExpressionTable,
    selection: ColumnSelection,
    top_n: usize,
}

impl<'a> RankingEngine<'a> {
    pub fn new(table: &'a ExpressionTable, config: &RankConfig) -> Result<Self> {
        config.validate()?;
        let selection = ColumnSelection::resolve(table, &config.control, &config.full)?;
        Ok(Self {
            table,
            selection,
            top_n: config.top_n,
        })
    }

    #[inline]
    pub fn table(&self) -> &ExpressionTable {
        self.table
    }

    #[inline]
    pub fn selection(&self) -> &ColumnSelection {
        &self.selection
    }

    #[inline]
    pub fn top_n(&self) -> usize {
        self.top_n
    }

    /// Sample names of the ratio columns in every result
    pub fn sample_names(&self) -> &[String] {
        self.selection.full_names()
    }

    /// Rank all rows against the target row, lowest `ndiv` first
    ///
    /// Rows whose identifier equals the target's are excluded. At most
    /// `top_n` candidates are returned; fewer when the table is smaller.
    pub fn rank(&self, target_index: usize) -> Result<Vec<CandidateResult>> {
        let ctx = TargetContext::new(self.table, &self.selection, target_index)?;

        let mut scored: Vec<(usize, String, f64)> = (0..self.table.len())
            .map(|row| (row, ctx.pair_id(row), ctx.score(row)))
            .filter(|(_, id, _)| !ctx.is_self_pair(id))
            .collect();

        // sort_by is stable, so equal scores keep row order
        scored.sort_by(|a, b| ndiv_order(a.2, b.2));
        scored.truncate(self.top_n);

        tracing::trace!(
            target_index = ctx.index(),
            gene_id = ctx.gene_id(),
            candidates = scored.len(),
            "ranked target"
        );

        Ok(scored
            .into_iter()
            .map(|(row, id, ndiv)| CandidateResult {
                id,
                ndiv,
                ratios: ctx.ratio_profile(row),
            })
            .collect())
    }

    /// Rank each target in `targets` in order and concatenate the results
    pub fn rank_rows(&self, targets: Range<usize>) -> Result<ResultSet> {
        self.check_targets(&targets)?;
        let mut rows = Vec::with_capacity(targets.len() * self.top_n.min(self.table.len()));
        for target in targets {
            rows.extend(self.rank(target)?);
        }
        Ok(ResultSet::with_rows(self.sample_names().to_vec(), rows))
    }

    /// Parallel [`rank_rows`](Self::rank_rows) on the current rayon pool
    ///
    /// Each target fills its own buffer; buffers are concatenated in target
    /// order, so the output equals the sequential one.
    pub fn par_rank_rows(&self, targets: Range<usize>) -> Result<ResultSet> {
        self.check_targets(&targets)?;
        let per_target: Vec<Vec<CandidateResult>> = targets
            .into_par_iter()
            .map(|target| self.rank(target))
            .collect::<Result<_>>()?;
        Ok(ResultSet::with_rows(
            self.sample_names().to_vec(),
            per_target.into_iter().flatten().collect(),
        ))
    }

    fn check_targets(&self, targets: &Range<usize>) -> Result<()> {
        if targets.end > self.table.len() {
            return Err(Error::RowOutOfRange {
                index: targets.end - 1,
                rows: self.table.len(),
            });
        }
        Ok(())
    }
}

/// One-shot ranking of a single target row
pub fn rank(
    table: &ExpressionTable,
    target_index: usize,
    control: &ColumnRange,
    full: &ColumnRange,
    top_n: usize,
) -> Result<Vec<CandidateResult>> {
    let config = RankConfig {
        control: control.clone(),
        full: full.clone(),
        top_n,
    };
    RankingEngine::new(table, &config)?.rank(target_index)
}
