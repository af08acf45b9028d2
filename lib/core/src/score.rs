//! Ratio dispersion scoring
//!
//! For a target gene `t` and a candidate gene `r`, the control ratio vector is
//! `t_i / (r_i + EPSILON)` over the control columns. Its coefficient of
//! variation (sample standard deviation over mean) is the normalized
//! dispersion, `ndiv`. Lower means the ratio is more stable across controls.
//!
//! Degenerate input (zero or negative expression, NaN cells) can make `ndiv`
//! NaN or infinite. Those values are returned as-is and never raised as errors.

use crate::table::{ColumnSelection, ExpressionTable};
use crate::Result;
use ordered_float::OrderedFloat;
use std::cmp::Ordering;

/// Added to every candidate value before dividing
pub const EPSILON: f64 = 1e-12;

/// Elementwise `target / (candidate + EPSILON)`
#[inline]
pub fn ratio_vector(target: &[f64], candidate: &[f64]) -> Vec<f64> {
    debug_assert_eq!(target.len(), candidate.len());
    target
        .iter()
        .zip(candidate.iter())
        .map(|(t, c)| t / (c + EPSILON))
        .collect()
}

/// Arithmetic mean, skipping NaN entries. NaN when nothing is left.
#[inline]
pub fn mean(values: &[f64]) -> f64 {
    let (sum, n) = values
        .iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if n == 0 {
        return f64::NAN;
    }
    sum / n as f64
}

/// Bessel-corrected (n - 1) standard deviation, skipping NaN entries
///
/// Returns NaN when fewer than two usable values remain.
#[inline]
pub fn sample_std(values: &[f64]) -> f64 {
    let usable: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if usable.len() < 2 {
        return f64::NAN;
    }
    let m = mean(&usable);
    let sum_sq: f64 = usable.iter().map(|v| (v - m) * (v - m)).sum();
    (sum_sq / (usable.len() - 1) as f64).sqrt()
}

/// Coefficient of variation of a ratio vector
#[inline]
pub fn normalized_dispersion(ratios: &[f64]) -> f64 {
    sample_std(ratios) / mean(ratios)
}

/// Ascending `ndiv` order with NaN sorted after every number
///
/// `-inf` sorts first and `+inf` sorts just before NaN. Combined with a stable
/// sort, equal scores keep their original row order.
#[inline]
pub fn ndiv_order(a: f64, b: f64) -> Ordering {
    OrderedFloat(a).cmp(&OrderedFloat(b))
}

/// Whether a score is NaN or infinite
#[inline]
pub fn is_degenerate(ndiv: f64) -> bool {
    !ndiv.is_finite()
}

/// Per-target values captured once and reused for every candidate row
#[derive(Debug, Clone)]
pub struct TargetContext<'a> {
    table: &'a ExpressionTable,
    selection: &'a ColumnSelection,
    index: usize,
    gene_id: &'a str,
    control: Vec<f64>,
    full: Vec<f64>,
}

impl<'a> TargetContext<'a> {
    /// Capture the target row; `selection` must come from the same table
    pub fn new(table: &'a ExpressionTable, selection: &'a ColumnSelection, index: usize) -> Result<Self> {
        selection.check_table(table)?;
        let gene_id = table.gene_id(index)?;
        let row = table.row(index)?;

        Ok(Self {
            table,
            selection,
            index,
            gene_id,
            control: gather(row, selection.control()),
            full: gather(row, selection.full()),
        })
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn gene_id(&self) -> &'a str {
        self.gene_id
    }

    #[inline]
    pub fn control_values(&self) -> &[f64] {
        &self.control
    }

    #[inline]
    pub fn full_values(&self) -> &[f64] {
        &self.full
    }

    /// `ndiv` of the control ratios between the target and `row`
    pub(crate) fn score(&self, row: usize) -> f64 {
        let candidate = gather(self.table.row_unchecked(row), self.selection.control());
        normalized_dispersion(&ratio_vector(&self.control, &candidate))
    }

    /// Target/candidate ratio in every full-range sample
    pub(crate) fn ratio_profile(&self, row: usize) -> Vec<f64> {
        let candidate = gather(self.table.row_unchecked(row), self.selection.full());
        ratio_vector(&self.full, &candidate)
    }

    /// The `"<target>/<candidate>"` identifier for a pair
    pub(crate) fn pair_id(&self, row: usize) -> String {
        format!("{}/{}", self.gene_id, self.table.gene_ids()[row])
    }

    /// Whether a pair identifier names the target as its candidate
    ///
    /// This is a textual suffix test, so every row carrying the target's
    /// identifier is treated as a self-pair, not just the target row.
    pub fn is_self_pair(&self, pair_id: &str) -> bool {
        pair_id
            .strip_suffix(self.gene_id)
            .map_or(false, |head| head.ends_with('/'))
    }
}

#[inline]
fn gather(row: &[f64], columns: &[usize]) -> Vec<f64> {
    columns.iter().map(|&i| row[i]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::ColumnRange;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_ratio_vector() {
        let ratios = ratio_vector(&[10.0, 10.0], &[5.0, 20.0]);
        assert!(approx(ratios[0], 2.0));
        assert!(approx(ratios[1], 0.5));
    }

    #[test]
    fn test_ratio_vector_zero_candidate() {
        let ratios = ratio_vector(&[1.0], &[0.0]);
        assert!(ratios[0].is_finite());
        assert!((ratios[0] / 1e12 - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_sample_std_bessel() {
        assert!(approx(sample_std(&[2.0, 0.5]), 1.125f64.sqrt()));
        assert!(approx(sample_std(&[1.0, 1.0, 1.0]), 0.0));
        assert!(sample_std(&[1.0]).is_nan());
    }

    #[test]
    fn test_stats_skip_nan() {
        assert!(approx(mean(&[1.0, f64::NAN, 3.0]), 2.0));
        assert!(approx(sample_std(&[1.0, f64::NAN, 3.0]), 2.0f64.sqrt()));
        assert!(mean(&[f64::NAN]).is_nan());
    }

    #[test]
    fn test_normalized_dispersion() {
        assert!(approx(normalized_dispersion(&[1.0, 1.0]), 0.0));
        let expected = 1.125f64.sqrt() / 1.25;
        assert!(approx(normalized_dispersion(&[2.0, 0.5]), expected));
    }

    #[test]
    fn test_zero_mean_is_degenerate() {
        let ndiv = normalized_dispersion(&[0.0, 0.0]);
        assert!(ndiv.is_nan());
        assert!(is_degenerate(ndiv));

        let ndiv = normalized_dispersion(&[1.0, -1.0]);
        assert!(ndiv.is_infinite());
    }

    #[test]
    fn test_ndiv_order_nan_last() {
        let mut scores = vec![f64::NAN, 0.5, f64::INFINITY, f64::NEG_INFINITY, 0.1];
        scores.sort_by(|a, b| ndiv_order(*a, *b));
        assert_eq!(scores[0], f64::NEG_INFINITY);
        assert_eq!(scores[1], 0.1);
        assert_eq!(scores[2], 0.5);
        assert_eq!(scores[3], f64::INFINITY);
        assert!(scores[4].is_nan());
    }

    #[test]
    fn test_target_context() {
        let table = ExpressionTable::from_rows(
            vec!["C1".into(), "C2".into(), "T1".into()],
            vec![
                ("G1", vec![10.0, 10.0, 4.0]),
                ("G2", vec![10.0, 10.0, 2.0]),
                ("G3", vec![5.0, 20.0, 8.0]),
            ],
        )
        .unwrap();
        let selection = ColumnSelection::resolve(
            &table,
            &ColumnRange::new("C1", "C2"),
            &ColumnRange::new("C1", "T1"),
        )
        .unwrap();

        let ctx = TargetContext::new(&table, &selection, 0).unwrap();
        assert_eq!(ctx.gene_id(), "G1");
        assert_eq!(ctx.control_values(), &[10.0, 10.0]);
        assert_eq!(ctx.full_values(), &[10.0, 10.0, 4.0]);

        assert!(approx(ctx.score(1), 0.0));
        assert!(approx(ctx.score(2), 1.125f64.sqrt() / 1.25));

        let profile = ctx.ratio_profile(1);
        assert_eq!(profile.len(), 3);
        assert!(approx(profile[2], 2.0));

        assert_eq!(ctx.pair_id(2), "G1/G3");
        assert!(ctx.is_self_pair("G1/G1"));
        assert!(ctx.is_self_pair("G1/X/G1"));
        assert!(!ctx.is_self_pair("G1/XG1"));
        assert!(!ctx.is_self_pair("G1/G2"));
    }

    #[test]
    fn test_target_context_rejects_foreign_selection() {
        let wide = ExpressionTable::from_rows(
            vec!["C1".into(), "C2".into()],
            vec![("G1", vec![1.0, 2.0]), ("G2", vec![3.0, 4.0])],
        )
        .unwrap();
        let selection = ColumnSelection::resolve(
            &wide,
            &ColumnRange::new("C1", "C2"),
            &ColumnRange::new("C1", "C2"),
        )
        .unwrap();

        let narrow = ExpressionTable::from_rows(vec!["C1".into()], vec![("G1", vec![1.0])]).unwrap();
        let err = TargetContext::new(&narrow, &selection, 0).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Key);
        assert!(TargetContext::new(&wide, &selection, 1).is_ok());
    }

    #[test]
    fn test_target_context_out_of_range() {
        let table = ExpressionTable::from_rows(vec!["C1".into()], vec![("G1", vec![1.0])]).unwrap();
        let selection = ColumnSelection::resolve(
            &table,
            &ColumnRange::new("C1", "C1"),
            &ColumnRange::new("C1", "C1"),
        )
        .unwrap();
        assert!(TargetContext::new(&table, &selection, 1).is_err());
    }
}
