//! Expression table and named column ranges
//!
//! An [`ExpressionTable`] holds one row per gene: an identifier plus a fixed,
//! ordered set of numeric sample columns. Sample columns are addressed by
//! inclusive named spans ([`ColumnRange`]) which are resolved to positional
//! indices once, before any scoring happens.

use crate::{Error, Result};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Name of the identifier column every input table must start with
pub const GENE_ID_COLUMN: &str = "Geneid";

/// Immutable gene x sample matrix with row identifiers
///
/// Values are stored row-major in a single buffer so that each row is a
/// contiguous slice.
#[derive(Debug, Clone)]
pub struct ExpressionTable {
    gene_ids: Vec<String>,
    sample_names: Vec<String>,
    values: Vec<f64>,
    column_lookup: AHashMap<String, usize>,
}

impl ExpressionTable {
    /// Build a table from identifiers, sample names and a row-major value buffer
    pub fn new(gene_ids: Vec<String>, sample_names: Vec<String>, values: Vec<f64>) -> Result<Self> {
        if gene_ids.is_empty() {
            return Err(Error::EmptyTable);
        }
        if sample_names.is_empty() {
            return Err(Error::NoSamples);
        }

        let expected = gene_ids.len() * sample_names.len();
        if values.len() != expected {
            return Err(Error::ShapeMismatch {
                expected,
                actual: values.len(),
            });
        }

        let mut column_lookup = AHashMap::with_capacity(sample_names.len());
        for (idx, name) in sample_names.iter().enumerate() {
            if column_lookup.insert(name.clone(), idx).is_some() {
                return Err(Error::DuplicateColumn(name.clone()));
            }
        }

        Ok(Self {
            gene_ids,
            sample_names,
            values,
            column_lookup,
        })
    }

    /// Build a table from `(gene_id, values)` rows
    pub fn from_rows<I, S>(sample_names: Vec<String>, rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Vec<f64>)>,
        S: Into<String>,
    {
        let width = sample_names.len();
        let mut gene_ids = Vec::new();
        let mut values = Vec::new();

        for (gene_id, row) in rows {
            if row.len() != width {
                return Err(Error::ShapeMismatch {
                    expected: width,
                    actual: row.len(),
                });
            }
            gene_ids.push(gene_id.into());
            values.extend(row);
        }

        Self::new(gene_ids, sample_names, values)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.gene_ids.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.gene_ids.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn sample_count(&self) -> usize {
        self.sample_names.len()
    }

    #[inline]
    #[must_use]
    pub fn sample_names(&self) -> &[String] {
        &self.sample_names
    }

    #[inline]
    #[must_use]
    pub fn gene_ids(&self) -> &[String] {
        &self.gene_ids
    }

    /// Identifier of the row at `index`
    pub fn gene_id(&self, index: usize) -> Result<&str> {
        self.check_row(index)?;
        Ok(&self.gene_ids[index])
    }

    /// Sample values of the row at `index`
    pub fn row(&self, index: usize) -> Result<&[f64]> {
        self.check_row(index)?;
        Ok(self.row_unchecked(index))
    }

    #[inline]
    pub(crate) fn row_unchecked(&self, index: usize) -> &[f64] {
        let width = self.sample_names.len();
        &self.values[index * width..(index + 1) * width]
    }

    /// Position of a sample column by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.column_lookup.get(name).copied()
    }

    pub(crate) fn check_row(&self, index: usize) -> Result<()> {
        if index >= self.len() {
            return Err(Error::RowOutOfRange {
                index,
                rows: self.len(),
            });
        }
        Ok(())
    }
}

/// Inclusive span of sample columns addressed by name, e.g. `C1:C9`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRange {
    pub start: String,
    pub end: String,
}

impl ColumnRange {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Resolve the range to the ordered sample column indices it spans
    pub fn resolve(&self, table: &ExpressionTable) -> Result<Vec<usize>> {
        let start = table
            .column_index(&self.start)
            .ok_or_else(|| Error::ColumnNotFound(self.start.clone()))?;
        let end = table
            .column_index(&self.end)
            .ok_or_else(|| Error::ColumnNotFound(self.end.clone()))?;

        if start > end {
            return Err(Error::InvalidRange {
                start: self.start.clone(),
                end: self.end.clone(),
            });
        }

        Ok((start..=end).collect())
    }
}

impl fmt::Display for ColumnRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

impl FromStr for ColumnRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once(':') {
            Some((start, end)) if !start.trim().is_empty() && !end.trim().is_empty() => {
                Ok(Self::new(start.trim(), end.trim()))
            }
            _ => Err(Error::InvalidConfig(format!(
                "column range must look like START:END, got '{}'",
                s
            ))),
        }
    }
}

/// Control and full-range column indices resolved against one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSelection {
    control: Vec<usize>,
    full: Vec<usize>,
    full_names: Vec<String>,
}

impl ColumnSelection {
    /// Resolve both ranges, requiring the control span to lie inside the full span
    pub fn resolve(table: &ExpressionTable, control: &ColumnRange, full: &ColumnRange) -> Result<Self> {
        let control_idx = control.resolve(table)?;
        let full_idx = full.resolve(table)?;

        let contained = match (control_idx.first(), control_idx.last(), full_idx.first(), full_idx.last()) {
            (Some(cs), Some(ce), Some(fs), Some(fe)) => cs >= fs && ce <= fe,
            _ => false,
        };
        if !contained {
            return Err(Error::RangeNotContained {
                control: control.to_string(),
                full: full.to_string(),
            });
        }

        let full_names = full_idx
            .iter()
            .map(|&i| table.sample_names()[i].clone())
            .collect();

        tracing::debug!(
            control = %control,
            full = %full,
            control_columns = control_idx.len(),
            full_columns = full_idx.len(),
            "resolved column selection"
        );

        Ok(Self {
            control: control_idx,
            full: full_idx,
            full_names,
        })
    }

    #[inline]
    pub fn control(&self) -> &[usize] {
        &self.control
    }

    #[inline]
    pub fn full(&self) -> &[usize] {
        &self.full
    }

    /// Sample names of the full range, in column order
    #[inline]
    pub fn full_names(&self) -> &[String] {
        &self.full_names
    }

    /// Check that the selection was resolved against `table`'s column layout
    pub fn check_table(&self, table: &ExpressionTable) -> Result<()> {
        for (&idx, name) in self.full.iter().zip(&self.full_names) {
            match table.sample_names().get(idx) {
                Some(actual) if actual == name => {}
                _ => return Err(Error::SelectionMismatch(name.clone())),
            }
        }
        Ok(())
    }
}
