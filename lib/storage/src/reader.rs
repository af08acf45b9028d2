use anyhow::{bail, Context, Result};
use dirt_core::{CandidateResult, Error, ExpressionTable, ResultSet, GENE_ID_COLUMN};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::debug;

use crate::{is_gzip, ID_COLUMN, NDIV_COLUMN};

/// Reads a delimited expression table with a `Geneid` first column
#[derive(Debug, Clone, Copy)]
pub struct TableReader {
    delimiter: u8,
}

impl Default for TableReader {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl TableReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(delimiter: u8) -> Self {
        Self { delimiter }
    }

    /// Load a table from disk, decompressing `.gz` files
    pub fn read_path<P: AsRef<Path>>(&self, path: P) -> Result<ExpressionTable> {
        let path = path.as_ref();
        debug!("Loading expression table from {:?}", path);

        let reader = open(path)?;
        let table = self
            .read(reader)
            .with_context(|| format!("Failed to load expression table {}", path.display()))?;

        debug!(
            "Loaded {} genes x {} samples from {:?}",
            table.len(),
            table.sample_count(),
            path
        );
        Ok(table)
    }

    pub fn read<R: Read>(&self, reader: R) -> Result<ExpressionTable> {
        let mut csv = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .from_reader(reader);

        let headers = csv.headers()?.clone();
        let first = headers.get(0).map(strip_bom).unwrap_or_default();
        if first != GENE_ID_COLUMN {
            return Err(Error::MissingIdColumn {
                expected: GENE_ID_COLUMN,
                found: first.to_string(),
            }
            .into());
        }
        let sample_names: Vec<String> = headers.iter().skip(1).map(|s| s.to_string()).collect();

        let mut gene_ids = Vec::new();
        let mut values = Vec::new();

        for (line, result) in csv.records().enumerate() {
            let record = result?;
            let gene_id = record.get(0).unwrap_or_default();

            for (col, cell) in record.iter().skip(1).enumerate() {
                let value = parse_cell(cell).with_context(|| {
                    format!(
                        "Invalid value {:?} for gene '{}' in column '{}' (data row {})",
                        cell,
                        gene_id,
                        sample_names[col],
                        line + 1
                    )
                })?;
                values.push(value);
            }
            gene_ids.push(gene_id.to_string());
        }

        Ok(ExpressionTable::new(gene_ids, sample_names, values)?)
    }
}

/// Reads a result file written by [`crate::ResultWriter`]
#[derive(Debug, Clone, Copy)]
pub struct ResultReader {
    delimiter: u8,
}

impl Default for ResultReader {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl ResultReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(delimiter: u8) -> Self {
        Self { delimiter }
    }

    pub fn read_path<P: AsRef<Path>>(&self, path: P) -> Result<ResultSet> {
        let path = path.as_ref();
        let reader = open(path)?;
        self.read(reader)
            .with_context(|| format!("Failed to load result file {}", path.display()))
    }

    pub fn read<R: Read>(&self, reader: R) -> Result<ResultSet> {
        let mut csv = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .from_reader(reader);

        let headers = csv.headers()?.clone();
        let id = headers.get(0).map(strip_bom);
        if id != Some(ID_COLUMN) || headers.get(1) != Some(NDIV_COLUMN) {
            bail!(
                "Result header must start with '{},{}', found {:?}",
                ID_COLUMN,
                NDIV_COLUMN,
                headers
            );
        }
        let sample_names: Vec<String> = headers.iter().skip(2).map(|s| s.to_string()).collect();

        let mut rows = Vec::new();
        for (line, result) in csv.records().enumerate() {
            let record = result?;
            let id = record.get(0).unwrap_or_default().to_string();
            let ndiv = parse_cell(record.get(1).unwrap_or_default())
                .with_context(|| format!("Invalid ndiv for '{}' (data row {})", id, line + 1))?;
            let ratios = record
                .iter()
                .skip(2)
                .map(parse_cell)
                .collect::<Result<Vec<f64>>>()
                .with_context(|| format!("Invalid ratio for '{}' (data row {})", id, line + 1))?;
            rows.push(CandidateResult { id, ndiv, ratios });
        }

        Ok(ResultSet::with_rows(sample_names, rows))
    }
}

fn open(path: &Path) -> Result<Box<dyn Read>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let reader = BufReader::new(file);
    if is_gzip(path) {
        Ok(Box::new(flate2::read::GzDecoder::new(reader)))
    } else {
        Ok(Box::new(reader))
    }
}

fn strip_bom(s: &str) -> &str {
    s.trim_start_matches('\u{feff}')
}

/// Cell contents read as a missing value, as pandas' `read_csv` does by default
const MISSING_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Parse a numeric cell; missing-value tokens read as NaN
fn parse_cell(cell: &str) -> Result<f64> {
    let cell = cell.trim();
    if MISSING_TOKENS.contains(&cell) {
        return Ok(f64::NAN);
    }
    Ok(cell.parse::<f64>()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_table() {
        let data = "Geneid,C1,C2,T1\nG1,1,2.5,3\nG2,4,5,6e2\n";
        let table = TableReader::new().read(data.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.sample_names(), &["C1", "C2", "T1"]);
        assert_eq!(table.gene_id(1).unwrap(), "G2");
        assert_eq!(table.row(1).unwrap(), &[4.0, 5.0, 600.0]);
    }

    #[test]
    fn test_read_tab_delimited() {
        let data = "Geneid\tC1\tC2\nG1\t1\t2\n";
        let table = TableReader::with_delimiter(b'\t').read(data.as_bytes()).unwrap();
        assert_eq!(table.row(0).unwrap(), &[1.0, 2.0]);
    }

    #[test]
    fn test_missing_and_special_values() {
        let data = "Geneid,C1,C2,C3\nG1,,NaN,inf\n";
        let table = TableReader::new().read(data.as_bytes()).unwrap();
        let row = table.row(0).unwrap();
        assert!(row[0].is_nan());
        assert!(row[1].is_nan());
        assert_eq!(row[2], f64::INFINITY);
    }

    #[test]
    fn test_missing_value_tokens() {
        for token in MISSING_TOKENS {
            let data = format!("Geneid,C1,C2\nG1,1,{}\n", token);
            let table = TableReader::new()
                .read(data.as_bytes())
                .unwrap_or_else(|e| panic!("token {:?} failed: {:#}", token, e));
            let row = table.row(0).unwrap();
            assert_eq!(row[0], 1.0);
            assert!(row[1].is_nan(), "token {:?} should read as NaN", token);
        }
    }

    #[test]
    fn test_missing_geneid_header() {
        let data = "gene,C1\nG1,1\n";
        let err = TableReader::new().read(data.as_bytes()).unwrap_err();
        let core = err.downcast_ref::<Error>().unwrap();
        assert!(matches!(core, Error::MissingIdColumn { .. }));
    }

    #[test]
    fn test_bom_header_accepted() {
        let data = "\u{feff}Geneid,C1\nG1,1\n";
        assert!(TableReader::new().read(data.as_bytes()).is_ok());
    }

    #[test]
    fn test_empty_table() {
        let data = "Geneid,C1,C2\n";
        let err = TableReader::new().read(data.as_bytes()).unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::EmptyTable)));
    }

    #[test]
    fn test_bad_cell_reports_location() {
        let data = "Geneid,C1,C2\nG1,1,abc\n";
        let err = TableReader::new().read(data.as_bytes()).unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("G1"));
        assert!(message.contains("C2"));
    }

    #[test]
    fn test_ragged_row_rejected() {
        let data = "Geneid,C1,C2\nG1,1\n";
        assert!(TableReader::new().read(data.as_bytes()).is_err());
    }

    #[test]
    fn test_read_results() {
        let data = "ID,ndiv,C1,T1\nG1/G2,0.5,1,2\nG1/G3,NaN,inf,-inf\n";
        let results = ResultReader::new().read(data.as_bytes()).unwrap();
        assert_eq!(results.sample_names, vec!["C1".to_string(), "T1".to_string()]);
        assert_eq!(results.len(), 2);
        assert_eq!(results.rows[0].id, "G1/G2");
        assert!(results.rows[1].ndiv.is_nan());
        assert_eq!(results.rows[1].ratios, vec![f64::INFINITY, f64::NEG_INFINITY]);
    }

    #[test]
    fn test_result_header_checked() {
        let data = "Geneid,C1\nG1,1\n";
        assert!(ResultReader::new().read(data.as_bytes()).is_err());
    }
}
