use anyhow::Result;
use atomicwrites::{AllowOverwrite, AtomicFile};
use dirt_core::ResultSet;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;
use std::path::Path;
use tracing::debug;

use crate::{is_gzip, ID_COLUMN, NDIV_COLUMN};

/// Writes ranked results as a delimited table
///
/// Columns are `ID`, `ndiv`, then one ratio column per full-range sample.
/// Numbers use the shortest representation that reads back to the same
/// value; non-finite values are written as `NaN`, `inf` and `-inf`.
#[derive(Debug, Clone, Copy)]
pub struct ResultWriter {
    delimiter: u8,
}

impl Default for ResultWriter {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl ResultWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(delimiter: u8) -> Self {
        Self { delimiter }
    }

    /// Write to `path` atomically, gzip-compressing `.gz` targets
    pub fn write_path<P: AsRef<Path>>(&self, path: P, results: &ResultSet) -> Result<()> {
        let path = path.as_ref();

        let mut data = Vec::new();
        if is_gzip(path) {
            let mut encoder = GzEncoder::new(&mut data, Compression::default());
            self.write(&mut encoder, results)?;
            encoder.finish()?;
        } else {
            self.write(&mut data, results)?;
        }

        // Write to a temporary file first, then rename over the target
        AtomicFile::new(path, AllowOverwrite)
            .write(|f| f.write_all(&data))
            .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", path.display(), e))?;

        debug!("Wrote {} result rows to {:?}", results.len(), path);
        Ok(())
    }

    pub fn write<W: Write>(&self, writer: W, results: &ResultSet) -> Result<()> {
        let mut csv = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(writer);

        let mut header = Vec::with_capacity(results.sample_names.len() + 2);
        header.push(ID_COLUMN.to_string());
        header.push(NDIV_COLUMN.to_string());
        header.extend(results.sample_names.iter().cloned());
        csv.write_record(&header)?;

        let mut record = Vec::with_capacity(header.len());
        for row in &results.rows {
            record.clear();
            record.push(row.id.clone());
            record.push(format_value(row.ndiv));
            record.extend(row.ratios.iter().map(|&v| format_value(v)));
            csv.write_record(&record)?;
        }

        csv.flush()?;
        Ok(())
    }
}

/// Textual form of a float in result files
pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value == f64::INFINITY {
        "inf".to_string()
    } else if value == f64::NEG_INFINITY {
        "-inf".to_string()
    } else {
        format!("{:?}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dirt_core::CandidateResult;

    fn sample_results() -> ResultSet {
        ResultSet::with_rows(
            vec!["C1".to_string(), "T1".to_string()],
            vec![
                CandidateResult {
                    id: "G1/G2".to_string(),
                    ndiv: 0.0,
                    ratios: vec![1.0, 2.5],
                },
                CandidateResult {
                    id: "G1/G3".to_string(),
                    ndiv: f64::NAN,
                    ratios: vec![f64::INFINITY, f64::NEG_INFINITY],
                },
            ],
        )
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(0.5), "0.5");
        assert_eq!(format_value(2.0), "2.0");
        assert_eq!(format_value(1e12), "1000000000000.0");
        assert_eq!(format_value(1e-13), "1e-13");
        assert_eq!(format_value(f64::NAN), "NaN");
        assert_eq!(format_value(f64::INFINITY), "inf");
        assert_eq!(format_value(f64::NEG_INFINITY), "-inf");
    }

    #[test]
    fn test_write_layout() {
        let mut out = Vec::new();
        ResultWriter::new().write(&mut out, &sample_results()).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "ID,ndiv,C1,T1");
        assert_eq!(lines[1], "G1/G2,0.0,1.0,2.5");
        assert_eq!(lines[2], "G1/G3,NaN,inf,-inf");
    }

    #[test]
    fn test_write_tab_delimited() {
        let mut out = Vec::new();
        ResultWriter::with_delimiter(b'\t').write(&mut out, &sample_results()).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("ID\tndiv\tC1\tT1\n"));
    }
}
