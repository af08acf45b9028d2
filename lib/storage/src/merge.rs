use anyhow::{bail, Result};
use dirt_core::ResultSet;
use std::path::Path;
use tracing::{debug, info};

use crate::{ResultReader, ResultWriter};

/// Concatenate result files in the given order and write them to `output`
///
/// Every input must carry the same sample columns. Returns the merged set.
pub fn merge<P, Q>(inputs: &[P], output: Q, delimiter: u8) -> Result<ResultSet>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let Some((first, rest)) = inputs.split_first() else {
        bail!("No result files to merge");
    };

    let reader = ResultReader::with_delimiter(delimiter);
    let mut merged = reader.read_path(first)?;
    debug!("Merging {:?} ({} rows)", first.as_ref(), merged.len());

    for input in rest {
        let part = reader.read_path(input)?;
        debug!("Merging {:?} ({} rows)", input.as_ref(), part.len());
        merged.append(part)?;
    }

    ResultWriter::with_delimiter(delimiter).write_path(&output, &merged)?;
    info!(
        "Merged {} files into {:?} ({} rows)",
        inputs.len(),
        output.as_ref(),
        merged.len()
    );
    Ok(merged)
}
