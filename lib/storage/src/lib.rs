//! # DiRT Storage
//!
//! Delimited-file input and output for DiRT.
//!
//! - [`TableReader`] - Loads an expression table (`Geneid` plus sample columns)
//! - [`ResultWriter`] - Writes ranked results atomically
//! - [`ResultReader`] - Loads a result file back
//! - [`merge`] - Concatenates result files produced for separate row ranges
//!
//! Paths ending in `.gz` are transparently gzip-compressed or decompressed.

pub mod reader;
pub mod writer;
pub mod merge;

pub use reader::{ResultReader, TableReader};
pub use writer::{format_value, ResultWriter};
pub use merge::merge;

use std::path::Path;

/// First column of a result file
pub const ID_COLUMN: &str = "ID";
/// Second column of a result file
pub const NDIV_COLUMN: &str = "ndiv";

pub(crate) fn is_gzip(path: &Path) -> bool {
    path.extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("gz"))
}
