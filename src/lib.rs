//! # DiRT
//!
//! Candidate index gene finder.
//!
//! For each target gene in an expression matrix, DiRT ranks the other genes
//! whose expression ratio to the target is most stable across a set of
//! control samples. The stability score is the normalized dispersion
//! (`ndiv`): the sample standard deviation of the control ratios divided by
//! their mean. The lowest-`ndiv` candidates are emitted together with the
//! target/candidate ratio in every sample.
//!
//! ## Quick Start
//!
//! ### As a CLI
//!
//! ```bash
//! cargo install dirt
//! # rank the first 10 genes of Test.csv
//! dirt rank --input Test.csv --output DiRT_test.csv
//! # split a full run across processes, then merge
//! dirt rank --input Test.csv --start 0 --end 5000 --output DiRT_test1.csv
//! dirt rank --input Test.csv --start 5000 --all --output DiRT_test2.csv
//! dirt merge --output DiRT_full.csv DiRT_test1.csv DiRT_test2.csv
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use dirt::prelude::*;
//!
//! let table = TableReader::new().read_path("Test.csv").unwrap();
//! let engine = RankingEngine::new(&table, &RankConfig::default()).unwrap();
//! let results = engine.rank_rows(0..10).unwrap();
//! ResultWriter::new().write_path("DiRT_test.csv", &results).unwrap();
//! ```
//!
//! ## Crate Structure
//!
//! - [`dirt-core`](https://docs.rs/dirt-core) - Expression table, scoring, ranking engine
//! - [`dirt-storage`](https://docs.rs/dirt-storage) - Delimited input/output and merging
//!
//! ## Degenerate scores
//!
//! Zero, negative or missing expression can make `ndiv` NaN or infinite.
//! Such rows are kept, sorted after every finite score (NaN last), and
//! written as `NaN`, `inf` or `-inf` so downstream tools can filter them.

// Re-export core types
pub use dirt_core::{
    rank, CandidateResult, ColumnRange, ColumnSelection, Error, ErrorKind, ExpressionTable,
    RankConfig, RankingEngine, Result, ResultSet, TargetContext, EPSILON, GENE_ID_COLUMN,
};

// Re-export storage
pub use dirt_storage::{merge, ResultReader, ResultWriter, TableReader};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        rank, CandidateResult, ColumnRange, ExpressionTable, RankConfig, RankingEngine,
        ResultSet, ResultReader, ResultWriter, TableReader,
    };
}

/// Scoring primitives
pub mod score {
    pub use dirt_core::score::{mean, ndiv_order, normalized_dispersion, ratio_vector, sample_std};
}
