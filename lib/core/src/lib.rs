//! # DiRT Core
//!
//! Core library for DiRT, the candidate index gene finder.
//!
//! For every target gene in an expression table, DiRT ranks the other genes
//! by how stable their expression ratio to the target is across control
//! samples. The most stable candidates are usable as normalization
//! references ("index genes") for that target.
//!
//! - [`ExpressionTable`] - Gene x sample matrix with named sample columns
//! - [`ColumnRange`] / [`ColumnSelection`] - Named column spans resolved to indices
//! - [`TargetContext`] - Per-target values and the pure scoring functions
//! - [`RankingEngine`] - Ranks candidates for one target or a batch of targets
//! - [`ResultSet`] - Ranked candidates ready to be written out
//!
//! ## Example
//!
//! ```rust
//! use dirt_core::{ExpressionTable, RankConfig, RankingEngine, ColumnRange};
//!
//! let table = ExpressionTable::from_rows(
//!     vec!["C1".to_string(), "C2".to_string()],
//!     vec![
//!         ("G1", vec![10.0, 10.0]),
//!         ("G2", vec![10.0, 10.0]),
//!         ("G3", vec![5.0, 20.0]),
//!     ],
//! ).unwrap();
//!
//! let config = RankConfig {
//!     control: ColumnRange::new("C1", "C2"),
//!     full: ColumnRange::new("C1", "C2"),
//!     top_n: 2,
//! };
//! let engine = RankingEngine::new(&table, &config).unwrap();
//! let results = engine.rank(0).unwrap();
//!
//! assert_eq!(results[0].id, "G1/G2");
//! assert_eq!(results[1].id, "G1/G3");
//! ```

pub mod table;
pub mod error;
pub mod config;
pub mod result;
pub mod engine;
pub mod score;

pub use table::{ColumnRange, ColumnSelection, ExpressionTable, GENE_ID_COLUMN};
pub use error::{Error, ErrorKind, Result};
pub use config::RankConfig;
pub use result::{CandidateResult, ResultSet};
pub use score::{TargetContext, EPSILON};
pub use engine::{rank, RankingEngine};
