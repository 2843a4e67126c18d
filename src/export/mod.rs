//! Export of the parsed category tree to its two output shapes.
//!
//! - [`csv`] - flat `frequencies.csv`, one line per subcategory
//! - [`flare`] - hierarchical `flare.json` for visualization frontends
//!
//! Both exporters take the same parsed [`Category`](crate::feed::Category)
//! slice and overwrite their output file on every run, so repeated runs on
//! the same input are byte-identical.

mod csv;
mod flare;

use thiserror::Error;

pub use csv::write_csv;
pub use flare::{build_tree, write_flare, FlareCategory, FlareLeaf, FlareTree};

/// Errors that can occur while writing an output file.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Output file could not be created or written.
    #[error("Failed to write output file: {0}")]
    Io(#[from] std::io::Error),

    /// JSON tree serialization failed.
    #[error("Failed to serialize JSON tree: {0}")]
    Json(#[from] serde_json::Error),
}
