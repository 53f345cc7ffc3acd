//! Semantic coloring
//!
//! Replaces scene materials with flat colors that identify what each
//! pixel shows. Identities (category labels or per-object instance
//! ids) are mapped to small integer indices by an append-only
//! [`SemanticIndexTable`]; an index either picks a palette color or is
//! packed losslessly into the pixel bytes. The same table can be
//! persisted and reloaded so colors stay stable across runs.

pub mod allocator;
pub mod encoding;
pub mod index_table;

pub use allocator::{color_scene, named_color, ColorMode, ColorOptions};
pub use encoding::{decode_index, encode_index, palette_color};
pub use index_table::SemanticIndexTable;

use std::path::PathBuf;

use thiserror::Error;

/// Semantic coloring errors
#[derive(Error, Debug)]
pub enum SemanticError {
    /// A persisted index table could not be read or was malformed
    #[error("index table error in {path}: {reason}")]
    Table {
        /// Table file
        path: PathBuf,
        /// What was wrong
        reason: String,
    },

    /// IO error while reading or writing an index table
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
