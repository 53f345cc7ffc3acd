//! Append-only identity/index table
//!
//! The table is the cross-run contract behind semantic coloring: an
//! identity keeps its index forever, indices are handed out
//! monotonically, and index 0 is never assigned (it is reserved for
//! background pixels, which decode to 0). Persisting the table after a
//! run and reloading it before the next keeps the color of every
//! identity stable across runs and across scenes.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::encoding::{encode_index, palette_color};
use super::SemanticError;

/// One persisted table row
#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexEntry {
    /// Assigned index
    index: u32,

    /// Identity string (category label or instance id)
    identity: String,

    /// Color the index rendered as, for human inspection
    color: [u8; 3],
}

/// Monotonic identity-to-index assignment
#[derive(Debug, Default)]
pub struct SemanticIndexTable {
    indices: HashMap<String, u32>,
    order: Vec<String>,
}

impl SemanticIndexTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of assigned identities (excludes the reserved index 0)
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether no identity has been assigned yet
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Look up an identity's index without assigning one
    pub fn get(&self, identity: &str) -> Option<u32> {
        self.indices.get(identity).copied()
    }

    /// Look up or assign the index for an identity
    ///
    /// New identities get the next free index, starting at 1. An
    /// identity's index never changes once assigned.
    pub fn get_or_insert(&mut self, identity: &str) -> u32 {
        if let Some(index) = self.indices.get(identity) {
            return *index;
        }
        let index = self.next_index();
        self.indices.insert(identity.to_string(), index);
        self.order.push(identity.to_string());
        index
    }

    fn next_index(&self) -> u32 {
        self.indices.values().max().copied().unwrap_or(0) + 1
    }

    /// Seed the table from a previously written file
    ///
    /// Loaded assignments win: identities keep the indices the file
    /// gives them, and new identities are assigned above the file's
    /// maximum.
    pub fn load_from_file(&mut self, path: &Path) -> Result<(), SemanticError> {
        let contents = std::fs::read_to_string(path)?;
        let entries: Vec<IndexEntry> =
            ron::from_str(&contents).map_err(|e| SemanticError::Table {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        for entry in entries {
            if entry.index == 0 {
                return Err(SemanticError::Table {
                    path: path.to_path_buf(),
                    reason: format!("index 0 is reserved, claimed by `{}`", entry.identity),
                });
            }
            if let Some(existing) = self.indices.get(&entry.identity) {
                if *existing != entry.index {
                    return Err(SemanticError::Table {
                        path: path.to_path_buf(),
                        reason: format!(
                            "`{}` maps to both {} and {}",
                            entry.identity, existing, entry.index
                        ),
                    });
                }
                continue;
            }
            self.indices.insert(entry.identity.clone(), entry.index);
            self.order.push(entry.identity);
        }
        Ok(())
    }

    /// Write the table, sorted by index, as RON
    ///
    /// Stored colors match what the run drew: packed index bytes when
    /// `encode` is set, palette colors otherwise.
    pub fn save_to_file(&self, path: &Path, encode: bool) -> Result<(), SemanticError> {
        let color_of: fn(u32) -> [u8; 3] = if encode { encode_index } else { palette_color };
        let mut entries: Vec<IndexEntry> = self
            .indices
            .iter()
            .map(|(identity, &index)| IndexEntry {
                index,
                identity: identity.clone(),
                color: color_of(index),
            })
            .collect();
        entries.sort_by_key(|entry| entry.index);

        let contents = ron::ser::to_string_pretty(&entries, Default::default()).map_err(|e| {
            SemanticError::Table {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        })?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}
