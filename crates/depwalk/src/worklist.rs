//! Breadth-first worklist with a visited set keyed by canonical path

use std::{
    collections::VecDeque,
    fmt,
    path::{Path, PathBuf},
};

use anyhow::Result;
use log::trace;
use rustc_hash::FxHashSet;

use crate::types::SourceUnit;

/// An entry unit was handed to the compiler without a path.
///
/// Raised before any file is read or transformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingPathError {
    /// Position of the offending unit in the entry list
    pub index: usize,
}

impl fmt::Display for MissingPathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Entry unit #{} has no path: every file passed to the compiler must set its \
             `filename` option",
            self.index
        )
    }
}

impl std::error::Error for MissingPathError {}

/// Queue of units awaiting compilation plus the set of paths already queued.
///
/// Entry paths are all marked pending when the list is seeded, so an entry
/// that another file imports is never queued a second time.
#[derive(Debug, Default)]
pub struct Worklist {
    queue: VecDeque<SourceUnit>,
    pending: FxHashSet<PathBuf>,
}

impl Worklist {
    /// Build a worklist from the caller's entry units, in order.
    ///
    /// Fails with [`MissingPathError`] if any unit lacks a path. A path given
    /// more than once is queued at its first position only.
    pub fn seed(entries: Vec<SourceUnit>) -> Result<Self> {
        if let Some(index) = entries.iter().position(|unit| unit.path().is_none()) {
            return Err(MissingPathError { index }.into());
        }

        let mut worklist = Self::default();
        for unit in entries {
            let Some(path) = unit.path().map(Path::to_path_buf) else {
                continue;
            };
            if worklist.pending.contains(&path) {
                trace!("Dropping duplicate entry {}", path.display());
                continue;
            }
            worklist.pending.insert(path);
            worklist.queue.push_back(unit);
        }
        Ok(worklist)
    }

    /// Queue a dependency unit for `path` unless that path was seen before.
    /// Returns whether it was queued.
    pub fn enqueue(&mut self, path: PathBuf) -> bool {
        if self.pending.contains(&path) {
            return false;
        }
        trace!("Queueing {}", path.display());
        self.pending.insert(path.clone());
        self.queue.push_back(SourceUnit::new(path));
        true
    }

    pub fn pop(&mut self) -> Option<SourceUnit> {
        self.queue.pop_front()
    }

    /// Whether `path` has ever been queued in this worklist
    pub fn is_pending(&self, path: &Path) -> bool {
        self.pending.contains(path)
    }

    /// Number of units still waiting
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
