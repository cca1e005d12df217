//! Navigation history: the undo stack behind back-navigation.
//!
//! Every forward transition records the step it left and the snapshot as it
//! was *before* that step ran. Popping therefore restores both the cursor and
//! the configuration exactly; undoing a step rolls back every field it wrote.

use crate::config::ConfigSnapshot;
use crate::step::StepId;

/// One forward transition, recorded before the step ran.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub step: StepId,
    pub snapshot: ConfigSnapshot,
}

/// Undo stack for backward navigation.
///
/// Depth always equals forward transitions taken minus back-navigations
/// since; the controller relies on that for progress reporting.
#[derive(Debug, Default)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }

    /// `None` is the legitimate "nothing to go back to" steady state at the
    /// start of the flow, not an error.
    pub fn pop(&mut self) -> Option<HistoryEntry> {
        self.entries.pop()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.entries.len()
    }
}
