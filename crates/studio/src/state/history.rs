//! Undo/redo snapshots of decal operations.

use crate::decal::registry::DecalRegistry;

const MAX_HISTORY: usize = 100;

#[derive(Default)]
pub(crate) struct DecalHistory {
    undo_stack: Vec<DecalRegistry>,
    redo_stack: Vec<DecalRegistry>,
}

impl DecalHistory {
    /// Snapshot the registry before a mutating decal operation
    pub fn save(&mut self, current: &DecalRegistry) {
        self.undo_stack.push(current.clone());
        if self.undo_stack.len() > MAX_HISTORY {
            self.undo_stack.remove(0);
        }
        self.redo_stack.clear();
    }

    pub fn undo(&mut self, current: &DecalRegistry) -> Option<DecalRegistry> {
        let previous = self.undo_stack.pop()?;
        self.redo_stack.push(current.clone());
        Some(previous)
    }

    pub fn redo(&mut self, current: &DecalRegistry) -> Option<DecalRegistry> {
        let next = self.redo_stack.pop()?;
        self.undo_stack.push(current.clone());
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
