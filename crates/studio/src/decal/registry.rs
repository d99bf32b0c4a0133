//! Per-part decal bookkeeping.
//!
//! The registry is the single authoritative home of placed decals:
//! one ordered list per part (insertion order = placement order, kept
//! for deterministic re-rendering), and no decal ever appears under
//! more than one part.

use std::collections::HashMap;

use shared::PartId;

use super::Decal;

#[derive(Clone, Default)]
pub struct DecalRegistry {
    entries: HashMap<PartId, Vec<Decal>>,
}

impl DecalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a decal under its owning part, after any existing ones
    pub fn add(&mut self, decal: Decal) {
        self.entries.entry(decal.part.clone()).or_default().push(decal);
    }

    /// Remove and return every decal of a part, in placement order.
    /// The records survive; only the registry forgets them.
    pub fn remove_all(&mut self, part: &PartId) -> Vec<Decal> {
        self.entries.remove(part).unwrap_or_default()
    }

    /// Flip visibility of every realized instance owned by a part.
    /// Decal records themselves are untouched.
    pub fn set_visible(&mut self, part: &PartId, visible: bool) {
        if let Some(decals) = self.entries.get_mut(part) {
            for decal in decals {
                decal.instance.visible = visible;
            }
        }
    }

    /// Decals of one part, in placement order
    pub fn decals(&self, part: &PartId) -> &[Decal] {
        self.entries.get(part).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn count(&self, part: &PartId) -> usize {
        self.decals(part).len()
    }

    pub fn total(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn visible_total(&self) -> usize {
        self.entries
            .values()
            .flatten()
            .filter(|d| d.instance.visible)
            .count()
    }
}
