//! View state machine: Full / Lid / Plate.
//!
//! Visibility of every part and of its decals is derived from the
//! active view alone, never toggled piecemeal.

use shared::{PartRole, ViewMode};

use super::Session;
use crate::error::StudioError;

impl Session {
    /// Switch the active view.
    ///
    /// Switching to the current view is a no-op. Until both
    /// structural parts are resolved no transition is permitted;
    /// the attempt is dropped silently (logged, never a crash).
    pub fn go_to(&mut self, target: ViewMode) {
        if target == self.view {
            return;
        }
        if !self.assembly.is_resolved() {
            tracing::debug!(?target, "view switch ignored: model not resolved");
            return;
        }

        let mut changed = Vec::new();
        for part in &mut self.assembly.parts {
            let show = target.shows(part.role);
            if part.visible != show {
                part.visible = show;
                changed.push((part.id.clone(), show));
            }
        }
        if let Some(stand) = &mut self.stand {
            stand.visible = target.shows(PartRole::Stand);
        }
        // Decals inherit their owner's visibility exactly; a hidden
        // part's decals never render, even transiently.
        for (id, show) in changed {
            self.registry.set_visible(&id, show);
        }

        let bounds = match target.focused_role() {
            Some(role) => self.part_bounds(role),
            None => self.assembly.bounds(),
        };
        if bounds.is_empty() {
            tracing::warn!(
                error = %StudioError::EmptyBounds(format!("{target:?} view target")),
                "camera framing skipped"
            );
        } else {
            self.camera.frame(&bounds);
        }

        self.epoch += 1;
        self.view = target;
        self.request_render();
    }
}
