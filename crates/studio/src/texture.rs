//! Texture handles and the asynchronous image-loading boundary.
//!
//! The engine never sees pixel data. A load request yields a ticket;
//! completions are drained once per event pump and validated against
//! current session state before they take effect (guard-on-apply).

use std::collections::HashSet;
use std::sync::Arc;

use shared::ImageSource;

/// Opaque handle to a loaded texture. Cloning shares the underlying
/// image by reference, so one upload can back many decals.
#[derive(Clone, Debug)]
pub struct TextureHandle {
    source: Arc<ImageSource>,
}

impl TextureHandle {
    pub fn new(source: ImageSource) -> Self {
        Self {
            source: Arc::new(source),
        }
    }

    pub fn source(&self) -> &ImageSource {
        &self.source
    }

    pub fn label(&self) -> String {
        self.source.label()
    }

    /// True when both handles share the same underlying image
    pub fn shares(&self, other: &TextureHandle) -> bool {
        Arc::ptr_eq(&self.source, &other.source)
    }
}

/// Identifies one load request; completions echo it back
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureTicket(pub u64);

/// Completion event drained by the session's event pump
#[derive(Clone, Debug)]
pub enum TextureEvent {
    Loaded {
        ticket: TextureTicket,
        handle: TextureHandle,
    },
    Failed {
        ticket: TextureTicket,
        source: ImageSource,
        reason: String,
    },
}

/// Asynchronous image loading boundary. Implementations decode away
/// from the logical thread; the session drains completions once per
/// event pump.
pub trait TextureLoader {
    fn request(&mut self, source: ImageSource) -> TextureTicket;
    fn poll(&mut self) -> Vec<TextureEvent>;
}

/// Loader for tests and the headless driver: every request completes
/// on the next poll, in request order. Sources can be marked failing
/// to exercise the error path.
pub struct ImmediateTextureLoader {
    next_ticket: u64,
    pending: Vec<(TextureTicket, ImageSource)>,
    failing: HashSet<String>,
}

impl ImmediateTextureLoader {
    pub fn new() -> Self {
        Self {
            next_ticket: 1,
            pending: Vec::new(),
            failing: HashSet::new(),
        }
    }

    /// Mark a source label (see [`ImageSource::label`]) as failing
    pub fn fail_source(&mut self, label: &str) {
        self.failing.insert(label.to_string());
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

impl TextureLoader for ImmediateTextureLoader {
    fn request(&mut self, source: ImageSource) -> TextureTicket {
        let ticket = TextureTicket(self.next_ticket);
        self.next_ticket += 1;
        self.pending.push((ticket, source));
        ticket
    }

    fn poll(&mut self) -> Vec<TextureEvent> {
        self.pending
            .drain(..)
            .map(|(ticket, source)| {
                if self.failing.contains(&source.label()) {
                    TextureEvent::Failed {
                        ticket,
                        source,
                        reason: "decode failed".to_string(),
                    }
                } else {
                    TextureEvent::Loaded {
                        ticket,
                        handle: TextureHandle::new(source),
                    }
                }
            })
            .collect()
    }
}

impl Default for ImmediateTextureLoader {
    fn default() -> Self {
        Self::new()
    }
}
