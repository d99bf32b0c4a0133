//! Headless harness: a session wired to the procedural vessel and an
//! immediate texture loader. Drives the engine without any renderer
//! or window, for tests and the JSON command interface.

use glam::Vec2;
use shared::{DecalId, ImageSource, PartRole, ViewMode};

use crate::fixtures::{vessel_assets, ProceduralVessel};
use crate::render::NullRenderer;
use crate::state::{Session, StudioSettings};
use crate::texture::ImmediateTextureLoader;
use crate::validation::DecalPatchValidator;

/// Headless test harness — session plus loader.
pub struct TestHarness {
    pub session: Session,
    pub loader: ImmediateTextureLoader,
}

impl TestHarness {
    /// Create a harness with no model installed.
    pub fn new() -> Self {
        Self::with_renderer(Box::new(NullRenderer))
    }

    /// Create a harness that hands frames to the given renderer.
    pub fn with_renderer(renderer: Box<dyn crate::render::Renderer>) -> Self {
        Self {
            session: Session::new(StudioSettings::default(), renderer),
            loader: ImmediateTextureLoader::new(),
        }
    }

    /// Create a harness with the vessel already installed.
    pub fn with_vessel() -> Self {
        let mut harness = Self::new();
        harness.session.install_model(vessel_assets());
        harness
    }

    // ── Model ─────────────────────────────────────────────────

    /// Load the procedural vessel model.
    pub fn load_vessel(&mut self) -> Result<(), String> {
        let mut source = ProceduralVessel;
        self.session.load_from(&mut source)
    }

    // ── Textures ──────────────────────────────────────────────

    /// Upload a sticker stamp and pump until it is ready.
    pub fn upload_stamp(&mut self, sticker: &str) {
        self.session.upload_stamp(
            &mut self.loader,
            ImageSource::Sticker {
                id: sticker.to_string(),
            },
        );
        self.pump();
    }

    /// Deliver pending texture completions (one event pump).
    pub fn pump(&mut self) {
        self.session.pump(&mut self.loader);
    }

    // ── Interaction ───────────────────────────────────────────

    /// Pointer-down at a viewport pixel position.
    pub fn place(&mut self, x: f32, y: f32) -> Option<DecalId> {
        self.session.pointer_down(Vec2::new(x, y))
    }

    /// Pointer-down at the viewport center.
    pub fn place_center(&mut self) -> Option<DecalId> {
        let x = self.session.viewport.width * 0.5;
        let y = self.session.viewport.height * 0.5;
        self.place(x, y)
    }

    pub fn go(&mut self, view: ViewMode) {
        self.session.go_to(view);
    }

    pub fn rescale(&mut self, diameter: f32) {
        self.session.rescale(diameter);
    }

    // ── Inspection ────────────────────────────────────────────

    pub fn decal_count(&self, role: PartRole) -> usize {
        self.session.registry.count(&role.id().to_string())
    }

    pub fn total_decals(&self) -> usize {
        self.session.registry.total()
    }

    pub fn scale(&self) -> f32 {
        self.session.assembly.scale
    }

    pub fn view(&self) -> ViewMode {
        self.session.view
    }

    /// Validate every realized decal patch. An empty list means all
    /// registered decals carry well-formed geometry.
    pub fn validate_decals(&self) -> Vec<String> {
        let mut errors = Vec::new();
        for part in &self.session.assembly.parts {
            for decal in self.session.registry.decals(&part.id) {
                let validator = DecalPatchValidator::new(&decal.instance.mesh);
                for error in validator.validate_all() {
                    errors.push(format!("{}: {}", decal.id, error));
                }
            }
        }
        errors
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
