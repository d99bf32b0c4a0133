//! Error taxonomy for the configurator core.
//!
//! Every variant is handled at the boundary where it occurs: logged,
//! state left untouched (or the single failing item dropped), never a
//! panic. The render loop is the only thing that must never stop.

use thiserror::Error;

/// Recoverable engine errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StudioError {
    /// Expected named sub-mesh absent after model load
    #[error("model has no '{0}' sub-mesh")]
    MissingAsset(String),

    /// Bounding computation found no geometry
    #[error("bounding box of '{0}' is empty")]
    EmptyBounds(String),

    /// Decal volume failed to clip against the target surface
    #[error("decal volume does not intersect the surface of '{0}'")]
    NoSurfaceIntersection(String),

    /// Asynchronous image load or decode failed
    #[error("texture '{asset}' failed to load: {reason}")]
    TextureLoadFailure { asset: String, reason: String },

    /// A texture load completed after the context it targeted was gone
    #[error("stale completion for texture ticket {0} discarded")]
    StaleAsyncCompletion(u64),
}
