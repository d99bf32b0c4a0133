use serde::{Deserialize, Serialize};

/// Unique identifier of a surface part within the model
pub type PartId = String;

/// Unique identifier of a placed decal
pub type DecalId = String;

/// Structural role of a named sub-mesh within the product model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartRole {
    /// The vessel's lid
    Lid,
    /// The vessel's plate (the dish the lid sits on)
    Plate,
    /// The stand the vessel rests on; never rescaled
    Stand,
}

impl PartRole {
    /// Stable part identifier used as the registry key
    pub fn id(&self) -> &'static str {
        match self {
            PartRole::Lid => "lid",
            PartRole::Plate => "plate",
            PartRole::Stand => "stand",
        }
    }

    /// Display name for UI / logs
    pub fn display_name(&self) -> &'static str {
        match self {
            PartRole::Lid => "Lid",
            PartRole::Plate => "Plate",
            PartRole::Stand => "Stand",
        }
    }

    /// Whether the part belongs to the scalable assembly group
    pub fn is_scalable(&self) -> bool {
        !matches!(self, PartRole::Stand)
    }

    /// All structural roles
    pub fn all() -> &'static [PartRole] {
        &[PartRole::Lid, PartRole::Plate, PartRole::Stand]
    }
}

/// Which portion of the product the user is currently viewing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    /// Whole assembly plus the stand
    #[default]
    Full,
    /// Lid only
    Lid,
    /// Plate only
    Plate,
}

impl ViewMode {
    /// The single part this view isolates, if any
    pub fn focused_role(&self) -> Option<PartRole> {
        match self {
            ViewMode::Full => None,
            ViewMode::Lid => Some(PartRole::Lid),
            ViewMode::Plate => Some(PartRole::Plate),
        }
    }

    /// Whether a part with the given role is visible in this view
    pub fn shows(&self, role: PartRole) -> bool {
        match self {
            ViewMode::Full => true,
            ViewMode::Lid => role == PartRole::Lid,
            ViewMode::Plate => role == PartRole::Plate,
        }
    }
}

/// Source of a texture image. The engine never sees pixel data, only
/// an opaque label the loader resolves.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ImageSource {
    /// User-uploaded file, identified by name
    Upload { name: String },
    /// Predefined sticker from the catalog
    Sticker { id: String },
}

impl ImageSource {
    /// Human-readable label for logs and session export
    pub fn label(&self) -> String {
        match self {
            ImageSource::Upload { name } => format!("upload:{name}"),
            ImageSource::Sticker { id } => format!("sticker:{id}"),
        }
    }
}

/// Serializable record of one placed decal. Enough to regenerate the
/// realized geometry at any assembly scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecalDescription {
    pub id: DecalId,
    /// Owning part (a decal belongs to exactly one part)
    pub part: PartId,
    /// Attachment point in the owning part's frame at `placed_at_scale`
    pub position: [f64; 3],
    /// Orthonormal placement basis, captured once at placement time
    pub tangent: [f64; 3],
    pub bitangent: [f64; 3],
    pub normal: [f64; 3],
    /// Width / height / projection depth at `placed_at_scale`
    pub size: [f64; 3],
    /// Assembly scale when the record was captured
    pub placed_at_scale: f64,
    /// Texture source of the stamp
    pub texture: ImageSource,
}

/// Exported session state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionDescription {
    #[serde(default = "default_version")]
    pub version: u32,
    /// Current uniform assembly scale factor
    pub scale: f64,
    /// Active view
    #[serde(default)]
    pub view: ViewMode,
    pub decals: Vec<DecalDescription>,
}

fn default_version() -> u32 {
    1
}
