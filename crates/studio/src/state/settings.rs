//! Configurator settings, persisted as JSON in the user config dir.

use serde::{Deserialize, Serialize};

/// Names of the structural sub-meshes expected in a loaded model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelBindings {
    pub lid: String,
    pub plate: String,
    pub stand: String,
}

impl Default for ModelBindings {
    fn default() -> Self {
        Self {
            lid: "lid".to_string(),
            plate: "plate".to_string(),
            stand: "stand".to_string(),
        }
    }
}

/// Camera defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraSettings {
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self { fov_degrees: 75.0 }
    }
}

/// All configurator settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudioSettings {
    /// Real-world diameter (cm) the authored model corresponds to.
    /// Rescale targets are measured against this baseline.
    pub baseline_diameter: f32,
    /// Default stamp extents: width, height, projection depth
    pub stamp_size: [f32; 3],
    /// Sub-mesh names of the structural parts
    pub model: ModelBindings,
    pub camera: CameraSettings,
}

impl Default for StudioSettings {
    fn default() -> Self {
        Self {
            baseline_diameter: 26.7,
            stamp_size: [0.02, 0.02, 0.01],
            model: ModelBindings::default(),
            camera: CameraSettings::default(),
        }
    }
}

impl StudioSettings {
    /// Load settings from file, or return defaults if not found
    pub fn load() -> Self {
        if let Some(dirs) = directories::ProjectDirs::from("com", "vessel", "studio") {
            let config_path = dirs.config_dir().join("settings.json");
            if let Ok(json) = std::fs::read_to_string(&config_path) {
                if let Ok(settings) = serde_json::from_str(&json) {
                    return settings;
                }
            }
        }
        Self::default()
    }

    /// Save settings to file
    pub fn save(&self) {
        if let Some(dirs) = directories::ProjectDirs::from("com", "vessel", "studio") {
            let config_dir = dirs.config_dir();
            if std::fs::create_dir_all(config_dir).is_ok() {
                let config_path = config_dir.join("settings.json");
                if let Ok(json) = serde_json::to_string_pretty(self) {
                    let _ = std::fs::write(config_path, json);
                }
            }
        }
    }
}
