//! JSON command protocol for driving a configurator session headlessly.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use shared::{ImageSource, SessionDescription, ViewMode};

use crate::harness::TestHarness;

/// A command the headless driver can execute.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum StudioCommand {
    /// Load the built-in vessel model
    LoadModel,
    /// Switch the active view
    SetView { view: ViewMode },
    /// Start loading an image as the decal stamp
    UploadStamp { source: ImageSource },
    /// Start loading an image as the visible parts' surface map
    ApplySurfaceTexture { source: ImageSource },
    /// Deliver pending asynchronous completions (one event pump)
    Pump,
    /// Pointer-down at a viewport pixel position
    PlaceDecal { x: f32, y: f32 },
    /// Rescale to a real-world diameter
    Rescale { diameter: f32 },
    /// Remove every decal of one part
    ClearDecals { part: String },
    /// Orbit the camera by screen-space degrees
    Orbit { dx: f32, dy: f32 },
    /// Zoom the camera
    Zoom { delta: f32 },
    /// Undo the last decal operation
    Undo,
    /// Redo the last undone decal operation
    Redo,
    /// Inspect session state
    Inspect,
    /// Export the session as JSON
    ExportSession,
    /// Restore a previously exported session
    ImportSession { session: SessionDescription },
}

/// Response from executing a command.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommandResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl CommandResponse {
    fn ok() -> Self {
        Self {
            success: true,
            error: None,
            data: None,
        }
    }

    fn ok_with_data(data: serde_json::Value) -> Self {
        Self {
            success: true,
            error: None,
            data: Some(data),
        }
    }

    fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(msg.into()),
            data: None,
        }
    }
}

/// Execute a single command on the harness.
pub fn execute_command(harness: &mut TestHarness, cmd: StudioCommand) -> CommandResponse {
    match cmd {
        StudioCommand::LoadModel => match harness.load_vessel() {
            Ok(()) => CommandResponse::ok(),
            Err(msg) => CommandResponse::err(msg),
        },

        StudioCommand::SetView { view } => {
            harness.go(view);
            CommandResponse::ok_with_data(serde_json::json!({ "view": harness.view() }))
        }

        StudioCommand::UploadStamp { source } => {
            harness
                .session
                .upload_stamp(&mut harness.loader, source);
            CommandResponse::ok()
        }

        StudioCommand::ApplySurfaceTexture { source } => {
            harness
                .session
                .upload_surface_texture(&mut harness.loader, source);
            CommandResponse::ok()
        }

        StudioCommand::Pump => {
            harness.pump();
            CommandResponse::ok_with_data(serde_json::json!({
                "stamp_ready": harness.session.stamp().is_some(),
            }))
        }

        StudioCommand::PlaceDecal { x, y } => {
            let placed = harness.session.pointer_down(Vec2::new(x, y));
            CommandResponse::ok_with_data(serde_json::json!({ "placed": placed }))
        }

        StudioCommand::Rescale { diameter } => {
            harness.rescale(diameter);
            CommandResponse::ok_with_data(serde_json::json!({
                "scale": harness.scale(),
            }))
        }

        StudioCommand::ClearDecals { part } => {
            harness.session.clear_decals(&part);
            CommandResponse::ok_with_data(serde_json::json!({
                "remaining": harness.total_decals(),
            }))
        }

        StudioCommand::Orbit { dx, dy } => {
            harness.session.camera.rotate(dx, dy);
            harness.session.request_render();
            CommandResponse::ok()
        }

        StudioCommand::Zoom { delta } => {
            harness.session.camera.zoom(delta);
            harness.session.request_render();
            CommandResponse::ok()
        }

        StudioCommand::Undo => {
            let undone = harness.session.undo();
            CommandResponse::ok_with_data(serde_json::json!({ "undone": undone }))
        }

        StudioCommand::Redo => {
            let redone = harness.session.redo();
            CommandResponse::ok_with_data(serde_json::json!({ "redone": redone }))
        }

        StudioCommand::Inspect => {
            let session = &harness.session;
            let parts: Vec<serde_json::Value> = session
                .assembly
                .parts
                .iter()
                .map(|part| {
                    serde_json::json!({
                        "id": part.id,
                        "name": part.name,
                        "role": part.role,
                        "visible": part.visible,
                        "decal_count": session.registry.count(&part.id),
                        "surface_texture": part.surface_texture.as_ref().map(|t| t.label()),
                    })
                })
                .collect();
            CommandResponse::ok_with_data(serde_json::json!({
                "view": session.view,
                "scale": session.assembly.scale,
                "parts": parts,
                "stand_present": session.stand.is_some(),
                "frames_rendered": session.frames_rendered(),
            }))
        }

        StudioCommand::ExportSession => {
            match serde_json::to_value(harness.session.describe()) {
                Ok(session) => CommandResponse::ok_with_data(session),
                Err(e) => CommandResponse::err(format!("export failed: {e}")),
            }
        }

        StudioCommand::ImportSession { session } => {
            harness.session.restore(&session);
            CommandResponse::ok_with_data(serde_json::json!({
                "decals": harness.total_decals(),
                "scale": harness.scale(),
            }))
        }
    }
}

/// Parse and execute a single JSON command string.
pub fn execute_json(harness: &mut TestHarness, json: &str) -> Result<CommandResponse, String> {
    let cmd: StudioCommand =
        serde_json::from_str(json).map_err(|e| format!("Invalid command JSON: {e}"))?;
    Ok(execute_command(harness, cmd))
}

/// Parse and execute multiple JSON commands (array).
pub fn execute_json_batch(
    harness: &mut TestHarness,
    json: &str,
) -> Result<Vec<CommandResponse>, String> {
    let cmds: Vec<StudioCommand> =
        serde_json::from_str(json).map_err(|e| format!("Invalid commands JSON: {e}"))?;
    Ok(cmds
        .into_iter()
        .map(|cmd| execute_command(harness, cmd))
        .collect())
}
