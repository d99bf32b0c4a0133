use vessel_studio_lib::command::{execute_command, execute_json_batch, StudioCommand};
use vessel_studio_lib::harness::TestHarness;
use vessel_studio_lib::render::LogRenderer;

use shared::{ImageSource, ViewMode};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vessel_studio=info,vessel_studio_lib=info".into()),
        )
        .init();

    let mut harness = TestHarness::with_renderer(Box::new(LogRenderer));

    match parse_commands_arg() {
        Some(path) => run_batch(&mut harness, &path),
        None => run_demo(&mut harness),
    }
}

/// Parse the `--commands <path>` argument (`-` reads stdin)
fn parse_commands_arg() -> Option<String> {
    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;
    while i < args.len() {
        if args[i] == "--commands" && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
        i += 1;
    }
    None
}

fn run_batch(harness: &mut TestHarness, path: &str) {
    let json = if path == "-" {
        let mut buf = String::new();
        match std::io::Read::read_to_string(&mut std::io::stdin(), &mut buf) {
            Ok(_) => buf,
            Err(e) => {
                tracing::error!("Failed to read commands from stdin: {e}");
                return;
            }
        }
    } else {
        match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!("Failed to read commands file {path}: {e}");
                return;
            }
        }
    };

    match execute_json_batch(harness, &json) {
        Ok(responses) => {
            for response in responses {
                print_response(&response);
            }
        }
        Err(e) => tracing::error!("Failed to execute commands: {e}"),
    }
}

/// Scripted walkthrough: customize the vessel, then resize it to half
/// its real-world diameter.
fn run_demo(harness: &mut TestHarness) {
    tracing::info!("no --commands file given; running the built-in demo");

    let script = [
        StudioCommand::LoadModel,
        StudioCommand::UploadStamp {
            source: ImageSource::Sticker {
                id: "star".to_string(),
            },
        },
        StudioCommand::Pump,
        StudioCommand::SetView {
            view: ViewMode::Lid,
        },
        StudioCommand::PlaceDecal { x: 640.0, y: 360.0 },
        StudioCommand::SetView {
            view: ViewMode::Full,
        },
        StudioCommand::Rescale { diameter: 13.35 },
        StudioCommand::Inspect,
        StudioCommand::ExportSession,
    ];

    for cmd in script {
        let response = execute_command(harness, cmd);
        print_response(&response);
    }
}

fn print_response(response: &vessel_studio_lib::command::CommandResponse) {
    match serde_json::to_string(response) {
        Ok(json) => println!("{json}"),
        Err(e) => tracing::error!("Failed to serialize response: {e}"),
    }
}
