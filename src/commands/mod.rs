//! Command dispatch and handlers.

pub mod resolve;
pub mod serve;

use std::env;
use std::path::PathBuf;

use crate::cassette::session::RecordingSession;
use crate::cli::Command;
use crate::config::Settings;
use crate::context::ServiceContext;

/// Environment variable naming a directory to record cassettes into.
pub const RECORD_ENV: &str = "ACTIONABLES_RECORD";

/// Dispatch a parsed command to its handler.
///
/// When `ACTIONABLES_RECORD` is set to a directory path, all port
/// interactions are recorded to per-port cassette files in that directory.
///
/// # Errors
///
/// Returns an error string if settings are invalid or the selected command
/// handler fails.
pub fn dispatch(command: &Command) -> Result<(), String> {
    let settings = Settings::from_env()?;

    let (ctx, session) = match env::var(RECORD_ENV) {
        Ok(path) if !path.is_empty() => {
            let (ctx, session) = ServiceContext::recording_at(PathBuf::from(path))?;
            (ctx, Some(session))
        }
        _ => (ServiceContext::live(), None),
    };

    // The context is consumed so recorders are released before finishing.
    let result = dispatch_with_context(command, ctx, &settings);

    if let Some(session) = session {
        finish_recording(session)?;
    }

    result
}

/// Dispatch a command with the given service context.
fn dispatch_with_context(
    command: &Command,
    ctx: ServiceContext,
    settings: &Settings,
) -> Result<(), String> {
    match command {
        Command::Serve { bind, port } => serve::run(ctx, settings, *bind, *port),
        Command::Resolve { url, apikey, blocked_policy } => {
            resolve::run(&ctx, url, apikey, blocked_policy.unwrap_or(settings.blocked_policy))
        }
    }
}

/// Finish a recording session and print the output directory.
fn finish_recording(session: RecordingSession) -> Result<(), String> {
    let output_dir = session.finish()?;
    eprintln!("Recording saved to: {}", output_dir.display());
    Ok(())
}
