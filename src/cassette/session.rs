//! Recording session managing per-port cassette recorders.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tracing::warn;

use super::recorder::CassetteRecorder;

/// Manages per-port `CassetteRecorder` instances for a recording session.
///
/// Each port gets its own recorder writing `<port>.cassette.yaml` into the
/// session directory.
pub struct RecordingSession {
    /// Recorder for clock interactions.
    pub clock: Arc<Mutex<CassetteRecorder>>,
    /// Recorder for tracker interactions.
    pub tracker: Arc<Mutex<CassetteRecorder>>,
    /// Output directory containing all cassette files.
    output_dir: PathBuf,
}

impl RecordingSession {
    /// Create a new recording session writing into `output_dir`.
    ///
    /// The directory is created if needed; existing cassettes inside it are
    /// refused rather than overwritten.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The directory already holds cassette files
    /// - The directory cannot be created
    pub fn new(output_dir: &Path) -> Result<Self, String> {
        let timestamp = Utc::now().format("%Y-%m-%dT%H-%M-%S").to_string();

        std::fs::create_dir_all(output_dir)
            .map_err(|e| format!("Failed to create cassette directory: {e}"))?;

        let commit = get_commit_hash();
        let mut recorders = Vec::new();
        for port in ["clock", "tracker"] {
            let path = output_dir.join(format!("{port}.cassette.yaml"));
            if path.exists() {
                return Err(format!("Cassette already exists: {}", path.display()));
            }
            let name = format!("{timestamp}-{port}");
            recorders.push(Arc::new(Mutex::new(CassetteRecorder::new(path, name, &commit))));
        }
        let tracker = recorders.pop().ok_or("recorder list is empty")?;
        let clock = recorders.pop().ok_or("recorder list is empty")?;

        Ok(Self { clock, tracker, output_dir: output_dir.to_path_buf() })
    }

    /// Finish all recorders and write cassette files to disk.
    ///
    /// Consumes the session and writes each port's cassette file.
    ///
    /// # Errors
    ///
    /// Returns an error if a recorder is still shared or a file cannot be written.
    pub fn finish(self) -> Result<PathBuf, String> {
        fn finish_one(arc: Arc<Mutex<CassetteRecorder>>, port: &str) -> Result<(), String> {
            let recorder = Arc::try_unwrap(arc)
                .map_err(|_| format!("Recording adapter for {port} still has references"))?
                .into_inner()
                .map_err(|e| format!("Recorder lock for {port} poisoned: {e}"))?;
            recorder.finish().map_err(|e| format!("Failed to write {port} cassette: {e}"))?;
            Ok(())
        }

        finish_one(self.clock, "clock")?;
        finish_one(self.tracker, "tracker")?;

        Ok(self.output_dir)
    }
}

/// Get the current git commit hash, or "unknown" with a warning if unavailable.
fn get_commit_hash() -> String {
    let hash = std::process::Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().to_string());

    hash.unwrap_or_else(|| {
        warn!("could not get git commit hash, using 'unknown'");
        "unknown".to_string()
    })
}
