//! Service context bundling all port trait objects.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::adapters::live::clock::LiveClock;
use crate::adapters::live::redmine::LiveRedmineConnector;
use crate::adapters::recording::{RecordingClock, RecordingConnector};
use crate::adapters::replaying::{ReplayingClock, ReplayingConnector};
use crate::cassette::config::CassetteConfig;
use crate::cassette::replayer::CassetteReplayer;
use crate::cassette::session::RecordingSession;
use crate::ports::{Clock, TrackerConnector};

/// Bundles all port trait objects into a single context.
///
/// Each field provides access to one external boundary. Constructors
/// wire up different adapter implementations (live, replaying, recording).
pub struct ServiceContext {
    /// Clock supplying the pivot date of each run.
    pub clock: Box<dyn Clock>,
    /// Opens tracker sessions for a set of credentials.
    pub connector: Box<dyn TrackerConnector>,
}

impl ServiceContext {
    /// Creates a live context talking to real Redmine servers.
    #[must_use]
    pub fn live() -> Self {
        Self { clock: Box::new(LiveClock), connector: Box::new(LiveRedmineConnector::new()) }
    }

    /// Creates a recording context that captures every port interaction into
    /// per-port cassettes under `dir`.
    ///
    /// The returned session must be finished after the context is dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the recording session cannot be created.
    pub fn recording_at(dir: PathBuf) -> Result<(Self, RecordingSession), String> {
        let session = RecordingSession::new(&dir)?;
        let ctx = Self {
            clock: Box::new(RecordingClock::new(Box::new(LiveClock), Arc::clone(&session.clock))),
            connector: Box::new(RecordingConnector::new(
                Box::new(LiveRedmineConnector::new()),
                Arc::clone(&session.tracker),
            )),
        };
        Ok((ctx, session))
    }

    /// Creates a replaying context from a monolithic cassette file.
    ///
    /// Each port gets its own replayer from the same cassette so that
    /// per-port cursors are independent.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be read or parsed.
    pub fn replaying(path: &Path) -> Result<Self, String> {
        let cassette = CassetteConfig::load_cassette(path)?;
        let replayer = || Arc::new(Mutex::new(CassetteReplayer::new(&cassette)));

        Ok(Self {
            clock: Box::new(ReplayingClock::new(replayer())),
            connector: Box::new(ReplayingConnector::new(replayer())),
        })
    }

    /// Creates a replaying context from per-port cassette files.
    ///
    /// Ports without a configured cassette panic with a clear message when
    /// called.
    ///
    /// # Errors
    ///
    /// Returns an error if any configured cassette file cannot be read or parsed.
    pub fn replaying_from(config: &CassetteConfig) -> Result<Self, String> {
        let replayers = config.load_all()?;

        Ok(Self {
            clock: Box::new(match replayers.clock {
                Some(r) => ReplayingClock::new(r),
                None => ReplayingClock::unconfigured(),
            }),
            connector: Box::new(match replayers.tracker {
                Some(r) => ReplayingConnector::new(r),
                None => ReplayingConnector::unconfigured(),
            }),
        })
    }
}
