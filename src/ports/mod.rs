//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the resolution engine and an
//! external system (time, issue tracker). Implementations live in
//! `src/adapters/`.

pub mod clock;
pub mod tracker;

pub use clock::Clock;
pub use tracker::{Credentials, Tracker, TrackerConnector, TrackerError, TrackerFuture};
