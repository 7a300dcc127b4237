//! Replaying adapters that replay recorded interactions.

pub mod clock;
pub mod tracker;

use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;

use crate::cassette::replayer::CassetteReplayer;

pub use clock::ReplayingClock;
pub use tracker::{ReplayingConnector, ReplayingTracker};

/// Pull the next recorded output for `port::method`.
///
/// # Panics
///
/// Panics if no cassette is configured for the port, or if the cassette has
/// no further interactions for the method.
pub(crate) fn next_output(
    replayer: Option<&Arc<Mutex<CassetteReplayer>>>,
    port: &str,
    method: &str,
) -> serde_json::Value {
    let replayer = replayer.unwrap_or_else(|| {
        panic!("{port} port not configured in CassetteConfig - no cassette loaded for {method}")
    });
    let mut guard = replayer.lock().expect("replayer lock poisoned");
    guard.next_interaction(port, method).output.clone()
}

/// Decode a value recorded with `recording::record_result`.
///
/// # Panics
///
/// Panics if the recorded output is neither `{"Ok": ..}` nor `{"Err": ..}`,
/// or if its payload does not match the expected types.
pub(crate) fn replay_result<T, E>(output: serde_json::Value) -> Result<T, E>
where
    T: DeserializeOwned,
    E: DeserializeOwned,
{
    if let Some(err) = output.get("Err") {
        let err = serde_json::from_value(err.clone())
            .unwrap_or_else(|e| panic!("cassette Err payload does not deserialize: {e}"));
        return Err(err);
    }
    let ok = output
        .get("Ok")
        .unwrap_or_else(|| panic!("cassette output is neither Ok nor Err: {output}"));
    Ok(serde_json::from_value(ok.clone())
        .unwrap_or_else(|e| panic!("cassette Ok payload does not deserialize: {e}")))
}
