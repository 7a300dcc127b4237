//! `actionables resolve` command.

use crate::context::ServiceContext;
use crate::ports::Credentials;
use crate::resolve::{self, BlockedPolicy};

/// Execute the `resolve` command, printing the resolution as JSON.
///
/// # Errors
///
/// Returns an error string if the credentials are rejected or the tracker
/// cannot be reached.
pub fn run(
    ctx: &ServiceContext,
    url: &str,
    apikey: &str,
    policy: BlockedPolicy,
) -> Result<(), String> {
    println!("{}", render(ctx, url, apikey, policy)?);
    Ok(())
}

/// Resolve once and render the result as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error string if the credentials are rejected or the tracker
/// cannot be reached.
pub fn render(
    ctx: &ServiceContext,
    url: &str,
    apikey: &str,
    policy: BlockedPolicy,
) -> Result<String, String> {
    let credentials = Credentials::new(Some(url), Some(apikey)).map_err(|e| e.to_string())?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("Failed to start runtime: {e}"))?;

    let resolution = runtime
        .block_on(resolve::actionables(ctx, &credentials, policy))
        .map_err(|e| e.to_string())?;
    serde_json::to_string_pretty(&resolution).map_err(|e| format!("Failed to encode result: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cassette::config::CassetteConfig;

    #[test]
    fn empty_key_is_rejected_before_any_tracker_call() {
        // No cassette loaded: any port call would panic.
        let ctx = ServiceContext::replaying_from(&CassetteConfig::panic_on_unspecified()).unwrap();
        let err = render(&ctx, "https://rm.example.com", " ", BlockedPolicy::Annotate).unwrap_err();
        assert!(err.contains("API key must not be empty"));
    }
}
