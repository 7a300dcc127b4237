//! Full resolutions replayed from cassettes.
//!
//! Each test records a tracker snapshot with `CassetteRecorder`, replays it
//! through `ServiceContext::replaying()`, and checks the resolution.

mod common;

use actionables::context::ServiceContext;
use actionables::error::ResolveError;
use actionables::ports::Credentials;
use actionables::resolve::{self, BlockedPolicy, Resolution};

use common::{fresh_dir, record_snapshot_run, record_unauthorized_run, write_cassette, BASE};

fn credentials() -> Credentials {
    Credentials::new(Some("https://rm.example.com"), Some("secret")).unwrap()
}

async fn replay(ctx: &ServiceContext, policy: BlockedPolicy) -> Result<Resolution, ResolveError> {
    resolve::actionables(ctx, &credentials(), policy).await
}

#[tokio::test]
async fn snapshot_resolves_every_exclusion_rule() {
    let dir = fresh_dir("actionables_replay_snapshot");
    let path = write_cassette(&dir, "snapshot", record_snapshot_run);

    let ctx = ServiceContext::replaying(&path).unwrap();
    let resolution = replay(&ctx, BlockedPolicy::Annotate).await.unwrap();

    assert_eq!(resolution.actionable, vec![10, 18]);
    assert_eq!(resolution.blocked, vec![11]);
    assert_eq!(resolution.deferred, vec![17]);
    assert_eq!(resolution.issues.keys().copied().collect::<Vec<_>>(), vec![10, 11, 18]);
    assert_eq!(resolution.projects.keys().copied().collect::<Vec<_>>(), vec![1]);

    assert_eq!(resolution.tracker.kind, "redmine");
    assert_eq!(resolution.tracker.uri, BASE);
    assert_eq!(resolution.tracker.user_local_id, 7);
    assert_eq!(resolution.tracker.user_name, "jdoe");

    let docs = &resolution.issues[&10];
    assert_eq!(docs.uri, "https://rm.example.com/issues/10");
    assert_eq!(docs.description, "All of them");
    assert_eq!(docs.percent_done, 30);
    assert_eq!(docs.deadline.map(|d| d.to_string()).as_deref(), Some("2024-07-01"));
    assert_eq!(docs.project_local_id, Some(1));
    assert!(docs.blocked_by.is_none());

    let ship = &resolution.issues[&11];
    assert_eq!(ship.blocked_by, Some(vec![12]));
    assert_eq!(ship.description, "");
    assert_eq!(ship.percent_done, 0);

    let core = &resolution.projects[&1];
    assert_eq!(core.uri, "https://rm.example.com/projects/core");
    assert_eq!(core.status, "active");

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn exclude_policy_drops_blocked_candidates() {
    let dir = fresh_dir("actionables_replay_exclude");
    let path = write_cassette(&dir, "snapshot", record_snapshot_run);

    let ctx = ServiceContext::replaying(&path).unwrap();
    let resolution = replay(&ctx, BlockedPolicy::Exclude).await.unwrap();

    assert_eq!(resolution.actionable, vec![10, 18]);
    assert!(resolution.blocked.is_empty());
    assert!(!resolution.issues.contains_key(&11));

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn replays_are_byte_identical() {
    let dir = fresh_dir("actionables_replay_determinism");
    let path = write_cassette(&dir, "snapshot", record_snapshot_run);

    let first = replay(&ServiceContext::replaying(&path).unwrap(), BlockedPolicy::Annotate)
        .await
        .unwrap();
    let second = replay(&ServiceContext::replaying(&path).unwrap(), BlockedPolicy::Annotate)
        .await
        .unwrap();

    assert_eq!(
        serde_json::to_string_pretty(&first).unwrap(),
        serde_json::to_string_pretty(&second).unwrap(),
        "determinism: resolutions differ between replays"
    );

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn rejected_key_surfaces_as_permission_denied() {
    let dir = fresh_dir("actionables_replay_unauthorized");
    let path = write_cassette(&dir, "unauthorized", record_unauthorized_run);

    let ctx = ServiceContext::replaying(&path).unwrap();
    let err = replay(&ctx, BlockedPolicy::Annotate).await.unwrap_err();
    assert_eq!(err, ResolveError::PermissionDenied("Redmine rejected the API key (401)".into()));
    assert_eq!(err.status_code().as_u16(), 403);

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn output_round_trips_through_json() {
    let dir = fresh_dir("actionables_replay_json");
    let path = write_cassette(&dir, "snapshot", record_snapshot_run);

    let ctx = ServiceContext::replaying(&path).unwrap();
    let resolution = replay(&ctx, BlockedPolicy::Annotate).await.unwrap();

    let value = serde_json::to_value(&resolution).unwrap();
    assert_eq!(value["tracker"]["type"], "redmine");
    assert_eq!(value["issues"]["11"]["blocked_by"], serde_json::json!([12]));
    assert!(value["issues"]["10"].get("blocked_by").is_none());
    assert!(value["projects"].get("2").is_none());

    let _ = std::fs::remove_dir_all(&dir);
}
