//! Cassette fixtures shared by the integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use serde_json::{json, Value};

use actionables::cassette::recorder::CassetteRecorder;

pub const BASE: &str = "https://rm.example.com/";

/// A snapshot exercising every exclusion rule for user 7 (member of group 70),
/// pinned to 2024-06-15:
///
/// - 10: plain candidate, actionable
/// - 11: assigned to the group, blocked by 12
/// - 12: someone else's open blocker
/// - 13: follows 12
/// - 14: parent of open 15
/// - 16: in closed project 2
/// - 17: starts 2030-01-01
/// - 18: related to 12, which has no scheduling meaning
pub fn snapshot_issues() -> Value {
    json!([
        {"id": 10, "assignee": 7, "project": 1, "subject": "Write docs",
         "description": "All of them", "done_ratio": 30, "due_date": "2024-07-01"},
        {"id": 11, "assignee": 70, "project": 1, "subject": "Ship",
         "relations": [{"kind": "blocked_by", "counterpart": 12}]},
        {"id": 12, "assignee": 99, "project": 1, "subject": "Review"},
        {"id": 13, "assignee": 7, "project": 1, "subject": "Deploy",
         "relations": [{"kind": "follows", "counterpart": 12}]},
        {"id": 14, "assignee": 7, "project": 1, "subject": "Epic"},
        {"id": 15, "assignee": 99, "parent": 14, "project": 1, "subject": "Story"},
        {"id": 16, "assignee": 7, "project": 2, "subject": "Old work"},
        {"id": 17, "assignee": 7, "project": 1, "subject": "Later",
         "start_date": "2030-01-01"},
        {"id": 18, "assignee": 7, "project": 1, "subject": "Related",
         "relations": [{"kind": "relates", "counterpart": 12}]}
    ])
}

fn input() -> Value {
    json!({"base": BASE})
}

/// Records one complete successful resolution run into `recorder`.
///
/// Projects are fetched in the order their first candidate appears: 1, then 2.
pub fn record_snapshot_run(recorder: &mut CassetteRecorder) {
    recorder.record("clock", "now", json!(null), json!("2024-06-15T08:00:00Z"));
    recorder.record(
        "tracker",
        "current_user",
        input(),
        json!({"Ok": {"id": 7, "name": "jdoe", "groups": [70]}}),
    );
    recorder.record("tracker", "open_issues", input(), json!({"Ok": snapshot_issues()}));
    recorder.record(
        "tracker",
        "project",
        json!({"base": BASE, "id": 1}),
        json!({"Ok": {"id": 1, "identifier": "core", "name": "Core",
                      "description": "Main", "status": "active"}}),
    );
    recorder.record(
        "tracker",
        "project",
        json!({"base": BASE, "id": 2}),
        json!({"Ok": {"id": 2, "identifier": "legacy", "name": "Legacy",
                      "description": "", "status": "closed"}}),
    );
}

/// Records a run where the tracker rejects the key on the bulk fetch.
pub fn record_unauthorized_run(recorder: &mut CassetteRecorder) {
    recorder.record("clock", "now", json!(null), json!("2024-06-15T08:00:00Z"));
    recorder.record(
        "tracker",
        "current_user",
        input(),
        json!({"Err": {"unauthorized": "Redmine rejected the API key (401)"}}),
    );
}

/// Creates a fresh directory under the system temp dir.
pub fn fresh_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Writes a cassette at `dir/name.cassette.yaml` filled by `fill`.
pub fn write_cassette(dir: &Path, name: &str, fill: impl FnOnce(&mut CassetteRecorder)) -> PathBuf {
    let path = dir.join(format!("{name}.cassette.yaml"));
    let mut recorder = CassetteRecorder::new(&path, name, "test");
    fill(&mut recorder);
    recorder.finish().expect("cassette should be written")
}
