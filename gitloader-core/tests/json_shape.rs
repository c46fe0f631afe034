//! JSON shape of the values the CLI prints with `--json`.
//!
//! Front-ends parse these lines, so the tags and field names are part of the
//! external interface.

use gitloader_core::{
    CloneOutcome, FailureKind, Severity, StatusEvent, SyncOutcome, SyncPhase,
};
use rstest::rstest;
use serde_json::{json, Value};

// ---------------------------------------------------------------------------
// Sync outcomes
// ---------------------------------------------------------------------------

#[rstest]
#[case(
    SyncOutcome::Pushed { commit_message: "Pushed folder proj via Git Loader".into() },
    json!({"outcome": "pushed", "commit_message": "Pushed folder proj via Git Loader"})
)]
#[case(SyncOutcome::NoChanges, json!({"outcome": "no_changes"}))]
#[case(
    SyncOutcome::Failed { kind: FailureKind::Tool, detail: "fatal: repository not found".into() },
    json!({"outcome": "failed", "kind": "tool", "detail": "fatal: repository not found"})
)]
#[case(
    SyncOutcome::Failed { kind: FailureKind::InvalidInput, detail: "nested".into() },
    json!({"outcome": "failed", "kind": "invalid_input", "detail": "nested"})
)]
fn sync_outcome_json(#[case] outcome: SyncOutcome, #[case] expected: Value) {
    let value = serde_json::to_value(&outcome).expect("serialize");
    assert_eq!(value, expected);
}

#[test]
fn clone_outcome_json() {
    let ok = serde_json::to_value(CloneOutcome::Succeeded {
        destination: "/tmp/out".into(),
    })
    .unwrap();
    assert_eq!(ok, json!({"outcome": "succeeded", "destination": "/tmp/out"}));

    let failed = serde_json::to_value(CloneOutcome::Failed {
        detail: "fatal: could not read".into(),
    })
    .unwrap();
    assert_eq!(failed["outcome"], "failed");
}

// ---------------------------------------------------------------------------
// Status events
// ---------------------------------------------------------------------------

#[rstest]
#[case(SyncPhase::Cloning, "cloning", "info")]
#[case(SyncPhase::ConfiguringIdentity, "configuring_identity", "info")]
#[case(SyncPhase::NoChange, "no_change", "info")]
#[case(SyncPhase::Done, "done", "success")]
fn status_event_json(#[case] phase: SyncPhase, #[case] tag: &str, #[case] severity: &str) {
    let event = StatusEvent::enter(phase);
    let value = serde_json::to_value(&event).expect("serialize");
    assert_eq!(value["phase"], tag);
    assert_eq!(value["severity"], severity);
    assert_eq!(value["message"], phase.label());
    assert!(value["at"].is_string(), "timestamp serialized as RFC 3339");
}

#[test]
fn failed_event_uses_kind_headline() {
    let event = StatusEvent::failed(FailureKind::Tool);
    assert_eq!(event.phase, SyncPhase::Failed);
    assert_eq!(event.severity, Severity::Error);
    assert_eq!(event.message, "Git error occurred.");
}
