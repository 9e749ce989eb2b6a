// Copyright (c) The railsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::fixtures::{Call, FakeTestRail, now, sync_config};
use pretty_assertions::assert_eq;
use railsync_metadata::remote::{
    AddResultsRequest, AddRunRequest, ProjectId, RemoteCaseId, ResultEntry, RunId, StatusId,
    SuiteId, TestId, UpdateRunRequest,
};
use railsync_runner::{
    case_id::CaseId,
    config::SyncConfig,
    errors::{ReconcileError, ReconcileStep, RemoteError, SyncError},
    reconcile::{LookupMissPolicy, ReconcileSummary},
    report::DuplicatePolicy,
    sync::{SyncOutcome, sync_reports},
};
use serde_json::json;

const CHECKOUT_STACK: &str =
    "AssertionError: expected 'declined' to equal 'approved'\n    at checkout.spec.js:41:12";

fn sync(config: &SyncConfig, client: &FakeTestRail) -> Result<ReconcileSummary, SyncError> {
    match sync_reports(config, now(), |_| client)? {
        SyncOutcome::Submitted(summary) => Ok(summary),
        SyncOutcome::MissingParams(missing) => panic!("unexpected missing parameters: {missing}"),
    }
}

fn result(test_id: u64, status_id: StatusId, comment: &str) -> ResultEntry {
    ResultEntry {
        test_id: TestId(test_id),
        status_id,
        comment: comment.to_owned(),
    }
}

fn case_ids(ids: &[u64]) -> Vec<RemoteCaseId> {
    ids.iter().copied().map(RemoteCaseId).collect()
}

#[test]
fn new_run_from_basic_reports() {
    let client = FakeTestRail::new(RunId(42));
    let summary = sync(&sync_config("basic"), &client).expect("sync succeeded");

    assert_eq!(
        client.calls(),
        vec![
            Call::CreateRun(
                ProjectId(1),
                AddRunRequest {
                    suite_id: SuiteId(2),
                    name: "2026-10-17T08:30:00.000Z".to_owned(),
                    include_all: false,
                    case_ids: Vec::new(),
                }
            ),
            Call::GetTests(RunId(42)),
            Call::UpdateRun(
                RunId(42),
                UpdateRunRequest {
                    include_all: false,
                    case_ids: case_ids(&[100, 101]),
                }
            ),
            Call::GetTests(RunId(42)),
            Call::AddResults(
                RunId(42),
                AddResultsRequest {
                    results: vec![
                        result(5000, StatusId::FAILED, "boom"),
                        result(5001, StatusId::FAILED, "boom"),
                    ],
                }
            ),
        ]
    );
    assert_eq!(summary.run_id, RunId(42));
    assert!(summary.created_run);
    assert_eq!(summary.submitted, 2);
    assert_eq!(
        summary.response,
        json!([
            { "id": 9000, "test_id": 5000, "status_id": 5 },
            { "id": 9001, "test_id": 5001, "status_id": 5 },
        ])
    );
}

#[test]
fn named_run() {
    let client = FakeTestRail::new(RunId(42));
    let config = SyncConfig {
        run_name: Some("nightly".to_owned()),
        ..sync_config("basic")
    };
    sync(&config, &client).expect("sync succeeded");

    match &client.calls()[0] {
        Call::CreateRun(_, request) => assert_eq!(request.name, "nightly"),
        other => panic!("expected create_run first, found {other:?}"),
    }
}

#[test]
fn existing_run_with_mixed_reports() {
    let client = FakeTestRail::new(RunId(7)).with_run_cases([301, 50]);
    let config = SyncConfig {
        run_id: Some(RunId(7)),
        ..sync_config("mixed")
    };

    let summary = sync(&config, &client).expect("sync succeeded despite a broken report");

    let calls = client.calls();
    assert!(
        !calls.iter().any(|call| matches!(call, Call::CreateRun(..))),
        "existing run is reused"
    );
    // Known cases first, then new ones in record order. C300 appears twice, and under the
    // default policy its last occurrence (in checkout) is the one that's kept.
    assert_eq!(
        calls[1],
        Call::UpdateRun(
            RunId(7),
            UpdateRunRequest {
                include_all: false,
                case_ids: case_ids(&[301, 50, 302, 300, 303, 304]),
            }
        )
    );
    assert_eq!(
        client.submitted(),
        vec![AddResultsRequest {
            results: vec![
                result(5000, StatusId::PASSED, ""),
                result(5002, StatusId::FAILED, ""),
                result(5003, StatusId::FAILED, CHECKOUT_STACK),
                result(5004, StatusId::FAILED, CHECKOUT_STACK),
                result(5005, StatusId::PASSED, ""),
            ],
        }]
    );
    assert_eq!(summary.known_before, 2);
    assert_eq!(summary.known_after, 6);
    assert_eq!(summary.submitted, 5);
}

#[test]
fn keep_all_submits_duplicates() {
    let client = FakeTestRail::new(RunId(7));
    let config = SyncConfig {
        run_id: Some(RunId(7)),
        on_duplicate: Some(DuplicatePolicy::KeepAll),
        ..sync_config("mixed")
    };

    let summary = sync(&config, &client).expect("sync succeeded");
    assert_eq!(summary.submitted, 6);

    let test_300 = client.test_id(300).expect("case 300 is in the run");
    let submitted = client.submitted();
    let for_300: Vec<_> = submitted[0]
        .results
        .iter()
        .filter(|result| result.test_id == test_300)
        .map(|result| result.status_id)
        .collect();
    assert_eq!(for_300, [StatusId::PASSED, StatusId::FAILED]);
}

#[test]
fn cases_outside_suite_abort() {
    let client = FakeTestRail::new(RunId(7)).with_suite_cases([300, 301, 302, 303]);
    let config = SyncConfig {
        run_id: Some(RunId(7)),
        ..sync_config("mixed")
    };

    let error = sync(&config, &client).expect_err("C304 is not in the suite");
    match error {
        SyncError::Reconcile(ReconcileError::UnmatchedCases { run_id, case_ids }) => {
            assert_eq!(run_id, RunId(7));
            assert_eq!(case_ids, vec![CaseId::new("304")]);
        }
        other => panic!("expected unmatched cases, found {other:?}"),
    }
    assert_eq!(client.submitted(), Vec::new());
}

#[test]
fn cases_outside_suite_skipped() {
    let client = FakeTestRail::new(RunId(7)).with_suite_cases([300, 301, 302, 303]);
    let config = SyncConfig {
        run_id: Some(RunId(7)),
        on_missing_case: Some(LookupMissPolicy::Skip),
        ..sync_config("mixed")
    };

    let summary = sync(&config, &client).expect("unmatched cases are skipped");
    assert_eq!(summary.submitted, 4);
    assert_eq!(summary.skipped, 1);
}

#[test]
fn unknown_run_fails_on_first_fetch() {
    let client = FakeTestRail::new(RunId(7));
    let config = SyncConfig {
        run_id: Some(RunId(99)),
        ..sync_config("basic")
    };

    let error = sync(&config, &client).expect_err("run 99 does not exist");
    match error {
        SyncError::Reconcile(ReconcileError::Remote {
            step: ReconcileStep::FetchTests,
            error: RemoteError::Status { status, .. },
        }) => assert_eq!(status, 400),
        other => panic!("expected a failed fetch, found {other:?}"),
    }
    assert_eq!(client.calls(), vec![Call::GetTests(RunId(99))]);
}
