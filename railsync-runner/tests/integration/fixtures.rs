// Copyright (c) The railsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, TimeZone, Utc};
use indexmap::IndexMap;
use railsync_metadata::remote::{
    AddResultsRequest, AddRunRequest, ProjectId, RemoteCaseId, RemoteTest, Run, RunId, SuiteId,
    TestId, UpdateRunRequest,
};
use railsync_runner::{config::SyncConfig, errors::RemoteError, remote::RemoteClient};
use serde_json::json;
use std::{collections::BTreeSet, sync::Mutex};

/// Returns the path to a directory of fixture reports.
pub(crate) fn reports_dir(name: &str) -> Utf8PathBuf {
    Utf8Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../fixtures/reports")
        .join(name)
}

pub(crate) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 17, 8, 30, 0).unwrap()
}

pub(crate) fn sync_config(report_dir: &str) -> SyncConfig {
    SyncConfig {
        report_dir: Some(reports_dir(report_dir)),
        url: Some("https://example.testrail.io".to_owned()),
        username: Some("ci@example.com".to_owned()),
        api_key: Some("secret".to_owned()),
        project_id: Some(ProjectId(1)),
        suite_id: Some(SuiteId(2)),
        ..SyncConfig::default()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Call {
    CreateRun(ProjectId, AddRunRequest),
    GetTests(RunId),
    UpdateRun(RunId, UpdateRunRequest),
    AddResults(RunId, AddResultsRequest),
}

/// An in-memory TestRail instance holding a single run.
#[derive(Debug)]
pub(crate) struct FakeTestRail {
    run_id: RunId,
    calls: Mutex<Vec<Call>>,
    tests: Mutex<IndexMap<RemoteCaseId, TestId>>,
    suite_cases: Option<BTreeSet<RemoteCaseId>>,
}

impl FakeTestRail {
    /// Creates an instance whose run will be created with ID `run_id`.
    pub(crate) fn new(run_id: RunId) -> Self {
        Self {
            run_id,
            calls: Mutex::new(Vec::new()),
            tests: Mutex::new(IndexMap::new()),
            suite_cases: None,
        }
    }

    /// Restricts the cases that can be added to the run.
    pub(crate) fn with_suite_cases(mut self, cases: impl IntoIterator<Item = u64>) -> Self {
        self.suite_cases = Some(cases.into_iter().map(RemoteCaseId).collect());
        self
    }

    /// Adds cases to the run up front.
    pub(crate) fn with_run_cases(self, cases: impl IntoIterator<Item = u64>) -> Self {
        for case in cases {
            self.add_case(RemoteCaseId(case));
        }
        self
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn submitted(&self) -> Vec<AddResultsRequest> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::AddResults(_, request) => Some(request),
                _ => None,
            })
            .collect()
    }

    /// Returns the test ID for a case, if it's part of the run.
    pub(crate) fn test_id(&self, case: u64) -> Option<TestId> {
        self.tests.lock().unwrap().get(&RemoteCaseId(case)).copied()
    }

    fn add_case(&self, case_id: RemoteCaseId) {
        let mut tests = self.tests.lock().unwrap();
        let next = TestId(5000 + tests.len() as u64);
        tests.entry(case_id).or_insert(next);
    }

    fn check_run(&self, run_id: RunId) -> Result<(), RemoteError> {
        if run_id == self.run_id {
            Ok(())
        } else {
            Err(RemoteError::Status {
                url: format!("https://example.testrail.io/index.php?/api/v2/get_tests/{run_id}"),
                status: 400,
                body: r#"{"error":"Field :run_id is not a valid test run."}"#.to_owned(),
            })
        }
    }
}

impl RemoteClient for FakeTestRail {
    fn create_run(
        &self,
        project_id: ProjectId,
        request: &AddRunRequest,
    ) -> Result<Run, RemoteError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::CreateRun(project_id, request.clone()));
        Ok(Run {
            id: self.run_id,
            project_id: Some(project_id),
            suite_id: Some(request.suite_id),
            name: Some(request.name.clone()),
            include_all: Some(request.include_all),
        })
    }

    fn get_tests(&self, run_id: RunId) -> Result<Vec<RemoteTest>, RemoteError> {
        self.calls.lock().unwrap().push(Call::GetTests(run_id));
        self.check_run(run_id)?;
        Ok(self
            .tests
            .lock()
            .unwrap()
            .iter()
            .map(|(&case_id, &id)| RemoteTest { id, case_id })
            .collect())
    }

    fn update_run(&self, run_id: RunId, request: &UpdateRunRequest) -> Result<Run, RemoteError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::UpdateRun(run_id, request.clone()));
        self.check_run(run_id)?;
        for case_id in &request.case_ids {
            let in_suite = self
                .suite_cases
                .as_ref()
                .is_none_or(|cases| cases.contains(case_id));
            if in_suite {
                self.add_case(*case_id);
            }
        }
        Ok(Run {
            id: run_id,
            project_id: None,
            suite_id: None,
            name: None,
            include_all: Some(request.include_all),
        })
    }

    fn add_results(
        &self,
        run_id: RunId,
        request: &AddResultsRequest,
    ) -> Result<serde_json::Value, RemoteError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::AddResults(run_id, request.clone()));
        self.check_run(run_id)?;
        Ok(json!(
            request
                .results
                .iter()
                .enumerate()
                .map(|(index, result)| json!({
                    "id": 9000 + index,
                    "test_id": result.test_id,
                    "status_id": result.status_id,
                }))
                .collect::<Vec<_>>()
        ))
    }
}
