// Copyright (c) The railsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reconciliation of result records against a remote run.
//!
//! Reconciliation happens in two phases:
//!
//! 1. **Membership sync.** The target run is resolved (created if necessary), its current case
//!    set is fetched, and the case set is expanded to the union of the current cases and every
//!    case named by a record. The run is then fetched again: the remote service only assigns a
//!    test ID to a case once the case is part of the run.
//! 2. **Result submission.** Each record is correlated with the test ID of its case and the
//!    results are submitted in a single batch.
//!
//! The case set of a run is only ever expanded, never shrunk.
//!
//! Reconciliation is not idempotent: running it twice against the same run submits every result
//! twice. Concurrent reconciliations against the same run may race while expanding the case set,
//! since each one computes the union from its own view of the run.

use crate::{
    case_id::CaseId,
    errors::{PolicyParseError, ReconcileError, ReconcileStep},
    helpers::plural,
    remote::RemoteClient,
    report::ResultRecord,
};
use indexmap::{IndexMap, IndexSet};
use railsync_metadata::{
    remote::{
        AddResultsRequest, AddRunRequest, ProjectId, RemoteCaseId, ResultEntry, RunId, StatusId,
        SuiteId, TestId, UpdateRunRequest,
    },
    report::TestState,
};
use serde::Deserialize;
use std::{fmt, str::FromStr};
use tracing::{debug, info, warn};

/// The run that results are reconciled against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunTarget {
    /// An existing run. The run is not checked for existence up front: if it doesn't exist, the
    /// first remote call fails.
    Existing(RunId),

    /// A new run, created in the given project and suite with an initially empty case set.
    New {
        /// The project to create the run in.
        project_id: ProjectId,

        /// The suite the run's cases come from.
        suite_id: SuiteId,

        /// The name of the run.
        name: String,
    },
}

/// What to do with a record whose case is not part of the run after its case set was expanded.
///
/// This happens when a report names a case that doesn't belong to the run's suite.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LookupMissPolicy {
    /// Collect every unmatched case and fail without submitting anything.
    #[default]
    Abort,

    /// Log a warning for each unmatched record and submit the rest.
    Skip,
}

impl LookupMissPolicy {
    /// Returns the string representations of the variants.
    pub fn variants() -> &'static [&'static str] {
        &["abort", "skip"]
    }
}

impl fmt::Display for LookupMissPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Abort => write!(f, "abort"),
            Self::Skip => write!(f, "skip"),
        }
    }
}

impl FromStr for LookupMissPolicy {
    type Err = PolicyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "abort" => Ok(Self::Abort),
            "skip" => Ok(Self::Skip),
            other => Err(PolicyParseError::new(
                "on-missing-case",
                other,
                Self::variants(),
            )),
        }
    }
}

/// Maps a local test state to a remote status: `passed` is passed, everything else is failed.
pub fn status_for(state: &TestState) -> StatusId {
    if state.is_passed() {
        StatusId::PASSED
    } else {
        StatusId::FAILED
    }
}

/// Options for a [`Reconciler`].
#[derive(Clone, Copy, Debug, Default)]
pub struct ReconcileOptions {
    /// What to do with records whose case is missing from the run.
    pub on_missing_case: LookupMissPolicy,
}

/// The membership of a run after its case set was expanded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunMembership {
    /// The run.
    pub run_id: RunId,

    /// The tests in the run, keyed by case, in the order the remote service returned them.
    pub tests: IndexMap<RemoteCaseId, TestId>,

    /// The number of cases in the run before its case set was expanded.
    pub known_before: usize,

    /// The number of cases the run was asked to contain.
    pub requested: usize,
}

impl RunMembership {
    /// Returns the test ID for `case_id`, if the case is part of the run.
    pub fn test_id(&self, case_id: RemoteCaseId) -> Option<TestId> {
        self.tests.get(&case_id).copied()
    }
}

/// Results ready to be submitted, produced by [`Reconciler::prepare_results`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PreparedResults {
    /// The request to submit.
    pub request: AddResultsRequest,

    /// Records that were skipped because their case is not part of the run.
    pub skipped: Vec<ResultRecord>,
}

/// A summary of a completed reconciliation.
#[derive(Clone, Debug, PartialEq)]
pub struct ReconcileSummary {
    /// The run that results were submitted to.
    pub run_id: RunId,

    /// True if the run was created by this reconciliation.
    pub created_run: bool,

    /// The number of cases in the run before its case set was expanded.
    pub known_before: usize,

    /// The number of cases in the run after its case set was expanded.
    pub known_after: usize,

    /// The number of results submitted.
    pub submitted: usize,

    /// The number of records skipped because their case is not part of the run.
    pub skipped: usize,

    /// The response to the submission, or `null` if there was nothing to submit.
    pub response: serde_json::Value,
}

/// Reconciles result records against a remote run through a [`RemoteClient`].
#[derive(Debug)]
pub struct Reconciler<C> {
    client: C,
    options: ReconcileOptions,
}

impl<C: RemoteClient> Reconciler<C> {
    /// Creates a new reconciler.
    pub fn new(client: C, options: ReconcileOptions) -> Self {
        Self { client, options }
    }

    /// Runs both phases of reconciliation against `target`.
    pub fn reconcile(
        &self,
        target: &RunTarget,
        records: &[ResultRecord],
    ) -> Result<ReconcileSummary, ReconcileError> {
        let run_id = self.resolve_run(target)?;
        let membership = self.sync_membership(run_id, records)?;
        let prepared = self.prepare_results(&membership, records)?;
        let response = self.submit(run_id, &prepared.request)?;

        Ok(ReconcileSummary {
            run_id,
            created_run: matches!(target, RunTarget::New { .. }),
            known_before: membership.known_before,
            known_after: membership.tests.len(),
            submitted: prepared.request.results.len(),
            skipped: prepared.skipped.len(),
            response,
        })
    }

    /// Returns the ID of the target run, creating the run if necessary.
    pub fn resolve_run(&self, target: &RunTarget) -> Result<RunId, ReconcileError> {
        match target {
            RunTarget::Existing(run_id) => Ok(*run_id),
            RunTarget::New {
                project_id,
                suite_id,
                name,
            } => {
                let request = AddRunRequest {
                    suite_id: *suite_id,
                    name: name.clone(),
                    include_all: false,
                    case_ids: Vec::new(),
                };
                let run = self
                    .client
                    .create_run(*project_id, &request)
                    .map_err(ReconcileError::remote(ReconcileStep::CreateRun))?;
                info!("created run {} ({name}) in project {project_id}", run.id);
                Ok(run.id)
            }
        }
    }

    /// Expands the case set of `run_id` so that it includes every case named by `records`, then
    /// returns the resulting membership.
    ///
    /// The run is asked to contain the cases it already had followed by the new ones, in record
    /// order. The run is updated even if no new cases were added.
    pub fn sync_membership(
        &self,
        run_id: RunId,
        records: &[ResultRecord],
    ) -> Result<RunMembership, ReconcileError> {
        let before = self
            .client
            .get_tests(run_id)
            .map_err(ReconcileError::remote(ReconcileStep::FetchTests))?;

        let mut case_ids: IndexSet<RemoteCaseId> =
            before.iter().map(|test| test.case_id).collect();
        let known_before = case_ids.len();
        for record in records {
            case_ids.insert(record.case_id.to_remote()?);
        }
        let requested = case_ids.len();
        debug!(
            "run {run_id} has {known_before} {}, expanding to {requested}",
            plural::cases_str(known_before),
        );

        let request = UpdateRunRequest {
            include_all: false,
            case_ids: case_ids.into_iter().collect(),
        };
        self.client
            .update_run(run_id, &request)
            .map_err(ReconcileError::remote(ReconcileStep::UpdateRun))?;

        let after = self
            .client
            .get_tests(run_id)
            .map_err(ReconcileError::remote(ReconcileStep::RefetchTests))?;
        let tests: IndexMap<_, _> = after.into_iter().map(|test| (test.case_id, test.id)).collect();

        Ok(RunMembership {
            run_id,
            tests,
            known_before,
            requested,
        })
    }

    /// Correlates each record with the test ID of its case.
    ///
    /// Records whose case is missing from `membership` are handled according to
    /// [`ReconcileOptions::on_missing_case`].
    pub fn prepare_results(
        &self,
        membership: &RunMembership,
        records: &[ResultRecord],
    ) -> Result<PreparedResults, ReconcileError> {
        let mut prepared = PreparedResults::default();
        let mut unmatched: IndexSet<CaseId> = IndexSet::new();

        for record in records {
            let case_id = record.case_id.to_remote()?;
            let Some(test_id) = membership.test_id(case_id) else {
                match self.options.on_missing_case {
                    LookupMissPolicy::Abort => {
                        unmatched.insert(record.case_id.clone());
                    }
                    LookupMissPolicy::Skip => {
                        warn!(
                            "case C{} is not part of run {}, skipping its result",
                            record.case_id, membership.run_id,
                        );
                        prepared.skipped.push(record.clone());
                    }
                }
                continue;
            };

            prepared.request.results.push(ResultEntry {
                test_id,
                status_id: status_for(&record.outcome),
                comment: record.error_detail.clone(),
            });
        }

        if !unmatched.is_empty() {
            return Err(ReconcileError::UnmatchedCases {
                run_id: membership.run_id,
                case_ids: unmatched.into_iter().collect(),
            });
        }

        Ok(prepared)
    }

    /// Submits `request` to `run_id` and returns the response.
    ///
    /// An empty batch is not submitted, and `null` is returned.
    pub fn submit(
        &self,
        run_id: RunId,
        request: &AddResultsRequest,
    ) -> Result<serde_json::Value, ReconcileError> {
        if request.results.is_empty() {
            info!("no results to submit to run {run_id}");
            return Ok(serde_json::Value::Null);
        }

        let response = self
            .client
            .add_results(run_id, request)
            .map_err(ReconcileError::remote(ReconcileStep::SubmitResults))?;
        info!(
            "submitted {} {} to run {run_id}",
            request.results.len(),
            plural::results_str(request.results.len()),
        );
        Ok(response)
    }
}
