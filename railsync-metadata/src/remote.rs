// Copyright (c) The railsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the TestRail API v2 endpoints used by railsync.
//!
//! Only the fields railsync reads or writes are modeled. Responses may carry many more fields,
//! which are ignored.

use serde::{Deserialize, Serialize};
use std::{fmt, num::ParseIntError, str::FromStr};

macro_rules! remote_id {
    ($(#[$attr:meta])* $name:ident) => {
        $(#[$attr])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse().map(Self)
            }
        }
    };
}

remote_id! {
    /// The ID of a project.
    ProjectId
}

remote_id! {
    /// The ID of a test suite within a project.
    SuiteId
}

remote_id! {
    /// The ID of a test run.
    RunId
}

remote_id! {
    /// The ID of a test: one case as included in one run.
    ///
    /// Results are submitted against test IDs, not case IDs.
    TestId
}

remote_id! {
    /// The ID of a test case, as known to the remote service.
    RemoteCaseId
}

/// A result status.
///
/// The remote service defines a larger vocabulary, but railsync only ever produces
/// [`StatusId::PASSED`] and [`StatusId::FAILED`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct StatusId(pub u32);

impl StatusId {
    /// The test passed.
    pub const PASSED: Self = Self(1);

    /// The test failed.
    pub const FAILED: Self = Self(5);
}

impl fmt::Display for StatusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A test run, as returned by `add_run` and `update_run`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Run {
    /// The ID of the run.
    pub id: RunId,

    /// The project the run belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectId>,

    /// The suite the run was created from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suite_id: Option<SuiteId>,

    /// The name of the run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Whether the run includes every case in its suite.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_all: Option<bool>,
}

/// A test within a run, as returned by `get_tests`.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct RemoteTest {
    /// The ID of the test.
    pub id: TestId,

    /// The case this test was created for.
    pub case_id: RemoteCaseId,
}

/// Request body for `add_run`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct AddRunRequest {
    /// The suite to create the run from.
    pub suite_id: SuiteId,

    /// The name of the run.
    pub name: String,

    /// Whether to include every case in the suite. railsync always sets this to false.
    pub include_all: bool,

    /// The cases to include.
    pub case_ids: Vec<RemoteCaseId>,
}

/// Request body for `update_run`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct UpdateRunRequest {
    /// Whether to include every case in the suite. railsync always sets this to false.
    pub include_all: bool,

    /// The full list of cases the run should include.
    pub case_ids: Vec<RemoteCaseId>,
}

/// A single result within an [`AddResultsRequest`].
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct ResultEntry {
    /// The test this result is for.
    pub test_id: TestId,

    /// The status of the result.
    pub status_id: StatusId,

    /// Free-form commentary, used for error details.
    pub comment: String,
}

/// Request body for `add_results`.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct AddResultsRequest {
    /// The results to add.
    pub results: Vec<ResultEntry>,
}

/// A response from `get_tests`.
///
/// Older servers return a bare array of tests. Newer servers return a page of tests with a link
/// to the next page.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum TestsPage {
    /// A paginated response.
    Paginated(PaginatedTests),

    /// A bare list of every test in the run.
    Bare(Vec<RemoteTest>),
}

impl TestsPage {
    /// Splits this page into its tests and the link to the next page, if any.
    pub fn into_parts(self) -> (Vec<RemoteTest>, Option<String>) {
        match self {
            Self::Paginated(page) => (page.tests, page.links.next),
            Self::Bare(tests) => (tests, None),
        }
    }
}

/// A paginated `get_tests` response.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct PaginatedTests {
    /// The offset of the first test in this page.
    #[serde(default)]
    pub offset: u64,

    /// The maximum number of tests in a page.
    #[serde(default)]
    pub limit: u64,

    /// The number of tests in this page.
    #[serde(default)]
    pub size: u64,

    /// Links to neighboring pages.
    #[serde(rename = "_links", default)]
    pub links: PageLinks,

    /// The tests in this page.
    pub tests: Vec<RemoteTest>,
}

/// Links to neighboring pages in a paginated response.
///
/// Links are relative to the API root, for example `/api/v2/get_tests/1&offset=250`.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct PageLinks {
    /// The next page, or `None` if this is the last page.
    #[serde(default)]
    pub next: Option<String>,

    /// The previous page, or `None` if this is the first page.
    #[serde(default)]
    pub prev: Option<String>,
}
