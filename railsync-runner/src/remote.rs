// Copyright (c) The railsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Access to the remote test management service.
//!
//! The [`RemoteClient`] trait is the boundary between railsync and the service: the reconciler
//! only talks to the service through it. [`HttpRemoteClient`] implements it over HTTP for the
//! TestRail API v2.
//!
//! Clients are responsible for authentication and wire encoding. railsync does not retry failed
//! calls.

mod http;

pub use http::*;

use crate::errors::RemoteError;
use railsync_metadata::remote::{
    AddResultsRequest, AddRunRequest, ProjectId, RemoteTest, Run, RunId, UpdateRunRequest,
};

/// Operations on the remote service used during reconciliation.
pub trait RemoteClient {
    /// Creates a new run in `project_id`.
    fn create_run(
        &self,
        project_id: ProjectId,
        request: &AddRunRequest,
    ) -> Result<Run, RemoteError>;

    /// Returns every test in `run_id`.
    fn get_tests(&self, run_id: RunId) -> Result<Vec<RemoteTest>, RemoteError>;

    /// Updates the case set of `run_id`.
    fn update_run(&self, run_id: RunId, request: &UpdateRunRequest) -> Result<Run, RemoteError>;

    /// Adds results to `run_id`, returning the service's response verbatim.
    fn add_results(
        &self,
        run_id: RunId,
        request: &AddResultsRequest,
    ) -> Result<serde_json::Value, RemoteError>;
}

impl<T: RemoteClient + ?Sized> RemoteClient for &T {
    fn create_run(
        &self,
        project_id: ProjectId,
        request: &AddRunRequest,
    ) -> Result<Run, RemoteError> {
        (**self).create_run(project_id, request)
    }

    fn get_tests(&self, run_id: RunId) -> Result<Vec<RemoteTest>, RemoteError> {
        (**self).get_tests(run_id)
    }

    fn update_run(&self, run_id: RunId, request: &UpdateRunRequest) -> Result<Run, RemoteError> {
        (**self).update_run(run_id, request)
    }

    fn add_results(
        &self,
        run_id: RunId,
        request: &AddResultsRequest,
    ) -> Result<serde_json::Value, RemoteError> {
        (**self).add_results(run_id, request)
    }
}
