// Copyright (c) The railsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::RemoteClient;
use crate::errors::RemoteError;
use base64::Engine;
use debug_ignore::DebugIgnore;
use railsync_metadata::remote::{
    AddResultsRequest, AddRunRequest, ProjectId, RemoteTest, Run, RunId, TestsPage,
    UpdateRunRequest,
};
use serde::{Serialize, de::DeserializeOwned};
use std::time::Duration;
use tracing::{debug, warn};
use ureq::{Agent, Body, http::Response};

/// A [`RemoteClient`] that talks to a TestRail instance over HTTP.
///
/// Requests are authenticated with HTTP basic auth using a username and an API key. Calls block
/// until the response is received or the timeout elapses.
#[derive(Clone, Debug)]
pub struct HttpRemoteClient {
    api_root: String,
    authorization: DebugIgnore<String>,
    agent: DebugIgnore<Agent>,
}

impl HttpRemoteClient {
    /// The default timeout for a single request, including reading the response.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

    /// Creates a new client for the instance at `url`, for example `https://example.testrail.io`.
    pub fn new(url: &str, username: &str, api_key: &str, timeout: Duration) -> Self {
        let config = Agent::config_builder()
            .timeout_global(Some(timeout))
            // Error responses carry a JSON body with the reason, so read it rather than bailing.
            .http_status_as_error(false)
            .build();

        Self {
            api_root: api_root(url),
            authorization: DebugIgnore(basic_authorization(username, api_key)),
            agent: DebugIgnore(Agent::new_with_config(config)),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/v2/{path}", self.api_root)
    }

    fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T, RemoteError> {
        debug!("GET {url}");
        let response = self
            .agent
            .get(url)
            .header("Authorization", self.authorization.as_str())
            .call();
        read_response(url, response)
    }

    fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T, RemoteError> {
        debug!("POST {url}");
        let response = self
            .agent
            .post(url)
            .header("Authorization", self.authorization.as_str())
            .send_json(body);
        read_response(url, response)
    }
}

impl RemoteClient for HttpRemoteClient {
    fn create_run(
        &self,
        project_id: ProjectId,
        request: &AddRunRequest,
    ) -> Result<Run, RemoteError> {
        self.post(&self.endpoint(&format!("add_run/{project_id}")), request)
    }

    fn get_tests(&self, run_id: RunId) -> Result<Vec<RemoteTest>, RemoteError> {
        let first_url = self.endpoint(&format!("get_tests/{run_id}"));
        walk_pages(&self.api_root, first_url, |url| self.get(url))
    }

    fn update_run(&self, run_id: RunId, request: &UpdateRunRequest) -> Result<Run, RemoteError> {
        self.post(&self.endpoint(&format!("update_run/{run_id}")), request)
    }

    fn add_results(
        &self,
        run_id: RunId,
        request: &AddResultsRequest,
    ) -> Result<serde_json::Value, RemoteError> {
        self.post(&self.endpoint(&format!("add_results/{run_id}")), request)
    }
}

/// Collects the tests from every page of a `get_tests` response, starting at `first_url`.
///
/// `next` links are relative to `api_root`. The walk ends at a page without a `next` link, or at
/// a page whose `next` link points back to itself.
fn walk_pages<F>(
    api_root: &str,
    first_url: String,
    mut fetch: F,
) -> Result<Vec<RemoteTest>, RemoteError>
where
    F: FnMut(&str) -> Result<TestsPage, RemoteError>,
{
    let mut url = first_url;
    let mut tests = Vec::new();
    loop {
        let (page_tests, next) = fetch(&url)?.into_parts();
        tests.extend(page_tests);

        let Some(next) = next else {
            break;
        };
        let next_url = format!("{api_root}{next}");
        if next_url == url {
            warn!("page `{url}` links to itself as the next page, stopping");
            break;
        }
        url = next_url;
    }

    Ok(tests)
}

/// Returns the root that API paths and pagination links are appended to.
fn api_root(url: &str) -> String {
    format!("{}/index.php?", url.trim_end_matches('/'))
}

fn basic_authorization(username: &str, api_key: &str) -> String {
    let credentials =
        base64::engine::general_purpose::STANDARD.encode(format!("{username}:{api_key}"));
    format!("Basic {credentials}")
}

fn read_response<T: DeserializeOwned>(
    url: &str,
    response: Result<Response<Body>, ureq::Error>,
) -> Result<T, RemoteError> {
    let transport = |error| RemoteError::Transport {
        url: url.to_owned(),
        error: Box::new(error),
    };

    let mut response = response.map_err(transport)?;
    let status = response.status();
    let body = response.body_mut().read_to_string().map_err(transport)?;
    if !status.is_success() {
        return Err(RemoteError::Status {
            url: url.to_owned(),
            status: status.as_u16(),
            body,
        });
    }

    decode_json(url, &body)
}

fn decode_json<T: DeserializeOwned>(url: &str, body: &str) -> Result<T, RemoteError> {
    let mut deserializer = serde_json::Deserializer::from_str(body);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|error| RemoteError::Decode {
        url: url.to_owned(),
        json_path: error.path().to_string(),
        error: error.into_inner(),
    })
}
