// Copyright (c) The railsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for syncing reports to a remote run.
//!
//! Configuration comes from a TOML file (by default `railsync.toml` in the current directory)
//! and from the command line or environment. [`SyncConfig::merge`] layers the latter on top of
//! the former, and [`SyncConfig::validate`] checks that every required parameter is present.

use crate::{
    errors::{ConfigParseError, ConfigParseErrorKind, MissingSyncParams, SyncParam},
    reconcile::LookupMissPolicy,
    remote::HttpRemoteClient,
    report::DuplicatePolicy,
};
use camino::{Utf8Path, Utf8PathBuf};
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, builder::DefaultState};
use railsync_metadata::remote::{ProjectId, RunId, SuiteId};
use serde::Deserialize;
use std::{collections::BTreeSet, fmt, time::Duration};
use tracing::{debug, warn};

/// Sync parameters, any of which may be unset.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SyncConfig {
    /// The directory containing report documents.
    pub report_dir: Option<Utf8PathBuf>,

    /// The base URL of the remote service.
    pub url: Option<String>,

    /// The username to authenticate as.
    pub username: Option<String>,

    /// The API key to authenticate with.
    pub api_key: Option<String>,

    /// The project that new runs are created in.
    pub project_id: Option<ProjectId>,

    /// The suite that new runs draw cases from.
    pub suite_id: Option<SuiteId>,

    /// An existing run to reconcile against. If unset, a new run is created.
    pub run_id: Option<RunId>,

    /// The name of a newly created run.
    pub run_name: Option<String>,

    /// What to do with duplicate case IDs.
    pub on_duplicate: Option<DuplicatePolicy>,

    /// What to do with cases that are missing from the run.
    pub on_missing_case: Option<LookupMissPolicy>,

    /// The timeout for each remote request.
    pub timeout: Option<Duration>,
}

impl fmt::Debug for SyncConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncConfig")
            .field("report_dir", &self.report_dir)
            .field("url", &self.url)
            .field("username", &self.username)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("project_id", &self.project_id)
            .field("suite_id", &self.suite_id)
            .field("run_id", &self.run_id)
            .field("run_name", &self.run_name)
            .field("on_duplicate", &self.on_duplicate)
            .field("on_missing_case", &self.on_missing_case)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl SyncConfig {
    /// The default location of the config file, relative to the current directory.
    pub const CONFIG_PATH: &'static str = "railsync.toml";

    /// Reads the config file.
    ///
    /// If `config_file` is given, it must exist. Otherwise `railsync.toml` in `cwd` is read if it
    /// exists, and an empty config is returned if it doesn't. A relative `report-dir` is resolved
    /// against the directory containing the config file.
    ///
    /// Unknown keys are logged as warnings.
    pub fn from_file(
        config_file: Option<&Utf8Path>,
        cwd: &Utf8Path,
    ) -> Result<Self, ConfigParseError> {
        let (config_file, source) = match config_file {
            Some(file) => (file.to_owned(), File::new(file.as_str(), FileFormat::Toml)),
            None => {
                let config_file = cwd.join(Self::CONFIG_PATH);
                let source = File::new(config_file.as_str(), FileFormat::Toml).required(false);
                (config_file, source)
            }
        };
        debug!("reading config from {config_file}");

        let builder = Config::builder().add_source(source);
        let (deserialized, ignored) = build_and_deserialize_config(&builder)
            .map_err(|kind| ConfigParseError::new(&config_file, kind))?;

        for path in ignored {
            warn!("in config file {config_file}, ignoring unknown configuration key `{path}`");
        }

        let config_dir = config_file.parent().unwrap_or(cwd);
        Ok(deserialized.into_sync_config(config_dir))
    }

    /// Returns a config where each field set in `overrides` replaces the field in `self`.
    pub fn merge(self, overrides: SyncConfig) -> SyncConfig {
        SyncConfig {
            report_dir: overrides.report_dir.or(self.report_dir),
            url: overrides.url.or(self.url),
            username: overrides.username.or(self.username),
            api_key: overrides.api_key.or(self.api_key),
            project_id: overrides.project_id.or(self.project_id),
            suite_id: overrides.suite_id.or(self.suite_id),
            run_id: overrides.run_id.or(self.run_id),
            run_name: overrides.run_name.or(self.run_name),
            on_duplicate: overrides.on_duplicate.or(self.on_duplicate),
            on_missing_case: overrides.on_missing_case.or(self.on_missing_case),
            timeout: overrides.timeout.or(self.timeout),
        }
    }

    /// Checks that every required parameter is set, filling in defaults for the rest.
    ///
    /// Empty strings count as unset.
    pub fn validate(&self) -> Result<ValidatedSyncConfig, MissingSyncParams> {
        let report_dir = self
            .report_dir
            .as_ref()
            .filter(|dir| !dir.as_str().is_empty());
        let url = non_empty(&self.url);
        let username = non_empty(&self.username);
        let api_key = non_empty(&self.api_key);

        match (
            report_dir,
            url,
            username,
            api_key,
            self.project_id,
            self.suite_id,
        ) {
            (
                Some(report_dir),
                Some(url),
                Some(username),
                Some(api_key),
                Some(project_id),
                Some(suite_id),
            ) => Ok(ValidatedSyncConfig {
                report_dir: report_dir.clone(),
                url: url.to_owned(),
                username: username.to_owned(),
                api_key: api_key.to_owned(),
                project_id,
                suite_id,
                run_id: self.run_id,
                run_name: non_empty(&self.run_name).map(str::to_owned),
                on_duplicate: self.on_duplicate.unwrap_or_default(),
                on_missing_case: self.on_missing_case.unwrap_or_default(),
                timeout: self.timeout.unwrap_or(HttpRemoteClient::DEFAULT_TIMEOUT),
            }),
            (report_dir, url, username, api_key, project_id, suite_id) => {
                let present = [
                    report_dir.is_some(),
                    url.is_some(),
                    username.is_some(),
                    api_key.is_some(),
                    project_id.is_some(),
                    suite_id.is_some(),
                ];
                let missing = SyncParam::all()
                    .iter()
                    .zip(present)
                    .filter_map(|(param, present)| (!present).then_some(*param))
                    .collect();
                Err(MissingSyncParams::new(missing))
            }
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.is_empty())
}

/// A [`SyncConfig`] with every required parameter present.
#[derive(Clone, PartialEq, Eq)]
pub struct ValidatedSyncConfig {
    /// The directory containing report documents.
    pub report_dir: Utf8PathBuf,

    /// The base URL of the remote service.
    pub url: String,

    /// The username to authenticate as.
    pub username: String,

    /// The API key to authenticate with.
    pub api_key: String,

    /// The project that new runs are created in.
    pub project_id: ProjectId,

    /// The suite that new runs draw cases from.
    pub suite_id: SuiteId,

    /// An existing run to reconcile against.
    pub run_id: Option<RunId>,

    /// The name of a newly created run, if one was supplied.
    pub run_name: Option<String>,

    /// What to do with duplicate case IDs.
    pub on_duplicate: DuplicatePolicy,

    /// What to do with cases that are missing from the run.
    pub on_missing_case: LookupMissPolicy,

    /// The timeout for each remote request.
    pub timeout: Duration,
}

impl fmt::Debug for ValidatedSyncConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatedSyncConfig")
            .field("report_dir", &self.report_dir)
            .field("url", &self.url)
            .field("username", &self.username)
            .field("api_key", &"[REDACTED]")
            .field("project_id", &self.project_id)
            .field("suite_id", &self.suite_id)
            .field("run_id", &self.run_id)
            .field("run_name", &self.run_name)
            .field("on_duplicate", &self.on_duplicate)
            .field("on_missing_case", &self.on_missing_case)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct SyncConfigDeserialize {
    #[serde(default)]
    report_dir: Option<Utf8PathBuf>,
    #[serde(default)]
    testrail: TestRailConfigDeserialize,
    #[serde(default)]
    policy: PolicyConfigDeserialize,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct TestRailConfigDeserialize {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    api_key: Option<String>,
    #[serde(default)]
    project_id: Option<ProjectId>,
    #[serde(default)]
    suite_id: Option<SuiteId>,
    #[serde(default)]
    run_id: Option<RunId>,
    #[serde(default)]
    run_name: Option<String>,
    #[serde(default, with = "humantime_serde")]
    timeout: Option<Duration>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct PolicyConfigDeserialize {
    #[serde(default)]
    on_duplicate: Option<DuplicatePolicy>,
    #[serde(default)]
    on_missing_case: Option<LookupMissPolicy>,
}

impl SyncConfigDeserialize {
    fn into_sync_config(self, config_dir: &Utf8Path) -> SyncConfig {
        let Self {
            report_dir,
            testrail,
            policy,
        } = self;

        SyncConfig {
            report_dir: report_dir.map(|dir| config_dir.join(dir)),
            url: testrail.url,
            username: testrail.username,
            api_key: testrail.api_key,
            project_id: testrail.project_id,
            suite_id: testrail.suite_id,
            run_id: testrail.run_id,
            run_name: testrail.run_name,
            on_duplicate: policy.on_duplicate,
            on_missing_case: policy.on_missing_case,
            timeout: testrail.timeout,
        }
    }
}

/// Returns the deserialized config along with the paths of ignored keys.
fn build_and_deserialize_config(
    builder: &ConfigBuilder<DefaultState>,
) -> Result<(SyncConfigDeserialize, BTreeSet<String>), ConfigParseErrorKind> {
    let config = builder
        .build_cloned()
        .map_err(|error| ConfigParseErrorKind::BuildError(Box::new(error)))?;

    let mut ignored = BTreeSet::new();
    let mut cb = |path: serde_ignored::Path| {
        ignored.insert(path.to_string());
    };
    let ignored_de = serde_ignored::Deserializer::new(config, &mut cb);
    let config: SyncConfigDeserialize =
        serde_path_to_error::deserialize(ignored_de).map_err(|error| {
            // The config crate also reports the key, so drop it in favor of the path.
            let path = error.path().clone();
            let error = match error.into_inner() {
                ConfigError::At { error, .. } => *error,
                other => other,
            };
            ConfigParseErrorKind::DeserializeError(Box::new(serde_path_to_error::Error::new(
                path, error,
            )))
        })?;

    Ok((config, ignored))
}
