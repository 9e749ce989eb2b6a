// Copyright (c) The railsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by railsync.

use crate::{case_id::CaseId, helpers::plural};
use camino::{Utf8Path, Utf8PathBuf};
use config::ConfigError;
use itertools::Itertools;
use miette::{Diagnostic, NamedSource, SourceSpan};
use railsync_metadata::remote::RunId;
use std::{error, fmt};
use thiserror::Error;

/// An error that occurred while parsing the config.
#[derive(Debug, Error)]
#[error("failed to parse railsync config at `{config_file}`")]
#[non_exhaustive]
pub struct ConfigParseError {
    config_file: Utf8PathBuf,
    #[source]
    kind: ConfigParseErrorKind,
}

impl ConfigParseError {
    pub(crate) fn new(config_file: impl Into<Utf8PathBuf>, kind: ConfigParseErrorKind) -> Self {
        Self {
            config_file: config_file.into(),
            kind,
        }
    }

    /// Returns the config file for this error.
    pub fn config_file(&self) -> &Utf8Path {
        &self.config_file
    }

    /// Returns the kind of error this is.
    pub fn kind(&self) -> &ConfigParseErrorKind {
        &self.kind
    }
}

/// The kind of error that occurred while parsing a config.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigParseErrorKind {
    /// An error occurred while building the config.
    #[error(transparent)]
    BuildError(Box<ConfigError>),

    /// An error occurred while deserializing the config.
    #[error("at `{}`: {}", .0.path(), .0.inner())]
    DeserializeError(Box<serde_path_to_error::Error<ConfigError>>),
}

/// Error returned while parsing a policy value from a string.
#[derive(Clone, Debug, Error)]
#[error(
    "unrecognized value for {option}: {input} (known values: {})",
    .known.join(", "),
)]
pub struct PolicyParseError {
    option: &'static str,
    input: String,
    known: &'static [&'static str],
}

impl PolicyParseError {
    pub(crate) fn new(
        option: &'static str,
        input: impl Into<String>,
        known: &'static [&'static str],
    ) -> Self {
        Self {
            option,
            input: input.into(),
            known,
        }
    }
}

/// A required sync parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum SyncParam {
    /// The directory containing report documents.
    ReportDir,

    /// The base URL of the remote service.
    Url,

    /// The username to authenticate as.
    Username,

    /// The API key to authenticate with.
    ApiKey,

    /// The project that new runs are created in.
    ProjectId,

    /// The suite that new runs draw cases from.
    SuiteId,
}

impl SyncParam {
    /// Returns all required parameters, in the order they are reported.
    pub fn all() -> &'static [Self] {
        &[
            Self::ReportDir,
            Self::Url,
            Self::Username,
            Self::ApiKey,
            Self::ProjectId,
            Self::SuiteId,
        ]
    }

    /// Returns the name of the parameter as used in config files and command-line options.
    pub fn option_name(self) -> &'static str {
        match self {
            Self::ReportDir => "report-dir",
            Self::Url => "url",
            Self::Username => "username",
            Self::ApiKey => "api-key",
            Self::ProjectId => "project-id",
            Self::SuiteId => "suite-id",
        }
    }
}

impl fmt::Display for SyncParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReportDir => write!(f, "report folder"),
            Self::Url => write!(f, "URL"),
            Self::Username => write!(f, "username"),
            Self::ApiKey => write!(f, "API key"),
            Self::ProjectId => write!(f, "project ID"),
            Self::SuiteId => write!(f, "suite ID"),
        }
    }
}

/// Some required sync parameters were not supplied.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error(
    "missing required {}: {}",
    plural::parameters_str(missing.len()),
    missing.iter().join(", "),
)]
pub struct MissingSyncParams {
    missing: Vec<SyncParam>,
}

impl MissingSyncParams {
    /// Creates a new `MissingSyncParams` from the parameters that were missing.
    pub fn new(missing: Vec<SyncParam>) -> Self {
        Self { missing }
    }

    /// Returns the missing parameters.
    pub fn missing(&self) -> &[SyncParam] {
        &self.missing
    }
}

/// An error that occurred while listing a report directory.
#[derive(Debug, Error)]
#[error("failed to read report directory `{dir}`")]
pub struct ReportDirError {
    dir: Utf8PathBuf,
    #[source]
    error: std::io::Error,
}

impl ReportDirError {
    pub(crate) fn new(dir: impl Into<Utf8PathBuf>, error: std::io::Error) -> Self {
        Self {
            dir: dir.into(),
            error,
        }
    }

    /// Returns the directory that could not be read.
    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }
}

/// An error that occurred while reading or parsing a single report file.
///
/// These errors are collected per file: a report that fails to parse does not prevent the other
/// reports in the same directory from being aggregated.
#[derive(Debug, Error, Diagnostic)]
pub enum ReportParseError {
    /// The report could not be read.
    #[error("failed to read report `{path}`")]
    Read {
        /// The path of the report.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: std::io::Error,
    },

    /// The report was not a valid report document.
    #[error("failed to parse report `{path}` at `{json_path}`")]
    Json {
        /// The path of the report.
        path: Utf8PathBuf,

        /// The JSON path at which parsing failed.
        json_path: String,

        /// The contents of the report.
        #[source_code]
        source_code: NamedSource<String>,

        /// The location of the failure, if it could be determined.
        #[label("parse error here")]
        span: Option<SourceSpan>,

        /// The underlying error.
        #[source]
        error: serde_json::Error,
    },
}

impl ReportParseError {
    /// Returns the path of the report this error is for.
    pub fn path(&self) -> &Utf8Path {
        match self {
            Self::Read { path, .. } | Self::Json { path, .. } => path,
        }
    }
}

/// An error that occurred while writing the CSV report.
#[derive(Debug, Error)]
#[error("failed to write CSV report to `{path}`")]
pub struct CsvWriteError {
    path: Utf8PathBuf,
    #[source]
    error: atomicwrites::Error<std::io::Error>,
}

impl CsvWriteError {
    pub(crate) fn new(
        path: impl Into<Utf8PathBuf>,
        error: atomicwrites::Error<std::io::Error>,
    ) -> Self {
        Self {
            path: path.into(),
            error,
        }
    }

    /// Returns the path that could not be written.
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

/// A case ID that cannot be represented as a remote case ID.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("case ID `C{case_id}` is too large to be a remote case ID")]
pub struct CaseIdRangeError {
    case_id: CaseId,
}

impl CaseIdRangeError {
    pub(crate) fn new(case_id: CaseId) -> Self {
        Self { case_id }
    }
}

/// An error returned by a [`RemoteClient`](crate::remote::RemoteClient).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RemoteError {
    /// The request could not be sent, or the response could not be received.
    #[error("request to `{url}` failed")]
    Transport {
        /// The URL of the request.
        url: String,

        /// The underlying error.
        #[source]
        error: Box<ureq::Error>,
    },

    /// The remote service responded with a non-success status.
    #[error("request to `{url}` returned HTTP {status}: {body}")]
    Status {
        /// The URL of the request.
        url: String,

        /// The HTTP status code.
        status: u16,

        /// The response body, typically a JSON object with an `error` field.
        body: String,
    },

    /// The response body could not be decoded.
    #[error("failed to decode response from `{url}` at `{json_path}`")]
    Decode {
        /// The URL of the request.
        url: String,

        /// The JSON path at which decoding failed.
        json_path: String,

        /// The underlying error.
        #[source]
        error: serde_json::Error,
    },

    /// Some other failure reported by a client implementation.
    #[error("{message}")]
    Other {
        /// A description of the failure.
        message: String,
    },
}

/// A step of the reconciliation protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReconcileStep {
    /// Creating a new run.
    CreateRun,

    /// Fetching the tests in the run before expanding its case set.
    FetchTests,

    /// Expanding the run's case set.
    UpdateRun,

    /// Fetching the tests in the run after expanding its case set.
    RefetchTests,

    /// Submitting results.
    SubmitResults,
}

impl fmt::Display for ReconcileStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateRun => write!(f, "creating run"),
            Self::FetchTests => write!(f, "fetching tests in run"),
            Self::UpdateRun => write!(f, "expanding case set of run"),
            Self::RefetchTests => write!(f, "fetching tests in expanded run"),
            Self::SubmitResults => write!(f, "submitting results"),
        }
    }
}

/// An error that occurred while reconciling results against a remote run.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReconcileError {
    /// A remote call failed. The client's error is preserved as the source.
    #[error("remote call failed while {step}")]
    Remote {
        /// The step that failed.
        step: ReconcileStep,

        /// The error returned by the client.
        #[source]
        error: RemoteError,
    },

    /// A case ID could not be converted to a remote case ID.
    #[error(transparent)]
    CaseIdRange(#[from] CaseIdRangeError),

    /// Some case IDs were not part of the run after its case set was expanded.
    #[error(
        "{} {} {} not part of run {run_id} after its case set was expanded: {}",
        case_ids.len(),
        plural::cases_str(case_ids.len()),
        plural::were_plural_if(case_ids.len() != 1),
        case_ids.iter().map(|case_id| format!("C{case_id}")).join(", "),
    )]
    UnmatchedCases {
        /// The run that was reconciled.
        run_id: RunId,

        /// The case IDs that could not be matched, in record order without duplicates.
        case_ids: Vec<CaseId>,
    },
}

impl ReconcileError {
    pub(crate) fn remote(step: ReconcileStep) -> impl FnOnce(RemoteError) -> Self {
        move |error| Self::Remote { step, error }
    }
}

/// An error that occurred while syncing a report directory to a remote run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The report directory could not be read.
    #[error(transparent)]
    ReportDir(#[from] ReportDirError),

    /// Reconciliation failed.
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
}

/// Displays an error along with its chain of causes.
pub struct DisplayErrorChain<E> {
    error: E,
}

impl<E: error::Error> DisplayErrorChain<E> {
    /// Creates a new `DisplayErrorChain`.
    pub fn new(error: E) -> Self {
        Self { error }
    }
}

impl<E> fmt::Display for DisplayErrorChain<E>
where
    E: error::Error,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        let mut current_error = self.error.source();
        while let Some(error) = current_error {
            write!(f, "\n  caused by:\n  - {error}")?;
            current_error = error.source();
        }

        Ok(())
    }
}
