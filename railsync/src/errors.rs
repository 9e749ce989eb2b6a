// Copyright (c) The railsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::output::{NO_HEADING, StderrStyles};
use owo_colors::OwoColorize;
use railsync_metadata::RailsyncExitCode;
use railsync_runner::errors::*;
use std::error::Error;
use swrite::{SWrite, swrite};
use thiserror::Error;
use tracing::error;

pub(crate) type Result<T, E = ExpectedError> = std::result::Result<T, E>;

// Note that the #[error()] strings are mostly placeholder messages -- the expected way to print out
// errors is with the display_to_stderr method, which colorizes errors.

/// An error that railsync anticipates and reports with a dedicated exit code.
#[derive(Debug, Error)]
#[doc(hidden)]
pub enum ExpectedError {
    #[error("could not determine current directory")]
    CurrentDirError {
        #[source]
        err: std::io::Error,
    },
    #[error("config parse error")]
    ConfigParseError {
        #[from]
        err: ConfigParseError,
    },
    #[error("missing required parameters")]
    MissingParameters { missing: MissingSyncParams },
    #[error("report directory error")]
    ReportDirError {
        #[from]
        err: ReportDirError,
    },
    #[error("reconcile error")]
    ReconcileError {
        #[from]
        err: ReconcileError,
    },
    #[error("CSV write error")]
    CsvWriteError {
        #[from]
        err: CsvWriteError,
    },
    #[error("error writing output")]
    WriteOutputError {
        #[source]
        err: std::io::Error,
    },
}

impl ExpectedError {
    pub(crate) fn current_dir_error(err: std::io::Error) -> Self {
        Self::CurrentDirError { err }
    }

    pub(crate) fn missing_parameters(missing: MissingSyncParams) -> Self {
        Self::MissingParameters { missing }
    }

    pub(crate) fn write_output_error(err: std::io::Error) -> Self {
        Self::WriteOutputError { err }
    }

    /// Returns the exit code for the process.
    pub fn process_exit_code(&self) -> i32 {
        match self {
            Self::CurrentDirError { .. } | Self::ConfigParseError { .. } => {
                RailsyncExitCode::SETUP_ERROR
            }
            Self::MissingParameters { .. } => RailsyncExitCode::MISSING_PARAMETERS,
            Self::ReportDirError { .. } => RailsyncExitCode::REPORT_READ_FAILED,
            Self::ReconcileError { err } => match err {
                ReconcileError::UnmatchedCases { .. } | ReconcileError::CaseIdRange(_) => {
                    RailsyncExitCode::UNMATCHED_CASES
                }
                _ => RailsyncExitCode::REMOTE_CALL_FAILED,
            },
            Self::CsvWriteError { .. } | Self::WriteOutputError { .. } => {
                RailsyncExitCode::WRITE_OUTPUT_ERROR
            }
        }
    }

    /// Displays this error to stderr.
    pub fn display_to_stderr(&self, styles: &StderrStyles) {
        let mut next_error = match &self {
            Self::CurrentDirError { err } => {
                error!("could not determine current directory");
                Some(err as &dyn Error)
            }
            Self::ConfigParseError { err } => {
                error!(
                    "failed to parse config file `{}`",
                    err.config_file().style(styles.bold)
                );
                Some(err.kind() as &dyn Error)
            }
            Self::MissingParameters { missing } => {
                let mut hints = String::new();
                for param in missing.missing() {
                    let option = param.option_name();
                    let env_var = format!("RAILSYNC_{}", option.to_uppercase().replace('-', "_"));
                    swrite!(
                        hints,
                        "\n  - {param}: pass {} or set {}",
                        format!("--{option}").style(styles.bold),
                        env_var.style(styles.bold),
                    );
                }
                error!("{missing}{hints}");
                error!(
                    target: NO_HEADING,
                    "{}",
                    "(parameters can also be set in railsync.toml)".style(styles.hint)
                );
                None
            }
            Self::ReportDirError { err } => {
                error!("{err}");
                err.source()
            }
            Self::ReconcileError { err } => {
                error!("{err}");
                err.source()
            }
            Self::CsvWriteError { err } => {
                error!("{err}");
                err.source()
            }
            Self::WriteOutputError { err } => {
                error!("error writing output");
                Some(err as &dyn Error)
            }
        };

        while let Some(err) = next_error {
            error!(target: NO_HEADING, "\nCaused by:\n  {}", err);
            next_error = err.source();
        }
    }
}

impl From<SyncError> for ExpectedError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::ReportDir(err) => Self::ReportDirError { err },
            SyncError::Reconcile(err) => Self::ReconcileError { err },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use railsync_metadata::remote::RunId;
    use railsync_runner::case_id::CaseId;

    #[test]
    fn exit_codes() {
        let unmatched = ExpectedError::from(ReconcileError::UnmatchedCases {
            run_id: RunId(1),
            case_ids: vec![CaseId::new("1")],
        });
        assert_eq!(
            unmatched.process_exit_code(),
            RailsyncExitCode::UNMATCHED_CASES
        );

        let remote = ExpectedError::from(ReconcileError::Remote {
            step: ReconcileStep::FetchTests,
            error: RemoteError::Other {
                message: "unreachable".to_owned(),
            },
        });
        assert_eq!(
            remote.process_exit_code(),
            RailsyncExitCode::REMOTE_CALL_FAILED
        );

        let write = ExpectedError::write_output_error(std::io::Error::other("closed"));
        assert_eq!(
            write.process_exit_code(),
            RailsyncExitCode::WRITE_OUTPUT_ERROR
        );
    }
}
