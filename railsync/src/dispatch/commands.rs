// Copyright (c) The railsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The `sync`, `csv` and `list` commands.

use super::value_enums::{MessageFormatOpts, duplicate_policy_parser, lookup_miss_policy_parser};
use crate::{
    ExpectedError, Result,
    output::{NO_HEADING, OutputContext, OutputWriter},
};
use camino::Utf8PathBuf;
use chrono::Utc;
use clap::Args;
use owo_colors::OwoColorize;
use railsync_metadata::{
    RailsyncExitCode,
    remote::{ProjectId, RunId, SuiteId},
};
use railsync_runner::{
    config::SyncConfig,
    errors::{MissingSyncParams, ReportParseError, SyncParam},
    reconcile::LookupMissPolicy,
    remote::HttpRemoteClient,
    report::{DuplicatePolicy, ReadReports, flatten, read_report_dir, write_csv_report},
    sync::{SyncOutcome, sync_reports},
};
use std::{io::Write, time::Duration};
use tracing::{info, warn};

#[derive(Debug, Args)]
pub(crate) struct ReportDirOpts {
    /// Directory containing JSON reports [default: `report-dir` from the config file]
    #[arg(long, value_name = "DIR", env = "RAILSYNC_REPORT_DIR")]
    report_dir: Option<Utf8PathBuf>,
}

impl ReportDirOpts {
    fn resolve(self, file_config: &SyncConfig) -> Result<Utf8PathBuf> {
        self.report_dir
            .or_else(|| file_config.report_dir.clone())
            .filter(|dir| !dir.as_str().is_empty())
            .ok_or_else(|| {
                ExpectedError::missing_parameters(MissingSyncParams::new(vec![
                    SyncParam::ReportDir,
                ]))
            })
    }

    fn read(self, file_config: &SyncConfig) -> Result<(Utf8PathBuf, ReadReports)> {
        let report_dir = self.resolve(file_config)?;
        let mut read = read_report_dir(&report_dir)?;
        log_report_errors(std::mem::take(&mut read.errors));
        Ok((report_dir, read))
    }
}

/// Prints reports that failed to parse, along with the offending source.
fn log_report_errors(errors: Vec<ReportParseError>) {
    for error in errors {
        warn!("skipping report `{}`", error.path());
        warn!(target: NO_HEADING, "{:?}", miette::Report::new(error));
    }
}

#[derive(Debug, Args)]
pub(crate) struct SyncOpts {
    #[clap(flatten)]
    reports: ReportDirOpts,

    /// Base URL of the TestRail instance
    #[arg(long, value_name = "URL", env = "RAILSYNC_URL")]
    url: Option<String>,

    /// TestRail username
    #[arg(long, value_name = "USER", env = "RAILSYNC_USERNAME")]
    username: Option<String>,

    /// TestRail API key
    #[arg(long, value_name = "KEY", env = "RAILSYNC_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Project to create new runs in
    #[arg(long, value_name = "ID", env = "RAILSYNC_PROJECT_ID")]
    project_id: Option<ProjectId>,

    /// Suite that new runs draw cases from
    #[arg(long, value_name = "ID", env = "RAILSYNC_SUITE_ID")]
    suite_id: Option<SuiteId>,

    /// Existing run to submit results to [default: create a new run]
    #[arg(long, value_name = "ID", env = "RAILSYNC_RUN_ID")]
    run_id: Option<RunId>,

    /// Name of a newly created run [default: the current time]
    #[arg(long, value_name = "NAME", env = "RAILSYNC_RUN_NAME")]
    run_name: Option<String>,

    /// What to do when a case ID appears more than once [default: last-wins]
    #[arg(
        long,
        value_name = "POLICY",
        env = "RAILSYNC_ON_DUPLICATE",
        value_parser = duplicate_policy_parser(),
    )]
    on_duplicate: Option<DuplicatePolicy>,

    /// What to do when a case is not part of the run [default: abort]
    #[arg(
        long,
        value_name = "POLICY",
        env = "RAILSYNC_ON_MISSING_CASE",
        value_parser = lookup_miss_policy_parser(),
    )]
    on_missing_case: Option<LookupMissPolicy>,

    /// Timeout for each request to TestRail [default: 60s]
    #[arg(
        long,
        value_name = "DURATION",
        env = "RAILSYNC_TIMEOUT",
        value_parser = humantime::parse_duration,
    )]
    timeout: Option<Duration>,
}

impl SyncOpts {
    fn into_config(self) -> SyncConfig {
        SyncConfig {
            report_dir: self.reports.report_dir,
            url: self.url,
            username: self.username,
            api_key: self.api_key,
            project_id: self.project_id,
            suite_id: self.suite_id,
            run_id: self.run_id,
            run_name: self.run_name,
            on_duplicate: self.on_duplicate,
            on_missing_case: self.on_missing_case,
            timeout: self.timeout,
        }
    }

    pub(crate) fn exec(
        self,
        file_config: SyncConfig,
        output_writer: &mut OutputWriter,
    ) -> Result<i32> {
        let config = file_config.merge(self.into_config());
        let outcome = sync_reports(&config, Utc::now(), |config| {
            HttpRemoteClient::new(
                &config.url,
                &config.username,
                &config.api_key,
                config.timeout,
            )
        })?;

        let summary = match outcome {
            SyncOutcome::MissingParams(missing) => {
                return Err(ExpectedError::missing_parameters(missing));
            }
            SyncOutcome::Submitted(summary) => summary,
        };
        info!(
            "run {}: {} submitted, {} skipped (run has {} cases, {} before sync)",
            summary.run_id,
            summary.submitted,
            summary.skipped,
            summary.known_after,
            summary.known_before,
        );

        let mut writer = output_writer.stdout_writer();
        serde_json::to_writer(&mut writer, &summary.response)
            .map_err(|error| ExpectedError::write_output_error(error.into()))?;
        writeln!(writer).map_err(ExpectedError::write_output_error)?;
        writer.flush().map_err(ExpectedError::write_output_error)?;

        Ok(RailsyncExitCode::OK)
    }
}

#[derive(Debug, Args)]
pub(crate) struct CsvOpts {
    #[clap(flatten)]
    reports: ReportDirOpts,
}

impl CsvOpts {
    pub(crate) fn exec(self, file_config: SyncConfig) -> Result<i32> {
        let (report_dir, read) = self.reports.read(&file_config)?;
        let path = write_csv_report(&report_dir, read.documents())?;
        info!("wrote CSV report to {path}");

        Ok(RailsyncExitCode::OK)
    }
}

#[derive(Debug, Args)]
pub(crate) struct ListOpts {
    #[clap(flatten)]
    reports: ReportDirOpts,

    /// Output format
    #[arg(
        short = 'T',
        long,
        value_enum,
        default_value_t,
        value_name = "FMT"
    )]
    message_format: MessageFormatOpts,
}

impl ListOpts {
    pub(crate) fn exec(
        self,
        file_config: SyncConfig,
        output: OutputContext,
        output_writer: &mut OutputWriter,
    ) -> Result<i32> {
        let message_format = self.message_format;
        let (_, read) = self.reports.read(&file_config)?;
        let records = flatten(read.documents());

        let mut writer = output_writer.stdout_writer();
        match message_format {
            MessageFormatOpts::Human => {
                let styles = output.record_styles();
                for record in &records {
                    let outcome_style = if record.outcome.is_passed() {
                        styles.passed
                    } else {
                        styles.failed
                    };
                    writeln!(
                        writer,
                        "{} {}",
                        record.case_id.style(styles.case_id),
                        record.outcome.style(outcome_style),
                    )
                    .map_err(ExpectedError::write_output_error)?;
                }
            }
            MessageFormatOpts::Json | MessageFormatOpts::JsonPretty => {
                let result = if message_format == MessageFormatOpts::JsonPretty {
                    serde_json::to_writer_pretty(&mut writer, &records)
                } else {
                    serde_json::to_writer(&mut writer, &records)
                };
                result.map_err(|error| ExpectedError::write_output_error(error.into()))?;
                writeln!(writer).map_err(ExpectedError::write_output_error)?;
            }
        }
        writer.flush().map_err(ExpectedError::write_output_error)?;

        Ok(RailsyncExitCode::OK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{Parser, error::ErrorKind};
    use pretty_assertions::assert_eq;

    #[derive(Debug, Parser)]
    struct SyncCli {
        #[clap(flatten)]
        sync: SyncOpts,
    }

    fn parse_sync(args: &str) -> std::result::Result<SyncConfig, clap::Error> {
        let mut cmd = vec!["sync".to_owned()];
        cmd.extend(shell_words::split(args).expect("valid command line"));
        SyncCli::try_parse_from(cmd).map(|cli| cli.sync.into_config())
    }

    #[test]
    fn policies_parse_into_config() {
        let config = parse_sync("--on-duplicate first-wins --on-missing-case skip")
            .expect("policies parsed");
        assert_eq!(config.on_duplicate, Some(DuplicatePolicy::FirstWins));
        assert_eq!(config.on_missing_case, Some(LookupMissPolicy::Skip));
    }

    #[test]
    fn unknown_policy_lists_known_values() {
        let error = parse_sync("--on-missing-case ignore").expect_err("unknown policy");
        assert_eq!(error.kind(), ErrorKind::InvalidValue);
        let message = error.to_string();
        assert!(
            message.contains("[possible values: abort, skip]"),
            "message lists possible values: {message}"
        );
    }
}
