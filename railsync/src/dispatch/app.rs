// Copyright (c) The railsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Top-level application and command routing.

use super::commands::{CsvOpts, ListOpts, SyncOpts};
use crate::{
    ExpectedError, Result,
    output::{OutputContext, OutputOpts, OutputWriter},
};
use camino::Utf8PathBuf;
use clap::Subcommand;
use railsync_runner::config::SyncConfig;

/// Sync test report results to TestRail runs.
///
/// railsync reads JSON test reports, extracts TestRail case IDs (`C1234`) from test titles, and
/// reconciles the outcome of each case against a TestRail run.
#[derive(Debug, clap::Parser)]
#[command(
    name = "railsync",
    version,
    styles = crate::output::CLAP_STYLES,
    max_term_width = 100,
)]
pub struct RailsyncApp {
    #[clap(flatten)]
    output: OutputOpts,

    /// Config file [default: railsync.toml in the current directory]
    #[arg(long, global = true, value_name = "PATH", env = "RAILSYNC_CONFIG_FILE")]
    config_file: Option<Utf8PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

impl RailsyncApp {
    /// Initializes the output context.
    pub fn init_output(&self) -> OutputContext {
        self.output.init()
    }

    /// Executes the app.
    ///
    /// Returns the exit code.
    pub fn exec(self, output: OutputContext, output_writer: &mut OutputWriter) -> Result<i32> {
        let cwd = current_dir()?;
        let file_config = SyncConfig::from_file(self.config_file.as_deref(), &cwd)?;

        match self.command {
            Command::Sync(opts) => opts.exec(file_config, output_writer),
            Command::Csv(opts) => opts.exec(file_config),
            Command::List(opts) => opts.exec(file_config, output, output_writer),
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Submit report results to a TestRail run
    ///
    /// The run's case set is expanded to include every case named in the reports, and one
    /// result is submitted per case. The response from TestRail is printed to stdout as JSON.
    ///
    /// Running this twice against the same run submits every result twice.
    Sync(Box<SyncOpts>),

    /// Write report results to `results.csv` in the report directory
    Csv(CsvOpts),

    /// List the results extracted from reports
    List(ListOpts),
}

fn current_dir() -> Result<Utf8PathBuf> {
    let dir = std::env::current_dir().map_err(ExpectedError::current_dir_error)?;
    Utf8PathBuf::try_from(dir)
        .map_err(|error| ExpectedError::current_dir_error(error.into_io_error()))
}
