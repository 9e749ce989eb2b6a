// Copyright (c) The railsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Syncing a directory of reports to a remote run.

use crate::{
    config::{SyncConfig, ValidatedSyncConfig},
    errors::{DisplayErrorChain, MissingSyncParams, SyncError},
    helpers::plural,
    reconcile::{ReconcileOptions, ReconcileSummary, Reconciler, RunTarget},
    remote::RemoteClient,
    report::{apply_duplicate_policy, flatten, read_report_dir},
};
use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{info, warn};

/// The outcome of [`sync_reports`].
#[derive(Debug)]
pub enum SyncOutcome {
    /// Required parameters were missing, and nothing was done.
    MissingParams(MissingSyncParams),

    /// Results were reconciled against a run.
    Submitted(ReconcileSummary),
}

/// Reads the reports in the configured directory and reconciles their results against a run.
///
/// If required parameters are missing, returns [`SyncOutcome::MissingParams`] without reading
/// any reports or calling `make_client`.
///
/// Reports that fail to parse are logged and skipped. If a run ID is configured, results are
/// reconciled against that run; otherwise a new run is created, named after
/// [`default_run_name`].
pub fn sync_reports<C, F>(
    config: &SyncConfig,
    now: DateTime<Utc>,
    make_client: F,
) -> Result<SyncOutcome, SyncError>
where
    C: RemoteClient,
    F: FnOnce(&ValidatedSyncConfig) -> C,
{
    let config = match config.validate() {
        Ok(config) => config,
        Err(missing) => return Ok(SyncOutcome::MissingParams(missing)),
    };

    let read = read_report_dir(&config.report_dir)?;
    for error in &read.errors {
        warn!("skipping report: {}", DisplayErrorChain::new(error));
    }

    let records = flatten(read.documents());
    let dedup = apply_duplicate_policy(records, config.on_duplicate);
    info!(
        "read {} {} from {} {} ({} duplicate {} dropped)",
        dedup.records.len(),
        plural::records_str(dedup.records.len()),
        read.reports.len(),
        plural::reports_str(read.reports.len()),
        dedup.dropped.len(),
        plural::records_str(dedup.dropped.len()),
    );

    let target = match config.run_id {
        Some(run_id) => RunTarget::Existing(run_id),
        None => RunTarget::New {
            project_id: config.project_id,
            suite_id: config.suite_id,
            name: default_run_name(config.run_name.as_deref(), now),
        },
    };

    let client = make_client(&config);
    let reconciler = Reconciler::new(
        client,
        ReconcileOptions {
            on_missing_case: config.on_missing_case,
        },
    );
    let summary = reconciler.reconcile(&target, &dedup.records)?;

    Ok(SyncOutcome::Submitted(summary))
}

/// Returns the name for a new run: `supplied` if it is non-empty, otherwise `now` as an
/// ISO 8601 UTC timestamp with millisecond precision.
pub fn default_run_name(supplied: Option<&str>, now: DateTime<Utc>) -> String {
    match supplied {
        Some(name) if !name.is_empty() => name.to_owned(),
        _ => now.to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}
