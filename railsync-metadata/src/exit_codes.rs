// Copyright (c) The railsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

/// Documented exit codes for `railsync` failures.
///
/// `railsync` runs may fail for a variety of reasons. This structure documents the exit codes
/// that may occur in case of expected failures.
///
/// Unknown/unexpected failures will always result in exit code 1.
pub enum RailsyncExitCode {}

impl RailsyncExitCode {
    /// No errors occurred and railsync exited normally.
    pub const OK: i32 = 0;

    /// A user issue happened while setting up a railsync invocation, for example an unreadable
    /// config file.
    pub const SETUP_ERROR: i32 = 96;

    /// One or more parameters required to sync results were not provided.
    ///
    /// No remote calls are made in this case.
    pub const MISSING_PARAMETERS: i32 = 97;

    /// The report directory could not be read.
    pub const REPORT_READ_FAILED: i32 = 104;

    /// A call to the remote test management service failed.
    pub const REMOTE_CALL_FAILED: i32 = 105;

    /// One or more case IDs found in reports were not part of the remote run after its case set
    /// was expanded.
    pub const UNMATCHED_CASES: i32 = 106;

    /// Writing data to stdout, stderr or an output file produced an error.
    pub const WRITE_OUTPUT_ERROR: i32 = 110;
}
