// Copyright (c) The railsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! General support code for railsync-runner.

/// Utilities for pluralizing various words based on count or plurality.
pub mod plural {
    /// Returns "were" if `plural` is true, otherwise "was".
    pub fn were_plural_if(plural: bool) -> &'static str {
        if plural { "were" } else { "was" }
    }

    /// Returns "report" if `count` is 1, otherwise "reports".
    pub fn reports_str(count: usize) -> &'static str {
        if count == 1 { "report" } else { "reports" }
    }

    /// Returns "case" if `count` is 1, otherwise "cases".
    pub fn cases_str(count: usize) -> &'static str {
        if count == 1 { "case" } else { "cases" }
    }

    /// Returns "result" if `count` is 1, otherwise "results".
    pub fn results_str(count: usize) -> &'static str {
        if count == 1 { "result" } else { "results" }
    }

    /// Returns "record" if `count` is 1, otherwise "records".
    pub fn records_str(count: usize) -> &'static str {
        if count == 1 { "record" } else { "records" }
    }

    /// Returns "parameter" if `count` is 1, otherwise "parameters".
    pub fn parameters_str(count: usize) -> &'static str {
        if count == 1 { "parameter" } else { "parameters" }
    }
}
