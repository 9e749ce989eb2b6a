// Copyright (c) The railsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    case_id::{CaseId, extract_case_ids},
    errors::PolicyParseError,
};
use railsync_metadata::report::{ReportDocument, TestState};
use serde::{Deserialize, Serialize};
use std::{
    collections::{HashMap, HashSet},
    fmt,
    str::FromStr,
};
use tracing::warn;

/// The outcome of one case, derived from a test case in a report.
///
/// A test case whose title embeds several case IDs produces one record per ID, all sharing the
/// same outcome and error detail.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResultRecord {
    /// The case this record is for.
    pub case_id: CaseId,

    /// The state the test case finished in.
    pub outcome: TestState,

    /// The error stack of the test case, or the empty string.
    pub error_detail: String,
}

/// Returns the records for a single document, in suite, test and extraction order.
pub fn document_records(document: &ReportDocument) -> impl Iterator<Item = ResultRecord> + '_ {
    document
        .suites
        .iter()
        .flat_map(|suite| &suite.tests)
        .flat_map(|test_case| {
            extract_case_ids(&test_case.name).map(move |case_id| ResultRecord {
                case_id,
                outcome: test_case.state.clone(),
                error_detail: test_case.error_detail().to_owned(),
            })
        })
}

/// Flattens documents into records.
///
/// Documents are traversed in the order given. The number of records is the total number of case
/// IDs extracted across all test titles; nothing is deduplicated here. Use
/// [`apply_duplicate_policy`] for that.
pub fn flatten<'a>(documents: impl IntoIterator<Item = &'a ReportDocument>) -> Vec<ResultRecord> {
    documents.into_iter().flat_map(document_records).collect()
}

/// What to do when the same case ID appears more than once across reports.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// Keep every record. Each one is submitted as a separate result.
    KeepAll,

    /// Keep the first record for each case ID.
    FirstWins,

    /// Keep the last record for each case ID.
    #[default]
    LastWins,
}

impl DuplicatePolicy {
    /// Returns the string representations of the variants.
    pub fn variants() -> &'static [&'static str] {
        &["keep-all", "first-wins", "last-wins"]
    }
}

impl fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeepAll => write!(f, "keep-all"),
            Self::FirstWins => write!(f, "first-wins"),
            Self::LastWins => write!(f, "last-wins"),
        }
    }
}

impl FromStr for DuplicatePolicy {
    type Err = PolicyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "keep-all" => Ok(Self::KeepAll),
            "first-wins" => Ok(Self::FirstWins),
            "last-wins" => Ok(Self::LastWins),
            other => Err(PolicyParseError::new(
                "on-duplicate",
                other,
                Self::variants(),
            )),
        }
    }
}

/// The result of [`apply_duplicate_policy`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DedupOutcome {
    /// The records that were kept, in their original relative order.
    pub records: Vec<ResultRecord>,

    /// The records that were dropped, in their original relative order.
    pub dropped: Vec<ResultRecord>,
}

/// Removes duplicate case IDs from `records` according to `policy`.
///
/// Case IDs are compared by their [canonical digits](CaseId::canonical), so `C7` and `C007`
/// count as the same case. A warning is logged for every dropped record whose outcome differs
/// from the one that was kept.
pub fn apply_duplicate_policy(records: Vec<ResultRecord>, policy: DuplicatePolicy) -> DedupOutcome {
    let keep: Vec<bool> = match policy {
        DuplicatePolicy::KeepAll => {
            return DedupOutcome {
                records,
                dropped: Vec::new(),
            };
        }
        DuplicatePolicy::FirstWins => {
            let mut seen = HashSet::new();
            records
                .iter()
                .map(|record| seen.insert(record.case_id.canonical()))
                .collect()
        }
        DuplicatePolicy::LastWins => {
            let last: HashMap<_, _> = records
                .iter()
                .enumerate()
                .map(|(index, record)| (record.case_id.canonical(), index))
                .collect();
            records
                .iter()
                .enumerate()
                .map(|(index, record)| last[record.case_id.canonical()] == index)
                .collect()
        }
    };

    let mut outcome = DedupOutcome::default();
    for (record, keep) in records.into_iter().zip(keep) {
        if keep {
            outcome.records.push(record);
        } else {
            outcome.dropped.push(record);
        }
    }

    let kept: HashMap<_, _> = outcome
        .records
        .iter()
        .map(|record| {
            (
                record.case_id.canonical(),
                (&record.case_id, &record.outcome),
            )
        })
        .collect();
    for dropped in &outcome.dropped {
        if let Some(&(kept_case_id, kept_outcome)) = kept.get(dropped.case_id.canonical())
            && *kept_outcome != dropped.outcome
        {
            warn!(
                "case C{} has conflicting outcomes across reports: \
                 using `{kept_outcome}` from C{kept_case_id}, ignoring `{}` ({policy})",
                dropped.case_id, dropped.outcome,
            );
        }
    }

    outcome
}
