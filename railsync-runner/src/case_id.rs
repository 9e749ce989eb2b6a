// Copyright (c) The railsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Extraction of external case identifiers from test titles.
//!
//! Test titles embed case identifiers as a capital `C` followed by one or more decimal digits,
//! for example `logs in with SSO C1234 C1235`.

use crate::errors::CaseIdRangeError;
use railsync_metadata::remote::RemoteCaseId;
use regex::Regex;
use serde::Serialize;
use smol_str::SmolStr;
use std::{fmt, sync::LazyLock};

static CASE_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"C[0-9]+").expect("case ID regex is valid"));

/// A case identifier extracted from a test title, without its leading `C`.
///
/// The digits are kept as written, so `C007` becomes `007`. Use [`CaseId::to_remote`] to get the
/// numeric ID the remote service uses.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct CaseId(SmolStr);

impl CaseId {
    /// Creates a new `CaseId` from a string of digits.
    ///
    /// # Panics
    ///
    /// Panics if `digits` is empty or contains anything other than ASCII digits.
    pub fn new(digits: impl Into<SmolStr>) -> Self {
        let digits = digits.into();
        assert!(
            !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()),
            "case ID `{digits}` must be a non-empty string of digits"
        );
        Self(digits)
    }

    /// Returns the digits of this case ID.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the digits with leading zeros removed, so that `007` and `7` compare equal.
    ///
    /// Two case IDs with the same canonical digits refer to the same remote case.
    pub fn canonical(&self) -> &str {
        let trimmed = self.0.trim_start_matches('0');
        if trimmed.is_empty() { "0" } else { trimmed }
    }

    /// Converts this case ID to the numeric form used by the remote service.
    pub fn to_remote(&self) -> Result<RemoteCaseId, CaseIdRangeError> {
        self.0
            .parse()
            .map(RemoteCaseId)
            .map_err(|_| CaseIdRangeError::new(self.clone()))
    }
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Returns an iterator over the case IDs embedded in `title`, in order of occurrence.
///
/// Matches do not overlap and duplicates are kept. A title without case IDs produces an empty
/// iterator.
pub fn extract_case_ids(title: &str) -> CaseIds<'_> {
    CaseIds { title, pos: 0 }
}

/// An iterator over the case IDs in a test title, returned by [`extract_case_ids`].
///
/// The iterator is lazy and cheap to clone. A clone resumes from the same position.
#[derive(Clone, Debug)]
pub struct CaseIds<'t> {
    title: &'t str,
    pos: usize,
}

impl<'t> CaseIds<'t> {
    /// Returns the title this iterator extracts case IDs from.
    pub fn title(&self) -> &'t str {
        self.title
    }
}

impl Iterator for CaseIds<'_> {
    type Item = CaseId;

    fn next(&mut self) -> Option<Self::Item> {
        let m = CASE_ID_REGEX.find_at(self.title, self.pos)?;
        self.pos = m.end();
        // Skip the leading `C`.
        Some(CaseId(SmolStr::new(&m.as_str()[1..])))
    }
}
