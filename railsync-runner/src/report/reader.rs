// Copyright (c) The railsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    errors::{ReportDirError, ReportParseError},
    helpers::plural,
};
use camino::{Utf8Path, Utf8PathBuf};
use miette::{NamedSource, SourceSpan};
use railsync_metadata::report::ReportDocument;
use tracing::debug;

/// A report document along with the file it was read from.
#[derive(Clone, Debug)]
pub struct LoadedReport {
    /// The path the report was read from.
    pub path: Utf8PathBuf,

    /// The parsed document.
    pub document: ReportDocument,
}

/// The result of reading a report directory.
#[derive(Debug, Default)]
pub struct ReadReports {
    /// Reports that were parsed successfully, sorted by file name.
    pub reports: Vec<LoadedReport>,

    /// Reports that could not be read or parsed.
    pub errors: Vec<ReportParseError>,
}

impl ReadReports {
    /// Returns an iterator over the parsed documents, in traversal order.
    pub fn documents(&self) -> impl Iterator<Item = &ReportDocument> + '_ {
        self.reports.iter().map(|report| &report.document)
    }
}

/// Reads every `*.json` report in `dir`.
///
/// Files are visited in file name order. Failing to list the directory is an error, but a report
/// that can't be read or parsed is recorded in [`ReadReports::errors`] and the rest of the
/// directory is still read.
pub fn read_report_dir(dir: &Utf8Path) -> Result<ReadReports, ReportDirError> {
    let mut paths = Vec::new();
    for entry in dir
        .read_dir_utf8()
        .map_err(|error| ReportDirError::new(dir, error))?
    {
        let entry = entry.map_err(|error| ReportDirError::new(dir, error))?;
        let path = entry.path();
        if path.extension() == Some("json") && path.is_file() {
            paths.push(entry.into_path());
        }
    }
    paths.sort_unstable();

    debug!(
        "found {} {} in {dir}",
        paths.len(),
        plural::reports_str(paths.len())
    );

    let mut read_reports = ReadReports::default();
    for path in paths {
        match read_report(&path) {
            Ok(document) => read_reports.reports.push(LoadedReport { path, document }),
            Err(error) => read_reports.errors.push(error),
        }
    }

    Ok(read_reports)
}

/// Reads and parses a single report file.
pub fn read_report(path: &Utf8Path) -> Result<ReportDocument, ReportParseError> {
    let contents = std::fs::read_to_string(path).map_err(|error| ReportParseError::Read {
        path: path.to_owned(),
        error,
    })?;
    parse_report(path, &contents)
}

/// Parses the contents of a report file. `path` is only used for error reporting.
pub fn parse_report(path: &Utf8Path, contents: &str) -> Result<ReportDocument, ReportParseError> {
    let mut deserializer = serde_json::Deserializer::from_str(contents);
    let document: ReportDocument = serde_path_to_error::deserialize(&mut deserializer)
        .map_err(|error| {
            let json_path = error.path().to_string();
            json_error(path, json_path, error.into_inner(), contents)
        })?;
    // Reject trailing data.
    deserializer
        .end()
        .map_err(|error| json_error(path, ".".to_owned(), error, contents))?;

    Ok(document)
}

fn json_error(
    path: &Utf8Path,
    json_path: String,
    error: serde_json::Error,
    contents: &str,
) -> ReportParseError {
    let span = error_offset(contents, error.line(), error.column())
        .map(|offset| SourceSpan::from((offset, 0)));
    ReportParseError::Json {
        path: path.to_owned(),
        json_path,
        source_code: NamedSource::new(path.as_str(), contents.to_owned()),
        span,
        error,
    }
}

/// Converts serde_json's 1-based line and column into a byte offset.
fn error_offset(contents: &str, line: usize, column: usize) -> Option<usize> {
    if line == 0 {
        return None;
    }
    let line_start: usize = contents
        .split_inclusive('\n')
        .take(line - 1)
        .map(str::len)
        .sum();
    let offset = line_start + column.saturating_sub(1);
    (offset <= contents.len()).then_some(offset)
}
