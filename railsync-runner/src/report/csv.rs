// Copyright (c) The railsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::aggregator::document_records;
use crate::errors::CsvWriteError;
use atomicwrites::{AtomicFile, OverwriteBehavior};
use camino::{Utf8Path, Utf8PathBuf};
use railsync_metadata::report::ReportDocument;
use std::io::Write;
use swrite::{SWrite, swriteln};

/// The name of the CSV file written into the report directory.
pub const CSV_FILE_NAME: &str = "results.csv";

/// The header row of the CSV report.
pub const CSV_HEADER: &str = "SPEC FILE; TEST CASE ID; STATUS; ERROR MESSAGE;";

/// Renders documents as a semicolon-delimited table.
///
/// Each document contributes one row per extracted case ID, followed by a trailer row holding
/// only the document's spec path. Error messages are JSON-quoted so that embedded newlines and
/// semicolons don't break the table.
pub fn render_csv<'a>(documents: impl IntoIterator<Item = &'a ReportDocument>) -> String {
    let mut out = String::new();
    swriteln!(out, "{CSV_HEADER}");

    for document in documents {
        for record in document_records(document) {
            swriteln!(
                out,
                "{};{};{};{};",
                document.specs,
                record.case_id,
                record.outcome,
                serde_json::Value::String(record.error_detail),
            );
        }
        swriteln!(out, "{};;;;", document.specs);
    }

    out
}

/// Renders documents as CSV and writes them to `results.csv` within `dir`.
///
/// The file is replaced atomically. Returns the path that was written.
pub fn write_csv_report<'a>(
    dir: &Utf8Path,
    documents: impl IntoIterator<Item = &'a ReportDocument>,
) -> Result<Utf8PathBuf, CsvWriteError> {
    let path = dir.join(CSV_FILE_NAME);
    let contents = render_csv(documents);

    AtomicFile::new(&path, OverwriteBehavior::AllowOverwrite)
        .write(|file| file.write_all(contents.as_bytes()))
        .map_err(|error| CsvWriteError::new(&path, error))?;

    Ok(path)
}
