// Copyright (c) The railsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reading and aggregating report documents.
//!
//! The flow is:
//!
//! 1. [`read_report_dir`] discovers and parses the `*.json` reports in a directory.
//! 2. [`flatten`] turns the parsed documents into a flat list of [`ResultRecord`]s, one per case
//!    ID per test case.
//! 3. Either the records are reconciled against a remote run (see [`crate::reconcile`]), or the
//!    documents are rendered to CSV with [`write_csv_report`].

mod aggregator;
mod csv;
mod reader;

pub use aggregator::*;
pub use csv::*;
pub use reader::*;
