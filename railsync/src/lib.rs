// Copyright (c) The railsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sync test report results to TestRail runs.
//!
//! railsync reads the JSON reports produced by mochawesome-style reporters, extracts TestRail
//! case IDs (`C1234`) from test titles, and submits the outcome of each case to a TestRail run.
//! It can also render the same results as a CSV file.
//!
//! The core logic lives in [`railsync_runner`]; this crate is the command-line interface.

#![warn(missing_docs)]

mod dispatch;
mod errors;
mod output;

#[doc(hidden)]
pub use dispatch::*;
#[doc(hidden)]
pub use errors::*;
#[doc(hidden)]
pub use output::{OutputContext, OutputWriter};
