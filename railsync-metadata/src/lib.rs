// Copyright (c) The railsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Structured data shared by the railsync crates.
//!
//! This crate holds three kinds of data:
//!
//! * [report documents](report) as written by JSON test reporters, one per spec file;
//! * [wire types](remote) for the TestRail API v2 endpoints that railsync calls;
//! * documented [exit codes](RailsyncExitCode) for the `railsync` binary.
//!
//! Nothing in here performs I/O.

mod exit_codes;
pub mod remote;
pub mod report;

pub use exit_codes::*;
