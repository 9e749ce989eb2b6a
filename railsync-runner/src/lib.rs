// Copyright (c) The railsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Core functionality for [railsync](https://crates.io/crates/railsync): reading test reports,
//! aggregating their results by case ID, and reconciling those results against a TestRail run.
//!
//! The main entry point is [`sync::sync_reports`]. The building blocks it uses are exposed
//! individually:
//!
//! * [`report`] reads report documents, flattens them into result records and renders CSV.
//! * [`reconcile`] expands a run's case set and submits results to it.
//! * [`remote`] defines the boundary to the remote service.

pub mod case_id;
pub mod config;
pub mod errors;
mod helpers;
pub mod reconcile;
pub mod remote;
pub mod report;
pub mod sync;
