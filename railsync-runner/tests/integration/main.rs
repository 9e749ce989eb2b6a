// Copyright (c) The railsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

mod fixtures;
mod reports;
mod sync;
