// Copyright (c) The railsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Value enums and value parsers shared across commands.

use clap::{
    ValueEnum,
    builder::{PossibleValuesParser, TypedValueParser},
};
use railsync_runner::{reconcile::LookupMissPolicy, report::DuplicatePolicy};

/// Parses `--on-duplicate`, offering the policy's known values as possible values.
pub(crate) fn duplicate_policy_parser() -> impl TypedValueParser<Value = DuplicatePolicy> {
    PossibleValuesParser::new(DuplicatePolicy::variants().iter().copied())
        .try_map(|value| value.parse::<DuplicatePolicy>())
}

/// Parses `--on-missing-case`, offering the policy's known values as possible values.
pub(crate) fn lookup_miss_policy_parser() -> impl TypedValueParser<Value = LookupMissPolicy> {
    PossibleValuesParser::new(LookupMissPolicy::variants().iter().copied())
        .try_map(|value| value.parse::<LookupMissPolicy>())
}

/// Message format options for the list command.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum MessageFormatOpts {
    /// One record per line.
    #[default]
    Human,
    /// JSON with no whitespace.
    Json,
    /// JSON, prettified.
    JsonPretty,
}
