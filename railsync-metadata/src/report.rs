// Copyright (c) The railsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Report documents produced by JSON test reporters.
//!
//! Each document corresponds to one spec file and has the shape:
//!
//! ```json
//! {
//!   "specs": "cypress/e2e/login.cy.js",
//!   "suites": [
//!     { "tests": [{ "name": "logs in C100", "state": "failed", "error": { "stack": "..." } }] }
//!   ]
//! }
//! ```
//!
//! Fields not listed here are ignored.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smol_str::SmolStr;
use std::fmt;

/// A single report document, as produced for one spec file.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct ReportDocument {
    /// The path of the spec file this document was generated for.
    pub specs: String,

    /// Suites in this document, in report order.
    pub suites: Vec<ReportSuite>,
}

/// A group of test cases within a [`ReportDocument`].
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ReportSuite {
    /// Test cases in this suite, in report order.
    #[serde(default)]
    pub tests: Vec<ReportTestCase>,
}

/// A single test case within a [`ReportSuite`].
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct ReportTestCase {
    /// The title of the test. May embed zero or more case identifiers.
    pub name: String,

    /// The state the test finished in.
    #[serde(default)]
    pub state: TestState,

    /// Error information, present for tests that did not pass.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ReportTestError>,
}

impl ReportTestCase {
    /// Returns the error detail for this test case: the error stack if one was recorded, or the
    /// empty string otherwise.
    pub fn error_detail(&self) -> &str {
        self.error
            .as_ref()
            .and_then(|error| error.stack.as_deref())
            .unwrap_or("")
    }
}

/// Error information attached to a [`ReportTestCase`].
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ReportTestError {
    /// The stack trace (including the message) of the error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

/// The state a test finished in.
///
/// Reporters use a small vocabulary of states, but railsync only cares whether a test passed or
/// not. Unrecognized states are preserved verbatim in [`TestState::Other`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TestState {
    /// The test passed.
    Passed,

    /// The test failed.
    Failed,

    /// The test is pending (declared but not implemented).
    Pending,

    /// The test was skipped.
    Skipped,

    /// Some other state. A missing or `null` state is represented as `Other("")`.
    Other(SmolStr),
}

impl TestState {
    /// Parses a state from its reporter string form.
    pub fn new(state: impl Into<SmolStr>) -> Self {
        let state = state.into();
        match state.as_str() {
            "passed" => Self::Passed,
            "failed" => Self::Failed,
            "pending" => Self::Pending,
            "skipped" => Self::Skipped,
            _ => Self::Other(state),
        }
    }

    /// Returns the string form of this state, as it appeared in the report.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Pending => "pending",
            Self::Skipped => "skipped",
            Self::Other(state) => state,
        }
    }

    /// Returns true if this state is [`TestState::Passed`].
    ///
    /// Every other state counts as not passed.
    pub fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }
}

impl Default for TestState {
    fn default() -> Self {
        Self::Other(SmolStr::default())
    }
}

impl fmt::Display for TestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TestState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TestState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let state = Option::<SmolStr>::deserialize(deserializer)?;
        Ok(state.map_or_else(Self::default, Self::new))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test]
    fn parse_document() {
        let input = indoc! {r#"
            {
                "specs": "cypress/e2e/login.cy.js",
                "stats": { "tests": 2 },
                "suites": [
                    {
                        "title": "login",
                        "tests": [
                            { "name": "logs in C100 C101", "state": "failed", "error": { "stack": "boom", "message": "boom" } },
                            { "name": "shows banner C102", "state": "passed", "duration": 12 }
                        ]
                    },
                    {}
                ]
            }
        "#};

        let document: ReportDocument = serde_json::from_str(input).expect("document is valid");
        assert_eq!(
            document,
            ReportDocument {
                specs: "cypress/e2e/login.cy.js".to_owned(),
                suites: vec![
                    ReportSuite {
                        tests: vec![
                            ReportTestCase {
                                name: "logs in C100 C101".to_owned(),
                                state: TestState::Failed,
                                error: Some(ReportTestError {
                                    stack: Some("boom".to_owned()),
                                }),
                            },
                            ReportTestCase {
                                name: "shows banner C102".to_owned(),
                                state: TestState::Passed,
                                error: None,
                            },
                        ],
                    },
                    ReportSuite::default(),
                ],
            }
        );
        assert_eq!(document.suites[0].tests[0].error_detail(), "boom");
        assert_eq!(document.suites[0].tests[1].error_detail(), "");
    }

    #[test]
    fn missing_suites_is_an_error() {
        let err = serde_json::from_str::<ReportDocument>(r#"{ "specs": "a.spec.js" }"#)
            .expect_err("suites is required");
        assert!(
            err.to_string().contains("missing field `suites`"),
            "unexpected error: {err}"
        );
    }

    #[test_case(r#""passed""#, TestState::Passed ; "passed")]
    #[test_case(r#""failed""#, TestState::Failed ; "failed")]
    #[test_case(r#""pending""#, TestState::Pending ; "pending")]
    #[test_case(r#""skipped""#, TestState::Skipped ; "skipped")]
    #[test_case(r#""broken""#, TestState::Other("broken".into()) ; "other")]
    #[test_case("null", TestState::Other("".into()) ; "null")]
    fn parse_state(input: &str, expected: TestState) {
        let state: TestState = serde_json::from_str(input).expect("state is valid");
        assert_eq!(state, expected);
    }

    #[test]
    fn error_without_stack() {
        let test_case: ReportTestCase =
            serde_json::from_str(r#"{ "name": "t C1", "state": "failed", "error": {} }"#)
                .expect("test case is valid");
        assert_eq!(test_case.error_detail(), "");
        assert!(!test_case.state.is_passed());
    }

    #[test]
    fn state_display_round_trips_reporter_strings() {
        for input in ["passed", "failed", "pending", "skipped", "timedOut", ""] {
            assert_eq!(TestState::new(input).to_string(), input);
        }
    }
}
