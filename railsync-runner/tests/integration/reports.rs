// Copyright (c) The railsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::fixtures::reports_dir;
use pretty_assertions::assert_eq;
use railsync_runner::report::{flatten, read_report_dir, render_csv};

#[test]
fn broken_reports_are_skipped() {
    let read = read_report_dir(&reports_dir("mixed")).expect("directory is readable");

    let specs: Vec<_> = read.documents().map(|doc| doc.specs.as_str()).collect();
    assert_eq!(
        specs,
        ["cypress/e2e/cart.spec.js", "cypress/e2e/checkout.spec.js"]
    );

    let failed: Vec<_> = read
        .errors
        .iter()
        .map(|error| error.path().file_name().unwrap())
        .collect();
    assert_eq!(failed, ["b-broken.json"]);

    let records = flatten(read.documents());
    let case_ids: Vec<_> = records
        .iter()
        .map(|record| record.case_id.as_str())
        .collect();
    assert_eq!(case_ids, ["300", "301", "302", "300", "303", "304"]);
}

#[test]
fn basic_csv() {
    let read = read_report_dir(&reports_dir("basic")).expect("directory is readable");
    assert!(read.errors.is_empty(), "{:?}", read.errors);

    insta::assert_snapshot!(render_csv(read.documents()), @r#"
    SPEC FILE; TEST CASE ID; STATUS; ERROR MESSAGE;
    cypress/e2e/empty.spec.js;;;;
    cypress/e2e/login.spec.js;100;failed;"boom";
    cypress/e2e/login.spec.js;101;failed;"boom";
    cypress/e2e/login.spec.js;;;;
    "#);
}
