//! Reporting for the subscribe check
//!
//! Human-readable header and outcome lines, the JSON run report, and the
//! stable exit codes.

mod failure;
mod human;
mod run_report;

pub use failure::{ExitCode, OutcomeKind};
pub use human::{header_text, outcome_text, RULE_WIDTH};
pub use run_report::{RunReport, RUN_REPORT_SCHEMA_ID, RUN_REPORT_SCHEMA_VERSION};
