use serde::Serialize;

use meshscan_core::report::MeshReport;
use meshscan_core::types::HealthStatus;

/// Format a full mesh report as JSON.
pub fn format_report(report: &MeshReport, compact: bool) -> String {
    if compact {
        serde_json::to_string(report).expect("MeshReport should be serializable")
    } else {
        serde_json::to_string_pretty(report).expect("MeshReport should be serializable")
    }
}

/// Wrapper for check output that adds pass/fail metadata.
#[derive(Debug, Serialize)]
pub struct CheckOutput<'a> {
    #[serde(flatten)]
    pub report: &'a MeshReport,
    pub check: CheckStatus,
}

#[derive(Debug, Serialize)]
pub struct CheckStatus {
    pub passed: bool,
    pub fail_on: HealthStatus,
    pub cycle_count: usize,
}

/// Format a check result as JSON. Returns (json_string, passed).
pub fn format_check(report: &MeshReport, fail_on: HealthStatus, compact: bool) -> (String, bool) {
    let passed = report.health_status < fail_on;

    let output = CheckOutput {
        report,
        check: CheckStatus {
            passed,
            fail_on,
            cycle_count: report.cycles.len(),
        },
    };

    let json = if compact {
        serde_json::to_string(&output).expect("CheckOutput should be serializable")
    } else {
        serde_json::to_string_pretty(&output).expect("CheckOutput should be serializable")
    };

    (json, passed)
}
