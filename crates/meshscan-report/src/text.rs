use colored::Colorize;

use meshscan_core::report::MeshReport;
use meshscan_core::types::{ChattySeverity, CouplingLevel, HealthStatus, RiskLevel};

/// Format a full mesh report for terminal output.
pub fn format_report(report: &MeshReport) -> String {
    let mut out = String::new();

    out.push_str(&format!("\n{}\n", "meshscan - Service Mesh Analysis".bold()));
    out.push_str(&format!("{}\n\n", "=".repeat(40)));

    out.push_str(&format!(
        "{}: {}\n",
        "Health".bold(),
        health_label(report.health_status)
    ));
    out.push_str(&format!(
        "{}: {} services, {} dependencies\n",
        "Summary".bold(),
        report.summary.total_services,
        report.summary.total_dependencies,
    ));

    // Coupling
    let coupling = &report.coupling;
    out.push_str(&format!("\n{}\n{}\n", "Coupling".bold(), "-".repeat(40)));
    out.push_str(&format!(
        "  Level: {}\n",
        coupling_label(coupling.coupling_metric)
    ));
    out.push_str(&format!(
        "  Average dependencies per service: {:.2}\n",
        coupling.average_dependencies_per_service
    ));
    if !coupling.high_fan_out_services.is_empty() {
        out.push_str("  High fan-out:\n");
        for s in &coupling.high_fan_out_services {
            out.push_str(&format!("    {}: {}\n", s.service, s.fan_out));
        }
    }
    if !coupling.high_fan_in_services.is_empty() {
        out.push_str("  High fan-in:\n");
        for s in &coupling.high_fan_in_services {
            out.push_str(&format!("    {}: {}\n", s.service, s.fan_in));
        }
    }

    // Cycles
    if report.cycles.is_empty() {
        out.push_str(&format!(
            "\n{}\n",
            "No circular dependencies found!".green().bold()
        ));
    } else {
        out.push_str(&format!(
            "\n{} ({} found)\n{}\n",
            "Circular Dependencies".red().bold(),
            report.cycles.len(),
            "-".repeat(40),
        ));
        for cycle in &report.cycles {
            out.push_str(&format!("  {cycle}\n"));
        }
    }

    // Traffic
    if !report.chatty_interfaces.is_empty() {
        out.push_str(&format!(
            "\n{} ({} found)\n{}\n",
            "Chatty Interfaces".yellow().bold(),
            report.chatty_interfaces.len(),
            "-".repeat(40),
        ));
        for c in &report.chatty_interfaces {
            let severity = match c.severity {
                ChattySeverity::High => "HIGH".red().bold().to_string(),
                ChattySeverity::Medium => "MEDIUM".yellow().bold().to_string(),
            };
            out.push_str(&format!(
                "  {} {} -> {}: {} calls, avg {:.2}ms\n",
                severity, c.caller, c.callee, c.call_count, c.avg_latency_ms
            ));
        }
    }

    if !report.bottlenecks.is_empty() {
        out.push_str(&format!(
            "\n{} ({} found)\n{}\n",
            "Bottlenecks".red().bold(),
            report.bottlenecks.len(),
            "-".repeat(40),
        ));
        for b in &report.bottlenecks {
            let risk = match b.risk_level {
                RiskLevel::Critical => "CRITICAL".red().bold().to_string(),
                RiskLevel::High => "HIGH".yellow().bold().to_string(),
            };
            out.push_str(&format!(
                "  {} {}: {} calls, avg {:.2}ms\n",
                risk, b.service, b.total_calls, b.avg_latency_ms
            ));
        }
    }

    out.push_str(&format!(
        "\n{}\n{}\n",
        "Recommendations".bold(),
        "-".repeat(40)
    ));
    for r in &report.recommendations {
        out.push_str(&format!("  - {r}\n"));
    }

    out.push('\n');
    out
}

fn health_label(status: HealthStatus) -> String {
    let label = status.to_string();
    match status {
        HealthStatus::Healthy => label.green().bold().to_string(),
        HealthStatus::Warning => label.yellow().bold().to_string(),
        HealthStatus::Critical => label.red().bold().to_string(),
    }
}

fn coupling_label(level: CouplingLevel) -> String {
    let label = level.to_string();
    match level {
        CouplingLevel::Loose => label.green().to_string(),
        CouplingLevel::Moderate => label.yellow().to_string(),
        CouplingLevel::Tight => label.red().to_string(),
    }
}

/// Format a check result for CI use. Returns (text, passed).
pub fn format_check(report: &MeshReport, fail_on: HealthStatus) -> (String, bool) {
    let passed = report.health_status < fail_on;

    let mut out = format_report(report);

    if passed {
        out.push_str(&format!("{}\n", "CHECK PASSED".green().bold()));
    } else {
        out.push_str(&format!(
            "{}: health is {} (fails at {} or above)\n",
            "CHECK FAILED".red().bold(),
            report.health_status,
            fail_on,
        ));
    }

    (out, passed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshscan_core::{Config, DependencyGraph};

    fn report(mapping: Vec<(&str, Vec<&str>)>) -> MeshReport {
        colored::control::set_override(false);
        let graph = DependencyGraph::from_mapping(mapping).unwrap();
        MeshReport::build(&graph, &[], &Config::default())
    }

    #[test]
    fn test_report_lists_cycles() {
        let text = format_report(&report(vec![("a", vec!["b"]), ("b", vec!["a"])]));
        assert!(text.contains("Circular Dependencies (1 found)"));
        assert!(text.contains("a -> b -> a"));
        assert!(text.contains("CRITICAL"));
    }

    #[test]
    fn test_report_without_cycles() {
        let text = format_report(&report(vec![("a", vec!["b"])]));
        assert!(text.contains("No circular dependencies found!"));
        assert!(text.contains("2 services, 1 dependencies"));
        assert!(text.contains("Level: LOOSE"));
    }

    #[test]
    fn test_check_fails_at_threshold() {
        let r = report(vec![("a", vec!["a"])]);
        let (text, passed) = format_check(&r, HealthStatus::Critical);
        assert!(!passed);
        assert!(text.contains("CHECK FAILED"));

        let healthy = report(vec![("a", vec!["b"])]);
        let (text, passed) = format_check(&healthy, HealthStatus::Warning);
        assert!(passed);
        assert!(text.contains("CHECK PASSED"));
    }
}
