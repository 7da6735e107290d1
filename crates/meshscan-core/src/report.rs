use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{Config, HealthConfig};
use crate::coupling::{CouplingAnalyzer, CouplingReport};
use crate::cycles::CycleDetector;
use crate::graph::DependencyGraph;
use crate::input::Trace;
use crate::traffic::{Bottleneck, CallPattern, ChattyInterface, TrafficAnalyzer};
use crate::types::{CouplingLevel, Cycle, HealthStatus};

/// Cycles and coupling metrics for a dependency graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphAnalysis {
    pub cycles: Vec<Cycle>,
    pub coupling: CouplingReport,
}

impl GraphAnalysis {
    pub fn run(graph: &DependencyGraph, config: &Config) -> Self {
        Self {
            cycles: CycleDetector::new(graph).detect(),
            coupling: CouplingAnalyzer::new(graph, &config.coupling).analyze(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_services: usize,
    pub total_dependencies: usize,
    pub coupling_level: CouplingLevel,
}

/// Full mesh report: graph analysis plus trace-derived traffic findings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshReport {
    pub timestamp: String,
    pub summary: ReportSummary,
    pub cycles: Vec<Cycle>,
    pub coupling: CouplingReport,
    pub call_patterns: Vec<CallPattern>,
    pub chatty_interfaces: Vec<ChattyInterface>,
    pub bottlenecks: Vec<Bottleneck>,
    pub health_status: HealthStatus,
    pub recommendations: Vec<String>,
}

impl MeshReport {
    pub fn build(graph: &DependencyGraph, traces: &[Trace], config: &Config) -> Self {
        let analysis = GraphAnalysis::run(graph, config);

        let traffic = TrafficAnalyzer::new(&config.traffic);
        let call_patterns = traffic.call_patterns(traces);
        let chatty_interfaces = traffic.chatty_interfaces(&call_patterns);
        let bottlenecks = traffic.bottlenecks(&call_patterns);

        let health_status = health_status(
            &analysis.cycles,
            &chatty_interfaces,
            &bottlenecks,
            &config.health,
        );
        let recommendations = recommendations(&analysis.cycles, &chatty_interfaces, &bottlenecks);

        tracing::debug!(
            cycles = analysis.cycles.len(),
            call_patterns = call_patterns.len(),
            %health_status,
            "mesh report built"
        );

        Self {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            summary: ReportSummary {
                total_services: analysis.coupling.total_services,
                total_dependencies: analysis.coupling.total_dependencies,
                coupling_level: analysis.coupling.coupling_metric,
            },
            cycles: analysis.cycles,
            coupling: analysis.coupling,
            call_patterns,
            chatty_interfaces,
            bottlenecks,
            health_status,
            recommendations,
        }
    }
}

/// Any cycle is critical; otherwise too many hot spots is a warning.
pub fn health_status(
    cycles: &[Cycle],
    chatty: &[ChattyInterface],
    bottlenecks: &[Bottleneck],
    limits: &HealthConfig,
) -> HealthStatus {
    if !cycles.is_empty() {
        HealthStatus::Critical
    } else if bottlenecks.len() > limits.max_bottlenecks
        || chatty.len() > limits.max_chatty_interfaces
    {
        HealthStatus::Warning
    } else {
        HealthStatus::Healthy
    }
}

pub fn recommendations(
    cycles: &[Cycle],
    chatty: &[ChattyInterface],
    bottlenecks: &[Bottleneck],
) -> Vec<String> {
    let mut out = Vec::new();
    if !cycles.is_empty() {
        out.push("CRITICAL: Eliminate circular dependencies".to_string());
    }
    if !bottlenecks.is_empty() {
        out.push(format!(
            "Address {} bottleneck services",
            bottlenecks.len()
        ));
    }
    if !chatty.is_empty() {
        out.push(format!(
            "Reduce chatty communication in {} patterns",
            chatty.len()
        ));
    }
    out.push("Implement API Gateway for external communication".to_string());
    out.push("Use service mesh (Istio, Linkerd) for observability and resilience".to_string());
    out
}
