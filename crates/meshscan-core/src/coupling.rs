use serde::{Deserialize, Serialize};

use crate::config::CouplingConfig;
use crate::graph::DependencyGraph;
use crate::types::{CouplingLevel, ServiceName};

/// A service whose outgoing dependency count exceeds the fan-out threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceFanOut {
    pub service: ServiceName,
    pub fan_out: usize,
}

/// A service whose dependent count exceeds the fan-in threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceFanIn {
    pub service: ServiceName,
    pub fan_in: usize,
}

/// Fan-in and fan-out of one service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDegree {
    pub service: ServiceName,
    pub fan_in: usize,
    pub fan_out: usize,
}

/// Aggregate coupling metrics for a dependency graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouplingReport {
    pub total_services: usize,
    pub total_dependencies: usize,
    pub average_dependencies_per_service: f64,
    pub high_fan_out_services: Vec<ServiceFanOut>,
    pub high_fan_in_services: Vec<ServiceFanIn>,
    pub coupling_metric: CouplingLevel,
}

/// Computes fan-in, fan-out and a coupling classification.
///
/// Degrees count distinct neighbours: the graph folds repeated dependencies
/// into one edge, so `total_dependencies` is the number of distinct
/// `(caller, callee)` pairs. A self-dependency counts once toward both the
/// fan-in and the fan-out of its service.
pub struct CouplingAnalyzer<'a> {
    graph: &'a DependencyGraph,
    config: &'a CouplingConfig,
}

impl<'a> CouplingAnalyzer<'a> {
    pub fn new(graph: &'a DependencyGraph, config: &'a CouplingConfig) -> Self {
        Self { graph, config }
    }

    /// Degrees of every service, in graph node order.
    pub fn degrees(&self) -> Vec<ServiceDegree> {
        self.graph
            .node_indices()
            .map(|idx| ServiceDegree {
                service: self.graph.name(idx).clone(),
                fan_in: self.graph.in_degree(idx),
                fan_out: self.graph.out_degree(idx),
            })
            .collect()
    }

    pub fn analyze(&self) -> CouplingReport {
        let degrees = self.degrees();
        let total_services = degrees.len();
        let total_dependencies: usize = degrees.iter().map(|d| d.fan_out).sum();

        let average = if total_services > 0 {
            round2(total_dependencies as f64 / total_services as f64)
        } else {
            0.0
        };

        let mut high_fan_out: Vec<ServiceFanOut> = degrees
            .iter()
            .filter(|d| d.fan_out > self.config.fan_out_threshold)
            .map(|d| ServiceFanOut {
                service: d.service.clone(),
                fan_out: d.fan_out,
            })
            .collect();
        high_fan_out.sort_by(|a, b| b.fan_out.cmp(&a.fan_out).then(a.service.cmp(&b.service)));
        high_fan_out.truncate(self.config.top_n);

        let mut high_fan_in: Vec<ServiceFanIn> = degrees
            .iter()
            .filter(|d| d.fan_in > self.config.fan_in_threshold)
            .map(|d| ServiceFanIn {
                service: d.service.clone(),
                fan_in: d.fan_in,
            })
            .collect();
        high_fan_in.sort_by(|a, b| b.fan_in.cmp(&a.fan_in).then(a.service.cmp(&b.service)));
        high_fan_in.truncate(self.config.top_n);

        let coupling_metric = self.classify(total_services, total_dependencies);

        tracing::debug!(
            total_services,
            total_dependencies,
            %coupling_metric,
            "coupling analysis complete"
        );

        CouplingReport {
            total_services,
            total_dependencies,
            average_dependencies_per_service: average,
            high_fan_out_services: high_fan_out,
            high_fan_in_services: high_fan_in,
            coupling_metric,
        }
    }

    /// Strict `>` on both boundaries: exactly one dependency per service is LOOSE.
    fn classify(&self, services: usize, dependencies: usize) -> CouplingLevel {
        let services = services as f64;
        let dependencies = dependencies as f64;
        if dependencies > services * self.config.tight_ratio {
            CouplingLevel::Tight
        } else if dependencies > services * self.config.moderate_ratio {
            CouplingLevel::Moderate
        } else {
            CouplingLevel::Loose
        }
    }
}

/// Two decimal places, halves to even (`1/8` gives `0.12`).
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze(mapping: Vec<(&str, Vec<&str>)>) -> CouplingReport {
        let graph = DependencyGraph::from_mapping(mapping).unwrap();
        CouplingAnalyzer::new(&graph, &CouplingConfig::default()).analyze()
    }

    fn fan_out_of(name: &str, count: usize) -> (String, Vec<String>) {
        (
            name.to_string(),
            (0..count).map(|i| format!("{name}-dep{i}")).collect(),
        )
    }

    #[test]
    fn test_empty_graph_zero_values() {
        let report = analyze(vec![]);
        assert_eq!(report.total_services, 0);
        assert_eq!(report.total_dependencies, 0);
        assert_eq!(report.average_dependencies_per_service, 0.0);
        assert!(report.high_fan_out_services.is_empty());
        assert!(report.high_fan_in_services.is_empty());
        assert_eq!(report.coupling_metric, CouplingLevel::Loose);
    }

    #[test]
    fn test_equal_edges_and_services_is_loose() {
        let graph = DependencyGraph::from_mapping(vec![
            ("A", vec!["B", "C"]),
            ("B", vec!["C"]),
            ("C", vec![]),
        ])
        .unwrap();
        let config = CouplingConfig::default();
        let analyzer = CouplingAnalyzer::new(&graph, &config);
        let report = analyzer.analyze();

        assert_eq!(report.total_services, 3);
        assert_eq!(report.total_dependencies, 3);
        assert_eq!(report.average_dependencies_per_service, 1.0);
        // 3 > 3 is false, so not MODERATE
        assert_eq!(report.coupling_metric, CouplingLevel::Loose);

        let degrees = analyzer.degrees();
        let a = degrees.iter().find(|d| d.service.as_str() == "A").unwrap();
        let c = degrees.iter().find(|d| d.service.as_str() == "C").unwrap();
        assert_eq!(a.fan_out, 2);
        assert_eq!(c.fan_in, 2);
    }

    #[test]
    fn test_moderate_and_tight_boundaries() {
        // 2 services, 3 edges: 3 > 2 but not > 4
        let moderate = analyze(vec![("a", vec!["a", "b"]), ("b", vec!["a"])]);
        assert_eq!(moderate.coupling_metric, CouplingLevel::Moderate);

        // 2 services, 4 edges: 4 > 4 is false, still MODERATE
        let edge = analyze(vec![("a", vec!["a", "b"]), ("b", vec!["a", "b"])]);
        assert_eq!(edge.total_dependencies, 4);
        assert_eq!(edge.coupling_metric, CouplingLevel::Moderate);

        // 1 service, 1 self edge: 1 > 1 false → LOOSE
        let single = analyze(vec![("a", vec!["a"])]);
        assert_eq!(single.coupling_metric, CouplingLevel::Loose);
    }

    #[test]
    fn test_tight_coupling() {
        // 3 services fully connected including self edges: 9 > 6
        let report = analyze(vec![
            ("a", vec!["a", "b", "c"]),
            ("b", vec!["a", "b", "c"]),
            ("c", vec!["a", "b", "c"]),
        ]);
        assert_eq!(report.total_dependencies, 9);
        assert_eq!(report.coupling_metric, CouplingLevel::Tight);
    }

    #[test]
    fn test_duplicates_counted_once() {
        let report = analyze(vec![("a", vec!["b", "b", "b"])]);
        assert_eq!(report.total_dependencies, 1);
    }

    #[test]
    fn test_average_rounded_to_two_places() {
        let report = analyze(vec![("a", vec!["b", "c"]), ("b", vec![])]);
        assert_eq!(report.average_dependencies_per_service, 0.67);
    }

    #[test]
    fn test_average_rounds_halves_to_even() {
        // 1 edge over 8 services is 0.125
        let report = analyze(vec![
            ("a", vec!["b"]),
            ("c", vec![]),
            ("d", vec![]),
            ("e", vec![]),
            ("f", vec![]),
            ("g", vec![]),
            ("h", vec![]),
        ]);
        assert_eq!(report.total_services, 8);
        assert_eq!(report.average_dependencies_per_service, 0.12);

        // 3 edges over 8 services is 0.375
        let report = analyze(vec![
            ("a", vec!["b", "c", "d"]),
            ("e", vec![]),
            ("f", vec![]),
            ("g", vec![]),
            ("h", vec![]),
        ]);
        assert_eq!(report.average_dependencies_per_service, 0.38);
    }

    #[test]
    fn test_high_fan_out_threshold_is_exclusive() {
        let graph = DependencyGraph::from_mapping(vec![fan_out_of("five", 5), fan_out_of("six", 6)])
            .unwrap();
        let report = CouplingAnalyzer::new(&graph, &CouplingConfig::default()).analyze();
        assert_eq!(
            report.high_fan_out_services,
            vec![ServiceFanOut {
                service: ServiceName::from("six"),
                fan_out: 6
            }]
        );
    }

    #[test]
    fn test_high_fan_out_sorted_and_truncated() {
        let mapping: Vec<_> = (0..7)
            .map(|i| fan_out_of(&format!("svc{i}"), 6 + i))
            .collect();
        let graph = DependencyGraph::from_mapping(mapping).unwrap();
        let report = CouplingAnalyzer::new(&graph, &CouplingConfig::default()).analyze();

        let fan_outs: Vec<usize> = report
            .high_fan_out_services
            .iter()
            .map(|s| s.fan_out)
            .collect();
        assert_eq!(fan_outs, vec![12, 11, 10, 9, 8]);
    }

    #[test]
    fn test_high_fan_in() {
        let mapping: Vec<(String, Vec<String>)> = (0..6)
            .map(|i| (format!("caller{i}"), vec!["db".to_string()]))
            .collect();
        let graph = DependencyGraph::from_mapping(mapping).unwrap();
        let report = CouplingAnalyzer::new(&graph, &CouplingConfig::default()).analyze();
        assert_eq!(report.high_fan_in_services.len(), 1);
        assert_eq!(report.high_fan_in_services[0].service.as_str(), "db");
        assert_eq!(report.high_fan_in_services[0].fan_in, 6);
    }

    #[test]
    fn test_custom_thresholds() {
        let graph = DependencyGraph::from_mapping(vec![("a", vec!["b", "c"])]).unwrap();
        let config = CouplingConfig {
            fan_out_threshold: 1,
            top_n: 1,
            moderate_ratio: 0.5,
            ..CouplingConfig::default()
        };
        let report = CouplingAnalyzer::new(&graph, &config).analyze();
        assert_eq!(report.high_fan_out_services.len(), 1);
        // 2 > 3 * 0.5
        assert_eq!(report.coupling_metric, CouplingLevel::Moderate);
    }

    #[test]
    fn test_analysis_is_repeatable() {
        let graph =
            DependencyGraph::from_mapping(vec![("a", vec!["b"]), ("b", vec!["a"])]).unwrap();
        let config = CouplingConfig::default();
        let analyzer = CouplingAnalyzer::new(&graph, &config);
        assert_eq!(analyzer.analyze(), analyzer.analyze());
    }
}
