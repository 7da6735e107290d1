use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::TrafficConfig;
use crate::coupling::round2;
use crate::input::Trace;
use crate::types::{ChattySeverity, RiskLevel, ServiceName};

/// Aggregated calls observed from one service to another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallPattern {
    pub caller: ServiceName,
    pub callee: ServiceName,
    pub count: u64,
    pub total_latency_ms: f64,
    pub errors: u64,
    pub avg_latency_ms: f64,
    pub error_rate_percent: f64,
}

/// A call pattern with enough traffic to suggest batching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChattyInterface {
    pub caller: ServiceName,
    pub callee: ServiceName,
    pub call_count: u64,
    pub avg_latency_ms: f64,
    pub severity: ChattySeverity,
    pub recommendation: String,
}

/// A callee with both heavy traffic and high latency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bottleneck {
    pub service: ServiceName,
    pub total_calls: u64,
    pub avg_latency_ms: f64,
    pub risk_level: RiskLevel,
    pub recommendations: Vec<String>,
}

const CHATTY_RECOMMENDATION: &str = "Consider aggregating calls or batching requests";

const BOTTLENECK_RECOMMENDATIONS: &[&str] = &[
    "Add caching layer",
    "Implement rate limiting",
    "Scale service horizontally",
    "Optimize database queries",
];

#[derive(Default)]
struct PatternTotals {
    count: u64,
    total_latency_ms: f64,
    errors: u64,
}

/// Derives call statistics from trace data.
pub struct TrafficAnalyzer<'a> {
    config: &'a TrafficConfig,
}

impl<'a> TrafficAnalyzer<'a> {
    pub fn new(config: &'a TrafficConfig) -> Self {
        Self { config }
    }

    /// Pair every span with its predecessor and aggregate per (caller, callee).
    ///
    /// The latency of a call is the duration of the callee's span. Patterns are
    /// ordered by caller, then callee.
    pub fn call_patterns(&self, traces: &[Trace]) -> Vec<CallPattern> {
        let mut totals: BTreeMap<(String, String), PatternTotals> = BTreeMap::new();

        for trace in traces {
            for pair in trace.spans.windows(2) {
                let (parent, child) = (&pair[0], &pair[1]);
                let entry = totals
                    .entry((parent.service().to_string(), child.service().to_string()))
                    .or_default();
                entry.count += 1;
                entry.total_latency_ms += child.duration();
                if child.is_error() {
                    entry.errors += 1;
                }
            }
        }

        totals
            .into_iter()
            .map(|((caller, callee), t)| {
                let (avg, error_rate) = if t.count > 0 {
                    (
                        t.total_latency_ms / t.count as f64,
                        t.errors as f64 / t.count as f64 * 100.0,
                    )
                } else {
                    (0.0, 0.0)
                };
                CallPattern {
                    caller: ServiceName(caller),
                    callee: ServiceName(callee),
                    count: t.count,
                    total_latency_ms: t.total_latency_ms,
                    errors: t.errors,
                    avg_latency_ms: round2(avg),
                    error_rate_percent: round2(error_rate),
                }
            })
            .collect()
    }

    /// Patterns whose call count exceeds the chatty threshold, busiest first.
    pub fn chatty_interfaces(&self, patterns: &[CallPattern]) -> Vec<ChattyInterface> {
        let mut chatty: Vec<ChattyInterface> = patterns
            .iter()
            .filter(|p| p.count > self.config.chatty_calls)
            .map(|p| ChattyInterface {
                caller: p.caller.clone(),
                callee: p.callee.clone(),
                call_count: p.count,
                avg_latency_ms: p.avg_latency_ms,
                severity: if p.count > self.config.chatty_high_calls {
                    ChattySeverity::High
                } else {
                    ChattySeverity::Medium
                },
                recommendation: CHATTY_RECOMMENDATION.to_string(),
            })
            .collect();
        chatty.sort_by(|a, b| b.call_count.cmp(&a.call_count));
        chatty
    }

    /// Callees over both the call and latency thresholds, busiest first.
    ///
    /// A callee's latency is the unweighted mean of its per-caller averages.
    pub fn bottlenecks(&self, patterns: &[CallPattern]) -> Vec<Bottleneck> {
        let mut by_callee: BTreeMap<&ServiceName, (u64, Vec<f64>)> = BTreeMap::new();
        for p in patterns {
            let entry = by_callee.entry(&p.callee).or_default();
            entry.0 += p.count;
            entry.1.push(p.avg_latency_ms);
        }

        let mut bottlenecks: Vec<Bottleneck> = by_callee
            .into_iter()
            .filter_map(|(service, (total_calls, latencies))| {
                let avg_latency = if latencies.is_empty() {
                    0.0
                } else {
                    latencies.iter().sum::<f64>() / latencies.len() as f64
                };
                if total_calls <= self.config.bottleneck_calls
                    || avg_latency <= self.config.bottleneck_latency_ms
                {
                    return None;
                }
                Some(Bottleneck {
                    service: service.clone(),
                    total_calls,
                    avg_latency_ms: round2(avg_latency),
                    risk_level: if total_calls > self.config.critical_calls {
                        RiskLevel::Critical
                    } else {
                        RiskLevel::High
                    },
                    recommendations: BOTTLENECK_RECOMMENDATIONS
                        .iter()
                        .map(|r| r.to_string())
                        .collect(),
                })
            })
            .collect();
        bottlenecks.sort_by(|a, b| b.total_calls.cmp(&a.total_calls));
        bottlenecks
    }
}
