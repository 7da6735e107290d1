use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a service node.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceName(pub String);

impl ServiceName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ServiceName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A closed dependency loop. The first and last entries are the same service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cycle(pub Vec<ServiceName>);

impl Cycle {
    /// Number of distinct services on the loop (`[A, A]` has length 1).
    pub fn len(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn services(&self) -> &[ServiceName] {
        &self.0
    }

    /// Rotation-normalized form: the open loop rotated so the smallest name
    /// comes first, then closed again.
    pub fn normalized(&self) -> Cycle {
        let open = &self.0[..self.len()];
        let Some(start) = open
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.cmp(b.1))
            .map(|(i, _)| i)
        else {
            return self.clone();
        };
        let mut rotated: Vec<ServiceName> = open[start..]
            .iter()
            .chain(open[..start].iter())
            .cloned()
            .collect();
        rotated.push(rotated[0].clone());
        Cycle(rotated)
    }

    /// True if `from -> to` is one of the loop's edges.
    pub fn contains_edge(&self, from: &str, to: &str) -> bool {
        self.0
            .windows(2)
            .any(|w| w[0].as_str() == from && w[1].as_str() == to)
    }
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(ServiceName::as_str).collect();
        write!(f, "{}", names.join(" -> "))
    }
}

/// Qualitative coupling classification of a service graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CouplingLevel {
    Loose,
    Moderate,
    Tight,
}

impl fmt::Display for CouplingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CouplingLevel::Loose => write!(f, "LOOSE"),
            CouplingLevel::Moderate => write!(f, "MODERATE"),
            CouplingLevel::Tight => write!(f, "TIGHT"),
        }
    }
}

/// Overall health of an analyzed mesh. Ordered from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthStatus {
    Healthy,
    Warning,
    Critical,
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "HEALTHY"),
            HealthStatus::Warning => write!(f, "WARNING"),
            HealthStatus::Critical => write!(f, "CRITICAL"),
        }
    }
}

impl std::str::FromStr for HealthStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "healthy" => Ok(HealthStatus::Healthy),
            "warning" | "warn" => Ok(HealthStatus::Warning),
            "critical" => Ok(HealthStatus::Critical),
            _ => Err(anyhow::anyhow!("unknown health status: {s}")),
        }
    }
}

/// Severity attached to a chatty call pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChattySeverity {
    Medium,
    High,
}

/// Risk attached to a bottleneck service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    High,
    Critical,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cycle(names: &[&str]) -> Cycle {
        Cycle(names.iter().map(|n| ServiceName::from(*n)).collect())
    }

    #[test]
    fn test_cycle_len_excludes_closing_node() {
        assert_eq!(cycle(&["a", "b", "c", "a"]).len(), 3);
        assert_eq!(cycle(&["a", "a"]).len(), 1);
        assert!(cycle(&[]).is_empty());
    }

    #[test]
    fn test_cycle_normalized_rotates_to_smallest() {
        let rotated = cycle(&["c", "a", "b", "c"]).normalized();
        assert_eq!(rotated, cycle(&["a", "b", "c", "a"]));
        assert_eq!(cycle(&["x", "x"]).normalized(), cycle(&["x", "x"]));
    }

    #[test]
    fn test_cycle_contains_edge() {
        let c = cycle(&["a", "b", "a"]);
        assert!(c.contains_edge("a", "b"));
        assert!(c.contains_edge("b", "a"));
        assert!(!c.contains_edge("a", "c"));
    }

    #[test]
    fn test_cycle_display() {
        assert_eq!(cycle(&["a", "b", "a"]).to_string(), "a -> b -> a");
    }

    #[test]
    fn test_health_status_ordering() {
        assert!(HealthStatus::Healthy < HealthStatus::Warning);
        assert!(HealthStatus::Warning < HealthStatus::Critical);
    }

    #[test]
    fn test_health_status_parse() {
        assert_eq!(
            "critical".parse::<HealthStatus>().unwrap(),
            HealthStatus::Critical
        );
        assert_eq!(
            "WARN".parse::<HealthStatus>().unwrap(),
            HealthStatus::Warning
        );
        assert!("broken".parse::<HealthStatus>().is_err());
    }

    #[test]
    fn test_coupling_level_serializes_uppercase() {
        let json = serde_json::to_string(&CouplingLevel::Moderate).unwrap();
        assert_eq!(json, "\"MODERATE\"");
    }
}
