use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::InputError;
use crate::graph::DependencyGraph;

/// One span of a distributed trace.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Span {
    #[serde(default)]
    pub service_name: Option<String>,
    #[serde(default)]
    pub duration_ms: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
}

impl Span {
    pub fn service(&self) -> &str {
        self.service_name.as_deref().unwrap_or("unknown")
    }

    pub fn duration(&self) -> f64 {
        self.duration_ms.unwrap_or(0.0)
    }

    pub fn is_error(&self) -> bool {
        self.status.as_deref() == Some("ERROR")
    }
}

/// An ordered list of spans; each span is called by the one before it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Trace {
    #[serde(default)]
    pub spans: Vec<Span>,
}

/// The JSON document consumed by meshscan.
///
/// `services` holds caller-supplied metadata (replica counts and the like).
/// It is carried along untouched and never read by an analysis.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeshInput {
    #[serde(default)]
    pub dependencies: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub traces: Vec<Trace>,
    #[serde(default)]
    pub services: BTreeMap<String, serde_json::Value>,
}

impl MeshInput {
    pub fn from_json(content: &str) -> Result<Self, InputError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Read and decode an input file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read input file '{}'", path.display()))?;
        let input = Self::from_json(&content)
            .with_context(|| format!("failed to parse '{}'", path.display()))?;
        tracing::debug!(
            path = %path.display(),
            services = input.dependencies.len(),
            traces = input.traces.len(),
            "loaded mesh input"
        );
        Ok(input)
    }

    /// Build the dependency graph, rejecting empty service names.
    pub fn graph(&self) -> Result<DependencyGraph, InputError> {
        Ok(DependencyGraph::from_map(&self.dependencies)?)
    }
}
