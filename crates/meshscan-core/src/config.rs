use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const CONFIG_FILE_NAME: &str = ".meshscan.toml";

/// Top-level configuration from `.meshscan.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub coupling: CouplingConfig,
    #[serde(default)]
    pub traffic: TrafficConfig,
    #[serde(default)]
    pub health: HealthConfig,
}

/// Thresholds for fan-in/fan-out reporting and coupling classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouplingConfig {
    /// A service is listed as high fan-out when its fan-out exceeds this.
    #[serde(default = "default_fan_limit")]
    pub fan_out_threshold: usize,
    #[serde(default = "default_fan_limit")]
    pub fan_in_threshold: usize,
    /// Maximum length of the high fan-in/fan-out lists.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    /// MODERATE when dependencies exceed `moderate_ratio * services`.
    #[serde(default = "default_moderate_ratio")]
    pub moderate_ratio: f64,
    /// TIGHT when dependencies exceed `tight_ratio * services`.
    #[serde(default = "default_tight_ratio")]
    pub tight_ratio: f64,
}

fn default_fan_limit() -> usize {
    5
}
fn default_top_n() -> usize {
    5
}
fn default_moderate_ratio() -> f64 {
    1.0
}
fn default_tight_ratio() -> f64 {
    2.0
}

impl Default for CouplingConfig {
    fn default() -> Self {
        Self {
            fan_out_threshold: default_fan_limit(),
            fan_in_threshold: default_fan_limit(),
            top_n: default_top_n(),
            moderate_ratio: default_moderate_ratio(),
            tight_ratio: default_tight_ratio(),
        }
    }
}

/// Thresholds applied to observed call patterns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrafficConfig {
    #[serde(default = "default_chatty_calls")]
    pub chatty_calls: u64,
    #[serde(default = "default_chatty_high_calls")]
    pub chatty_high_calls: u64,
    #[serde(default = "default_bottleneck_calls")]
    pub bottleneck_calls: u64,
    #[serde(default = "default_bottleneck_latency_ms")]
    pub bottleneck_latency_ms: f64,
    #[serde(default = "default_critical_calls")]
    pub critical_calls: u64,
}

fn default_chatty_calls() -> u64 {
    100
}
fn default_chatty_high_calls() -> u64 {
    500
}
fn default_bottleneck_calls() -> u64 {
    500
}
fn default_bottleneck_latency_ms() -> f64 {
    100.0
}
fn default_critical_calls() -> u64 {
    2000
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self {
            chatty_calls: default_chatty_calls(),
            chatty_high_calls: default_chatty_high_calls(),
            bottleneck_calls: default_bottleneck_calls(),
            bottleneck_latency_ms: default_bottleneck_latency_ms(),
            critical_calls: default_critical_calls(),
        }
    }
}

/// Limits above which a mesh without cycles is reported as WARNING.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthConfig {
    #[serde(default = "default_max_bottlenecks")]
    pub max_bottlenecks: usize,
    #[serde(default = "default_max_chatty")]
    pub max_chatty_interfaces: usize,
}

fn default_max_bottlenecks() -> usize {
    3
}
fn default_max_chatty() -> usize {
    5
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            max_bottlenecks: default_max_bottlenecks(),
            max_chatty_interfaces: default_max_chatty(),
        }
    }
}

impl Config {
    /// Load configuration from a `.meshscan.toml` file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file '{}'", path.display()))?;
        let config: Config = toml::from_str(&content).with_context(|| {
            format!(
                "failed to parse '{}'. Run `meshscan init` to create a valid config file",
                path.display()
            )
        })?;
        Ok(config)
    }

    /// Load from `.meshscan.toml` in the given directory or any ancestor, or return defaults.
    pub fn load_or_default(dir: &Path) -> Self {
        let start = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
        let mut current = start.as_path();
        loop {
            let config_path = current.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return match Self::load(&config_path) {
                    Ok(config) => {
                        tracing::debug!(path = %config_path.display(), "loaded config");
                        config
                    }
                    Err(e) => {
                        tracing::warn!(
                            "failed to load config from '{}': {e:#}. Using defaults.",
                            config_path.display()
                        );
                        Self::default()
                    }
                };
            }
            match current.parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }
        Self::default()
    }

    /// Generate default TOML content for `meshscan init`.
    pub fn default_toml() -> String {
        r#"# meshscan - Service Dependency Analysis Configuration

[coupling]
# Services whose fan-out / fan-in exceeds these values are listed as hot spots
fan_out_threshold = 5
fan_in_threshold = 5
# Maximum number of hot spots reported per list
top_n = 5
# Coupling is MODERATE when dependencies > moderate_ratio * services,
# TIGHT when dependencies > tight_ratio * services
moderate_ratio = 1.0
tight_ratio = 2.0

[traffic]
# Call patterns with more calls than this are chatty (HIGH above chatty_high_calls)
chatty_calls = 100
chatty_high_calls = 500
# A callee is a bottleneck above both limits (CRITICAL above critical_calls)
bottleneck_calls = 500
bottleneck_latency_ms = 100.0
critical_calls = 2000

[health]
# Exceeding either limit downgrades an acyclic mesh to WARNING
max_bottlenecks = 3
max_chatty_interfaces = 5
"#
        .to_string()
    }
}
