pub mod config;
pub mod coupling;
pub mod cycles;
pub mod error;
pub mod graph;
pub mod input;
pub mod report;
pub mod traffic;
pub mod types;

pub use config::Config;
pub use coupling::{CouplingAnalyzer, CouplingReport};
pub use cycles::CycleDetector;
pub use error::{GraphError, InputError};
pub use graph::DependencyGraph;
pub use input::MeshInput;
pub use report::{GraphAnalysis, MeshReport};
pub use types::*;
