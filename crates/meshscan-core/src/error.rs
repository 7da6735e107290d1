/// Errors raised while building a dependency graph.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("service name must not be empty")]
    EmptyServiceName,

    #[error("service '{dependent}' lists an empty dependency name")]
    EmptyDependencyName { dependent: String },
}

/// Errors raised while decoding a mesh input document or building its graph.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("invalid mesh input: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Graph(#[from] GraphError),
}
