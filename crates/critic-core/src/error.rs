use std::path::PathBuf;

/// Errors that can occur across the critic pipeline.
///
/// Each variant wraps a specific error domain. Library crates use this type
/// directly; the binary renders it through `miette` at the boundary.
///
/// # Examples
///
/// ```
/// use critic_core::CriticError;
///
/// let err = CriticError::Config("missing API key".into());
/// assert!(err.to_string().contains("missing API key"));
/// ```
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum CriticError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    #[diagnostic(code(critic::config))]
    Config(String),

    /// The triggering event context could not be resolved.
    #[error("context error: {0}")]
    #[diagnostic(code(critic::context))]
    Context(String),

    /// GitHub API or transport failure.
    #[error("GitHub error: {0}")]
    GitHub(String),

    /// LLM API or response error.
    #[error("LLM error: {0}")]
    Llm(String),

    /// Remote content could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// JSON serialization / deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// An explicitly requested file does not exist.
    #[error("file not found: {}", .0.display())]
    #[diagnostic(code(critic::config), help("check the --config path"))]
    FileNotFound(PathBuf),
}
