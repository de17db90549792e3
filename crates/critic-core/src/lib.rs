//! Core types, configuration, and error handling for critic.
//!
//! This crate provides the shared foundation used by the review crate and
//! the `critic` binary:
//! - [`CriticError`] — unified error type using `thiserror` and `miette`
//! - [`CriticConfig`] — configuration loaded from `.critic.toml` and the environment
//! - [`Fetched`] — typed fail-open result for stages that degrade instead of aborting
//! - [`resolve_trigger`] — turns the CI event context into a [`Trigger`]
//! - Shared types: [`ChangedFile`], [`ReviewComment`], [`PullRequestContext`]

mod config;
mod context;
mod error;
mod outcome;
mod types;

pub use config::{
    split_patterns, CriticConfig, Environment, GitHubConfig, LlmConfig, ReviewConfig, Secrets,
};
pub use context::{resolve_trigger, Trigger};
pub use error::CriticError;
pub use outcome::Fetched;
pub use types::{
    ChangedFile, CommentId, FileStatus, PullRequestContext, RemoteEntry, ReviewComment,
};

/// A convenience `Result` type for critic operations.
pub type Result<T> = std::result::Result<T, CriticError>;
