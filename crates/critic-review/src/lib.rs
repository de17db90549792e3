//! Pull request review: file selection, the LLM round trip, and GitHub
//! integration.
//!
//! Provides the review pipeline: pattern-based file selection, prompt
//! construction and response parsing, the LLM client, the GitHub client
//! behind the [`host::CodeHost`] seam, and the orchestrator that ties them
//! together.

pub mod filter;
pub mod github;
pub mod host;
pub mod llm;
pub mod pipeline;
pub mod prompt;
pub mod reviewer;
