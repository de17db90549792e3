//! Source-control hosting operations and their failure policy.
//!
//! [`CodeHost`] is the raw remote surface; [`RepositoryClient`] wraps any
//! host and decides what a failure means. Discovery calls (file listing,
//! diff, content) are logged and degrade to a neutral value. Posting a
//! comment is the exception: the error is logged *and* returned, because
//! the caller reports failures per comment.

use async_trait::async_trait;
use critic_core::{
    ChangedFile, CommentId, CriticError, Fetched, PullRequestContext, RemoteEntry,
};

/// Remote operations against a pull request hosting API.
#[async_trait]
pub trait CodeHost: Send + Sync {
    /// List every file changed in the pull request, in API order.
    async fn list_changed_files(
        &self,
        owner: &str,
        repo: &str,
        pull_number: u64,
    ) -> Result<Vec<ChangedFile>, CriticError>;

    /// Fetch the unified diff of the pull request.
    async fn pull_request_diff(
        &self,
        owner: &str,
        repo: &str,
        pull_number: u64,
    ) -> Result<String, CriticError>;

    /// Fetch the head commit SHA of the pull request.
    async fn head_sha(&self, owner: &str, repo: &str, pull_number: u64)
        -> Result<String, CriticError>;

    /// Fetch a repository entry at `git_ref`.
    async fn file_content(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        git_ref: &str,
    ) -> Result<RemoteEntry, CriticError>;

    /// Create one line-anchored review comment on the pull request head.
    async fn create_review_comment(
        &self,
        pr: &PullRequestContext,
        body: &str,
        path: &str,
        line: u32,
    ) -> Result<CommentId, CriticError>;
}

/// Host wrapper applying the fail-open policy.
pub struct RepositoryClient<H> {
    host: H,
}

impl<H: CodeHost> RepositoryClient<H> {
    /// Wrap a host.
    pub fn new(host: H) -> Self {
        Self { host }
    }

    /// Borrow the wrapped host.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Changed files of the pull request, `[]` on failure.
    pub async fn list_changed_files(
        &self,
        owner: &str,
        repo: &str,
        pull_number: u64,
    ) -> Fetched<Vec<ChangedFile>> {
        Fetched::from_result(
            self.host.list_changed_files(owner, repo, pull_number).await,
            "fetching changed files",
        )
    }

    /// Unified diff of the pull request, `""` on failure.
    pub async fn get_diff(&self, owner: &str, repo: &str, pull_number: u64) -> Fetched<String> {
        Fetched::from_result(
            self.host.pull_request_diff(owner, repo, pull_number).await,
            "fetching PR diff",
        )
    }

    /// File bytes at `git_ref`.
    ///
    /// `Some(bytes)` for a regular file, `None` for any other entry type,
    /// degraded to `None` on failure.
    pub async fn get_file_content(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        git_ref: &str,
    ) -> Fetched<Option<Vec<u8>>> {
        let result = self
            .host
            .file_content(owner, repo, path, git_ref)
            .await
            .map(|entry| match entry {
                RemoteEntry::File(bytes) => Some(bytes),
                RemoteEntry::Other { kind } => {
                    tracing::debug!(path, kind = kind.as_str(), "entry is not a file");
                    None
                }
            });
        Fetched::from_result(result, "fetching file content")
    }

    /// Post a review comment. Failures are logged and returned.
    pub async fn post_comment(
        &self,
        pr: &PullRequestContext,
        body: &str,
        path: &str,
        line: u32,
    ) -> Result<CommentId, CriticError> {
        self.host
            .create_review_comment(pr, body, path, line)
            .await
            .inspect_err(|e| tracing::debug!(path, line, error = %e, "error posting review comment"))
    }
}
