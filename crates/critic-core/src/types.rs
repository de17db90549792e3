use std::fmt;

use serde::{Deserialize, Serialize};

/// A file entry reported as changed within a pull request.
///
/// # Examples
///
/// ```
/// use critic_core::{ChangedFile, FileStatus};
///
/// let file = ChangedFile::new("src/app.js", FileStatus::Modified);
/// assert_eq!(file.path, "src/app.js");
/// assert_eq!(file.status.to_string(), "modified");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedFile {
    /// Repository-relative path of the file.
    pub path: String,
    /// How the file changed in the pull request.
    pub status: FileStatus,
}

impl ChangedFile {
    /// Convenience constructor.
    pub fn new(path: impl Into<String>, status: FileStatus) -> Self {
        Self {
            path: path.into(),
            status,
        }
    }
}

/// Change classification reported by the hosting API.
///
/// # Examples
///
/// ```
/// use critic_core::FileStatus;
///
/// let status: FileStatus = serde_json::from_str("\"renamed\"").unwrap();
/// assert_eq!(status, FileStatus::Renamed);
///
/// let unknown: FileStatus = serde_json::from_str("\"archived\"").unwrap();
/// assert_eq!(unknown, FileStatus::Unknown);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Added,
    Modified,
    Removed,
    Renamed,
    Copied,
    Changed,
    Unchanged,
    /// Any status this crate does not know about.
    #[serde(other)]
    Unknown,
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FileStatus::Added => "added",
            FileStatus::Modified => "modified",
            FileStatus::Removed => "removed",
            FileStatus::Renamed => "renamed",
            FileStatus::Copied => "copied",
            FileStatus::Changed => "changed",
            FileStatus::Unchanged => "unchanged",
            FileStatus::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// A line-anchored finding extracted from the model's answer.
///
/// # Examples
///
/// ```
/// use critic_core::ReviewComment;
///
/// let comment = ReviewComment::new(5, "Use const instead of let.");
/// assert_eq!(comment.to_string(), "Line 5: Use const instead of let.");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewComment {
    /// 1-based line number in the reviewed file.
    pub line: u32,
    /// Comment text as written by the model.
    pub text: String,
}

impl ReviewComment {
    /// Convenience constructor.
    pub fn new(line: u32, text: impl Into<String>) -> Self {
        Self {
            line,
            text: text.into(),
        }
    }
}

impl fmt::Display for ReviewComment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Line {}: {}", self.line, self.text)
    }
}

/// Identity of the pull request under review.
///
/// Supplied by the invoking environment and read-only for the whole run.
///
/// # Examples
///
/// ```
/// use critic_core::PullRequestContext;
///
/// let pr = PullRequestContext {
///     owner: "octocat".into(),
///     repo_name: "hello-world".into(),
///     pull_number: 42,
///     head_commit_sha: "abc123".into(),
/// };
/// assert_eq!(pr.to_string(), "octocat/hello-world#42");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestContext {
    /// Repository owner (user or organization login).
    pub owner: String,
    /// Repository name.
    pub repo_name: String,
    /// Pull request number, always at least 1.
    pub pull_number: u64,
    /// Commit SHA of the pull request head.
    pub head_commit_sha: String,
}

impl fmt::Display for PullRequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo_name, self.pull_number)
    }
}

/// Identifier of a review comment created on the hosting platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentId(pub u64);

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A repository entry fetched at a specific ref.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteEntry {
    /// A regular file with its decoded bytes.
    File(Vec<u8>),
    /// Anything else: `dir`, `symlink`, `submodule`, ...
    Other { kind: String },
}
