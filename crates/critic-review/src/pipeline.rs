use std::fmt;

use critic_core::{
    ChangedFile, CriticError, Fetched, FileStatus, PullRequestContext, ReviewComment,
    ReviewConfig,
};
use futures::StreamExt;
use serde::Serialize;

use crate::filter::FileSelector;
use crate::host::{CodeHost, RepositoryClient};
use crate::llm::CompletionModel;
use crate::prompt::ResponseParser;
use crate::reviewer::Reviewer;

/// What happened to one selected file.
#[derive(Debug)]
pub enum FileOutcome {
    /// The file was deleted by the pull request; there is nothing at head to review.
    Removed,
    /// The path at head is a directory, submodule or symlink.
    NotAFile,
    /// Content could not be fetched; the file got no comments.
    ContentUnavailable(CriticError),
    /// The file was sent to the model.
    Reviewed(ReviewedFile),
}

/// Per-comment results for a reviewed file.
#[derive(Debug, Default)]
pub struct ReviewedFile {
    /// `true` when the model call failed and the file degraded to no comments.
    pub review_degraded: bool,
    /// Comments parsed from the model answer, in answer order.
    pub comments: Vec<ReviewComment>,
    /// Number of comments posted successfully.
    pub posted: usize,
    /// Comments that could not be posted, with the reason.
    pub failed: Vec<PostFailure>,
    /// Comments withheld because of dry-run mode.
    pub skipped: usize,
}

/// A comment the hosting API rejected.
#[derive(Debug)]
pub struct PostFailure {
    /// Line the comment was anchored to.
    pub line: u32,
    /// Error returned by the host.
    pub error: CriticError,
}

/// One selected file and what happened to it.
#[derive(Debug)]
pub struct FileReport {
    /// Repository-relative path.
    pub path: String,
    /// Outcome for the file.
    pub outcome: FileOutcome,
}

/// Summary of a pipeline run.
///
/// A run always completes; degraded stages and rejected comments are
/// recorded here rather than returned as errors.
#[derive(Debug, Default)]
pub struct RunReport {
    /// The file listing failed and the run saw no files.
    pub listing_degraded: bool,
    /// The diff fetch failed.
    pub diff_degraded: bool,
    /// Size of the fetched unified diff in bytes.
    pub diff_bytes: usize,
    /// Number of changed files reported by the host.
    pub files_listed: usize,
    /// Per-file outcomes for the selected files, in selection order.
    pub files: Vec<FileReport>,
}

/// Totals derived from a [`RunReport`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStats {
    /// Files selected for review.
    pub files_selected: usize,
    /// Files actually sent to the model.
    pub files_reviewed: usize,
    /// Comments parsed across all files.
    pub comments_found: usize,
    /// Comments posted successfully.
    pub comments_posted: usize,
    /// Comments the host rejected.
    pub comments_failed: usize,
}

impl RunReport {
    /// Aggregate counts over all files.
    pub fn stats(&self) -> RunStats {
        let mut stats = RunStats {
            files_selected: self.files.len(),
            ..RunStats::default()
        };
        for file in &self.files {
            if let FileOutcome::Reviewed(r) = &file.outcome {
                stats.files_reviewed += 1;
                stats.comments_found += r.comments.len();
                stats.comments_posted += r.posted;
                stats.comments_failed += r.failed.len();
            }
        }
        stats
    }
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Files: {} selected, {} reviewed | Comments: {} found, {} posted, {} failed",
            self.files_selected,
            self.files_reviewed,
            self.comments_found,
            self.comments_posted,
            self.comments_failed,
        )
    }
}

/// Review orchestrator that drives the full pull request pipeline.
///
/// Lists changed files, selects the ones matching the configured patterns,
/// then for each file fetches its content at the head commit, asks the model
/// for a review and posts every parsed comment. Fetch and review of up to
/// `concurrency` files overlap; posting is always sequential, in file order
/// and comment order.
pub struct ReviewPipeline<H, M, P> {
    repo: RepositoryClient<H>,
    reviewer: Reviewer<M, P>,
    selector: FileSelector,
    config: ReviewConfig,
}

impl<H, M, P> ReviewPipeline<H, M, P>
where
    H: CodeHost,
    M: CompletionModel,
    P: ResponseParser,
{
    /// Create a pipeline from a host, a reviewer and review settings.
    pub fn new(host: H, reviewer: Reviewer<M, P>, config: ReviewConfig) -> Self {
        let selector = FileSelector::new(&config.file_patterns);
        Self {
            repo: RepositoryClient::new(host),
            reviewer,
            selector,
            config,
        }
    }

    /// Access the repository client, e.g. to resolve a head SHA before running.
    pub fn repository(&self) -> &RepositoryClient<H> {
        &self.repo
    }

    /// Access the reviewer.
    pub fn reviewer(&self) -> &Reviewer<M, P> {
        &self.reviewer
    }

    /// Review one pull request end to end.
    pub async fn run(&self, pr: &PullRequestContext) -> RunReport {
        tracing::info!("Reviewing PR #{} in {}/{}", pr.pull_number, pr.owner, pr.repo_name);
        let mut report = RunReport::default();

        let listed = self
            .repo
            .list_changed_files(&pr.owner, &pr.repo_name, pr.pull_number)
            .await;
        report.listing_degraded = listed.is_degraded();
        let all_files = listed.into_value();
        report.files_listed = all_files.len();

        let selected = self.selector.select(&all_files, self.config.max_files);
        tracing::info!("Found {} files to review", selected.len());

        let diff = self
            .repo
            .get_diff(&pr.owner, &pr.repo_name, pr.pull_number)
            .await;
        report.diff_degraded = diff.is_degraded();
        report.diff_bytes = diff.into_value().len();
        tracing::debug!(bytes = report.diff_bytes, "fetched PR diff");

        let concurrency = self.config.concurrency.max(1);
        let mut prepared = futures::stream::iter(selected)
            .map(|file| self.prepare(pr, file))
            .buffered(concurrency);

        while let Some((file, outcome)) = prepared.next().await {
            let outcome = match outcome {
                Prepared::Ready(outcome) => outcome,
                Prepared::Review(review) => {
                    FileOutcome::Reviewed(self.post_comments(pr, &file, review).await)
                }
            };
            report.files.push(FileReport {
                path: file.path,
                outcome,
            });
        }

        tracing::info!("Code review completed successfully ({})", report.stats());
        report
    }

    /// Fetch content and ask the model. Runs concurrently across files.
    async fn prepare(&self, pr: &PullRequestContext, file: ChangedFile) -> (ChangedFile, Prepared) {
        if file.status == FileStatus::Removed {
            tracing::info!("Skipping {} (removed)", file.path);
            return (file, Prepared::Ready(FileOutcome::Removed));
        }

        tracing::info!("Reviewing {}...", file.path);
        let content = self
            .repo
            .get_file_content(&pr.owner, &pr.repo_name, &file.path, &pr.head_commit_sha)
            .await;
        let bytes = match content {
            Fetched::Value(Some(bytes)) => bytes,
            Fetched::Value(None) => {
                tracing::info!("Skipping {} (not a file)", file.path);
                return (file, Prepared::Ready(FileOutcome::NotAFile));
            }
            Fetched::Degraded(e) => {
                return (file, Prepared::Ready(FileOutcome::ContentUnavailable(e)));
            }
        };

        let text = String::from_utf8_lossy(&bytes);
        let review = self.reviewer.review(&text, &file.path).await;
        (file, Prepared::Review(review))
    }

    async fn post_comments(
        &self,
        pr: &PullRequestContext,
        file: &ChangedFile,
        review: Fetched<Vec<ReviewComment>>,
    ) -> ReviewedFile {
        let review_degraded = review.is_degraded();
        let comments = review.into_value();
        tracing::info!("Found {} review comments for {}", comments.len(), file.path);

        let mut result = ReviewedFile {
            review_degraded,
            ..ReviewedFile::default()
        };

        for comment in &comments {
            let body = format_comment_body(&self.config.comment_prefix, comment);
            if self.config.dry_run {
                tracing::info!("[dry-run] {}:{} {}", file.path, comment.line, comment.text);
                result.skipped += 1;
                continue;
            }
            match self
                .repo
                .post_comment(pr, &body, &file.path, comment.line)
                .await
            {
                Ok(id) => {
                    tracing::info!(comment_id = %id, "Posted comment on {}:{}", file.path, comment.line);
                    result.posted += 1;
                }
                Err(error) => {
                    tracing::error!(
                        "Failed to post comment on {}:{}: {error}",
                        file.path,
                        comment.line
                    );
                    result.failed.push(PostFailure {
                        line: comment.line,
                        error,
                    });
                }
            }
        }

        result.comments = comments;
        result
    }
}

enum Prepared {
    Ready(FileOutcome),
    Review(Fetched<Vec<ReviewComment>>),
}

/// Body of a posted comment: the reviewer prefix followed by the comment text.
///
/// # Examples
///
/// ```
/// use critic_core::ReviewComment;
/// use critic_review::pipeline::format_comment_body;
///
/// let body = format_comment_body("**Bot**", &ReviewComment::new(3, "Use const."));
/// assert_eq!(body, "**Bot**: Use const.");
/// ```
pub fn format_comment_body(prefix: &str, comment: &ReviewComment) -> String {
    format!("{prefix}: {}", comment.text)
}
