use async_trait::async_trait;
use base64::Engine;
use critic_core::{
    ChangedFile, CommentId, CriticError, FileStatus, GitHubConfig, PullRequestContext,
    RemoteEntry,
};
use serde::{Deserialize, Serialize};

use crate::host::CodeHost;

const PER_PAGE: u8 = 100;

/// GitHub REST client for pull request files, diffs, contents and comments.
///
/// # Examples
///
/// ```
/// use critic_review::github::parse_pr_reference;
///
/// let (owner, repo, number) = parse_pr_reference("rust-lang/rust#12345").unwrap();
/// assert_eq!(owner, "rust-lang");
/// assert_eq!(repo, "rust");
/// assert_eq!(number, 12345);
/// ```
pub struct GitHubClient {
    octocrab: octocrab::Octocrab,
    http: reqwest::Client,
    api_url: String,
    token: String,
}

impl GitHubClient {
    /// Create a client authenticated with `token`.
    ///
    /// # Errors
    ///
    /// Returns [`CriticError::Config`] if the API URL is invalid, or
    /// [`CriticError::GitHub`] if the client cannot be built.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use critic_core::GitHubConfig;
    /// use critic_review::github::GitHubClient;
    ///
    /// # #[tokio::main] async fn main() {
    /// let client = GitHubClient::new("ghp_xxxx", &GitHubConfig::default()).unwrap();
    /// # }
    /// ```
    pub fn new(token: &str, config: &GitHubConfig) -> Result<Self, CriticError> {
        let api_url = config.api_url.trim_end_matches('/').to_string();

        let octocrab = octocrab::Octocrab::builder()
            .personal_token(token.to_string())
            .base_uri(api_url.as_str())
            .map_err(|e| CriticError::Config(format!("invalid GitHub API URL '{api_url}': {e}")))?
            .build()
            .map_err(|e| CriticError::GitHub(format!("failed to create GitHub client: {e}")))?;

        let http = reqwest::Client::new();

        Ok(Self {
            octocrab,
            http,
            api_url,
            token: token.to_string(),
        })
    }
}

#[derive(Debug, Serialize)]
struct PageParams {
    per_page: u8,
    page: u32,
}

#[derive(Debug, Deserialize)]
struct PullFile {
    filename: String,
    status: FileStatus,
}

#[derive(Debug, Serialize)]
struct RefParams<'a> {
    #[serde(rename = "ref")]
    git_ref: &'a str,
}

#[derive(Debug, Deserialize)]
struct ContentItem {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
}

#[derive(Debug, Serialize)]
struct NewReviewComment<'a> {
    body: &'a str,
    commit_id: &'a str,
    path: &'a str,
    line: u32,
    side: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreatedComment {
    id: u64,
}

#[derive(Debug, Deserialize)]
struct PullHead {
    head: HeadRef,
}

#[derive(Debug, Deserialize)]
struct HeadRef {
    sha: String,
}

#[async_trait]
impl CodeHost for GitHubClient {
    async fn list_changed_files(
        &self,
        owner: &str,
        repo: &str,
        pull_number: u64,
    ) -> Result<Vec<ChangedFile>, CriticError> {
        let route = format!("/repos/{owner}/{repo}/pulls/{pull_number}/files");
        let mut files = Vec::new();
        let mut page = 1;
        loop {
            let params = PageParams {
                per_page: PER_PAGE,
                page,
            };
            let batch: Vec<PullFile> = self
                .octocrab
                .get(&route, Some(&params))
                .await
                .map_err(|e| CriticError::GitHub(format!("failed to list PR files: {e}")))?;
            let short_page = batch.len() < usize::from(PER_PAGE);
            files.extend(
                batch
                    .into_iter()
                    .map(|f| ChangedFile::new(f.filename, f.status)),
            );
            if short_page {
                break;
            }
            page += 1;
        }
        Ok(files)
    }

    async fn pull_request_diff(
        &self,
        owner: &str,
        repo: &str,
        pull_number: u64,
    ) -> Result<String, CriticError> {
        let url = format!("{}/repos/{owner}/{repo}/pulls/{pull_number}", self.api_url);

        let response = self
            .http
            .get(&url)
            .header("Accept", "application/vnd.github.v3.diff")
            .header("Authorization", format!("Bearer {}", self.token))
            .header("User-Agent", "critic")
            .send()
            .await
            .map_err(|e| CriticError::GitHub(format!("failed to fetch PR diff: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CriticError::GitHub(format!(
                "GitHub API error {status}: {body}"
            )));
        }

        response
            .text()
            .await
            .map_err(|e| CriticError::GitHub(format!("failed to read diff response: {e}")))
    }

    async fn head_sha(
        &self,
        owner: &str,
        repo: &str,
        pull_number: u64,
    ) -> Result<String, CriticError> {
        let route = format!("/repos/{owner}/{repo}/pulls/{pull_number}");
        let pull: PullHead = self
            .octocrab
            .get(route, None::<&()>)
            .await
            .map_err(|e| CriticError::GitHub(format!("failed to fetch pull request: {e}")))?;
        Ok(pull.head.sha)
    }

    async fn file_content(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        git_ref: &str,
    ) -> Result<RemoteEntry, CriticError> {
        let route = format!("/repos/{owner}/{repo}/contents/{}", encode_path(path));
        let body: serde_json::Value = self
            .octocrab
            .get(route, Some(&RefParams { git_ref }))
            .await
            .map_err(|e| CriticError::GitHub(format!("failed to fetch {path}: {e}")))?;
        decode_entry(body)
    }

    async fn create_review_comment(
        &self,
        pr: &PullRequestContext,
        body: &str,
        path: &str,
        line: u32,
    ) -> Result<CommentId, CriticError> {
        let route = format!(
            "/repos/{}/{}/pulls/{}/comments",
            pr.owner, pr.repo_name, pr.pull_number
        );
        let request = NewReviewComment {
            body,
            commit_id: &pr.head_commit_sha,
            path,
            line,
            side: "RIGHT",
        };
        let created: CreatedComment = self
            .octocrab
            .post(route, Some(&request))
            .await
            .map_err(|e| CriticError::GitHub(format!("failed to post review comment: {e}")))?;
        Ok(CommentId(created.id))
    }
}

/// Interpret a contents API response.
///
/// Directories come back as a JSON array; everything else is an object with
/// a `type` field. Only `file` entries carry content.
fn decode_entry(body: serde_json::Value) -> Result<RemoteEntry, CriticError> {
    if body.is_array() {
        return Ok(RemoteEntry::Other { kind: "dir".into() });
    }
    let item: ContentItem = serde_json::from_value(body)?;
    if item.kind != "file" {
        return Ok(RemoteEntry::Other { kind: item.kind });
    }

    match item.encoding.as_deref() {
        None | Some("base64") => {}
        Some(other) => {
            return Err(CriticError::Decode(format!(
                "unsupported content encoding '{other}' (file may be too large)"
            )))
        }
    }

    let encoded: String = item
        .content
        .unwrap_or_default()
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|e| CriticError::Decode(format!("invalid base64 content: {e}")))?;
    Ok(RemoteEntry::File(bytes))
}

/// Percent-encode a repository path, keeping `/` separators.
fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Parse a PR reference string (`owner/repo#number`) into its components.
///
/// # Errors
///
/// Returns [`CriticError::Config`] if the format is invalid.
///
/// # Examples
///
/// ```
/// use critic_review::github::parse_pr_reference;
///
/// let (owner, repo, num) = parse_pr_reference("octocat/hello-world#42").unwrap();
/// assert_eq!(owner, "octocat");
/// assert_eq!(repo, "hello-world");
/// assert_eq!(num, 42);
/// ```
pub fn parse_pr_reference(pr_ref: &str) -> Result<(String, String, u64), CriticError> {
    let invalid = || {
        CriticError::Config(format!(
            "invalid PR reference '{pr_ref}', expected owner/repo#number"
        ))
    };
    let (owner_repo, number_str) = pr_ref.split_once('#').ok_or_else(invalid)?;
    let (owner, repo) = owner_repo.split_once('/').ok_or_else(invalid)?;
    if owner.is_empty() || repo.is_empty() {
        return Err(invalid());
    }
    let number: u64 = number_str
        .parse()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| CriticError::Config(format!("invalid PR number: {number_str}")))?;
    Ok((owner.to_string(), repo.to_string(), number))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_valid_pr_reference() {
        let (owner, repo, num) = parse_pr_reference("rust-lang/rust#12345").unwrap();
        assert_eq!(owner, "rust-lang");
        assert_eq!(repo, "rust");
        assert_eq!(num, 12345);
    }

    #[test]
    fn parse_pr_reference_missing_hash() {
        assert!(parse_pr_reference("owner/repo").is_err());
    }

    #[test]
    fn parse_pr_reference_missing_slash() {
        assert!(parse_pr_reference("repo#123").is_err());
    }

    #[test]
    fn parse_pr_reference_invalid_number() {
        assert!(parse_pr_reference("owner/repo#abc").is_err());
        assert!(parse_pr_reference("owner/repo#0").is_err());
    }

    #[test]
    fn decode_file_entry_with_wrapped_base64() {
        // GitHub wraps base64 content at 60 columns.
        let body = json!({
            "type": "file",
            "encoding": "base64",
            "content": "bGV0IHggPSAxOyBjb25z\nb2xlLmxvZyh4KTs=\n"
        });
        let entry = decode_entry(body).unwrap();
        assert_eq!(entry, RemoteEntry::File(b"let x = 1; console.log(x);".to_vec()));
    }

    #[test]
    fn decode_directory_listing() {
        let body = json!([{ "type": "file", "name": "a.js" }]);
        assert_eq!(
            decode_entry(body).unwrap(),
            RemoteEntry::Other { kind: "dir".into() }
        );
    }

    #[test]
    fn decode_submodule_entry() {
        let body = json!({ "type": "submodule", "submodule_git_url": "git://x" });
        assert_eq!(
            decode_entry(body).unwrap(),
            RemoteEntry::Other {
                kind: "submodule".into()
            }
        );
    }

    #[test]
    fn decode_rejects_unsupported_encoding() {
        let body = json!({ "type": "file", "encoding": "none", "content": "" });
        assert!(matches!(decode_entry(body), Err(CriticError::Decode(_))));
    }

    #[test]
    fn decode_rejects_bad_base64() {
        let body = json!({ "type": "file", "encoding": "base64", "content": "!!!" });
        assert!(decode_entry(body).is_err());
    }

    #[test]
    fn encode_path_keeps_separators() {
        assert_eq!(encode_path("src/app.js"), "src/app.js");
        assert_eq!(encode_path("docs/my file#1.md"), "docs/my%20file%231.md");
        assert_eq!(encode_path("src/a?b&c.js"), "src/a%3Fb%26c.js");
        assert_eq!(encode_path("lib/日本.ts"), "lib/%E6%97%A5%E6%9C%AC.ts");
    }

    #[test]
    fn review_comment_body_shape() {
        let req = NewReviewComment {
            body: "hello",
            commit_id: "sha123",
            path: "file.js",
            line: 1,
            side: "RIGHT",
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            json!({
                "body": "hello",
                "commit_id": "sha123",
                "path": "file.js",
                "line": 1,
                "side": "RIGHT"
            })
        );
    }

    #[test]
    fn pull_file_deserializes() {
        let files: Vec<PullFile> = serde_json::from_value(json!([
            { "filename": "src/test.js", "status": "modified", "additions": 3 },
            { "filename": "src/utils.ts", "status": "added" }
        ]))
        .unwrap();
        assert_eq!(files[0].filename, "src/test.js");
        assert_eq!(files[1].status, FileStatus::Added);
    }
}
