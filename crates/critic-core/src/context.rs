//! Resolution of the triggering event into a review target.
//!
//! The event context is the JSON blob a CI runner exposes for the current
//! workflow run (`GITHUB_CONTEXT`). Only a handful of fields are read; the
//! rest of the structure is ignored.

use serde_json::Value;

use crate::error::CriticError;
use crate::types::PullRequestContext;

/// What a run has been asked to review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// A pull request event with a fully resolved identity.
    PullRequest(PullRequestContext),
    /// No pull request, but an explicit override text to review.
    Override(String),
    /// Nothing to do: not a pull request event and no override text.
    Idle,
}

/// Resolve the trigger from the serialized context and the optional override text.
///
/// A missing context behaves like `{}`. When both a pull request and an
/// override text are present, the pull request wins.
///
/// # Errors
///
/// Returns [`CriticError::Serialization`] if the context is not valid JSON, and
/// [`CriticError::Context`] if the event is a pull request but the owner,
/// repository name, number or head SHA cannot be extracted.
///
/// # Examples
///
/// ```
/// use critic_core::{resolve_trigger, Trigger};
///
/// let ctx = r#"{
///     "repository": { "name": "hello-world", "owner": { "login": "octocat" } },
///     "event": { "pull_request": { "number": 7, "head": { "sha": "abc123" } } }
/// }"#;
/// match resolve_trigger(Some(ctx), None).unwrap() {
///     Trigger::PullRequest(pr) => assert_eq!(pr.to_string(), "octocat/hello-world#7"),
///     other => panic!("unexpected trigger: {other:?}"),
/// }
///
/// assert_eq!(resolve_trigger(None, None).unwrap(), Trigger::Idle);
/// ```
pub fn resolve_trigger(
    context_json: Option<&str>,
    override_text: Option<&str>,
) -> Result<Trigger, CriticError> {
    let context: Value = match context_json {
        Some(raw) if !raw.trim().is_empty() => serde_json::from_str(raw)?,
        _ => Value::Object(Default::default()),
    };
    let override_text = override_text.filter(|t| !t.is_empty());

    let Some(pull_request) = context
        .pointer("/event/pull_request")
        .filter(|v| v.is_object())
    else {
        return Ok(match override_text {
            Some(text) => Trigger::Override(text.to_string()),
            None => Trigger::Idle,
        });
    };

    let (owner, repo_name) = repository_identity(&context);
    let pull_number = pull_request
        .get("number")
        .and_then(Value::as_u64)
        .filter(|n| *n > 0);
    let head_commit_sha = pull_request
        .pointer("/head/sha")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty());

    match (owner, repo_name, pull_number, head_commit_sha) {
        (Some(owner), Some(repo_name), Some(pull_number), Some(sha)) => {
            Ok(Trigger::PullRequest(PullRequestContext {
                owner,
                repo_name,
                pull_number,
                head_commit_sha: sha.to_string(),
            }))
        }
        _ => Err(CriticError::Context(
            "unable to extract repository information from context".into(),
        )),
    }
}

/// Owner login and repository name.
///
/// Accepts `repository` as an object (`{ name, owner: { login } }`) or as an
/// `owner/name` string, falling back to `event.repository`.
fn repository_identity(context: &Value) -> (Option<String>, Option<String>) {
    for repo in [context.get("repository"), context.pointer("/event/repository")]
        .into_iter()
        .flatten()
    {
        match repo {
            Value::Object(_) => {
                let owner = repo
                    .pointer("/owner/login")
                    .and_then(Value::as_str)
                    .filter(|s| !s.is_empty());
                let name = repo
                    .get("name")
                    .and_then(Value::as_str)
                    .filter(|s| !s.is_empty());
                if let (Some(owner), Some(name)) = (owner, name) {
                    return (Some(owner.to_string()), Some(name.to_string()));
                }
            }
            Value::String(full_name) => {
                if let Some((owner, name)) = full_name.split_once('/') {
                    if !owner.is_empty() && !name.is_empty() {
                        return (Some(owner.to_string()), Some(name.to_string()));
                    }
                }
            }
            _ => {}
        }
    }
    (None, None)
}
