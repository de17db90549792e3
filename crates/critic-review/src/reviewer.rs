use critic_core::{Fetched, ReviewComment};

use crate::llm::CompletionModel;
use crate::prompt::{self, LineCommentParser, ResponseParser};

/// Asks the model to review one file and turns the answer into comments.
///
/// A failed model call never reaches the caller: it is logged and the file
/// ends up with no comments ([`Fetched::Degraded`]).
pub struct Reviewer<M, P = LineCommentParser> {
    model: M,
    parser: P,
}

impl<M: CompletionModel> Reviewer<M> {
    /// Reviewer using the `Line N: comment` convention.
    pub fn new(model: M) -> Self {
        Self {
            model,
            parser: LineCommentParser,
        }
    }
}

impl<M: CompletionModel, P: ResponseParser> Reviewer<M, P> {
    /// Reviewer with a custom response parser.
    pub fn with_parser(model: M, parser: P) -> Self {
        Self { model, parser }
    }

    /// The completion backend.
    pub fn backend(&self) -> &M {
        &self.model
    }

    /// Model identifier, for logging.
    pub fn model(&self) -> &str {
        self.model.model()
    }

    /// Review `content` of `filename` with exactly one model request.
    pub async fn review(&self, content: &str, filename: &str) -> Fetched<Vec<ReviewComment>> {
        let prompt = prompt::build_review_prompt(filename, content);
        match self.model.complete(&prompt).await {
            Ok(answer) => Fetched::Value(self.parser.parse(&answer)),
            Err(e) => {
                tracing::warn!(file = filename, error = %e, "error calling LLM API");
                Fetched::Degraded(e)
            }
        }
    }
}
