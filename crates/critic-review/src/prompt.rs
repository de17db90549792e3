use std::sync::LazyLock;

use critic_core::ReviewComment;
use regex::Regex;

/// Phrase the model is told to answer with when a file is clean.
pub const NO_ISSUES_MARKER: &str = "No issues found";

static LINE_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Line (\d+): (.+)$").expect("line comment regex is valid"));

/// Build the review instruction for a single file.
///
/// # Examples
///
/// ```
/// use critic_review::prompt::build_review_prompt;
///
/// let prompt = build_review_prompt("src/app.js", "let x = 1;");
/// assert!(prompt.contains("src/app.js"));
/// assert!(prompt.contains("Line X: Comment"));
/// assert!(prompt.contains("No issues found."));
/// assert!(prompt.ends_with("let x = 1;\n```"));
/// ```
pub fn build_review_prompt(filename: &str, content: &str) -> String {
    format!(
        "Please review the following {filename} code and provide feedback. \
         Format your response as \"Line X: Comment\" for each issue you find. \
         If no issues are found, respond with \"{NO_ISSUES_MARKER}.\"\n\n\
         Code:\n```\n{content}\n```"
    )
}

/// Converts raw model output into review comments.
///
/// Orchestration only depends on this trait, so the textual convention can
/// be replaced by a structured one without touching the pipeline.
pub trait ResponseParser: Send + Sync {
    /// Extract zero or more comments. Never fails: unusable output yields `[]`.
    fn parse(&self, response: &str) -> Vec<ReviewComment>;
}

/// Parser for the `Line N: comment` convention.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineCommentParser;

impl ResponseParser for LineCommentParser {
    fn parse(&self, response: &str) -> Vec<ReviewComment> {
        parse_line_comments(response)
    }
}

/// Parse `Line N: comment` entries from a model answer.
///
/// Returns `[]` as soon as the answer contains the no-issues marker.
/// Lines that do not follow the convention are skipped, as are line numbers
/// of `0` or beyond `u32`. Order and duplicates are preserved.
///
/// # Examples
///
/// ```
/// use critic_review::prompt::parse_line_comments;
///
/// let comments = parse_line_comments("intro\nLine 2: X\nnotes");
/// assert_eq!(comments.len(), 1);
/// assert_eq!(comments[0].line, 2);
/// assert_eq!(comments[0].text, "X");
///
/// assert!(parse_line_comments("Line 3: fine\nNo issues found.").is_empty());
/// ```
pub fn parse_line_comments(response: &str) -> Vec<ReviewComment> {
    if response.contains(NO_ISSUES_MARKER) {
        return Vec::new();
    }

    response
        .lines()
        .filter_map(|line| {
            let caps = LINE_COMMENT.captures(line)?;
            let number: u32 = caps[1].parse().ok().filter(|n| *n > 0)?;
            Some(ReviewComment::new(number, &caps[2]))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_issues_marker_short_circuits() {
        assert!(parse_line_comments("No issues found.").is_empty());
        assert!(parse_line_comments("Looked closely. No issues found in this file!").is_empty());
    }

    #[test]
    fn marker_wins_over_line_entries() {
        let text = "Line 1: something\nLine 2: else\nOtherwise, No issues found";
        assert!(parse_line_comments(text).is_empty());
    }

    #[test]
    fn parses_consecutive_entries() {
        let comments = parse_line_comments("Line 5: A\nLine 10: B");
        assert_eq!(
            comments,
            vec![ReviewComment::new(5, "A"), ReviewComment::new(10, "B")]
        );
    }

    #[test]
    fn skips_prose_and_blank_lines() {
        let text = "Here is my review:\n\nLine 2: X\n\n- Line 3: bulleted, not matched\nnotes";
        assert_eq!(parse_line_comments(text), vec![ReviewComment::new(2, "X")]);
    }

    #[test]
    fn keeps_text_verbatim() {
        let comments = parse_line_comments("Line 7:   leading spaces kept  ");
        assert_eq!(comments[0].text, "  leading spaces kept  ");
    }

    #[test]
    fn rejects_malformed_entries() {
        let text = "Line: missing number\nLine 4 no colon\nLine 5:\nline 6: lowercase\nLine x: nan";
        assert!(parse_line_comments(text).is_empty());
    }

    #[test]
    fn skips_zero_and_overflowing_line_numbers() {
        let text = "Line 0: zero\nLine 99999999999: huge\nLine 1: ok";
        assert_eq!(parse_line_comments(text), vec![ReviewComment::new(1, "ok")]);
    }

    #[test]
    fn handles_crlf_line_endings() {
        let comments = parse_line_comments("Line 1: first\r\nLine 2: second\r\n");
        assert_eq!(
            comments,
            vec![ReviewComment::new(1, "first"), ReviewComment::new(2, "second")]
        );
    }

    #[test]
    fn roundtrip_preserves_order_and_duplicates() {
        let expected = vec![
            ReviewComment::new(3, "first"),
            ReviewComment::new(1, "second"),
            ReviewComment::new(3, "third on a repeated line"),
            ReviewComment::new(42, "Consider using const: it's never reassigned."),
        ];
        let text = expected
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n");
        assert_eq!(parse_line_comments(&text), expected);
    }

    #[test]
    fn trait_delegates_to_line_parser() {
        let parser = LineCommentParser;
        assert_eq!(parser.parse("Line 9: z"), vec![ReviewComment::new(9, "z")]);
    }

    #[test]
    fn prompt_embeds_filename_and_content() {
        let prompt = build_review_prompt("test.js", "const x = 1;");
        assert!(prompt.starts_with("Please review the following test.js code"));
        assert!(prompt.contains("Code:\n```\nconst x = 1;\n```"));
    }
}
