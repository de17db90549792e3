//! Property-based tests for file selection and comment parsing.

use proptest::prelude::*;

use critic_core::{ChangedFile, FileStatus, ReviewComment};
use critic_review::filter::select_files;
use critic_review::prompt::{parse_line_comments, NO_ISSUES_MARKER};

const EXTENSIONS: [&str; 6] = ["js", "ts", "jsx", "tsx", "py", "rs"];

fn changed_file() -> impl Strategy<Value = ChangedFile> {
    (
        prop::sample::select(vec!["", "src/", "src/lib/", "test/"]),
        "[a-z][a-z0-9_]{0,7}",
        prop::sample::select(EXTENSIONS.to_vec()),
    )
        .prop_map(|(dir, stem, ext)| {
            ChangedFile::new(format!("{dir}{stem}.{ext}"), FileStatus::Modified)
        })
}

fn extension(path: &str) -> &str {
    path.rsplit('.').next().unwrap_or_default()
}

// --- File selection properties ---

proptest! {
    #[test]
    fn selection_is_capped_prefix_of_filtered_list(
        files in prop::collection::vec(changed_file(), 0..40),
        chosen in prop::sample::subsequence(EXTENSIONS.to_vec(), 0..=EXTENSIONS.len()),
        max in 0usize..20,
    ) {
        let patterns: Vec<String> = chosen.iter().map(|ext| format!("*.{ext}")).collect();
        let filtered: Vec<ChangedFile> = files
            .iter()
            .filter(|f| chosen.iter().any(|ext| *ext == extension(&f.path)))
            .cloned()
            .collect();

        let selected = select_files(&files, &patterns, max);

        prop_assert_eq!(selected.len(), max.min(filtered.len()));
        prop_assert_eq!(&selected[..], &filtered[..selected.len()]);
    }

    #[test]
    fn selection_never_invents_files(
        files in prop::collection::vec(changed_file(), 0..40),
        max in 0usize..60,
    ) {
        let selected = select_files(&files, &["*.js", "*.ts"], max);
        prop_assert!(selected.len() <= max);
        prop_assert!(selected.iter().all(|f| files.contains(f)));
    }
}

// --- Response parsing properties ---

proptest! {
    #[test]
    fn rendered_comments_parse_back_exactly(
        entries in prop::collection::vec((1u32..40, "[A-Za-z0-9 ,.;:()'-]{1,60}"), 0..20),
    ) {
        prop_assume!(entries.iter().all(|(_, text)| !text.contains(NO_ISSUES_MARKER)));
        let rendered: Vec<String> = entries
            .iter()
            .map(|(line, text)| format!("Line {line}: {text}"))
            .collect();

        let expected: Vec<ReviewComment> = entries
            .iter()
            .map(|(line, text)| ReviewComment::new(*line, text.as_str()))
            .collect();
        prop_assert_eq!(parse_line_comments(&rendered.join("\n")), expected);
    }

    #[test]
    fn prose_between_entries_is_ignored(
        entries in prop::collection::vec((1u32..=u32::MAX, "[a-z0-9 .]{1,30}"), 1..10),
        prose in "[a-z ,.]{0,40}",
    ) {
        let mut text = String::new();
        for (line, comment) in &entries {
            text.push_str(&prose);
            text.push('\n');
            text.push_str(&format!("Line {line}: {comment}\n"));
        }

        let parsed = parse_line_comments(&text);
        let lines: Vec<u32> = parsed.iter().map(|c| c.line).collect();
        let expected: Vec<u32> = entries.iter().map(|(line, _)| *line).collect();
        prop_assert_eq!(lines, expected);
    }

    #[test]
    fn marker_anywhere_yields_nothing(
        entries in prop::collection::vec((1u32..100, "[a-z ]{1,20}"), 0..10),
        position in any::<prop::sample::Index>(),
    ) {
        let mut lines: Vec<String> = entries
            .iter()
            .map(|(line, text)| format!("Line {line}: {text}"))
            .collect();
        let at = position.index(lines.len() + 1);
        lines.insert(at, format!("{NO_ISSUES_MARKER}."));
        prop_assert!(parse_line_comments(&lines.join("\n")).is_empty());
    }
}
