// src/extractors/cleaner.rs
//
// Slices resolved boundaries out of the normalized text and produces the
// final per-item body: heading and title echo stripped, page-number
// artifacts removed, whitespace collapsed. An item whose body is empty
// after cleaning is downgraded to NotFound by the caller.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::extractors::resolver::ResolvedBoundary;
use crate::normalize::NormalizedDocument;
use crate::schema::ItemSpec;

// Artifact stripping only engages when the document shows a repeating
// page-number pattern; isolated numeric lines are left alone.
pub(crate) const PAGE_ARTIFACT_MIN_REPEATS: usize = 3;

// Lines that are nothing but a page marker: "23", "F-12", "II-4", "Page 17".
static PAGE_ARTIFACT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[ \t]*(?:page[ \t]+)?(?:[0-9]{1,4}|[a-z]{1,4}-[0-9]{1,3})[ \t]*$")
        .expect("Failed to compile PAGE_ARTIFACT_RE")
});

static WS_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t\u{a0}]+").expect("Failed to compile WS_RUN_RE"));

static BLANK_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("Failed to compile BLANK_RUN_RE"));

// An echo line longer than this is body text, not a heading remnant.
const MAX_ECHO_LINE: usize = 120;
const MIN_ECHO_FOLD: usize = 3;

/// Per-document text cleaner. Built once per extraction so the page-artifact
/// decision is made against the whole document, then applied per item.
pub struct TextCleaner {
    strip_artifacts: bool,
}

impl TextCleaner {
    pub fn new(doc: &NormalizedDocument) -> Self {
        let artifact_lines = doc
            .text()
            .lines()
            .filter(|line| PAGE_ARTIFACT_RE.is_match(line))
            .count();
        let strip_artifacts = artifact_lines >= PAGE_ARTIFACT_MIN_REPEATS;
        tracing::debug!(artifact_lines, strip_artifacts, "text cleaner ready");
        TextCleaner { strip_artifacts }
    }

    /// Cleans one resolved item body. `None` means the slice held no content
    /// once the heading, artifacts, and whitespace were removed.
    pub fn clean_item(
        &self,
        doc: &NormalizedDocument,
        boundary: &ResolvedBoundary,
        spec: &ItemSpec,
    ) -> Option<String> {
        let slice = &doc.text()[boundary.start..boundary.end];
        // Drop the matched heading so the body begins with content.
        let body = slice.get(boundary.heading_len..).unwrap_or("");
        let body = strip_title_echo(body, spec.display_name);

        let mut lines = Vec::with_capacity(body.lines().count());
        for line in body.lines() {
            if self.strip_artifacts && PAGE_ARTIFACT_RE.is_match(line) {
                continue;
            }
            lines.push(WS_RUN_RE.replace_all(line.trim(), " ").into_owned());
        }
        let joined = lines.join("\n");
        let collapsed = BLANK_RUN_RE.replace_all(&joined, "\n\n");
        let cleaned = collapsed.trim();
        if cleaned.is_empty() {
            None
        } else {
            Some(cleaned.to_string())
        }
    }
}

/// Removes leading lines that merely repeat the item's own title (the tail
/// of a heading the locator matched only partially, or a title wrapped onto
/// its own lines).
fn strip_title_echo<'a>(body: &'a str, display_name: &str) -> &'a str {
    let title_fold = fold(display_name);
    let mut rest = body;
    for _ in 0..3 {
        let trimmed = rest.trim_start();
        let line_end = trimmed.find('\n').unwrap_or(trimmed.len());
        let line = &trimmed[..line_end];
        if line.is_empty() || line.len() > MAX_ECHO_LINE {
            return trimmed;
        }
        let line_fold = fold(line);
        if line_fold.len() >= MIN_ECHO_FOLD
            && (title_fold.contains(&line_fold) || line_fold.starts_with(&title_fold))
        {
            rest = &trimmed[line_end..];
            continue;
        }
        return trimmed;
    }
    rest
}

fn fold(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::Normalizer;
    use crate::schema::{FilingType, SchemaRegistry};

    fn boundary(
        doc: &NormalizedDocument,
        spec_index: usize,
        heading: &str,
        end: usize,
    ) -> ResolvedBoundary {
        let start = doc.text().find(heading).unwrap();
        ResolvedBoundary {
            spec_index,
            item_id: "7",
            start,
            end,
            heading_len: heading.len(),
        }
    }

    #[test]
    fn strips_heading_and_title_echo() {
        let registry = SchemaRegistry::new();
        let schema = registry.lookup(FilingType::AnnualReport);
        let spec = schema.spec("7").unwrap();

        let doc = Normalizer::default()
            .normalize(
                b"Item 7. Management's Discussion and Analysis\nof Financial Condition and Results of Operations\nNet sales increased 12% year over year.",
                None,
            )
            .unwrap();
        let b = boundary(&doc, 9, "Item 7.", doc.len());
        let text = TextCleaner::new(&doc).clean_item(&doc, &b, spec).unwrap();
        assert_eq!(text, "Net sales increased 12% year over year.");
    }

    #[test]
    fn removes_repeating_page_artifacts() {
        let registry = SchemaRegistry::new();
        let schema = registry.lookup(FilingType::AnnualReport);
        let spec = schema.spec("7").unwrap();

        let doc = Normalizer::default()
            .normalize(
                b"12\nItem 7. Overview of operations\nFirst paragraph.\n13\nSecond paragraph.\nF-14\nThird paragraph.",
                None,
            )
            .unwrap();
        let b = boundary(&doc, 9, "Item 7.", doc.len());
        let text = TextCleaner::new(&doc).clean_item(&doc, &b, spec).unwrap();
        assert!(!text.contains("13"));
        assert!(!text.contains("F-14"));
        assert!(text.contains("First paragraph.\nSecond paragraph.\nThird paragraph."));
    }

    #[test]
    fn lone_numeric_line_survives_without_repetition() {
        let registry = SchemaRegistry::new();
        let schema = registry.lookup(FilingType::AnnualReport);
        let spec = schema.spec("7").unwrap();

        let doc = Normalizer::default()
            .normalize(b"Item 7. Results\n2023\nRevenue was flat.", None)
            .unwrap();
        let b = boundary(&doc, 9, "Item 7.", doc.len());
        let text = TextCleaner::new(&doc).clean_item(&doc, &b, spec).unwrap();
        assert!(text.contains("2023"));
    }

    #[test]
    fn collapses_whitespace_runs() {
        let registry = SchemaRegistry::new();
        let schema = registry.lookup(FilingType::AnnualReport);
        let spec = schema.spec("7").unwrap();

        let doc = Normalizer::default()
            .normalize(b"Item 7.\nRevenue   grew\t\tsharply.\n\n\n\nMargins held.", None)
            .unwrap();
        let b = boundary(&doc, 9, "Item 7.", doc.len());
        let text = TextCleaner::new(&doc).clean_item(&doc, &b, spec).unwrap();
        assert_eq!(text, "Revenue grew sharply.\n\nMargins held.");
    }

    #[test]
    fn empty_body_yields_none() {
        let registry = SchemaRegistry::new();
        let schema = registry.lookup(FilingType::AnnualReport);
        let spec = schema.spec("7").unwrap();

        let doc = Normalizer::default()
            .normalize(b"Item 7.   \n   \nItem 7A. Market Risk\nDetails follow.", None)
            .unwrap();
        let end = doc.text().find("Item 7A").unwrap();
        let b = boundary(&doc, 9, "Item 7.", end);
        assert!(TextCleaner::new(&doc).clean_item(&doc, &b, spec).is_none());
    }
}
