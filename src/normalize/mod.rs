// src/normalize/mod.rs
//
// Converts raw filing bytes into a canonical plain-text stream with a
// position map back to the decoded input. Boundary resolution and slicing
// happen in normalized coordinates; reported spans are translated back
// through the map.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;

use crate::utils::error::NormalizeError;

// Tables whose markup exceeds this fraction of the document are layout
// wrappers (old filings nest the whole body in one table) and are never
// treated as data tables.
const DATA_TABLE_MAX_DOC_FRACTION: f64 = 0.3;
// A table is a data table when digits make up more than this share of its
// alphanumeric text.
const NUMERIC_TABLE_DIGIT_RATIO: f64 = 0.15;

static HTML_HINT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)</?(?:html|head|body|div|p|br|table|font|span|b|i|a|u|tr|td|h[1-6])[\s>/]")
        .expect("Failed to compile HTML_HINT_RE")
});

static COMMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").expect("Failed to compile COMMENT_RE"));

static SCRIPT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").expect("Failed to compile SCRIPT_RE")
});

static STYLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<style\b[^>]*>.*?</style\s*>").expect("Failed to compile STYLE_RE")
});

static TABLE_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)</?table\b").expect("Failed to compile TABLE_TAG_RE"));

// Tags and character entities, matched in one pass so plain text between
// them can be copied through with its offsets intact. A bare '<' that never
// closes is left alone (it is text, not markup).
static MARKUP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<[a-zA-Z/!?][^>]*>|&#x?[0-9a-fA-F]{1,8};|&[a-zA-Z][a-zA-Z0-9]{1,30};")
        .expect("Failed to compile MARKUP_RE")
});

static ENTITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&#x?[0-9a-fA-F]{1,8};|&[a-zA-Z][a-zA-Z0-9]{1,30};")
        .expect("Failed to compile ENTITY_RE")
});

/// Windows-1252 mapping for the 0x80..=0x9F range; the rest is Latin-1
/// identity. Also used to repair numeric entities emitted in that range by
/// broken authoring tools (`&#146;` meaning a right quote).
const WINDOWS_1252_C1: [char; 32] = [
    '\u{20AC}', '\u{81}', '\u{201A}', '\u{192}', '\u{201E}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{2C6}', '\u{2030}', '\u{160}', '\u{2039}', '\u{152}', '\u{8D}', '\u{17D}', '\u{8F}',
    '\u{90}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{2022}', '\u{2013}', '\u{2014}',
    '\u{2DC}', '\u{2122}', '\u{161}', '\u{203A}', '\u{153}', '\u{9D}', '\u{17E}', '\u{178}',
];

/// Canonical plain-text view of one raw document, owned by the extraction
/// call that created it.
#[derive(Debug)]
pub struct NormalizedDocument {
    text: String,
    segments: Vec<Segment>,
}

/// Maps a run of normalized text back to the decoded input. `raw_len == 0`
/// marks inserted characters (paragraph breaks, decoded entities), which all
/// report the position of the markup that produced them.
#[derive(Debug, Clone, Copy)]
struct Segment {
    norm_start: usize,
    raw_start: usize,
    raw_len: usize,
}

impl NormalizedDocument {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Position in the decoded raw document corresponding to a normalized
    /// offset. For documents that arrived as UTF-8 this equals a byte offset
    /// into the original input.
    pub fn raw_offset(&self, norm_offset: usize) -> usize {
        if self.segments.is_empty() {
            return 0;
        }
        if norm_offset >= self.text.len() {
            let last = self.segments[self.segments.len() - 1];
            return last.raw_start + last.raw_len;
        }
        let idx = self.segments.partition_point(|seg| seg.norm_start <= norm_offset);
        let seg = self.segments[idx - 1];
        let delta = norm_offset - seg.norm_start;
        seg.raw_start + delta.min(seg.raw_len)
    }

    /// Raw span for a normalized half-open range.
    pub fn raw_span(&self, span: std::ops::Range<usize>) -> (usize, usize) {
        (self.raw_offset(span.start), self.raw_offset(span.end))
    }
}

#[derive(Default)]
struct Builder {
    text: String,
    segments: Vec<Segment>,
}

impl Builder {
    fn push_copied(&mut self, s: &str, raw_start: usize) {
        if s.is_empty() {
            return;
        }
        if let Some(last) = self.segments.last_mut() {
            let norm_len = self.text.len() - last.norm_start;
            if last.raw_len == norm_len && last.raw_start + last.raw_len == raw_start {
                last.raw_len += s.len();
                self.text.push_str(s);
                return;
            }
        }
        self.segments.push(Segment { norm_start: self.text.len(), raw_start, raw_len: s.len() });
        self.text.push_str(s);
    }

    fn push_inserted(&mut self, s: &str, raw_pos: usize) {
        if s.is_empty() {
            return;
        }
        self.segments.push(Segment { norm_start: self.text.len(), raw_start: raw_pos, raw_len: 0 });
        self.text.push_str(s);
    }

    /// Paragraph break for a block-level boundary; consecutive breaks
    /// collapse to one marker.
    fn push_break(&mut self, raw_pos: usize) {
        if self.text.is_empty() || self.text.ends_with('\n') {
            return;
        }
        self.push_inserted("\n", raw_pos);
    }

    /// Cell separator; collapses against adjacent whitespace.
    fn push_space(&mut self, raw_pos: usize) {
        if self.text.is_empty() || self.text.ends_with([' ', '\n']) {
            return;
        }
        self.push_inserted(" ", raw_pos);
    }

    fn finish(self) -> NormalizedDocument {
        NormalizedDocument { text: self.text, segments: self.segments }
    }
}

/// Converts raw documents into `NormalizedDocument`s.
pub struct Normalizer {
    remove_tables: bool,
}

impl Normalizer {
    pub fn new(remove_tables: bool) -> Self {
        Normalizer { remove_tables }
    }

    pub fn normalize(
        &self,
        bytes: &[u8],
        declared_encoding: Option<&str>,
    ) -> Result<NormalizedDocument, NormalizeError> {
        let raw = decode(bytes, declared_encoding)?;
        let is_html = HTML_HINT_RE.is_match(&raw);
        tracing::debug!(bytes = bytes.len(), is_html, "normalizing document");

        let mut builder = Builder::default();
        if is_html {
            let drops = drop_spans(&raw, self.remove_tables);
            let mut cursor = 0usize;
            for &(start, end) in &drops {
                if start > cursor {
                    scan_region(&mut builder, &raw[cursor..start], cursor, true);
                }
                builder.push_break(start);
                cursor = cursor.max(end);
            }
            if cursor < raw.len() {
                scan_region(&mut builder, &raw[cursor..], cursor, true);
            }
        } else {
            scan_region(&mut builder, &raw, 0, false);
        }

        let doc = builder.finish();
        if doc.text.trim().is_empty() {
            return Err(NormalizeError::EmptyDocument);
        }
        tracing::debug!(normalized_len = doc.len(), segments = doc.segments.len(), "normalization complete");
        Ok(doc)
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Normalizer::new(true)
    }
}

fn decode(bytes: &[u8], declared: Option<&str>) -> Result<String, NormalizeError> {
    match declared {
        Some(label) => match label.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" | "ascii" | "us-ascii" => std::str::from_utf8(bytes)
                .map(str::to_string)
                .map_err(|_| {
                    NormalizeError::UnsupportedEncoding(format!("{label}: invalid byte sequence"))
                }),
            "iso-8859-1" | "iso8859-1" | "latin-1" | "latin1" | "windows-1252" | "cp1252" => {
                Ok(decode_windows_1252(bytes))
            }
            _ => Err(NormalizeError::UnsupportedEncoding(label.to_string())),
        },
        // Auto-detect: strict UTF-8 first, Windows-1252 as the total fallback.
        None => match std::str::from_utf8(bytes) {
            Ok(s) => Ok(s.to_string()),
            Err(_) => Ok(decode_windows_1252(bytes)),
        },
    }
}

fn decode_windows_1252(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| match b {
            0x80..=0x9F => WINDOWS_1252_C1[(b - 0x80) as usize],
            _ => b as char,
        })
        .collect()
}

/// Spans to drop wholesale: comments, scripts, styles, and (optionally)
/// numeric data tables. Returned sorted and non-overlapping.
fn drop_spans(raw: &str, remove_tables: bool) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    for re in [&*COMMENT_RE, &*SCRIPT_RE, &*STYLE_RE] {
        for m in re.find_iter(raw) {
            spans.push((m.start(), m.end()));
        }
    }
    if remove_tables {
        for (start, end) in table_spans(raw) {
            if is_numeric_table(&raw[start..end], raw.len()) {
                tracing::trace!(start, end, "dropping numeric table");
                spans.push((start, end));
            }
        }
    }
    merge_spans(spans)
}

/// Outermost `<table>..</table>` spans, found with a depth-tracking tag scan
/// so nested tables stay inside their parent span.
fn table_spans(raw: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for m in TABLE_TAG_RE.find_iter(raw) {
        if m.as_str().starts_with("</") {
            if depth > 0 {
                depth -= 1;
                if depth == 0 {
                    let end = raw[m.end()..]
                        .find('>')
                        .map(|i| m.end() + i + 1)
                        .unwrap_or(raw.len());
                    spans.push((start, end));
                }
            }
        } else {
            if depth == 0 {
                start = m.start();
            }
            depth += 1;
        }
    }
    spans
}

fn is_numeric_table(markup: &str, doc_len: usize) -> bool {
    if markup.len() as f64 > doc_len as f64 * DATA_TABLE_MAX_DOC_FRACTION {
        return false;
    }
    let fragment = Html::parse_fragment(markup);
    let text: String = fragment.root_element().text().collect();
    let digits = text.chars().filter(char::is_ascii_digit).count();
    let letters = text.chars().filter(|c| c.is_alphabetic()).count();
    let total = digits + letters;
    total > 0 && digits as f64 / total as f64 > NUMERIC_TABLE_DIGIT_RATIO
}

fn merge_spans(mut spans: Vec<(usize, usize)>) -> Vec<(usize, usize)> {
    spans.sort_unstable();
    let mut merged: Vec<(usize, usize)> = Vec::with_capacity(spans.len());
    for (start, end) in spans {
        match merged.last_mut() {
            Some(last) if start <= last.1 => last.1 = last.1.max(end),
            _ => merged.push((start, end)),
        }
    }
    merged
}

fn scan_region(builder: &mut Builder, region: &str, base: usize, is_html: bool) {
    let re: &Regex = if is_html { &MARKUP_RE } else { &ENTITY_RE };
    let mut pos = 0usize;
    for m in re.find_iter(region) {
        builder.push_copied(&region[pos..m.start()], base + pos);
        let token = m.as_str();
        if token.starts_with('<') {
            match tag_kind(token) {
                TagKind::Break => builder.push_break(base + m.start()),
                TagKind::Cell => builder.push_space(base + m.start()),
                TagKind::Inline => {}
            }
        } else {
            match decode_entity(token) {
                Some(decoded) => builder.push_inserted(&decoded, base + m.start()),
                // Unknown entity: keep the literal text.
                None => builder.push_copied(token, base + m.start()),
            }
        }
        pos = m.end();
    }
    builder.push_copied(&region[pos..], base + pos);
}

enum TagKind {
    Break,
    Cell,
    Inline,
}

fn tag_kind(token: &str) -> TagKind {
    let inner = token.trim_start_matches('<').trim_start_matches('/');
    let name: String = inner
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();
    match name.as_str() {
        "p" | "div" | "br" | "tr" | "li" | "ul" | "ol" | "dl" | "dt" | "dd" | "table" | "hr"
        | "blockquote" | "pre" | "center" | "title" | "head" | "body" | "html" | "form" | "h1"
        | "h2" | "h3" | "h4" | "h5" | "h6" => TagKind::Break,
        "td" | "th" | "caption" => TagKind::Cell,
        _ => TagKind::Inline,
    }
}

/// Decodes one `&...;` token. `None` means unknown (kept literally); an
/// empty string drops the character (soft hyphen).
fn decode_entity(token: &str) -> Option<String> {
    let body = &token[1..token.len() - 1];
    if let Some(num) = body.strip_prefix('#') {
        let code = if let Some(hex) = num.strip_prefix(['x', 'X']) {
            u32::from_str_radix(hex, 16).ok()?
        } else {
            num.parse::<u32>().ok()?
        };
        return Some(match code {
            0xA0 => " ".to_string(),
            0xAD => String::new(),
            // Windows-1252 repair for C1-range numeric entities.
            0x80..=0x9F => WINDOWS_1252_C1[(code - 0x80) as usize].to_string(),
            _ => char::from_u32(code)?.to_string(),
        });
    }
    let decoded = match body {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" | "ensp" | "emsp" | "thinsp" => " ",
        "shy" => "",
        "ndash" => "\u{2013}",
        "mdash" => "\u{2014}",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "ldquo" => "\u{201C}",
        "rdquo" => "\u{201D}",
        "hellip" => "\u{2026}",
        "bull" => "\u{2022}",
        "middot" => "\u{B7}",
        "sect" => "\u{A7}",
        "copy" => "\u{A9}",
        "reg" => "\u{AE}",
        "trade" => "\u{2122}",
        "cent" => "\u{A2}",
        "pound" => "\u{A3}",
        "euro" => "\u{20AC}",
        "yen" => "\u{A5}",
        "deg" => "\u{B0}",
        "plusmn" => "\u{B1}",
        "times" => "\u{D7}",
        "divide" => "\u{F7}",
        "frac12" => "\u{BD}",
        "frac14" => "\u{BC}",
        _ => return None,
    };
    Some(decoded.to_string())
}
