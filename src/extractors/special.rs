// src/extractors/special.rs
//
// Keyword-driven scan of extracted item text for special charges
// (restructuring, impairments, litigation, ...) with the monetary amount
// and footnote reference nearest each mention. Purely lexical; the records
// are handed downstream as-is.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

const CONTEXT_RADIUS: usize = 150;

static DOLLAR_AMOUNT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\(\s*)?\$\s*([0-9][0-9,]*(?:\.[0-9]+)?)(?:\s*(million|billion|thousand)s?)?(\s*\))?")
        .expect("Failed to compile DOLLAR_AMOUNT_RE")
});

// Amounts written without a dollar sign need a scale word to qualify.
static SCALED_AMOUNT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\(\s*)?\b([0-9][0-9,]*(?:\.[0-9]+)?)\s+(million|billion|thousand)s?\b(\s*\))?")
        .expect("Failed to compile SCALED_AMOUNT_RE")
});

static FOOTNOTE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:see\s+)?notes?\s+([0-9]{1,3}[a-z]?)\b")
        .expect("Failed to compile FOOTNOTE_RE")
});

/// A monetary amount as written in the text. Parenthesised amounts carry a
/// negative `value`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonetaryAmount {
    pub raw: String,
    pub value: f64,
    pub scale: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FootnoteReference {
    pub note_id: String,
    pub raw: String,
}

/// Configuration for the special-items scan. Disabled by default; the
/// keyword table ships with the categories the scan was tuned on and can be
/// replaced wholesale from JSON config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecialItemsConfig {
    pub enabled: bool,
    pub scan_item_7_mda: bool,
    pub confidence_threshold: f64,
    pub keywords: BTreeMap<String, Vec<String>>,
}

impl Default for SpecialItemsConfig {
    fn default() -> Self {
        SpecialItemsConfig {
            enabled: false,
            scan_item_7_mda: false,
            confidence_threshold: 0.3,
            keywords: default_keywords(),
        }
    }
}

fn default_keywords() -> BTreeMap<String, Vec<String>> {
    let table: &[(&str, &[&str])] = &[
        (
            "restructuring",
            &["restructuring", "reorganization", "workforce reduction", "severance", "facility closure"],
        ),
        (
            "impairment",
            &["impairment", "write-down", "write-off", "goodwill impairment", "asset impairment"],
        ),
        (
            "litigation",
            &["litigation", "settlement", "legal proceeding", "jury award", "arbitration"],
        ),
        (
            "discontinued_ops",
            &["discontinued operation", "disposal of business", "disposal group", "held for sale"],
        ),
        (
            "unusual",
            &["unusual item", "nonrecurring", "non-recurring", "one-time", "special charge"],
        ),
        (
            "other",
            &["gain on sale", "loss on sale", "debt extinguishment", "pension settlement"],
        ),
    ];
    table
        .iter()
        .map(|(kind, words)| {
            (kind.to_string(), words.iter().map(|w| w.to_string()).collect())
        })
        .collect()
}

/// One classified special item, with the evidence that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpecialItem {
    pub kind: String,
    pub confidence: f64,
    pub keywords_matched: Vec<String>,
    pub context: String,
    pub source_section: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_raw: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_scale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footnote_reference: Option<String>,
}

/// Extracts every monetary amount in the text, position order. Dollar
/// amounts win over bare scaled numbers when the two patterns overlap.
pub fn extract_monetary_amounts(text: &str) -> Vec<MonetaryAmount> {
    let mut amounts = Vec::new();
    let mut spans: Vec<(usize, usize)> = Vec::new();

    for m in DOLLAR_AMOUNT_RE.captures_iter(text) {
        if let Some(amount) = amount_from_captures(&m) {
            let whole = m.get(0).expect("capture 0 always present");
            spans.push((whole.start(), whole.end()));
            amounts.push(amount);
        }
    }
    for m in SCALED_AMOUNT_RE.captures_iter(text) {
        let whole = m.get(0).expect("capture 0 always present");
        if spans.iter().any(|&(s, e)| whole.start() < e && s < whole.end()) {
            continue;
        }
        if let Some(amount) = amount_from_captures(&m) {
            amounts.push(amount);
        }
    }
    amounts
}

fn amount_from_captures(caps: &regex::Captures<'_>) -> Option<MonetaryAmount> {
    let digits = caps.get(2)?.as_str().replace(',', "");
    let mut value: f64 = digits.parse().ok()?;
    if caps.get(1).is_some() && caps.get(4).map_or(false, |m| !m.as_str().is_empty()) {
        value = -value;
    }
    let scale = caps.get(3).map_or(String::new(), |m| m.as_str().to_lowercase());
    Some(MonetaryAmount {
        raw: caps.get(0)?.as_str().trim().to_string(),
        value,
        scale,
    })
}

/// Extracts footnote references ("See Note 12", "Notes 3 and 4" yields the
/// leading id).
pub fn extract_footnote_references(text: &str) -> Vec<FootnoteReference> {
    FOOTNOTE_RE
        .captures_iter(text)
        .filter_map(|caps| {
            Some(FootnoteReference {
                note_id: caps.get(1)?.as_str().to_string(),
                raw: caps.get(0)?.as_str().trim().to_string(),
            })
        })
        .collect()
}

/// Classifies special items in one extracted section. Confidence is the
/// share of a category's keywords present in the text; categories below the
/// configured threshold are dropped.
pub fn scan_special_items(
    item_id: &str,
    text: &str,
    config: &SpecialItemsConfig,
) -> Vec<SpecialItem> {
    let lower = text.to_lowercase();
    let mut found = Vec::new();

    for (kind, words) in &config.keywords {
        if words.is_empty() {
            continue;
        }
        let mut matched = Vec::new();
        let mut first_pos = usize::MAX;
        for word in words {
            if let Some(pos) = lower.find(&word.to_lowercase()) {
                matched.push(word.clone());
                first_pos = first_pos.min(pos);
            }
        }
        if matched.is_empty() {
            continue;
        }
        let confidence = matched.len() as f64 / words.len() as f64;
        if confidence < config.confidence_threshold {
            tracing::trace!(kind = %kind, confidence, "below confidence threshold");
            continue;
        }

        let context = context_window(text, first_pos.min(text.len()));
        let amount = extract_monetary_amounts(context).into_iter().next();
        let footnote = extract_footnote_references(context).into_iter().next();
        found.push(SpecialItem {
            kind: kind.clone(),
            confidence,
            keywords_matched: matched,
            context: context.to_string(),
            source_section: item_id.to_string(),
            amount_raw: amount.as_ref().map(|a| a.raw.clone()),
            amount_value: amount.as_ref().map(|a| a.value),
            amount_scale: amount.map(|a| a.scale),
            footnote_reference: footnote.map(|f| f.note_id),
        });
    }

    tracing::debug!(item = item_id, count = found.len(), "special-items scan complete");
    found
}

fn context_window(text: &str, center: usize) -> &str {
    let mut start = center.saturating_sub(CONTEXT_RADIUS);
    while start > 0 && !text.is_char_boundary(start) {
        start -= 1;
    }
    let mut end = (center + CONTEXT_RADIUS).min(text.len());
    while end < text.len() && !text.is_char_boundary(end) {
        end += 1;
    }
    &text[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "The company recorded restructuring charges of $125.3 million in 2023. \
        This includes severance costs of ($23.5 million) and facility closure costs. \
        See Note 12 for additional details. Asset impairment charges totaled 450 million.";

    #[test]
    fn extracts_dollar_scaled_and_negative_amounts() {
        let amounts = extract_monetary_amounts(SAMPLE);
        assert!(amounts.iter().any(|a| (a.value - 125.3).abs() < 0.1 && a.scale == "million"));
        assert!(amounts.iter().any(|a| a.value < 0.0), "parenthesised amount must be negative");
        assert!(
            amounts.iter().any(|a| (a.value - 450.0).abs() < 0.1),
            "bare scaled amount must be extracted"
        );
    }

    #[test]
    fn extracts_footnote_references() {
        let footnotes = extract_footnote_references(SAMPLE);
        assert!(footnotes.iter().any(|f| f.note_id == "12"));
    }

    #[test]
    fn classifies_special_items_with_confidence() {
        let config = SpecialItemsConfig { enabled: true, ..Default::default() };
        let items = scan_special_items("8", SAMPLE, &config);

        let restructuring = items.iter().find(|i| i.kind == "restructuring").unwrap();
        assert!(restructuring.confidence > 0.3 && restructuring.confidence <= 1.0);
        assert!(restructuring.keywords_matched.iter().any(|k| k == "restructuring"));
        assert_eq!(restructuring.source_section, "8");
        assert!(restructuring.amount_raw.is_some());

        assert!(items.iter().any(|i| i.kind == "impairment"));
        for item in &items {
            assert!((0.0..=1.0).contains(&item.confidence));
            assert!(!item.context.is_empty());
        }
    }

    #[test]
    fn below_threshold_categories_are_dropped() {
        let config = SpecialItemsConfig {
            enabled: true,
            confidence_threshold: 0.9,
            ..Default::default()
        };
        // Only one of five restructuring keywords appears.
        let items = scan_special_items("8", "A small restructuring took place.", &config);
        assert!(items.is_empty());
    }
}
