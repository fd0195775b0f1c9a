// src/schema/mod.rs

mod items;

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::utils::error::SchemaError;
use items::ItemDef;

/// Pseudo-item id for the trailing signature block, extractable when
/// `include_signature` is enabled.
pub const SIGNATURE_ITEM_ID: &str = "SIGNATURE";

/// The 8-K item set was renumbered on this date; filings dated on or before
/// it use the legacy numeric item ids.
static CURRENT_REPORT_RENUMBERING: Lazy<NaiveDate> =
    Lazy::new(|| NaiveDate::from_ymd_opt(2004, 8, 23).expect("valid cutoff date"));

/// Filing category determining which item schema applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilingType {
    #[serde(rename = "10-K")]
    AnnualReport,
    #[serde(rename = "10-Q")]
    QuarterlyReport,
    #[serde(rename = "8-K")]
    CurrentReport,
}

impl FilingType {
    pub fn form_name(&self) -> &'static str {
        match self {
            FilingType::AnnualReport => "10-K",
            FilingType::QuarterlyReport => "10-Q",
            FilingType::CurrentReport => "8-K",
        }
    }
}

impl fmt::Display for FilingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.form_name())
    }
}

impl FromStr for FilingType {
    type Err = SchemaError;

    /// Parses an EDGAR form name. Amended forms ("10-K/A") share the schema
    /// of the base form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let base = s.trim().trim_end_matches("/A");
        match base {
            "10-K" => Ok(FilingType::AnnualReport),
            "10-Q" => Ok(FilingType::QuarterlyReport),
            "8-K" => Ok(FilingType::CurrentReport),
            _ => Err(SchemaError::UnknownFilingType(s.to_string())),
        }
    }
}

/// One expected item of a filing type: identifier, display name, and the
/// compiled heading patterns used to recognize its section start.
///
/// Patterns come in two tiers. A *strong* pattern matches the item number
/// followed by (a prefix of) the canonical title or a known synonym; a
/// *weak* pattern matches the item number alone. The distinction feeds the
/// resolver's tie-breaking.
pub struct ItemSpec {
    pub id: &'static str,
    pub display_name: &'static str,
    pub is_required: bool,
    strong_patterns: Vec<Regex>,
    weak_pattern: Regex,
}

impl ItemSpec {
    fn compile(def: &ItemDef) -> Result<Self, SchemaError> {
        let number = regex::escape(def.number);
        let mut strong_patterns = Vec::with_capacity(1 + def.synonyms.len());
        for title in std::iter::once(def.title).chain(def.synonyms.iter().copied()) {
            let pattern = format!(
                r"(?i)\bitem\s*{}[\s.:–—-]*{}",
                number,
                title_prefix_pattern(title)
            );
            strong_patterns.push(Regex::new(&pattern).map_err(|source| SchemaError::Pattern {
                item: def.id.to_string(),
                source,
            })?);
        }
        let weak_pattern =
            Regex::new(&format!(r"(?i)\bitem\s*{}\b", number)).map_err(|source| {
                SchemaError::Pattern { item: def.id.to_string(), source }
            })?;
        Ok(ItemSpec {
            id: def.id,
            display_name: def.title,
            is_required: def.required,
            strong_patterns,
            weak_pattern,
        })
    }

    /// The signature block has no "Item N" heading; both tiers anchor on a
    /// standalone SIGNATURES line.
    fn compile_signature() -> Result<Self, SchemaError> {
        let pattern = Regex::new(r"(?im)^[ \t]*signatures?[ \t]*\r?$").map_err(|source| {
            SchemaError::Pattern { item: SIGNATURE_ITEM_ID.to_string(), source }
        })?;
        Ok(ItemSpec {
            id: SIGNATURE_ITEM_ID,
            display_name: "Signatures",
            is_required: false,
            strong_patterns: vec![pattern.clone()],
            weak_pattern: pattern,
        })
    }

    pub(crate) fn strong_patterns(&self) -> &[Regex] {
        &self.strong_patterns
    }

    pub(crate) fn weak_pattern(&self) -> &Regex {
        &self.weak_pattern
    }
}

/// Converts a display title into a heading pattern fragment matching its
/// first few words, tolerating punctuation and apostrophe variants. Title
/// words are plain alphanumerics (plus apostrophes and ampersands), so no
/// further escaping is required.
fn title_prefix_pattern(title: &str) -> String {
    const MAX_TITLE_WORDS: usize = 5;

    let mut words = Vec::new();
    for word in title.split_whitespace() {
        let mut fragment = String::new();
        for c in word.chars() {
            match c {
                '\'' | '\u{2019}' => fragment.push_str("['\u{2019}]?"),
                c if c.is_alphanumeric() || c == '&' || c == '-' => fragment.push(c),
                _ => {}
            }
        }
        if !fragment.is_empty() {
            words.push(fragment);
            if words.len() == MAX_TITLE_WORDS {
                break;
            }
        }
    }
    words.join(r"[\s,]+")
}

/// Ordered, immutable item list for one filing type. Built once at registry
/// construction; shared read-only across concurrent extractions.
pub struct ItemSchema {
    filing_type: FilingType,
    items: Vec<ItemSpec>,
}

impl ItemSchema {
    fn compile(filing_type: FilingType, defs: &[ItemDef]) -> Result<Self, SchemaError> {
        let mut items = Vec::with_capacity(defs.len() + 1);
        for def in defs {
            items.push(ItemSpec::compile(def)?);
        }
        items.push(ItemSpec::compile_signature()?);
        Ok(ItemSchema { filing_type, items })
    }

    pub fn filing_type(&self) -> FilingType {
        self.filing_type
    }

    /// All item specs in expected document order, the SIGNATURE pseudo-item
    /// last.
    pub fn items(&self) -> &[ItemSpec] {
        &self.items
    }

    pub fn spec(&self, id: &str) -> Option<&ItemSpec> {
        self.items.iter().find(|spec| spec.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.spec(id).is_some()
    }

    /// Item ids excluding the SIGNATURE pseudo-item.
    pub fn item_ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.items
            .iter()
            .map(|spec| spec.id)
            .filter(|id| *id != SIGNATURE_ITEM_ID)
    }

    /// Specs considered during location/resolution, paired with their index
    /// into `items()`. The SIGNATURE pseudo-item only participates when
    /// requested; otherwise the last real item absorbs the trailing text.
    pub(crate) fn resolution_specs(
        &self,
        with_signature: bool,
    ) -> impl Iterator<Item = (usize, &ItemSpec)> {
        self.items
            .iter()
            .enumerate()
            .filter(move |(_, spec)| with_signature || spec.id != SIGNATURE_ITEM_ID)
    }
}

/// Holds the built-in schemas, one per filing type (plus the legacy 8-K
/// variant). Loaded once, read-only afterward.
pub struct SchemaRegistry {
    annual: ItemSchema,
    quarterly: ItemSchema,
    current: ItemSchema,
    current_legacy: ItemSchema,
}

impl SchemaRegistry {
    /// Compiles the built-in tables. Panics only if a built-in pattern fails
    /// to compile, which would be a programming error in the static tables.
    pub fn new() -> Self {
        SchemaRegistry {
            annual: ItemSchema::compile(FilingType::AnnualReport, items::ANNUAL_REPORT_ITEMS)
                .expect("built-in 10-K schema must compile"),
            quarterly: ItemSchema::compile(
                FilingType::QuarterlyReport,
                items::QUARTERLY_REPORT_ITEMS,
            )
            .expect("built-in 10-Q schema must compile"),
            current: ItemSchema::compile(FilingType::CurrentReport, items::CURRENT_REPORT_ITEMS)
                .expect("built-in 8-K schema must compile"),
            current_legacy: ItemSchema::compile(
                FilingType::CurrentReport,
                items::CURRENT_REPORT_LEGACY_ITEMS,
            )
            .expect("built-in legacy 8-K schema must compile"),
        }
    }

    /// Schema for a filing type, assuming a current-era filing date.
    pub fn lookup(&self, filing_type: FilingType) -> &ItemSchema {
        self.lookup_dated(filing_type, None)
    }

    /// Schema for a filing type, honoring the 8-K renumbering cutoff when a
    /// filing date is known. Undated 8-Ks get the current item set.
    pub fn lookup_dated(
        &self,
        filing_type: FilingType,
        filing_date: Option<NaiveDate>,
    ) -> &ItemSchema {
        match filing_type {
            FilingType::AnnualReport => &self.annual,
            FilingType::QuarterlyReport => &self.quarterly,
            FilingType::CurrentReport => match filing_date {
                Some(date) if date <= *CURRENT_REPORT_RENUMBERING => &self.current_legacy,
                _ => &self.current,
            },
        }
    }

    /// String-keyed entry path for externally configured form names.
    pub fn lookup_form(&self, form: &str) -> Result<&ItemSchema, SchemaError> {
        let filing_type = form.parse::<FilingType>()?;
        Ok(self.lookup(filing_type))
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-wide registry instance; schemas are immutable so a single shared
/// copy serves all concurrent extractions.
pub static REGISTRY: Lazy<SchemaRegistry> = Lazy::new(SchemaRegistry::new);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_compiles_all_schemas() {
        let registry = SchemaRegistry::new();
        assert_eq!(registry.lookup(FilingType::AnnualReport).item_ids().count(), 23);
        assert_eq!(registry.lookup(FilingType::QuarterlyReport).item_ids().count(), 11);
        assert_eq!(registry.lookup(FilingType::CurrentReport).item_ids().count(), 32);
    }

    #[test]
    fn filing_type_round_trips_form_names() {
        assert_eq!("10-K".parse::<FilingType>().unwrap(), FilingType::AnnualReport);
        assert_eq!("10-K/A".parse::<FilingType>().unwrap(), FilingType::AnnualReport);
        assert_eq!(FilingType::QuarterlyReport.form_name(), "10-Q");
        assert!("S-1".parse::<FilingType>().is_err());
    }

    #[test]
    fn legacy_current_report_schema_selected_by_date() {
        let registry = SchemaRegistry::new();
        let before = NaiveDate::from_ymd_opt(2004, 3, 1).unwrap();
        let after = NaiveDate::from_ymd_opt(2005, 3, 1).unwrap();
        assert!(registry
            .lookup_dated(FilingType::CurrentReport, Some(before))
            .contains("7"));
        assert!(registry
            .lookup_dated(FilingType::CurrentReport, Some(after))
            .contains("9.01"));
        assert!(registry
            .lookup_dated(FilingType::CurrentReport, None)
            .contains("9.01"));
    }

    #[test]
    fn strong_pattern_matches_title_variants() {
        let registry = SchemaRegistry::new();
        let spec = registry.lookup(FilingType::AnnualReport).spec("7").unwrap();
        let strong = spec.strong_patterns();
        for heading in [
            "Item 7. Management's Discussion and Analysis of Financial Condition",
            "ITEM 7 - MANAGEMENT\u{2019}S DISCUSSION AND ANALYSIS",
            "Item 7: Managements Discussion and Analysis",
        ] {
            assert!(
                strong.iter().any(|re| re.is_match(heading)),
                "no strong pattern matched {heading:?}"
            );
        }
    }

    #[test]
    fn weak_pattern_does_not_bleed_into_lettered_items() {
        let registry = SchemaRegistry::new();
        let item_1 = registry.lookup(FilingType::AnnualReport).spec("1").unwrap();
        assert!(item_1.weak_pattern().is_match("Item 1. Business"));
        assert!(!item_1.weak_pattern().is_match("Item 1A. Risk Factors"));
    }
}
