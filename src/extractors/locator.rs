// src/extractors/locator.rs
//
// Permissive pattern sweep over the normalized text. Every heading-pattern
// match becomes a candidate; table-of-contents entries and cross-references
// are expected here and filtered by the resolver.

use crate::normalize::NormalizedDocument;
use crate::schema::ItemSchema;

/// Whether a candidate matched a full canonical heading (number + title) or
/// only the looser number form. Strength feeds the resolver's tie-breaking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PatternStrength {
    Weak,
    Strong,
}

/// A text span that syntactically matches an item's heading pattern but is
/// not yet confirmed as a true section start. Offsets are positions in the
/// normalized text; raw positions are recovered through the document's
/// offset map when results are reported.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub spec_index: usize,
    pub item_id: &'static str,
    pub offset: usize,
    pub matched_text: String,
    pub strength: PatternStrength,
}

impl Candidate {
    /// End of the matched heading in normalized coordinates.
    pub fn heading_end(&self) -> usize {
        self.offset + self.matched_text.len()
    }
}

/// Runs all heading patterns of all schema items against the normalized
/// text. Returns candidates sorted by position; when the same item matches
/// at the same position under several patterns, the strongest (then
/// longest) match is kept.
pub fn locate_candidates(
    doc: &NormalizedDocument,
    schema: &ItemSchema,
    with_signature: bool,
) -> Vec<Candidate> {
    let text = doc.text();
    let mut candidates = Vec::new();

    for (spec_index, spec) in schema.resolution_specs(with_signature) {
        for re in spec.strong_patterns() {
            for m in re.find_iter(text) {
                tracing::trace!(item = spec.id, offset = m.start(), "strong candidate: {:?}", m.as_str());
                candidates.push(Candidate {
                    spec_index,
                    item_id: spec.id,
                    offset: m.start(),
                    matched_text: m.as_str().to_string(),
                    strength: PatternStrength::Strong,
                });
            }
        }
        for m in spec.weak_pattern().find_iter(text) {
            tracing::trace!(item = spec.id, offset = m.start(), "weak candidate: {:?}", m.as_str());
            candidates.push(Candidate {
                spec_index,
                item_id: spec.id,
                offset: m.start(),
                matched_text: m.as_str().to_string(),
                strength: PatternStrength::Weak,
            });
        }
    }

    candidates.sort_by(|a, b| {
        a.offset
            .cmp(&b.offset)
            .then(a.spec_index.cmp(&b.spec_index))
            .then(b.strength.cmp(&a.strength))
            .then(b.matched_text.len().cmp(&a.matched_text.len()))
    });
    candidates.dedup_by(|next, kept| kept.spec_index == next.spec_index && kept.offset == next.offset);

    tracing::debug!(count = candidates.len(), "candidate sweep complete");
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::Normalizer;
    use crate::schema::{FilingType, SchemaRegistry};

    #[test]
    fn finds_strong_and_weak_candidates_in_order() {
        let registry = SchemaRegistry::new();
        let schema = registry.lookup(FilingType::AnnualReport);
        let doc = Normalizer::default()
            .normalize(
                b"Item 1. Business\nWe make widgets. See Item 7 for trends.\n\
                  Item 7. Management's Discussion and Analysis of Financial Condition\nGood year.",
                None,
            )
            .unwrap();

        let candidates = locate_candidates(&doc, schema, false);
        assert!(candidates.windows(2).all(|w| w[0].offset <= w[1].offset));

        // The full Item 7 heading is a single strong candidate at its position.
        let strong_7: Vec<_> = candidates
            .iter()
            .filter(|c| c.item_id == "7" && c.strength == PatternStrength::Strong)
            .collect();
        assert_eq!(strong_7.len(), 1);

        // The inline cross-reference only produces a weak candidate.
        let weak_7 = candidates
            .iter()
            .find(|c| c.item_id == "7" && c.strength == PatternStrength::Weak)
            .expect("cross-reference should yield a weak candidate");
        assert!(weak_7.offset < strong_7[0].offset);
    }

    #[test]
    fn same_position_keeps_strongest_match() {
        let registry = SchemaRegistry::new();
        let schema = registry.lookup(FilingType::AnnualReport);
        let doc = Normalizer::default()
            .normalize(b"Item 1A. Risk Factors\nOur business faces risks.", None)
            .unwrap();

        let candidates = locate_candidates(&doc, schema, false);
        let at_start: Vec<_> = candidates.iter().filter(|c| c.item_id == "1A").collect();
        assert_eq!(at_start.len(), 1);
        assert_eq!(at_start[0].strength, PatternStrength::Strong);
        assert!(at_start[0].matched_text.to_lowercase().contains("risk factors"));
    }
}
