// src/extractors/resolver.rs
//
// The central algorithm: filters table-of-contents and cross-reference
// false positives out of the candidate list, selects one start per item
// under the schema's ordering, and computes end offsets. Every item
// independently reaches Resolved, NotFound, or Ambiguous; only a document
// with no candidates at all is treated as malformed.

use std::collections::BTreeSet;

use crate::extractors::locator::{Candidate, PatternStrength};
use crate::schema::ItemSchema;

// Calibrated policy constants. The shapes of these rules are fixed; the
// values are tunables sized against real EDGAR filings.
//
// A table of contents lives in the leading quarter of the normalized text.
pub(crate) const TOC_WINDOW_FRACTION: f64 = 0.25;
// A run counts as a table of contents when it names at least this many
// distinct items...
pub(crate) const TOC_MIN_DISTINCT_ITEMS: usize = 4;
// ...with successive headings at most this far apart.
pub(crate) const TOC_MAX_HEADING_GAP: usize = 1_500;
// A strong candidate outranks an earlier weak one only within this window.
pub(crate) const PROXIMITY_WINDOW: usize = 2_500;
// Weak candidates this close to the previous section start are stray
// cross-references when anything else is available.
pub(crate) const CROSS_REF_GUARD: usize = 200;
// Two strong candidates further apart than this fraction of the text mean
// the document body appears twice (consolidated/amended filings).
pub(crate) const DUPLICATE_SEPARATION_FRACTION: f64 = 0.4;

/// Selected start/end offsets for one item, in normalized coordinates.
/// `heading_len` is the length of the matched heading at `start`, consumed
/// by the cleaner so extracted text begins with content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedBoundary {
    pub spec_index: usize,
    pub item_id: &'static str,
    pub start: usize,
    pub end: usize,
    pub heading_len: usize,
}

/// Per-item resolution outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionStatus {
    Resolved,
    NotFound,
    Ambiguous,
}

/// Result of boundary resolution for one document.
pub struct Resolution {
    /// Boundaries in schema order, which equals position order
    /// (monotonicity invariant).
    pub boundaries: Vec<ResolvedBoundary>,
    /// Status per considered item, keyed by schema index.
    pub statuses: Vec<(usize, ResolutionStatus)>,
}

impl Resolution {
    pub fn status_of(&self, spec_index: usize) -> Option<ResolutionStatus> {
        self.statuses.iter().find(|(idx, _)| *idx == spec_index).map(|(_, s)| *s)
    }

    pub fn boundary_of(&self, spec_index: usize) -> Option<&ResolvedBoundary> {
        self.boundaries.iter().find(|b| b.spec_index == spec_index)
    }
}

/// Resolves boundaries from a position-sorted candidate list. Returns
/// `None` when the candidate list is empty: the document produced no
/// recognizable headings at all and is reported malformed by the caller.
pub fn resolve_boundaries(
    candidates: &[Candidate],
    schema: &ItemSchema,
    text_len: usize,
    with_signature: bool,
) -> Option<Resolution> {
    if candidates.is_empty() {
        return None;
    }

    let excluded = toc_exclusions(candidates, text_len);
    let kept: Vec<&Candidate> = candidates
        .iter()
        .enumerate()
        .filter(|(i, _)| !excluded.contains(i))
        .map(|(_, c)| c)
        .collect();
    tracing::debug!(
        total = candidates.len(),
        toc_excluded = excluded.len(),
        "resolving boundaries"
    );

    let duplicate_separation = (text_len as f64 * DUPLICATE_SEPARATION_FRACTION) as usize;
    let mut statuses = Vec::new();
    let mut starts: Vec<(usize, &'static str, usize, usize)> = Vec::new();
    let mut prev_start: Option<usize> = None;

    for (spec_index, spec) in schema.resolution_specs(with_signature) {
        let admissible: Vec<&Candidate> = kept
            .iter()
            .copied()
            .filter(|c| c.spec_index == spec_index)
            .filter(|c| prev_start.map_or(true, |prev| c.offset > prev))
            .collect();

        if admissible.is_empty() {
            tracing::debug!(item = spec.id, "no admissible candidate");
            statuses.push((spec_index, ResolutionStatus::NotFound));
            continue;
        }

        let pool = apply_cross_ref_guard(admissible, prev_start);
        let chosen = select(&pool);

        // Duplicate-document rule: a second strong candidate far past the
        // chosen one means the filing body appears twice and neither copy
        // can be preferred.
        if chosen.strength == PatternStrength::Strong {
            let duplicated = pool.iter().any(|c| {
                c.strength == PatternStrength::Strong
                    && c.offset > chosen.offset
                    && c.offset - chosen.offset > duplicate_separation
            });
            if duplicated {
                tracing::warn!(item = spec.id, "duplicate strong headings, marking ambiguous");
                statuses.push((spec_index, ResolutionStatus::Ambiguous));
                continue;
            }
        }

        tracing::debug!(
            item = spec.id,
            offset = chosen.offset,
            strength = ?chosen.strength,
            "selected section start: {:?}",
            chosen.matched_text
        );
        starts.push((spec_index, spec.id, chosen.offset, chosen.matched_text.len()));
        statuses.push((spec_index, ResolutionStatus::Resolved));
        prev_start = Some(chosen.offset);
    }

    // End offsets: next resolved start in schema order, else document end.
    // The last item absorbs any trailing signature/exhibit text.
    let mut boundaries = Vec::with_capacity(starts.len());
    for (i, &(spec_index, item_id, start, heading_len)) in starts.iter().enumerate() {
        let end = starts.get(i + 1).map_or(text_len, |next| next.2);
        debug_assert!(start < end, "boundary start must precede its end");
        boundaries.push(ResolvedBoundary { spec_index, item_id, start, end, heading_len });
    }

    Some(Resolution { boundaries, statuses })
}

/// Candidate indices excluded as table-of-contents entries.
///
/// A run of candidates near the document start, naming several distinct
/// items with short gaps between them, is a table of contents, but only
/// when the document corroborates it: at least half of the run's items must
/// appear again after the run. A compact document whose headings never
/// reappear is a legitimately short filing, not a TOC.
fn toc_exclusions(candidates: &[Candidate], text_len: usize) -> BTreeSet<usize> {
    let window_end = (text_len as f64 * TOC_WINDOW_FRACTION) as usize;
    let mut excluded = BTreeSet::new();
    let mut run: Vec<usize> = Vec::new();

    let flush = |run: &mut Vec<usize>, excluded: &mut BTreeSet<usize>| {
        if run.len() >= TOC_MIN_DISTINCT_ITEMS {
            let distinct: BTreeSet<usize> =
                run.iter().map(|&i| candidates[i].spec_index).collect();
            if distinct.len() >= TOC_MIN_DISTINCT_ITEMS {
                let run_end = candidates[*run.last().expect("non-empty run")].heading_end();
                let corroborated = distinct
                    .iter()
                    .filter(|&&spec_index| {
                        candidates
                            .iter()
                            .any(|c| c.spec_index == spec_index && c.offset > run_end)
                    })
                    .count();
                if corroborated * 2 >= distinct.len() {
                    tracing::debug!(
                        entries = run.len(),
                        items = distinct.len(),
                        run_end,
                        "excluding table-of-contents run"
                    );
                    excluded.extend(run.iter().copied());
                }
            }
        }
        run.clear();
    };

    for (i, c) in candidates.iter().enumerate() {
        if c.offset >= window_end {
            break;
        }
        if let Some(&last) = run.last() {
            if c.offset.saturating_sub(candidates[last].offset) > TOC_MAX_HEADING_GAP {
                flush(&mut run, &mut excluded);
            }
        }
        run.push(i);
    }
    flush(&mut run, &mut excluded);

    excluded
}

/// Drops weak candidates sitting right on top of the previous section start
/// (stray cross-references in the opening text), unless nothing else is
/// left.
fn apply_cross_ref_guard<'a>(
    admissible: Vec<&'a Candidate>,
    prev_start: Option<usize>,
) -> Vec<&'a Candidate> {
    let Some(prev) = prev_start else {
        return admissible;
    };
    if admissible.len() < 2 {
        return admissible;
    }
    let guarded: Vec<&Candidate> = admissible
        .iter()
        .copied()
        .filter(|c| {
            !(c.strength == PatternStrength::Weak && c.offset - prev < CROSS_REF_GUARD)
        })
        .collect();
    if guarded.is_empty() {
        admissible
    } else {
        guarded
    }
}

/// Earliest admissible position wins, unless a strong candidate lies within
/// the proximity window of an earlier weak one; then the strong heading
/// wins over position.
fn select<'a>(pool: &[&'a Candidate]) -> &'a Candidate {
    let earliest = pool[0];
    if earliest.strength == PatternStrength::Strong {
        return earliest;
    }
    match pool.iter().find(|c| c.strength == PatternStrength::Strong) {
        Some(strong) if strong.offset - earliest.offset <= PROXIMITY_WINDOW => strong,
        _ => earliest,
    }
}
