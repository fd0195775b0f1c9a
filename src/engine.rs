// src/engine.rs
//
// The public extraction surface: one call drives normalize -> locate ->
// resolve -> clean for a single in-memory document and reports one result
// per requested item. The engine holds no state across calls and performs
// no I/O; callers own persistence, retry policy, and parallelism.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::extractors::cleaner::TextCleaner;
use crate::extractors::locator::locate_candidates;
use crate::extractors::resolver::{resolve_boundaries, ResolutionStatus};
use crate::extractors::special::{scan_special_items, SpecialItem, SpecialItemsConfig};
use crate::normalize::Normalizer;
use crate::schema::{FilingType, SchemaRegistry, REGISTRY, SIGNATURE_ITEM_ID};
use crate::utils::error::EngineError;

/// Per-item extraction status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemStatus {
    Found,
    NotFound,
    Ambiguous,
    DocumentMalformed,
}

/// One result per requested item. `Found` always carries non-empty text;
/// every other status carries none, so downstream consumers can treat the
/// absence of text as authoritative.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionResult {
    pub item_id: String,
    pub status: ItemStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Span of the item body in the decoded raw document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_char_span: Option<(usize, usize)>,
}

impl ExtractionResult {
    fn with_status(item_id: &str, status: ItemStatus) -> Self {
        ExtractionResult { item_id: item_id.to_string(), status, text: None, raw_char_span: None }
    }
}

/// Everything extracted from one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentExtraction {
    pub filing_type: FilingType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    pub results: BTreeMap<String, ExtractionResult>,
    /// Requested ids the schema does not know; reported per-id so the rest
    /// of the call proceeds.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unknown_items: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub special_items: Vec<SpecialItem>,
}

/// A raw filing as handed over by the acquisition layer. The identifier is
/// opaque to the engine and only surfaces in logs and the result record.
pub struct RawDocument<'a> {
    pub bytes: &'a [u8],
    pub encoding: Option<&'a str>,
    pub document_id: Option<&'a str>,
}

impl<'a> RawDocument<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        RawDocument { bytes, encoding: None, document_id: None }
    }
}

/// What to extract from a document. An empty item list requests every item
/// the schema knows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionRequest {
    pub filing_type: FilingType,
    #[serde(default)]
    pub filing_date: Option<NaiveDate>,
    #[serde(default)]
    pub items: Vec<String>,
}

impl ExtractionRequest {
    pub fn all(filing_type: FilingType) -> Self {
        ExtractionRequest { filing_type, filing_date: None, items: Vec::new() }
    }

    pub fn of(filing_type: FilingType, items: &[&str]) -> Self {
        ExtractionRequest {
            filing_type,
            filing_date: None,
            items: items.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Engine configuration, deserializable from the same JSON shape the
/// extraction pipeline is configured with externally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub remove_tables: bool,
    pub include_signature: bool,
    pub special_items: SpecialItemsConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            remove_tables: true,
            include_signature: false,
            special_items: SpecialItemsConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// The extraction orchestrator. Stateless per call; a single instance is
/// safely shared across worker threads.
pub struct ItemExtractor {
    registry: &'static SchemaRegistry,
    normalizer: Normalizer,
    config: EngineConfig,
}

impl ItemExtractor {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        ItemExtractor {
            registry: &*REGISTRY,
            normalizer: Normalizer::new(config.remove_tables),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &SchemaRegistry {
        self.registry
    }

    /// Extracts the requested items from one document. Structural
    /// irregularities degrade to per-item statuses; only configuration
    /// mistakes (unknown ids) and undecodable/empty input surface, and both
    /// without aborting the rest of the call.
    pub fn extract(
        &self,
        document: &RawDocument<'_>,
        request: &ExtractionRequest,
    ) -> DocumentExtraction {
        let schema = self.registry.lookup_dated(request.filing_type, request.filing_date);

        let mut unknown_items = Vec::new();
        let mut requested: Vec<&str> = if request.items.is_empty() {
            let mut all: Vec<&str> = schema.item_ids().collect();
            if self.config.include_signature {
                all.push(SIGNATURE_ITEM_ID);
            }
            all
        } else {
            let mut known = Vec::new();
            for id in &request.items {
                if schema.contains(id) {
                    known.push(id.as_str());
                } else {
                    tracing::warn!(item = %id, filing_type = %request.filing_type, "unknown item id requested");
                    unknown_items.push(id.clone());
                }
            }
            known
        };
        requested.dedup();

        let with_signature = self.config.include_signature
            || requested.iter().any(|id| *id == SIGNATURE_ITEM_ID);

        let doc = match self.normalizer.normalize(document.bytes, document.encoding) {
            Ok(doc) => doc,
            Err(err) => {
                tracing::warn!(
                    document_id = document.document_id.unwrap_or("<unknown>"),
                    %err,
                    "document malformed, skipping extraction stages"
                );
                return self.malformed(document, request, &requested, unknown_items);
            }
        };

        let candidates = locate_candidates(&doc, schema, with_signature);
        let Some(resolution) = resolve_boundaries(&candidates, schema, doc.len(), with_signature)
        else {
            tracing::warn!(
                document_id = document.document_id.unwrap_or("<unknown>"),
                "no heading candidates in document"
            );
            return self.malformed(document, request, &requested, unknown_items);
        };

        let cleaner = TextCleaner::new(&doc);
        let mut per_index: BTreeMap<usize, ExtractionResult> = BTreeMap::new();
        for (spec_index, spec) in schema.resolution_specs(with_signature) {
            let result = match resolution.status_of(spec_index) {
                Some(ResolutionStatus::Resolved) => match resolution.boundary_of(spec_index) {
                    Some(boundary) => match cleaner.clean_item(&doc, boundary, spec) {
                        Some(text) => ExtractionResult {
                            item_id: spec.id.to_string(),
                            status: ItemStatus::Found,
                            raw_char_span: Some(doc.raw_span(boundary.start..boundary.end)),
                            text: Some(text),
                        },
                        None => {
                            tracing::debug!(item = spec.id, "empty after cleaning, downgrading to NotFound");
                            ExtractionResult::with_status(spec.id, ItemStatus::NotFound)
                        }
                    },
                    None => ExtractionResult::with_status(spec.id, ItemStatus::NotFound),
                },
                Some(ResolutionStatus::Ambiguous) => {
                    ExtractionResult::with_status(spec.id, ItemStatus::Ambiguous)
                }
                Some(ResolutionStatus::NotFound) | None => {
                    ExtractionResult::with_status(spec.id, ItemStatus::NotFound)
                }
            };
            if spec.is_required && result.status != ItemStatus::Found {
                tracing::warn!(item = spec.id, status = ?result.status, "required item not extracted");
            }
            per_index.insert(spec_index, result);
        }

        let mut results = BTreeMap::new();
        for id in &requested {
            if let Some(spec_index) = schema.items().iter().position(|s| s.id == *id) {
                if let Some(result) = per_index.remove(&spec_index) {
                    results.insert(id.to_string(), result);
                }
            }
        }

        let special_items = self.scan_special(request.filing_type, &results);

        let found = results.values().filter(|r| r.status == ItemStatus::Found).count();
        tracing::info!(
            document_id = document.document_id.unwrap_or("<unknown>"),
            filing_type = %request.filing_type,
            requested = requested.len(),
            found,
            "extraction complete"
        );

        DocumentExtraction {
            filing_type: request.filing_type,
            document_id: document.document_id.map(str::to_string),
            results,
            unknown_items,
            special_items,
        }
    }

    fn malformed(
        &self,
        document: &RawDocument<'_>,
        request: &ExtractionRequest,
        requested: &[&str],
        unknown_items: Vec<String>,
    ) -> DocumentExtraction {
        let results = requested
            .iter()
            .map(|id| {
                (
                    id.to_string(),
                    ExtractionResult::with_status(id, ItemStatus::DocumentMalformed),
                )
            })
            .collect();
        DocumentExtraction {
            filing_type: request.filing_type,
            document_id: document.document_id.map(str::to_string),
            results,
            unknown_items,
            special_items: Vec::new(),
        }
    }

    /// Special-items pass over the financial sections of annual reports,
    /// when enabled.
    fn scan_special(
        &self,
        filing_type: FilingType,
        results: &BTreeMap<String, ExtractionResult>,
    ) -> Vec<SpecialItem> {
        let config = &self.config.special_items;
        if !config.enabled || filing_type != FilingType::AnnualReport {
            return Vec::new();
        }
        let mut items = Vec::new();
        for id in ["8", "7"] {
            if id == "7" && !config.scan_item_7_mda {
                continue;
            }
            if let Some(result) = results.get(id) {
                if let Some(text) = &result.text {
                    items.extend(scan_special_items(id, text, config));
                }
            }
        }
        items
    }
}

impl Default for ItemExtractor {
    fn default() -> Self {
        Self::new()
    }
}
