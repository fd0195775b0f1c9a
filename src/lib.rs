// src/lib.rs
//! Section boundary extraction engine for SEC filings.
//!
//! Given a raw filing document (HTML or plain text) and the item schema of
//! its filing type, the engine locates each requested item's section body,
//! rejects table-of-contents and cross-reference false positives, and
//! returns cleaned per-item text with spans back into the original
//! document. It performs no I/O: acquisition, persistence, and scheduling
//! belong to the caller.
//!
//! ```no_run
//! use sec_item_engine::{ExtractionRequest, FilingType, ItemExtractor, RawDocument};
//!
//! let extractor = ItemExtractor::new();
//! let html = std::fs::read("filing.htm").unwrap();
//! let extraction = extractor.extract(
//!     &RawDocument::new(&html),
//!     &ExtractionRequest::of(FilingType::AnnualReport, &["7", "7A", "8"]),
//! );
//! for (item, result) in &extraction.results {
//!     println!("{item}: {:?}", result.status);
//! }
//! ```

pub mod batch;
pub mod engine;
pub mod extractors;
pub mod normalize;
pub mod schema;
pub mod utils;

pub use engine::{
    DocumentExtraction, EngineConfig, ExtractionRequest, ExtractionResult, ItemExtractor,
    ItemStatus, RawDocument,
};
pub use extractors::{Candidate, PatternStrength, Resolution, ResolvedBoundary};
pub use normalize::{NormalizedDocument, Normalizer};
pub use schema::{FilingType, ItemSchema, ItemSpec, SchemaRegistry, SIGNATURE_ITEM_ID};
pub use utils::error::{EngineError, NormalizeError, SchemaError};
