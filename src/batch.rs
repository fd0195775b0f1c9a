// src/batch.rs
//
// Bounded-concurrency driver for extracting many in-memory documents. The
// engine is stateless per call, so documents fan out over blocking worker
// tasks with no shared mutable state; the caller picks the concurrency
// degree (memory, not core count, is usually the binding constraint since
// each extraction holds a normalized copy of its document).

use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::engine::{DocumentExtraction, ExtractionRequest, ItemExtractor, RawDocument};

/// One document plus its extraction request.
pub struct BatchJob {
    pub bytes: Vec<u8>,
    pub encoding: Option<String>,
    pub document_id: Option<String>,
    pub request: ExtractionRequest,
}

/// Extracts every job, at most `concurrency` documents in flight at once.
/// Output order matches input order. A failure in one document never
/// affects its siblings.
pub async fn extract_documents(
    extractor: Arc<ItemExtractor>,
    jobs: Vec<BatchJob>,
    concurrency: usize,
) -> Vec<DocumentExtraction> {
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut handles = Vec::with_capacity(jobs.len());

    for job in jobs {
        let extractor = Arc::clone(&extractor);
        let semaphore = Arc::clone(&semaphore);
        let fallback = (job.request.filing_type, job.document_id.clone());
        let handle = tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await.ok();
            tokio::task::spawn_blocking(move || {
                let document = RawDocument {
                    bytes: &job.bytes,
                    encoding: job.encoding.as_deref(),
                    document_id: job.document_id.as_deref(),
                };
                extractor.extract(&document, &job.request)
            })
            .await
        });
        handles.push((fallback, handle));
    }

    let mut extractions = Vec::with_capacity(handles.len());
    for ((filing_type, document_id), handle) in handles {
        let extraction = match handle.await {
            Ok(Ok(extraction)) => extraction,
            Ok(Err(join_err)) | Err(join_err) => {
                tracing::error!(%join_err, "extraction task failed");
                DocumentExtraction {
                    filing_type,
                    document_id,
                    results: Default::default(),
                    unknown_items: Vec::new(),
                    special_items: Vec::new(),
                }
            }
        };
        extractions.push(extraction);
    }
    extractions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ItemStatus;
    use crate::schema::FilingType;

    const GOOD: &str = "<html><body>\
        <p><b>Item 7. Management's Discussion and Analysis</b></p>\
        <p>Results improved across the portfolio this year.</p>\
        </body></html>";

    fn job(bytes: &[u8], id: &str) -> BatchJob {
        BatchJob {
            bytes: bytes.to_vec(),
            encoding: None,
            document_id: Some(id.to_string()),
            request: ExtractionRequest::of(FilingType::AnnualReport, &["7"]),
        }
    }

    #[tokio::test]
    async fn batch_preserves_order_and_isolates_failures() {
        let extractor = Arc::new(ItemExtractor::new());
        let jobs = vec![
            job(GOOD.as_bytes(), "doc-a"),
            job(b"", "doc-b"),
            job(GOOD.as_bytes(), "doc-c"),
        ];

        let extractions = extract_documents(extractor, jobs, 2).await;
        assert_eq!(extractions.len(), 3);
        assert_eq!(extractions[0].document_id.as_deref(), Some("doc-a"));
        assert_eq!(extractions[0].results["7"].status, ItemStatus::Found);
        assert_eq!(extractions[1].results["7"].status, ItemStatus::DocumentMalformed);
        assert_eq!(extractions[2].results["7"].status, ItemStatus::Found);
    }

    #[test]
    fn serial_batch_matches_direct_extraction() {
        tokio_test::block_on(async {
            let extractor = Arc::new(ItemExtractor::new());
            let direct = extractor.extract(
                &RawDocument::new(GOOD.as_bytes()),
                &ExtractionRequest::of(FilingType::AnnualReport, &["7"]),
            );

            let mut batched =
                extract_documents(Arc::clone(&extractor), vec![job(GOOD.as_bytes(), "doc-a")], 1)
                    .await;
            let mut batched = batched.remove(0);
            batched.document_id = None;
            assert_eq!(batched, direct);
        });
    }
}
