//! Document retrieval boundary.
//!
//! Retrieval is the only asynchronous step in ingestion. A [`Retriever`]
//! takes a request tagged with the scheduler's epoch, fetches and parses the
//! document however it likes, and sends a [`Completion`] back over a
//! channel. Completions may arrive in any order.

use std::any::Any;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::Sender;
use tracing::{debug, warn};

use crate::error::{MosaicError, Result};
use crate::parser::parse_world_str;
use crate::types::{CatalogEntry, World};

/// Fetches raw document text by source id.
pub trait DocumentSource: Send + Sync {
    /// Fails with `NotFound` or `Retrieval`.
    fn fetch_document(&self, source_id: &str) -> Result<String>;
}

impl<S: DocumentSource + ?Sized> DocumentSource for Arc<S> {
    fn fetch_document(&self, source_id: &str) -> Result<String> {
        (**self).fetch_document(source_id)
    }
}

/// A document to fetch, tagged with the epoch it was dispatched in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalRequest {
    pub epoch: u64,
    pub entry: CatalogEntry,
}

/// Outcome of one retrieval.
#[derive(Debug)]
pub struct Completion {
    pub epoch: u64,
    pub entry: CatalogEntry,
    pub result: Result<World>,
}

/// Fire-and-forget dispatch of retrieval requests.
pub trait Retriever {
    /// Start retrieving `request`; the completion is sent to `completions`.
    fn dispatch(&self, request: RetrievalRequest, completions: &Sender<Completion>);
}

fn fetch_and_parse<S: DocumentSource + ?Sized>(source: &S, source_id: &str) -> Result<World> {
    source.fetch_document(source_id).and_then(|text| parse_world_str(&text))
}

fn send(completions: &Sender<Completion>, completion: Completion) {
    if let Err(err) = completions.send(completion) {
        debug!(source_id = %err.0.entry.source_id, "Scheduler gone, discarding retrieval");
    }
}

fn retrieve<S: DocumentSource + ?Sized>(source: &S, request: RetrievalRequest, completions: &Sender<Completion>) {
    let result = fetch_and_parse(source, &request.entry.source_id);
    send(
        completions,
        Completion {
            epoch: request.epoch,
            entry: request.entry,
            result,
        },
    );
}

/// Like [`retrieve`], but a panicking source becomes a `Retrieval` error.
fn retrieve_catching<S: DocumentSource + ?Sized>(
    source: &S,
    request: RetrievalRequest,
    completions: &Sender<Completion>,
) {
    let source_id = &request.entry.source_id;
    let result = panic::catch_unwind(AssertUnwindSafe(|| fetch_and_parse(source, source_id)))
        .unwrap_or_else(|payload| {
            Err(MosaicError::Retrieval {
                source_id: source_id.clone(),
                message: format!("retrieval panicked: {}", panic_message(payload.as_ref())),
            })
        });

    send(
        completions,
        Completion {
            epoch: request.epoch,
            entry: request.entry,
            result,
        },
    );
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown cause"
    }
}

/// Complete `request` with an error when no worker could be started for it.
fn report_spawn_failure(request: RetrievalRequest, err: &io::Error, completions: &Sender<Completion>) {
    warn!(source_id = %request.entry.source_id, error = %err, "Failed to spawn retrieval thread");
    let result = Err(MosaicError::Retrieval {
        source_id: request.entry.source_id.clone(),
        message: format!("failed to spawn retrieval thread: {}", err),
    });
    send(
        completions,
        Completion {
            epoch: request.epoch,
            entry: request.entry,
            result,
        },
    );
}

/// Fetches and parses inline during dispatch.
///
/// Deterministic; the completion is waiting on the channel before
/// `dispatch` returns.
#[derive(Debug, Clone)]
pub struct BlockingRetriever<S> {
    source: S,
}

impl<S: DocumentSource> BlockingRetriever<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }
}

impl<S: DocumentSource> Retriever for BlockingRetriever<S> {
    fn dispatch(&self, request: RetrievalRequest, completions: &Sender<Completion>) {
        retrieve(&self.source, request, completions);
    }
}

/// Fetches and parses on a worker thread per request.
///
/// Every dispatch produces exactly one completion: a panicking source or a
/// failed spawn completes with a `Retrieval` error.
#[derive(Debug)]
pub struct ThreadedRetriever<S> {
    source: Arc<S>,
}

impl<S> Clone for ThreadedRetriever<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
        }
    }
}

impl<S: DocumentSource + 'static> ThreadedRetriever<S> {
    pub fn new(source: S) -> Self {
        Self {
            source: Arc::new(source),
        }
    }
}

impl<S: DocumentSource + 'static> Retriever for ThreadedRetriever<S> {
    fn dispatch(&self, request: RetrievalRequest, completions: &Sender<Completion>) {
        let source = Arc::clone(&self.source);
        let worker_completions = completions.clone();
        let fallback = request.clone();

        let spawned = thread::Builder::new()
            .name(format!("retrieve-{}", request.entry.source_id))
            .spawn(move || retrieve_catching(source.as_ref(), request, &worker_completions));

        if let Err(err) = spawned {
            report_spawn_failure(fallback, &err, completions);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;
    use std::collections::HashMap;
    use std::time::Duration;

    struct MemorySource(HashMap<String, String>);

    impl DocumentSource for MemorySource {
        fn fetch_document(&self, source_id: &str) -> Result<String> {
            self.0.get(source_id).cloned().ok_or_else(|| MosaicError::NotFound {
                source_id: source_id.to_string(),
            })
        }
    }

    fn source() -> MemorySource {
        let doc = "PAL 0\n0,0,0\n255,255,255\n\nTIL a\n00000000\n00000000\n00000000\n00000000\n00000000\n00000000\n00000000\n00000000\n";
        MemorySource(HashMap::from([("good".to_string(), doc.to_string())]))
    }

    fn request(id: &str) -> RetrievalRequest {
        RetrievalRequest {
            epoch: 3,
            entry: CatalogEntry::new(id, "t", "a"),
        }
    }

    #[test]
    fn test_blocking_completes_inline() {
        let (tx, rx) = unbounded();
        let retriever = BlockingRetriever::new(source());

        retriever.dispatch(request("good"), &tx);
        let completion = rx.try_recv().unwrap();
        assert_eq!(completion.epoch, 3);
        assert_eq!(completion.entry.source_id, "good");
        assert_eq!(completion.result.unwrap().tiles.len(), 1);
    }

    #[test]
    fn test_missing_document_reported() {
        let (tx, rx) = unbounded();
        BlockingRetriever::new(source()).dispatch(request("gone"), &tx);

        let err = rx.try_recv().unwrap().result.unwrap_err();
        assert!(matches!(err, MosaicError::NotFound { .. }));
    }

    #[test]
    fn test_threaded_sends_completion() {
        let (tx, rx) = unbounded();
        let retriever = ThreadedRetriever::new(source());

        retriever.dispatch(request("good"), &tx);
        retriever.dispatch(request("gone"), &tx);

        let mut ok = 0;
        let mut failed = 0;
        for _ in 0..2 {
            match rx.recv_timeout(Duration::from_secs(5)).unwrap().result {
                Ok(_) => ok += 1,
                Err(_) => failed += 1,
            }
        }
        assert_eq!((ok, failed), (1, 1));
    }

    struct PanickingSource;

    impl DocumentSource for PanickingSource {
        fn fetch_document(&self, source_id: &str) -> Result<String> {
            panic!("storage for {} is corrupt", source_id);
        }
    }

    #[test]
    fn test_threaded_panic_becomes_retrieval_error() {
        let (tx, rx) = unbounded();
        ThreadedRetriever::new(PanickingSource).dispatch(request("boom"), &tx);

        let completion = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(completion.epoch, 3);
        assert_eq!(completion.entry.source_id, "boom");
        match completion.result.unwrap_err() {
            MosaicError::Retrieval { source_id, message } => {
                assert_eq!(source_id, "boom");
                assert!(message.contains("storage for boom is corrupt"), "{}", message);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_spawn_failure_completes_request() {
        let (tx, rx) = unbounded();
        let err = io::Error::new(io::ErrorKind::WouldBlock, "no threads left");

        report_spawn_failure(request("good"), &err, &tx);

        let completion = rx.try_recv().unwrap();
        assert_eq!(completion.epoch, 3);
        assert_eq!(completion.entry.source_id, "good");
        assert!(matches!(
            completion.result,
            Err(MosaicError::Retrieval { ref message, .. }) if message.contains("no threads left")
        ));
    }

    #[test]
    fn test_dropped_receiver_is_ignored() {
        let (tx, rx) = unbounded();
        drop(rx);
        BlockingRetriever::new(source()).dispatch(request("good"), &tx);
    }
}
