//! Rate-limited ingestion scheduler.
//!
//! Turns a catalog backlog into a steady stream of fetch, parse, rasterize and
//! place work. The scheduler is driven by [`IngestionScheduler::tick`], once
//! per presentation frame, with a caller-supplied clock. Three gates limit how
//! often each kind of work runs:
//!
//! - retrieval: dispatch one catalog entry to the [`Retriever`]
//! - placement: rasterize and place one pending object
//! - animation: flip the displayed phase
//!
//! Retrieval only runs while the pending-object backlog plus the retrievals
//! still in flight stay below the ceiling, and nothing waits in overflow. At
//! most `ceiling` documents are ever parsed but unplaced at once.

mod gate;
mod retrieval;

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, Sender};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::atlas::AtlasStore;
use crate::config::MosaicConfig;
use crate::error::{MosaicError, Result};
use crate::render::{rasterize, select_palette};
use crate::types::{Bucket, CatalogEntry, Palette, RenderableObject, World};

pub use gate::RateGate;
pub use retrieval::{
    BlockingRetriever, Completion, DocumentSource, RetrievalRequest, Retriever, ThreadedRetriever,
};

/// Apply availability, author filter and shuffle, in that order.
pub fn prepare_catalog(
    mut entries: Vec<CatalogEntry>,
    availability: Option<&HashSet<String>>,
    config: &MosaicConfig,
) -> Vec<CatalogEntry> {
    let total = entries.len();

    if let Some(available) = availability {
        entries.retain(|entry| available.contains(&entry.source_id));
    }

    if !config.authors.is_empty() {
        entries.retain(|entry| config.authors.iter().any(|author| *author == entry.author));
    }

    if config.shuffle {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        entries.shuffle(&mut rng);
    }

    debug!(total, kept = entries.len(), shuffled = config.shuffle, "Prepared catalog");
    entries
}

/// A decomposed object waiting to be rasterized and placed.
#[derive(Debug, Clone)]
pub struct PendingObject {
    pub entry: CatalogEntry,
    pub palette: Arc<Palette>,
    pub object: RenderableObject,
}

/// What happened during one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub dispatched: bool,
    pub placed: bool,
    pub grew: bool,
    pub phase_flipped: bool,
}

impl TickReport {
    fn did_work(&self) -> bool {
        self.dispatched || self.placed
    }
}

/// Totals from [`IngestionScheduler::run_until_idle`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub ticks: u64,
    pub dispatched: usize,
    pub placed: usize,
    pub growths: usize,
    /// Clock value when the scheduler went idle
    pub finished_at: Duration,
}

/// Tick-driven scheduler owning the catalog backlog, the object backlogs and
/// the atlas they feed.
pub struct IngestionScheduler<R> {
    retriever: R,
    catalog: VecDeque<CatalogEntry>,
    pending: VecDeque<PendingObject>,
    /// Decomposed objects that did not fit under the ceiling yet
    overflow: VecDeque<PendingObject>,
    in_flight: usize,
    epoch: u64,
    completions_tx: Sender<Completion>,
    completions_rx: Receiver<Completion>,
    retrieval_gate: RateGate,
    placement_gate: RateGate,
    animation_gate: RateGate,
    phase: usize,
    ceiling: usize,
    config: MosaicConfig,
    atlas: AtlasStore,
}

impl<R: Retriever> IngestionScheduler<R> {
    /// Create a scheduler over an already prepared catalog.
    pub fn new(config: &MosaicConfig, retriever: R, catalog: Vec<CatalogEntry>) -> Result<Self> {
        config.validate()?;
        let atlas = AtlasStore::from_config(config)?;
        let (completions_tx, completions_rx) = unbounded();

        Ok(Self {
            retriever,
            catalog: catalog.into(),
            pending: VecDeque::new(),
            overflow: VecDeque::new(),
            in_flight: 0,
            epoch: 0,
            completions_tx,
            completions_rx,
            retrieval_gate: RateGate::new(config.retrieval_interval()),
            placement_gate: RateGate::new(config.placement_interval()),
            animation_gate: RateGate::new(config.animation_interval()),
            phase: 0,
            ceiling: config.pending_ceiling,
            config: config.clone(),
            atlas,
        })
    }

    /// Run one scheduling step at clock value `now`.
    ///
    /// Only an atlas growth failure is returned as an error; documents that
    /// fail to retrieve or parse are dropped.
    pub fn tick(&mut self, now: Duration) -> Result<TickReport> {
        let mut report = TickReport::default();

        self.drain_completions();
        self.refill_pending();

        if self.retrieval_eligible() && self.retrieval_gate.try_fire(now) {
            if let Some(entry) = self.catalog.pop_front() {
                debug!(source_id = %entry.source_id, pending = self.pending.len(), "Dispatching retrieval");
                self.in_flight += 1;
                let request = RetrievalRequest {
                    epoch: self.epoch,
                    entry,
                };
                self.retriever.dispatch(request, &self.completions_tx);
                report.dispatched = true;
            }
        }

        if !self.pending.is_empty() && self.placement_gate.try_fire(now) {
            if let Some(pending) = self.pending.pop_front() {
                report.grew = self.place(pending)?;
                report.placed = true;
                self.refill_pending();
            }
        }

        if self.animation_gate.try_fire(now) {
            self.phase ^= 1;
            report.phase_flipped = true;
        }

        Ok(report)
    }

    /// Tick on a simulated clock advancing by `step` until idle.
    pub fn run_until_idle(&mut self, start: Duration, step: Duration) -> Result<RunStats> {
        if step.is_zero() {
            return Err(MosaicError::Config {
                message: "simulated clock step must be greater than zero".to_string(),
                help: None,
            });
        }

        let mut stats = RunStats::default();
        let mut now = start;

        while !self.is_idle() {
            let report = self.tick(now)?;
            stats.ticks += 1;
            stats.dispatched += usize::from(report.dispatched);
            stats.placed += usize::from(report.placed);
            stats.growths += usize::from(report.grew);

            // Nothing to do but wait on retrieval workers
            if !report.did_work() && self.in_flight > 0 && self.pending.is_empty() {
                thread::yield_now();
            }
            now += step;
        }

        stats.finished_at = now;
        info!(
            placed = stats.placed,
            growths = stats.growths,
            ticks = stats.ticks,
            "Ingestion idle"
        );
        Ok(stats)
    }

    /// Drop all queued work and ignore retrievals still in flight.
    pub fn teardown(&mut self) {
        info!(
            epoch = self.epoch,
            catalog = self.catalog.len(),
            pending = self.pending.len() + self.overflow.len(),
            in_flight = self.in_flight,
            "Tearing down ingestion"
        );
        self.catalog.clear();
        self.pending.clear();
        self.overflow.clear();
        self.in_flight = 0;
        self.epoch += 1;
    }

    /// Nothing left to fetch, wait for, or place.
    pub fn is_idle(&self) -> bool {
        self.catalog.is_empty()
            && self.in_flight == 0
            && self.pending.is_empty()
            && self.overflow.is_empty()
    }

    /// Animation phase currently shown (0 or 1).
    pub fn displayed_phase(&self) -> usize {
        self.phase
    }

    pub fn atlas(&self) -> &AtlasStore {
        &self.atlas
    }

    /// Consume the scheduler, keeping the atlas it built.
    pub fn into_atlas(self) -> AtlasStore {
        self.atlas
    }

    /// Length of the pending-object backlog.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Decomposed objects waiting for room in the pending backlog.
    pub fn overflow_len(&self) -> usize {
        self.overflow.len()
    }

    /// Catalog entries not yet dispatched.
    pub fn remaining(&self) -> usize {
        self.catalog.len()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    fn retrieval_eligible(&self) -> bool {
        !self.catalog.is_empty()
            && self.pending.len() + self.in_flight < self.ceiling
            && self.overflow.is_empty()
    }

    fn drain_completions(&mut self) {
        while let Ok(completion) = self.completions_rx.try_recv() {
            if completion.epoch != self.epoch {
                debug!(
                    source_id = %completion.entry.source_id,
                    epoch = completion.epoch,
                    "Discarding stale retrieval"
                );
                continue;
            }

            self.in_flight = self.in_flight.saturating_sub(1);

            match completion.result {
                Ok(world) => self.decompose(completion.entry, world),
                Err(err @ MosaicError::NotFound { .. }) => {
                    debug!(source_id = %completion.entry.source_id, error = %err, "Dropping document");
                }
                Err(err) if err.is_document_error() => {
                    warn!(source_id = %completion.entry.source_id, error = %err, "Dropping document");
                }
                Err(err) => {
                    warn!(source_id = %completion.entry.source_id, error = %err, "Retrieval failed, dropping document");
                }
            }
        }
    }

    fn decompose(&mut self, entry: CatalogEntry, world: World) {
        let palette = Arc::new(select_palette(&world));
        let World {
            tiles,
            sprites,
            items,
            ..
        } = world;

        let mut queued = 0;
        for (bucket, objects) in [(Bucket::Tile, tiles), (Bucket::Sprite, sprites), (Bucket::Item, items)] {
            if !self.config.shows(bucket) {
                continue;
            }
            for object in objects.into_values() {
                let pending = PendingObject {
                    entry: entry.clone(),
                    palette: Arc::clone(&palette),
                    object,
                };
                if self.pending.len() < self.ceiling {
                    self.pending.push_back(pending);
                } else {
                    self.overflow.push_back(pending);
                }
                queued += 1;
            }
        }

        debug!(
            source_id = %entry.source_id,
            palette = %palette.id,
            objects = queued,
            pending = self.pending.len(),
            overflow = self.overflow.len(),
            "Decomposed document"
        );
    }

    fn refill_pending(&mut self) {
        while self.pending.len() < self.ceiling {
            match self.overflow.pop_front() {
                Some(pending) => self.pending.push_back(pending),
                None => break,
            }
        }
    }

    fn place(&mut self, pending: PendingObject) -> Result<bool> {
        let bitmaps = [
            rasterize(&pending.object, &pending.palette, 0),
            rasterize(&pending.object, &pending.palette, 1),
        ];

        let grew = self.atlas.grow_if_needed()?;
        self.atlas.place(bitmaps, pending.entry)?;
        Ok(grew)
    }
}
