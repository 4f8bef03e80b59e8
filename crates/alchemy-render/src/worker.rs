//! Background rasterization.
//!
//! Each rebuild runs on its own thread and reports back over a channel; the
//! owner drains finished batches with [`RasterWorker::poll`] and decides what
//! to publish. There is no cancellation: a superseded batch still runs to
//! completion and is dropped at publish time.

use crate::cache::RebuildTicket;
use crate::rasterizer::{Bitmap, ShapeRasterizer};
use alchemy_core::{BrushColor, ShapeDefinition};
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{channel, Receiver, RecvError, Sender};
use std::thread;

/// A finished rebuild.
#[derive(Debug)]
pub struct RasterBatch {
    pub ticket: RebuildTicket,
    pub bitmaps: Vec<Bitmap>,
}

/// Runs rebuilds off the compositing path.
pub struct RasterWorker {
    batch_tx: Sender<RasterBatch>,
    batch_rx: Receiver<RasterBatch>,
    in_flight: usize,
}

impl Default for RasterWorker {
    fn default() -> Self {
        Self::new()
    }
}

impl RasterWorker {
    /// Create an idle worker.
    pub fn new() -> Self {
        let (batch_tx, batch_rx) = channel();
        Self {
            batch_tx,
            batch_rx,
            in_flight: 0,
        }
    }

    /// Number of rebuilds started but not yet collected.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Start rasterizing `shapes` with `tint` in the background.
    ///
    /// Falls back to rasterizing on the calling thread if no thread can be
    /// spawned; the batch is still delivered through [`poll`](Self::poll).
    pub fn spawn(&mut self, ticket: RebuildTicket, shapes: Vec<ShapeDefinition>, tint: BrushColor) {
        self.in_flight += 1;
        let batch_tx = self.batch_tx.clone();
        // Definitions share their SVG text, so keeping a fallback copy is cheap.
        let fallback = shapes.clone();
        let spawned = thread::Builder::new()
            .name(format!("alchemy-raster-{}", ticket.generation()))
            .spawn(move || {
                run_batch(&batch_tx, ticket, || ShapeRasterizer::new().rasterize_all(&shapes, tint))
            });

        if let Err(e) = spawned {
            log::error!("Failed to spawn raster thread, rasterizing inline: {}", e);
            run_batch(&self.batch_tx, ticket, || {
                ShapeRasterizer::new().rasterize_all(&fallback, tint)
            });
        }
    }

    /// Collect every batch that has finished, without blocking.
    pub fn poll(&mut self) -> Vec<RasterBatch> {
        let batches: Vec<RasterBatch> = self.batch_rx.try_iter().collect();
        self.in_flight = self.in_flight.saturating_sub(batches.len());
        batches
    }

    /// Block until the next batch finishes. Returns `None` when nothing is in
    /// flight.
    pub fn wait(&mut self) -> Option<RasterBatch> {
        if self.in_flight == 0 {
            return None;
        }
        match self.batch_rx.recv() {
            Ok(batch) => {
                self.in_flight -= 1;
                Some(batch)
            }
            // Unreachable while we hold a sender, but don't spin if it happens.
            Err(RecvError) => {
                self.in_flight = 0;
                None
            }
        }
    }
}

/// Run `job` and report its bitmaps under `ticket`.
///
/// Every started batch reports back exactly once: a panicking job reports an
/// empty batch, so the ticket is never left pending.
fn run_batch<F>(batch_tx: &Sender<RasterBatch>, ticket: RebuildTicket, job: F)
where
    F: FnOnce() -> Vec<Bitmap>,
{
    let bitmaps = panic::catch_unwind(AssertUnwindSafe(job)).unwrap_or_else(|_| {
        log::error!(
            "Raster batch generation {} panicked; publishing no bitmaps",
            ticket.generation()
        );
        Vec::new()
    });
    // The receiver is gone once the worker is dropped; nothing to do then.
    let _ = batch_tx.send(RasterBatch { ticket, bitmaps });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheKey, RasterCache};
    use alchemy_core::ShapeLibrary;

    #[test]
    fn test_worker_delivers_batch() {
        let shapes = ShapeLibrary::with_defaults().active_shapes();
        let mut cache = RasterCache::new();
        let ticket = cache.begin_rebuild(CacheKey::new(Vec::new(), BrushColor::WHITE));

        let mut worker = RasterWorker::new();
        worker.spawn(ticket, shapes.clone(), BrushColor::WHITE);
        assert_eq!(worker.in_flight(), 1);

        let batch = worker.wait().unwrap();
        assert_eq!(batch.ticket, ticket);
        assert_eq!(batch.bitmaps.len(), shapes.len());
        assert_eq!(worker.in_flight(), 0);
        assert!(worker.wait().is_none());
    }

    #[test]
    fn test_every_started_batch_reports_back() {
        let shapes = ShapeLibrary::with_defaults().active_shapes();
        let mut cache = RasterCache::new();
        let first = cache.begin_rebuild(CacheKey::new(Vec::new(), BrushColor::WHITE));
        let second = cache.begin_rebuild(CacheKey::new(Vec::new(), BrushColor::BLACK));

        let mut worker = RasterWorker::new();
        worker.spawn(first, shapes.clone(), BrushColor::WHITE);
        worker.spawn(second, shapes, BrushColor::BLACK);

        let mut tickets = Vec::new();
        while worker.in_flight() > 0 {
            match worker.wait() {
                Some(batch) => tickets.push(batch.ticket),
                None => break,
            }
        }
        tickets.sort();
        assert_eq!(tickets, vec![first, second]);
        assert!(worker.poll().is_empty());
    }

    #[test]
    fn test_poll_does_not_block() {
        let mut worker = RasterWorker::new();
        assert!(worker.poll().is_empty());

        let mut cache = RasterCache::new();
        let ticket = cache.begin_rebuild(CacheKey::new(Vec::new(), BrushColor::WHITE));
        worker.spawn(ticket, Vec::new(), BrushColor::WHITE);

        let mut collected = Vec::new();
        while collected.is_empty() {
            collected = worker.poll();
            std::thread::yield_now();
        }
        assert_eq!(collected.len(), 1);
        assert!(collected[0].bitmaps.is_empty());
        assert_eq!(worker.in_flight(), 0);
    }

    #[test]
    fn test_panicking_job_still_reports() {
        let mut cache = RasterCache::new();
        let ticket = cache.begin_rebuild(CacheKey::new(Vec::new(), BrushColor::WHITE));
        let (batch_tx, batch_rx) = channel();

        let handle = thread::spawn(move || {
            run_batch(&batch_tx, ticket, || -> Vec<Bitmap> { panic!("malformed shape") })
        });
        assert!(handle.join().is_ok());

        let batch = batch_rx.recv().unwrap();
        assert_eq!(batch.ticket, ticket);
        assert!(batch.bitmaps.is_empty());
        assert!(cache.publish(batch.ticket, batch.bitmaps));
        assert!(!cache.is_rebuilding());
    }
}
