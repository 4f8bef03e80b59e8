//! The published set of stamp bitmaps and its rebuild bookkeeping.
//!
//! A rebuild is started with [`RasterCache::begin_rebuild`], which hands out a
//! ticket. Only the ticket of the most recently started rebuild may publish;
//! results carrying an older ticket are discarded. Publishing swaps the whole
//! bitmap list at once, so readers see either the old list or the new one.

use crate::rasterizer::Bitmap;
use alchemy_core::{BrushColor, ShapeId};
use std::sync::Arc;

/// What a cache's contents were built from: the active shapes and the tint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKey {
    pub shapes: Vec<ShapeId>,
    pub tint: BrushColor,
}

impl CacheKey {
    pub fn new(shapes: Vec<ShapeId>, tint: BrushColor) -> Self {
        Self { shapes, tint }
    }
}

/// Identifies one started rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RebuildTicket(u64);

impl RebuildTicket {
    pub fn generation(self) -> u64 {
        self.0
    }
}

/// Holds the live bitmap list. At most one list is published at a time.
#[derive(Debug, Default)]
pub struct RasterCache {
    bitmaps: Arc<[Bitmap]>,
    published: Option<CacheKey>,
    /// The latest started rebuild that has not published yet.
    pending: Option<(RebuildTicket, CacheKey)>,
    generation: u64,
}

impl RasterCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The published bitmaps. Cheap to clone; stays valid across later swaps.
    pub fn bitmaps(&self) -> Arc<[Bitmap]> {
        Arc::clone(&self.bitmaps)
    }

    pub fn len(&self) -> usize {
        self.bitmaps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bitmaps.is_empty()
    }

    /// Key of the published bitmaps, if anything has been published.
    pub fn published_key(&self) -> Option<&CacheKey> {
        self.published.as_ref()
    }

    /// Whether a rebuild is outstanding.
    pub fn is_rebuilding(&self) -> bool {
        self.pending.is_some()
    }

    /// Whether the cache already holds, or is already building, `key`.
    pub fn is_current(&self, key: &CacheKey) -> bool {
        match &self.pending {
            Some((_, pending)) => pending == key,
            None => self.published.as_ref() == Some(key),
        }
    }

    /// Start a rebuild for `key`, superseding any rebuild still in flight.
    pub fn begin_rebuild(&mut self, key: CacheKey) -> RebuildTicket {
        self.generation += 1;
        let ticket = RebuildTicket(self.generation);
        self.pending = Some((ticket, key));
        ticket
    }

    /// Publish a finished rebuild. Returns false (and drops the bitmaps) when
    /// a newer rebuild has been started since `ticket` was issued.
    pub fn publish(&mut self, ticket: RebuildTicket, bitmaps: Vec<Bitmap>) -> bool {
        match self.pending.take() {
            Some((pending, key)) if pending == ticket => {
                log::debug!(
                    "Publishing raster cache generation {} ({} bitmaps)",
                    ticket.generation(),
                    bitmaps.len()
                );
                self.bitmaps = bitmaps.into();
                self.published = Some(key);
                true
            }
            other => {
                log::debug!(
                    "Discarding superseded raster batch generation {}",
                    ticket.generation()
                );
                self.pending = other;
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::ShapeRasterizer;
    use alchemy_core::ShapeDefinition;

    const SQUARE: &str = r#"<svg viewBox="0 0 1 1" xmlns="http://www.w3.org/2000/svg"><rect width="1" height="1" fill="currentColor"/></svg>"#;

    fn bitmaps(n: usize) -> Vec<Bitmap> {
        let shapes: Vec<ShapeDefinition> = (0..n)
            .map(|i| ShapeDefinition::new(ShapeId::from_u128(i as u128 + 1), SQUARE))
            .collect();
        ShapeRasterizer::new().rasterize_all(&shapes, BrushColor::WHITE)
    }

    fn key(n: u128, tint: BrushColor) -> CacheKey {
        CacheKey::new((1..=n).map(ShapeId::from_u128).collect(), tint)
    }

    #[test]
    fn test_new_cache_is_empty() {
        let cache = RasterCache::new();
        assert!(cache.is_empty());
        assert!(!cache.is_rebuilding());
        assert!(cache.published_key().is_none());
    }

    #[test]
    fn test_publish_swaps_contents() {
        let mut cache = RasterCache::new();
        let k = key(2, BrushColor::WHITE);
        let ticket = cache.begin_rebuild(k.clone());
        assert!(cache.is_rebuilding());
        assert!(cache.is_empty());

        assert!(cache.publish(ticket, bitmaps(2)));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.published_key(), Some(&k));
        assert!(cache.is_current(&k));
        assert!(!cache.is_rebuilding());
    }

    #[test]
    fn test_superseded_rebuild_is_discarded() {
        let mut cache = RasterCache::new();
        let old = cache.begin_rebuild(key(1, BrushColor::WHITE));
        let new = cache.begin_rebuild(key(3, BrushColor::BLACK));

        // The older batch finishes first but may not publish.
        assert!(!cache.publish(old, bitmaps(1)));
        assert!(cache.is_empty());
        assert!(cache.is_rebuilding());

        assert!(cache.publish(new, bitmaps(3)));
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn test_straggler_after_newer_publish_is_discarded() {
        let mut cache = RasterCache::new();
        let old = cache.begin_rebuild(key(1, BrushColor::WHITE));
        let new = cache.begin_rebuild(key(2, BrushColor::WHITE));
        assert!(cache.publish(new, bitmaps(2)));

        assert!(!cache.publish(old, bitmaps(1)));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.published_key(), Some(&key(2, BrushColor::WHITE)));
    }

    #[test]
    fn test_readers_keep_their_snapshot() {
        let mut cache = RasterCache::new();
        let ticket = cache.begin_rebuild(key(2, BrushColor::WHITE));
        cache.publish(ticket, bitmaps(2));
        let snapshot = cache.bitmaps();

        let ticket = cache.begin_rebuild(key(0, BrushColor::WHITE));
        cache.publish(ticket, Vec::new());
        assert!(cache.is_empty());
        assert_eq!(snapshot.len(), 2);
    }

    #[test]
    fn test_is_current_tracks_pending_key() {
        let mut cache = RasterCache::new();
        let white = key(1, BrushColor::WHITE);
        let black = key(1, BrushColor::BLACK);
        let ticket = cache.begin_rebuild(white.clone());
        cache.publish(ticket, bitmaps(1));

        cache.begin_rebuild(black.clone());
        assert!(cache.is_current(&black));
        assert!(!cache.is_current(&white));
    }
}
