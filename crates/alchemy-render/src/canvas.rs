//! The drawing session: one surface, its input tracker, the stamp engine and
//! the shape cache, behind the entry points a host calls.

use crate::cache::{CacheKey, RasterCache};
use crate::rasterizer::{Bitmap, ShapeRasterizer, PREVIEW_LIMIT};
use crate::stamp::StampEngine;
use crate::surface::{DrawSurface, SurfaceResult};
use crate::worker::RasterWorker;
use alchemy_core::{
    BrushConfig, BrushSettings, ColorParseError, InputTracker, PointerEvent, SettingsUpdate,
    ShapeId, ShapeLibrary,
};
use kurbo::Point;
use std::sync::Arc;

/// A live drawing session.
pub struct BrushCanvas {
    surface: DrawSurface,
    input: InputTracker,
    engine: StampEngine,
    library: ShapeLibrary,
    cache: RasterCache,
    worker: RasterWorker,
    rasterizer: ShapeRasterizer,
    pending_resize: Option<(u32, u32)>,
}

impl BrushCanvas {
    /// Create a session with the built-in shape groups active and start the
    /// first cache rebuild.
    pub fn new(width: u32, height: u32, config: &BrushConfig) -> Self {
        Self::with_library(width, height, config, ShapeLibrary::with_defaults())
    }

    /// Create a session over a given shape library.
    pub fn with_library(width: u32, height: u32, config: &BrushConfig, library: ShapeLibrary) -> Self {
        let settings = config.brush_settings();
        let engine = match config.seed {
            Some(seed) => StampEngine::with_seed(settings, config.mirrored, seed),
            None => StampEngine::new(settings, config.mirrored),
        };

        let mut canvas = Self {
            surface: DrawSurface::new(width, height, config.background),
            input: InputTracker::new(),
            engine,
            library,
            cache: RasterCache::new(),
            worker: RasterWorker::new(),
            rasterizer: ShapeRasterizer::new(),
            pending_resize: None,
        };
        canvas.refresh_cache();
        canvas
    }

    pub fn surface(&self) -> &DrawSurface {
        &self.surface
    }

    pub fn library(&self) -> &ShapeLibrary {
        &self.library
    }

    pub fn cache(&self) -> &RasterCache {
        &self.cache
    }

    pub fn brush_settings(&self) -> BrushSettings {
        self.engine.settings()
    }

    pub fn is_mirrored(&self) -> bool {
        self.engine.is_mirrored()
    }

    pub fn is_drawing(&self) -> bool {
        self.input.is_drawing()
    }

    /// Where the surface sits in client coordinates.
    pub fn set_surface_origin(&mut self, origin: Point) {
        self.input.set_surface_origin(origin);
    }

    /// Feed one pointer event; stamps if it produces a sample.
    pub fn handle_pointer_event(&mut self, event: PointerEvent) {
        let Some(point) = self.input.handle_pointer_event(event) else {
            return;
        };
        let bitmaps = self.cache.bitmaps();
        self.engine.on_sample(point, &bitmaps, &mut self.surface);
    }

    /// Apply a settings payload. On a bad color nothing changes.
    pub fn apply_settings(&mut self, update: &SettingsUpdate) -> Result<(), ColorParseError> {
        let (settings, mirrored) = update.resolve()?;
        self.set_mirrored(mirrored);
        self.set_brush_settings(settings);
        Ok(())
    }

    /// Replace the brush settings. A new tint starts a cache rebuild.
    pub fn set_brush_settings(&mut self, settings: BrushSettings) {
        self.engine.set_settings(settings);
        self.refresh_cache();
    }

    pub fn set_mirrored(&mut self, mirrored: bool) {
        self.engine.set_mirrored(mirrored);
    }

    /// Flip a group on or off. Returns the new state, or `None` for an
    /// unknown group.
    pub fn toggle_group(&mut self, name: &str) -> Option<bool> {
        let active = self.library.toggle_group(name)?;
        self.refresh_cache();
        Some(active)
    }

    /// Returns whether anything changed.
    pub fn set_group_active(&mut self, name: &str, active: bool) -> bool {
        let changed = self.library.set_group_active(name, active);
        if changed {
            self.refresh_cache();
        }
        changed
    }

    /// Add SVG payloads to the uploaded group and rebuild.
    pub fn import_shapes<I, S>(&mut self, payloads: I) -> Vec<ShapeId>
    where
        I: IntoIterator<Item = S>,
        S: Into<Arc<str>>,
    {
        let ids = self.library.import_shapes(payloads);
        if !ids.is_empty() {
            self.refresh_cache();
        }
        ids
    }

    /// Start a rebuild if the active shapes or tint differ from what the
    /// cache holds or is building.
    pub fn refresh_cache(&mut self) {
        let tint = self.engine.settings().color;
        let key = CacheKey::new(self.library.active_shape_ids(), tint);
        if self.cache.is_current(&key) {
            return;
        }

        let ticket = self.cache.begin_rebuild(key);
        let shapes = self.library.active_shapes();
        if shapes.is_empty() {
            self.cache.publish(ticket, Vec::new());
        } else {
            self.worker.spawn(ticket, shapes, tint);
        }
    }

    /// Publish any finished rebuilds without blocking. Returns true when the
    /// cache contents changed.
    pub fn poll_rasterizer(&mut self) -> bool {
        let mut published = false;
        for batch in self.worker.poll() {
            published |= self.cache.publish(batch.ticket, batch.bitmaps);
        }
        published
    }

    /// Block until every started rebuild has reported back.
    pub fn wait_for_rasterizer(&mut self) {
        while let Some(batch) = self.worker.wait() {
            self.cache.publish(batch.ticket, batch.bitmaps);
        }
    }

    /// Record a newly observed size. Only the last one before
    /// [`flush_resize`](Self::flush_resize) is applied.
    pub fn request_resize(&mut self, width: u32, height: u32) {
        self.pending_resize = Some((width, height));
    }

    /// Apply the pending resize, if any. Returns true when the surface
    /// changed size.
    pub fn flush_resize(&mut self) -> bool {
        match self.pending_resize.take() {
            Some((width, height)) => self.surface.resize(width, height),
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.surface.clear();
    }

    pub fn export_png(&self) -> SurfaceResult<Vec<u8>> {
        self.surface.export_png()
    }

    /// White previews of the first few shapes of each group.
    pub fn previews(&self) -> Vec<(String, Vec<Bitmap>)> {
        self.library
            .groups()
            .iter()
            .map(|group| (group.name.clone(), self.rasterizer.preview(group, PREVIEW_LIMIT)))
            .collect()
    }
}
