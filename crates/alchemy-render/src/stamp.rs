//! Turning input samples into randomized stamps.

use crate::rasterizer::Bitmap;
use crate::surface::DrawSurface;
use alchemy_core::BrushSettings;
use kurbo::Point;
use std::f64::consts::TAU;

/// One randomized placement of a bitmap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stamp {
    pub center: Point,
    /// Edge length on the surface, in pixels.
    pub size: f64,
    /// Radians, clockwise about the center.
    pub rotation: f64,
    pub opacity: f64,
}

/// Something stamps can be composited onto.
pub trait StampTarget {
    /// Width used to reflect mirrored stamps.
    fn surface_width(&self) -> f64;

    fn composite(&mut self, bitmap: &Bitmap, stamp: &Stamp);
}

impl StampTarget for DrawSurface {
    fn surface_width(&self) -> f64 {
        self.width() as f64
    }

    fn composite(&mut self, bitmap: &Bitmap, stamp: &Stamp) {
        DrawSurface::composite(self, bitmap, stamp.center, stamp.size, stamp.rotation, stamp.opacity);
    }
}

/// Draws random shape, size and rotation for each sample.
pub struct StampEngine {
    settings: BrushSettings,
    mirrored: bool,
    rng: fastrand::Rng,
}

impl StampEngine {
    pub fn new(settings: BrushSettings, mirrored: bool) -> Self {
        Self::with_rng(settings, mirrored, fastrand::Rng::new())
    }

    /// Create an engine whose random draws are reproducible.
    pub fn with_seed(settings: BrushSettings, mirrored: bool, seed: u64) -> Self {
        Self::with_rng(settings, mirrored, fastrand::Rng::with_seed(seed))
    }

    fn with_rng(settings: BrushSettings, mirrored: bool, rng: fastrand::Rng) -> Self {
        Self {
            settings,
            mirrored,
            rng,
        }
    }

    pub fn settings(&self) -> BrushSettings {
        self.settings
    }

    /// Takes effect from the next sample.
    pub fn set_settings(&mut self, settings: BrushSettings) {
        self.settings = settings;
    }

    pub fn is_mirrored(&self) -> bool {
        self.mirrored
    }

    pub fn set_mirrored(&mut self, mirrored: bool) {
        self.mirrored = mirrored;
    }

    /// Stamp once at `point`, and once more at the horizontally reflected
    /// point when mirroring is on. The second stamp is drawn independently.
    ///
    /// Does nothing when `bitmaps` is empty.
    pub fn on_sample<T: StampTarget + ?Sized>(&mut self, point: Point, bitmaps: &[Bitmap], target: &mut T) {
        if bitmaps.is_empty() {
            return;
        }

        self.stamp_at(point, bitmaps, target);
        if self.mirrored {
            let reflected = Point::new(target.surface_width() - point.x, point.y);
            self.stamp_at(reflected, bitmaps, target);
        }
    }

    fn stamp_at<T: StampTarget + ?Sized>(&mut self, center: Point, bitmaps: &[Bitmap], target: &mut T) {
        let bitmap = &bitmaps[self.rng.usize(..bitmaps.len())];
        let stamp = self.roll_stamp(center);
        target.composite(bitmap, &stamp);
    }

    /// Draw size and rotation for a stamp centered at `center`.
    ///
    /// Size falls in `[size / 5, size / 5 + size)`.
    pub fn roll_stamp(&mut self, center: Point) -> Stamp {
        let size = self.settings.size;
        Stamp {
            center,
            size: size * self.rng.f64() + size / 5.0,
            rotation: self.rng.f64() * TAU,
            opacity: self.settings.opacity,
        }
    }
}
