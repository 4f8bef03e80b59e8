//! The persistent pixel buffer strokes are composited onto.

use crate::rasterizer::Bitmap;
use alchemy_core::BrushColor;
use kurbo::{Affine, Point};
use thiserror::Error;
use tiny_skia::{Color, FilterQuality, Pixmap, PixmapPaint, PixmapRef, Transform};

/// File name offered for exported drawings.
pub const EXPORT_FILE_NAME: &str = "alchemy-brush-art.png";

/// Surface errors.
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("Surface has no area")]
    Unmounted,
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] png::EncodingError),
}

/// Result type for surface operations.
pub type SurfaceResult<T> = Result<T, SurfaceError>;

/// Owns the drawing's pixels.
///
/// A surface created with zero width or height holds no buffer ("not mounted"): every
/// drawing operation on it is a silent no-op.
#[derive(Debug, Clone)]
pub struct DrawSurface {
    pixmap: Option<Pixmap>,
    width: u32,
    height: u32,
    background: BrushColor,
}

impl DrawSurface {
    /// Create a surface filled with `background`.
    pub fn new(width: u32, height: u32, background: BrushColor) -> Self {
        let pixmap = filled_pixmap(width, height, background);
        Self {
            pixmap,
            width,
            height,
            background,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn background(&self) -> BrushColor {
        self.background
    }

    /// Whether the surface has a pixel buffer.
    pub fn is_mounted(&self) -> bool {
        self.pixmap.is_some()
    }

    /// Premultiplied RGBA pixels, if mounted.
    pub fn pixmap(&self) -> Option<PixmapRef<'_>> {
        self.pixmap.as_ref().map(Pixmap::as_ref)
    }

    /// Straight (non-premultiplied) RGBA8 value at a pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let color = self.pixmap.as_ref()?.pixel(x, y)?.demultiply();
        Some([color.red(), color.green(), color.blue(), color.alpha()])
    }

    /// Change the buffer to a newly observed size, keeping what was drawn.
    ///
    /// The old content is copied onto the new buffer at (0,0) over a fresh
    /// background fill; anything outside the new bounds is cropped. Returns
    /// false without touching the buffer when the size is unchanged or when
    /// the new size has no area (a minimized window), so the drawing survives
    /// until a real size arrives.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if width == self.width && height == self.height {
            return false;
        }
        if width == 0 || height == 0 {
            log::debug!("Ignoring zero-area resize to {}x{}", width, height);
            return false;
        }

        let mut resized = filled_pixmap(width, height, self.background);
        if let (Some(new), Some(old)) = (resized.as_mut(), self.pixmap.as_ref()) {
            new.draw_pixmap(
                0,
                0,
                old.as_ref(),
                &PixmapPaint::default(),
                Transform::identity(),
                None,
            );
        }

        log::debug!(
            "Surface resized {}x{} -> {}x{}",
            self.width,
            self.height,
            width,
            height
        );
        self.pixmap = resized;
        self.width = width;
        self.height = height;
        true
    }

    /// Fill everything with the background color.
    pub fn clear(&mut self) {
        if let Some(pixmap) = self.pixmap.as_mut() {
            pixmap.fill(to_skia(self.background));
        }
    }

    /// Draw `bitmap` centered at `center`, rotated about its center by
    /// `rotation` radians, scaled to `size`x`size` and blended at `opacity`.
    ///
    /// Stamps falling partly or wholly outside the buffer are clipped.
    pub fn composite(&mut self, bitmap: &Bitmap, center: Point, size: f64, rotation: f64, opacity: f64) {
        let Some(pixmap) = self.pixmap.as_mut() else {
            return;
        };
        if size <= 0.0 || bitmap.width() == 0 || bitmap.height() == 0 {
            return;
        }

        let paint = PixmapPaint {
            opacity: opacity.clamp(0.0, 1.0) as f32,
            quality: FilterQuality::Bilinear,
            ..PixmapPaint::default()
        };
        let transform = stamp_transform(bitmap, center, size, rotation);
        pixmap.draw_pixmap(0, 0, bitmap.pixmap(), &paint, transform, None);
    }

    /// Encode the buffer as PNG.
    pub fn export_png(&self) -> SurfaceResult<Vec<u8>> {
        let pixmap = self.pixmap.as_ref().ok_or(SurfaceError::Unmounted)?;
        let rgba: Vec<u8> = pixmap
            .pixels()
            .iter()
            .flat_map(|p| {
                let c = p.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect();
        encode_png(&rgba, self.width, self.height)
    }
}

/// Maps bitmap space onto the surface for one stamp.
pub fn stamp_affine(bitmap_size: (u32, u32), center: Point, size: f64, rotation: f64) -> Affine {
    let (bw, bh) = bitmap_size;
    Affine::translate(center.to_vec2())
        * Affine::rotate(rotation)
        * Affine::translate((-size / 2.0, -size / 2.0))
        * Affine::scale_non_uniform(size / bw as f64, size / bh as f64)
}

fn stamp_transform(bitmap: &Bitmap, center: Point, size: f64, rotation: f64) -> Transform {
    let [a, b, c, d, e, f] = stamp_affine((bitmap.width(), bitmap.height()), center, size, rotation)
        .as_coeffs();
    Transform::from_row(a as f32, b as f32, c as f32, d as f32, e as f32, f as f32)
}

fn to_skia(color: BrushColor) -> Color {
    Color::from_rgba8(color.r, color.g, color.b, 255)
}

fn filled_pixmap(width: u32, height: u32, background: BrushColor) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(width, height)?;
    pixmap.fill(to_skia(background));
    Some(pixmap)
}

/// Encode straight RGBA8 pixel data to PNG bytes.
pub fn encode_png(rgba_data: &[u8], width: u32, height: u32) -> SurfaceResult<Vec<u8>> {
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder.write_header()?;
        writer.write_image_data(rgba_data)?;
    }
    Ok(png_data)
}
