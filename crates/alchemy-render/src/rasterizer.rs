//! SVG shape rasterization into tinted stamp bitmaps.

use alchemy_core::{BrushColor, ShapeDefinition, ShapeGroup, ShapeId};
use thiserror::Error;
use tiny_skia::{Pixmap, PixmapRef, Transform};

/// Edge length of every stamp bitmap, in device-independent pixels.
pub const STAMP_BITMAP_SIZE: u32 = 100;

/// Number of shapes shown per group in previews.
pub const PREVIEW_LIMIT: usize = 4;

/// Rasterization errors.
#[derive(Debug, Error)]
pub enum RasterError {
    #[error("SVG parse error: {0}")]
    Parse(#[from] usvg::Error),
    #[error("Failed to allocate a {0}x{0} bitmap")]
    Allocation(u32),
}

/// Result type for rasterization.
pub type RasterResult<T> = Result<T, RasterError>;

/// A tinted, fixed-size rendering of one shape.
#[derive(Debug, Clone)]
pub struct Bitmap {
    shape_id: ShapeId,
    pixmap: Pixmap,
}

impl Bitmap {
    /// The shape this bitmap was rendered from.
    pub fn shape_id(&self) -> ShapeId {
        self.shape_id
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Premultiplied RGBA pixels.
    pub fn pixmap(&self) -> PixmapRef<'_> {
        self.pixmap.as_ref()
    }
}

/// Converts shape definitions plus a tint into stamp bitmaps.
pub struct ShapeRasterizer {
    options: usvg::Options<'static>,
    size: u32,
}

impl Default for ShapeRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl ShapeRasterizer {
    /// Create a rasterizer producing [`STAMP_BITMAP_SIZE`] square bitmaps.
    pub fn new() -> Self {
        Self {
            options: usvg::Options::default(),
            size: STAMP_BITMAP_SIZE,
        }
    }

    /// Edge length of the bitmaps this rasterizer produces.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Rasterize one shape with its recolor token replaced by `tint`.
    ///
    /// The shape is stretched to fill the square bitmap. The parsed SVG tree is
    /// dropped before returning, on success and on failure alike.
    pub fn rasterize(&self, shape: &ShapeDefinition, tint: BrushColor) -> RasterResult<Bitmap> {
        let svg = shape.recolored(tint);
        let tree = usvg::Tree::from_str(&svg, &self.options)?;

        let mut pixmap =
            Pixmap::new(self.size, self.size).ok_or(RasterError::Allocation(self.size))?;
        let tree_size = tree.size();
        let transform = Transform::from_scale(
            self.size as f32 / tree_size.width(),
            self.size as f32 / tree_size.height(),
        );
        resvg::render(&tree, transform, &mut pixmap.as_mut());

        Ok(Bitmap {
            shape_id: shape.id(),
            pixmap,
        })
    }

    /// Rasterize a batch in input order, skipping shapes that fail.
    pub fn rasterize_all(&self, shapes: &[ShapeDefinition], tint: BrushColor) -> Vec<Bitmap> {
        shapes
            .iter()
            .filter_map(|shape| match self.rasterize(shape, tint) {
                Ok(bitmap) => Some(bitmap),
                Err(e) => {
                    log::warn!("Shape {} failed to rasterize: {}", shape.id(), e);
                    None
                }
            })
            .collect()
    }

    /// Render the first `limit` shapes of a group in white for previews.
    pub fn preview(&self, group: &ShapeGroup, limit: usize) -> Vec<Bitmap> {
        let shapes = &group.shapes()[..group.len().min(limit)];
        self.rasterize_all(shapes, BrushColor::WHITE)
    }
}
