//! Alchemy Brush Render Library
//!
//! Shape rasterization, the stamp cache and its background rebuilds, the
//! persistent drawing surface, and the session that ties them to input.

pub mod cache;
pub mod canvas;
pub mod rasterizer;
pub mod stamp;
pub mod surface;
pub mod worker;

pub use cache::{CacheKey, RasterCache, RebuildTicket};
pub use canvas::BrushCanvas;
pub use rasterizer::{Bitmap, RasterError, RasterResult, ShapeRasterizer, PREVIEW_LIMIT, STAMP_BITMAP_SIZE};
pub use stamp::{Stamp, StampEngine, StampTarget};
pub use surface::{encode_png, DrawSurface, SurfaceError, SurfaceResult, EXPORT_FILE_NAME};
pub use worker::{RasterBatch, RasterWorker};
