//! Alchemy Brush Core Library
//!
//! Platform-agnostic data structures and logic for the stamping canvas:
//! colors, brush settings, shape definitions and groups, the shape library,
//! pointer tracking and configuration.

pub mod color;
pub mod config;
pub mod defaults;
pub mod input;
pub mod library;
pub mod settings;
pub mod shapes;

pub use color::{BrushColor, ColorParseError};
pub use config::{BrushConfig, ConfigError, ConfigResult};
pub use input::{DrawState, InputTracker, MouseButton, PointerEvent, TouchPhase};
pub use library::{ActiveGroupSet, ShapeLibrary, UPLOADED_GROUP};
pub use settings::{BrushSettings, SettingsUpdate, MAX_BRUSH_SIZE, MIN_BRUSH_SIZE};
pub use shapes::{ShapeDefinition, ShapeGroup, ShapeId, RECOLOR_TOKEN};
