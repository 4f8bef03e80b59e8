//! Brush settings and the settings payload received from the toolbar.

use crate::color::{BrushColor, ColorParseError};
use serde::{Deserialize, Serialize};

/// Smallest configurable stamp size.
pub const MIN_BRUSH_SIZE: f64 = 1.0;
/// Largest configurable stamp size.
pub const MAX_BRUSH_SIZE: f64 = 300.0;

pub const DEFAULT_BRUSH_SIZE: f64 = 50.0;
pub const DEFAULT_BRUSH_OPACITY: f64 = 0.5;

/// Current brush parameters read on every stamp and cache rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BrushSettings {
    /// Tint substituted into every shape.
    pub color: BrushColor,
    /// Bounds the stamp diameter, in [`MIN_BRUSH_SIZE`, `MAX_BRUSH_SIZE`].
    pub size: f64,
    /// Blend opacity in [0, 1].
    pub opacity: f64,
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self {
            color: BrushColor::WHITE,
            size: DEFAULT_BRUSH_SIZE,
            opacity: DEFAULT_BRUSH_OPACITY,
        }
    }
}

impl BrushSettings {
    /// Create settings, clamping size and opacity into their valid ranges.
    pub fn new(color: BrushColor, size: f64, opacity: f64) -> Self {
        Self {
            color,
            size: clamp_size(size),
            opacity: clamp_opacity(opacity),
        }
    }

    /// Return a copy with a new size (clamped).
    pub fn with_size(mut self, size: f64) -> Self {
        self.size = clamp_size(size);
        self
    }

    /// Return a copy with a new opacity (clamped).
    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = clamp_opacity(opacity);
        self
    }

    /// Return a copy with a new tint.
    pub fn with_color(mut self, color: BrushColor) -> Self {
        self.color = color;
        self
    }
}

fn clamp_size(size: f64) -> f64 {
    if size.is_nan() {
        return DEFAULT_BRUSH_SIZE;
    }
    size.clamp(MIN_BRUSH_SIZE, MAX_BRUSH_SIZE)
}

fn clamp_opacity(opacity: f64) -> f64 {
    if opacity.is_nan() {
        return DEFAULT_BRUSH_OPACITY;
    }
    opacity.clamp(0.0, 1.0)
}

/// Settings payload as produced by the toolbar collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    /// Hex color string.
    pub color: String,
    pub size: f64,
    pub opacity: f64,
    pub is_mirrored: bool,
}

impl SettingsUpdate {
    /// Validate the payload into brush settings and the mirror flag.
    pub fn resolve(&self) -> Result<(BrushSettings, bool), ColorParseError> {
        let color = BrushColor::from_hex(&self.color)?;
        Ok((BrushSettings::new(color, self.size, self.opacity), self.is_mirrored))
    }
}

impl From<(BrushSettings, bool)> for SettingsUpdate {
    fn from((settings, is_mirrored): (BrushSettings, bool)) -> Self {
        Self {
            color: settings.color.to_hex(),
            size: settings.size,
            opacity: settings.opacity,
            is_mirrored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = BrushSettings::default();
        assert_eq!(settings.color, BrushColor::WHITE);
        assert!((settings.size - 50.0).abs() < f64::EPSILON);
        assert!((settings.opacity - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_clamping() {
        let settings = BrushSettings::new(BrushColor::BLACK, 1000.0, 3.0);
        assert!((settings.size - MAX_BRUSH_SIZE).abs() < f64::EPSILON);
        assert!((settings.opacity - 1.0).abs() < f64::EPSILON);

        let settings = settings.with_size(-4.0).with_opacity(-1.0);
        assert!((settings.size - MIN_BRUSH_SIZE).abs() < f64::EPSILON);
        assert!(settings.opacity.abs() < f64::EPSILON);

        let settings = settings.with_size(f64::NAN);
        assert!((settings.size - DEFAULT_BRUSH_SIZE).abs() < f64::EPSILON);
    }

    #[test]
    fn test_update_from_json() {
        let update: SettingsUpdate = serde_json::from_str(
            r##"{"color":"#ff0000","size":120,"opacity":0.25,"isMirrored":false}"##,
        )
        .unwrap();
        let (settings, mirrored) = update.resolve().unwrap();
        assert_eq!(settings.color, BrushColor::new(255, 0, 0));
        assert!((settings.size - 120.0).abs() < f64::EPSILON);
        assert!((settings.opacity - 0.25).abs() < f64::EPSILON);
        assert!(!mirrored);
    }

    #[test]
    fn test_update_rejects_bad_color() {
        let update = SettingsUpdate {
            color: "not-a-color".to_string(),
            size: 10.0,
            opacity: 1.0,
            is_mirrored: true,
        };
        assert!(update.resolve().is_err());
    }

    #[test]
    fn test_update_roundtrip_from_settings() {
        let update = SettingsUpdate::from((BrushSettings::default(), true));
        assert_eq!(update.color, "#ffffff");
        assert!(update.is_mirrored);
    }
}
