//! Stamp shape definitions and groups.

use crate::color::BrushColor;
use std::sync::Arc;
use uuid::Uuid;

/// Unique identifier for a shape definition.
pub type ShapeId = Uuid;

/// Token inside a shape's SVG text that stands in for the fill/stroke color.
pub const RECOLOR_TOKEN: &str = "currentColor";

/// An immutable vector shape: SVG text with a recolorable token.
///
/// The SVG text is shared, so cloning a definition (e.g. to hand a batch to a
/// background rasterizer) never copies the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeDefinition {
    id: ShapeId,
    svg: Arc<str>,
}

impl ShapeDefinition {
    /// Create a definition with an identifier assigned by the caller.
    pub fn new(id: ShapeId, svg: impl Into<Arc<str>>) -> Self {
        Self { id, svg: svg.into() }
    }

    pub fn id(&self) -> ShapeId {
        self.id
    }

    /// The original SVG text, token intact.
    pub fn svg(&self) -> &str {
        &self.svg
    }

    /// Whether the SVG text carries the recolorable token at all.
    pub fn is_recolorable(&self) -> bool {
        self.svg.contains(RECOLOR_TOKEN)
    }

    /// SVG text with every recolor token replaced by the literal tint.
    pub fn recolored(&self, tint: BrushColor) -> String {
        self.svg.replace(RECOLOR_TOKEN, &tint.to_hex())
    }
}

/// A named, ordered collection of shape definitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeGroup {
    pub name: String,
    shapes: Vec<ShapeDefinition>,
}

impl ShapeGroup {
    pub fn new(name: impl Into<String>, shapes: Vec<ShapeDefinition>) -> Self {
        Self {
            name: name.into(),
            shapes,
        }
    }

    /// Shapes in insertion order.
    pub fn shapes(&self) -> &[ShapeDefinition] {
        &self.shapes
    }

    /// Append shapes; existing shapes are never modified.
    pub fn extend(&mut self, shapes: impl IntoIterator<Item = ShapeDefinition>) {
        self.shapes.extend(shapes);
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CIRCLE: &str = r#"<svg viewBox="0 0 10 10" xmlns="http://www.w3.org/2000/svg"><circle cx="5" cy="5" r="5" fill="currentColor" stroke="currentColor"/></svg>"#;

    #[test]
    fn test_recolor_replaces_every_token() {
        let shape = ShapeDefinition::new(Uuid::new_v4(), CIRCLE);
        let colored = shape.recolored(BrushColor::new(255, 0, 0));
        assert!(!colored.contains(RECOLOR_TOKEN));
        assert_eq!(colored.matches("#ff0000").count(), 2);
        // The stored definition is untouched.
        assert!(shape.svg().contains(RECOLOR_TOKEN));
    }

    #[test]
    fn test_is_recolorable() {
        let shape = ShapeDefinition::new(Uuid::new_v4(), CIRCLE);
        assert!(shape.is_recolorable());
        let fixed = ShapeDefinition::new(Uuid::new_v4(), "<svg fill=\"red\"/>");
        assert!(!fixed.is_recolorable());
    }

    #[test]
    fn test_group_extend_preserves_order() {
        let a = ShapeDefinition::new(Uuid::new_v4(), "a");
        let b = ShapeDefinition::new(Uuid::new_v4(), "b");
        let mut group = ShapeGroup::new("Test", vec![a.clone()]);
        group.extend([b.clone()]);
        assert_eq!(group.len(), 2);
        assert_eq!(group.shapes()[0].id(), a.id());
        assert_eq!(group.shapes()[1].id(), b.id());
    }
}
