//! Pointer/touch tracking for the drawing surface.
//!
//! Raw events arrive in client (window) coordinates. The tracker keeps a
//! single drawing flag and turns events into samples in the surface's own
//! pixel space.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Phase of a touch point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TouchPhase {
    Started,
    Moved,
    Ended,
    Cancelled,
}

/// Pointer event type for unified mouse/touch handling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down {
        position: Point,
        button: MouseButton,
    },
    Up {
        position: Point,
        button: MouseButton,
    },
    Move {
        position: Point,
    },
    /// The pointer left the surface.
    Leave,
    Touch {
        id: u64,
        phase: TouchPhase,
        position: Point,
    },
}

/// Drawing state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawState {
    #[default]
    Idle,
    Drawing,
}

/// Converts raw pointer events into drawing samples.
#[derive(Debug, Clone, Default)]
pub struct InputTracker {
    state: DrawState,
    /// On-screen offset of the surface's top-left corner.
    surface_origin: Vec2,
    /// The first touch point; further simultaneous touches are ignored.
    tracked_touch: Option<u64>,
}

impl InputTracker {
    /// Create a tracker in the idle state with the surface at the origin.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the surface's on-screen offset.
    pub fn set_surface_origin(&mut self, origin: Point) {
        self.surface_origin = origin.to_vec2();
    }

    pub fn state(&self) -> DrawState {
        self.state
    }

    pub fn is_drawing(&self) -> bool {
        self.state == DrawState::Drawing
    }

    /// Map client coordinates into surface pixel space.
    pub fn to_surface(&self, client: Point) -> Point {
        client - self.surface_origin
    }

    /// Process a pointer event.
    ///
    /// Returns the surface-relative point to sample, if the event produces a
    /// sample: a press always does (so a tap stamps once), a move does only
    /// while drawing, and release/leave never do.
    pub fn handle_pointer_event(&mut self, event: PointerEvent) -> Option<Point> {
        match event {
            PointerEvent::Down { position, button } => {
                if button != MouseButton::Left {
                    return None;
                }
                self.state = DrawState::Drawing;
                Some(self.to_surface(position))
            }
            PointerEvent::Move { position } => self.sample_if_drawing(position),
            PointerEvent::Up { .. } | PointerEvent::Leave => {
                self.stop();
                None
            }
            PointerEvent::Touch { id, phase, position } => self.handle_touch(id, phase, position),
        }
    }

    fn handle_touch(&mut self, id: u64, phase: TouchPhase, position: Point) -> Option<Point> {
        match phase {
            TouchPhase::Started => {
                if self.tracked_touch.is_some() {
                    return None;
                }
                self.tracked_touch = Some(id);
                self.state = DrawState::Drawing;
                Some(self.to_surface(position))
            }
            TouchPhase::Moved => {
                if self.tracked_touch != Some(id) {
                    return None;
                }
                self.sample_if_drawing(position)
            }
            TouchPhase::Ended | TouchPhase::Cancelled => {
                if self.tracked_touch == Some(id) {
                    self.stop();
                }
                None
            }
        }
    }

    fn sample_if_drawing(&self, position: Point) -> Option<Point> {
        self.is_drawing().then(|| self.to_surface(position))
    }

    fn stop(&mut self) {
        self.state = DrawState::Idle;
        self.tracked_touch = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn down(x: f64, y: f64) -> PointerEvent {
        PointerEvent::Down {
            position: Point::new(x, y),
            button: MouseButton::Left,
        }
    }

    fn up(x: f64, y: f64) -> PointerEvent {
        PointerEvent::Up {
            position: Point::new(x, y),
            button: MouseButton::Left,
        }
    }

    fn moved(x: f64, y: f64) -> PointerEvent {
        PointerEvent::Move {
            position: Point::new(x, y),
        }
    }

    fn touch(id: u64, phase: TouchPhase, x: f64, y: f64) -> PointerEvent {
        PointerEvent::Touch {
            id,
            phase,
            position: Point::new(x, y),
        }
    }

    #[test]
    fn test_initial_state_is_idle() {
        let input = InputTracker::new();
        assert_eq!(input.state(), DrawState::Idle);
    }

    #[test]
    fn test_press_emits_one_sample() {
        let mut input = InputTracker::new();
        assert_eq!(input.handle_pointer_event(down(10.0, 20.0)), Some(Point::new(10.0, 20.0)));
        assert!(input.is_drawing());
    }

    #[test]
    fn test_move_while_idle_emits_nothing() {
        let mut input = InputTracker::new();
        assert_eq!(input.handle_pointer_event(moved(5.0, 5.0)), None);

        input.handle_pointer_event(down(0.0, 0.0));
        assert_eq!(input.handle_pointer_event(moved(5.0, 5.0)), Some(Point::new(5.0, 5.0)));
    }

    #[test]
    fn test_release_and_leave_stop_drawing() {
        let mut input = InputTracker::new();
        input.handle_pointer_event(down(0.0, 0.0));
        assert_eq!(input.handle_pointer_event(up(1.0, 1.0)), None);
        assert!(!input.is_drawing());
        assert_eq!(input.handle_pointer_event(moved(2.0, 2.0)), None);

        input.handle_pointer_event(down(0.0, 0.0));
        assert_eq!(input.handle_pointer_event(PointerEvent::Leave), None);
        assert_eq!(input.state(), DrawState::Idle);
    }

    #[test]
    fn test_secondary_button_does_not_draw() {
        let mut input = InputTracker::new();
        let event = PointerEvent::Down {
            position: Point::new(1.0, 1.0),
            button: MouseButton::Right,
        };
        assert_eq!(input.handle_pointer_event(event), None);
        assert!(!input.is_drawing());
    }

    #[test]
    fn test_coordinates_are_surface_relative() {
        let mut input = InputTracker::new();
        input.set_surface_origin(Point::new(100.0, 40.0));
        let sample = input.handle_pointer_event(down(150.0, 90.0)).unwrap();
        assert!((sample.x - 50.0).abs() < f64::EPSILON);
        assert!((sample.y - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_touch_tracks_first_point_only() {
        let mut input = InputTracker::new();
        assert!(input.handle_pointer_event(touch(1, TouchPhase::Started, 1.0, 1.0)).is_some());
        // A second finger neither samples nor steals tracking.
        assert!(input.handle_pointer_event(touch(2, TouchPhase::Started, 9.0, 9.0)).is_none());
        assert!(input.handle_pointer_event(touch(2, TouchPhase::Moved, 8.0, 8.0)).is_none());
        assert!(input.handle_pointer_event(touch(2, TouchPhase::Ended, 8.0, 8.0)).is_none());
        assert!(input.is_drawing());

        assert_eq!(
            input.handle_pointer_event(touch(1, TouchPhase::Moved, 3.0, 4.0)),
            Some(Point::new(3.0, 4.0))
        );
        assert!(input.handle_pointer_event(touch(1, TouchPhase::Ended, 3.0, 4.0)).is_none());
        assert!(!input.is_drawing());

        // After release a new touch can be tracked.
        assert!(input.handle_pointer_event(touch(2, TouchPhase::Started, 5.0, 5.0)).is_some());
    }
}
