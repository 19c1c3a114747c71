//! Pointer, touch and wheel input for panning and zooming.
//!
//! Mouse and touch events are folded into three pointer events (press,
//! move, release) by the host; their semantics are identical.
//!
//! # State Machine
//!
//! ```text
//!          press (image loaded)
//!   Idle ─────────────────────────▶ Dragging { anchor = pos - offset }
//!    ▲                                 │ move: offset = pos - anchor
//!    └──────── release / leave ────────┘
//! ```
//!
//! Dragging repositions the image absolutely from the anchor rather than
//! accumulating per-event deltas, so no error builds up over long drags.

use crate::geometry::Point;

/// Input events in canvas pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Mouse button down or touch start.
    Press(Point),
    /// Mouse move or touch move.
    Move(Point),
    /// Mouse up, mouse leave or touch end.
    Release,
    /// Wheel scroll over the preview. Negative `delta_y` scrolls up.
    Wheel { delta_y: f64 },
}

/// What the host should do after an input event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputResponse {
    /// The view changed and the preview must be redrawn.
    pub redraw: bool,
    /// The event was used by the tool; the host should suppress its
    /// default action (page scroll, text selection).
    pub consumed: bool,
}

impl InputResponse {
    pub const IGNORED: InputResponse = InputResponse {
        redraw: false,
        consumed: false,
    };

    pub fn consumed(redraw: bool) -> Self {
        Self {
            redraw,
            consumed: true,
        }
    }
}

/// Drag state.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        /// Pointer position minus the offset at press time.
        anchor: Point,
    },
}

/// Tracks an in-progress drag.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerTracker {
    state: DragState,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Start dragging at `pos`. Ignored unless an image is loaded.
    ///
    /// Returns true if a drag started.
    pub fn press(&mut self, pos: Point, current_offset: Point, image_loaded: bool) -> bool {
        if !image_loaded {
            return false;
        }
        self.state = DragState::Dragging {
            anchor: pos - current_offset,
        };
        true
    }

    /// New offset for a pointer at `pos`, or `None` when not dragging.
    pub fn drag_to(&self, pos: Point) -> Option<Point> {
        match self.state {
            DragState::Dragging { anchor } => Some(pos - anchor),
            DragState::Idle => None,
        }
    }

    /// End any drag.
    pub fn release(&mut self) {
        self.state = DragState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_without_image_stays_idle() {
        let mut tracker = PointerTracker::new();
        assert!(!tracker.press(Point::new(10.0, 10.0), Point::ORIGIN, false));
        assert_eq!(tracker.state(), DragState::Idle);
        assert_eq!(tracker.drag_to(Point::new(20.0, 20.0)), None);
    }

    #[test]
    fn test_press_records_anchor() {
        let mut tracker = PointerTracker::new();
        assert!(tracker.press(Point::new(100.0, 80.0), Point::new(30.0, -10.0), true));
        assert_eq!(
            tracker.state(),
            DragState::Dragging {
                anchor: Point::new(70.0, 90.0)
            }
        );
    }

    #[test]
    fn test_drag_tracks_pointer_delta() {
        let mut tracker = PointerTracker::new();
        let offset0 = Point::new(5.0, 5.0);
        tracker.press(Point::new(50.0, 50.0), offset0, true);

        let offset = tracker.drag_to(Point::new(60.0, 45.0)).unwrap();
        assert_eq!(offset, Point::new(15.0, 0.0));
    }

    #[test]
    fn test_release_returns_to_idle() {
        let mut tracker = PointerTracker::new();
        tracker.press(Point::new(1.0, 1.0), Point::ORIGIN, true);
        assert!(tracker.is_dragging());

        tracker.release();
        assert!(!tracker.is_dragging());
        assert_eq!(tracker.drag_to(Point::new(9.0, 9.0)), None);
    }

    #[test]
    fn test_release_when_idle_is_harmless() {
        let mut tracker = PointerTracker::new();
        tracker.release();
        assert_eq!(tracker.state(), DragState::Idle);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn point_strategy() -> impl Strategy<Value = Point> {
        (-1000i32..1000, -1000i32..1000).prop_map(|(x, y)| Point::new(x as f64, y as f64))
    }

    proptest! {
        /// Property: after any number of moves, offset = offset0 + (last - start).
        #[test]
        fn prop_drag_has_no_drift(
            start in point_strategy(),
            offset0 in point_strategy(),
            moves in prop::collection::vec(point_strategy(), 1..50),
        ) {
            let mut tracker = PointerTracker::new();
            tracker.press(start, offset0, true);

            let mut offset = offset0;
            for pos in &moves {
                offset = tracker.drag_to(*pos).unwrap();
            }

            let last = *moves.last().unwrap();
            prop_assert_eq!(offset, offset0 + (last - start));
        }
    }
}
