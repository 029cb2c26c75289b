//! Pointer handling for the 3D viewport: left-drag orbits the camera and
//! pauses the turntable.

/// Tracks whether a viewport drag is in progress and yields cursor deltas.
#[derive(Clone, Copy, Debug, Default)]
pub struct DragTracker {
    dragging: bool,
    last: Option<(f32, f32)>,
}

impl DragTracker {
    /// Button pressed over the viewport. Returns `true` if a drag started.
    pub fn press(&mut self) -> bool {
        let started = !self.dragging;
        self.dragging = true;
        started
    }

    /// Button released (anywhere). Returns `true` if a drag ended.
    pub fn release(&mut self) -> bool {
        std::mem::replace(&mut self.dragging, false)
    }

    #[inline]
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Cursor moved to `(x, y)`. Returns the delta while dragging.
    pub fn cursor_moved(&mut self, x: f32, y: f32) -> Option<(f32, f32)> {
        let prev = self.last.replace((x, y));
        if !self.dragging {
            return None;
        }
        prev.map(|(px, py)| (x - px, y - py))
    }

    /// Cursor left the window: forget the position so the next move
    /// doesn't produce a jump.
    pub fn cursor_left(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deltas_only_while_dragging() {
        let mut t = DragTracker::default();
        assert_eq!(t.cursor_moved(10.0, 10.0), None);
        assert!(t.press());
        assert_eq!(t.cursor_moved(15.0, 8.0), Some((5.0, -2.0)));
        assert!(t.release());
        assert_eq!(t.cursor_moved(20.0, 8.0), None);
    }

    #[test]
    fn release_without_press_is_noop() {
        let mut t = DragTracker::default();
        assert!(!t.release());
        assert!(t.press());
        assert!(!t.press());
        assert!(t.is_dragging());
    }

    #[test]
    fn leaving_window_drops_last_position() {
        let mut t = DragTracker::default();
        t.press();
        t.cursor_moved(1.0, 1.0);
        t.cursor_left();
        assert_eq!(t.cursor_moved(300.0, 300.0), None);
        assert_eq!(t.cursor_moved(301.0, 300.0), Some((1.0, 0.0)));
    }
}
