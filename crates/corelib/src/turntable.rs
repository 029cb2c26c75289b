//! Passive model rotation that pauses while the user drags the viewport.

use std::f32::consts::TAU;

/// Pointer state fed by the platform layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging,
}

/// Advances the model yaw by a fixed step per rendered frame unless dragging.
#[derive(Clone, Copy, Debug)]
pub struct Turntable {
    angle: f32,
    rate: f32,
    drag: DragState,
}

impl Turntable {
    /// Radians per frame.
    pub const DEFAULT_RATE: f32 = 0.01;

    pub fn new(rate: f32) -> Self {
        Self {
            angle: 0.0,
            rate,
            drag: DragState::Idle,
        }
    }

    #[inline]
    pub fn pointer_down(&mut self) {
        self.drag = DragState::Dragging;
    }

    #[inline]
    pub fn pointer_up(&mut self) {
        self.drag = DragState::Idle;
    }

    #[inline]
    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    #[inline]
    pub fn is_dragging(&self) -> bool {
        self.drag == DragState::Dragging
    }

    /// Current yaw in `[0, 2π)`.
    #[inline]
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Called once per rendered frame.
    pub fn advance_frame(&mut self) {
        if self.drag == DragState::Idle {
            self.angle = (self.angle + self.rate).rem_euclid(TAU);
        }
    }
}

impl Default for Turntable {
    fn default() -> Self {
        Self::new(Self::DEFAULT_RATE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advances_while_idle() {
        let mut t = Turntable::default();
        t.advance_frame();
        t.advance_frame();
        assert!((t.angle() - 2.0 * Turntable::DEFAULT_RATE).abs() < 1e-6);
    }

    #[test]
    fn pauses_exactly_while_dragging() {
        let mut t = Turntable::default();
        t.advance_frame();
        let before = t.angle();

        t.pointer_down();
        for _ in 0..10 {
            t.advance_frame();
        }
        assert_eq!(t.angle(), before);
        assert_eq!(t.drag_state(), DragState::Dragging);

        t.pointer_up();
        t.advance_frame();
        assert!(t.angle() > before);
    }

    #[test]
    fn angle_wraps_into_one_turn() {
        let mut t = Turntable::new(1.0);
        for _ in 0..100 {
            t.advance_frame();
            assert!((0.0..TAU).contains(&t.angle()));
        }
    }
}
