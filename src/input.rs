// Pointer/touch input as an explicit state machine.
// Visual: press starts a line, every move extends it, release ends it.

use crate::types::Point;

/// Where an event came from. Touch events carry the first touch point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Source {
    Mouse,
    Touch,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// pointer-down / touch-start
    Down,
    /// pointer-move / touch-move
    Move,
    /// pointer-up / touch-end
    Up,
    /// pointer left the surface, or the touch was cancelled
    Leave,
}

/// A raw input event in client coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    pub source: Source,
    pub phase: Phase,
    pub client: (f32, f32),
}

impl PointerEvent {
    pub fn mouse(phase: Phase, x: f32, y: f32) -> Self {
        Self { source: Source::Mouse, phase, client: (x, y) }
    }

    pub fn touch(phase: Phase, x: f32, y: f32) -> Self {
        Self { source: Source::Touch, phase, client: (x, y) }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum InputState {
    #[default]
    Idle,
    Drawing { last: Point },
}

/// What the caller should do after feeding an event in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Transition {
    Ignored,
    Started(Point),
    /// Render a segment from the first point to the second.
    Segment(Point, Point),
    Ended,
}

impl InputState {
    pub fn is_drawing(&self) -> bool {
        matches!(self, Self::Drawing { .. })
    }

    /// Advance on an already-mapped event position. Events that don't apply
    /// to the current state are dropped, never buffered.
    pub fn advance(&mut self, phase: Phase, at: Point) -> Transition {
        match (*self, phase) {
            (_, Phase::Down) => {
                *self = Self::Drawing { last: at };
                Transition::Started(at)
            }
            (Self::Drawing { last }, Phase::Move) => {
                *self = Self::Drawing { last: at };
                Transition::Segment(last, at)
            }
            (Self::Drawing { .. }, Phase::Up | Phase::Leave) => {
                *self = Self::Idle;
                Transition::Ended
            }
            (Self::Idle, Phase::Move | Phase::Up | Phase::Leave) => Transition::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moves_while_idle_are_dropped() {
        let mut state = InputState::Idle;
        assert_eq!(state.advance(Phase::Move, Point::new(1.0, 1.0)), Transition::Ignored);
        assert_eq!(state.advance(Phase::Up, Point::new(1.0, 1.0)), Transition::Ignored);
        assert_eq!(state, InputState::Idle);
    }

    #[test]
    fn full_gesture() {
        let mut state = InputState::default();
        let a = Point::new(1.0, 2.0);
        let b = Point::new(5.0, 2.0);
        let c = Point::new(9.0, 7.0);
        assert_eq!(state.advance(Phase::Down, a), Transition::Started(a));
        assert!(state.is_drawing());
        assert_eq!(state.advance(Phase::Move, b), Transition::Segment(a, b));
        assert_eq!(state.advance(Phase::Move, c), Transition::Segment(b, c));
        assert_eq!(state.advance(Phase::Up, c), Transition::Ended);
        assert!(!state.is_drawing());
        assert_eq!(state.advance(Phase::Move, a), Transition::Ignored);
    }

    #[test]
    fn leaving_the_surface_ends_the_stroke() {
        let mut state = InputState::default();
        state.advance(Phase::Down, Point::new(0.0, 0.0));
        assert_eq!(state.advance(Phase::Leave, Point::new(-3.0, 0.0)), Transition::Ended);
        assert_eq!(state, InputState::Idle);
    }

    #[test]
    fn second_down_restarts_from_new_point() {
        let mut state = InputState::default();
        state.advance(Phase::Down, Point::new(0.0, 0.0));
        let p = Point::new(50.0, 50.0);
        state.advance(Phase::Down, p);
        assert_eq!(state, InputState::Drawing { last: p });
    }
}
