//! Pan and double-tap recognition over touch or mouse-drag pointers.

use crate::engine::Direction;

/// Travel before a press becomes a pan.
pub const PAN_THRESHOLD_PX: f64 = 10.0;
pub const TAP_MAX_TRAVEL_PX: f64 = 10.0;
pub const TAP_MAX_MS: u64 = 250;
pub const DOUBLE_TAP_INTERVAL_MS: u64 = 300;
pub const DOUBLE_TAP_MAX_DISTANCE_PX: f64 = 20.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Cancel,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    pub phase: PointerPhase,
    pub x: f64,
    pub y: f64,
    pub at_ms: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gesture {
    Pan(Direction),
    DoubleTap,
}

#[derive(Clone, Copy, Debug)]
struct Stroke {
    start: (f64, f64),
    started_at: u64,
    panning: bool,
}

#[derive(Clone, Copy, Debug)]
struct Tap {
    at: (f64, f64),
    at_ms: u64,
}

#[derive(Debug, Default)]
pub struct GestureRecognizer {
    stroke: Option<Stroke>,
    last_tap: Option<Tap>,
}

impl GestureRecognizer {
    pub fn on_pointer(&mut self, ev: PointerEvent) -> Option<Gesture> {
        match ev.phase {
            PointerPhase::Down => {
                self.stroke = Some(Stroke { start: (ev.x, ev.y), started_at: ev.at_ms, panning: false });
                None
            }
            PointerPhase::Move => {
                let stroke = self.stroke.as_mut()?;
                let (dx, dy) = (ev.x - stroke.start.0, ev.y - stroke.start.1);
                if !stroke.panning && f64::hypot(dx, dy) < PAN_THRESHOLD_PX {
                    return None;
                }
                stroke.panning = true;
                Some(Gesture::Pan(cardinal(dx, dy)))
            }
            PointerPhase::Up => {
                let stroke = self.stroke.take()?;
                let travel = f64::hypot(ev.x - stroke.start.0, ev.y - stroke.start.1);
                let is_tap = !stroke.panning
                    && travel < TAP_MAX_TRAVEL_PX
                    && ev.at_ms.saturating_sub(stroke.started_at) <= TAP_MAX_MS;
                if !is_tap {
                    self.last_tap = None;
                    return None;
                }
                let tap = Tap { at: (ev.x, ev.y), at_ms: ev.at_ms };
                match self.last_tap.take() {
                    Some(prev)
                        if tap.at_ms.saturating_sub(prev.at_ms) <= DOUBLE_TAP_INTERVAL_MS
                            && f64::hypot(tap.at.0 - prev.at.0, tap.at.1 - prev.at.1) <= DOUBLE_TAP_MAX_DISTANCE_PX =>
                    {
                        Some(Gesture::DoubleTap)
                    }
                    _ => {
                        self.last_tap = Some(tap);
                        None
                    }
                }
            }
            PointerPhase::Cancel => {
                self.stroke = None;
                None
            }
        }
    }
}

/// Dominant axis of a screen-space displacement; y grows downward.
fn cardinal(dx: f64, dy: f64) -> Direction {
    if dx.abs() >= dy.abs() {
        if dx >= 0.0 { Direction::Right } else { Direction::Left }
    } else if dy >= 0.0 {
        Direction::Down
    } else {
        Direction::Up
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(phase: PointerPhase, x: f64, y: f64, at_ms: u64) -> PointerEvent {
        PointerEvent { phase, x, y, at_ms }
    }

    fn tap(r: &mut GestureRecognizer, x: f64, y: f64, at_ms: u64) -> Option<Gesture> {
        r.on_pointer(ev(PointerPhase::Down, x, y, at_ms));
        r.on_pointer(ev(PointerPhase::Up, x, y, at_ms + 50))
    }

    #[test]
    fn small_jitter_is_not_a_pan() {
        let mut r = GestureRecognizer::default();
        r.on_pointer(ev(PointerPhase::Down, 100.0, 100.0, 0));
        assert_eq!(r.on_pointer(ev(PointerPhase::Move, 104.0, 103.0, 10)), None);
    }

    #[test]
    fn pan_follows_the_dominant_axis() {
        let mut r = GestureRecognizer::default();
        r.on_pointer(ev(PointerPhase::Down, 100.0, 100.0, 0));
        assert_eq!(r.on_pointer(ev(PointerPhase::Move, 130.0, 110.0, 10)), Some(Gesture::Pan(Direction::Right)));
        assert_eq!(r.on_pointer(ev(PointerPhase::Move, 110.0, 60.0, 20)), Some(Gesture::Pan(Direction::Up)));
        assert_eq!(r.on_pointer(ev(PointerPhase::Up, 110.0, 60.0, 30)), None);
    }

    #[test]
    fn two_quick_taps_make_a_double_tap() {
        let mut r = GestureRecognizer::default();
        assert_eq!(tap(&mut r, 50.0, 50.0, 1_000), None);
        assert_eq!(tap(&mut r, 55.0, 52.0, 1_200), Some(Gesture::DoubleTap));
        // The pair is consumed.
        assert_eq!(tap(&mut r, 55.0, 52.0, 1_400), None);
    }

    #[test]
    fn slow_taps_do_not_pair() {
        let mut r = GestureRecognizer::default();
        assert_eq!(tap(&mut r, 50.0, 50.0, 1_000), None);
        assert_eq!(tap(&mut r, 50.0, 50.0, 2_000), None);
    }

    #[test]
    fn long_press_is_not_a_tap() {
        let mut r = GestureRecognizer::default();
        r.on_pointer(ev(PointerPhase::Down, 50.0, 50.0, 0));
        assert_eq!(r.on_pointer(ev(PointerPhase::Up, 50.0, 50.0, 900)), None);
        assert_eq!(tap(&mut r, 50.0, 50.0, 1_000), None);
    }
}
