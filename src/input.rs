//! Keyboard and gesture input reduced to one current direction plus an
//! edge-triggered stop/start signal.

use winit::event::{ElementState, MouseButton, TouchPhase, VirtualKeyCode, WindowEvent};

use crate::engine::Direction;
use crate::gesture::{Gesture, GestureRecognizer, PointerEvent, PointerPhase};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputSignal {
    TogglePause,
}

const DIRECTION_KEYS: [(Direction, [VirtualKeyCode; 2]); 4] = [
    (Direction::Up, [VirtualKeyCode::W, VirtualKeyCode::Up]),
    (Direction::Left, [VirtualKeyCode::A, VirtualKeyCode::Left]),
    (Direction::Down, [VirtualKeyCode::S, VirtualKeyCode::Down]),
    (Direction::Right, [VirtualKeyCode::D, VirtualKeyCode::Right]),
];

const STOP_KEY: VirtualKeyCode = VirtualKeyCode::Space;

fn key_direction(key: VirtualKeyCode) -> Option<Direction> {
    DIRECTION_KEYS
        .iter()
        .find(|(_, keys)| keys.contains(&key))
        .map(|(direction, _)| *direction)
}

#[derive(Debug, Default)]
pub struct InputTranslator {
    direction: Option<Direction>,
    stop_held: bool,
    gestures: GestureRecognizer,
    cursor: (f64, f64),
    mouse_down: bool,
    touch_id: Option<u64>,
}

impl InputTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` while no mapped input is active.
    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    pub fn clear(&mut self) {
        self.direction = None;
    }

    pub fn on_key(&mut self, key: VirtualKeyCode, state: ElementState) -> Option<InputSignal> {
        match state {
            ElementState::Pressed => {
                if let Some(direction) = key_direction(key) {
                    self.direction = Some(direction);
                }
                if key == STOP_KEY && !self.stop_held {
                    self.stop_held = true;
                    return Some(InputSignal::TogglePause);
                }
                None
            }
            ElementState::Released => {
                // Any release drops the held direction, not only the key that set it.
                self.direction = None;
                if key == STOP_KEY {
                    self.stop_held = false;
                }
                None
            }
        }
    }

    pub fn on_pointer(&mut self, ev: PointerEvent) -> Option<InputSignal> {
        match self.gestures.on_pointer(ev)? {
            Gesture::Pan(direction) => {
                self.direction = Some(direction);
                None
            }
            Gesture::DoubleTap => {
                self.direction = None;
                Some(InputSignal::TogglePause)
            }
        }
    }

    /// Routes a window event; events that carry no input are ignored.
    pub fn handle_window_event(&mut self, event: &WindowEvent, now_ms: u64) -> Option<InputSignal> {
        match event {
            WindowEvent::KeyboardInput { input, .. } => match input.virtual_keycode {
                Some(key) => self.on_key(key, input.state),
                None => {
                    if input.state == ElementState::Released {
                        self.direction = None;
                    }
                    None
                }
            },
            WindowEvent::Touch(touch) => {
                // Only the first finger down drives gestures.
                match (self.touch_id, touch.phase) {
                    (None, TouchPhase::Started) => self.touch_id = Some(touch.id),
                    (Some(id), _) if id == touch.id => {}
                    _ => return None,
                }
                let phase = match touch.phase {
                    TouchPhase::Started => PointerPhase::Down,
                    TouchPhase::Moved => PointerPhase::Move,
                    TouchPhase::Ended => PointerPhase::Up,
                    TouchPhase::Cancelled => PointerPhase::Cancel,
                };
                if matches!(phase, PointerPhase::Up | PointerPhase::Cancel) {
                    self.touch_id = None;
                }
                self.on_pointer(PointerEvent { phase, x: touch.location.x, y: touch.location.y, at_ms: now_ms })
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = (position.x, position.y);
                if !self.mouse_down {
                    return None;
                }
                self.on_pointer(self.pointer(PointerPhase::Move, now_ms))
            }
            WindowEvent::MouseInput { state, button: MouseButton::Left, .. } => {
                let phase = match state {
                    ElementState::Pressed => PointerPhase::Down,
                    ElementState::Released => PointerPhase::Up,
                };
                self.mouse_down = *state == ElementState::Pressed;
                self.on_pointer(self.pointer(phase, now_ms))
            }
            _ => None,
        }
    }

    fn pointer(&self, phase: PointerPhase, at_ms: u64) -> PointerEvent {
        PointerEvent { phase, x: self.cursor.0, y: self.cursor.1, at_ms }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use winit::dpi::PhysicalPosition;
    use winit::event::{DeviceId, KeyboardInput, ModifiersState, Touch};
    use ElementState::{Pressed, Released};

    fn device() -> DeviceId {
        unsafe { DeviceId::dummy() }
    }

    #[allow(deprecated)]
    fn key_event(key: Option<VirtualKeyCode>, state: ElementState) -> WindowEvent<'static> {
        WindowEvent::KeyboardInput {
            device_id: device(),
            input: KeyboardInput { scancode: 0, state, virtual_keycode: key, modifiers: ModifiersState::empty() },
            is_synthetic: false,
        }
    }

    fn touch(id: u64, phase: TouchPhase, x: f64, y: f64) -> WindowEvent<'static> {
        WindowEvent::Touch(Touch {
            device_id: device(),
            phase,
            location: PhysicalPosition::new(x, y),
            force: None,
            id,
        })
    }

    #[allow(deprecated)]
    fn cursor(x: f64, y: f64) -> WindowEvent<'static> {
        WindowEvent::CursorMoved {
            device_id: device(),
            position: PhysicalPosition::new(x, y),
            modifiers: ModifiersState::empty(),
        }
    }

    #[allow(deprecated)]
    fn left_button(state: ElementState) -> WindowEvent<'static> {
        WindowEvent::MouseInput {
            device_id: device(),
            state,
            button: MouseButton::Left,
            modifiers: ModifiersState::empty(),
        }
    }

    #[test]
    fn last_key_wins() {
        let mut input = InputTranslator::new();
        input.on_key(VirtualKeyCode::Up, Pressed);
        input.on_key(VirtualKeyCode::Left, Pressed);
        assert_eq!(input.direction(), Some(Direction::Left));
    }

    #[test]
    fn letter_keys_map_like_arrows() {
        let mut input = InputTranslator::new();
        for (key, expected) in [
            (VirtualKeyCode::W, Direction::Up),
            (VirtualKeyCode::A, Direction::Left),
            (VirtualKeyCode::S, Direction::Down),
            (VirtualKeyCode::D, Direction::Right),
        ] {
            input.on_key(key, Pressed);
            assert_eq!(input.direction(), Some(expected));
        }
    }

    #[test]
    fn any_release_clears_the_direction() {
        let mut input = InputTranslator::new();
        input.on_key(VirtualKeyCode::Right, Pressed);
        input.on_key(VirtualKeyCode::Q, Released);
        assert_eq!(input.direction(), None);
    }

    #[test]
    fn unmapped_keys_are_ignored() {
        let mut input = InputTranslator::new();
        input.on_key(VirtualKeyCode::Down, Pressed);
        assert_eq!(input.on_key(VirtualKeyCode::Q, Pressed), None);
        assert_eq!(input.direction(), Some(Direction::Down));
    }

    #[test]
    fn space_toggles_once_per_press() {
        let mut input = InputTranslator::new();
        assert_eq!(input.on_key(VirtualKeyCode::Space, Pressed), Some(InputSignal::TogglePause));
        // Auto-repeat while held.
        assert_eq!(input.on_key(VirtualKeyCode::Space, Pressed), None);
        input.on_key(VirtualKeyCode::Space, Released);
        assert_eq!(input.on_key(VirtualKeyCode::Space, Pressed), Some(InputSignal::TogglePause));
    }

    #[test]
    fn pan_sets_direction_and_double_tap_clears_it() {
        let mut input = InputTranslator::new();
        let ev = |phase, x, y, at_ms| PointerEvent { phase, x, y, at_ms };
        input.on_pointer(ev(PointerPhase::Down, 0.0, 0.0, 0));
        input.on_pointer(ev(PointerPhase::Move, 0.0, 40.0, 20));
        assert_eq!(input.direction(), Some(Direction::Down));
        input.on_pointer(ev(PointerPhase::Up, 0.0, 40.0, 40));

        input.on_pointer(ev(PointerPhase::Down, 5.0, 5.0, 100));
        input.on_pointer(ev(PointerPhase::Up, 5.0, 5.0, 150));
        input.on_pointer(ev(PointerPhase::Down, 5.0, 5.0, 250));
        let signal = input.on_pointer(ev(PointerPhase::Up, 5.0, 5.0, 300));
        assert_eq!(signal, Some(InputSignal::TogglePause));
        assert_eq!(input.direction(), None);
    }

    #[test]
    fn release_without_keycode_still_clears_the_direction() {
        let mut input = InputTranslator::new();
        input.handle_window_event(&key_event(Some(VirtualKeyCode::Right), Pressed), 0);
        assert_eq!(input.direction(), Some(Direction::Right));
        assert_eq!(input.handle_window_event(&key_event(None, Released), 5), None);
        assert_eq!(input.direction(), None);
    }

    #[test]
    fn press_without_keycode_is_ignored() {
        let mut input = InputTranslator::new();
        input.on_key(VirtualKeyCode::Left, Pressed);
        assert_eq!(input.handle_window_event(&key_event(None, Pressed), 0), None);
        assert_eq!(input.direction(), Some(Direction::Left));
    }

    #[test]
    fn only_the_first_finger_drives_gestures() {
        let mut input = InputTranslator::new();
        input.handle_window_event(&touch(1, TouchPhase::Started, 100.0, 100.0), 0);
        input.handle_window_event(&touch(2, TouchPhase::Started, 300.0, 300.0), 5);
        input.handle_window_event(&touch(2, TouchPhase::Moved, 300.0, 360.0), 10);
        assert_eq!(input.direction(), None);

        input.handle_window_event(&touch(1, TouchPhase::Moved, 60.0, 100.0), 15);
        assert_eq!(input.direction(), Some(Direction::Left));
    }

    #[test]
    fn cancelled_touch_frees_the_slot() {
        let mut input = InputTranslator::new();
        input.handle_window_event(&touch(1, TouchPhase::Started, 100.0, 100.0), 0);
        input.handle_window_event(&touch(1, TouchPhase::Cancelled, 100.0, 100.0), 5);

        input.handle_window_event(&touch(2, TouchPhase::Started, 100.0, 100.0), 10);
        input.handle_window_event(&touch(2, TouchPhase::Moved, 100.0, 50.0), 15);
        assert_eq!(input.direction(), Some(Direction::Up));
    }

    #[test]
    fn mouse_drags_only_while_the_left_button_is_down() {
        let mut input = InputTranslator::new();
        input.handle_window_event(&cursor(10.0, 10.0), 0);
        input.handle_window_event(&cursor(80.0, 10.0), 5);
        assert_eq!(input.direction(), None);

        input.handle_window_event(&left_button(Pressed), 10);
        input.handle_window_event(&cursor(80.0, 60.0), 15);
        assert_eq!(input.direction(), Some(Direction::Down));

        input.handle_window_event(&left_button(Released), 20);
        input.handle_window_event(&cursor(10.0, 60.0), 25);
        assert_eq!(input.direction(), Some(Direction::Down));
    }
}
