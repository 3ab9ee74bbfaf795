use std::collections::HashSet;

use glam::Vec2;

use crate::geometry::Position;
use crate::keys::Key;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub logo: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers { shift: false, ctrl: false, alt: false, logo: false };

    pub fn from_winit(state: winit::keyboard::ModifiersState) -> Self {
        Self {
            shift: state.shift_key(),
            ctrl: state.control_key(),
            alt: state.alt_key(),
            logo: state.super_key(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Left,
    Right,
    Middle,
    Other(u16),
}

impl PointerButton {
    pub fn from_winit(button: winit::event::MouseButton) -> Self {
        use winit::event::MouseButton;
        match button {
            MouseButton::Left => PointerButton::Left,
            MouseButton::Right => PointerButton::Right,
            MouseButton::Middle => PointerButton::Middle,
            MouseButton::Back => PointerButton::Other(3),
            MouseButton::Forward => PointerButton::Other(4),
            MouseButton::Other(n) => PointerButton::Other(n),
        }
    }
}

/// Discrete input delivered by the platform layer. Pointer coordinates are window pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    KeyDown { key: Key, modifiers: Modifiers },
    KeyUp { key: Key, modifiers: Modifiers },
    PointerMove { x: f32, y: f32, modifiers: Modifiers },
    Button { button: PointerButton, pressed: bool, modifiers: Modifiers },
    Wheel { delta: f32, modifiers: Modifiers },
}

impl InputEvent {
    pub fn modifiers(&self) -> Modifiers {
        match *self {
            InputEvent::KeyDown { modifiers, .. }
            | InputEvent::KeyUp { modifiers, .. }
            | InputEvent::PointerMove { modifiers, .. }
            | InputEvent::Button { modifiers, .. }
            | InputEvent::Wheel { modifiers, .. } => modifiers,
        }
    }

    pub fn is_pointer(&self) -> bool {
        matches!(
            self,
            InputEvent::PointerMove { .. } | InputEvent::Button { .. } | InputEvent::Wheel { .. }
        )
    }
}

/// An event as seen by UI controls: the raw event plus the grid cell under
/// the pointer, when there is one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlInput {
    pub event: InputEvent,
    pub tile: Option<Position>,
}

impl ControlInput {
    pub fn key(event: InputEvent) -> Self {
        Self { event, tile: None }
    }

    pub fn key_down(&self) -> Option<Key> {
        match self.event {
            InputEvent::KeyDown { key, .. } => Some(key),
            _ => None,
        }
    }

    pub fn is_click(&self) -> bool {
        matches!(
            self.event,
            InputEvent::Button { button: PointerButton::Left, pressed: true, .. }
        )
    }
}

/// Held keys/buttons and the last pointer position, folded from events.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    pub keys: HashSet<Key>,
    pub buttons: HashSet<PointerButton>,
    pub pointer: Vec2,
    pub modifiers: Modifiers,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, event: &InputEvent) {
        self.modifiers = event.modifiers();
        match *event {
            InputEvent::KeyDown { key, .. } => {
                self.keys.insert(key);
            }
            InputEvent::KeyUp { key, .. } => {
                self.keys.remove(&key);
            }
            InputEvent::PointerMove { x, y, .. } => self.pointer = Vec2::new(x, y),
            InputEvent::Button { button, pressed, .. } => {
                if pressed {
                    self.buttons.insert(button);
                } else {
                    self.buttons.remove(&button);
                }
            }
            InputEvent::Wheel { .. } => {}
        }
    }

    pub fn is_key_down(&self, key: Key) -> bool {
        self.keys.contains(&key)
    }

    pub fn is_button_down(&self, button: PointerButton) -> bool {
        self.buttons.contains(&button)
    }

    /// Forget held keys and buttons, e.g. when the window loses focus.
    pub fn clear(&mut self) {
        self.keys.clear();
        self.buttons.clear();
    }
}
