//! Stable key codes, independent of the windowing backend.
//!
//! Values never change between releases so recorded input stays valid.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Key(pub u32);

impl Key {
    // Letters (0x0001 - 0x001A)
    pub const A: Key = Key(0x0001);
    pub const B: Key = Key(0x0002);
    pub const C: Key = Key(0x0003);
    pub const D: Key = Key(0x0004);
    pub const E: Key = Key(0x0005);
    pub const F: Key = Key(0x0006);
    pub const G: Key = Key(0x0007);
    pub const H: Key = Key(0x0008);
    pub const I: Key = Key(0x0009);
    pub const J: Key = Key(0x000A);
    pub const K: Key = Key(0x000B);
    pub const L: Key = Key(0x000C);
    pub const M: Key = Key(0x000D);
    pub const N: Key = Key(0x000E);
    pub const O: Key = Key(0x000F);
    pub const P: Key = Key(0x0010);
    pub const Q: Key = Key(0x0011);
    pub const R: Key = Key(0x0012);
    pub const S: Key = Key(0x0013);
    pub const T: Key = Key(0x0014);
    pub const U: Key = Key(0x0015);
    pub const V: Key = Key(0x0016);
    pub const W: Key = Key(0x0017);
    pub const X: Key = Key(0x0018);
    pub const Y: Key = Key(0x0019);
    pub const Z: Key = Key(0x001A);

    // Digits (0x0030 - 0x0039, ASCII)
    pub const DIGIT_0: Key = Key(0x0030);
    pub const DIGIT_1: Key = Key(0x0031);
    pub const DIGIT_2: Key = Key(0x0032);
    pub const DIGIT_3: Key = Key(0x0033);
    pub const DIGIT_4: Key = Key(0x0034);
    pub const DIGIT_5: Key = Key(0x0035);
    pub const DIGIT_6: Key = Key(0x0036);
    pub const DIGIT_7: Key = Key(0x0037);
    pub const DIGIT_8: Key = Key(0x0038);
    pub const DIGIT_9: Key = Key(0x0039);

    // Modifiers (0x0200 - 0x020F)
    pub const ALT_LEFT: Key = Key(0x0200);
    pub const ALT_RIGHT: Key = Key(0x0201);
    pub const CONTROL_LEFT: Key = Key(0x0202);
    pub const CONTROL_RIGHT: Key = Key(0x0203);
    pub const SHIFT_LEFT: Key = Key(0x0204);
    pub const SHIFT_RIGHT: Key = Key(0x0205);
    pub const SUPER_LEFT: Key = Key(0x0206);
    pub const SUPER_RIGHT: Key = Key(0x0207);

    // Special keys (0x0300 - 0x030F)
    pub const BACKSPACE: Key = Key(0x0300);
    pub const ENTER: Key = Key(0x0303);
    pub const SPACE: Key = Key(0x0304);
    pub const TAB: Key = Key(0x0305);
    pub const ESCAPE: Key = Key(0x0306);
    pub const DELETE: Key = Key(0x0307);

    // Arrows (0x0400 - 0x0403)
    pub const ARROW_DOWN: Key = Key(0x0400);
    pub const ARROW_LEFT: Key = Key(0x0401);
    pub const ARROW_RIGHT: Key = Key(0x0402);
    pub const ARROW_UP: Key = Key(0x0403);

    // Navigation (0x0500 - 0x050F)
    pub const END: Key = Key(0x0500);
    pub const HOME: Key = Key(0x0501);
    pub const PAGE_DOWN: Key = Key(0x0502);
    pub const PAGE_UP: Key = Key(0x0503);

    // Function keys (0x0600 - 0x060B)
    pub const F1: Key = Key(0x0600);
    pub const F2: Key = Key(0x0601);
    pub const F3: Key = Key(0x0602);
    pub const F4: Key = Key(0x0603);
    pub const F5: Key = Key(0x0604);
    pub const F6: Key = Key(0x0605);
    pub const F7: Key = Key(0x0606);
    pub const F8: Key = Key(0x0607);
    pub const F9: Key = Key(0x0608);
    pub const F10: Key = Key(0x0609);
    pub const F11: Key = Key(0x060A);
    pub const F12: Key = Key(0x060B);

    /// Letter or digit this key types, uppercase.
    pub fn to_char(self) -> Option<char> {
        match self.0 {
            0x0001..=0x001A => char::from_u32('A' as u32 + self.0 - 1),
            0x0030..=0x0039 => char::from_u32(self.0),
            _ if self == Key::SPACE => Some(' '),
            _ => None,
        }
    }

    /// Map a physical winit key. Unsupported keys return `None`.
    pub fn from_winit(code: winit::keyboard::KeyCode) -> Option<Key> {
        use winit::keyboard::KeyCode;

        let key = match code {
            KeyCode::KeyA => Key::A,
            KeyCode::KeyB => Key::B,
            KeyCode::KeyC => Key::C,
            KeyCode::KeyD => Key::D,
            KeyCode::KeyE => Key::E,
            KeyCode::KeyF => Key::F,
            KeyCode::KeyG => Key::G,
            KeyCode::KeyH => Key::H,
            KeyCode::KeyI => Key::I,
            KeyCode::KeyJ => Key::J,
            KeyCode::KeyK => Key::K,
            KeyCode::KeyL => Key::L,
            KeyCode::KeyM => Key::M,
            KeyCode::KeyN => Key::N,
            KeyCode::KeyO => Key::O,
            KeyCode::KeyP => Key::P,
            KeyCode::KeyQ => Key::Q,
            KeyCode::KeyR => Key::R,
            KeyCode::KeyS => Key::S,
            KeyCode::KeyT => Key::T,
            KeyCode::KeyU => Key::U,
            KeyCode::KeyV => Key::V,
            KeyCode::KeyW => Key::W,
            KeyCode::KeyX => Key::X,
            KeyCode::KeyY => Key::Y,
            KeyCode::KeyZ => Key::Z,
            KeyCode::Digit0 => Key::DIGIT_0,
            KeyCode::Digit1 => Key::DIGIT_1,
            KeyCode::Digit2 => Key::DIGIT_2,
            KeyCode::Digit3 => Key::DIGIT_3,
            KeyCode::Digit4 => Key::DIGIT_4,
            KeyCode::Digit5 => Key::DIGIT_5,
            KeyCode::Digit6 => Key::DIGIT_6,
            KeyCode::Digit7 => Key::DIGIT_7,
            KeyCode::Digit8 => Key::DIGIT_8,
            KeyCode::Digit9 => Key::DIGIT_9,
            KeyCode::AltLeft => Key::ALT_LEFT,
            KeyCode::AltRight => Key::ALT_RIGHT,
            KeyCode::ControlLeft => Key::CONTROL_LEFT,
            KeyCode::ControlRight => Key::CONTROL_RIGHT,
            KeyCode::ShiftLeft => Key::SHIFT_LEFT,
            KeyCode::ShiftRight => Key::SHIFT_RIGHT,
            KeyCode::SuperLeft => Key::SUPER_LEFT,
            KeyCode::SuperRight => Key::SUPER_RIGHT,
            KeyCode::Backspace => Key::BACKSPACE,
            KeyCode::Enter => Key::ENTER,
            KeyCode::NumpadEnter => Key::ENTER,
            KeyCode::Space => Key::SPACE,
            KeyCode::Tab => Key::TAB,
            KeyCode::Escape => Key::ESCAPE,
            KeyCode::Delete => Key::DELETE,
            KeyCode::ArrowDown => Key::ARROW_DOWN,
            KeyCode::ArrowLeft => Key::ARROW_LEFT,
            KeyCode::ArrowRight => Key::ARROW_RIGHT,
            KeyCode::ArrowUp => Key::ARROW_UP,
            KeyCode::End => Key::END,
            KeyCode::Home => Key::HOME,
            KeyCode::PageDown => Key::PAGE_DOWN,
            KeyCode::PageUp => Key::PAGE_UP,
            KeyCode::F1 => Key::F1,
            KeyCode::F2 => Key::F2,
            KeyCode::F3 => Key::F3,
            KeyCode::F4 => Key::F4,
            KeyCode::F5 => Key::F5,
            KeyCode::F6 => Key::F6,
            KeyCode::F7 => Key::F7,
            KeyCode::F8 => Key::F8,
            KeyCode::F9 => Key::F9,
            KeyCode::F10 => Key::F10,
            KeyCode::F11 => Key::F11,
            KeyCode::F12 => Key::F12,
            _ => return None,
        };
        Some(key)
    }
}
