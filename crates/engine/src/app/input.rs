use winit::keyboard::{KeyCode, PhysicalKey};

use crate::character::{Key, KeySet};

/// Physical keys bound to each character key. Several physical keys may feed
/// the same character key; it reads as held while any of them is down.
const BINDINGS: &[(KeyCode, Key)] = &[
    (KeyCode::KeyA, Key::Left),
    (KeyCode::ArrowLeft, Key::Left),
    (KeyCode::KeyD, Key::Right),
    (KeyCode::ArrowRight, Key::Right),
    (KeyCode::KeyS, Key::Crouch),
    (KeyCode::ArrowDown, Key::Crouch),
    (KeyCode::ShiftLeft, Key::Modifier),
    (KeyCode::ShiftRight, Key::Modifier),
    (KeyCode::KeyW, Key::Jump),
    (KeyCode::ArrowUp, Key::Jump),
    (KeyCode::Space, Key::Jump),
    (KeyCode::KeyJ, Key::Attack),
    (KeyCode::KeyK, Key::Dash),
    (KeyCode::KeyL, Key::Special),
    (KeyCode::KeyV, Key::Celebrate),
    (KeyCode::KeyP, Key::Script),
];

const BINDING_COUNT: usize = BINDINGS.len();

#[derive(Debug, Clone, Copy)]
pub(crate) struct HeldKeys {
    down: [bool; BINDING_COUNT],
}

impl Default for HeldKeys {
    fn default() -> Self {
        Self {
            down: [false; BINDING_COUNT],
        }
    }
}

impl HeldKeys {
    /// Returns false when the key has no binding.
    pub(crate) fn set(&mut self, key: PhysicalKey, is_down: bool) -> bool {
        let PhysicalKey::Code(code) = key else {
            return false;
        };
        let mut bound = false;
        for (slot, (binding, _)) in self.down.iter_mut().zip(BINDINGS) {
            if *binding == code {
                *slot = is_down;
                bound = true;
            }
        }
        bound
    }

    pub(crate) fn release_all(&mut self) {
        self.down = [false; BINDING_COUNT];
    }

    pub(crate) fn key_set(&self) -> KeySet {
        let mut keys = KeySet::empty();
        for (down, (_, key)) in self.down.iter().zip(BINDINGS) {
            if *down {
                keys.set(*key, true);
            }
        }
        keys
    }
}
