//! Input state for keyboard and mouse
//!
//! Collects winit key and mouse events between frames. The camera reads it
//! once per `update` and consumes the accumulated mouse delta.

use std::collections::HashSet;
use winit::event::{ElementState, MouseButton};
use winit::keyboard::KeyCode;

/// Keyboard and mouse state accumulated between frames
#[derive(Debug, Default)]
pub struct InputState {
    pressed_keys: HashSet<KeyCode>,
    mouse_buttons: HashSet<MouseButton>,
    last_mouse_pos: Option<(f64, f64)>,
    mouse_delta: (f32, f32),
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process keyboard input event
    pub fn on_keyboard_input(&mut self, keycode: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                self.pressed_keys.insert(keycode);
            }
            ElementState::Released => {
                self.pressed_keys.remove(&keycode);
            }
        }
    }

    /// Process mouse button event
    pub fn on_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        match state {
            ElementState::Pressed => {
                self.mouse_buttons.insert(button);
            }
            ElementState::Released => {
                self.mouse_buttons.remove(&button);
            }
        }
    }

    /// Process mouse movement event
    ///
    /// The first position only seeds the tracker so a cursor entering the
    /// window does not produce a jump.
    pub fn on_mouse_move(&mut self, position: (f64, f64)) {
        if let Some(last) = self.last_mouse_pos {
            self.mouse_delta.0 += (position.0 - last.0) as f32;
            self.mouse_delta.1 += (position.1 - last.1) as f32;
        }
        self.last_mouse_pos = Some(position);
    }

    /// Returns and clears the mouse movement accumulated since the last call
    pub fn take_mouse_delta(&mut self) -> (f32, f32) {
        std::mem::take(&mut self.mouse_delta)
    }

    /// Forget the cursor position (e.g. when the window loses focus)
    pub fn reset_mouse(&mut self) {
        self.mouse_delta = (0.0, 0.0);
        self.last_mouse_pos = None;
        self.mouse_buttons.clear();
    }

    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.pressed_keys.contains(&key)
    }

    pub fn is_mouse_button_pressed(&self, button: MouseButton) -> bool {
        self.mouse_buttons.contains(&button)
    }
}
