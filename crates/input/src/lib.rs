//! Mouse and keyboard state for the landing window.
//!
//! Window events are folded in as they arrive; the frame update reads the totals and
//! then calls [`InputState::end_frame`].

use glam::Vec2;
use std::collections::HashSet;

/// Pixels of scroll treated as one wheel line for touchpads.
const PIXELS_PER_LINE: f32 = 40.0;

#[derive(Debug, Default)]
pub struct InputState {
    keys_held: HashSet<KeyCode>,
    keys_pressed: HashSet<KeyCode>,

    /// Mouse buttons currently held.
    mouse_held: HashSet<MouseButton>,
    /// Mouse buttons pressed this frame.
    mouse_pressed: HashSet<MouseButton>,

    /// Cursor position in window pixels, once the cursor has entered the window.
    cursor: Option<Vec2>,
    /// Cursor movement accumulated this frame.
    mouse_delta: Vec2,
    /// Wheel lines this frame, positive away from the user.
    scroll_lines: f32,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear per-frame state. Call at the end of each frame's update.
    pub fn end_frame(&mut self) {
        self.keys_pressed.clear();
        self.mouse_pressed.clear();
        self.mouse_delta = Vec2::ZERO;
        self.scroll_lines = 0.0;
    }

    /// Process a keyboard event.
    pub fn process_keyboard(&mut self, key: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if !self.keys_held.contains(&key) {
                    self.keys_pressed.insert(key);
                }
                self.keys_held.insert(key);
            }
            ElementState::Released => {
                self.keys_held.remove(&key);
            }
        }
    }

    /// Process a mouse button event.
    pub fn process_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if !self.mouse_held.contains(&button) {
                    self.mouse_pressed.insert(button);
                }
                self.mouse_held.insert(button);
            }
            ElementState::Released => {
                self.mouse_held.remove(&button);
            }
        }
    }

    /// Process a cursor move. The first position after entering only sets the anchor.
    pub fn process_cursor_position(&mut self, position: (f64, f64)) {
        let position = Vec2::new(position.0 as f32, position.1 as f32);
        if let Some(previous) = self.cursor {
            self.mouse_delta += position - previous;
        }
        self.cursor = Some(position);
    }

    /// Forget the cursor anchor so re-entry does not register as a jump.
    pub fn process_cursor_left(&mut self) {
        self.cursor = None;
    }

    /// Wheel scroll in lines.
    pub fn process_scroll_lines(&mut self, lines: f32) {
        self.scroll_lines += lines;
    }

    /// Touchpad scroll in pixels.
    pub fn process_scroll_pixels(&mut self, pixels: f64) {
        self.scroll_lines += pixels as f32 / PIXELS_PER_LINE;
    }

    // Query methods

    pub fn is_key_held(&self, key: KeyCode) -> bool {
        self.keys_held.contains(&key)
    }

    /// Check if a key was pressed this frame.
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    pub fn is_mouse_held(&self, button: MouseButton) -> bool {
        self.mouse_held.contains(&button)
    }

    /// Check if a mouse button was pressed this frame.
    pub fn is_mouse_pressed(&self, button: MouseButton) -> bool {
        self.mouse_pressed.contains(&button)
    }

    pub fn cursor_position(&self) -> Option<Vec2> {
        self.cursor
    }

    /// Cursor movement this frame, in pixels.
    pub fn mouse_delta(&self) -> Vec2 {
        self.mouse_delta
    }

    pub fn scroll_lines(&self) -> f32 {
        self.scroll_lines
    }
}

// Re-export for convenience
pub use winit::event::{ElementState, MouseButton};
pub use winit::keyboard::KeyCode;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_registers_once_until_released() {
        let mut input = InputState::new();
        input.process_mouse_button(MouseButton::Left, ElementState::Pressed);
        assert!(input.is_mouse_pressed(MouseButton::Left));
        input.end_frame();
        input.process_mouse_button(MouseButton::Left, ElementState::Pressed);
        assert!(!input.is_mouse_pressed(MouseButton::Left));
        assert!(input.is_mouse_held(MouseButton::Left));
        input.process_mouse_button(MouseButton::Left, ElementState::Released);
        assert!(!input.is_mouse_held(MouseButton::Left));
    }

    #[test]
    fn cursor_delta_accumulates_after_first_position() {
        let mut input = InputState::new();
        input.process_cursor_position((100.0, 100.0));
        assert_eq!(input.mouse_delta(), Vec2::ZERO);
        input.process_cursor_position((110.0, 95.0));
        input.process_cursor_position((112.0, 90.0));
        assert_eq!(input.mouse_delta(), Vec2::new(12.0, -10.0));
        input.end_frame();
        assert_eq!(input.mouse_delta(), Vec2::ZERO);
    }

    #[test]
    fn leaving_window_resets_anchor() {
        let mut input = InputState::new();
        input.process_cursor_position((10.0, 10.0));
        input.process_cursor_left();
        input.process_cursor_position((500.0, 500.0));
        assert_eq!(input.mouse_delta(), Vec2::ZERO);
    }

    #[test]
    fn pixel_scroll_converts_to_lines() {
        let mut input = InputState::new();
        input.process_scroll_lines(1.0);
        input.process_scroll_pixels(80.0);
        assert!((input.scroll_lines() - 3.0).abs() < 1e-6);
    }

    #[test]
    fn key_press_is_edge_triggered() {
        let mut input = InputState::new();
        input.process_keyboard(KeyCode::Escape, ElementState::Pressed);
        assert!(input.is_key_pressed(KeyCode::Escape));
        input.end_frame();
        input.process_keyboard(KeyCode::Escape, ElementState::Pressed);
        assert!(!input.is_key_pressed(KeyCode::Escape));
        assert!(input.is_key_held(KeyCode::Escape));
    }
}
