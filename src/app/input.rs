use winit::event::MouseButton;
use winit::keyboard::{KeyCode, PhysicalKey};

/// Cursor travel, in pixels, beyond which a press becomes a drag instead of a click.
const CLICK_SLOP: f32 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    SelectModel(usize),
    ApplyPalette(usize),
    RefitCamera,
    Quit,
}

pub fn map_key(key: PhysicalKey) -> Option<InputAction> {
    match key {
        PhysicalKey::Code(KeyCode::Digit1) => Some(InputAction::SelectModel(0)),
        PhysicalKey::Code(KeyCode::Digit2) => Some(InputAction::SelectModel(1)),
        PhysicalKey::Code(KeyCode::Digit3) => Some(InputAction::SelectModel(2)),
        PhysicalKey::Code(KeyCode::Digit4) => Some(InputAction::SelectModel(3)),
        PhysicalKey::Code(KeyCode::F1) => Some(InputAction::ApplyPalette(0)),
        PhysicalKey::Code(KeyCode::F2) => Some(InputAction::ApplyPalette(1)),
        PhysicalKey::Code(KeyCode::F3) => Some(InputAction::ApplyPalette(2)),
        PhysicalKey::Code(KeyCode::KeyF) => Some(InputAction::RefitCamera),
        PhysicalKey::Code(KeyCode::Escape) => Some(InputAction::Quit),
        _ => None,
    }
}

/// Left-button state for orbit drags and swatch clicks.
#[derive(Default, Debug, Clone, Copy)]
pub struct PointerState {
    cursor: Option<(f32, f32)>,
    pressed_at: Option<(f32, f32)>,
    dragged: bool,
}

impl PointerState {
    /// Track the cursor; returns the drag delta while the left button is held.
    pub fn cursor_moved(&mut self, x: f32, y: f32) -> Option<(f32, f32)> {
        let previous = self.cursor.replace((x, y));
        let (start_x, start_y) = self.pressed_at?;
        if (x - start_x).abs() > CLICK_SLOP || (y - start_y).abs() > CLICK_SLOP {
            self.dragged = true;
        }
        let (px, py) = previous?;
        Some((x - px, y - py))
    }

    pub fn cursor_left(&mut self) {
        self.cursor = None;
    }

    /// Returns the click position when a left press is released without dragging.
    pub fn button(&mut self, button: MouseButton, pressed: bool) -> Option<(f32, f32)> {
        if button != MouseButton::Left {
            return None;
        }
        if pressed {
            self.pressed_at = self.cursor;
            self.dragged = false;
            return None;
        }
        let pressed_at = self.pressed_at.take();
        if self.dragged {
            return None;
        }
        pressed_at.and(self.cursor)
    }
}
