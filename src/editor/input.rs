use glam::Vec2;

use crate::coords::Ray;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
}

/// One pointer event from the external input layer. The screen position
/// drives click-vs-drag disambiguation; the picking ray (computed by the
/// external camera from the same screen position) drives everything in
/// world space.
#[derive(Clone, Copy, Debug)]
pub struct PointerEvent {
    pub screen: Vec2,
    pub ray: Ray,
    pub button: PointerButton,
    pub shift: bool,
}

impl PointerEvent {
    pub fn new(screen: Vec2, ray: Ray) -> Self {
        Self {
            screen,
            ray,
            button: PointerButton::Primary,
            shift: false,
        }
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn with_button(mut self, button: PointerButton) -> Self {
        self.button = button;
        self
    }
}
