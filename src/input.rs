//! Input Sources
//!
//! The controller samples movement through this trait so the simulation
//! never knows which physical device is attached. Values mirror an analog
//! stick: two axes in [-1, 1] plus a jump edge.

use macroquad::prelude::{is_key_down, is_key_pressed, KeyCode};

pub trait InputSource {
    /// Current `(lateral, forward)` deflection, each in [-1, 1].
    /// Positive lateral is rightward, positive forward is ahead.
    fn axes(&self) -> (f32, f32);

    /// True only on the frame the jump control went down.
    fn jump_pressed(&self) -> bool;
}

/// Keyboard movement: WASD axes, space to jump, left shift to slow a
/// full forward press down to walking pace (a keyboard has no half-way
/// stick deflection).
pub struct KeyboardInput {
    /// Forward deflection while shift is held; keep below the run
    /// threshold.
    pub walk_deflection: f32,
}

impl KeyboardInput {
    pub fn new() -> Self {
        Self {
            walk_deflection: 0.4,
        }
    }
}

impl Default for KeyboardInput {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSource for KeyboardInput {
    fn axes(&self) -> (f32, f32) {
        let mut lateral = 0.0;
        let mut forward = 0.0;
        if is_key_down(KeyCode::W) {
            forward += 1.0;
        }
        if is_key_down(KeyCode::S) {
            forward -= 1.0;
        }
        if is_key_down(KeyCode::D) {
            lateral += 1.0;
        }
        if is_key_down(KeyCode::A) {
            lateral -= 1.0;
        }
        if is_key_down(KeyCode::LeftShift) && forward > 0.0 {
            forward *= self.walk_deflection;
        }
        (lateral, forward)
    }

    fn jump_pressed(&self) -> bool {
        is_key_pressed(KeyCode::Space)
    }
}
