use std::collections::HashSet;

use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Tracks keyboard state between frames.
///
/// Feed it window events as they arrive; navigation samples it once per frame
/// and then [`Input::begin_frame`] clears the per-frame edges.
#[derive(Debug, Default)]
pub struct Input {
    keys_down: HashSet<KeyCode>,
    events: Vec<(KeyCode, ElementState)>,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call at the start of each frame to reset per-frame state.
    pub fn begin_frame(&mut self) {
        self.events.clear();
    }

    /// Process a window event and update input state.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        if let WindowEvent::KeyboardInput { event, .. } = event {
            if let PhysicalKey::Code(key) = event.physical_key {
                match event.state {
                    ElementState::Pressed => self.press(key),
                    ElementState::Released => self.release(key),
                }
            }
        }
    }

    /// Record a key press. Auto-repeat presses of a held key count as presses
    /// too, so holding an orbit key keeps the camera moving.
    pub fn press(&mut self, key: KeyCode) {
        self.keys_down.insert(key);
        self.events.push((key, ElementState::Pressed));
    }

    pub fn release(&mut self, key: KeyCode) {
        self.keys_down.remove(&key);
        self.events.push((key, ElementState::Released));
    }

    /// Returns true if the key is currently held down.
    pub fn key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    /// Returns true if the key was pressed this frame.
    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.events.contains(&(key, ElementState::Pressed))
    }

    /// Returns true if the key was released this frame.
    pub fn key_released(&self, key: KeyCode) -> bool {
        self.events.contains(&(key, ElementState::Released))
    }

    /// Press and release events this frame, in arrival order.
    pub fn events(&self) -> &[(KeyCode, ElementState)] {
        &self.events
    }

    /// Press events this frame, in arrival order.
    pub fn presses(&self) -> impl Iterator<Item = KeyCode> + '_ {
        self.events
            .iter()
            .filter(|(_, state)| state.is_pressed())
            .map(|&(key, _)| key)
    }

    /// Keys currently held, in no particular order.
    pub fn held(&self) -> impl Iterator<Item = KeyCode> + '_ {
        self.keys_down.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_and_release_edges() {
        let mut input = Input::new();
        input.press(KeyCode::KeyW);
        input.press(KeyCode::KeyW);
        assert!(input.key_down(KeyCode::KeyW));
        assert_eq!(
            input.presses().collect::<Vec<_>>(),
            vec![KeyCode::KeyW, KeyCode::KeyW]
        );

        input.begin_frame();
        assert!(input.key_down(KeyCode::KeyW));
        assert!(!input.key_pressed(KeyCode::KeyW));

        input.release(KeyCode::KeyW);
        assert!(!input.key_down(KeyCode::KeyW));
        assert!(input.key_released(KeyCode::KeyW));
        assert_eq!(input.held().count(), 0);
    }

    #[test]
    fn events_keep_arrival_order() {
        let mut input = Input::new();
        input.press(KeyCode::KeyD);
        input.begin_frame();
        input.release(KeyCode::KeyD);
        input.press(KeyCode::KeyW);
        assert_eq!(
            input.events(),
            &[
                (KeyCode::KeyD, ElementState::Released),
                (KeyCode::KeyW, ElementState::Pressed),
            ]
        );
        assert_eq!(input.presses().collect::<Vec<_>>(), vec![KeyCode::KeyW]);
    }
}
