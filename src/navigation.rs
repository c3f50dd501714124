//! Keyboard navigation.
//!
//! Orbit and zoom keys move the active control camera; number keys switch
//! which camera is viewed and/or controlled.
//!
//! # Default bindings
//!
//! | Keys | Effect |
//! |------|--------|
//! | `W` / `S` | `phi` up / down (orbit toward the -Z / +Z pole) |
//! | `D` / `A` | `theta` up / down |
//! | `Q` / `E` | zoom in / out (`rho` down / up) |
//! | `1` `2` `3` | camera 0: view + control, view only, control only |
//! | `4` `5` `6` | camera 1, same pattern |
//! | `7` `8` `9` | camera 2, same pattern |
//!
//! The numeric keypad mirrors the number row. Camera indices count live
//! cameras in ascending id order.

use std::collections::{BTreeSet, HashMap};

use winit::event::ElementState;
use winit::keyboard::KeyCode;

use crate::camera::Camera;
use crate::config::CameraConfig;
use crate::input::Input;
use crate::pose::SphericalPose;
use crate::registry::CameraRegistry;

/// One step of camera movement.
///
/// Declaration order is the order held actions are applied in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NavAction {
    PhiIncrease,
    PhiDecrease,
    ThetaIncrease,
    ThetaDecrease,
    ZoomIn,
    ZoomOut,
}

impl NavAction {
    /// Apply one step to `pose`. Returns whether the pose changed.
    pub fn apply(self, pose: &mut SphericalPose, config: &CameraConfig) -> bool {
        match self {
            NavAction::PhiIncrease => pose.step_phi(config.phi_speed, config.phi_boundary),
            NavAction::PhiDecrease => pose.step_phi(-config.phi_speed, config.phi_boundary),
            NavAction::ThetaIncrease => pose.step_theta(config.theta_speed),
            NavAction::ThetaDecrease => pose.step_theta(-config.theta_speed),
            NavAction::ZoomIn => pose.step_rho(-config.zoom_speed, config.min_rho()),
            NavAction::ZoomOut => pose.step_rho(config.zoom_speed, config.min_rho()),
        }
    }
}

/// Which selection a camera switch changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SwitchTarget {
    /// Both view and control.
    Both,
    View,
    Control,
}

/// Select the `index`-th live camera for some role.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CameraSwitch {
    pub index: usize,
    pub target: SwitchTarget,
}

impl CameraSwitch {
    /// Perform the switch. Indices past the last camera are ignored.
    pub fn apply(self, registry: &mut CameraRegistry) {
        let Some(id) = registry.nth(self.index) else {
            return;
        };
        match self.target {
            SwitchTarget::Both => registry.set_active(id),
            SwitchTarget::View => registry.set_active_view(id),
            SwitchTarget::Control => registry.set_active_control(id),
        }
    }
}

/// What a key does.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Binding {
    Navigate(NavAction),
    Switch(CameraSwitch),
}

/// Key-to-binding map.
#[derive(Clone, Debug)]
pub struct KeyBindings {
    map: HashMap<KeyCode, Binding>,
}

const DIGITS: [KeyCode; 9] = [
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
    KeyCode::Digit4,
    KeyCode::Digit5,
    KeyCode::Digit6,
    KeyCode::Digit7,
    KeyCode::Digit8,
    KeyCode::Digit9,
];

const NUMPAD: [KeyCode; 9] = [
    KeyCode::Numpad1,
    KeyCode::Numpad2,
    KeyCode::Numpad3,
    KeyCode::Numpad4,
    KeyCode::Numpad5,
    KeyCode::Numpad6,
    KeyCode::Numpad7,
    KeyCode::Numpad8,
    KeyCode::Numpad9,
];

impl Default for KeyBindings {
    fn default() -> Self {
        let mut bindings = Self::empty()
            .bind(KeyCode::KeyW, Binding::Navigate(NavAction::PhiIncrease))
            .bind(KeyCode::KeyS, Binding::Navigate(NavAction::PhiDecrease))
            .bind(KeyCode::KeyD, Binding::Navigate(NavAction::ThetaIncrease))
            .bind(KeyCode::KeyA, Binding::Navigate(NavAction::ThetaDecrease))
            .bind(KeyCode::KeyQ, Binding::Navigate(NavAction::ZoomIn))
            .bind(KeyCode::KeyE, Binding::Navigate(NavAction::ZoomOut));

        for (slot, (digit, numpad)) in DIGITS.into_iter().zip(NUMPAD).enumerate() {
            let target = match slot % 3 {
                0 => SwitchTarget::Both,
                1 => SwitchTarget::View,
                _ => SwitchTarget::Control,
            };
            let switch = Binding::Switch(CameraSwitch {
                index: slot / 3,
                target,
            });
            bindings = bindings.bind(digit, switch).bind(numpad, switch);
        }
        bindings
    }
}

impl KeyBindings {
    /// Bindings with no keys mapped.
    pub fn empty() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// Map `key` to `binding`, replacing any previous mapping.
    pub fn bind(mut self, key: KeyCode, binding: Binding) -> Self {
        self.map.insert(key, binding);
        self
    }

    pub fn unbind(mut self, key: KeyCode) -> Self {
        self.map.remove(&key);
        self
    }

    pub fn get(&self, key: KeyCode) -> Option<Binding> {
        self.map.get(&key).copied()
    }

    fn action(&self, key: KeyCode) -> Option<NavAction> {
        match self.get(key)? {
            Binding::Navigate(action) => Some(action),
            Binding::Switch(_) => None,
        }
    }
}

/// Turns key presses into camera movement and camera switches.
///
/// # Example
/// ```ignore
/// // In the event handler:
/// input.handle_event(&event);
///
/// // Once per frame:
/// navigator.update(&input, &mut registry);
/// input.begin_frame();
/// ```
#[derive(Clone, Debug, Default)]
pub struct Navigator {
    bindings: KeyBindings,
    held: BTreeSet<NavAction>,
}

impl Navigator {
    pub fn new(bindings: KeyBindings) -> Self {
        Self {
            bindings,
            held: BTreeSet::new(),
        }
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    /// Movement actions currently held, in application order.
    pub fn held(&self) -> impl Iterator<Item = NavAction> + '_ {
        self.held.iter().copied()
    }

    /// Handle a key press.
    ///
    /// Switch keys are carried out first. Then every held movement action,
    /// including the one just pressed, is applied once to the active control
    /// camera. Returns whether that camera's pose changed.
    pub fn press(&mut self, key: KeyCode, registry: &mut CameraRegistry) -> bool {
        match self.bindings.get(key) {
            Some(Binding::Navigate(action)) => {
                self.held.insert(action);
            }
            Some(Binding::Switch(switch)) => switch.apply(registry),
            None => {}
        }
        registry
            .active_control()
            .is_some_and(|camera| self.apply_held(&camera))
    }

    pub fn release(&mut self, key: KeyCode) {
        if let Some(action) = self.bindings.action(key) {
            self.held.remove(&action);
        }
    }

    /// Apply every held action once to `camera`, atomically.
    pub fn apply_held(&self, camera: &Camera) -> bool {
        if self.held.is_empty() {
            return false;
        }
        camera.modify_pose(|pose, config| {
            for action in &self.held {
                action.apply(pose, config);
            }
        })
    }

    /// Replay this frame's key events from `input` in arrival order.
    pub fn update(&mut self, input: &Input, registry: &mut CameraRegistry) -> bool {
        let mut changed = false;
        for &(key, state) in input.events() {
            match state {
                ElementState::Pressed => changed |= self.press(key, registry),
                ElementState::Released => self.release(key),
            }
        }
        changed
    }
}
