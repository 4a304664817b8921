//! Keyboard toggles for the lights and the camera
//!
//! | Key   | Effect                                        |
//! |-------|-----------------------------------------------|
//! | Q     | spot light on if it is off, otherwise off     |
//! | S     | both candle lights on if both are off, otherwise both off |
//! | W     | camera back to its default position           |
//! | Space | camera back to its default position           |

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use winit::keyboard::{Key as LogicalKey, KeyCode, NamedKey, PhysicalKey};

use crate::{
    diorama::{SceneHandles, DEFAULT_CAMERA_POSITION, ON_INTENSITY},
    gfx::scene::Scene,
};

/// Keys the controller reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Q,
    W,
    S,
    Space,
}

impl Key {
    /// Maps a DOM-style key code (`81`, `87`, `83`, `32`).
    pub fn from_key_code(code: u32) -> Option<Self> {
        match code {
            81 => Some(Key::Q),
            87 => Some(Key::W),
            83 => Some(Key::S),
            32 => Some(Key::Space),
            _ => None,
        }
    }

    /// Maps the layout-dependent key, so the key labelled Q is Q on any
    /// layout. Letter case is ignored.
    pub fn from_logical(key: &LogicalKey) -> Option<Self> {
        match key {
            LogicalKey::Named(NamedKey::Space) => Some(Key::Space),
            LogicalKey::Character(text) => match text.to_ascii_lowercase().as_str() {
                "q" => Some(Key::Q),
                "w" => Some(Key::W),
                "s" => Some(Key::S),
                " " => Some(Key::Space),
                _ => None,
            },
            _ => None,
        }
    }

    /// Resolves a winit key event.
    ///
    /// The logical key decides. The physical code is only consulted when
    /// the layout produces no Latin character at all (Cyrillic, Greek, ...),
    /// where it stands in for the US position of the key.
    pub fn from_keys(logical: &LogicalKey, physical: PhysicalKey) -> Option<Self> {
        if let Some(key) = Self::from_logical(logical) {
            return Some(key);
        }
        match (logical, physical) {
            (LogicalKey::Character(text), PhysicalKey::Code(code)) if !text.is_ascii() => {
                Self::from_winit(code)
            }
            _ => None,
        }
    }

    pub fn from_winit(code: KeyCode) -> Option<Self> {
        match code {
            KeyCode::KeyQ => Some(Key::Q),
            KeyCode::KeyW => Some(Key::W),
            KeyCode::KeyS => Some(Key::S),
            KeyCode::Space => Some(Key::Space),
            _ => None,
        }
    }
}

/// On/off state of a switchable light, read from its intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightState {
    Off,
    On,
}

impl LightState {
    /// Exactly zero is off; anything else counts as on.
    pub fn from_intensity(intensity: f32) -> Self {
        if intensity == 0.0 {
            LightState::Off
        } else {
            LightState::On
        }
    }

    pub fn intensity(self) -> f32 {
        match self {
            LightState::Off => 0.0,
            LightState::On => ON_INTENSITY,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            LightState::Off => LightState::On,
            LightState::On => LightState::Off,
        }
    }
}

/// Whether holding a key keeps toggling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyRepeatPolicy {
    /// One toggle per physical press; repeats are ignored until release.
    #[default]
    PerPress,
    /// Every key-down event toggles, auto-repeat included.
    PerEvent,
}

/// What a key press did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    SpotLight(LightState),
    CandleLights(LightState),
    CameraReset,
}

pub struct ToggleController {
    handles: SceneHandles,
    policy: KeyRepeatPolicy,
    held: HashSet<Key>,
}

impl ToggleController {
    pub fn new(handles: SceneHandles, policy: KeyRepeatPolicy) -> Self {
        Self {
            handles,
            policy,
            held: HashSet::new(),
        }
    }

    pub fn handles(&self) -> &SceneHandles {
        &self.handles
    }

    pub fn policy(&self) -> KeyRepeatPolicy {
        self.policy
    }

    /// Handles a key-down. `repeat` marks OS auto-repeat events.
    ///
    /// Returns the transition applied, or `None` when the key is not bound
    /// or the press was filtered by the repeat policy.
    pub fn key_down(
        &mut self,
        key: Option<Key>,
        repeat: bool,
        scene: &mut Scene,
    ) -> Option<Transition> {
        let Some(key) = key else {
            log::trace!("Ignoring unbound key");
            return None;
        };

        let newly_pressed = self.held.insert(key);
        if self.policy == KeyRepeatPolicy::PerPress && (repeat || !newly_pressed) {
            log::trace!("Ignoring repeated {:?}", key);
            return None;
        }

        let transition = match key {
            Key::Q => self.toggle_spot_light(scene),
            Key::S => self.toggle_candle_lights(scene),
            // W and Space both reset the camera
            Key::W | Key::Space => {
                scene.camera_manager.reset_position(DEFAULT_CAMERA_POSITION);
                Transition::CameraReset
            }
        };
        log::debug!("{:?} -> {:?}", key, transition);
        Some(transition)
    }

    pub fn key_up(&mut self, key: Option<Key>) {
        if let Some(key) = key {
            self.held.remove(&key);
        }
    }

    /// Forgets every held key.
    ///
    /// Called when the window loses focus: the matching releases go to
    /// another window and some platforms never report them.
    pub fn release_all(&mut self) {
        if !self.held.is_empty() {
            log::debug!("Releasing {} held key(s)", self.held.len());
            self.held.clear();
        }
    }

    fn toggle_spot_light(&self, scene: &mut Scene) -> Transition {
        let Some(light) = scene.light_mut(self.handles.spot_light) else {
            log::warn!("Spot light handle {:?} is not in the scene", self.handles.spot_light);
            return Transition::SpotLight(LightState::Off);
        };
        let next = LightState::from_intensity(light.intensity).toggled();
        light.intensity = next.intensity();
        Transition::SpotLight(next)
    }

    /// Both on only when both are currently off; otherwise both off.
    fn toggle_candle_lights(&self, scene: &mut Scene) -> Transition {
        let all_off = self.handles.candle_lights.iter().all(|&id| {
            scene
                .light(id)
                .map_or(true, |l| LightState::from_intensity(l.intensity) == LightState::Off)
        });
        let next = if all_off { LightState::On } else { LightState::Off };

        for &id in &self.handles.candle_lights {
            if let Some(light) = scene.light_mut(id) {
                light.intensity = next.intensity();
            }
        }
        Transition::CandleLights(next)
    }
}
