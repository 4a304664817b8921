//! Keyboard controls
//!
//! Mouse orbiting lives with the camera; this module only maps discrete key
//! presses onto the lights and camera named by [`SceneHandles`](crate::diorama::SceneHandles).

pub mod toggle;

pub use toggle::{Key, KeyRepeatPolicy, LightState, ToggleController, Transition};
