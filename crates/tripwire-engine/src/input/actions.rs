//! Named input actions layered over raw key events.
//!
//! Gameplay code asks "is `ui_accept` pressed?" instead of matching key codes.
//! The [`ActionMap`] binds names to key codes; [`ActionState`] folds the frame's
//! [`InputEvent`]s into held / just-pressed state.

use std::collections::{HashMap, HashSet};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::input::queue::InputEvent;

pub const UI_LEFT: &str = "ui_left";
pub const UI_RIGHT: &str = "ui_right";
pub const UI_UP: &str = "ui_up";
pub const UI_DOWN: &str = "ui_down";
pub const UI_ACCEPT: &str = "ui_accept";

/// Browser `keyCode` values for the default bindings.
pub mod keys {
    pub const ENTER: u32 = 13;
    pub const SPACE: u32 = 32;
    pub const LEFT: u32 = 37;
    pub const UP: u32 = 38;
    pub const RIGHT: u32 = 39;
    pub const DOWN: u32 = 40;
}

/// Action name → bound key codes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionMap {
    bindings: HashMap<String, Vec<u32>>,
}

impl ActionMap {
    /// A map with no bindings at all.
    pub fn empty() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// Arrow keys for the four `ui_*` directions, Enter and Space for `ui_accept`.
    pub fn ui_defaults() -> Self {
        let mut map = Self::empty();
        map.bind(UI_LEFT, keys::LEFT);
        map.bind(UI_RIGHT, keys::RIGHT);
        map.bind(UI_UP, keys::UP);
        map.bind(UI_DOWN, keys::DOWN);
        map.bind(UI_ACCEPT, keys::ENTER);
        map.bind(UI_ACCEPT, keys::SPACE);
        map
    }

    /// Add `key` to the keys triggering `action`. Binding the same key twice is a no-op.
    pub fn bind(&mut self, action: &str, key: u32) {
        let keys = self.bindings.entry(action.to_string()).or_default();
        if !keys.contains(&key) {
            keys.push(key);
        }
    }

    /// Keys bound to `action` (empty if unknown).
    pub fn keys(&self, action: &str) -> &[u32] {
        self.bindings.get(action).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Actions that `key` triggers.
    pub fn actions_for_key(&self, key: u32) -> impl Iterator<Item = &str> {
        self.bindings
            .iter()
            .filter(move |(_, keys)| keys.contains(&key))
            .map(|(action, _)| action.as_str())
    }
}

impl Default for ActionMap {
    fn default() -> Self {
        Self::ui_defaults()
    }
}

/// Held and just-pressed actions, fed from raw input events.
///
/// "Just pressed" lasts until [`ActionState::end_tick`], so it is seen by exactly
/// one fixed update even when a frame runs several.
#[derive(Debug, Clone, Default)]
pub struct ActionState {
    map: ActionMap,
    held_keys: HashSet<u32>,
    just_pressed: HashSet<String>,
}

impl ActionState {
    pub fn new(map: ActionMap) -> Self {
        Self {
            map,
            held_keys: HashSet::new(),
            just_pressed: HashSet::new(),
        }
    }

    pub fn map(&self) -> &ActionMap {
        &self.map
    }

    /// Replace the bindings. Held keys are kept.
    pub fn set_map(&mut self, map: ActionMap) {
        self.map = map;
    }

    /// Fold a frame's events into the state. Non-key events are ignored.
    pub fn ingest<'a>(&mut self, events: impl IntoIterator<Item = &'a InputEvent>) {
        for event in events {
            match *event {
                InputEvent::KeyDown { key_code } => self.press(key_code),
                InputEvent::KeyUp { key_code } => {
                    self.held_keys.remove(&key_code);
                }
                _ => {}
            }
        }
    }

    fn press(&mut self, key: u32) {
        // Key repeat arrives as repeated KeyDown without KeyUp.
        if self.held_keys.contains(&key) {
            return;
        }
        let newly_active: Vec<String> = self
            .map
            .actions_for_key(key)
            .filter(|action| !self.is_action_pressed(action))
            .map(str::to_string)
            .collect();
        self.held_keys.insert(key);
        self.just_pressed.extend(newly_active);
    }

    /// Forget edge-triggered state. Call after every fixed update.
    pub fn end_tick(&mut self) {
        self.just_pressed.clear();
    }

    /// Drop all held keys, e.g. when the page loses focus.
    pub fn release_all(&mut self) {
        self.held_keys.clear();
        self.just_pressed.clear();
    }

    pub fn is_action_pressed(&self, action: &str) -> bool {
        self.map
            .keys(action)
            .iter()
            .any(|key| self.held_keys.contains(key))
    }

    pub fn is_action_just_pressed(&self, action: &str) -> bool {
        self.just_pressed.contains(action)
    }

    /// 1.0 while the action is held, 0.0 otherwise.
    pub fn action_strength(&self, action: &str) -> f32 {
        if self.is_action_pressed(action) {
            1.0
        } else {
            0.0
        }
    }

    /// 2D input vector from four directional actions, clamped to unit length.
    pub fn get_vector(&self, negative_x: &str, positive_x: &str, negative_y: &str, positive_y: &str) -> Vec2 {
        Vec2::new(
            self.action_strength(positive_x) - self.action_strength(negative_x),
            self.action_strength(positive_y) - self.action_strength(negative_y),
        )
        .clamp_length_max(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with(events: &[InputEvent]) -> ActionState {
        let mut state = ActionState::new(ActionMap::ui_defaults());
        state.ingest(events);
        state
    }

    fn ui_vector(state: &ActionState) -> Vec2 {
        state.get_vector(UI_LEFT, UI_RIGHT, UI_UP, UI_DOWN)
    }

    #[test]
    fn full_right_is_unit_x() {
        let state = state_with(&[InputEvent::KeyDown { key_code: keys::RIGHT }]);
        assert_eq!(ui_vector(&state), Vec2::X);
    }

    #[test]
    fn diagonal_is_clamped_to_unit_length() {
        let state = state_with(&[
            InputEvent::KeyDown { key_code: keys::RIGHT },
            InputEvent::KeyDown { key_code: keys::DOWN },
        ]);
        let v = ui_vector(&state);
        assert!((v.length() - 1.0).abs() < 1e-5, "{:?}", v);
        assert!(v.x > 0.0 && v.y > 0.0);
    }

    #[test]
    fn opposite_directions_cancel() {
        let state = state_with(&[
            InputEvent::KeyDown { key_code: keys::LEFT },
            InputEvent::KeyDown { key_code: keys::RIGHT },
        ]);
        assert_eq!(ui_vector(&state), Vec2::ZERO);
    }

    #[test]
    fn key_up_releases_action() {
        let state = state_with(&[
            InputEvent::KeyDown { key_code: keys::UP },
            InputEvent::KeyUp { key_code: keys::UP },
        ]);
        assert!(!state.is_action_pressed(UI_UP));
        assert_eq!(ui_vector(&state), Vec2::ZERO);
    }

    #[test]
    fn just_pressed_lasts_one_tick() {
        let mut state = state_with(&[InputEvent::KeyDown { key_code: keys::SPACE }]);
        assert!(state.is_action_just_pressed(UI_ACCEPT));
        state.end_tick();
        assert!(!state.is_action_just_pressed(UI_ACCEPT));
        assert!(state.is_action_pressed(UI_ACCEPT));
    }

    #[test]
    fn key_repeat_and_second_binding_do_not_retrigger() {
        let mut state = state_with(&[InputEvent::KeyDown { key_code: keys::SPACE }]);
        state.end_tick();
        state.ingest(&[
            InputEvent::KeyDown { key_code: keys::SPACE },
            InputEvent::KeyDown { key_code: keys::ENTER },
        ]);
        assert!(!state.is_action_just_pressed(UI_ACCEPT));
    }

    #[test]
    fn unbound_keys_and_pointer_events_are_ignored() {
        let state = state_with(&[
            InputEvent::KeyDown { key_code: 999 },
            InputEvent::PointerDown { x: 1.0, y: 2.0 },
        ]);
        assert_eq!(ui_vector(&state), Vec2::ZERO);
        assert!(!state.is_action_just_pressed(UI_ACCEPT));
    }

    #[test]
    fn custom_bindings_from_json() {
        let map: ActionMap = serde_json::from_str(r#"{ "ui_accept": [70] }"#).unwrap();
        assert_eq!(map.keys(UI_ACCEPT), &[70]);
        assert!(map.keys(UI_LEFT).is_empty());

        let state = {
            let mut s = ActionState::new(map);
            s.ingest(&[InputEvent::KeyDown { key_code: 70 }]);
            s
        };
        assert!(state.is_action_just_pressed(UI_ACCEPT));
    }
}
