use crate::action::Action;
use shadebench_common::CameraMovement;
use std::collections::HashSet;
use winit::keyboard::KeyCode;

/// What a bound key does while held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    Move(CameraMovement),
    Exit,
}

/// Ordered key table. Poll emits actions in table order.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    entries: Vec<(KeyCode, Binding)>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            entries: vec![
                (KeyCode::Escape, Binding::Exit),
                (KeyCode::KeyW, Binding::Move(CameraMovement::Forward)),
                (KeyCode::KeyS, Binding::Move(CameraMovement::Backward)),
                (KeyCode::KeyA, Binding::Move(CameraMovement::Left)),
                (KeyCode::KeyD, Binding::Move(CameraMovement::Right)),
                (KeyCode::KeyE, Binding::Move(CameraMovement::Up)),
                (KeyCode::KeyQ, Binding::Move(CameraMovement::Down)),
            ],
        }
    }
}

impl KeyBindings {
    pub fn iter(&self) -> impl Iterator<Item = &(KeyCode, Binding)> {
        self.entries.iter()
    }
}

/// Input gathered between frames.
///
/// Window events only record state here; [`InputState::poll`] turns that
/// state into actions once per frame.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    bindings: KeyBindings,
    keys_held: HashSet<KeyCode>,
    pending_scroll: f32,
    pending_look: (f32, f32),
    mouse_look: bool,
}

impl InputState {
    pub fn new(bindings: KeyBindings) -> Self {
        Self {
            bindings,
            ..Self::default()
        }
    }

    pub fn with_mouse_look(mut self, enabled: bool) -> Self {
        self.mouse_look = enabled;
        self
    }

    pub fn mouse_look(&self) -> bool {
        self.mouse_look
    }

    pub fn handle_key(&mut self, key: KeyCode, pressed: bool) {
        if pressed {
            self.keys_held.insert(key);
        } else {
            self.keys_held.remove(&key);
        }
    }

    pub fn is_held(&self, key: KeyCode) -> bool {
        self.keys_held.contains(&key)
    }

    pub fn handle_scroll(&mut self, dy: f32) {
        self.pending_scroll += dy;
    }

    /// Raw pointer motion in screen space (y grows downward).
    pub fn handle_mouse_motion(&mut self, dx: f32, dy: f32) {
        if !self.mouse_look {
            return;
        }
        self.pending_look.0 += dx;
        self.pending_look.1 -= dy;
    }

    /// Release all held keys, e.g. when the window loses focus.
    pub fn clear(&mut self) {
        self.keys_held.clear();
        self.pending_scroll = 0.0;
        self.pending_look = (0.0, 0.0);
    }

    /// Drain pending input into this frame's actions.
    pub fn poll(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        for (key, binding) in self.bindings.iter() {
            if !self.keys_held.contains(key) {
                continue;
            }
            actions.push(match binding {
                Binding::Move(direction) => Action::Move(*direction),
                Binding::Exit => Action::Exit,
            });
        }

        let (dx, dy) = std::mem::take(&mut self.pending_look);
        if dx != 0.0 || dy != 0.0 {
            actions.push(Action::Look { dx, dy });
        }

        let scroll = std::mem::take(&mut self.pending_scroll);
        if scroll != 0.0 {
            actions.push(Action::Zoom(scroll));
        }

        if !actions.is_empty() {
            tracing::trace!(count = actions.len(), "polled input actions");
        }
        actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn held_keys_repeat_every_poll() {
        let mut input = InputState::default();
        input.handle_key(KeyCode::KeyW, true);
        assert_eq!(input.poll(), vec![Action::Move(CameraMovement::Forward)]);
        assert_eq!(input.poll(), vec![Action::Move(CameraMovement::Forward)]);
        input.handle_key(KeyCode::KeyW, false);
        assert!(input.poll().is_empty());
    }

    #[test]
    fn poll_follows_binding_order() {
        let mut input = InputState::default();
        input.handle_key(KeyCode::KeyQ, true);
        input.handle_key(KeyCode::KeyA, true);
        input.handle_key(KeyCode::Escape, true);
        assert_eq!(
            input.poll(),
            vec![
                Action::Exit,
                Action::Move(CameraMovement::Left),
                Action::Move(CameraMovement::Down),
            ]
        );
    }

    #[test]
    fn unbound_keys_are_ignored() {
        let mut input = InputState::default();
        input.handle_key(KeyCode::KeyZ, true);
        assert!(input.is_held(KeyCode::KeyZ));
        assert!(input.poll().is_empty());
    }

    #[test]
    fn scroll_accumulates_then_drains() {
        let mut input = InputState::default();
        input.handle_scroll(1.0);
        input.handle_scroll(2.0);
        assert_eq!(input.poll(), vec![Action::Zoom(3.0)]);
        assert!(input.poll().is_empty());
    }

    #[test]
    fn mouse_motion_ignored_unless_enabled() {
        let mut input = InputState::default();
        input.handle_mouse_motion(5.0, 5.0);
        assert!(input.poll().is_empty());

        let mut input = InputState::default().with_mouse_look(true);
        input.handle_mouse_motion(4.0, 3.0);
        input.handle_mouse_motion(1.0, 1.0);
        assert_eq!(input.poll(), vec![Action::Look { dx: 5.0, dy: -4.0 }]);
    }

    #[test]
    fn default_table_binds_each_key_once() {
        let bindings = KeyBindings::default();
        let keys: Vec<KeyCode> = bindings.iter().map(|(k, _)| *k).collect();
        let unique: HashSet<KeyCode> = keys.iter().copied().collect();
        assert_eq!(keys.len(), unique.len());
        assert!(
            bindings
                .iter()
                .any(|entry| *entry == (KeyCode::KeyE, Binding::Move(CameraMovement::Up)))
        );
        assert_eq!(bindings.iter().next(), Some(&(KeyCode::Escape, Binding::Exit)));
    }

    #[test]
    fn clear_drops_held_keys() {
        let mut input = InputState::default();
        input.handle_key(KeyCode::KeyD, true);
        input.handle_scroll(1.0);
        input.clear();
        assert!(input.poll().is_empty());
    }
}
