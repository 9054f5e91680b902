//! Double-press-and-hold of the activation modifier, which overlays the
//! stripes while held.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::sys::hotkey::{KeyCode, Modifiers};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyState {
    #[default]
    Waiting,
    Pressed,
    Released,
    Hold,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub pressed: bool,
    /// Modifiers held after the event was applied.
    pub modifiers: Modifiers,
    pub mouse_button_down: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverlayChange {
    Show,
    Hide,
}

/// The activation modifier: the single modifier of the activation shortcut,
/// otherwise the platform default. Empty when the gesture is disabled.
pub fn resolve_activation_mask(shortcut: Option<Modifiers>, disabled: bool, is_mac: bool) -> Modifiers {
    if disabled {
        return Modifiers::empty();
    }
    match shortcut {
        Some(mods) if mods.bits().count_ones() == 1 => mods,
        _ if is_mac => Modifiers::META,
        _ => Modifiers::ALT,
    }
}

#[derive(Debug, Clone)]
pub struct KeyChordDetector {
    state: KeyState,
    mask: Modifiers,
    delay: Duration,
    deadline: Option<Instant>,
    overlaid: bool,
    suppress_overlay: bool,
}

impl KeyChordDetector {
    pub fn new(mask: Modifiers, delay: Duration) -> Self {
        Self {
            state: KeyState::Waiting,
            mask,
            delay,
            deadline: None,
            overlaid: false,
            suppress_overlay: false,
        }
    }

    /// Track the gesture without ever requesting the overlay.
    pub fn with_overlay_suppressed(mut self, suppressed: bool) -> Self {
        self.suppress_overlay = suppressed;
        self
    }

    pub fn state(&self) -> KeyState { self.state }

    pub fn mask(&self) -> Modifiers { self.mask }

    pub fn on_key(&mut self, event: KeyEvent, now: Instant) -> Option<OverlayChange> {
        // the overlay is only up in Hold, which has no deadline
        self.tick(now);

        if !event.code.is_modifier() {
            return if event.modifiers.is_empty() { self.reset() } else { None };
        }
        if self.mask.is_empty() {
            return self.reset();
        }
        if !self.mask.contains(event.code.modifier_mask()) || event.mouse_button_down {
            return None;
        }

        if event.pressed && event.modifiers != self.mask {
            return self.reset();
        }
        self.process(event.pressed, now)
    }

    /// Expires a pending second press.
    pub fn tick(&mut self, now: Instant) -> Option<OverlayChange> {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                if self.state != KeyState::Hold { self.reset() } else { None }
            }
            _ => None,
        }
    }

    pub fn reset(&mut self) -> Option<OverlayChange> {
        self.state = KeyState::Waiting;
        self.deadline = None;
        if std::mem::take(&mut self.overlaid) {
            Some(OverlayChange::Hide)
        } else {
            None
        }
    }

    fn process(&mut self, pressed: bool, now: Instant) -> Option<OverlayChange> {
        trace!(state = ?self.state, pressed, "activation modifier");
        if pressed {
            match self.state {
                KeyState::Waiting => self.state = KeyState::Pressed,
                KeyState::Released => {
                    self.state = KeyState::Hold;
                    self.deadline = None;
                    if !self.suppress_overlay {
                        self.overlaid = true;
                        return Some(OverlayChange::Show);
                    }
                }
                KeyState::Pressed | KeyState::Hold => {}
            }
            None
        } else if self.state == KeyState::Pressed {
            self.state = KeyState::Released;
            self.deadline = Some(now + self.delay);
            None
        } else {
            self.reset()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alt(pressed: bool) -> KeyEvent {
        KeyEvent {
            code: KeyCode::Alt,
            pressed,
            modifiers: if pressed { Modifiers::ALT } else { Modifiers::empty() },
            mouse_button_down: false,
        }
    }

    fn detector() -> KeyChordDetector { KeyChordDetector::new(Modifiers::ALT, Duration::from_millis(300)) }

    #[test]
    fn double_press_and_hold_shows_overlay() {
        let mut d = detector();
        let t = Instant::now();
        assert_eq!(d.on_key(alt(true), t), None);
        assert_eq!(d.on_key(alt(false), t + Duration::from_millis(50)), None);
        assert_eq!(d.state(), KeyState::Released);
        assert_eq!(d.on_key(alt(true), t + Duration::from_millis(120)), Some(OverlayChange::Show));
        assert_eq!(d.state(), KeyState::Hold);
        assert_eq!(d.tick(t + Duration::from_secs(2)), None);
        assert_eq!(d.on_key(alt(false), t + Duration::from_secs(3)), Some(OverlayChange::Hide));
        assert_eq!(d.state(), KeyState::Waiting);
    }

    #[test]
    fn slow_second_press_starts_over() {
        let mut d = detector();
        let t = Instant::now();
        d.on_key(alt(true), t);
        d.on_key(alt(false), t + Duration::from_millis(10));
        assert_eq!(d.on_key(alt(true), t + Duration::from_millis(500)), None);
        assert_eq!(d.state(), KeyState::Pressed);
    }

    #[test]
    fn other_modifiers_reset() {
        let mut d = detector();
        let t = Instant::now();
        d.on_key(alt(true), t);
        let chord = KeyEvent { modifiers: Modifiers::ALT | Modifiers::SHIFT, ..alt(true) };
        d.on_key(alt(false), t);
        assert_eq!(d.on_key(chord, t), None);
        assert_eq!(d.state(), KeyState::Waiting);

        d.on_key(alt(true), t);
        let typed = KeyEvent { code: KeyCode::Other(65), pressed: true, modifiers: Modifiers::empty(), mouse_button_down: false };
        d.on_key(typed, t);
        assert_eq!(d.state(), KeyState::Waiting);
    }

    #[test]
    fn suppressed_overlay_still_tracks_hold() {
        let mut d = detector().with_overlay_suppressed(true);
        let t = Instant::now();
        d.on_key(alt(true), t);
        d.on_key(alt(false), t);
        assert_eq!(d.on_key(alt(true), t), None);
        assert_eq!(d.state(), KeyState::Hold);
    }

    #[test]
    fn mask_resolution() {
        assert_eq!(resolve_activation_mask(Some(Modifiers::CONTROL), false, false), Modifiers::CONTROL);
        assert_eq!(
            resolve_activation_mask(Some(Modifiers::CONTROL | Modifiers::SHIFT), false, true),
            Modifiers::META
        );
        assert_eq!(resolve_activation_mask(None, false, false), Modifiers::ALT);
        assert!(resolve_activation_mask(None, true, false).is_empty());
    }
}
