use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Modifiers: u8 {
        const SHIFT = 1 << 0;
        const CONTROL = 1 << 1;
        const META = 1 << 2;
        const ALT = 1 << 3;
    }
}

impl Modifiers {
    pub fn parse_name(name: &str) -> Option<Modifiers> {
        match name.to_ascii_lowercase().as_str() {
            "shift" => Some(Modifiers::SHIFT),
            "ctrl" | "control" => Some(Modifiers::CONTROL),
            "meta" | "cmd" | "command" => Some(Modifiers::META),
            "alt" | "option" => Some(Modifiers::ALT),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    Shift,
    Control,
    Meta,
    Alt,
    /// Any non-modifier key.
    Other(u32),
}

impl KeyCode {
    /// The modifier flag a modifier key sets while held; empty for other keys.
    pub fn modifier_mask(self) -> Modifiers {
        match self {
            KeyCode::Shift => Modifiers::SHIFT,
            KeyCode::Control => Modifiers::CONTROL,
            KeyCode::Meta => Modifiers::META,
            KeyCode::Alt => Modifiers::ALT,
            KeyCode::Other(_) => Modifiers::empty(),
        }
    }

    pub fn is_modifier(self) -> bool { !matches!(self, KeyCode::Other(_)) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_modifier_names() {
        assert_eq!(Modifiers::parse_name("Alt"), Some(Modifiers::ALT));
        assert_eq!(Modifiers::parse_name("cmd"), Some(Modifiers::META));
        assert_eq!(Modifiers::parse_name("hyper"), None);
    }

    #[test]
    fn only_modifier_keys_have_masks() {
        assert_eq!(KeyCode::Control.modifier_mask(), Modifiers::CONTROL);
        assert!(KeyCode::Other(65).modifier_mask().is_empty());
    }
}
