//! Mnemonic key mapping for `press_key`: turns a key name like
//! `"Enter"` into the `key`, `code` and `windowsVirtualKeyCode` triple CDP
//! expects, plus the modifier bitmask (Ctrl=2, Shift=8, Alt=1, Meta=4).

use cdp_agent_protocol::input::modifiers;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    Alt,
    Ctrl,
    Meta,
    Shift,
}

pub fn modifier_bitmask(mods: &[Modifier]) -> i64 {
    mods.iter().fold(0, |acc, m| {
            acc | match m {
                Modifier::Alt => modifiers::ALT,
                Modifier::Ctrl => modifiers::CTRL,
                Modifier::Meta => modifiers::META,
                Modifier::Shift => modifiers::SHIFT,
            }
    })
}

/// A mnemonic key's wire representation.
pub struct KeyDefinition {
    pub key: &'static str,
    pub code: &'static str,
    pub windows_virtual_key_code: i64,
    /// The deprecated `keypress`/`Char` event text to accompany this key,
    /// if any. Only `Enter` carries one (DESIGN.md Open Question
    /// resolution) — no known site still depends on it for the rest of
    /// the mnemonic set.
    pub char_text: Option<&'static str>,
}

pub fn lookup(name: &str) -> Option<KeyDefinition> {
    let def = match name {
        "Enter" => KeyDefinition {
            key: "Enter",
            code: "Enter",
            windows_virtual_key_code: 13,
            char_text: Some("\r"),
        },
        "Escape" => KeyDefinition {
            key: "Escape",
            code: "Escape",
            windows_virtual_key_code: 27,
            char_text: None,
        },
        "Tab" => KeyDefinition {
            key: "Tab",
            code: "Tab",
            windows_virtual_key_code: 9,
            char_text: None,
        },
        "Backspace" => KeyDefinition {
            key: "Backspace",
            code: "Backspace",
            windows_virtual_key_code: 8,
            char_text: None,
        },
        "Delete" => KeyDefinition {
            key: "Delete",
            code: "Delete",
            windows_virtual_key_code: 46,
            char_text: None,
        },
        "ArrowUp" => KeyDefinition {
            key: "ArrowUp",
            code: "ArrowUp",
            windows_virtual_key_code: 38,
            char_text: None,
        },
        "ArrowDown" => KeyDefinition {
            key: "ArrowDown",
            code: "ArrowDown",
            windows_virtual_key_code: 40,
            char_text: None,
        },
        "ArrowLeft" => KeyDefinition {
            key: "ArrowLeft",
            code: "ArrowLeft",
            windows_virtual_key_code: 37,
            char_text: None,
        },
        "ArrowRight" => KeyDefinition {
            key: "ArrowRight",
            code: "ArrowRight",
            windows_virtual_key_code: 39,
            char_text: None,
        },
        "Home" => KeyDefinition {
            key: "Home",
            code: "Home",
            windows_virtual_key_code: 36,
            char_text: None,
        },
        "End" => KeyDefinition {
            key: "End",
            code: "End",
            windows_virtual_key_code: 35,
            char_text: None,
        },
        "PageUp" => KeyDefinition {
            key: "PageUp",
            code: "PageUp",
            windows_virtual_key_code: 33,
            char_text: None,
        },
        "PageDown" => KeyDefinition {
            key: "PageDown",
            code: "PageDown",
            windows_virtual_key_code: 34,
            char_text: None,
        },
        _ => return None,
    };
    Some(def)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_key_is_rejected() {
        assert!(lookup("SuperDuperKey").is_none());
    }

    #[test]
    fn enter_carries_deprecated_char_text() {
        let def = lookup("Enter").unwrap();
        assert_eq!(def.char_text, Some("\r"));
    }

    #[test]
    fn modifier_bitmask_combines_flags() {
        assert_eq!(modifier_bitmask(&[Modifier::Ctrl, Modifier::Shift]), 2 | 8);
    }
}

