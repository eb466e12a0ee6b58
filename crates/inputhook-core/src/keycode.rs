//! Unified key code space and the per-platform normalizers.
//!
//! Windows adapters feed virtual-key codes, macOS adapters feed the Unicode
//! scalars of the characters a key produced. Both end up in one code space
//! where letters are lowercase ASCII, printable ASCII keeps its value and
//! named keys sit above 255. `0` means "no unified key" and must be
//! discarded by consumers.

use serde::{Deserialize, Serialize};

/// A key in the unified code space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyCode(i32);

impl KeyCode {
    pub const NONE: KeyCode = KeyCode(0);
    pub const BACKSPACE: KeyCode = KeyCode(8);
    pub const TAB: KeyCode = KeyCode(9);
    pub const CLEAR: KeyCode = KeyCode(12);
    pub const RETURN: KeyCode = KeyCode(13);
    pub const PAUSE: KeyCode = KeyCode(19);
    pub const ESCAPE: KeyCode = KeyCode(27);
    pub const SPACE: KeyCode = KeyCode(32);
    pub const ASTERISK: KeyCode = KeyCode(42);
    pub const PLUS: KeyCode = KeyCode(43);
    pub const COMMA: KeyCode = KeyCode(44);
    pub const MINUS: KeyCode = KeyCode(45);
    pub const PERIOD: KeyCode = KeyCode(46);
    pub const SLASH: KeyCode = KeyCode(47);
    pub const ALPHA0: KeyCode = KeyCode(48);
    pub const ALPHA9: KeyCode = KeyCode(57);
    pub const A: KeyCode = KeyCode(97);
    pub const Z: KeyCode = KeyCode(122);
    pub const DELETE: KeyCode = KeyCode(127);
    pub const KEYPAD0: KeyCode = KeyCode(256);
    pub const KEYPAD9: KeyCode = KeyCode(265);
    pub const UP_ARROW: KeyCode = KeyCode(273);
    pub const DOWN_ARROW: KeyCode = KeyCode(274);
    pub const RIGHT_ARROW: KeyCode = KeyCode(275);
    pub const LEFT_ARROW: KeyCode = KeyCode(276);
    pub const INSERT: KeyCode = KeyCode(277);
    pub const HOME: KeyCode = KeyCode(278);
    pub const END: KeyCode = KeyCode(279);
    pub const PAGE_UP: KeyCode = KeyCode(280);
    pub const PAGE_DOWN: KeyCode = KeyCode(281);
    pub const F1: KeyCode = KeyCode(282);
    pub const F12: KeyCode = KeyCode(293);
    pub const F15: KeyCode = KeyCode(296);
    pub const NUMLOCK: KeyCode = KeyCode(300);
    pub const CAPS_LOCK: KeyCode = KeyCode(301);
    pub const SCROLL_LOCK: KeyCode = KeyCode(302);
    pub const RIGHT_SHIFT: KeyCode = KeyCode(303);
    pub const LEFT_SHIFT: KeyCode = KeyCode(304);
    pub const RIGHT_CONTROL: KeyCode = KeyCode(305);
    pub const LEFT_CONTROL: KeyCode = KeyCode(306);
    pub const RIGHT_ALT: KeyCode = KeyCode(307);
    pub const LEFT_ALT: KeyCode = KeyCode(308);
    pub const LEFT_COMMAND: KeyCode = KeyCode(310);
    pub const LEFT_WINDOWS: KeyCode = KeyCode(311);
    pub const RIGHT_WINDOWS: KeyCode = KeyCode(312);
    pub const HELP: KeyCode = KeyCode(315);
    pub const PRINT: KeyCode = KeyCode(316);
    pub const MENU: KeyCode = KeyCode(319);

    pub const fn from_raw(raw: i32) -> Self {
        KeyCode(raw)
    }

    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Human readable name, `None` for codes without one.
    pub fn name(self) -> Option<String> {
        let code = self.0;
        let name = match code {
            8 => "Backspace",
            9 => "Tab",
            12 => "Clear",
            13 => "Return",
            19 => "Pause",
            27 => "Escape",
            32 => "Space",
            127 => "Delete",
            273 => "UpArrow",
            274 => "DownArrow",
            275 => "RightArrow",
            276 => "LeftArrow",
            277 => "Insert",
            278 => "Home",
            279 => "End",
            280 => "PageUp",
            281 => "PageDown",
            300 => "Numlock",
            301 => "CapsLock",
            302 => "ScrollLock",
            303 => "RightShift",
            304 => "LeftShift",
            305 => "RightControl",
            306 => "LeftControl",
            307 => "RightAlt",
            308 => "LeftAlt",
            310 => "LeftCommand",
            311 => "LeftWindows",
            312 => "RightWindows",
            315 => "Help",
            316 => "Print",
            319 => "Menu",
            97..=122 => return char::from_u32(code as u32 - 32).map(|c| c.to_string()),
            48..=57 => return Some(format!("Alpha{}", code - 48)),
            256..=265 => return Some(format!("Keypad{}", code - 256)),
            282..=296 => return Some(format!("F{}", code - 281)),
            33..=126 => return char::from_u32(code as u32).map(|c| c.to_string()),
            _ => return None,
        };
        Some(name.to_string())
    }
}

impl std::fmt::Display for KeyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.name() {
            Some(name) => f.write_str(&name),
            None => write!(f, "Unknown({})", self.0),
        }
    }
}

/// Offset from a lowercase to an uppercase ASCII letter.
const CASE_OFFSET: i32 = 32;

// Windows virtual-key codes the normalizer cares about.
const VK_BACK: u32 = 0x08;
const VK_TAB: u32 = 0x09;
const VK_CLEAR: u32 = 0x0C;
const VK_RETURN: u32 = 0x0D;
const VK_SHIFT: u32 = 0x10;
const VK_CONTROL: u32 = 0x11;
const VK_MENU: u32 = 0x12;
const VK_PAUSE: u32 = 0x13;
const VK_CAPITAL: u32 = 0x14;
const VK_ESCAPE: u32 = 0x1B;
const VK_SPACE: u32 = 0x20;
const VK_NUMPAD0: u32 = 0x60;
const VK_NUMPAD9: u32 = 0x69;
const VK_F1: u32 = 0x70;
const VK_F15: u32 = 0x7E;

/// Normalize a Windows virtual-key code.
///
/// Generic VK_SHIFT/VK_CONTROL/VK_MENU map to the *right* variants; the
/// low-level hook reports the sided codes for real keystrokes, so the generic
/// ones only show up for synthesized input.
pub fn normalize_windows_vk(vk: u32) -> KeyCode {
    let vk_i = vk as i32;
    let code = match vk {
        0x41..=0x5A => vk_i + CASE_OFFSET,
        0x30..=0x39 => vk_i,
        VK_NUMPAD0..=VK_NUMPAD9 => vk_i - VK_NUMPAD0 as i32 + KeyCode::KEYPAD0.raw(),
        VK_F1..=VK_F15 => vk_i - VK_F1 as i32 + KeyCode::F1.raw(),
        // F16..F24 and the reserved block after them
        0x7F..=0x8F => 0,
        VK_BACK | VK_TAB | VK_CLEAR | VK_RETURN | VK_PAUSE | VK_ESCAPE | VK_SPACE => vk_i,
        VK_SHIFT => 303,
        VK_CONTROL => 305,
        VK_MENU => 307,
        VK_CAPITAL => 301,
        0x21 => 280, // VK_PRIOR
        0x22 => 281, // VK_NEXT
        0x23 => 279, // VK_END
        0x24 => 278, // VK_HOME
        0x25 => 276, // VK_LEFT
        0x26 => 273, // VK_UP
        0x27 => 275, // VK_RIGHT
        0x28 => 274, // VK_DOWN
        0x29 => 0,   // VK_SELECT
        0x2A => 316, // VK_PRINT
        0x2B => 0,   // VK_EXECUTE
        0x2C => 316, // VK_SNAPSHOT
        0x2D => 277, // VK_INSERT
        0x2E => 127, // VK_DELETE
        0x2F => 315, // VK_HELP
        0x5B => 311, // VK_LWIN
        0x5C => 312, // VK_RWIN
        0x5D => 319, // VK_APPS
        0x5F => 0,   // VK_SLEEP
        0x6A => 42,  // VK_MULTIPLY
        0x6B => 43,  // VK_ADD
        0x6C => 44,  // VK_SEPARATOR
        0x6D => 45,  // VK_SUBTRACT
        0x6E => 46,  // VK_DECIMAL
        0x6F => 47,  // VK_DIVIDE
        0x90 => 300, // VK_NUMLOCK
        0x91 => 302, // VK_SCROLL
        0xA0 => 304, // VK_LSHIFT
        0xA1 => 303, // VK_RSHIFT
        0xA2 => 306, // VK_LCONTROL
        0xA3 => 305, // VK_RCONTROL
        0xA4 => 308, // VK_LMENU
        0xA5 => 307, // VK_RMENU
        // OEM punctuation on a US layout
        0xBA => ';' as i32,
        0xBB => '=' as i32,
        0xBC => ',' as i32,
        0xBD => '-' as i32,
        0xBE => '.' as i32,
        0xBF => '/' as i32,
        0xC0 => '`' as i32,
        0xDB => '[' as i32,
        0xDC => '\\' as i32,
        0xDD => ']' as i32,
        0xDE => '\'' as i32,
        _ => 0,
    };
    KeyCode(code)
}

// Function-key characters from the Unicode private use area (NSEvent.h).
const MAC_UP_ARROW: u32 = 0xF700;
const MAC_DOWN_ARROW: u32 = 0xF701;
const MAC_LEFT_ARROW: u32 = 0xF702;
const MAC_RIGHT_ARROW: u32 = 0xF703;
const MAC_F1: u32 = 0xF704;
const MAC_F12: u32 = 0xF70F;
const MAC_INSERT: u32 = 0xF727;
const MAC_DELETE: u32 = 0xF728;
const MAC_HOME: u32 = 0xF729;
const MAC_END: u32 = 0xF72B;
const MAC_PAGE_UP: u32 = 0xF72C;
const MAC_PAGE_DOWN: u32 = 0xF72D;
const MAC_HELP: u32 = 0xF746;

/// Normalize one Unicode scalar produced by a macOS key event.
///
/// Note the arrow block: U+F702 is *left* and maps to 276, U+F703 is
/// *right* and maps to 275.
pub fn normalize_mac_char(scalar: u32) -> KeyCode {
    let code = match scalar {
        0x41..=0x5A => scalar as i32 + CASE_OFFSET,
        MAC_UP_ARROW => 273,
        MAC_DOWN_ARROW => 274,
        MAC_LEFT_ARROW => 276,
        MAC_RIGHT_ARROW => 275,
        MAC_PAGE_UP => 280,
        MAC_PAGE_DOWN => 281,
        MAC_F1..=MAC_F12 => (scalar - MAC_F1) as i32 + KeyCode::F1.raw(),
        MAC_HOME => 278,
        MAC_END => 279,
        MAC_INSERT => 277,
        MAC_DELETE => 127,
        MAC_HELP => 315,
        0x01..=0x7F => scalar as i32,
        _ => 0,
    };
    KeyCode(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_windows_letters_lowercase() {
        assert_eq!(normalize_windows_vk(65), KeyCode::A);
        assert_eq!(normalize_windows_vk(90), KeyCode::Z);
        assert_eq!(normalize_windows_vk(0x4D).raw(), 'm' as i32);
    }

    #[test]
    fn test_mac_case_collapses() {
        for (upper, lower) in ('A'..='Z').zip('a'..='z') {
            assert_eq!(
                normalize_mac_char(upper as u32),
                normalize_mac_char(lower as u32),
                "{upper} vs {lower}"
            );
        }
        // A Windows VK code is already case-free; it lands on the same value.
        assert_eq!(normalize_windows_vk('Q' as u32), normalize_mac_char('q' as u32));
    }

    #[test]
    fn test_arrows_match_across_platforms() {
        assert_eq!(normalize_windows_vk(0x25), KeyCode::LEFT_ARROW);
        assert_eq!(normalize_windows_vk(0x26), KeyCode::UP_ARROW);
        assert_eq!(normalize_windows_vk(0x27), KeyCode::RIGHT_ARROW);
        assert_eq!(normalize_windows_vk(0x28), KeyCode::DOWN_ARROW);

        assert_eq!(normalize_mac_char(0xF700), KeyCode::UP_ARROW);
        assert_eq!(normalize_mac_char(0xF701), KeyCode::DOWN_ARROW);
        assert_eq!(normalize_mac_char(0xF702).raw(), 276);
        assert_eq!(normalize_mac_char(0xF703).raw(), 275);
    }

    #[test]
    fn test_function_keys() {
        assert_eq!(normalize_windows_vk(0x70), KeyCode::F1);
        assert_eq!(normalize_windows_vk(0x7B), KeyCode::F12);
        assert_eq!(normalize_windows_vk(0x7E), KeyCode::F15);
        // F16 and up have no unified key.
        assert_eq!(normalize_windows_vk(0x7F), KeyCode::NONE);
        assert_eq!(normalize_windows_vk(0x87), KeyCode::NONE);

        assert_eq!(normalize_mac_char(0xF704), KeyCode::F1);
        assert_eq!(normalize_mac_char(0xF70F), KeyCode::F12);
    }

    #[test]
    fn test_windows_fixed_table() {
        assert_eq!(normalize_windows_vk(0x60), KeyCode::KEYPAD0);
        assert_eq!(normalize_windows_vk(0x69), KeyCode::KEYPAD9);
        assert_eq!(normalize_windows_vk(0x6A), KeyCode::ASTERISK);
        assert_eq!(normalize_windows_vk(0x6B), KeyCode::PLUS);
        assert_eq!(normalize_windows_vk(0x6C), KeyCode::COMMA);
        assert_eq!(normalize_windows_vk(0x6D), KeyCode::MINUS);
        assert_eq!(normalize_windows_vk(0x6E), KeyCode::PERIOD);
        assert_eq!(normalize_windows_vk(0x6F), KeyCode::SLASH);
        assert_eq!(normalize_windows_vk(0x24), KeyCode::HOME);
        assert_eq!(normalize_windows_vk(0x23), KeyCode::END);
        assert_eq!(normalize_windows_vk(0x21), KeyCode::PAGE_UP);
        assert_eq!(normalize_windows_vk(0x22), KeyCode::PAGE_DOWN);
        assert_eq!(normalize_windows_vk(0x2D), KeyCode::INSERT);
        assert_eq!(normalize_windows_vk(0x2E), KeyCode::DELETE);
        assert_eq!(normalize_windows_vk(0x14), KeyCode::CAPS_LOCK);
        assert_eq!(normalize_windows_vk(0x90), KeyCode::NUMLOCK);
        assert_eq!(normalize_windows_vk(0x91), KeyCode::SCROLL_LOCK);
        assert_eq!(normalize_windows_vk(0x5B), KeyCode::LEFT_WINDOWS);
        assert_eq!(normalize_windows_vk(0x5C), KeyCode::RIGHT_WINDOWS);
        assert_eq!(normalize_windows_vk(0xA0), KeyCode::LEFT_SHIFT);
        assert_eq!(normalize_windows_vk(0xA1), KeyCode::RIGHT_SHIFT);
        assert_eq!(normalize_windows_vk(0x10), KeyCode::RIGHT_SHIFT);
        assert_eq!(normalize_windows_vk(0xA2), KeyCode::LEFT_CONTROL);
        assert_eq!(normalize_windows_vk(0xA4), KeyCode::LEFT_ALT);
        assert_eq!(normalize_windows_vk(0x2C), KeyCode::PRINT);
        assert_eq!(normalize_windows_vk(0x2A), KeyCode::PRINT);
    }

    #[test]
    fn test_windows_passthrough_and_unmapped() {
        assert_eq!(normalize_windows_vk(0x0D), KeyCode::RETURN);
        assert_eq!(normalize_windows_vk(0x20), KeyCode::SPACE);
        assert_eq!(normalize_windows_vk(0x31).raw(), '1' as i32);
        assert_eq!(normalize_windows_vk(0xBA).raw(), ';' as i32);
        assert_eq!(normalize_windows_vk(0x29), KeyCode::NONE);
        assert_eq!(normalize_windows_vk(0x5F), KeyCode::NONE);
        assert_eq!(normalize_windows_vk(0xFF), KeyCode::NONE);
        assert_eq!(normalize_windows_vk(0x07), KeyCode::NONE);
    }

    #[test]
    fn test_mac_navigation_and_unmapped() {
        assert_eq!(normalize_mac_char(0xF72C), KeyCode::PAGE_UP);
        assert_eq!(normalize_mac_char(0xF72D), KeyCode::PAGE_DOWN);
        assert_eq!(normalize_mac_char(0xF729), KeyCode::HOME);
        assert_eq!(normalize_mac_char(0xF72B), KeyCode::END);
        assert_eq!(normalize_mac_char('\r' as u32), KeyCode::RETURN);
        assert_eq!(normalize_mac_char('5' as u32).raw(), '5' as i32);
        assert_eq!(normalize_mac_char(0xE9), KeyCode::NONE);
        assert_eq!(normalize_mac_char(0), KeyCode::NONE);
    }

    #[test]
    fn test_names() {
        assert_eq!(KeyCode::A.to_string(), "A");
        assert_eq!(KeyCode::from_raw(50).to_string(), "Alpha2");
        assert_eq!(KeyCode::from_raw(258).to_string(), "Keypad2");
        assert_eq!(KeyCode::F12.to_string(), "F12");
        assert_eq!(KeyCode::LEFT_SHIFT.to_string(), "LeftShift");
        assert_eq!(KeyCode::from_raw(59).to_string(), ";");
        assert_eq!(KeyCode::from_raw(9999).to_string(), "Unknown(9999)");
    }
}
