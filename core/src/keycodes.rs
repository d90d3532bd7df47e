//! Linux evdev key codes to USB HID Keyboard/Keypad usage IDs.
//!
//! Covers the standard US 104-key layout plus the two JIS-only keys (Ro,
//! Yen) that the remap table can produce. Usage IDs for Ro and Yen come
//! from the USB HID Usage Tables "Keyboard International1"/"International3"
//! entries; every other key is the standard boot-keyboard usage.

use evdev::Key;

/// Map an evdev key to its USB HID usage code, or `0` if this key has no
/// usage in the boot keyboard report (dropped from the report).
pub fn hid_usage(key: Key) -> u8 {
    match key {
        Key::KEY_A => 0x04,
        Key::KEY_B => 0x05,
        Key::KEY_C => 0x06,
        Key::KEY_D => 0x07,
        Key::KEY_E => 0x08,
        Key::KEY_F => 0x09,
        Key::KEY_G => 0x0a,
        Key::KEY_H => 0x0b,
        Key::KEY_I => 0x0c,
        Key::KEY_J => 0x0d,
        Key::KEY_K => 0x0e,
        Key::KEY_L => 0x0f,
        Key::KEY_M => 0x10,
        Key::KEY_N => 0x11,
        Key::KEY_O => 0x12,
        Key::KEY_P => 0x13,
        Key::KEY_Q => 0x14,
        Key::KEY_R => 0x15,
        Key::KEY_S => 0x16,
        Key::KEY_T => 0x17,
        Key::KEY_U => 0x18,
        Key::KEY_V => 0x19,
        Key::KEY_W => 0x1a,
        Key::KEY_X => 0x1b,
        Key::KEY_Y => 0x1c,
        Key::KEY_Z => 0x1d,
        Key::KEY_1 => 0x1e,
        Key::KEY_2 => 0x1f,
        Key::KEY_3 => 0x20,
        Key::KEY_4 => 0x21,
        Key::KEY_5 => 0x22,
        Key::KEY_6 => 0x23,
        Key::KEY_7 => 0x24,
        Key::KEY_8 => 0x25,
        Key::KEY_9 => 0x26,
        Key::KEY_0 => 0x27,
        Key::KEY_ENTER => 0x28,
        Key::KEY_ESC => 0x29,
        Key::KEY_BACKSPACE => 0x2a,
        Key::KEY_TAB => 0x2b,
        Key::KEY_SPACE => 0x2c,
        Key::KEY_MINUS => 0x2d,
        Key::KEY_EQUAL => 0x2e,
        Key::KEY_LEFTBRACE => 0x2f,
        Key::KEY_RIGHTBRACE => 0x30,
        Key::KEY_BACKSLASH => 0x31,
        Key::KEY_SEMICOLON => 0x33,
        Key::KEY_APOSTROPHE => 0x34,
        Key::KEY_GRAVE => 0x35,
        Key::KEY_COMMA => 0x36,
        Key::KEY_DOT => 0x37,
        Key::KEY_SLASH => 0x38,
        Key::KEY_CAPSLOCK => 0x39,
        Key::KEY_F1 => 0x3a,
        Key::KEY_F2 => 0x3b,
        Key::KEY_F3 => 0x3c,
        Key::KEY_F4 => 0x3d,
        Key::KEY_F5 => 0x3e,
        Key::KEY_F6 => 0x3f,
        Key::KEY_F7 => 0x40,
        Key::KEY_F8 => 0x41,
        Key::KEY_F9 => 0x42,
        Key::KEY_F10 => 0x43,
        Key::KEY_F11 => 0x44,
        Key::KEY_F12 => 0x45,
        Key::KEY_SYSRQ => 0x46,
        Key::KEY_SCROLLLOCK => 0x47,
        Key::KEY_PAUSE => 0x48,
        Key::KEY_INSERT => 0x49,
        Key::KEY_HOME => 0x4a,
        Key::KEY_PAGEUP => 0x4b,
        Key::KEY_DELETE => 0x4c,
        Key::KEY_END => 0x4d,
        Key::KEY_PAGEDOWN => 0x4e,
        Key::KEY_RIGHT => 0x4f,
        Key::KEY_LEFT => 0x50,
        Key::KEY_DOWN => 0x51,
        Key::KEY_UP => 0x52,
        Key::KEY_RO => 0x87,
        Key::KEY_YEN => 0x89,
        Key::KEY_LEFTCTRL => 0xe0,
        Key::KEY_LEFTSHIFT => 0xe1,
        Key::KEY_LEFTALT => 0xe2,
        Key::KEY_LEFTMETA => 0xe3,
        Key::KEY_RIGHTCTRL => 0xe4,
        Key::KEY_RIGHTSHIFT => 0xe5,
        Key::KEY_RIGHTALT => 0xe6,
        Key::KEY_RIGHTMETA => 0xe7,
        _ => 0,
    }
}

/// The modifier bit this key contributes to the report's modifier byte, if
/// any.
pub fn modifier_bit(key: Key) -> Option<u8> {
    match key {
        Key::KEY_LEFTCTRL => Some(1 << 0),
        Key::KEY_LEFTSHIFT => Some(1 << 1),
        Key::KEY_LEFTALT => Some(1 << 2),
        Key::KEY_LEFTMETA => Some(1 << 3),
        Key::KEY_RIGHTCTRL => Some(1 << 4),
        Key::KEY_RIGHTSHIFT => Some(1 << 5),
        Key::KEY_RIGHTALT => Some(1 << 6),
        Key::KEY_RIGHTMETA => Some(1 << 7),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_are_contiguous_from_a() {
        assert_eq!(hid_usage(Key::KEY_A), 0x04);
        assert_eq!(hid_usage(Key::KEY_Z), 0x1d);
    }

    #[test]
    fn jis_only_keys_have_usages() {
        assert_eq!(hid_usage(Key::KEY_RO), 0x87);
        assert_eq!(hid_usage(Key::KEY_YEN), 0x89);
    }

    #[test]
    fn unmapped_key_is_zero() {
        assert_eq!(hid_usage(Key::KEY_POWER), 0);
    }

    #[test]
    fn modifier_bits_do_not_overlap() {
        let bits = [
            Key::KEY_LEFTCTRL,
            Key::KEY_LEFTSHIFT,
            Key::KEY_LEFTALT,
            Key::KEY_LEFTMETA,
            Key::KEY_RIGHTCTRL,
            Key::KEY_RIGHTSHIFT,
            Key::KEY_RIGHTALT,
            Key::KEY_RIGHTMETA,
        ]
        .map(|k| modifier_bit(k).unwrap());
        let union = bits.iter().fold(0u8, |acc, b| acc | b);
        assert_eq!(union.count_ones() as usize, bits.len());
    }
}
