//! US-layout scancode to JIS-layout equivalents.
//!
//! Every rule rewrites one evdev key symbol to another and optionally
//! requests a transient Shift synthesis for the report that carries it (see
//! [`crate::keyboard`] for how those transients become extra reports).

use evdev::Key;

/// Outcome of remapping one held key: the key whose usage code should
/// actually go in the report, plus at most one transient-shift request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemapOutcome {
    pub key: Key,
    pub shift_up: bool,
    pub shift_down: bool,
}

impl RemapOutcome {
    fn plain(key: Key) -> Self {
        Self {
            key,
            shift_up: false,
            shift_down: false,
        }
    }

    fn shift_down(key: Key) -> Self {
        Self {
            key,
            shift_up: false,
            shift_down: true,
        }
    }

    fn shift_up(key: Key) -> Self {
        Self {
            key,
            shift_up: true,
            shift_down: false,
        }
    }
}

/// Remap `key` given whether any Shift is currently held. Keys with no rule
/// pass through unchanged.
pub fn remap(key: Key, shift_held: bool) -> RemapOutcome {
    // Unconditional rules win regardless of Shift state.
    match key {
        Key::KEY_LEFTBRACE => return RemapOutcome::plain(Key::KEY_RIGHTBRACE),
        Key::KEY_RIGHTBRACE => return RemapOutcome::plain(Key::KEY_BACKSLASH),
        _ => {}
    }

    if shift_held {
        match key {
            Key::KEY_7 => RemapOutcome::plain(Key::KEY_6),
            Key::KEY_8 => RemapOutcome::plain(Key::KEY_APOSTROPHE),
            Key::KEY_9 => RemapOutcome::plain(Key::KEY_8),
            Key::KEY_0 => RemapOutcome::plain(Key::KEY_9),
            Key::KEY_EQUAL => RemapOutcome::plain(Key::KEY_SEMICOLON),
            Key::KEY_GRAVE => RemapOutcome::plain(Key::KEY_EQUAL),
            Key::KEY_MINUS => RemapOutcome::plain(Key::KEY_RO),
            Key::KEY_BACKSLASH => RemapOutcome::plain(Key::KEY_YEN),
            Key::KEY_APOSTROPHE => RemapOutcome::plain(Key::KEY_2),
            Key::KEY_2 => RemapOutcome::shift_down(Key::KEY_LEFTBRACE),
            Key::KEY_6 => RemapOutcome::shift_down(Key::KEY_EQUAL),
            Key::KEY_SEMICOLON => RemapOutcome::shift_down(Key::KEY_APOSTROPHE),
            other => RemapOutcome::plain(other),
        }
    } else {
        match key {
            Key::KEY_BACKSLASH => RemapOutcome::plain(Key::KEY_RO),
            Key::KEY_APOSTROPHE => RemapOutcome::shift_up(Key::KEY_7),
            Key::KEY_GRAVE => RemapOutcome::shift_up(Key::KEY_LEFTBRACE),
            Key::KEY_EQUAL => RemapOutcome::shift_up(Key::KEY_MINUS),
            other => RemapOutcome::plain(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unconditional_rules_ignore_shift() {
        for shift_held in [false, true] {
            assert_eq!(
                remap(Key::KEY_LEFTBRACE, shift_held),
                RemapOutcome::plain(Key::KEY_RIGHTBRACE)
            );
            assert_eq!(
                remap(Key::KEY_RIGHTBRACE, shift_held),
                RemapOutcome::plain(Key::KEY_BACKSLASH)
            );
        }
    }

    #[test]
    fn shift_set_rules() {
        assert_eq!(remap(Key::KEY_MINUS, true), RemapOutcome::plain(Key::KEY_RO));
        assert_eq!(
            remap(Key::KEY_BACKSLASH, true),
            RemapOutcome::plain(Key::KEY_YEN)
        );
        assert_eq!(
            remap(Key::KEY_2, true),
            RemapOutcome::shift_down(Key::KEY_LEFTBRACE)
        );
        assert_eq!(
            remap(Key::KEY_SEMICOLON, true),
            RemapOutcome::shift_down(Key::KEY_APOSTROPHE)
        );
    }

    /// S5: apostrophe with no Shift held synthesizes a shift-up transient
    /// and types the symbol for 7.
    #[test]
    fn shift_clear_apostrophe_synthesizes_shift_up() {
        let outcome = remap(Key::KEY_APOSTROPHE, false);
        assert_eq!(outcome.key, Key::KEY_7);
        assert!(outcome.shift_up);
        assert!(!outcome.shift_down);
    }

    #[test]
    fn backslash_differs_by_shift_state() {
        assert_eq!(remap(Key::KEY_BACKSLASH, false).key, Key::KEY_RO);
        assert_eq!(remap(Key::KEY_BACKSLASH, true).key, Key::KEY_YEN);
    }

    #[test]
    fn unmapped_key_passes_through() {
        assert_eq!(remap(Key::KEY_A, false), RemapOutcome::plain(Key::KEY_A));
        assert_eq!(remap(Key::KEY_A, true), RemapOutcome::plain(Key::KEY_A));
    }
}
