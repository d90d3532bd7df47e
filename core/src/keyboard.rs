use evdev::Key;
use thiserror::Error;

use crate::keycodes::{hid_usage, modifier_bit};
use crate::remap::remap;
use crate::report::KeyboardReport;

const LEFT_SHIFT_BIT: u8 = 1 << 1;
const RIGHT_SHIFT_BIT: u8 = 1 << 5;

/// The fixed intermediate report used to synthesize a Shift-raised frame
/// ahead of a remapped key; see [`ReportPlan::ShiftUpThen`].
const SHIFT_ONLY_REPORT: KeyboardReport = KeyboardReport {
    modifier: LEFT_SHIFT_BIT,
    keycodes: [0; 6],
};

/// What a single keyboard event produced: either one report to write, or a
/// shift-synthesis report that must be written, paused on for ~10ms, and
/// followed by the real report. The session loop that drives the pause
/// between the two writes lives outside this translator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportPlan {
    Single(KeyboardReport),
    ShiftUpThen(KeyboardReport),
}

impl ReportPlan {
    pub fn shift_only_report() -> KeyboardReport {
        SHIFT_ONLY_REPORT
    }
}

/// A non-fatal decoding exception. The session resets the translator and
/// keeps going rather than tearing down.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("keystate {0} out of range")]
    BadKeystate(i32),
}

/// Per-device keyboard state machine: EV_KEY in, [`ReportPlan`] out on every
/// modifier or held-set change.
#[derive(Debug, Default)]
pub struct KeyboardTranslator {
    modifier: u8,
    held: Vec<Key>,
}

impl KeyboardTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear modifier mask and held set. Called after a decode exception.
    pub fn reset(&mut self) {
        self.modifier = 0;
        self.held.clear();
    }

    /// Handle one EV_KEY event. `value` is the raw evdev keystate (0
    /// release, 1 press, 2 autorepeat). `remap_enabled` is read fresh on
    /// every call from the shared toggle so the translator itself never
    /// owns global state.
    pub fn on_key(
        &mut self,
        key: Key,
        value: i32,
        remap_enabled: bool,
    ) -> Result<Option<ReportPlan>, DecodeError> {
        if !(0..=2).contains(&value) {
            return Err(DecodeError::BadKeystate(value));
        }

        if let Some(bit) = modifier_bit(key) {
            if value == 2 {
                return Ok(None);
            }
            let new_modifier = if value == 1 {
                self.modifier | bit
            } else {
                self.modifier & !bit
            };
            if new_modifier == self.modifier {
                return Ok(None);
            }
            self.modifier = new_modifier;
            return Ok(Some(self.build_report_plan(remap_enabled)));
        }

        match value {
            1 => {
                if self.held.contains(&key) {
                    return Ok(None);
                }
                self.held.push(key);
            }
            0 => {
                let before = self.held.len();
                self.held.retain(|&held| held != key);
                if self.held.len() == before {
                    return Ok(None);
                }
            }
            _ => return Ok(None),
        }
        Ok(Some(self.build_report_plan(remap_enabled)))
    }

    fn build_report_plan(&self, remap_enabled: bool) -> ReportPlan {
        let shift_held = self.modifier & (LEFT_SHIFT_BIT | RIGHT_SHIFT_BIT) != 0;

        let mut shift_up = false;
        let mut shift_down = false;
        let mut codes = [0u8; 6];
        let mut filled = 0usize;

        for &key in &self.held {
            let resolved = if remap_enabled {
                let outcome = remap(key, shift_held);
                shift_up |= outcome.shift_up;
                shift_down |= outcome.shift_down;
                outcome.key
            } else {
                key
            };
            let usage = hid_usage(resolved);
            if usage == 0 {
                continue;
            }
            if filled < codes.len() {
                codes[filled] = usage;
                filled += 1;
            }
        }

        let mut modifier = self.modifier;
        if shift_down {
            modifier &= !(LEFT_SHIFT_BIT | RIGHT_SHIFT_BIT);
        } else if shift_up {
            modifier |= LEFT_SHIFT_BIT;
        }

        let report = KeyboardReport {
            modifier,
            keycodes: codes,
        };
        if shift_up {
            ReportPlan::ShiftUpThen(report)
        } else {
            ReportPlan::Single(report)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// S3: a plain letter with no remap rule, press then release.
    #[test]
    fn plain_letter_press_release() {
        let mut t = KeyboardTranslator::new();
        let plan = t.on_key(Key::KEY_A, 1, true).unwrap().unwrap();
        assert_eq!(
            plan,
            ReportPlan::Single(KeyboardReport {
                modifier: 0,
                keycodes: [0x04, 0, 0, 0, 0, 0],
            })
        );
        let plan = t.on_key(Key::KEY_A, 0, true).unwrap().unwrap();
        assert_eq!(plan, ReportPlan::Single(KeyboardReport::default()));
    }

    /// S4: unconditional remap, no shift transient.
    #[test]
    fn leftbrace_remaps_unconditionally() {
        let mut t = KeyboardTranslator::new();
        let plan = t.on_key(Key::KEY_LEFTBRACE, 1, true).unwrap().unwrap();
        assert_eq!(
            plan,
            ReportPlan::Single(KeyboardReport {
                modifier: 0,
                keycodes: [hid_usage(Key::KEY_RIGHTBRACE), 0, 0, 0, 0, 0],
            })
        );
    }

    /// S5: apostrophe with no modifiers held synthesizes shift-up.
    #[test]
    fn apostrophe_synthesizes_shift_up() {
        let mut t = KeyboardTranslator::new();
        let plan = t.on_key(Key::KEY_APOSTROPHE, 1, true).unwrap().unwrap();
        match plan {
            ReportPlan::ShiftUpThen(report) => {
                assert_eq!(report.modifier, LEFT_SHIFT_BIT);
                assert_eq!(report.keycodes[0], hid_usage(Key::KEY_7));
            }
            ReportPlan::Single(_) => panic!("expected shift-up synthesis"),
        }
        assert_eq!(
            ReportPlan::shift_only_report(),
            KeyboardReport {
                modifier: LEFT_SHIFT_BIT,
                keycodes: [0; 6],
            }
        );
    }

    /// S7: with remap disabled, no synthesis and the direct usage code is
    /// sent.
    #[test]
    fn disabled_remap_passes_through() {
        let mut t = KeyboardTranslator::new();
        let plan = t.on_key(Key::KEY_APOSTROPHE, 1, false).unwrap().unwrap();
        assert_eq!(
            plan,
            ReportPlan::Single(KeyboardReport {
                modifier: 0,
                keycodes: [hid_usage(Key::KEY_APOSTROPHE), 0, 0, 0, 0, 0],
            })
        );
    }

    #[test]
    fn autorepeat_produces_no_report() {
        let mut t = KeyboardTranslator::new();
        t.on_key(Key::KEY_A, 1, true).unwrap();
        let plan = t.on_key(Key::KEY_A, 2, true).unwrap();
        assert!(plan.is_none());
    }

    #[test]
    fn redundant_release_is_a_no_op() {
        let mut t = KeyboardTranslator::new();
        let plan = t.on_key(Key::KEY_A, 0, true).unwrap();
        assert!(plan.is_none());
    }

    #[test]
    fn modifier_change_emits_report_with_empty_held_set() {
        let mut t = KeyboardTranslator::new();
        let plan = t.on_key(Key::KEY_LEFTSHIFT, 1, true).unwrap().unwrap();
        assert_eq!(
            plan,
            ReportPlan::Single(KeyboardReport {
                modifier: LEFT_SHIFT_BIT,
                keycodes: [0; 6],
            })
        );
    }

    #[test]
    fn out_of_range_keystate_is_a_decode_error() {
        let mut t = KeyboardTranslator::new();
        assert!(t.on_key(Key::KEY_A, 3, true).is_err());
    }

    #[test]
    fn reset_clears_modifiers_and_held_set() {
        let mut t = KeyboardTranslator::new();
        t.on_key(Key::KEY_LEFTSHIFT, 1, true).unwrap();
        t.on_key(Key::KEY_A, 1, true).unwrap();
        t.reset();
        let plan = t.on_key(Key::KEY_B, 1, true).unwrap().unwrap();
        assert_eq!(
            plan,
            ReportPlan::Single(KeyboardReport {
                modifier: 0,
                keycodes: [hid_usage(Key::KEY_B), 0, 0, 0, 0, 0],
            })
        );
    }

    #[test]
    fn held_set_truncates_to_six_and_skips_zero_usages() {
        let mut t = KeyboardTranslator::new();
        let keys = [
            Key::KEY_A,
            Key::KEY_B,
            Key::KEY_C,
            Key::KEY_D,
            Key::KEY_E,
            Key::KEY_F,
            Key::KEY_G,
        ];
        let mut last = None;
        for key in keys {
            last = t.on_key(key, 1, true).unwrap();
        }
        match last.unwrap() {
            ReportPlan::Single(report) => {
                assert!(report.keycodes.iter().all(|&c| c != 0));
                assert_eq!(report.keycodes.len(), 6);
            }
            ReportPlan::ShiftUpThen(_) => panic!("unexpected shift synthesis"),
        }
    }
}
