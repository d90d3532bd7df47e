use evdev::{Key, RelativeAxisType};

use crate::report::MouseReport;

/// Per-device mouse state machine: EV_KEY + EV_REL in, one MouseReport out
/// per SYN_REPORT.
#[derive(Debug, Default)]
pub struct MouseTranslator {
    buttons: u8,
    dx: i16,
    dy: i16,
    dwheel: i16,
}

fn button_bit(key: Key) -> Option<u8> {
    match key {
        Key::BTN_LEFT => Some(1 << 0),
        Key::BTN_RIGHT => Some(1 << 1),
        Key::BTN_MIDDLE => Some(1 << 2),
        Key::BTN_SIDE => Some(1 << 3),
        Key::BTN_EXTRA => Some(1 << 4),
        _ => None,
    }
}

impl MouseTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset all state. Used after a fatal decode exception before the
    /// session tears down, and between Sessions on the same device.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Handle an EV_KEY event. `value` is the raw evdev keystate: 1 press,
    /// 0 release, 2 autorepeat (ignored). Unknown button codes are ignored.
    pub fn on_key(&mut self, key: Key, value: i32) {
        let Some(bit) = button_bit(key) else {
            return;
        };
        match value {
            1 => self.buttons |= bit,
            0 => self.buttons &= !bit,
            _ => {}
        }
    }

    /// Handle an EV_REL event. Overwrites, rather than accumulates, the
    /// matching axis accumulator.
    pub fn on_rel(&mut self, axis: RelativeAxisType, value: i32) {
        let value = value.clamp(i16::MIN as i32, i16::MAX as i32) as i16;
        match axis {
            RelativeAxisType::REL_X => self.dx = value,
            RelativeAxisType::REL_Y => self.dy = value,
            RelativeAxisType::REL_WHEEL => self.dwheel = value,
            _ => {}
        }
    }

    /// Handle SYN_REPORT: serialize current state into a report and reset
    /// the deltas. The button mask persists across frames.
    pub fn on_syn_report(&mut self) -> MouseReport {
        let report = MouseReport {
            buttons: self.buttons,
            x: self.dx,
            y: self.dy,
            wheel: self.dwheel,
        };
        self.dx = 0;
        self.dy = 0;
        self.dwheel = 0;
        report
    }
}
