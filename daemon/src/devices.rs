use std::path::PathBuf;

use regex::Regex;

/// Which endpoint pool a matched device belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    Keyboard,
    Mouse,
}

/// Classify a device by its kernel-reported name. A name matching both
/// patterns is implementation-defined to prefer the keyboard class (such
/// devices are malformed per the match-pattern contract); a name matching
/// neither is ignored.
pub fn classify(name: &str, keyboard_pattern: &Regex, mouse_pattern: &Regex) -> Option<DeviceClass> {
    if keyboard_pattern.is_match(name) {
        Some(DeviceClass::Keyboard)
    } else if mouse_pattern.is_match(name) {
        Some(DeviceClass::Mouse)
    } else {
        None
    }
}

/// Enumerate the kernel's input devices and bucket their paths by class.
/// Per-device open errors (permission races, unplug races) are logged and
/// skipped rather than failing the whole scan.
pub fn enumerate_matching(
    keyboard_pattern: &Regex,
    mouse_pattern: &Regex,
) -> (Vec<PathBuf>, Vec<PathBuf>) {
    let mut keyboards = Vec::new();
    let mut mice = Vec::new();

    for (path, device) in evdev::enumerate() {
        let name = match device.name() {
            Some(name) => name,
            None => continue,
        };
        match classify(name, keyboard_pattern, mouse_pattern) {
            Some(DeviceClass::Keyboard) => keyboards.push(path),
            Some(DeviceClass::Mouse) => mice.push(path),
            None => {}
        }
    }

    (keyboards, mice)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns() -> (Regex, Regex) {
        (
            Regex::new("(?i)keyboard").unwrap(),
            Regex::new("(?i)mouse").unwrap(),
        )
    }

    #[test]
    fn classifies_by_name() {
        let (kb, mouse) = patterns();
        assert_eq!(
            classify("AT Translated Set 2 keyboard", &kb, &mouse),
            Some(DeviceClass::Keyboard)
        );
        assert_eq!(
            classify("Logitech USB Mouse", &kb, &mouse),
            Some(DeviceClass::Mouse)
        );
        assert_eq!(classify("Power Button", &kb, &mouse), None);
    }

    #[test]
    fn ambiguous_name_prefers_keyboard() {
        let (kb, mouse) = patterns();
        assert_eq!(
            classify("keyboard mouse combo", &kb, &mouse),
            Some(DeviceClass::Keyboard)
        );
    }
}
