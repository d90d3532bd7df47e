use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use evdev::Key;
use hidbridge_core::{DecodeError, HidWriter, KeyboardReport, KeyboardTranslator, ReportPlan, WriteError};
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;

/// Minimum time between two presses accepted from the same source.
/// Physical buttons bounce for a few milliseconds around the transition;
/// anything faster than this is the same press.
const DEBOUNCE_WINDOW: Duration = Duration::from_millis(50);

/// A macro command bound to a physical push-button. Out of the core's
/// scope; this module is thin plumbing that exists so the Keyboard
/// Translator's remap toggle has a real-world trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GpioButton {
    ToggleRemap,
    TypeEmailMacro,
    Shutdown,
}

/// A source of GPIO button presses. The only real implementation here is
/// [`NullGpioSource`]; boards without `/sys/class/gpio`/gpiod wiring (or
/// test environments) use it as a no-op that never fires.
#[async_trait::async_trait]
pub trait GpioSource: Send {
    async fn next_press(&mut self) -> GpioButton;
}

/// A source that never produces a press. Used when no GPIO pins are
/// configured.
pub struct NullGpioSource;

#[async_trait::async_trait]
impl GpioSource for NullGpioSource {
    async fn next_press(&mut self) -> GpioButton {
        std::future::pending().await
    }
}

/// A source driven by a channel, handed presses from elsewhere (real GPIO
/// interrupt wiring, or a test harness).
pub struct ChannelGpioSource {
    receiver: mpsc::Receiver<GpioButton>,
}

impl ChannelGpioSource {
    pub fn new(receiver: mpsc::Receiver<GpioButton>) -> Self {
        Self { receiver }
    }
}

#[async_trait::async_trait]
impl GpioSource for ChannelGpioSource {
    async fn next_press(&mut self) -> GpioButton {
        match self.receiver.recv().await {
            Some(button) => button,
            None => std::future::pending().await,
        }
    }
}

/// Wraps a [`GpioSource`] and drops presses that arrive within
/// [`DEBOUNCE_WINDOW`] of the last accepted one.
pub struct DebouncedGpioSource<S> {
    inner: S,
    last_accepted: Option<Instant>,
}

impl<S: GpioSource> DebouncedGpioSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            last_accepted: None,
        }
    }
}

#[async_trait::async_trait]
impl<S: GpioSource> GpioSource for DebouncedGpioSource<S> {
    async fn next_press(&mut self) -> GpioButton {
        loop {
            let button = self.inner.next_press().await;
            let now = Instant::now();
            let bounced = self
                .last_accepted
                .is_some_and(|last| now.duration_since(last) < DEBOUNCE_WINDOW);
            if bounced {
                continue;
            }
            self.last_accepted = Some(now);
            return button;
        }
    }
}

/// Drives `source` forever, applying each button press: flips the shared
/// remap toggle, types the configured email macro text out through the
/// keyboard HID endpoint, or triggers the same graceful shutdown a signal
/// would. `keyboard_endpoint` is `None` when no keyboard endpoint is
/// configured, in which case a `TypeEmailMacro` press is a no-op.
pub async fn run(
    mut source: impl GpioSource,
    remap_enabled: Arc<AtomicBool>,
    email_macro_text: String,
    keyboard_endpoint: Option<PathBuf>,
    shutdown: watch::Sender<bool>,
) {
    loop {
        match source.next_press().await {
            GpioButton::ToggleRemap => {
                let new_value = !remap_enabled.load(Ordering::Relaxed);
                remap_enabled.store(new_value, Ordering::Relaxed);
                log::info!("remap toggled {}", if new_value { "on" } else { "off" });
            }
            GpioButton::TypeEmailMacro => match &keyboard_endpoint {
                Some(endpoint) => {
                    log::info!("typing email macro ({} chars)", email_macro_text.chars().count());
                    if let Err(e) = type_macro_text(endpoint, &email_macro_text).await {
                        log::warn!("email macro typing aborted: {e}");
                    }
                }
                None => log::warn!("email macro requested but no keyboard endpoint is configured"),
            },
            GpioButton::Shutdown => {
                log::info!("shutdown button pressed");
                let _ = shutdown.send(true);
            }
        }
    }
}

/// Maps one literal ASCII character to the key (and whether Shift must be
/// held) that types it. Only the characters an email address needs are
/// covered; anything else is skipped by the caller.
fn key_for_char(c: char) -> Option<(Key, bool)> {
    let key = match c.to_ascii_lowercase() {
        'a' => Key::KEY_A,
        'b' => Key::KEY_B,
        'c' => Key::KEY_C,
        'd' => Key::KEY_D,
        'e' => Key::KEY_E,
        'f' => Key::KEY_F,
        'g' => Key::KEY_G,
        'h' => Key::KEY_H,
        'i' => Key::KEY_I,
        'j' => Key::KEY_J,
        'k' => Key::KEY_K,
        'l' => Key::KEY_L,
        'm' => Key::KEY_M,
        'n' => Key::KEY_N,
        'o' => Key::KEY_O,
        'p' => Key::KEY_P,
        'q' => Key::KEY_Q,
        'r' => Key::KEY_R,
        's' => Key::KEY_S,
        't' => Key::KEY_T,
        'u' => Key::KEY_U,
        'v' => Key::KEY_V,
        'w' => Key::KEY_W,
        'x' => Key::KEY_X,
        'y' => Key::KEY_Y,
        'z' => Key::KEY_Z,
        '0' => Key::KEY_0,
        '1' => Key::KEY_1,
        '2' => Key::KEY_2,
        '3' => Key::KEY_3,
        '4' => Key::KEY_4,
        '5' => Key::KEY_5,
        '6' => Key::KEY_6,
        '7' => Key::KEY_7,
        '8' => Key::KEY_8,
        '9' => Key::KEY_9,
        '-' => Key::KEY_MINUS,
        '.' => Key::KEY_DOT,
        '@' => return Some((Key::KEY_2, true)),
        _ => return None,
    };
    Some((key, false))
}

/// Types `text` through a fresh [`KeyboardTranslator`], writing each report
/// to `endpoint`. Remap is always off here: the macro text is a literal
/// ASCII string and must not be rewritten by the JIS layer. A 10ms pause
/// separates key transitions, matching the pacing a real keypress produces.
async fn type_macro_text(endpoint: &Path, text: &str) -> Result<(), WriteError> {
    let mut translator = KeyboardTranslator::new();
    for c in text.chars() {
        let Some((key, shift)) = key_for_char(c) else {
            log::warn!("email macro: no key mapping for {c:?}, skipping");
            continue;
        };
        if shift {
            emit(endpoint, translator.on_key(Key::KEY_LEFTSHIFT, 1, false)).await?;
        }
        emit(endpoint, translator.on_key(key, 1, false)).await?;
        emit(endpoint, translator.on_key(key, 0, false)).await?;
        if shift {
            emit(endpoint, translator.on_key(Key::KEY_LEFTSHIFT, 0, false)).await?;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    Ok(())
}

/// Write whatever [`ReportPlan`] (if any) a single translator call
/// produced. A bad keystate can't occur here: every call site above passes
/// a fixed 0 or 1, so the decode error is unreachable and silently ignored.
async fn emit(
    endpoint: &Path,
    plan: Result<Option<ReportPlan>, DecodeError>,
) -> Result<(), WriteError> {
    let Ok(Some(plan)) = plan else {
        return Ok(());
    };
    match plan {
        ReportPlan::Single(report) => write_report(endpoint, &report).await,
        ReportPlan::ShiftUpThen(report) => {
            write_report(endpoint, &ReportPlan::shift_only_report()).await?;
            tokio::time::sleep(Duration::from_millis(10)).await;
            write_report(endpoint, &report).await
        }
    }
}

async fn write_report(endpoint: &Path, report: &KeyboardReport) -> Result<(), WriteError> {
    match HidWriter::write(endpoint, &report.serialize()).await {
        Ok(()) => Ok(()),
        Err(WriteError::Shutdown) => Err(WriteError::Shutdown),
        Err(WriteError::Io(e)) => {
            log::warn!("hid write error on {}: {e}", endpoint.display());
            Ok(())
        }
    }
}
