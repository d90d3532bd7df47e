use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use evdev::{Device, InputEventKind, SynchronizationType};
use futures::StreamExt;
use hidbridge_core::{HidWriter, KeyboardReport, KeyboardTranslator, MouseTranslator, ReportPlan, WriteError};
use tokio::task::JoinHandle;

use crate::error::SessionError;

/// A running capture+translate+write task bound to one input device and
/// one HID endpoint. The Session owns the device's exclusive capture and
/// the endpoint path for the duration of its task; it does not own the
/// endpoint pool slot itself, that stays with the Supervisor.
pub struct Session {
    pub endpoint_path: PathBuf,
    handle: JoinHandle<Result<(), SessionError>>,
}

impl Session {
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Cancel the task. Cancellation may land at any suspension point; the
    /// Session does not drain partial state first, so a host can observe
    /// stuck keys/buttons until a fresh Session for the device starts.
    pub fn cancel(&self) {
        self.handle.abort();
    }

    /// Wait for the task to finish and collect its result. A cancelled or
    /// panicked task is treated as a clean exit: the Supervisor only cares
    /// about errors the Session itself reported.
    pub async fn join(self) -> Option<SessionError> {
        match self.handle.await {
            Ok(Ok(())) => None,
            Ok(Err(e)) => Some(e),
            Err(_) => None,
        }
    }
}

/// Open the device and grab exclusive capture, retrying every
/// `reconnect_retry` indefinitely on failure. The device may still be
/// settling right after plug-in, or another process may hold it briefly.
async fn capture_device(path: &Path, reconnect_retry: Duration) -> Device {
    loop {
        match Device::open(path) {
            Ok(mut device) => match device.grab() {
                Ok(()) => return device,
                Err(e) => log::warn!("exclusive capture of {} failed: {e}", path.display()),
            },
            Err(e) => log::warn!("opening {} failed: {e}", path.display()),
        }
        tokio::time::sleep(reconnect_retry).await;
    }
}

pub fn spawn_mouse_session(
    device_path: PathBuf,
    endpoint_path: PathBuf,
    reconnect_retry: Duration,
) -> Session {
    let task_endpoint = endpoint_path.clone();
    let handle = tokio::spawn(run_mouse_session(
        device_path,
        task_endpoint,
        reconnect_retry,
    ));
    Session {
        endpoint_path,
        handle,
    }
}

async fn run_mouse_session(
    device_path: PathBuf,
    endpoint_path: PathBuf,
    reconnect_retry: Duration,
) -> Result<(), SessionError> {
    let device = capture_device(&device_path, reconnect_retry).await;
    let mut stream = device.into_event_stream()?;
    let mut translator = MouseTranslator::new();

    while let Some(event) = stream.next().await {
        let event = event?;
        match event.kind() {
            InputEventKind::Key(key) => translator.on_key(key, event.value()),
            InputEventKind::RelAxis(axis) => translator.on_rel(axis, event.value()),
            InputEventKind::Synchronization(SynchronizationType::SYN_REPORT) => {
                let report = translator.on_syn_report();
                write_mouse_report(&endpoint_path, &report.serialize()).await?;
            }
            _ => {}
        }
    }
    Ok(())
}

async fn write_mouse_report(endpoint_path: &Path, bytes: &[u8]) -> Result<(), SessionError> {
    match HidWriter::write(endpoint_path, bytes).await {
        Ok(()) => Ok(()),
        Err(WriteError::Shutdown) => Err(SessionError::EndpointShutdown),
        Err(WriteError::Io(e)) => {
            log::warn!("hid write error on {}: {e}", endpoint_path.display());
            Ok(())
        }
    }
}

pub fn spawn_keyboard_session(
    device_path: PathBuf,
    endpoint_path: PathBuf,
    reconnect_retry: Duration,
    remap_enabled: Arc<AtomicBool>,
) -> Session {
    let task_endpoint = endpoint_path.clone();
    let handle = tokio::spawn(run_keyboard_session(
        device_path,
        task_endpoint,
        reconnect_retry,
        remap_enabled,
    ));
    Session {
        endpoint_path,
        handle,
    }
}

async fn run_keyboard_session(
    device_path: PathBuf,
    endpoint_path: PathBuf,
    reconnect_retry: Duration,
    remap_enabled: Arc<AtomicBool>,
) -> Result<(), SessionError> {
    let device = capture_device(&device_path, reconnect_retry).await;
    let mut stream = device.into_event_stream()?;
    let mut translator = KeyboardTranslator::new();

    while let Some(event) = stream.next().await {
        let event = event?;
        let InputEventKind::Key(key) = event.kind() else {
            continue;
        };
        let enabled = remap_enabled.load(Ordering::Relaxed);
        match translator.on_key(key, event.value(), enabled) {
            Ok(Some(plan)) => emit_keyboard_plan(&endpoint_path, plan).await?,
            Ok(None) => {}
            Err(e) => {
                log::warn!(
                    "keyboard decode exception on {}: {e}, resetting translator",
                    device_path.display()
                );
                translator.reset();
            }
        }
    }
    Ok(())
}

async fn emit_keyboard_plan(endpoint_path: &Path, plan: ReportPlan) -> Result<(), SessionError> {
    match plan {
        ReportPlan::Single(report) => write_keyboard_report(endpoint_path, &report).await,
        ReportPlan::ShiftUpThen(report) => {
            write_keyboard_report(endpoint_path, &ReportPlan::shift_only_report()).await?;
            tokio::time::sleep(Duration::from_millis(10)).await;
            write_keyboard_report(endpoint_path, &report).await
        }
    }
}

async fn write_keyboard_report(
    endpoint_path: &Path,
    report: &KeyboardReport,
) -> Result<(), SessionError> {
    match HidWriter::write(endpoint_path, &report.serialize()).await {
        Ok(()) => Ok(()),
        Err(WriteError::Shutdown) => Err(SessionError::EndpointShutdown),
        Err(WriteError::Io(e)) => {
            log::warn!("hid write error on {}: {e}", endpoint_path.display());
            Ok(())
        }
    }
}
