//! Translation of Linux evdev input events into USB HID reports, and the
//! write-side plumbing that pushes those reports out through a HID-gadget
//! character device.
//!
//! This crate knows nothing about device enumeration, process lifecycle or
//! configuration; it is the pure state machine (and the one bit of async
//! I/O, the HID writer) shared by every session the daemon crate supervises.

pub mod endpoint;
pub mod error;
pub mod keyboard;
pub mod keycodes;
pub mod mouse;
pub mod remap;
pub mod report;
pub mod writer;

pub use endpoint::EndpointPool;
pub use error::WriteError;
pub use keyboard::{DecodeError, KeyboardTranslator, ReportPlan};
pub use mouse::MouseTranslator;
pub use report::{KeyboardReport, MouseReport};
pub use writer::HidWriter;
