use thiserror::Error;

/// Outcome of a single HID report write.
///
/// `Shutdown` is the one variant callers must treat as fatal to the owning
/// session: it means the gadget endpoint itself went away (host
/// disconnected, UDC unbound). Every other I/O error is transient from the
/// writer's point of view and is left for the caller to log and ignore.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("hid endpoint shut down")]
    Shutdown,
    #[error("hid endpoint i/o error: {0}")]
    Io(#[from] std::io::Error),
}
