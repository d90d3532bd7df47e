use thiserror::Error;

/// Why a Session's task ended. `Ok(())` (no error) covers clean
/// end-of-stream and cancellation; this enum covers the cases the
/// Supervisor should log on reap.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("input device io error: {0}")]
    DeviceIo(#[from] std::io::Error),
    #[error("hid endpoint shut down")]
    EndpointShutdown,
}
