use std::path::Path;

use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use crate::error::WriteError;

/// Writes raw HID reports to a HID-gadget character device (`/dev/hidgN`).
///
/// The endpoint is opened fresh for every write. Gadget endpoints are cheap
/// to reopen and this sidesteps having to notice, out of band, that a
/// previously-opened handle went stale when the host disconnected.
pub struct HidWriter;

impl HidWriter {
    /// Write one report to `path`. An `ESHUTDOWN` from the kernel means the
    /// host tore down the endpoint; every other error is reported as-is for
    /// the caller to decide whether it's worth logging and swallowing.
    pub async fn write(path: &Path, report: &[u8]) -> Result<(), WriteError> {
        let mut endpoint = OpenOptions::new().read(true).write(true).open(path).await?;
        match endpoint.write_all(report).await {
            Ok(()) => Ok(()),
            Err(e) if e.raw_os_error() == Some(libc::ESHUTDOWN) => Err(WriteError::Shutdown),
            Err(e) => Err(WriteError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_to_a_plain_file_round_trips() {
        let file = tempfile::NamedTempFile::new().unwrap();
        HidWriter::write(file.path(), &[1, 2, 3, 4, 5, 6, 7, 8])
            .await
            .unwrap();
        let written = std::fs::read(file.path()).unwrap();
        assert_eq!(written, [1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[tokio::test]
    async fn missing_endpoint_is_an_io_error_not_shutdown() {
        let result = HidWriter::write(Path::new("/nonexistent/hidg0"), &[0; 8]).await;
        assert!(matches!(result, Err(WriteError::Io(_))));
    }
}
