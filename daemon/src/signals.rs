use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::watch;

/// Wait for SIGHUP, SIGTERM or SIGINT and flip `shutdown` to true. Runs
/// once; the caller is expected to have already subscribed a receiver to
/// `shutdown` before spawning this.
pub async fn wait_for_shutdown_signal(shutdown: watch::Sender<bool>) {
    let mut hangup = signal(SignalKind::hangup()).expect("failed to install SIGHUP handler");
    let mut terminate =
        signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
    let mut interrupt =
        signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");

    tokio::select! {
        _ = hangup.recv() => log::info!("received SIGHUP"),
        _ = terminate.recv() => log::info!("received SIGTERM"),
        _ = interrupt.recv() => log::info!("received SIGINT"),
    }

    let _ = shutdown.send(true);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sighup_flips_the_shutdown_channel() {
        let (tx, mut rx) = watch::channel(false);
        let task = tokio::spawn(wait_for_shutdown_signal(tx));

        tokio::task::yield_now().await;
        unsafe {
            libc::raise(libc::SIGHUP);
        }

        rx.changed().await.unwrap();
        assert!(*rx.borrow());
        task.await.unwrap();
    }
}
