mod config;
mod devices;
mod error;
mod gpio;
mod logging;
mod session;
mod signals;
mod supervisor;

use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use clap::Parser;
use tokio::sync::watch;
use tokio::task::JoinError;

use config::Config;
use supervisor::Supervisor;

/// Captures input from physical keyboards and mice via evdev, translates
/// the events into USB HID reports, and writes them to HID-gadget
/// endpoints so a USB host sees a composite HID peripheral.
#[derive(Debug, Parser)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "/etc/hidbridge/config.toml")]
    config: PathBuf,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;
    logging::init(&config.log_level);
    log::info!("loaded configuration from {}", cli.config.display());

    let remap_enabled = Arc::new(AtomicBool::new(config.remap_enabled));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let mut signal_task = tokio::spawn(signals::wait_for_shutdown_signal(shutdown_tx.clone()));

    let gpio_source = gpio::DebouncedGpioSource::new(gpio::NullGpioSource);
    let keyboard_endpoint = config.keyboard_endpoints.first().cloned();
    let mut gpio_task = tokio::spawn(gpio::run(
        gpio_source,
        remap_enabled.clone(),
        config.gpio.email_macro_text.clone(),
        keyboard_endpoint,
        shutdown_tx.clone(),
    ));

    let supervisor = Supervisor::new(&config, remap_enabled)?;
    let mut supervisor_task = tokio::spawn(supervisor.run(shutdown_rx));

    // Whichever of these three finishes first drives the others into
    // graceful shutdown: the Supervisor finishes on its own once something
    // flips `shutdown_tx`; if the signal or GPIO task ends unexpectedly
    // instead (a panic, since neither otherwise returns), treat that as an
    // uncaught error and still route through the same shutdown path.
    tokio::select! {
        result = &mut supervisor_task => {
            log_join_result("supervisor", result);
        }
        result = &mut signal_task => {
            log_join_result("signal handler", result);
            let _ = shutdown_tx.send(true);
            log_join_result("supervisor", supervisor_task.await);
        }
        result = &mut gpio_task => {
            log_join_result("gpio", result);
            let _ = shutdown_tx.send(true);
            log_join_result("supervisor", supervisor_task.await);
        }
    }

    signal_task.abort();
    gpio_task.abort();
    log::info!("shutdown complete");
    Ok(())
}

fn log_join_result(name: &str, result: Result<(), JoinError>) {
    if let Err(e) = result {
        log::error!("{name} task ended unexpectedly: {e}");
    }
}
