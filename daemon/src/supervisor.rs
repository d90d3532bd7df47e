use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use hidbridge_core::EndpointPool;
use regex::Regex;
use tokio::sync::watch;

use crate::config::Config;
use crate::devices;
use crate::session::{spawn_keyboard_session, spawn_mouse_session, Session};

/// Owns the endpoint pools and the managed-device maps, and reconciles
/// them against the kernel's input devices on a fixed tick. Exclusively
/// owns both pools; Sessions never touch them.
pub struct Supervisor {
    scan_interval: Duration,
    reconnect_retry: Duration,
    keyboard_pattern: Regex,
    mouse_pattern: Regex,
    keyboard_pool: EndpointPool,
    mouse_pool: EndpointPool,
    keyboard_sessions: HashMap<PathBuf, Session>,
    mouse_sessions: HashMap<PathBuf, Session>,
    remap_enabled: Arc<AtomicBool>,
}

impl Supervisor {
    pub fn new(config: &Config, remap_enabled: Arc<AtomicBool>) -> anyhow::Result<Self> {
        let keyboard_pattern =
            Regex::new(&config.keyboard_pattern).context("compiling keyboard_pattern")?;
        let mouse_pattern = Regex::new(&config.mouse_pattern).context("compiling mouse_pattern")?;
        Ok(Self {
            scan_interval: Duration::from_secs(config.scan_interval_secs),
            reconnect_retry: Duration::from_secs(config.reconnect_retry_secs),
            keyboard_pattern,
            mouse_pattern,
            keyboard_pool: EndpointPool::new(config.keyboard_endpoints.clone()),
            mouse_pool: EndpointPool::new(config.mouse_endpoints.clone()),
            keyboard_sessions: HashMap::new(),
            mouse_sessions: HashMap::new(),
            remap_enabled,
        })
    }

    /// Run the reap/enumerate/reconcile tick forever, until `shutdown`
    /// reports true. Consumes `self`: there is exactly one Supervisor and
    /// it owns this loop for the life of the process.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.scan_interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => self.tick().await,
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        self.shutdown_all().await;
                        return;
                    }
                }
            }
        }
    }

    async fn tick(&mut self) {
        Self::reap(&mut self.keyboard_sessions, &mut self.keyboard_pool, "keyboard").await;
        Self::reap(&mut self.mouse_sessions, &mut self.mouse_pool, "mouse").await;
        self.reconcile().await;
    }

    async fn reap(sessions: &mut HashMap<PathBuf, Session>, pool: &mut EndpointPool, class: &str) {
        let finished: Vec<PathBuf> = sessions
            .iter()
            .filter(|(_, session)| session.is_finished())
            .map(|(path, _)| path.clone())
            .collect();

        for path in finished {
            let Some(session) = sessions.remove(&path) else {
                continue;
            };
            let endpoint = session.endpoint_path.clone();
            if let Some(err) = session.join().await {
                log::warn!("{class} session for {} ended with error: {err}", path.display());
            }
            pool.release(endpoint);
        }
    }

    async fn reconcile(&mut self) {
        let (keyboard_paths, mouse_paths) =
            devices::enumerate_matching(&self.keyboard_pattern, &self.mouse_pattern);

        Self::reconcile_keyboards(self, keyboard_paths.into_iter().collect());
        Self::reconcile_mice(self, mouse_paths.into_iter().collect());
    }

    fn reconcile_keyboards(&mut self, current: HashSet<PathBuf>) {
        let absent: Vec<PathBuf> = self
            .keyboard_sessions
            .keys()
            .filter(|path| !current.contains(*path))
            .cloned()
            .collect();
        for path in absent {
            if let Some(session) = self.keyboard_sessions.remove(&path) {
                session.cancel();
                self.keyboard_pool.release(session.endpoint_path);
            }
        }

        let present: Vec<PathBuf> = current
            .into_iter()
            .filter(|path| !self.keyboard_sessions.contains_key(path))
            .collect();
        for path in present {
            match self.keyboard_pool.acquire() {
                Some(endpoint) => {
                    let session = spawn_keyboard_session(
                        path.clone(),
                        endpoint,
                        self.reconnect_retry,
                        self.remap_enabled.clone(),
                    );
                    self.keyboard_sessions.insert(path, session);
                }
                None => log::warn!("no free keyboard endpoint for {}", path.display()),
            }
        }
    }

    fn reconcile_mice(&mut self, current: HashSet<PathBuf>) {
        let absent: Vec<PathBuf> = self
            .mouse_sessions
            .keys()
            .filter(|path| !current.contains(*path))
            .cloned()
            .collect();
        for path in absent {
            if let Some(session) = self.mouse_sessions.remove(&path) {
                session.cancel();
                self.mouse_pool.release(session.endpoint_path);
            }
        }

        let present: Vec<PathBuf> = current
            .into_iter()
            .filter(|path| !self.mouse_sessions.contains_key(path))
            .collect();
        for path in present {
            match self.mouse_pool.acquire() {
                Some(endpoint) => {
                    let session = spawn_mouse_session(path.clone(), endpoint, self.reconnect_retry);
                    self.mouse_sessions.insert(path, session);
                }
                None => log::warn!("no free mouse endpoint for {}", path.display()),
            }
        }
    }

    async fn shutdown_all(&mut self) {
        for (_, session) in self.keyboard_sessions.drain() {
            session.cancel();
            if let Some(err) = session.join().await {
                log::warn!("keyboard session ended with error during shutdown: {err}");
            }
        }
        for (_, session) in self.mouse_sessions.drain() {
            session.cancel();
            if let Some(err) = session.join().await {
                log::warn!("mouse session ended with error during shutdown: {err}");
            }
        }
    }
}
