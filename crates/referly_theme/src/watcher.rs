//! Polling system color scheme watcher
//!
//! Re-detects the OS scheme on a background thread and pushes changes into a
//! [`SystemScheme`]. The thread stops when the watcher is dropped.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::scheme::{detect_system_color_scheme, ColorScheme};
use crate::system::SystemScheme;

/// Watcher settings
#[derive(Clone, Debug)]
pub struct WatcherConfig {
    /// Time between two detections
    pub poll_interval: Duration,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
        }
    }
}

/// Background poller feeding a [`SystemScheme`]
pub struct SystemSchemeWatcher {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl SystemSchemeWatcher {
    /// Poll the environment with [`detect_system_color_scheme`]
    pub fn start(system: SystemScheme, config: WatcherConfig) -> Self {
        Self::start_with(system, config, detect_system_color_scheme)
    }

    /// Poll with a custom detector
    pub fn start_with<F>(system: SystemScheme, config: WatcherConfig, detect: F) -> Self
    where
        F: Fn() -> ColorScheme + Send + 'static,
    {
        let (stop, stopped) = mpsc::channel::<()>();
        let handle = std::thread::Builder::new()
            .name("referly-scheme-watcher".to_string())
            .spawn(move || loop {
                match stopped.recv_timeout(config.poll_interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        system.set(detect());
                    }
                    _ => break,
                }
            });

        let handle = match handle {
            Ok(handle) => Some(handle),
            Err(err) => {
                tracing::warn!(%err, "failed to spawn system scheme watcher thread");
                None
            }
        };

        Self {
            stop: Some(stop),
            handle,
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for SystemSchemeWatcher {
    fn drop(&mut self) {
        // Dropping the sender disconnects the channel and ends the loop
        self.stop.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[test]
    fn pushes_detected_scheme() {
        let system = SystemScheme::new(ColorScheme::Light);
        let dark = Arc::new(AtomicBool::new(true));

        let dark_clone = Arc::clone(&dark);
        let watcher = SystemSchemeWatcher::start_with(
            system.clone(),
            WatcherConfig {
                poll_interval: Duration::from_millis(5),
            },
            move || ColorScheme::from_dark(dark_clone.load(Ordering::SeqCst)),
        );
        assert!(watcher.is_running());

        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        while system.current() != ColorScheme::Dark && std::time::Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(system.current(), ColorScheme::Dark);

        drop(watcher);
        dark.store(false, Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(system.current(), ColorScheme::Dark);
    }
}
