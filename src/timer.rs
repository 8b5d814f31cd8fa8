//! Cancellable one-second countdown driving automatic phase advancement.

use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;

/// A running countdown. At most one is live per battle; callers cancel any
/// prior instance before starting a new one.
#[derive(Debug)]
pub struct Countdown {
    handle: JoinHandle<()>,
}

impl Countdown {
    /// Start a countdown of `seconds` steps. After each one-second sleep,
    /// `on_tick` receives the decremented remaining value; once it reaches
    /// zero the loop ends and `on_expire` runs exactly once.
    ///
    /// A zero-length countdown skips straight to `on_expire`.
    pub fn start<T, FT, E, FE>(seconds: u32, mut on_tick: T, on_expire: E) -> Self
    where
        T: FnMut(u32) -> FT + Send + 'static,
        FT: Future<Output = ()> + Send + 'static,
        E: FnOnce() -> FE + Send + 'static,
        FE: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut remaining = seconds;
            while remaining > 0 {
                tokio::time::sleep(Duration::from_secs(1)).await;
                remaining -= 1;
                on_tick(remaining).await;
            }
            on_expire().await;
        });

        Self { handle }
    }

    /// Stop the countdown. Safe to call after it has already finished.
    pub fn cancel(&self) {
        self.handle.abort();
    }
}
