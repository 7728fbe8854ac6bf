use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

const WINDOW: Duration = Duration::from_secs(60);

/// Paces calls to the outbound email API: at most `max_per_window` sends per
/// window, extra callers sleep until the window rolls over. Shared across the
/// concurrent per-user tasks of a sweep.
///
/// In-memory, single-instance. For multi-instance deployments move this to
/// Redis or similar.
pub struct EmailThrottle {
    max_per_window: u32,
    window: Duration,
    state: Mutex<Window>,
}

struct Window {
    count: u32,
    started: Instant,
}

impl EmailThrottle {
    pub fn new(max_per_minute: u32) -> Self {
        Self {
            max_per_window: max_per_minute.max(1),
            window: WINDOW,
            state: Mutex::new(Window {
                count: 0,
                started: Instant::now(),
            }),
        }
    }

    /// Take one send slot, sleeping while the current window is exhausted.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut w = self.state.lock().await;
                let now = Instant::now();

                // Reset window if expired
                if now.duration_since(w.started) >= self.window {
                    w.count = 0;
                    w.started = now;
                }

                if w.count < self.max_per_window {
                    w.count += 1;
                    return;
                }

                self.window.saturating_sub(now.duration_since(w.started))
            };

            tokio::time::sleep(wait.max(Duration::from_millis(10))).await;
        }
    }
}
