//! Token bucket rate limiter for queued append jobs.
//!
//! One token is one job. The bucket refills at `rate_per_second` and holds at
//! most one second's worth of burst.

use tokio::time::{Duration, Instant};
use tracing::debug;

pub struct Throttle {
    state: tokio::sync::Mutex<ThrottleState>,
}

struct ThrottleState {
    available: f64,
    last_refill: Instant,
    capacity: f64,
    rate: f64,
}

impl Throttle {
    /// A throttle admitting `rate_per_second` jobs. Zero disables the ceiling.
    pub fn new(rate_per_second: u32) -> Self {
        let rate = rate_per_second as f64;
        Self {
            state: tokio::sync::Mutex::new(ThrottleState {
                available: rate,
                last_refill: Instant::now(),
                capacity: rate,
                rate,
            }),
        }
    }

    /// Wait until a token is available, then consume it.
    pub async fn acquire(&self) {
        loop {
            let wait_time = {
                let mut state = self.state.lock().await;
                if state.rate <= 0.0 {
                    return;
                }
                state.refill();

                if state.available >= 1.0 {
                    state.available -= 1.0;
                    return;
                }

                Duration::from_secs_f64((1.0 - state.available) / state.rate)
            };

            debug!(wait_ms = wait_time.as_millis() as u64, "ingest throttle: waiting for token");
            tokio::time::sleep(wait_time).await;
        }
    }
}

impl ThrottleState {
    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        if elapsed > 0.0 {
            self.available = (self.available + elapsed * self.rate).min(self.capacity);
            self.last_refill = now;
        }
    }
}
