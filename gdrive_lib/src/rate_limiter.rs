use parking_lot::Mutex;
use std::sync::Arc;
use tokio::time::{sleep, Duration, Instant};

#[derive(Debug)]
struct Window {
    start: Instant,
    count: usize,
}

/// Fixed window limiter: at most `max_requests` acquisitions per `window_ms`.
#[derive(Clone, Debug)]
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    state: Arc<Mutex<Window>>,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window_ms: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_millis(window_ms),
            state: Arc::new(Mutex::new(Window {
                start: Instant::now(),
                count: 0,
            })),
        }
    }

    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut state = self.state.lock();
                let now = Instant::now();
                let elapsed = now.duration_since(state.start);
                if elapsed >= self.window {
                    state.start = now;
                    state.count = 0;
                }
                if state.count < self.max_requests {
                    state.count += 1;
                    None
                } else {
                    Some(self.window - elapsed)
                }
            };
            match wait {
                Some(wait) => sleep(wait).await,
                None => return,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::time::{Duration, Instant};

    use crate::rate_limiter::RateLimiter;

    #[tokio::test(start_paused = true)]
    async fn test_rate_limiter_blocks_until_next_window() {
        let limiter = RateLimiter::new(2, 1000);
        let start = Instant::now();
        limiter.acquire().await;
        limiter.acquire().await;
        assert!(start.elapsed() < Duration::from_millis(1000));
        limiter.acquire().await;
        assert!(start.elapsed() >= Duration::from_millis(1000));
    }
}
