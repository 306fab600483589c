use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

#[derive(Debug)]
struct WindowState {
    window_started_at: Instant,
    suppressed: u64,
}

/// Rate-limits repetitive log lines per key (one line per `interval`).
///
/// A flapping network can fail every request in a burst; we still want to see
/// the first failure for each path and a count of what was swallowed after it.
#[derive(Debug)]
pub struct LogThrottle {
    interval: Duration,
    windows: Mutex<HashMap<String, WindowState>>,
}

impl LogThrottle {
    pub fn new(interval: Duration) -> Self {
        LogThrottle {
            interval,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Returns `Some(suppressed_count)` when a log for `key` should be emitted,
    /// otherwise `None` and the event is counted as suppressed for the active window.
    pub fn should_emit(&self, key: &str) -> Option<u64> {
        let mut map = self.windows.lock().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();

        match map.get_mut(key) {
            Some(state) if now.duration_since(state.window_started_at) >= self.interval => {
                let suppressed = state.suppressed;
                state.window_started_at = now;
                state.suppressed = 0;
                Some(suppressed)
            }
            Some(state) => {
                state.suppressed += 1;
                None
            }
            None => {
                // Only windows still running are kept.
                let interval = self.interval;
                map.retain(|_, state| now.duration_since(state.window_started_at) < interval);
                map.insert(
                    key.to_string(),
                    WindowState {
                        window_started_at: now,
                        suppressed: 0,
                    },
                );
                Some(0)
            }
        }
    }

    #[cfg(test)]
    fn tracked_keys(&self) -> usize {
        self.windows.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[cfg(test)]
mod tests {
    use super::LogThrottle;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn emits_then_suppresses_then_emits_with_count() {
        let throttle = LogThrottle::new(Duration::from_millis(20));
        let key = "transport./books/";

        assert_eq!(throttle.should_emit(key), Some(0));
        assert_eq!(throttle.should_emit(key), None);
        assert_eq!(throttle.should_emit(key), None);

        sleep(Duration::from_millis(30));
        assert_eq!(throttle.should_emit(key), Some(2));
    }

    #[test]
    fn keys_are_throttled_independently() {
        let throttle = LogThrottle::new(Duration::from_secs(60));

        assert_eq!(throttle.should_emit("a"), Some(0));
        assert_eq!(throttle.should_emit("b"), Some(0));
        assert_eq!(throttle.should_emit("a"), None);
    }

    #[test]
    fn expired_windows_are_dropped_when_new_keys_arrive() {
        let throttle = LogThrottle::new(Duration::from_millis(20));
        for id in 0..50 {
            assert_eq!(throttle.should_emit(&format!("transport./books/{}/", id)), Some(0));
        }
        assert_eq!(throttle.tracked_keys(), 50);

        sleep(Duration::from_millis(30));
        assert_eq!(throttle.should_emit("transport./books/99/"), Some(0));
        assert_eq!(throttle.tracked_keys(), 1);
    }
}
