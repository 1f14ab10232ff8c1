//! Progress reporting for multi-stage operations.
//!
//! Operations that may touch many points (welding across every selected
//! object) report which stage they are in through a [`Progress`] callback.
//!
//! # Example
//!
//! ```
//! use trackverts::algo::Progress;
//!
//! let progress = Progress::new(|current, total, message| {
//!     eprintln!("[{}/{}] {}", current, total, message);
//! });
//! progress.report(1, 3, "Linking neighbors");
//! ```

type Callback = Box<dyn Fn(usize, usize, &str) + Send + Sync>;

/// A progress callback that receives `(current, total, message)` updates.
///
/// `current` runs from `0` to `total`; a report with `current == total` marks
/// completion.
pub struct Progress {
    callback: Option<Callback>,
}

impl Progress {
    /// Create a new progress reporter with the given callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(usize, usize, &str) + Send + Sync + 'static,
    {
        Self {
            callback: Some(Box::new(callback)),
        }
    }

    /// Create a no-op progress reporter that discards all updates.
    pub fn none() -> Self {
        Self { callback: None }
    }

    /// Whether updates go anywhere.
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.callback.is_some()
    }

    /// Report progress.
    #[inline]
    pub fn report(&self, current: usize, total: usize, message: &str) {
        if let Some(callback) = &self.callback {
            callback(current.min(total), total, message);
        }
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::none()
    }
}

impl std::fmt::Debug for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Progress")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_reports_are_clamped() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = log.clone();
        let progress = Progress::new(move |c, t, m| sink.lock().unwrap().push((c, t, m.to_string())));

        progress.report(1, 3, "a");
        progress.report(5, 3, "b");

        let log = log.lock().unwrap();
        assert_eq!(log[0], (1, 3, "a".to_string()));
        assert_eq!(log[1], (3, 3, "b".to_string()));
    }

    #[test]
    fn test_none_is_disabled() {
        let progress = Progress::default();
        assert!(!progress.is_enabled());
        progress.report(0, 1, "ignored");
    }
}
