use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::status::AgentStatus;

/// Callback fired whenever the observed status changes.
pub type StatusCallback = Arc<dyn Fn(&AgentStatus) + Send + Sync>;

/// Configuration for [`crate::wait::wait_for_completion`].
#[derive(Clone)]
pub struct WaitOptions {
    /// Overall wall-clock budget for the wait.
    pub timeout: Duration,

    /// Number of back-to-back failed status queries that aborts the wait.
    pub max_consecutive_errors: u32,

    /// Delay before every status query.
    pub poll_interval: Duration,

    /// Invoked with each newly observed status.
    pub on_status_change: Option<StatusCallback>,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10 * 60),
            max_consecutive_errors: 5,
            poll_interval: Duration::from_secs(2),
            on_status_change: None,
        }
    }
}

impl fmt::Debug for WaitOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WaitOptions")
            .field("timeout", &self.timeout)
            .field("max_consecutive_errors", &self.max_consecutive_errors)
            .field("poll_interval", &self.poll_interval)
            .field("on_status_change", &self.on_status_change.is_some())
            .finish()
    }
}

impl WaitOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_consecutive_errors(mut self, max: u32) -> Self {
        self.max_consecutive_errors = max;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn on_status_change(
        mut self,
        callback: impl Fn(&AgentStatus) + Send + Sync + 'static,
    ) -> Self {
        self.on_status_change = Some(Arc::new(callback));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options() {
        let options = WaitOptions::default();
        assert_eq!(options.timeout, Duration::from_secs(600));
        assert_eq!(options.max_consecutive_errors, 5);
        assert_eq!(options.poll_interval, Duration::from_secs(2));
        assert!(options.on_status_change.is_none());
    }

    #[test]
    fn builder_methods() {
        let options = WaitOptions::new()
            .with_timeout(Duration::from_secs(5))
            .with_max_consecutive_errors(3)
            .with_poll_interval(Duration::from_millis(250))
            .on_status_change(|_| {});

        assert_eq!(options.timeout, Duration::from_secs(5));
        assert_eq!(options.max_consecutive_errors, 3);
        assert_eq!(options.poll_interval, Duration::from_millis(250));
        assert!(options.on_status_change.is_some());
    }

    #[test]
    fn debug_hides_callback_body() {
        let options = WaitOptions::new().on_status_change(|_| {});
        let rendered = format!("{options:?}");
        assert!(rendered.contains("on_status_change: true"));
    }
}
