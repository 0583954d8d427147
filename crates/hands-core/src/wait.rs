use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::WaitOptions;
use crate::error::{Result, WaitError};
use crate::status::{AgentStatus, StatusSource};

/// Poll `source` until the agent leaves the `running` state.
///
/// Returns the first non-running status observed. Fails with
/// [`WaitError::Timeout`] once `options.timeout` has elapsed, or with
/// [`WaitError::ErrorBudgetExceeded`] after `options.max_consecutive_errors`
/// status queries fail back to back. A successful query resets the error
/// count.
pub async fn wait_for_completion<S>(source: &S, options: &WaitOptions) -> Result<AgentStatus>
where
    S: StatusSource + ?Sized,
{
    let started = Instant::now();
    let mut consecutive_errors = 0u32;
    let mut last_status: Option<AgentStatus> = None;
    let mut poll_count = 0u32;

    loop {
        if started.elapsed() > options.timeout {
            warn!(poll_count, timeout = ?options.timeout, "Completion wait timed out");
            return Err(WaitError::Timeout {
                timeout: options.timeout,
            }
            .into());
        }

        tokio::time::sleep(options.poll_interval).await;
        poll_count += 1;

        match source.agent_status().await {
            Ok(raw) => {
                consecutive_errors = 0;
                let status = AgentStatus::parse(&raw);
                debug!(poll_count, %status, "Polled agent status");

                if last_status.as_ref() != Some(&status) {
                    info!(poll_count, %status, "Agent status changed");
                    if let Some(callback) = &options.on_status_change {
                        callback(&status);
                    }
                    last_status = Some(status.clone());
                }

                if !status.is_running() {
                    return Ok(status);
                }
            }
            Err(e) => {
                consecutive_errors += 1;
                warn!(
                    poll_count,
                    consecutive_errors,
                    error = %e,
                    "Status check failed"
                );
                if consecutive_errors >= options.max_consecutive_errors {
                    return Err(WaitError::ErrorBudgetExceeded {
                        max_consecutive_errors: options.max_consecutive_errors,
                        last_error: Box::new(e),
                    }
                    .into());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::error::{ApiError, HandsError};

    #[derive(Clone, Copy)]
    enum Step {
        Status(&'static str),
        Fail,
    }

    /// Plays back a fixed script, repeating `fallback` once it runs out.
    struct ScriptedSource {
        script: Mutex<VecDeque<Step>>,
        fallback: Step,
        calls: AtomicU32,
    }

    impl ScriptedSource {
        fn new(script: Vec<Step>, fallback: Step) -> Self {
            Self {
                script: Mutex::new(script.into()),
                fallback,
                calls: AtomicU32::new(0),
            }
        }

        fn always(step: Step) -> Self {
            Self::new(Vec::new(), step)
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl StatusSource for ScriptedSource {
        async fn agent_status(&self) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let step = self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(self.fallback);
            match step {
                Step::Status(s) => Ok(s.to_string()),
                Step::Fail => Err(ApiError::Request("connection reset".into()).into()),
            }
        }
    }

    fn recording() -> (Arc<Mutex<Vec<AgentStatus>>>, WaitOptions) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let options = WaitOptions::new()
            .with_poll_interval(Duration::from_millis(10))
            .on_status_change(move |status| sink.lock().unwrap().push(status.clone()));
        (seen, options)
    }

    #[tokio::test(start_paused = true)]
    async fn resolves_on_first_non_running_status() {
        let source = ScriptedSource::new(
            vec![
                Step::Status("running"),
                Step::Status("running"),
                Step::Status("finished"),
            ],
            Step::Status("running"),
        );
        let (seen, options) = recording();

        let status = wait_for_completion(&source, &options).await.unwrap();

        assert_eq!(status, AgentStatus::Finished);
        assert_eq!(source.calls(), 3);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![AgentStatus::Running, AgentStatus::Finished]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_terminal_status_is_returned_raw() {
        let source = ScriptedSource::new(
            vec![Step::Status("running"), Step::Status("archived")],
            Step::Status("running"),
        );
        let status = wait_for_completion(&source, &WaitOptions::default())
            .await
            .unwrap();
        assert_eq!(status.to_string(), "archived");
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_while_running() {
        let source = ScriptedSource::always(Step::Status("running"));
        let options = WaitOptions::new()
            .with_timeout(Duration::from_secs(5))
            .with_poll_interval(Duration::from_secs(1));

        let started = Instant::now();
        let err = wait_for_completion(&source, &options).await.unwrap_err();
        let elapsed = started.elapsed();

        assert!(matches!(
            err,
            HandsError::Wait(WaitError::Timeout { timeout }) if timeout == Duration::from_secs(5)
        ));
        assert!(elapsed >= Duration::from_secs(5), "gave up early: {elapsed:?}");
        assert!(elapsed < Duration::from_secs(7), "gave up late: {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn aborts_after_exactly_max_consecutive_errors() {
        let source = ScriptedSource::always(Step::Fail);
        let options = WaitOptions::new()
            .with_max_consecutive_errors(3)
            .with_poll_interval(Duration::from_millis(10));

        let err = wait_for_completion(&source, &options).await.unwrap_err();

        assert_eq!(source.calls(), 3);
        match err {
            HandsError::Wait(WaitError::ErrorBudgetExceeded {
                max_consecutive_errors,
                last_error,
            }) => {
                assert_eq!(max_consecutive_errors, 3);
                assert!(last_error.to_string().contains("connection reset"));
            }
            other => panic!("expected error budget failure, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn success_resets_error_count() {
        let source = ScriptedSource::new(
            vec![
                Step::Fail,
                Step::Fail,
                Step::Status("running"),
                Step::Fail,
                Step::Fail,
                Step::Status("finished"),
            ],
            Step::Fail,
        );
        let options = WaitOptions::new()
            .with_max_consecutive_errors(3)
            .with_poll_interval(Duration::from_millis(10));

        let status = wait_for_completion(&source, &options).await.unwrap();
        assert_eq!(status, AgentStatus::Finished);
        assert_eq!(source.calls(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_polls_do_not_fire_status_change() {
        let source = ScriptedSource::new(
            vec![Step::Status("running"), Step::Fail, Step::Status("running")],
            Step::Status("error"),
        );
        let (seen, options) = recording();

        let status = wait_for_completion(&source, &options).await.unwrap();
        assert_eq!(status, AgentStatus::Error);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![AgentStatus::Running, AgentStatus::Error]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn sleeps_before_first_poll() {
        let source = ScriptedSource::always(Step::Status("idle"));
        let options = WaitOptions::new().with_poll_interval(Duration::from_secs(2));

        let started = Instant::now();
        wait_for_completion(&source, &options).await.unwrap();
        assert!(started.elapsed() >= Duration::from_secs(2));
    }
}
