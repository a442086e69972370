//! SequenceExecutor: runs one triggered action to completion.
//!
//! Every dispatch spawns its own executor on the Tokio runtime.  The
//! executor owns an `Arc<Action>` snapshot, so a reload that happens while it
//! runs cannot change what it does.
//!
//! # Timeline of one run (for beginners)
//!
//! ```text
//! Created ─► PreHook ─► Running(0) ─► Running(1) ─► … ─► PostHook ─► Completed
//!               │
//!               └─ hook failed: steps and post-hook are skipped
//! ```
//!
//! A key step with `repeat_count = 2` and a 100 ms delay produces:
//!
//! ```text
//! press ─100ms─ release ─100ms─ press ─100ms─ release ─100ms─
//! ```
//!
//! A wait step sleeps for its duration and touches no key.
//!
//! All sleeps are `tokio::time::sleep`, so a long sequence parks only its own
//! task.  The event loop and other executors keep running.

use std::sync::Arc;
use std::time::Duration;

use joykeys_core::{Action, ActionStep, CanonicalEventId, KeyRef};
use thiserror::Error;
use tracing::{trace, warn};

/// Error type for output sink operations.
#[derive(Debug, Error)]
pub enum EmulationError {
    #[error("platform error: {0}")]
    Platform(String),
    #[error("key {0} has no code on this platform")]
    UnmappedKey(KeyRef),
}

/// The output sink: something that can press and release keys.
///
/// Implementations must accept calls from several executors at once.
pub trait KeyOutput: Send + Sync {
    /// Presses `key` down.
    fn press(&self, key: &KeyRef) -> Result<(), EmulationError>;

    /// Releases `key`.
    fn release(&self, key: &KeyRef) -> Result<(), EmulationError>;
}

/// Where an executor is in its run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutorState {
    Created,
    PreHook,
    /// Executing the step at this index.
    Running(usize),
    PostHook,
    Completed,
}

/// Summary of one finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionReport {
    /// The trigger that started the run.
    pub trigger: CanonicalEventId,
    /// The last state reached.
    pub final_state: ExecutorState,
    /// `true` if the pre-hook failed and no steps ran.
    pub aborted: bool,
    /// Key presses issued, whether or not the sink accepted them.
    pub presses: u64,
    /// Sink calls that returned an error.
    pub sink_faults: u32,
    /// `true` if the post-hook failed.
    pub post_hook_failed: bool,
}

/// Runs one [`Action`] against an output sink.
pub struct SequenceExecutor {
    trigger: CanonicalEventId,
    action: Arc<Action>,
    sink: Arc<dyn KeyOutput>,
    report: ExecutionReport,
}

impl SequenceExecutor {
    /// Creates an executor in the `Created` state.
    pub fn new(trigger: CanonicalEventId, action: Arc<Action>, sink: Arc<dyn KeyOutput>) -> Self {
        let report = ExecutionReport {
            trigger: trigger.clone(),
            final_state: ExecutorState::Created,
            aborted: false,
            presses: 0,
            sink_faults: 0,
            post_hook_failed: false,
        };
        Self {
            trigger,
            action,
            sink,
            report,
        }
    }

    /// Runs the action to completion and reports what happened.
    ///
    /// Faults never propagate: a failed pre-hook aborts the run, a failed
    /// sink call is counted and skipped, a failed post-hook is recorded.
    pub async fn run(mut self) -> ExecutionReport {
        let action = Arc::clone(&self.action);

        self.enter(ExecutorState::PreHook);
        if let Some(hook) = &action.pre_hook {
            if let Err(e) = hook.run(&self.trigger) {
                warn!(trigger = %self.trigger, "pre-run hook failed, skipping sequence: {e}");
                self.report.aborted = true;
                return self.report;
            }
        }

        for (index, step) in action.steps.iter().enumerate() {
            self.enter(ExecutorState::Running(index));
            match step {
                ActionStep::Key { key, repeat_count } => {
                    for _ in 0..repeat_count.get() {
                        self.tap(key, action.inter_key_delay).await;
                    }
                }
                ActionStep::Wait { duration } => pause(*duration).await,
            }
        }

        self.enter(ExecutorState::PostHook);
        if let Some(hook) = &action.post_hook {
            if let Err(e) = hook.run(&self.trigger) {
                warn!(trigger = %self.trigger, "after-run hook failed: {e}");
                self.report.post_hook_failed = true;
            }
        }

        self.enter(ExecutorState::Completed);
        self.report
    }

    /// One press/release pair, each followed by `delay`.
    async fn tap(&mut self, key: &KeyRef, delay: Duration) {
        self.report.presses += 1;
        if let Err(e) = self.sink.press(key) {
            self.sink_fault("press", key, &e);
        }
        pause(delay).await;
        if let Err(e) = self.sink.release(key) {
            self.sink_fault("release", key, &e);
        }
        pause(delay).await;
    }

    fn sink_fault(&mut self, call: &str, key: &KeyRef, e: &EmulationError) {
        self.report.sink_faults += 1;
        warn!(trigger = %self.trigger, %key, "{call} failed: {e}");
    }

    fn enter(&mut self, state: ExecutorState) {
        trace!(trigger = %self.trigger, from = ?self.report.final_state, to = ?state, "executor transition");
        self.report.final_state = state;
    }
}

async fn pause(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::key_emulation::mock::{KeyEvent, MockKeyOutput};
    use joykeys_core::{ActionHook, HookError};
    use std::num::NonZeroU32;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Hook that counts its calls and optionally fails.
    struct CountingHook {
        calls: AtomicU32,
        fail: bool,
    }

    impl CountingHook {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicU32::new(0),
                fail,
            })
        }
    }

    impl ActionHook for CountingHook {
        fn name(&self) -> &str {
            "counting"
        }

        fn run(&self, _trigger: &CanonicalEventId) -> Result<(), HookError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(HookError::new("counting", "configured to fail"))
            } else {
                Ok(())
            }
        }
    }

    fn key(c: char) -> KeyRef {
        KeyRef::Char(c)
    }

    fn executor(action: Action, sink: &Arc<MockKeyOutput>) -> SequenceExecutor {
        SequenceExecutor::new(
            CanonicalEventId::new("HAT_0_up"),
            Arc::new(action),
            Arc::clone(sink) as Arc<dyn KeyOutput>,
        )
    }

    fn assert_near(actual: Duration, expected_ms: u64) {
        let expected = Duration::from_millis(expected_ms);
        let diff = if actual > expected { actual - expected } else { expected - actual };
        assert!(
            diff <= Duration::from_millis(1),
            "expected ~{expected:?}, got {actual:?}"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_sequence_order_and_timing_with_wait_step() {
        // Arrange: [v x1, wait 0.2s, x x2] with 0.1s delay
        let sink = Arc::new(MockKeyOutput::new());
        let action = Action::new(vec![
            ActionStep::tap(key('v')),
            ActionStep::wait(Duration::from_millis(200)),
            ActionStep::key(key('x'), NonZeroU32::new(2).unwrap()),
        ])
        .with_delay(Duration::from_millis(100));
        let start = tokio::time::Instant::now();

        // Act
        let report = executor(action, &sink).run().await;

        // Assert: exact call order
        let events = sink.events();
        let calls: Vec<KeyEvent> = events.iter().map(|(e, _)| e.clone()).collect();
        assert_eq!(
            calls,
            vec![
                KeyEvent::Press(key('v')),
                KeyEvent::Release(key('v')),
                KeyEvent::Press(key('x')),
                KeyEvent::Release(key('x')),
                KeyEvent::Press(key('x')),
                KeyEvent::Release(key('x')),
            ]
        );

        // Assert: timing (v released at 100ms, wait runs 200..400ms)
        let offsets: Vec<Duration> = events.iter().map(|(_, at)| *at - start).collect();
        for (offset, expected) in offsets.iter().zip([0, 100, 400, 500, 600, 700]) {
            assert_near(*offset, expected);
        }
        assert_near(start.elapsed(), 800);
        assert_eq!(report.final_state, ExecutorState::Completed);
        assert_eq!(report.presses, 3);
        assert_eq!(report.sink_faults, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failing_pre_hook_skips_steps_and_post_hook() {
        // Arrange
        let sink = Arc::new(MockKeyOutput::new());
        let pre = CountingHook::new(true);
        let post = CountingHook::new(false);
        let action = Action::new(vec![ActionStep::tap(key('v'))])
            .with_pre_hook(pre.clone())
            .with_post_hook(post.clone());

        // Act
        let report = executor(action, &sink).run().await;

        // Assert
        assert!(report.aborted);
        assert_eq!(report.final_state, ExecutorState::PreHook);
        assert!(sink.events().is_empty());
        assert_eq!(pre.calls.load(Ordering::SeqCst), 1);
        assert_eq!(post.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hooks_run_around_steps() {
        // Arrange
        let sink = Arc::new(MockKeyOutput::new());
        let pre = CountingHook::new(false);
        let post = CountingHook::new(true);
        let action = Action::new(vec![ActionStep::tap(key('c'))])
            .with_pre_hook(pre.clone())
            .with_post_hook(post.clone());

        // Act
        let report = executor(action, &sink).run().await;

        // Assert
        assert!(!report.aborted);
        assert!(report.post_hook_failed);
        assert_eq!(sink.events().len(), 2);
        assert_eq!(post.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sink_faults_are_counted_and_execution_continues() {
        // Arrange
        let sink = Arc::new(MockKeyOutput::failing());
        let action = Action::new(vec![
            ActionStep::tap(key('v')),
            ActionStep::key(key('x'), NonZeroU32::new(2).unwrap()),
        ]);

        // Act
        let report = executor(action, &sink).run().await;

        // Assert: every press and release failed, none were retried
        assert_eq!(report.final_state, ExecutorState::Completed);
        assert_eq!(report.presses, 3);
        assert_eq!(report.sink_faults, 6);
        assert!(sink.events().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_delay_runs_without_advancing_clock() {
        let sink = Arc::new(MockKeyOutput::new());
        let action = Action::new(vec![ActionStep::tap(key('z'))]).with_delay(Duration::ZERO);
        let start = tokio::time::Instant::now();

        executor(action, &sink).run().await;

        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(sink.events().len(), 2);
    }
}
