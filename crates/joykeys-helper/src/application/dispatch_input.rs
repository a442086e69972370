//! Dispatcher: turns raw input events into running key sequences.
//!
//! This use case is the heart of the helper.  It receives raw events from the
//! input source, names them, updates the momentary state, consults the
//! [`ActionRegistry`], and spawns a [`SequenceExecutor`] for every trigger
//! that passes its modifier gate.
//!
//! # Event handling (for beginners)
//!
//! | Event        | State update                    | Dispatch?                       |
//! |--------------|---------------------------------|---------------------------------|
//! | `ButtonDown` | mark `BUTTON_i` held            | yes, `BUTTON_i`                 |
//! | `ButtonUp`   | mark `BUTTON_i` released        | no                              |
//! | `HatMotion`  | remember the hat's direction    | only if the direction changed   |
//! | `KeyDown`    | mark the key held               | yes, the key's identifier       |
//! | `KeyUp`      | mark the key released           | no                              |
//!
//! Returning a hat to the middle is a change too, so `HAT_0_centered` can be
//! mapped like any other direction.
//!
//! # Concurrency
//!
//! The event loop never waits for a sequence.  Each executor runs as its own
//! Tokio task tracked in a [`JoinSet`], so two triggers in quick succession
//! produce two overlapping sequences.  An optional cap limits how many may be
//! in flight; triggers over the cap are dropped.
//!
//! # Shutdown
//!
//! When the loop stops, sequences still running are either given a grace
//! period to finish ([`ShutdownPolicy::Drain`]) or aborted at once
//! ([`ShutdownPolicy::Cancel`]).  A reload never cancels anything.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

use joykeys_core::{CanonicalEventId, EventNamer, HatDirection};
use serde::{Deserialize, Serialize};
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, warn};

use super::action_registry::ActionRegistry;
use super::execute_sequence::{ExecutionReport, KeyOutput, SequenceExecutor};
use super::momentary_state::MomentaryState;
use crate::infrastructure::input_capture::RawInputEvent;

/// Idle sleep between polls of an empty event channel.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// How long [`ShutdownPolicy::Drain`] waits before aborting stragglers.
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// What happens to running sequences when the event loop stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShutdownPolicy {
    /// Let sequences finish within the grace period, then abort the rest.
    #[default]
    Drain,
    /// Abort every sequence immediately.
    Cancel,
}

/// Tunables for the [`Dispatcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatcherSettings {
    pub poll_interval: Duration,
    /// Maximum concurrent sequences; `None` is unbounded.
    pub max_in_flight: Option<usize>,
    pub shutdown_policy: ShutdownPolicy,
    pub shutdown_grace: Duration,
}

impl Default for DispatcherSettings {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_in_flight: None,
            shutdown_policy: ShutdownPolicy::Drain,
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
        }
    }
}

/// Result of one dispatch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// No mapping for the trigger.
    Unmapped,
    /// The mapping requires a modifier that is not held.
    ModifierNotHeld,
    /// The in-flight cap was reached; the trigger was dropped.
    CapacityExceeded,
    /// A sequence executor was started.
    Spawned,
}

/// What happened to running sequences at shutdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Sequences that ran to completion after the loop stopped.
    pub drained: usize,
    /// Sequences that were aborted.
    pub aborted: usize,
}

/// The event loop state: momentary input state plus the running executors.
pub struct Dispatcher {
    registry: Arc<ActionRegistry>,
    sink: Arc<dyn KeyOutput>,
    namer: EventNamer,
    state: MomentaryState,
    tasks: JoinSet<ExecutionReport>,
    settings: DispatcherSettings,
}

impl Dispatcher {
    /// Creates a dispatcher with empty momentary state.
    pub fn new(
        registry: Arc<ActionRegistry>,
        sink: Arc<dyn KeyOutput>,
        namer: EventNamer,
        settings: DispatcherSettings,
    ) -> Self {
        Self {
            registry,
            sink,
            namer,
            state: MomentaryState::new(),
            tasks: JoinSet::new(),
            settings,
        }
    }

    /// Read-only view of the momentary state.
    pub fn state(&self) -> &MomentaryState {
        &self.state
    }

    /// Number of sequences started and not yet reaped.
    pub fn in_flight(&self) -> usize {
        self.tasks.len()
    }

    /// Processes one raw event.
    ///
    /// Returns the dispatch outcome for events that trigger a lookup, `None`
    /// for releases and repeated hat samples.  Must be called from within a
    /// Tokio runtime.
    pub fn handle_event(&mut self, event: RawInputEvent) -> Option<DispatchOutcome> {
        match event {
            RawInputEvent::ButtonDown { device, button } => {
                let id = self.namer.button(device, button);
                self.state.on_press(id.clone());
                Some(self.attempt_dispatch(&id))
            }
            RawInputEvent::ButtonUp { device, button } => {
                let id = self.namer.button(device, button);
                self.state.on_release(id.as_str());
                None
            }
            RawInputEvent::HatMotion { device, hat, x, y } => {
                let direction = HatDirection::from_axes(x, y);
                let hat_id = self.namer.hat(device, hat);
                if !self.state.on_hat_sample(hat_id, direction) {
                    return None;
                }
                let id = self.namer.hat_event(device, hat, direction);
                Some(self.attempt_dispatch(&id))
            }
            RawInputEvent::KeyDown { key } => {
                let id = self.namer.key(&key);
                self.state.on_press(id.clone());
                Some(self.attempt_dispatch(&id))
            }
            RawInputEvent::KeyUp { key } => {
                let id = self.namer.key(&key);
                self.state.on_release(id.as_str());
                None
            }
        }
    }

    /// Looks `id` up, checks its modifier and the in-flight cap, and starts
    /// an executor.  Never waits for the sequence.
    pub fn attempt_dispatch(&mut self, id: &CanonicalEventId) -> DispatchOutcome {
        debug!(trigger = %id, "dispatch");
        let Some(action) = self.registry.lookup(id.as_str()) else {
            return DispatchOutcome::Unmapped;
        };

        if let Some(modifier) = &action.required_modifier {
            if !self.state.is_held(modifier.as_str()) {
                debug!(trigger = %id, %modifier, "modifier not held, ignoring");
                return DispatchOutcome::ModifierNotHeld;
            }
        }

        self.reap_finished();
        if let Some(cap) = self.settings.max_in_flight {
            if self.tasks.len() >= cap {
                warn!(trigger = %id, cap, "too many sequences in flight, dropping trigger");
                return DispatchOutcome::CapacityExceeded;
            }
        }

        info!(trigger = %id, steps = action.steps.len(), "starting sequence");
        let executor = SequenceExecutor::new(id.clone(), action, Arc::clone(&self.sink));
        self.tasks.spawn(executor.run());
        DispatchOutcome::Spawned
    }

    /// Runs the event loop until `running` is cleared or the source hangs up,
    /// then applies the shutdown policy.
    ///
    /// Events are handled strictly in arrival order.  When the channel is
    /// empty the loop sleeps for the poll interval.
    pub async fn run(
        &mut self,
        events: mpsc::Receiver<RawInputEvent>,
        running: Arc<AtomicBool>,
    ) -> ShutdownReport {
        info!(mappings = self.registry.len(), "dispatcher running");
        while running.load(Ordering::SeqCst) {
            match events.try_recv() {
                Ok(event) => {
                    self.handle_event(event);
                }
                Err(TryRecvError::Empty) => {
                    self.reap_finished();
                    tokio::time::sleep(self.settings.poll_interval).await;
                }
                Err(TryRecvError::Disconnected) => {
                    info!("input source closed");
                    break;
                }
            }
        }
        self.shutdown().await
    }

    /// Drains or cancels all running sequences according to the policy.
    pub async fn shutdown(&mut self) -> ShutdownReport {
        let mut report = ShutdownReport::default();
        if self.tasks.is_empty() {
            return report;
        }
        info!(in_flight = self.tasks.len(), policy = ?self.settings.shutdown_policy, "stopping");

        if self.settings.shutdown_policy == ShutdownPolicy::Drain {
            let tasks = &mut self.tasks;
            let drained = &mut report.drained;
            let waited = tokio::time::timeout(self.settings.shutdown_grace, async {
                while let Some(result) = tasks.join_next().await {
                    if log_finished(result) {
                        *drained += 1;
                    }
                }
            })
            .await;
            if waited.is_err() {
                warn!(remaining = tasks.len(), "grace period elapsed, aborting sequences");
            }
        }

        self.tasks.abort_all();
        while let Some(result) = self.tasks.join_next().await {
            match result {
                Err(e) if e.is_cancelled() => report.aborted += 1,
                other => {
                    if log_finished(other) {
                        report.drained += 1;
                    }
                }
            }
        }
        report
    }

    fn reap_finished(&mut self) {
        while let Some(result) = self.tasks.try_join_next() {
            log_finished(result);
        }
    }
}

/// Logs a finished executor.  Returns `true` if it completed normally.
fn log_finished(result: Result<ExecutionReport, JoinError>) -> bool {
    match result {
        Ok(report) => {
            debug!(
                trigger = %report.trigger,
                presses = report.presses,
                sink_faults = report.sink_faults,
                aborted = report.aborted,
                "sequence finished"
            );
            true
        }
        Err(e) if e.is_cancelled() => false,
        Err(e) => {
            error!("sequence task panicked: {e}");
            false
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
