//=========================================================================
// Event Queue
//=========================================================================
//
// Bounded, ordered hand-off of host events to the render thread.
//
// Architecture:
// ```text
//   Host thread                         Render thread
//   ───────────                         ─────────────
//   push(event) ──► Mutex<VecDeque> ──► drain_all()   (once per frame)
//        │                                  ▲
//        └──── doorbell (bounded(1)) ───────┘ wait_for_events() while paused
// ```
//
// The ring buffer is swapped out under one critical section per drain,
// so a drain observes a prefix of the push sequence and never splits
// or reorders it. Pushes never block: overflow is resolved by the
// queue's `OverflowPolicy`, and the doorbell uses `try_send`.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use log::{error, trace, warn};
use serde::{Deserialize, Serialize};

//=== Internal Dependencies ===============================================

use super::event::Event;

//=== OverflowPolicy ======================================================

/// What happens to input once the queue is at capacity.
///
/// Lifecycle and surface events are never the victim while there is an
/// input event that can make room for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Evict the oldest queued input event to admit the new one.
    #[default]
    DropOldest,
    /// Reject the incoming input event.
    DropNewest,
}

//=== PushOutcome =========================================================

/// Result of a [`EventQueue::push`]. Never an error: overflow is policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    Queued,
    /// Queued after evicting the oldest input event.
    QueuedEvictedOldest,
    /// The pushed event itself was dropped.
    Dropped,
}

impl PushOutcome {
    pub fn is_queued(self) -> bool {
        !matches!(self, Self::Dropped)
    }
}

//=== EventQueue ==========================================================

/// Thread-safe bounded FIFO between the host and the render thread.
pub struct EventQueue {
    events: Mutex<VecDeque<Event>>,
    capacity: usize,
    policy: OverflowPolicy,
    dropped: AtomicU64,
    doorbell_tx: Sender<()>,
    doorbell_rx: Receiver<()>,
}

impl EventQueue {
    //--- Construction -----------------------------------------------------

    /// Creates a queue holding at most `capacity` events.
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn new(capacity: usize, policy: OverflowPolicy) -> Self {
        assert!(capacity > 0, "Queue capacity must be positive");

        let (doorbell_tx, doorbell_rx) = bounded(1);
        Self {
            events: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            policy,
            dropped: AtomicU64::new(0),
            doorbell_tx,
            doorbell_rx,
        }
    }

    //--- Producer Side ----------------------------------------------------

    /// Enqueues `event` without blocking.
    pub fn push(&self, event: Event) -> PushOutcome {
        let outcome = {
            let mut events = self.lock();
            if events.len() < self.capacity {
                events.push_back(event);
                PushOutcome::Queued
            } else {
                self.resolve_overflow(&mut events, event)
            }
        };

        match outcome {
            PushOutcome::Queued => {}
            PushOutcome::QueuedEvictedOldest | PushOutcome::Dropped => self.record_drop(),
        }

        if outcome.is_queued() {
            self.ring();
        }
        outcome
    }

    /// Wakes a render thread blocked in [`wait_for_events`](Self::wait_for_events)
    /// without queuing anything.
    pub fn wake(&self) {
        self.ring();
    }

    //--- Consumer Side ----------------------------------------------------

    /// Takes every queued event, oldest first.
    pub fn drain_all(&self) -> Vec<Event> {
        let mut out = Vec::new();
        self.drain_into(&mut out);
        out
    }

    /// Appends every queued event to `out`, oldest first.
    ///
    /// Reuses the caller's allocation; the render loop keeps one buffer
    /// alive across frames.
    pub fn drain_into(&self, out: &mut Vec<Event>) {
        let mut events = self.lock();
        out.extend(events.drain(..));
    }

    /// Blocks until something was pushed (or [`wake`](Self::wake) was
    /// called) or `timeout` elapsed. Returns `true` when woken early.
    pub fn wait_for_events(&self, timeout: Duration) -> bool {
        if !self.is_empty() {
            return true;
        }
        match self.doorbell_rx.recv_timeout(timeout) {
            Ok(()) => true,
            Err(RecvTimeoutError::Timeout) => false,
            // The queue owns both ends; unreachable in practice.
            Err(RecvTimeoutError::Disconnected) => false,
        }
    }

    //--- Queries ----------------------------------------------------------

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn policy(&self) -> OverflowPolicy {
        self.policy
    }

    /// Total events lost to the overflow policy since creation.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    //--- Internal Helpers -------------------------------------------------

    fn lock(&self) -> MutexGuard<'_, VecDeque<Event>> {
        // Every critical section is a single push/evict/drain, so a
        // poisoned lock still guards a consistent deque.
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn resolve_overflow(&self, events: &mut VecDeque<Event>, event: Event) -> PushOutcome {
        if event.is_input() && self.policy == OverflowPolicy::DropNewest {
            return PushOutcome::Dropped;
        }

        match events.iter().position(Event::is_input) {
            Some(oldest_input) => {
                events.remove(oldest_input);
                events.push_back(event);
                PushOutcome::QueuedEvictedOldest
            }
            None => {
                error!(
                    target: "queue",
                    "Queue full of critical events ({}), dropping {:?}",
                    self.capacity,
                    event
                );
                PushOutcome::Dropped
            }
        }
    }

    fn record_drop(&self) {
        let total = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
        if total.is_power_of_two() {
            warn!(
                target: "queue",
                "Event queue overflow ({:?}): {} events dropped so far",
                self.policy,
                total
            );
        }
    }

    fn ring(&self) {
        // A full doorbell already means "something happened".
        if self.doorbell_tx.try_send(()).is_err() {
            trace!(target: "queue", "Doorbell already rung");
        }
    }
}

impl std::fmt::Debug for EventQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventQueue")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .field("policy", &self.policy)
            .field("dropped", &self.dropped())
            .finish()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
