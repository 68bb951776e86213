//! Refresh clock
//!
//! Two-state machine (`Idle`, `Refreshing`) driven by a periodic timer or a
//! manual trigger. At most one refresh is in flight; a trigger that arrives
//! while refreshing is coalesced. Timers come from an injectable
//! [`Scheduler`] so tests can drive time by hand.
//!
//! Timer lifetime is tied to [`TimerHandle`]: cancelling or dropping the
//! handle guarantees the callback never runs again.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Local};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Shortest accepted refresh period.
pub const MIN_PERIOD: Duration = Duration::from_secs(1);

/// Callback invoked on every timer tick.
pub type TickCallback = Box<dyn FnMut() + Send>;

/// Something that can run a callback periodically until cancelled.
pub trait Scheduler {
    /// Arm a timer that calls `callback` once per `period`, first after one
    /// full period.
    fn schedule_periodic(&self, period: Duration, callback: TickCallback) -> TimerHandle;
}

/// Cancellation handle for an armed timer. Cancels on drop.
#[derive(Debug)]
pub struct TimerHandle {
    token: CancellationToken,
}

impl TimerHandle {
    #[must_use]
    pub fn new(token: CancellationToken) -> Self {
        Self { token }
    }

    /// Disarm the timer. Calling this more than once is a no-op.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Scheduler backed by a tokio task per timer.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    handle: tokio::runtime::Handle,
}

impl TokioScheduler {
    #[must_use]
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        Self { handle }
    }

    /// Scheduler on the runtime of the calling task.
    ///
    /// # Panics
    /// Panics when called outside a tokio runtime.
    #[must_use]
    pub fn current() -> Self {
        Self::new(tokio::runtime::Handle::current())
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_periodic(&self, period: Duration, mut callback: TickCallback) -> TimerHandle {
        let token = CancellationToken::new();
        let cancel = token.clone();
        let period = period.max(MIN_PERIOD);

        self.handle.spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately
            interval.tick().await;

            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    _ = interval.tick() => callback(),
                }
            }
            tracing::debug!("Refresh timer task exited");
        });

        TimerHandle::new(token)
    }
}

struct ManualTimer {
    period: Duration,
    elapsed: Duration,
    token: CancellationToken,
    callback: TickCallback,
}

/// Deterministic scheduler whose time only moves when [`advance`](Self::advance)
/// is called.
///
/// Callbacks run on the caller's thread inside `advance` and must not
/// schedule new timers on the same scheduler.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    timers: Arc<Mutex<Vec<ManualTimer>>>,
}

impl ManualScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward, firing each live timer once per whole period elapsed.
    pub fn advance(&self, by: Duration) {
        let mut timers = self.timers.lock().unwrap_or_else(PoisonError::into_inner);
        timers.retain(|t| !t.token.is_cancelled());

        for timer in timers.iter_mut() {
            timer.elapsed += by;
            while timer.elapsed >= timer.period {
                if timer.token.is_cancelled() {
                    break;
                }
                timer.elapsed -= timer.period;
                (timer.callback)();
            }
        }
    }

    /// Number of timers that are armed and not cancelled.
    #[must_use]
    pub fn armed(&self) -> usize {
        self.timers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|t| !t.token.is_cancelled())
            .count()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_periodic(&self, period: Duration, callback: TickCallback) -> TimerHandle {
        let token = CancellationToken::new();
        self.timers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(ManualTimer {
                period: period.max(MIN_PERIOD),
                elapsed: Duration::ZERO,
                token: token.clone(),
                callback,
            });
        TimerHandle::new(token)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshPhase {
    #[default]
    Idle,
    Refreshing,
}

/// Refresh state machine plus the armed timer, if any.
#[derive(Debug)]
pub struct RefreshClock {
    period: Duration,
    phase: RefreshPhase,
    last_updated: Option<DateTime<Local>>,
    timer: Option<TimerHandle>,
}

impl RefreshClock {
    #[must_use]
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(MIN_PERIOD),
            phase: RefreshPhase::Idle,
            last_updated: None,
            timer: None,
        }
    }

    #[must_use]
    pub fn period(&self) -> Duration {
        self.period
    }

    #[must_use]
    pub fn phase(&self) -> RefreshPhase {
        self.phase
    }

    #[must_use]
    pub fn last_updated(&self) -> Option<DateTime<Local>> {
        self.last_updated
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.timer.as_ref().is_some_and(|t| !t.is_cancelled())
    }

    /// Arm the periodic timer, replacing (and cancelling) any previous one.
    pub fn arm(&mut self, scheduler: &dyn Scheduler, on_tick: TickCallback) {
        let handle = scheduler.schedule_periodic(self.period, on_tick);
        if self.timer.replace(handle).is_some() {
            tracing::debug!("Replaced armed refresh timer");
        }
        tracing::debug!(period_secs = self.period.as_secs(), "Refresh timer armed");
    }

    /// Disarm the timer. No tick fires after this returns.
    pub fn teardown(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
            tracing::debug!("Refresh timer disarmed");
        }
    }

    /// Enter `Refreshing`. Returns false, leaving the state alone, when a
    /// refresh is already in flight.
    pub fn begin(&mut self) -> bool {
        match self.phase {
            RefreshPhase::Refreshing => false,
            RefreshPhase::Idle => {
                self.phase = RefreshPhase::Refreshing;
                true
            }
        }
    }

    /// Successful refresh installed at `at`.
    pub fn finish(&mut self, at: DateTime<Local>) {
        self.phase = RefreshPhase::Idle;
        self.last_updated = Some(at);
    }

    /// Failed refresh: back to `Idle` without touching `last_updated`.
    pub fn abort(&mut self) {
        self.phase = RefreshPhase::Idle;
    }
}
