//! Per-question countdown timer.
//!
//! Each `start`/`reset` begins a new cycle backed by its own task. Signals are
//! tagged with their cycle and [`CountdownTimer::next_event`] drops anything
//! from an older cycle, so once `reset` or `stop` returns no tick or expiry of
//! the previous cycle can be observed, even if it was already queued.

use std::time::Duration;

use tokio::{sync::mpsc, task::JoinHandle, time::Instant};

/// Shortest tick interval; a zero period would make `interval_at` panic
pub const MIN_TICK_INTERVAL: Duration = Duration::from_millis(1);

/// Observable countdown event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// One interval elapsed; `remaining` seconds are left
    Tick { remaining: u32 },
    /// The countdown reached zero; sent once per cycle
    Expired,
}

#[derive(Debug)]
struct Signal {
    cycle: u64,
    event: TimerEvent,
}

/// Countdown owned by the session driver
pub struct CountdownTimer {
    tick_interval: Duration,
    tx: mpsc::UnboundedSender<Signal>,
    rx: mpsc::UnboundedReceiver<Signal>,
    cycle: u64,
    task: Option<JoinHandle<()>>,
}

impl CountdownTimer {
    /// Create a stopped timer
    ///
    /// `tick_interval` is one second in production; tests shorten it. It is
    /// raised to [`MIN_TICK_INTERVAL`] if shorter.
    pub fn new(tick_interval: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tick_interval: tick_interval.max(MIN_TICK_INTERVAL),
            tx,
            rx,
            cycle: 0,
            task: None,
        }
    }

    /// Start counting down from `duration_secs`
    ///
    /// Cancels a running cycle first, exactly like [`reset`](Self::reset).
    pub fn start(&mut self, duration_secs: u32) {
        self.reset(duration_secs);
    }

    /// Cancel the current cycle and start a new one from `duration_secs`
    pub fn reset(&mut self, duration_secs: u32) {
        self.cancel();
        tracing::debug!("Countdown cycle {} started ({}s)", self.cycle, duration_secs);
        self.task = Some(tokio::spawn(count_down(
            self.cycle,
            duration_secs,
            self.tick_interval,
            self.tx.clone(),
        )));
    }

    /// Cancel the current cycle; its expiry will not be observed
    pub fn stop(&mut self) {
        self.cancel();
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Wait for the next event of the current cycle
    ///
    /// Pending forever while stopped. Cancel safe.
    pub async fn next_event(&mut self) -> TimerEvent {
        loop {
            match self.rx.recv().await {
                Some(signal) if signal.cycle == self.cycle => return signal.event,
                Some(stale) => {
                    tracing::trace!("Dropping {:?} from cycle {}", stale.event, stale.cycle);
                }
                // The sender half lives in `self`, so the channel never closes.
                None => std::future::pending::<()>().await,
            }
        }
    }

    fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.cycle += 1;
    }
}

impl Drop for CountdownTimer {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn count_down(
    cycle: u64,
    duration_secs: u32,
    tick_interval: Duration,
    tx: mpsc::UnboundedSender<Signal>,
) {
    let mut ticker = tokio::time::interval_at(Instant::now() + tick_interval, tick_interval);
    let mut remaining = duration_secs;

    while remaining > 0 {
        ticker.tick().await;
        remaining -= 1;
        let tick = Signal {
            cycle,
            event: TimerEvent::Tick { remaining },
        };
        if tx.send(tick).is_err() {
            return;
        }
    }

    let _ = tx.send(Signal {
        cycle,
        event: TimerEvent::Expired,
    });
}
