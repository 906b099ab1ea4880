use crate::events::{DojoEvent, EventBus};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Result of advancing a countdown by one second
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownTick {
    /// Seconds left to display
    Remaining(u32),
    /// Zero was reached on this tick; completion must fire now
    Completed,
    /// Already completed, nothing left to do
    Idle,
}

/// Pure countdown state, advanced once per second by [`Countdown`].
///
/// Starting from `N`, successive ticks yield `Remaining(N-1) .. Remaining(0)`
/// followed by a single `Completed`.
#[derive(Debug, Clone)]
pub struct CountdownState {
    remaining: u32,
    completed: bool,
}

impl CountdownState {
    pub fn new(seconds: u32) -> Self {
        Self {
            remaining: seconds,
            completed: false,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn tick(&mut self) -> CountdownTick {
        if self.completed {
            return CountdownTick::Idle;
        }

        if self.remaining == 0 {
            self.completed = true;
            return CountdownTick::Completed;
        }

        self.remaining -= 1;
        CountdownTick::Remaining(self.remaining)
    }
}

/// Restartable one-shot countdown that ticks once per second
pub struct Countdown {
    seconds: u32,
    event_bus: Option<Arc<EventBus>>,
    active: Option<CountdownHandle>,
}

/// Handle to a running countdown activation
#[derive(Debug, Clone)]
pub struct CountdownHandle {
    token: CancellationToken,
}

impl CountdownHandle {
    /// Stop the countdown; its completion will not fire
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Countdown {
    pub fn new(seconds: u32) -> Self {
        Self {
            seconds,
            event_bus: None,
            active: None,
        }
    }

    /// Publish tick and completion events on the given bus
    pub fn with_event_bus(mut self, event_bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    pub fn seconds(&self) -> u32 {
        self.seconds
    }

    /// Start a new activation, cancelling any previous one.
    ///
    /// `on_tick` receives every intermediate value, `on_complete` runs at most
    /// once for this activation.
    pub fn start<T, C>(&mut self, mut on_tick: T, on_complete: C) -> CountdownHandle
    where
        T: FnMut(u32) + Send + 'static,
        C: FnOnce() + Send + 'static,
    {
        if let Some(previous) = self.active.take() {
            debug!("Restarting countdown; cancelling previous activation");
            previous.cancel();
        }

        let handle = CountdownHandle {
            token: CancellationToken::new(),
        };
        let token = handle.token.clone();
        let event_bus = self.event_bus.clone();
        let seconds = self.seconds;

        info!("Starting {}s countdown", seconds);

        tokio::spawn(async move {
            let mut state = CountdownState::new(seconds);
            let mut on_complete = Some(on_complete);
            let period = Duration::from_secs(1);
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = token.cancelled() => {
                        debug!("Countdown cancelled with {} remaining", state.remaining());
                        return;
                    }
                    _ = ticker.tick() => {}
                }

                match state.tick() {
                    CountdownTick::Remaining(remaining) => {
                        on_tick(remaining);
                        if let Some(bus) = &event_bus {
                            let _ = bus.publish(DojoEvent::CountdownTick { remaining });
                        }
                        // Zero is shown and completion fires on the same tick
                        if remaining == 0 {
                            state.tick();
                            break;
                        }
                    }
                    CountdownTick::Completed => break,
                    CountdownTick::Idle => return,
                }
            }

            if token.is_cancelled() {
                return;
            }
            if let Some(bus) = &event_bus {
                let _ = bus.publish(DojoEvent::CountdownFinished {
                    timestamp: SystemTime::now(),
                });
            }
            if let Some(complete) = on_complete.take() {
                complete();
            }
        });

        self.active = Some(handle.clone());
        handle
    }

    /// Cancel the running activation, if any
    pub fn cancel(&mut self) {
        if let Some(active) = self.active.take() {
            active.cancel();
        }
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.cancel();
    }
}
