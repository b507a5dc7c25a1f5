//! A tick source that advances a universe at a fixed rate.

use crate::{error::Error, universe::Universe};
use serde::{Deserialize, Serialize};
use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
    sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError},
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

/// How often a [`Clock`] ticks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TickRate {
    /// Does not tick at all.
    Halt,
    /// Every 500 milliseconds.
    Agonizing,
    /// Every 150 milliseconds.
    Slow,
    /// Every 70 milliseconds.
    #[default]
    Medium,
    /// Every 30 milliseconds.
    Fast,
}

impl TickRate {
    /// Time between two ticks. `None` for [`TickRate::Halt`].
    pub fn period(self) -> Option<Duration> {
        match self {
            TickRate::Halt => None,
            TickRate::Agonizing => Some(Duration::from_millis(500)),
            TickRate::Slow => Some(Duration::from_millis(150)),
            TickRate::Medium => Some(Duration::from_millis(70)),
            TickRate::Fast => Some(Duration::from_millis(30)),
        }
    }

    /// Whether a clock at this rate ticks at all.
    #[inline]
    pub fn is_running(self) -> bool {
        self != TickRate::Halt
    }
}

impl FromStr for TickRate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "halt" => Ok(TickRate::Halt),
            "agonizing" => Ok(TickRate::Agonizing),
            "slow" => Ok(TickRate::Slow),
            "medium" => Ok(TickRate::Medium),
            "fast" => Ok(TickRate::Fast),
            _ => Err(String::from("invalid tick rate")),
        }
    }
}

impl Display for TickRate {
    fn fmt(&self, f: &mut Formatter) -> Result<(), fmt::Error> {
        let s = match self {
            TickRate::Halt => "halt",
            TickRate::Agonizing => "agonizing",
            TickRate::Slow => "slow",
            TickRate::Medium => "medium",
            TickRate::Fast => "fast",
        };
        write!(f, "{}", s)?;
        Ok(())
    }
}

#[derive(Debug)]
struct ClockState {
    rate: TickRate,
    /// The rate to go back to when resumed.
    last_running: TickRate,
    /// Single steps requested but not yet delivered.
    pending_steps: usize,
    /// The rate changed, so the schedule starts over.
    reschedule: bool,
    shutdown: bool,
}

#[derive(Debug)]
struct Shared {
    state: Mutex<ClockState>,
    wake: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, ClockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn update<F: FnOnce(&mut ClockState)>(&self, f: F) {
        f(&mut self.lock());
        self.wake.notify_all();
    }
}

/// Calls a tick function on its own thread, at a fixed [`TickRate`].
///
/// The first tick comes right after the clock starts. If a tick takes
/// longer than the period, the next one comes immediately, but the missed
/// ones are not made up for.
///
/// Halting the clock only cancels future ticks: a tick that has already
/// started always finishes.
///
/// Dropping the clock stops the thread.
#[derive(Debug)]
pub struct Clock {
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl Clock {
    /// Starts a clock that calls `tick` at the given rate.
    pub fn new<F>(rate: TickRate, tick: F) -> Result<Self, Error>
    where
        F: FnMut() + Send + 'static,
    {
        let shared = Arc::new(Shared {
            state: Mutex::new(ClockState {
                rate,
                last_running: if rate.is_running() {
                    rate
                } else {
                    TickRate::default()
                },
                pending_steps: 0,
                reschedule: false,
                shutdown: false,
            }),
            wake: Condvar::new(),
        });
        let worker = thread::Builder::new()
            .name(String::from("clock"))
            .spawn({
                let shared = Arc::clone(&shared);
                move || run(&shared, tick)
            })?;
        Ok(Clock {
            shared,
            worker: Some(worker),
        })
    }

    /// Starts a clock that advances `universe` one generation per tick.
    pub fn for_universe(universe: Arc<Mutex<Universe>>, rate: TickRate) -> Result<Self, Error> {
        Clock::new(rate, move || {
            universe
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .tick();
        })
    }

    /// The current rate.
    pub fn tick_rate(&self) -> TickRate {
        self.shared.lock().rate
    }

    /// Whether the clock is ticking on its own.
    pub fn is_running(&self) -> bool {
        self.tick_rate().is_running()
    }

    /// Changes the rate. The next tick comes immediately, unless the new
    /// rate is [`TickRate::Halt`].
    pub fn set_tick_rate(&self, rate: TickRate) {
        log::debug!("Tick rate set to {}", rate);
        self.shared.update(|state| {
            state.rate = rate;
            if rate.is_running() {
                state.last_running = rate;
            }
            state.reschedule = true;
        });
    }

    /// Stops ticking.
    pub fn halt(&self) {
        self.set_tick_rate(TickRate::Halt);
    }

    /// Goes back to the rate before the clock was halted.
    pub fn resume(&self) {
        let rate = self.shared.lock().last_running;
        self.set_tick_rate(rate);
    }

    /// Delivers exactly one extra tick, whether the clock is running or not.
    pub fn single_step(&self) {
        self.shared.update(|state| state.pending_steps += 1);
    }
}

impl Drop for Clock {
    fn drop(&mut self) {
        self.shared.update(|state| state.shutdown = true);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("The clock thread panicked");
            }
        }
    }
}

/// The loop of the clock thread.
fn run<F: FnMut()>(shared: &Shared, mut tick: F) {
    let mut due: Option<Instant> = None;
    let mut state = shared.lock();
    loop {
        if state.shutdown {
            return;
        }
        if state.reschedule {
            state.reschedule = false;
            due = None;
        }
        if state.pending_steps > 0 {
            state.pending_steps -= 1;
            drop(state);
            tick();
            state = shared.lock();
            continue;
        }
        let period = match state.rate.period() {
            Some(period) => period,
            None => {
                due = None;
                state = shared
                    .wake
                    .wait(state)
                    .unwrap_or_else(PoisonError::into_inner);
                continue;
            }
        };
        let now = Instant::now();
        let deadline = *due.get_or_insert(now);
        if now < deadline {
            state = shared
                .wake
                .wait_timeout(state, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
            continue;
        }
        due = Some((deadline + period).max(now));
        drop(state);
        tick();
        state = shared.lock();
    }
}
