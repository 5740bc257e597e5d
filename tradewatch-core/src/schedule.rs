//! Interval timer that drives the pipeline.
//!
//! Ticks fire strictly one after another on the calling thread, so two runs
//! never overlap. A handler that overruns its interval makes the next tick
//! fire immediately and marks it past due; slots missed in between collapse
//! into that one tick.

use crate::config::ScheduleConfig;
use std::time::{Duration, Instant};
use tracing::debug;

/// Passed to the handler on every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerInfo {
    /// Zero-based tick counter.
    pub tick: u64,
    /// How long after its slot the tick actually fired.
    pub lateness: Duration,
    pub past_due: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    interval: Duration,
    run_on_startup: bool,
    grace: Duration,
}

impl Schedule {
    pub fn new(interval: Duration, run_on_startup: bool, grace: Duration) -> Self {
        Self {
            interval,
            run_on_startup,
            grace,
        }
    }

    pub fn from_config(config: &ScheduleConfig) -> Self {
        Self::new(
            Duration::from_secs(config.interval_secs),
            config.run_on_startup,
            Duration::from_secs(config.past_due_grace_secs),
        )
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn first_slot(&self, start: Instant) -> Instant {
        if self.run_on_startup {
            start
        } else {
            start + self.interval
        }
    }

    /// The slot after `scheduled`, or the latest slot not after `now` when
    /// one or more slots were missed.
    pub fn next_slot(&self, scheduled: Instant, now: Instant) -> Instant {
        let next = scheduled + self.interval;
        if next > now || self.interval.is_zero() {
            return next;
        }
        let missed = (now - next).as_nanos() / self.interval.as_nanos();
        let skip = self.interval.as_nanos().saturating_mul(missed);
        next + Duration::from_nanos(u64::try_from(skip).unwrap_or(u64::MAX))
    }

    pub fn timer_info(&self, tick: u64, scheduled: Instant, fired: Instant) -> TimerInfo {
        let lateness = fired.saturating_duration_since(scheduled);
        TimerInfo {
            tick,
            lateness,
            past_due: lateness > self.grace,
        }
    }

    /// Fire `handler` on every slot until `max_ticks` ticks have run, or
    /// forever when `max_ticks` is `None`.
    pub fn run<F>(&self, max_ticks: Option<u64>, mut handler: F)
    where
        F: FnMut(&TimerInfo),
    {
        let mut scheduled = self.first_slot(Instant::now());
        let mut tick = 0u64;

        while max_ticks.map_or(true, |max| tick < max) {
            let now = Instant::now();
            if scheduled > now {
                debug!(wait_secs = (scheduled - now).as_secs(), "sleeping until next tick");
                std::thread::sleep(scheduled - now);
            }

            let info = self.timer_info(tick, scheduled, Instant::now());
            handler(&info);

            tick += 1;
            scheduled = self.next_slot(scheduled, Instant::now());
        }
    }
}
