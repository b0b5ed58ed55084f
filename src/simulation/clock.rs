use std::time::Instant;

use chrono::{NaiveDateTime, TimeDelta};
use tracing::info;

/// Maps real elapsed time onto simulated time.
///
/// Consumers read simulated time only through [`SimulationClock::tick_at`], so
/// every computation inside one tick sees the same instant.
#[derive(Debug, Clone)]
pub struct SimulationClock {
    sim_start: NaiveDateTime,
    real_start: Instant,
    speed_multiplier: f64,
    period: std::time::Duration,
    stop_after: Option<TimeDelta>,
    stopped: bool,
}

impl SimulationClock {
    pub fn new(sim_start: NaiveDateTime, speed_multiplier: f64, period: std::time::Duration) -> Self {
        Self {
            sim_start,
            real_start: Instant::now(),
            speed_multiplier,
            period,
            stop_after: None,
            stopped: false,
        }
    }

    /// Stops ticking once `minutes` of simulated time have passed.
    pub fn with_stop_after(mut self, minutes: Option<u32>) -> Self {
        self.stop_after = minutes.map(|minutes| TimeDelta::minutes(minutes as i64));
        self
    }

    pub fn anchored_at(mut self, real_start: Instant) -> Self {
        self.real_start = real_start;
        self
    }

    pub fn period(&self) -> std::time::Duration {
        self.period
    }

    pub fn sim_start(&self) -> NaiveDateTime {
        self.sim_start
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn now_at(&self, real: Instant) -> NaiveDateTime {
        let elapsed = real.saturating_duration_since(self.real_start).as_secs_f64();
        let millis = (elapsed * self.speed_multiplier * 1000.0).round() as i64;
        self.sim_start + TimeDelta::milliseconds(millis)
    }

    /// Simulated time for the tick at `real`, `None` once stopped.
    pub fn tick_at(&mut self, real: Instant) -> Option<NaiveDateTime> {
        if self.stopped {
            return None;
        }
        let now = self.now_at(real);
        if let Some(stop_after) = self.stop_after
            && now - self.sim_start > stop_after
        {
            info!("Simulation stopped at {now}");
            self.stopped = true;
            return None;
        }
        Some(now)
    }

    /// Re-anchors both clocks without stopping the tick.
    pub fn restart(&mut self, sim_start: NaiveDateTime, real_start: Instant) {
        self.sim_start = sim_start;
        self.real_start = real_start;
        self.stopped = false;
    }

    /// Blocking iterator that yields simulated time once per period.
    pub fn ticks(&mut self) -> Ticks<'_> {
        Ticks {
            next: Instant::now(),
            clock: self,
        }
    }
}

pub struct Ticks<'a> {
    clock: &'a mut SimulationClock,
    next: Instant,
}

impl Iterator for Ticks<'_> {
    type Item = NaiveDateTime;

    fn next(&mut self) -> Option<Self::Item> {
        let now = Instant::now();
        if self.next > now {
            std::thread::sleep(self.next - now);
        }
        self.next += self.clock.period;
        self.clock.tick_at(Instant::now())
    }
}

#[cfg(test)]
fn start() -> NaiveDateTime {
    chrono::NaiveDate::from_ymd_opt(2024, 5, 6)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap()
}

#[test]
fn speed_multiplier_test() {
    let real = Instant::now();
    let clock = SimulationClock::new(start(), 15.0, std::time::Duration::from_secs(1))
        .anchored_at(real);
    let later = clock.now_at(real + std::time::Duration::from_secs(4));
    assert_eq!(later - start(), TimeDelta::minutes(1));
}

#[test]
fn stop_after_test() {
    let real = Instant::now();
    let mut clock = SimulationClock::new(start(), 60.0, std::time::Duration::from_secs(1))
        .with_stop_after(Some(2))
        .anchored_at(real);
    assert!(clock.tick_at(real + std::time::Duration::from_secs(2)).is_some());
    assert!(clock.tick_at(real + std::time::Duration::from_secs(3)).is_none());
    assert!(clock.is_stopped());
    assert!(clock.tick_at(real).is_none());

    clock.restart(start(), real);
    assert_eq!(clock.tick_at(real), Some(start()));
}
