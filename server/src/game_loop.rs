//! Fixed-rate tick driver.
//!
//! `GameLoop` owns the tick interval and turns wall-clock time into the `dt`
//! handed to `GameSimulation::tick`. The network server awaits
//! [`GameLoop::next_tick`] inside its `select!`, which keeps it the only
//! caller of `tick`.

use log::{info, warn};
use shared::{MAX_TICK_DT, TICK_RATE};
use std::time::Duration;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

pub struct GameLoop {
    tick_duration: Duration,
    interval: Option<Interval>,
    last_tick: Instant,
    speed: f64,
}

impl Default for GameLoop {
    fn default() -> Self {
        Self::new(TICK_RATE)
    }
}

impl GameLoop {
    pub fn new(tick_rate: u32) -> Self {
        Self {
            tick_duration: Duration::from_micros(1_000_000 / tick_rate.max(1) as u64),
            interval: None,
            last_tick: Instant::now(),
            speed: 1.0,
        }
    }

    pub fn tick_duration(&self) -> Duration {
        self.tick_duration
    }

    /// Starts ticking one period from now. Calling it while running does
    /// nothing. Must be called from within a tokio runtime.
    pub fn start(&mut self) {
        if self.interval.is_some() {
            return;
        }
        let now = Instant::now();
        let mut interval = interval_at(now + self.tick_duration, self.tick_duration);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        self.interval = Some(interval);
        self.last_tick = now;
        info!("Game loop started at {:?} per tick", self.tick_duration);
    }

    /// Halts future ticks. A later `start` resumes from the current state.
    pub fn stop(&mut self) {
        if self.interval.take().is_some() {
            info!("Game loop stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.interval.is_some()
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Game-speed scalar applied to every delta. Negative values are treated
    /// as zero.
    pub fn set_speed(&mut self, speed: f64) {
        self.speed = speed.max(0.0);
    }

    /// Waits for the next tick and returns its simulated delta in seconds.
    /// Never resolves while the loop is stopped.
    pub async fn next_tick(&mut self) -> f64 {
        let Some(interval) = self.interval.as_mut() else {
            return std::future::pending().await;
        };
        interval.tick().await;

        let now = Instant::now();
        let elapsed = now.duration_since(self.last_tick);
        self.last_tick = now;

        if elapsed.as_secs_f64() > MAX_TICK_DT {
            warn!(
                "Large delta time detected ({:.3}s), capping to {:.3}s",
                elapsed.as_secs_f64(),
                MAX_TICK_DT
            );
        }
        compute_delta(elapsed, self.speed)
    }
}

/// Wall time since the previous tick, capped at `MAX_TICK_DT`, scaled by speed.
pub fn compute_delta(elapsed: Duration, speed: f64) -> f64 {
    elapsed.as_secs_f64().min(MAX_TICK_DT) * speed
}
