//! Per-cycle step timings

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::debug;

#[derive(Debug, Clone)]
pub struct StepTiming {
    pub name: String,
    pub duration: Duration,
}

/// Durations of the stages of one display cycle.
#[derive(Debug, Clone, Default)]
pub struct CycleTimings {
    steps: Vec<StepTiming>,
    step_map: HashMap<String, Duration>,
}

impl CycleTimings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_step(&mut self, name: impl Into<String>, duration: Duration) {
        let name = name.into();
        self.steps.push(StepTiming {
            name: name.clone(),
            duration,
        });
        *self.step_map.entry(name).or_insert(Duration::ZERO) += duration;
    }

    /// Runs `f` and records how long it took under `name`.
    pub fn time<T>(&mut self, name: &str, f: impl FnOnce() -> T) -> T {
        let timer = Timer::start(name);
        let value = f();
        let (name, duration) = timer.stop();
        self.add_step(name, duration);
        value
    }

    pub fn total_duration(&self) -> Duration {
        self.steps.iter().map(|s| s.duration).sum()
    }

    /// Accumulated duration of a step, summed over repeats.
    pub fn get_step(&self, name: &str) -> Option<Duration> {
        self.step_map.get(name).copied()
    }

    pub fn steps(&self) -> &[StepTiming] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn clear(&mut self) {
        self.steps.clear();
        self.step_map.clear();
    }

    pub fn log_summary(&self, cycle: u64) {
        let total = self.total_duration();
        for step in &self.steps {
            let percentage = if total.as_secs_f64() > 0.0 {
                (step.duration.as_secs_f64() / total.as_secs_f64()) * 100.0
            } else {
                0.0
            };
            debug!(
                cycle,
                step = %step.name,
                ms = step.duration.as_secs_f64() * 1000.0,
                percent = percentage,
                "Cycle step"
            );
        }
        debug!(cycle, total_ms = total.as_secs_f64() * 1000.0, "Cycle complete");
    }
}

pub struct Timer {
    start: Instant,
    name: String,
}

impl Timer {
    pub fn start(name: impl Into<String>) -> Self {
        Self {
            start: Instant::now(),
            name: name.into(),
        }
    }

    pub fn stop(self) -> (String, Duration) {
        (self.name, self.start.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_steps_accumulate() {
        let mut timings = CycleTimings::new();
        timings.add_step("colorize", Duration::from_millis(2));
        timings.add_step("overlay", Duration::from_millis(3));
        timings.add_step("colorize", Duration::from_millis(4));

        assert_eq!(timings.steps().len(), 3);
        assert_eq!(timings.get_step("colorize"), Some(Duration::from_millis(6)));
        assert_eq!(timings.total_duration(), Duration::from_millis(9));
        assert_eq!(timings.get_step("debayer"), None);

        timings.clear();
        assert!(timings.is_empty());
    }

    #[test]
    fn test_time_returns_closure_value() {
        let mut timings = CycleTimings::new();
        let value = timings.time("work", || 21 * 2);
        assert_eq!(value, 42);
        assert!(timings.get_step("work").is_some());
    }
}
