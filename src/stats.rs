/// Running statistics over poll results
use log::info;
use time::OffsetDateTime;

use crate::models::SensorReport;
use crate::utils::{duration_to_seconds, format_datetime};

/// Streaming count, mean and population variance without storing samples
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunningStatistics {
    samples: u64,
    sum: u64,
    sq_sum: u128,
}

impl RunningStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, value: u32) {
        self.samples += 1;
        self.sum += u64::from(value);
        self.sq_sum += u128::from(value) * u128::from(value);
    }

    pub fn samples(&self) -> u64 {
        self.samples
    }

    pub fn mean(&self) -> f64 {
        if self.samples == 0 {
            return 0.0;
        }
        self.sum as f64 / self.samples as f64
    }

    pub fn variance(&self) -> f64 {
        if self.samples == 0 {
            return 0.0;
        }
        let n = u128::from(self.samples);
        let sum = u128::from(self.sum);
        // n * sq_sum >= sum^2 by Cauchy-Schwarz
        ((n * self.sq_sum - sum * sum) as f64) / ((n * n) as f64)
    }
}

/// What happened since the poller started
#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub started: OffsetDateTime,
    pub cycles: u64,
    pub failures: u64,
    pub drop_pulses: RunningStatistics,
}

impl SessionSummary {
    pub fn new() -> Self {
        SessionSummary {
            started: OffsetDateTime::now_utc(),
            cycles: 0,
            failures: 0,
            drop_pulses: RunningStatistics::new(),
        }
    }

    pub fn record_success(&mut self, report: &SensorReport) {
        self.cycles += 1;
        self.drop_pulses.append(report.drop_counter_pulses);
    }

    pub fn record_failure(&mut self) {
        self.cycles += 1;
        self.failures += 1;
    }

    pub fn log(&self) {
        let elapsed = duration_to_seconds(OffsetDateTime::now_utc() - self.started);
        info!("Summary since {}:", format_datetime(&self.started));
        info!("  Ran for {} seconds", elapsed);
        info!("  Poll cycles: {}", self.cycles);
        info!("  Failed cycles: {}", self.failures);
        info!(
            "  Drop pulses per report: mean {:.2}, variance {:.2}",
            self.drop_pulses.mean(),
            self.drop_pulses.variance()
        );
    }
}

impl Default for SessionSummary {
    fn default() -> Self {
        Self::new()
    }
}
