/// The poll-and-decode loop
use log::{debug, info};
use std::io::{self, Write};
use std::time::Duration;
use time::OffsetDateTime;
use tokio::time::sleep;

use crate::config::{PollerConfig, DEFAULT_INTERVAL};
use crate::device::Transport;
use crate::error::PollError;
use crate::models::{Schema, SensorReport};
use crate::protocol::{decode, verify_checksum};
use crate::stats::SessionSummary;
use crate::utils::format_datetime;

pub struct Poller<T> {
    transport: T,
    schema: Schema,
    verify_checksum: bool,
    interval: Duration,
    summary: SessionSummary,
}

impl<T: Transport> Poller<T> {
    pub fn new(transport: T, schema: Schema) -> Self {
        Poller {
            transport,
            schema,
            verify_checksum: false,
            interval: DEFAULT_INTERVAL,
            summary: SessionSummary::new(),
        }
    }

    pub fn from_config(config: &PollerConfig, transport: T) -> Self {
        Self::new(transport, config.schema)
            .with_interval(config.interval)
            .with_checksum_verification(config.verify_checksum)
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_checksum_verification(mut self, enabled: bool) -> Self {
        self.verify_checksum = enabled;
        self
    }

    pub fn summary(&self) -> &SessionSummary {
        &self.summary
    }

    /// Fetch and decode one payload, recording the outcome in the session summary
    pub async fn poll_cycle(&mut self) -> Result<SensorReport, PollError> {
        let result = self.fetch_report().await;
        match &result {
            Ok(report) => self.summary.record_success(report),
            Err(e) => {
                debug!("Poll cycle failed: {:?}", e);
                self.summary.record_failure();
            }
        }
        result
    }

    async fn fetch_report(&self) -> Result<SensorReport, PollError> {
        let data = self.transport.request().await?;
        let report = decode(self.schema, &data)?;
        if self.verify_checksum {
            verify_checksum(&report, &data)?;
        }
        Ok(report)
    }

    /// Poll forever, printing one line per cycle.
    ///
    /// Cycle failures never stop the loop. Returns only when `out` can no
    /// longer be written to.
    pub async fn run<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        info!("Polling every {:?} using the {} layout", self.interval, self.schema);
        loop {
            self.report_cycle(out).await?;
            sleep(self.interval).await;
        }
    }

    /// Same as `run` but stops after `cycles` cycles, without a trailing sleep
    pub async fn run_cycles<W: Write>(&mut self, cycles: usize, out: &mut W) -> io::Result<()> {
        for cycle in 0..cycles {
            self.report_cycle(out).await?;
            if cycle + 1 < cycles {
                sleep(self.interval).await;
            }
        }
        Ok(())
    }

    async fn report_cycle<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        let result = self.poll_cycle().await;
        let timestamp = format_datetime(&OffsetDateTime::now_utc());
        match result {
            Ok(report) => writeln!(out, "{} {}", timestamp, report)?,
            Err(e) => writeln!(out, "{} {}", timestamp, e)?,
        }
        out.flush()
    }
}
