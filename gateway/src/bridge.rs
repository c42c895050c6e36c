use crate::payload::{InboundRecord, OutboundPayload};
use crate::time::TimeProvider;
use device_reader::{LineSource, ReadError};
use log::{Level, debug, log};
use mqtt_client::{PublishError, Publisher};
use std::fmt;
use std::time::Duration;
use tokio::runtime::{Handle, RuntimeFlavor};

#[derive(Debug, Clone)]
pub struct BridgeSettings {
    pub topic: String,
    pub device_id: String,
    /// Sleep between polls while the device has nothing pending.
    pub idle_interval: Duration,
}

/// What happened during one pass of the loop.
#[derive(Debug)]
pub enum Outcome {
    /// No bytes were pending on the device.
    Idle,
    /// The device sent a blank line.
    Skipped,
    /// The line was not a JSON object with `v` and `s`.
    Corrupted {
        line: String,
        reason: serde_json::Error,
    },
    /// Serialized payload handed to the publisher.
    Published(String),
    ReadFailed(ReadError),
    EncodeFailed(serde_json::Error),
    PublishFailed(PublishError),
}

impl Outcome {
    /// Level the outcome is logged at, `None` for the quiet ones.
    pub fn log_level(&self) -> Option<Level> {
        match self {
            Outcome::Idle | Outcome::Skipped => None,
            Outcome::Published(_) => Some(Level::Info),
            Outcome::Corrupted { .. } => Some(Level::Warn),
            Outcome::ReadFailed(_) | Outcome::EncodeFailed(_) | Outcome::PublishFailed(_) => {
                Some(Level::Error)
            }
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Idle => write!(f, "Device idle"),
            Outcome::Skipped => write!(f, "Skipped blank line"),
            Outcome::Corrupted { line, reason } => {
                write!(f, "Received corrupted data, skipping: {:?} ({})", line, reason)
            }
            Outcome::Published(json) => write!(f, "[UPLOADED] -> {}", json),
            Outcome::ReadFailed(e) => write!(f, "Failed to read from device: {}", e),
            Outcome::EncodeFailed(e) => write!(f, "Failed to serialize payload: {}", e),
            Outcome::PublishFailed(e) => write!(f, "Failed to publish: {}", e),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BridgeStats {
    pub published: u64,
    pub skipped: u64,
    pub corrupted: u64,
    pub failed: u64,
}

impl fmt::Display for BridgeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} published, {} skipped, {} corrupted, {} failed",
            self.published, self.skipped, self.corrupted, self.failed
        )
    }
}

/// Moves records from a line source to a publisher, one at a time.
///
/// No single record can stop the loop: every failure is reported and the
/// next poll goes ahead.
pub struct Bridge<S, P, C> {
    source: S,
    publisher: P,
    clock: C,
    settings: BridgeSettings,
    stats: BridgeStats,
}

impl<S, P, C> Bridge<S, P, C>
where
    S: LineSource,
    P: Publisher,
    C: TimeProvider,
{
    pub fn new(source: S, publisher: P, clock: C, settings: BridgeSettings) -> Self {
        Self {
            source,
            publisher,
            clock,
            settings,
            stats: BridgeStats::default(),
        }
    }

    /// Polls forever. Only process termination stops it.
    pub async fn run(&mut self) {
        loop {
            match self.tick().await {
                Outcome::Idle | Outcome::ReadFailed(_) => {
                    tokio::time::sleep(self.settings.idle_interval).await
                }
                _ => {}
            }
        }
    }

    /// Runs one pass and reports its outcome.
    pub async fn tick(&mut self) -> Outcome {
        let outcome = self.step().await;
        self.report(&outcome);
        outcome
    }

    /// Runs one pass: read, decode, reshape, publish.
    pub async fn step(&mut self) -> Outcome {
        let line = match read_line(&mut self.source) {
            Ok(None) => return Outcome::Idle,
            Ok(Some(line)) if line.is_empty() => return Outcome::Skipped,
            Ok(Some(line)) => line,
            Err(e) => return Outcome::ReadFailed(e),
        };

        debug!("Raw device data: {}", line);

        let record = match InboundRecord::decode(&line) {
            Ok(record) => record,
            Err(reason) => return Outcome::Corrupted { line, reason },
        };

        let payload = OutboundPayload::from_record(record, &self.settings.device_id, self.clock.now());

        let json = match payload.to_json() {
            Ok(json) => json,
            Err(e) => return Outcome::EncodeFailed(e),
        };

        match self.publisher.publish(&self.settings.topic, &json).await {
            Ok(()) => Outcome::Published(json),
            Err(e) => Outcome::PublishFailed(e),
        }
    }

    fn report(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Idle => {}
            Outcome::Skipped => self.stats.skipped += 1,
            Outcome::Corrupted { .. } => self.stats.corrupted += 1,
            Outcome::Published(_) => self.stats.published += 1,
            Outcome::ReadFailed(_) | Outcome::EncodeFailed(_) | Outcome::PublishFailed(_) => {
                self.stats.failed += 1
            }
        }

        if let Some(level) = outcome.log_level() {
            match outcome {
                Outcome::PublishFailed(_) => log!(level, "{} (topic {})", outcome, self.settings.topic),
                _ => log!(level, "{}", outcome),
            }
        }
    }

    pub fn stats(&self) -> BridgeStats {
        self.stats
    }

    /// Hands back the publisher, e.g. to disconnect it on shutdown.
    pub fn into_publisher(self) -> P {
        self.publisher
    }
}

/// Reads from the source, handing the worker's other tasks to another thread
/// while a serial read blocks.
fn read_line<S: LineSource>(source: &mut S) -> Result<Option<String>, ReadError> {
    match Handle::try_current().map(|handle| handle.runtime_flavor()) {
        Ok(RuntimeFlavor::MultiThread) => tokio::task::block_in_place(|| source.read_line()),
        _ => source.read_line(),
    }
}
