//! Sequential reader walking a session's frame stamps in order

use std::time::Duration;
use tokio::time::{Instant, sleep};
use tracing::{debug, info, trace, warn};

use crate::packet::Packet;
use crate::session::StreamSession;
use crate::source::PacketSource;
use crate::types::Status;
use crate::{Result, StreamError};

/// Shortest sleep between polls while the device has nothing new
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Reads every packet of a session in frame-stamp order.
///
/// `Wait` results sleep for the poll interval and try the same stamp again.
/// `Discarded` results mean the reader fell behind the history window; it
/// jumps to the oldest stamp the device still holds, locating it with a
/// logarithmic number of lookups. A packet whose payload is too short for
/// its layout is counted in [`malformed`](Self::malformed) and skipped.
pub struct SequentialReader {
    session: StreamSession,

    /// Next frame stamp to request
    next_stamp: i64,

    poll_interval: Duration,

    /// End the source after waiting this long without a new packet
    idle_timeout: Option<Duration>,

    nominal_hz: f64,

    /// Stamps lost to eviction so far
    skipped: u64,

    malformed: u64,
}

impl SequentialReader {
    /// Read from the first stamp the session produces.
    ///
    /// The poll interval defaults to half the stream's nominal frame period.
    pub fn new(session: StreamSession) -> Self {
        let nominal_hz = session.config().nominal_hz();
        let poll_interval =
            Duration::from_secs_f64(0.5 / nominal_hz.max(1.0)).max(MIN_POLL_INTERVAL);

        Self {
            session,
            next_stamp: 0,
            poll_interval,
            idle_timeout: None,
            nominal_hz,
            skipped: 0,
            malformed: 0,
        }
    }

    /// Start at `frame_stamp` instead of zero.
    pub fn starting_at(mut self, frame_stamp: i64) -> Self {
        self.next_stamp = frame_stamp.max(0);
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(MIN_POLL_INTERVAL);
        self
    }

    /// End the source once no packet has arrived for `timeout`.
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = Some(timeout);
        self
    }

    pub fn next_stamp(&self) -> i64 {
        self.next_stamp
    }

    /// Number of stamps skipped because they were evicted before being read
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    /// Number of packets skipped because their payload failed to decode
    pub fn malformed(&self) -> u64 {
        self.malformed
    }

    pub fn session(&self) -> &StreamSession {
        &self.session
    }

    /// Give the session back, still open.
    pub fn into_session(self) -> StreamSession {
        self.session
    }

    fn is_evicted(&mut self, frame_stamp: i64) -> Result<bool> {
        match self.session.get_by_index(frame_stamp) {
            Ok(packet) => Ok(packet.status() == Status::Discarded),
            // Held by the device, just undecodable
            Err(StreamError::OutOfBounds { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Oldest stamp after `evicted` that the device still holds.
    ///
    /// Evicted stamps form a prefix, so gallop forward until a lookup lands
    /// inside the window (or past its end), then bisect the last gap.
    fn first_retained(&mut self, evicted: i64) -> Result<i64> {
        let mut low = evicted;
        let mut step = 1i64;
        let mut high = loop {
            let candidate = low.saturating_add(step);
            if !self.is_evicted(candidate)? {
                break candidate;
            }
            low = candidate;
            step = step.saturating_mul(2);
        };

        while high - low > 1 {
            let mid = low + (high - low) / 2;
            if self.is_evicted(mid)? {
                low = mid;
            } else {
                high = mid;
            }
        }
        Ok(high)
    }
}

#[async_trait::async_trait]
impl PacketSource for SequentialReader {
    async fn next_packet(&mut self) -> Result<Option<Packet>> {
        self.session.open()?;
        let started = Instant::now();

        loop {
            let packet = match self.session.get_by_index(self.next_stamp) {
                Ok(packet) => packet,
                Err(e @ StreamError::OutOfBounds { .. }) => {
                    self.malformed += 1;
                    warn!(frame_stamp = self.next_stamp, error = %e, "Malformed packet, skipping");
                    self.next_stamp += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };

            match packet.status() {
                Status::Ok => {
                    trace!(
                        frame_stamp = self.next_stamp,
                        timestamp = packet.timestamp(),
                        "Read packet"
                    );
                    self.next_stamp += 1;
                    return Ok(Some(packet));
                }
                Status::Discarded => {
                    drop(packet);
                    let resume = self.first_retained(self.next_stamp)?;
                    self.skipped += (resume - self.next_stamp) as u64;
                    debug!(
                        from = self.next_stamp,
                        to = resume,
                        skipped = self.skipped,
                        "Stamps evicted, skipping ahead"
                    );
                    self.next_stamp = resume;
                }
                Status::Wait => {
                    drop(packet);
                    if let Some(timeout) = self.idle_timeout {
                        if started.elapsed() >= timeout {
                            info!(frame_stamp = self.next_stamp, "No new packets, ending reader");
                            return Ok(None);
                        }
                    }
                    sleep(self.poll_interval).await;
                }
            }
        }
    }

    fn nominal_hz(&self) -> f64 {
        self.nominal_hz
    }
}
