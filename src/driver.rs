//! Driver spawns and manages the packet reading task

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace};

use crate::packet::Packet;
use crate::source::PacketSource;

/// Consecutive source errors tolerated before the task gives up
const MAX_ERRORS: u32 = 10;

/// Result of spawning the driver task
pub struct DriverChannels {
    /// Latest packet; `None` before the first one and after the source ends
    pub packets: watch::Receiver<Option<Arc<Packet>>>,
    /// Cancels the reading task
    pub cancel: CancellationToken,
    /// Nominal rate of the source, for throttling decisions
    pub nominal_hz: f64,
}

/// Driver spawns a task owning a [`PacketSource`]
///
/// The task publishes every packet through a watch channel, so slow
/// consumers only ever see the latest one. Older packets are released as
/// soon as nothing references them.
pub struct Driver;

impl Driver {
    /// Spawn the reading task for `source`
    pub fn spawn<S>(source: S) -> DriverChannels
    where
        S: PacketSource,
    {
        let (packet_tx, packet_rx) = watch::channel(None);
        let cancel = CancellationToken::new();
        let nominal_hz = source.nominal_hz();

        let cancel_task = cancel.clone();
        tokio::spawn(async move {
            Self::reader_task(source, packet_tx, cancel_task).await;
        });

        DriverChannels { packets: packet_rx, cancel, nominal_hz }
    }

    async fn reader_task<S>(
        mut source: S,
        packet_tx: watch::Sender<Option<Arc<Packet>>>,
        cancel: CancellationToken,
    ) where
        S: PacketSource,
    {
        info!("Packet reader task started");
        let mut packet_count = 0u64;
        let mut error_count = 0u32;

        loop {
            let result = tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Packet reader cancelled");
                    break;
                }
                result = source.next_packet() => result,
            };

            match result {
                Ok(Some(packet)) => {
                    packet_count += 1;
                    error_count = 0;
                    trace!(
                        frame_stamp = packet.frame_stamp(),
                        timestamp = packet.timestamp(),
                        "Publishing packet {}",
                        packet_count
                    );

                    if packet_tx.send(Some(Arc::new(packet))).is_err() {
                        debug!("Packet receiver dropped, shutting down");
                        break;
                    }
                }
                Ok(None) => {
                    info!("Packet source ended after {} packets", packet_count);
                    let _ = packet_tx.send(None);
                    break;
                }
                Err(e) => {
                    error_count += 1;
                    error!("Packet source error ({}/{}): {}", error_count, MAX_ERRORS, e);

                    if !e.is_retryable() || error_count >= MAX_ERRORS {
                        error!("Giving up on packet source");
                        let _ = packet_tx.send(None);
                        break;
                    }

                    // 100ms, 200ms, 400ms, ... capped at 3.2s
                    let backoff = Duration::from_millis(50 * (1 << error_count.min(6)));
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(backoff) => {}
                    }
                }
            }
        }

        // Close the session before receivers see the channel close
        drop(source);
        info!("Packet reader task ended ({} packets)", packet_count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::LoopbackBackend;
    use crate::providers::SequentialReader;
    use crate::session::StreamSession;
    use crate::types::StreamPort;
    use crate::{Result, StreamError};

    const HOST: &str = "10.9.9.9";

    /// Fails a fixed number of times, then ends
    struct Flaky {
        failures: u32,
        error: fn() -> StreamError,
    }

    #[async_trait::async_trait]
    impl PacketSource for Flaky {
        async fn next_packet(&mut self) -> Result<Option<Packet>> {
            if self.failures == 0 {
                return Ok(None);
            }
            self.failures -= 1;
            Err((self.error)())
        }

        fn nominal_hz(&self) -> f64 {
            30.0
        }
    }

    #[tokio::test]
    async fn publishes_latest_packet() {
        let backend = LoopbackBackend::new();
        let feed = backend.feed(HOST, StreamPort::RmImuMagnetometer);
        let session = StreamSession::with_defaults(
            Arc::new(backend.clone()),
            HOST,
            StreamPort::RmImuMagnetometer,
            8,
        );
        let reader = SequentialReader::new(session)
            .with_poll_interval(Duration::from_millis(1))
            .with_idle_timeout(Duration::from_millis(500));

        let DriverChannels { mut packets, cancel, .. } = Driver::spawn(reader);

        // Wait for the reader to open its stream
        while backend.stats().open_streams == 0 {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        feed.push(42, vec![7u8], None);

        packets.changed().await.unwrap();
        let packet = packets.borrow_and_update().clone().unwrap();
        assert_eq!(packet.timestamp(), 42);
        cancel.cancel();
    }

    #[tokio::test]
    async fn retryable_errors_back_off_then_end() {
        let source = Flaky {
            failures: 1,
            error: || StreamError::connection_failed("10.0.0.1", 3810, "reset"),
        };
        let DriverChannels { mut packets, .. } = Driver::spawn(source);

        // Only the terminal None is ever published
        assert!(packets.changed().await.is_ok());
        assert!(packets.borrow().is_none());
    }

    #[tokio::test]
    async fn fatal_error_stops_immediately() {
        let source =
            Flaky { failures: 5, error: || StreamError::lifecycle("get_by_index", "closed") };
        let DriverChannels { mut packets, .. } = Driver::spawn(source);

        packets.changed().await.unwrap();
        assert!(packets.borrow().is_none());
        // The task has exited and dropped its sender
        assert!(packets.changed().await.is_err());
    }

    #[tokio::test]
    async fn cancellation_stops_waiting_reader() {
        let backend = LoopbackBackend::new();
        let _feed = backend.feed(HOST, StreamPort::SpatialInput);
        let session = StreamSession::with_defaults(
            Arc::new(backend.clone()),
            HOST,
            StreamPort::SpatialInput,
            8,
        );
        let reader = SequentialReader::new(session).with_poll_interval(Duration::from_millis(1));

        let DriverChannels { mut packets, cancel, .. } = Driver::spawn(reader);
        cancel.cancel();

        assert!(packets.changed().await.is_err());
        // Reader and its session were dropped with the task
        assert_eq!(backend.stats().open_streams, 0);
    }
}
