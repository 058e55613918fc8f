//! Asynchronous packet subscriptions over a background reader

use futures::{Stream, StreamExt};
use std::sync::Arc;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::driver::Driver;
use crate::packet::Packet;
use crate::providers::SequentialReader;
use crate::session::StreamSession;
use crate::source::PacketSource;
use crate::stream::ThrottleExt;
use crate::types::UpdateRate;

/// Handle to a background reader publishing packets.
///
/// Dropping the subscription cancels the reader, which closes its session.
/// Streams obtained from [`Subscription::packets`] end at that point.
pub struct Subscription {
    packets: watch::Receiver<Option<Arc<Packet>>>,

    /// Source frequency
    source_hz: f64,

    cancel: CancellationToken,
}

impl Subscription {
    /// Spawn a reader task for `source`. Must be called inside a tokio runtime.
    pub fn spawn<S: PacketSource>(source: S) -> Self {
        let channels = Driver::spawn(source);
        info!(source_hz = channels.nominal_hz, "Subscription started");

        Self { packets: channels.packets, source_hz: channels.nominal_hz, cancel: channels.cancel }
    }

    /// Read `session` sequentially from its first stamp.
    pub fn from_session(session: StreamSession) -> Self {
        Self::spawn(SequentialReader::new(session))
    }

    /// Packets as a stream, delivered at most at `rate`.
    ///
    /// Delivery is latest-wins: a consumer slower than the reader sees the
    /// newest packet and skips the ones in between.
    pub fn packets(&self, rate: UpdateRate) -> impl Stream<Item = Arc<Packet>> + 'static {
        // WatchStream yields the current value first; None means nothing yet
        let packets = WatchStream::new(self.packets.clone()).filter_map(|opt| async move { opt });

        match rate.throttle_interval(self.source_hz) {
            None => packets.boxed(),
            Some(interval) => packets.throttle(interval).boxed(),
        }
    }

    /// Most recent packet, if any has been read
    pub fn latest(&self) -> Option<Arc<Packet>> {
        self.packets.borrow().clone()
    }

    pub fn source_hz(&self) -> f64 {
        self.source_hz
    }

    /// Stop the reader now instead of on drop.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        debug!("Dropping subscription");
        self.cancel.cancel();
    }
}
