//! Source trait for sequential packet delivery

use crate::Result;
use crate::packet::Packet;

/// Anything that yields packets one after another.
///
/// Sources handle their own pacing: a reader polling a session sleeps
/// between attempts while the device has nothing new.
#[async_trait::async_trait]
pub trait PacketSource: Send + 'static {
    /// Next packet with an `Ok` status.
    ///
    /// Returns:
    /// - `Ok(Some(packet))` - new packet available
    /// - `Ok(None)` - source ended
    /// - `Err(e)` - retrieval or decode failure
    async fn next_packet(&mut self) -> Result<Option<Packet>>;

    /// Nominal production rate in Hz
    fn nominal_hz(&self) -> f64;
}
