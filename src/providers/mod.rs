//! Packet sources built on stream sessions

mod sequential;

pub use sequential::SequentialReader;
