//! Typed, zero-copy client library for headset sensor streams.
//!
//! hlstream decodes the packets a streaming backend delivers for a mixed
//! reality headset: grayscale tracking cameras, depth sensors, IMUs, the
//! photo/video camera, microphone arrays and auxiliary streams. Each packet
//! is exposed as a typed record whose image and sample arrays borrow the
//! packet's payload buffer instead of copying it.
//!
//! # Features
//!
//! - **Stream sessions**: open one port, retrieve by frame stamp or by timestamp
//! - **Zero-copy frames**: bounds-checked [`Raster`] views over shared payloads
//! - **Safe release**: native packets are released exactly once, on drop at the latest
//! - **Async reading**: sequential readers and throttled subscriptions on tokio
//!
//! # Quick Start
//!
//! ```rust
//! use hlstream::{LoopbackBackend, StreamSession, TimePreference, StreamPort, RM_VLC};
//! use std::sync::Arc;
//!
//! let backend = LoopbackBackend::new();
//! let camera = backend.feed("192.168.1.20", StreamPort::RmVlcLeftFront);
//!
//! let mut session = StreamSession::with_defaults(
//!     Arc::new(backend.clone()),
//!     "192.168.1.20",
//!     StreamPort::RmVlcLeftFront,
//!     300,
//! );
//! session.open()?;
//!
//! camera.push(1_000_000, vec![0u8; RM_VLC.pixels() + 20], None);
//! let packet = session.get_by_timestamp(1_000_000, TimePreference::PreferNearest, false)?;
//! let frame = packet.payload()?.and_then(|f| f.as_rm_vlc()).unwrap();
//! assert_eq!(frame.image.shape(), (480, 640, 1));
//! # Ok::<(), hlstream::StreamError>(())
//! ```
//!
//! ## Async example
//!
//! ```rust,no_run
//! use hlstream::{LoopbackBackend, StreamSession, StreamPort, Subscription, UpdateRate};
//! use futures::StreamExt;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = LoopbackBackend::new();
//!     let _feed = backend.feed("192.168.1.20", StreamPort::PersonalVideo);
//!     let session = StreamSession::with_defaults(
//!         Arc::new(backend),
//!         "192.168.1.20",
//!         StreamPort::PersonalVideo,
//!         60,
//!     );
//!
//!     let subscription = Subscription::from_session(session);
//!     let mut packets = subscription.packets(UpdateRate::Max(10));
//!     while let Some(packet) = packets.next().await {
//!         println!("frame {} at {}", packet.frame_stamp(), packet.timestamp());
//!     }
//! }
//! ```

// Core types and error handling
mod error;
pub mod types;

// Decoding and native resources
pub mod backend;
pub mod codec;
pub mod config;
mod packet;
mod session;

// Sequential reading
pub mod driver;
pub mod providers;
pub mod source;
pub mod stream;
mod subscription;

// Core exports
pub use error::*;
pub use types::*;

pub use backend::{Backend, LoopbackBackend, LoopbackStats};
pub use codec::FrameLayout;
pub use config::{Configuration, OptionValue, StreamConfig};
pub use packet::Packet;
pub use session::{SessionState, StreamSession};

pub use providers::SequentialReader;
pub use source::PacketSource;
pub use subscription::Subscription;
