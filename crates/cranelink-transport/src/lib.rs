//! Write-only transport abstraction for gimbal command frames.
//!
//! The protocol core needs exactly one capability from the link to the
//! device: hand over a complete frame without waiting for acknowledgement.
//! That capability is the [`Transport`] trait. Discovery, pairing and
//! notification handling stay with whatever stack opens the link.
//!
//! Adapters provided here:
//! - [`StreamTransport`] over any `AsyncWrite`, with TCP and Unix socket
//!   connectors for serial/BLE bridges
//! - [`RecordingTransport`], an in-memory sink for dry runs and tests

pub mod binding;
pub mod endpoint;
pub mod error;
pub mod recording;
pub mod stream;
pub mod traits;

pub use binding::ChannelBinding;
pub use endpoint::Endpoint;
pub use error::{Result, TransportError};
pub use recording::RecordingTransport;
pub use stream::{ByteStream, StreamTransport};
pub use traits::Transport;
