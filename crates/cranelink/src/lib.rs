//! Speed streaming control for two-axis motorized gimbals.
//!
//! cranelink encodes pan/tilt speed commands into checksummed 14-byte frames
//! and streams them at a fixed rate over any write-capable link, always
//! finishing with a centering burst.
//!
//! # Crate Structure
//!
//! - [`transport`]: The write capability and byte-stream/recording adapters
//! - [`frame`]: CRC-16/XMODEM, speed encoding, frame build and decode
//! - [`stream`]: Timed sessions, stop guarantee, routines

/// Re-export transport types.
pub mod transport {
    pub use cranelink_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use cranelink_frame::*;
}

/// Re-export streaming types.
pub mod stream {
    pub use cranelink_stream::*;
}
