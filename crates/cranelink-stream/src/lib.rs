//! Timed multi-axis command streaming.
//!
//! A session turns one pan/tilt speed request into a fixed-rate cadence of
//! frames, three per tick (tilt, roll, pan), each with the next value of a
//! wrapping one-byte sequence counter. Every session ends with a burst of
//! three centering frames, whether it completes, is cancelled through its
//! token, or has its future dropped mid-stream.

pub mod config;
pub mod controller;
mod emit;
pub mod error;
mod guard;
pub mod observer;
pub mod routine;
pub mod sequence;
pub mod session;

pub use config::{SequenceStart, StreamConfig, DEFAULT_RATE_HZ, MAX_INITIAL_SEQUENCE};
pub use controller::{run_session, StreamController};
pub use error::{Result, StreamError};
pub use observer::{FrameEvent, FrameObserver, NoopObserver, TracingObserver};
pub use routine::{run_routine, Routine, Step};
pub use sequence::SequenceCounter;
pub use session::{SessionOutcome, SessionPhase, SessionPlan, SessionReport, StreamRequest};
pub use tokio_util::sync::CancellationToken;
