//! Frame-level diagnostics hooks.
//!
//! The controller reports every frame it hands to the transport, and every
//! phase change, through a [`FrameObserver`]. The default observer forwards
//! them to `tracing`.

use cranelink_frame::{AxisCommand, Frame};
use tracing::{debug, info, trace};

use crate::session::SessionPhase;

/// A frame that was just handed to the transport.
#[derive(Debug, Clone, Copy)]
pub struct FrameEvent<'a> {
    /// Phase the frame belongs to.
    pub phase: SessionPhase,
    /// Streaming tick index, `None` during the stop burst.
    pub tick: Option<u64>,
    pub command: AxisCommand,
    pub frame: &'a Frame,
    /// The request asked for per-frame diagnostics.
    pub verbose: bool,
}

/// Receives session diagnostics.
pub trait FrameObserver: Send + Sync {
    /// Called after each successful transport write.
    fn on_frame(&self, event: &FrameEvent<'_>);

    /// Called when the session enters `phase`.
    fn on_phase(&self, _phase: SessionPhase) {}
}

/// Logs frames through `tracing`: `info` when the request is verbose,
/// `trace` otherwise.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl FrameObserver for TracingObserver {
    fn on_frame(&self, event: &FrameEvent<'_>) {
        let seq = event.frame.sequence();
        let axis = event.command.axis();
        let value = event.command.value();
        if event.verbose {
            info!(
                phase = %event.phase,
                seq = format_args!("{seq:02X}"),
                %axis,
                value = format_args!("{value:04X}"),
                frame = %event.frame,
                "frame sent"
            );
        } else {
            trace!(
                phase = %event.phase,
                seq,
                %axis,
                value,
                frame = %event.frame,
                "frame sent"
            );
        }
    }

    fn on_phase(&self, phase: SessionPhase) {
        debug!(%phase, "session phase");
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl FrameObserver for NoopObserver {
    fn on_frame(&self, _event: &FrameEvent<'_>) {}
}
