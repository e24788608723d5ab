use std::sync::Arc;

use cranelink_frame::{AxisCommand, Frame};
use cranelink_transport::{Transport, TransportError};

use crate::observer::{FrameEvent, FrameObserver};
use crate::sequence::SequenceCounter;
use crate::session::{SessionPhase, SessionPlan};

/// Frames, numbers and sends commands for one session.
pub(crate) struct Emitter<T> {
    transport: Arc<T>,
    observer: Arc<dyn FrameObserver>,
    seq: SequenceCounter,
    verbose: bool,
    sent: u64,
}

impl<T> Clone for Emitter<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            observer: Arc::clone(&self.observer),
            seq: self.seq,
            verbose: self.verbose,
            sent: self.sent,
        }
    }
}

impl<T: Transport> Emitter<T> {
    pub(crate) fn new(
        transport: Arc<T>,
        observer: Arc<dyn FrameObserver>,
        seq: SequenceCounter,
        verbose: bool,
    ) -> Self {
        Self {
            transport,
            observer,
            seq,
            verbose,
            sent: 0,
        }
    }

    /// Send one command with the next sequence number.
    ///
    /// The number is reserved before the write starts, so a write cut short
    /// by dropping this future never shares its number with a later frame. A
    /// failed write hands the number back.
    pub(crate) async fn send(
        &mut self,
        phase: SessionPhase,
        tick: Option<u64>,
        command: AxisCommand,
    ) -> Result<(), TransportError> {
        let reserved = self.seq;
        let frame = Frame::from_command(self.seq.advance(), &command);
        if let Err(err) = self.transport.write(frame.as_bytes()).await {
            self.seq = reserved;
            return Err(err);
        }
        self.sent += 1;
        self.observer.on_frame(&FrameEvent {
            phase,
            tick,
            command,
            frame: &frame,
            verbose: self.verbose,
        });
        Ok(())
    }

    /// Send the three centering frames back to back.
    pub(crate) async fn stop_burst(&mut self) -> Result<(), TransportError> {
        for command in SessionPlan::stop_commands() {
            self.send(SessionPhase::Stopping, None, command).await?;
        }
        Ok(())
    }

    pub(crate) fn next_sequence(&self) -> u8 {
        self.seq.peek()
    }

    pub(crate) fn sent(&self) -> u64 {
        self.sent
    }
}
