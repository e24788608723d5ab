use std::fmt;
use std::time::Duration;

use cranelink_frame::{Axis, AxisCommand};
use serde::{Deserialize, Serialize};

use crate::config::{StreamConfig, DEFAULT_RATE_HZ};
use crate::error::{Result, StreamError};

/// One pan/tilt speed request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamRequest {
    /// Normalized pan speed, clamped to `[-1.0, 1.0]`.
    pub pan: f64,
    /// Normalized tilt speed, clamped to `[-1.0, 1.0]`.
    pub tilt: f64,
    /// Streaming time in seconds.
    pub duration: f64,
    /// Ticks per second.
    pub rate: f64,
    /// Log every frame at info level.
    pub verbose: bool,
}

impl Default for StreamRequest {
    fn default() -> Self {
        Self {
            pan: 0.0,
            tilt: 0.0,
            duration: 1.0,
            rate: DEFAULT_RATE_HZ,
            verbose: false,
        }
    }
}

impl StreamRequest {
    /// A one-second pan at `speed`.
    pub fn pan(speed: f64) -> Self {
        Self {
            pan: speed,
            ..Self::default()
        }
    }

    /// A one-second tilt at `speed`.
    pub fn tilt(speed: f64) -> Self {
        Self {
            tilt: speed,
            ..Self::default()
        }
    }

    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration = seconds;
        self
    }

    pub fn with_rate(mut self, hz: f64) -> Self {
        self.rate = hz;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Validate against `config` and compute the tick schedule.
    pub fn plan(&self, config: &StreamConfig) -> Result<SessionPlan> {
        if !self.rate.is_finite() || self.rate <= 0.0 {
            return Err(StreamError::InvalidRequest(format!(
                "rate must be a positive number of Hz, got {}",
                self.rate
            )));
        }
        if self.rate > config.max_rate_hz {
            return Err(StreamError::InvalidRequest(format!(
                "rate {} Hz exceeds limit of {} Hz",
                self.rate, config.max_rate_hz
            )));
        }
        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(StreamError::InvalidRequest(format!(
                "duration must be a non-negative number of seconds, got {}",
                self.duration
            )));
        }
        if self.duration > config.max_duration.as_secs_f64() {
            return Err(StreamError::InvalidRequest(format!(
                "duration {}s exceeds limit of {:?}",
                self.duration, config.max_duration
            )));
        }

        let interval = Duration::try_from_secs_f64(1.0 / self.rate).map_err(|_| {
            StreamError::InvalidRequest(format!(
                "rate {} Hz gives an unrepresentable tick interval",
                self.rate
            ))
        })?;

        Ok(SessionPlan {
            ticks: (self.duration * self.rate) as u64,
            interval,
            pan: AxisCommand::from_speed(Axis::Pan, self.pan),
            tilt: AxisCommand::from_speed(Axis::Tilt, self.tilt),
        })
    }
}

/// Tick schedule and encoded speeds for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionPlan {
    /// Number of streaming ticks, `duration * rate` truncated.
    pub ticks: u64,
    /// Pause after each tick.
    pub interval: Duration,
    /// Pan command repeated on every tick.
    pub pan: AxisCommand,
    /// Tilt command repeated on every tick.
    pub tilt: AxisCommand,
}

impl SessionPlan {
    /// The three commands sent on every streaming tick, in wire order.
    pub fn tick_commands(&self) -> [AxisCommand; 3] {
        [self.tilt, AxisCommand::center(Axis::Roll), self.pan]
    }

    /// The centering burst that closes every session.
    pub fn stop_commands() -> [AxisCommand; 3] {
        Axis::STREAM_ORDER.map(AxisCommand::center)
    }

    /// Frames the session sends when it runs to completion.
    pub fn total_frames(&self) -> u64 {
        self.ticks * 3 + 3
    }
}

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Idle,
    Streaming,
    Stopping,
    Done,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionPhase::Idle => "idle",
            SessionPhase::Streaming => "streaming",
            SessionPhase::Stopping => "stopping",
            SessionPhase::Done => "done",
        };
        f.write_str(name)
    }
}

/// How the streaming phase ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionOutcome {
    /// Every planned tick ran.
    Completed,
    /// The cancellation token fired before the last tick.
    Cancelled,
}

/// Summary of a finished session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionReport {
    /// Streaming ticks actually sent.
    pub ticks: u64,
    /// Frames handed to the transport, stop burst included.
    pub frames_sent: u64,
    /// Sequence number of the first frame.
    pub first_sequence: u8,
    /// Sequence number the next frame would carry.
    pub next_sequence: u8,
    pub outcome: SessionOutcome,
}
