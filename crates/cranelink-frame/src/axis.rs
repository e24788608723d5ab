//! Axis channel ids.
//!
//! The device exposes three motor channels. Streaming always addresses them in
//! [`Axis::STREAM_ORDER`]; the roll channel is held at center.

use crate::error::{FrameError, Result};
use crate::value::{CENTER, MAX_VALUE};

/// A gimbal motor channel, discriminant is the wire id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Axis {
    /// Tilt (pitch).
    Tilt = 0x01,
    /// Auxiliary channel, held centered while streaming.
    Roll = 0x02,
    /// Pan (yaw).
    Pan = 0x03,
}

impl Axis {
    /// Order in which one tick addresses the axes.
    pub const STREAM_ORDER: [Axis; 3] = [Axis::Tilt, Axis::Roll, Axis::Pan];

    /// Wire id of this axis.
    pub fn id(self) -> u8 {
        self as u8
    }

    /// Human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            Axis::Tilt => "TILT",
            Axis::Roll => "ROLL",
            Axis::Pan => "PAN",
        }
    }
}

impl TryFrom<u8> for Axis {
    type Error = FrameError;

    fn try_from(id: u8) -> Result<Self> {
        match id {
            0x01 => Ok(Axis::Tilt),
            0x02 => Ok(Axis::Roll),
            0x03 => Ok(Axis::Pan),
            other => Err(FrameError::UnknownAxis(other)),
        }
    }
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// An axis paired with its 12-bit encoded value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisCommand {
    axis: Axis,
    value: u16,
}

impl AxisCommand {
    /// Create a command, rejecting values wider than 12 bits.
    pub fn new(axis: Axis, value: u16) -> Result<Self> {
        if value > MAX_VALUE {
            return Err(FrameError::ValueOutOfRange(value));
        }
        Ok(Self { axis, value })
    }

    /// A zero-speed command for `axis`.
    pub fn center(axis: Axis) -> Self {
        Self {
            axis,
            value: CENTER,
        }
    }

    /// A command from a normalized speed (clamped).
    pub fn from_speed(axis: Axis, speed: f64) -> Self {
        Self {
            axis,
            value: crate::value::encode_speed(speed),
        }
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn value(&self) -> u16 {
        self.value
    }
}
