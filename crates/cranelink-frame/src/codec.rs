use std::fmt;
use std::ops::Range;

use bytes::{Buf, BufMut};

use crate::axis::{Axis, AxisCommand};
use crate::checksum::crc16_xmodem;
use crate::error::{FrameError, Result};
use crate::value::MAX_VALUE;

/// Total wire size of one frame.
pub const FRAME_LEN: usize = 14;

/// Constant frame header.
pub const HEADER: [u8; 4] = [0x24, 0x3C, 0x08, 0x00];

/// Speed command code.
pub const COMMAND_CODE: [u8; 2] = [0x18, 0x12];

/// Bytes covered by the checksum: command code through encoded value.
pub const CHECKSUM_SPAN: Range<usize> = 4..12;

const FIXED_AFTER_SEQ: u8 = 0x01;
const FIXED_AFTER_AXIS: u8 = 0x10;
const CHECKSUM_OFFSET: usize = 12;

/// One encoded command frame.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Frame {
    bytes: [u8; FRAME_LEN],
}

impl Frame {
    /// Build the frame carrying `command` with sequence number `seq`.
    pub fn from_command(seq: u8, command: &AxisCommand) -> Self {
        build_frame(seq, command.axis().id(), command.value())
    }

    /// Raw wire bytes.
    pub fn as_bytes(&self) -> &[u8; FRAME_LEN] {
        &self.bytes
    }

    pub fn sequence(&self) -> u8 {
        self.bytes[6]
    }

    pub fn axis_id(&self) -> u8 {
        self.bytes[8]
    }

    /// The axis, if the id is a known channel.
    pub fn axis(&self) -> Option<Axis> {
        Axis::try_from(self.axis_id()).ok()
    }

    pub fn value(&self) -> u16 {
        u16::from_le_bytes([self.bytes[10], self.bytes[11]])
    }

    pub fn checksum(&self) -> u16 {
        u16::from_le_bytes([self.bytes[CHECKSUM_OFFSET], self.bytes[CHECKSUM_OFFSET + 1]])
    }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.bytes.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{byte:02X}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("seq", &self.sequence())
            .field("axis", &self.axis_id())
            .field("value", &format_args!("{:#06x}", self.value()))
            .field("bytes", &format_args!("{self}"))
            .finish()
    }
}

/// Build a frame.
///
/// Wire format:
/// ```text
/// ┌──────────────┬─────────┬─────┬──────┬──────┬──────┬──────────┬──────────┐
/// │ Header (4B)  │ Cmd(2B) │ Seq │ 0x01 │ Axis │ 0x10 │ Value    │ CRC      │
/// │ 24 3C 08 00  │ 18 12   │     │      │      │      │ (2B LE)  │ (2B LE)  │
/// └──────────────┴─────────┴─────┴──────┴──────┴──────┴──────────┴──────────┘
/// ```
///
/// The CRC covers bytes 4..12. Inputs are not re-validated: callers pass an
/// axis id and a 12-bit value they already trust.
pub fn build_frame(seq: u8, axis: u8, value: u16) -> Frame {
    let mut bytes = [0u8; FRAME_LEN];
    {
        let mut dst = &mut bytes[..CHECKSUM_OFFSET];
        dst.put_slice(&HEADER);
        dst.put_slice(&COMMAND_CODE);
        dst.put_u8(seq);
        dst.put_u8(FIXED_AFTER_SEQ);
        dst.put_u8(axis);
        dst.put_u8(FIXED_AFTER_AXIS);
        dst.put_u16_le(value);
    }
    let crc = crc16_xmodem(&bytes[CHECKSUM_SPAN]);
    (&mut bytes[CHECKSUM_OFFSET..]).put_u16_le(crc);
    Frame { bytes }
}

/// Decode and validate a frame.
///
/// Checks length, header, command code, the fixed payload bytes, the axis id,
/// the value range and the checksum, in that order.
pub fn decode_frame(src: &[u8]) -> Result<Frame> {
    if src.len() != FRAME_LEN {
        return Err(FrameError::InvalidLength {
            len: src.len(),
            expected: FRAME_LEN,
        });
    }

    let mut buf = src;
    if buf[..HEADER.len()] != HEADER {
        return Err(FrameError::InvalidHeader);
    }
    buf.advance(HEADER.len());

    if buf[..COMMAND_CODE.len()] != COMMAND_CODE {
        return Err(FrameError::InvalidCommand);
    }
    buf.advance(COMMAND_CODE.len());

    let _seq = buf.get_u8();
    expect_fixed(buf.get_u8(), FIXED_AFTER_SEQ, 7)?;
    let axis = buf.get_u8();
    Axis::try_from(axis)?;
    expect_fixed(buf.get_u8(), FIXED_AFTER_AXIS, 9)?;

    let value = buf.get_u16_le();
    if value > MAX_VALUE {
        return Err(FrameError::ValueOutOfRange(value));
    }

    let actual = buf.get_u16_le();
    let expected = crc16_xmodem(&src[CHECKSUM_SPAN]);
    if actual != expected {
        return Err(FrameError::ChecksumMismatch { expected, actual });
    }

    let mut bytes = [0u8; FRAME_LEN];
    bytes.copy_from_slice(src);
    Ok(Frame { bytes })
}

fn expect_fixed(found: u8, expected: u8, offset: usize) -> Result<()> {
    if found != expected {
        return Err(FrameError::InvalidLayout { offset, found });
    }
    Ok(())
}
