//! Fixed-length command frames for a two-axis motorized gimbal.
//!
//! Every speed command travels as a 14-byte frame:
//! - A 4-byte constant header
//! - A 2-byte constant command code
//! - A 6-byte payload (sequence, axis id, 12-bit speed word)
//! - A 2-byte little-endian CRC-16/XMODEM over command code + payload
//!
//! Everything here is pure: building a frame cannot fail, only decoding can.

pub mod axis;
pub mod checksum;
pub mod codec;
pub mod error;
pub mod value;

pub use axis::{Axis, AxisCommand};
pub use checksum::crc16_xmodem;
pub use codec::{
    build_frame, decode_frame, Frame, CHECKSUM_SPAN, COMMAND_CODE, FRAME_LEN, HEADER,
};
pub use error::{FrameError, Result};
pub use value::{decode_speed, encode_speed, CENTER, MAX_VALUE};
