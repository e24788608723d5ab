/// Errors that can occur while decoding or validating command frames.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    /// The buffer is not exactly one frame long.
    #[error("invalid frame length ({len} bytes, expected {expected})")]
    InvalidLength { len: usize, expected: usize },

    /// The frame does not start with the constant header.
    #[error("invalid frame header (expected 24 3C 08 00)")]
    InvalidHeader,

    /// The command code is not the speed command.
    #[error("invalid command code (expected 18 12)")]
    InvalidCommand,

    /// One of the fixed payload bytes holds an unexpected value.
    #[error("invalid payload layout at offset {offset}: {found:#04x}")]
    InvalidLayout { offset: usize, found: u8 },

    /// The axis id is not one of the three known channels.
    #[error("unknown axis id {0:#04x}")]
    UnknownAxis(u8),

    /// The encoded value does not fit in 12 bits.
    #[error("encoded value {0:#06x} exceeds 0x0FFF")]
    ValueOutOfRange(u16),

    /// The checksum field does not match the frame contents.
    #[error("checksum mismatch (expected {expected:#06x}, found {actual:#06x})")]
    ChecksumMismatch { expected: u16, actual: u16 },
}

pub type Result<T> = std::result::Result<T, FrameError>;
