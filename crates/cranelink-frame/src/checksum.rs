//! CRC-16/XMODEM.

use crc::{Crc, CRC_16_XMODEM};

const XMODEM: Crc<u16> = Crc::<u16>::new(&CRC_16_XMODEM);

/// Compute CRC-16/XMODEM over `buf`.
///
/// Polynomial 0x1021, zero initial register, no reflection, no final XOR.
/// The empty buffer checksums to 0.
pub fn crc16_xmodem(buf: &[u8]) -> u16 {
    XMODEM.checksum(buf)
}
