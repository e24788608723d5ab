//! Normalized speed to 12-bit fixed-point word.
//!
//! The device reads each axis speed as an unsigned 12-bit word centered at
//! mid-scale: 0x0800 is "hold still", 0x0001 is full reverse, 0x0FFF is full
//! forward.

/// Encoded value meaning zero speed.
pub const CENTER: u16 = 0x0800;

/// Largest encodable value.
pub const MAX_VALUE: u16 = 0x0FFF;

/// Full-scale magnitude either side of [`CENTER`].
const SCALE: f64 = 2047.0;

/// Encode a normalized speed in `[-1.0, 1.0]`.
///
/// Inputs outside the range are clamped, never rejected. The scaled offset is
/// truncated toward zero, not rounded, so `encode_speed(0.9)` is `0x0F32`.
/// NaN encodes as [`CENTER`].
pub fn encode_speed(speed: f64) -> u16 {
    if speed.is_nan() {
        return CENTER;
    }
    let clamped = speed.clamp(-1.0, 1.0);
    let offset = (clamped * SCALE).trunc() as i32;
    (i32::from(CENTER) + offset) as u16
}

/// Map an encoded word back to a normalized speed, for display.
///
/// Values above [`MAX_VALUE`] are treated as [`MAX_VALUE`].
pub fn decode_speed(value: u16) -> f64 {
    let value = value.min(MAX_VALUE);
    (f64::from(value) - f64::from(CENTER)) / SCALE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_and_extremes() {
        assert_eq!(encode_speed(0.0), 0x0800);
        assert_eq!(encode_speed(1.0), 0x0FFF);
        assert_eq!(encode_speed(-1.0), 0x0001);
    }

    #[test]
    fn out_of_range_is_clamped() {
        assert_eq!(encode_speed(2.0), encode_speed(1.0));
        assert_eq!(encode_speed(-2.0), encode_speed(-1.0));
        assert_eq!(encode_speed(f64::INFINITY), MAX_VALUE);
        assert_eq!(encode_speed(f64::NEG_INFINITY), 0x0001);
    }

    #[test]
    fn truncates_toward_zero() {
        // 0.9 * 2047 = 1842.3
        assert_eq!(encode_speed(0.9), 3890);
        // -0.9 * 2047 = -1842.3 truncates to -1842, not -1843
        assert_eq!(encode_speed(-0.9), 206);
        assert_eq!(encode_speed(0.8), 3685);
        assert_eq!(encode_speed(-0.8), 411);
        // 0.9999 * 2047 = 2046.79..., rounding would give 4095
        assert_eq!(encode_speed(0.9999), 4094);
    }

    #[test]
    fn negative_zero_is_center() {
        assert_eq!(encode_speed(-0.0), CENTER);
    }

    #[test]
    fn nan_holds_center() {
        assert_eq!(encode_speed(f64::NAN), CENTER);
    }

    #[test]
    fn output_always_in_range() {
        for step in -300..=300 {
            let value = encode_speed(f64::from(step) / 200.0);
            assert!((1..=MAX_VALUE).contains(&value), "value {value:#06x}");
        }
    }

    #[test]
    fn decode_speed_inverts_extremes() {
        assert_eq!(decode_speed(CENTER), 0.0);
        assert_eq!(decode_speed(MAX_VALUE), 1.0);
        assert_eq!(decode_speed(0x0001), -1.0);
        assert_eq!(decode_speed(0xFFFF), 1.0);
    }
}
