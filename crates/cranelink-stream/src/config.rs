use std::time::Duration;

use rand::Rng;

use crate::error::{Result, StreamError};

/// Tick rate used when a request does not name one.
pub const DEFAULT_RATE_HZ: f64 = 25.0;

/// Largest allowed starting sequence number.
pub const MAX_INITIAL_SEQUENCE: u8 = 250;

/// Where a session's sequence counter starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SequenceStart {
    /// Uniformly random in `0..=MAX_INITIAL_SEQUENCE`.
    #[default]
    Random,
    /// A fixed start, for reproducible output.
    Fixed(u8),
}

impl SequenceStart {
    /// Pick the starting value for one session.
    pub fn resolve(self) -> Result<u8> {
        match self {
            SequenceStart::Random => Ok(rand::thread_rng().gen_range(0..=MAX_INITIAL_SEQUENCE)),
            SequenceStart::Fixed(seq) if seq <= MAX_INITIAL_SEQUENCE => Ok(seq),
            SequenceStart::Fixed(seq) => Err(StreamError::InvalidConfig(format!(
                "initial sequence {seq} exceeds {MAX_INITIAL_SEQUENCE}"
            ))),
        }
    }
}

/// Controls session behavior independent of any one request.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamConfig {
    /// Starting point of each session's sequence counter.
    pub initial_sequence: SequenceStart,
    /// When true, a failed write mid-stream is followed by a best-effort stop
    /// burst before the error is returned. When false the session aborts
    /// immediately and leaves the axes at their last commanded speed.
    pub stop_on_write_error: bool,
    /// Longest accepted session duration.
    pub max_duration: Duration,
    /// Highest accepted tick rate.
    pub max_rate_hz: f64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            initial_sequence: SequenceStart::Random,
            stop_on_write_error: true,
            max_duration: Duration::from_secs(600),
            max_rate_hz: 1000.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_start_stays_in_range() {
        for _ in 0..1000 {
            let seq = SequenceStart::Random.resolve().unwrap();
            assert!(seq <= MAX_INITIAL_SEQUENCE);
        }
    }

    #[test]
    fn fixed_start_is_validated() {
        assert_eq!(SequenceStart::Fixed(0).resolve().unwrap(), 0);
        assert_eq!(SequenceStart::Fixed(250).resolve().unwrap(), 250);
        assert!(matches!(
            SequenceStart::Fixed(251).resolve(),
            Err(StreamError::InvalidConfig(_))
        ));
    }

    #[test]
    fn defaults() {
        let cfg = StreamConfig::default();
        assert_eq!(cfg.initial_sequence, SequenceStart::Random);
        assert!(cfg.stop_on_write_error);
        assert_eq!(cfg.max_duration, Duration::from_secs(600));
    }
}
