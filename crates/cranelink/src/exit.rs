use std::fmt;
use std::io;

use cranelink_frame::FrameError;
use cranelink_stream::StreamError;
use cranelink_transport::TransportError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const INTERNAL: i32 = 125;
/// Session ended by Ctrl-C (stop burst still sent).
pub const INTERRUPTED: i32 = 130;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::InvalidInput => USAGE,
        io::ErrorKind::ConnectionRefused
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::BrokenPipe => TRANSPORT_ERROR,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::InvalidEndpoint(_) => CliError::new(USAGE, format!("{context}: {err}")),
        other => CliError::new(TRANSPORT_ERROR, format!("{context}: {other}")),
    }
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    CliError::new(DATA_INVALID, format!("{context}: {err}"))
}

pub fn stream_error(context: &str, err: StreamError) -> CliError {
    match err {
        StreamError::Transport(err) => transport_error(context, err),
        StreamError::InvalidRequest(_) | StreamError::InvalidConfig(_) => {
            CliError::new(USAGE, format!("{context}: {err}"))
        }
        StreamError::Json(_) => CliError::new(DATA_INVALID, format!("{context}: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_stream_errors() {
        let err = stream_error(
            "stream failed",
            StreamError::Transport(TransportError::Closed),
        );
        assert_eq!(err.code, TRANSPORT_ERROR);
        assert_eq!(err.message, "stream failed: transport closed");

        let err = stream_error("x", StreamError::InvalidRequest("rate".into()));
        assert_eq!(err.code, USAGE);
    }

    #[test]
    fn maps_bad_endpoint_to_usage() {
        let err = transport_error("connect", TransportError::InvalidEndpoint("nope".into()));
        assert_eq!(err.code, USAGE);
    }

    #[test]
    fn maps_frame_errors_to_data_invalid() {
        let err = frame_error("decode", FrameError::InvalidHeader);
        assert_eq!(err.code, DATA_INVALID);
    }
}
