use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};
use cranelink_frame::Axis;
use cranelink_stream::{SequenceStart, StreamConfig, DEFAULT_RATE_HZ};
use cranelink_transport::binding::{
    DEFAULT_DEVICE_NAME, DEFAULT_NOTIFY_CHANNEL, DEFAULT_WRITE_CHANNEL,
};
use cranelink_transport::ChannelBinding;

use crate::exit::{io_error, CliError, CliResult, DATA_INVALID, USAGE};
use crate::output::OutputFormat;

pub mod config;
pub mod crc;
pub mod decode;
pub mod demo;
pub mod frame;
pub mod link;
pub mod run;
pub mod stream;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Stream one pan/tilt speed session, then center.
    Stream(StreamArgs),
    /// Run the built-in pan/tilt demo routine.
    Demo(DemoArgs),
    /// Run a routine loaded from a JSON file.
    Run(RunArgs),
    /// Build one frame and print it.
    Frame(FrameArgs),
    /// Decode and validate a frame given as hex.
    Decode(DecodeArgs),
    /// Compute CRC-16/XMODEM over hex input.
    Crc(CrcArgs),
    /// Show the effective link and session settings.
    Config(ConfigArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Stream(args) => stream::run(args, format),
        Command::Demo(args) => demo::run(args, format),
        Command::Run(args) => run::run(args, format),
        Command::Frame(args) => frame::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Crc(args) => crc::run(args, format),
        Command::Config(args) => config::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Where frames go and how sessions start.
#[derive(Args, Debug, Clone)]
pub struct LinkArgs {
    /// Device bridge to write frames to (tcp://host:port or unix:/path).
    #[arg(long, env = "CRANELINK_ENDPOINT")]
    pub endpoint: Option<String>,
    /// Record frames in memory and print them instead of sending. Takes
    /// precedence over `--endpoint`.
    #[arg(long)]
    pub dry_run: bool,
    /// Fixed starting sequence number (0-250). Random when omitted.
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=250))]
    pub seq: Option<u8>,
    /// Abort on a failed write without attempting the stop burst.
    #[arg(long)]
    pub no_stop_on_error: bool,
    #[command(flatten)]
    pub binding: BindingArgs,
}

impl LinkArgs {
    pub fn stream_config(&self) -> StreamConfig {
        StreamConfig {
            initial_sequence: self
                .seq
                .map(SequenceStart::Fixed)
                .unwrap_or(SequenceStart::Random),
            stop_on_write_error: !self.no_stop_on_error,
            ..StreamConfig::default()
        }
    }
}

/// Identifiers handed to whatever wireless stack owns the link.
#[derive(Args, Debug, Clone)]
pub struct BindingArgs {
    /// Advertised device name.
    #[arg(long, env = "CRANELINK_DEVICE", default_value = DEFAULT_DEVICE_NAME)]
    pub device: String,
    /// Write channel identifier.
    #[arg(long, env = "CRANELINK_WRITE_CHANNEL", default_value = DEFAULT_WRITE_CHANNEL)]
    pub write_channel: String,
    /// Notify channel identifier.
    #[arg(long, env = "CRANELINK_NOTIFY_CHANNEL", default_value = DEFAULT_NOTIFY_CHANNEL)]
    pub notify_channel: String,
}

impl BindingArgs {
    pub fn to_binding(&self) -> ChannelBinding {
        ChannelBinding {
            device_name: self.device.clone(),
            write_channel: self.write_channel.clone(),
            notify_channel: self.notify_channel.clone(),
        }
    }
}

#[derive(Args, Debug)]
pub struct StreamArgs {
    #[command(flatten)]
    pub link: LinkArgs,
    /// Pan speed in [-1.0, 1.0].
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub pan: f64,
    /// Tilt speed in [-1.0, 1.0].
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub tilt: f64,
    /// Streaming time (e.g. 1.5, 2s, 500ms).
    #[arg(long, default_value = "1s")]
    pub duration: String,
    /// Ticks per second.
    #[arg(long, default_value_t = DEFAULT_RATE_HZ)]
    pub rate: f64,
    /// Log every frame at info level.
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

#[derive(Args, Debug)]
pub struct DemoArgs {
    #[command(flatten)]
    pub link: LinkArgs,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Routine file (JSON).
    pub routine: PathBuf,
    #[command(flatten)]
    pub link: LinkArgs,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum AxisArg {
    Tilt,
    Roll,
    Pan,
}

impl From<AxisArg> for Axis {
    fn from(arg: AxisArg) -> Self {
        match arg {
            AxisArg::Tilt => Axis::Tilt,
            AxisArg::Roll => Axis::Roll,
            AxisArg::Pan => Axis::Pan,
        }
    }
}

#[derive(Args, Debug)]
pub struct FrameArgs {
    /// Sequence number.
    #[arg(long, default_value_t = 0)]
    pub seq: u8,
    /// Axis to address.
    #[arg(long, value_enum, default_value = "pan")]
    pub axis: AxisArg,
    /// Raw 12-bit value (decimal or 0x-prefixed hex).
    #[arg(long, conflicts_with = "speed", value_parser = parse_value)]
    pub value: Option<u16>,
    /// Normalized speed in [-1.0, 1.0].
    #[arg(long, allow_negative_numbers = true)]
    pub speed: Option<f64>,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Frame bytes as hex; whitespace and ':' separators are ignored.
    pub hex: String,
}

#[derive(Args, Debug)]
pub struct CrcArgs {
    /// Input bytes as hex; whitespace and ':' separators are ignored.
    pub hex: String,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(flatten)]
    pub link: LinkArgs,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Build the runtime that drives a command's async work.
pub fn runtime() -> CliResult<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .map_err(|err| io_error("failed to start runtime", err))
}

/// Parse a duration in seconds. Accepts `1.5`, `2s` and `500ms`; zero is
/// allowed and means "stop immediately".
pub fn parse_duration(input: &str) -> CliResult<f64> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, divisor) = if let Some(num) = input.strip_suffix("ms") {
        (num, 1000.0)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, 1.0)
    } else {
        (input, 1.0)
    };

    let value: f64 = number
        .trim()
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if !value.is_finite() || value < 0.0 {
        return Err(CliError::new(
            USAGE,
            format!("duration must be a non-negative number: {input}"),
        ));
    }

    Ok(value / divisor)
}

/// Parse a hex string, ignoring whitespace, ':' separators and a `0x` prefix.
pub fn parse_hex(input: &str) -> CliResult<Vec<u8>> {
    let trimmed = input.trim();
    let trimmed = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let digits: String = trimmed
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':')
        .collect();
    hex::decode(&digits)
        .map_err(|err| CliError::new(DATA_INVALID, format!("invalid hex input: {err}")))
}

fn parse_value(input: &str) -> Result<u16, String> {
    let input = input.trim();
    let parsed = match input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
    {
        Some(digits) => u16::from_str_radix(digits, 16),
        None => input.parse(),
    };
    parsed.map_err(|err| format!("invalid value {input}: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_duration_units() {
        assert_eq!(parse_duration("2").unwrap(), 2.0);
        assert_eq!(parse_duration("1.5s").unwrap(), 1.5);
        assert_eq!(parse_duration("250ms").unwrap(), 0.25);
        assert_eq!(parse_duration("0").unwrap(), 0.0);
    }

    #[test]
    fn parse_duration_rejects_invalid_values() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("soon").is_err());
        assert!(parse_duration("-1s").is_err());
        assert!(parse_duration("infs").is_err());
    }

    #[test]
    fn parse_hex_ignores_separators() {
        assert_eq!(parse_hex("24 3C:08 00").unwrap(), vec![0x24, 0x3C, 0x08, 0x00]);
        assert_eq!(parse_hex("0x1812").unwrap(), vec![0x18, 0x12]);
        assert_eq!(parse_hex("").unwrap(), Vec::<u8>::new());
        assert!(parse_hex("abc").is_err());
        assert!(parse_hex("zz").is_err());
    }

    #[test]
    fn parse_value_accepts_hex_and_decimal() {
        assert_eq!(parse_value("0x0F32").unwrap(), 3890);
        assert_eq!(parse_value("2048").unwrap(), 2048);
        assert!(parse_value("0xFFFFF").is_err());
    }
}
