use cranelink_stream::{SequenceStart, DEFAULT_RATE_HZ};
use cranelink_transport::ChannelBinding;
use serde::Serialize;

use crate::cmd::ConfigArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_settings, OutputFormat};

#[derive(Serialize)]
struct ConfigOutput {
    endpoint: Option<String>,
    dry_run: bool,
    binding: ChannelBinding,
    initial_sequence: String,
    stop_on_write_error: bool,
    default_rate_hz: f64,
    max_rate_hz: f64,
    max_duration_secs: f64,
}

pub fn run(args: ConfigArgs, format: OutputFormat) -> CliResult<i32> {
    let config = args.link.stream_config();
    let out = ConfigOutput {
        endpoint: args.link.endpoint.clone(),
        dry_run: args.link.dry_run,
        binding: args.link.binding.to_binding(),
        initial_sequence: match config.initial_sequence {
            SequenceStart::Random => "random".to_string(),
            SequenceStart::Fixed(seq) => seq.to_string(),
        },
        stop_on_write_error: config.stop_on_write_error,
        default_rate_hz: DEFAULT_RATE_HZ,
        max_rate_hz: config.max_rate_hz,
        max_duration_secs: config.max_duration.as_secs_f64(),
    };

    let rows = [
        (
            "endpoint",
            out.endpoint.clone().unwrap_or_else(|| "-".to_string()),
        ),
        ("dry_run", out.dry_run.to_string()),
        ("device", out.binding.device_name.clone()),
        ("write_channel", out.binding.write_channel.clone()),
        ("notify_channel", out.binding.notify_channel.clone()),
        ("initial_sequence", out.initial_sequence.clone()),
        ("stop_on_write_error", out.stop_on_write_error.to_string()),
        ("default_rate_hz", out.default_rate_hz.to_string()),
        ("max_rate_hz", out.max_rate_hz.to_string()),
        ("max_duration_secs", out.max_duration_secs.to_string()),
    ];
    print_settings(&out, &rows, format);
    Ok(SUCCESS)
}
