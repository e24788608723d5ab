mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(
    name = "cranelink",
    version,
    about = "Stream pan/tilt speed commands to a motorized gimbal"
)]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr). CRANELINK_LOG overrides it.
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::StreamArgs;

    #[test]
    fn parses_stream_with_negative_speeds() {
        let cli = Cli::try_parse_from([
            "cranelink",
            "stream",
            "--dry-run",
            "--pan",
            "-0.9",
            "--tilt",
            "-0.25",
            "--duration",
            "500ms",
            "--rate",
            "50",
            "--seq",
            "7",
        ])
        .expect("stream args should parse");

        let Command::Stream(StreamArgs {
            link,
            pan,
            tilt,
            duration,
            rate,
            verbose,
        }) = cli.command
        else {
            panic!("expected stream subcommand");
        };
        assert!(link.dry_run);
        assert_eq!(link.seq, Some(7));
        assert_eq!(pan, -0.9);
        assert_eq!(tilt, -0.25);
        assert_eq!(duration, "500ms");
        assert_eq!(rate, 50.0);
        assert!(!verbose);
    }

    #[test]
    fn rejects_value_with_speed() {
        let err = Cli::try_parse_from([
            "cranelink", "frame", "--value", "2048", "--speed", "0.5",
        ])
        .expect_err("conflicting args should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn parses_run_subcommand() {
        let cli = Cli::try_parse_from([
            "cranelink",
            "--format",
            "json",
            "run",
            "routine.json",
            "--dry-run",
        ])
        .expect("run args should parse");
        assert!(matches!(cli.command, Command::Run(_)));
        assert!(matches!(cli.format, Some(OutputFormat::Json)));
    }

    #[test]
    fn parses_decode_subcommand() {
        let cli = Cli::try_parse_from([
            "cranelink",
            "decode",
            "24 3C 08 00 18 12 00 01 01 10 00 08 78 6A",
        ])
        .expect("decode args should parse");
        assert!(matches!(cli.command, Command::Decode(_)));
    }
}
