use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use cranelink_frame::{decode_speed, Axis, Frame};
use cranelink_stream::{SessionOutcome, SessionReport};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct FrameOutput {
    seq: u8,
    axis: &'static str,
    axis_id: u8,
    value: u16,
    speed: f64,
    checksum: String,
    hex: String,
}

impl FrameOutput {
    fn new(frame: &Frame) -> Self {
        Self {
            seq: frame.sequence(),
            axis: axis_name(frame),
            axis_id: frame.axis_id(),
            value: frame.value(),
            speed: round_speed(decode_speed(frame.value())),
            checksum: format!("0x{:04X}", frame.checksum()),
            hex: frame.to_string(),
        }
    }
}

#[derive(Serialize)]
struct SessionOutput<'a> {
    report: &'a SessionReport,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    frames: Vec<FrameOutput>,
}

#[derive(Serialize)]
struct RoutineOutput<'a> {
    routine: &'a str,
    sessions: &'a [SessionReport],
    #[serde(skip_serializing_if = "Vec::is_empty")]
    frames: Vec<FrameOutput>,
}

#[derive(Serialize)]
struct CrcOutput {
    len: usize,
    crc: String,
    le_bytes: String,
}

/// Print one session summary, followed by the frames when they were captured.
pub fn print_session(report: &SessionReport, frames: &[Frame], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = SessionOutput {
                report,
                frames: frames.iter().map(FrameOutput::new).collect(),
            };
            print_json(&out);
        }
        OutputFormat::Table => {
            println!("{}", report_table(std::slice::from_ref(report)));
            if !frames.is_empty() {
                println!("{}", frame_table(frames));
            }
        }
        OutputFormat::Pretty => {
            println!("{}", report_line(report));
            for frame in frames {
                println!("{}", frame_line(frame));
            }
        }
    }
}

pub fn print_routine(name: &str, reports: &[SessionReport], frames: &[Frame], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = RoutineOutput {
                routine: name,
                sessions: reports,
                frames: frames.iter().map(FrameOutput::new).collect(),
            };
            print_json(&out);
        }
        OutputFormat::Table => {
            println!("routine: {name}");
            println!("{}", report_table(reports));
            if !frames.is_empty() {
                println!("{}", frame_table(frames));
            }
        }
        OutputFormat::Pretty => {
            println!("routine {name}: {} sessions", reports.len());
            for report in reports {
                println!("  {}", report_line(report));
            }
            for frame in frames {
                println!("{}", frame_line(frame));
            }
        }
    }
}

/// Print the decoded fields of a single frame.
pub fn print_frame(frame: &Frame, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&FrameOutput::new(frame)),
        OutputFormat::Table => println!("{}", frame_table(std::slice::from_ref(frame))),
        OutputFormat::Pretty => println!("{}", frame_line(frame)),
    }
}

pub fn print_crc(data: &[u8], crc: u16, format: OutputFormat) {
    let le = crc.to_le_bytes();
    let out = CrcOutput {
        len: data.len(),
        crc: format!("0x{crc:04X}"),
        le_bytes: format!("{:02X} {:02X}", le[0], le[1]),
    };
    match format {
        OutputFormat::Json => print_json(&out),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["BYTES", "CRC", "LE BYTES"])
                .add_row(vec![out.len.to_string(), out.crc, out.le_bytes]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("crc={} le=[{}] len={}", out.crc, out.le_bytes, out.len);
        }
    }
}

/// Print `(key, value)` rows.
pub fn print_settings<T: Serialize>(value: &T, rows: &[(&str, String)], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(value),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["SETTING", "VALUE"]);
            for (key, val) in rows {
                table.add_row(vec![key.to_string(), val.clone()]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for (key, val) in rows {
                println!("{key}={val}");
            }
        }
    }
}

fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

fn report_table(reports: &[SessionReport]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["TICKS", "FRAMES", "FIRST SEQ", "NEXT SEQ", "OUTCOME"]);
    for report in reports {
        table.add_row(vec![
            report.ticks.to_string(),
            report.frames_sent.to_string(),
            format!("{:02X}", report.first_sequence),
            format!("{:02X}", report.next_sequence),
            outcome_name(report.outcome).to_string(),
        ]);
    }
    table
}

fn frame_table(frames: &[Frame]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["SEQ", "AXIS", "VALUE", "SPEED", "CRC", "BYTES"]);
    for frame in frames {
        table.add_row(vec![
            format!("{:02X}", frame.sequence()),
            axis_name(frame).to_string(),
            format!("{:04X}", frame.value()),
            format!("{:+.4}", decode_speed(frame.value())),
            format!("{:04X}", frame.checksum()),
            frame.to_string(),
        ]);
    }
    table
}

fn report_line(report: &SessionReport) -> String {
    format!(
        "{} ticks={} frames={} seq={:02X}..{:02X}",
        outcome_name(report.outcome),
        report.ticks,
        report.frames_sent,
        report.first_sequence,
        report.next_sequence
    )
}

fn frame_line(frame: &Frame) -> String {
    format!(
        "seq={:02X} axis={} value={:04X} [{}]",
        frame.sequence(),
        axis_name(frame),
        frame.value(),
        frame
    )
}

fn axis_name(frame: &Frame) -> &'static str {
    frame.axis().map(Axis::name).unwrap_or("unknown")
}

fn outcome_name(outcome: SessionOutcome) -> &'static str {
    match outcome {
        SessionOutcome::Completed => "completed",
        SessionOutcome::Cancelled => "cancelled",
    }
}

fn round_speed(speed: f64) -> f64 {
    (speed * 10_000.0).round() / 10_000.0
}
