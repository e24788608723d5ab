use cranelink_frame::{Axis, AxisCommand, Frame};

use crate::cmd::FrameArgs;
use crate::exit::{CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_frame, OutputFormat};

pub fn run(args: FrameArgs, format: OutputFormat) -> CliResult<i32> {
    let frame = build(&args)?;
    print_frame(&frame, format);
    Ok(SUCCESS)
}

fn build(args: &FrameArgs) -> CliResult<Frame> {
    let axis = Axis::from(args.axis);
    let command = match (args.value, args.speed) {
        (Some(value), _) => AxisCommand::new(axis, value)
            .map_err(|err| CliError::new(USAGE, format!("--value: {err}")))?,
        (None, Some(speed)) => AxisCommand::from_speed(axis, speed),
        (None, None) => AxisCommand::center(axis),
    };
    Ok(Frame::from_command(args.seq, &command))
}
