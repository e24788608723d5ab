use cranelink_frame::decode_frame;

use crate::cmd::{parse_hex, DecodeArgs};
use crate::exit::{frame_error, CliResult, SUCCESS};
use crate::output::{print_frame, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let bytes = parse_hex(&args.hex)?;
    let frame = decode_frame(&bytes).map_err(|err| frame_error("invalid frame", err))?;
    print_frame(&frame, format);
    Ok(SUCCESS)
}
