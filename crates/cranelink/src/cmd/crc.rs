use cranelink_frame::crc16_xmodem;

use crate::cmd::{parse_hex, CrcArgs};
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_crc, OutputFormat};

pub fn run(args: CrcArgs, format: OutputFormat) -> CliResult<i32> {
    let bytes = parse_hex(&args.hex)?;
    print_crc(&bytes, crc16_xmodem(&bytes), format);
    Ok(SUCCESS)
}
