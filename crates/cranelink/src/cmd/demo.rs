use cranelink_stream::Routine;

use crate::cmd::run::run_routine_on_link;
use crate::cmd::DemoArgs;
use crate::exit::CliResult;
use crate::output::OutputFormat;

pub fn run(args: DemoArgs, format: OutputFormat) -> CliResult<i32> {
    run_routine_on_link(&Routine::demo(), &args.link, format)
}
