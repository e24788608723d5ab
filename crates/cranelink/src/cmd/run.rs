use cranelink_stream::{run_routine, Routine, SessionOutcome};
use tracing::info;

use crate::cmd::link::{cancel_on_interrupt, connect};
use crate::cmd::{runtime, LinkArgs, RunArgs};
use crate::exit::{io_error, stream_error, CliResult, INTERRUPTED, SUCCESS};
use crate::output::{print_routine, OutputFormat};

pub fn run(args: RunArgs, format: OutputFormat) -> CliResult<i32> {
    let text = std::fs::read_to_string(&args.routine).map_err(|err| {
        io_error(&format!("failed reading {}", args.routine.display()), err)
    })?;
    let routine = Routine::from_json(&text).map_err(|err| {
        stream_error(&format!("invalid routine {}", args.routine.display()), err)
    })?;
    run_routine_on_link(&routine, &args.link, format)
}

/// Validate `routine`, open the link and run every step.
pub(crate) fn run_routine_on_link(
    routine: &Routine,
    link: &LinkArgs,
    format: OutputFormat,
) -> CliResult<i32> {
    // Reject a bad routine before connecting to anything.
    routine
        .validate(&link.stream_config())
        .map_err(|err| stream_error("invalid routine", err))?;

    runtime()?.block_on(execute(routine, link, format))
}

async fn execute(routine: &Routine, link: &LinkArgs, format: OutputFormat) -> CliResult<i32> {
    let controller = connect(link).await?;
    let cancel = cancel_on_interrupt();

    let result = run_routine(&controller, routine, &cancel).await;
    controller.transport().close().await;
    let reports = result.map_err(|err| stream_error("routine failed", err))?;

    let frames = controller.transport().recorded_frames()?;
    print_routine(&routine.name, &reports, &frames, format);

    let interrupted = cancel.is_cancelled()
        || reports
            .iter()
            .any(|report| report.outcome == SessionOutcome::Cancelled);
    if interrupted {
        info!(sessions = reports.len(), "routine interrupted");
        return Ok(INTERRUPTED);
    }
    Ok(SUCCESS)
}
