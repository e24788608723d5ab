use cranelink_stream::{SessionOutcome, StreamRequest};
use tracing::info;

use crate::cmd::link::{cancel_on_interrupt, connect};
use crate::cmd::{parse_duration, runtime, LinkArgs, StreamArgs};
use crate::exit::{stream_error, CliResult, INTERRUPTED, SUCCESS};
use crate::output::{print_session, OutputFormat};

pub fn run(args: StreamArgs, format: OutputFormat) -> CliResult<i32> {
    let request = StreamRequest {
        pan: args.pan,
        tilt: args.tilt,
        duration: parse_duration(&args.duration)?,
        rate: args.rate,
        verbose: args.verbose,
    };
    runtime()?.block_on(stream(&args.link, &request, format))
}

async fn stream(link: &LinkArgs, request: &StreamRequest, format: OutputFormat) -> CliResult<i32> {
    let controller = connect(link).await?;
    let cancel = cancel_on_interrupt();

    let result = controller.run_session_until(request, &cancel).await;
    controller.transport().close().await;
    let report = result.map_err(|err| stream_error("stream failed", err))?;

    let frames = controller.transport().recorded_frames()?;
    print_session(&report, &frames, format);

    if report.outcome == SessionOutcome::Cancelled {
        info!(ticks = report.ticks, "stream interrupted");
        return Ok(INTERRUPTED);
    }
    Ok(SUCCESS)
}
