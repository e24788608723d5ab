use cranelink_frame::{decode_frame, Frame};
use cranelink_stream::{CancellationToken, StreamController};
use cranelink_transport::{
    ByteStream, Endpoint, RecordingTransport, StreamTransport, Transport,
};
use tracing::{info, warn};

use crate::cmd::LinkArgs;
use crate::exit::{transport_error, CliError, CliResult, FAILURE, USAGE};

/// The transport a command writes through.
pub enum Link {
    /// `--dry-run`: frames are kept in memory and printed afterwards.
    Recording(RecordingTransport),
    /// A connected serial/BLE bridge.
    Bridge(StreamTransport<ByteStream>),
}

impl Link {
    /// Open the link selected by `args`.
    pub async fn open(args: &LinkArgs) -> CliResult<Self> {
        if args.dry_run {
            info!("dry run, frames are recorded and not sent");
            return Ok(Link::Recording(RecordingTransport::new()));
        }

        let Some(raw) = args.endpoint.as_deref() else {
            return Err(CliError::new(
                USAGE,
                "no endpoint given; pass --endpoint (or set CRANELINK_ENDPOINT) or use --dry-run",
            ));
        };
        let endpoint: Endpoint = raw
            .parse()
            .map_err(|err| transport_error("bad endpoint", err))?;

        info!(
            %endpoint,
            device = %args.binding.device,
            write_channel = %args.binding.write_channel,
            "connecting"
        );
        let transport = StreamTransport::connect(&endpoint)
            .await
            .map_err(|err| transport_error("connect failed", err))?;
        Ok(Link::Bridge(transport))
    }

    /// Frames captured by a dry run, decoded for display. Empty for a bridge.
    pub fn recorded_frames(&self) -> CliResult<Vec<Frame>> {
        match self {
            Link::Recording(recording) => recording
                .writes()
                .iter()
                .map(|bytes| decode_frame(bytes))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|err| {
                    CliError::new(FAILURE, format!("recorded frame is invalid: {err}"))
                }),
            Link::Bridge(_) => Ok(Vec::new()),
        }
    }

    /// Close the write half of a bridge. Failures are logged only.
    pub async fn close(&self) {
        if let Link::Bridge(transport) = self {
            if let Err(err) = transport.shutdown().await {
                warn!(%err, "link shutdown failed");
            }
        }
    }
}

impl Transport for Link {
    async fn write(&self, bytes: &[u8]) -> cranelink_transport::Result<()> {
        match self {
            Link::Recording(recording) => recording.write(bytes).await,
            Link::Bridge(transport) => transport.write(bytes).await,
        }
    }
}

/// Open the link and wrap it in a controller configured from `args`.
pub async fn connect(args: &LinkArgs) -> CliResult<StreamController<Link>> {
    let link = Link::open(args).await?;
    Ok(StreamController::new(link).with_config(args.stream_config()))
}

/// A token cancelled on the first Ctrl-C.
///
/// Must be called inside the runtime.
pub fn cancel_on_interrupt() -> CancellationToken {
    let token = CancellationToken::new();
    let child = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, centering axes");
            child.cancel();
        }
    });
    token
}
