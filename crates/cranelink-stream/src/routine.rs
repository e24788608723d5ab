//! Scripted sequences of sessions and pauses.

use std::time::Duration;

use cranelink_transport::Transport;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::StreamConfig;
use crate::controller::StreamController;
use crate::error::{Result, StreamError};
use crate::session::{SessionOutcome, SessionReport, StreamRequest};

/// One step of a routine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    /// Run a streaming session.
    Stream(StreamRequest),
    /// Idle between sessions.
    Pause { seconds: f64 },
}

/// A named list of steps, run in order on one controller.
///
/// JSON form:
/// ```json
/// { "name": "sweep", "steps": [
///     { "step": "stream", "pan": 0.9, "duration": 1.0 },
///     { "step": "pause", "seconds": 0.5 }
/// ] }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Routine {
    pub name: String,
    pub steps: Vec<Step>,
}

impl Routine {
    /// Pan right, pan left, tilt up, tilt down, with short rests.
    pub fn demo() -> Self {
        Self {
            name: "demo".to_string(),
            steps: vec![
                Step::Stream(StreamRequest::pan(0.9).with_verbose(true)),
                Step::Pause { seconds: 0.5 },
                Step::Stream(StreamRequest::pan(-0.9).with_verbose(true)),
                Step::Stream(StreamRequest::tilt(0.8)),
                Step::Pause { seconds: 0.5 },
                Step::Stream(StreamRequest::tilt(-0.8)),
            ],
        }
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Check every step before anything is sent.
    pub fn validate(&self, config: &StreamConfig) -> Result<()> {
        for (index, step) in self.steps.iter().enumerate() {
            match step {
                Step::Stream(request) => {
                    request.plan(config).map_err(|err| {
                        StreamError::InvalidRequest(format!("step {index}: {err}"))
                    })?;
                }
                Step::Pause { seconds } => {
                    pause_duration(*seconds, config).map_err(|err| {
                        StreamError::InvalidRequest(format!("step {index}: {err}"))
                    })?;
                }
            }
        }
        Ok(())
    }
}

/// Run `routine` step by step.
///
/// The whole routine is validated up front. Cancellation ends the current
/// step (a session still sends its stop burst) and skips the rest. Returns
/// one report per session that ran.
pub async fn run_routine<T: Transport + 'static>(
    controller: &StreamController<T>,
    routine: &Routine,
    cancel: &CancellationToken,
) -> Result<Vec<SessionReport>> {
    routine.validate(controller.config())?;
    info!(routine = %routine.name, steps = routine.steps.len(), "routine starting");

    let mut reports = Vec::new();
    for step in &routine.steps {
        if cancel.is_cancelled() {
            break;
        }
        match step {
            Step::Stream(request) => {
                let report = controller.run_session_until(request, cancel).await?;
                let cancelled = report.outcome == SessionOutcome::Cancelled;
                reports.push(report);
                if cancelled {
                    break;
                }
            }
            Step::Pause { seconds } => {
                let pause = pause_duration(*seconds, controller.config())?;
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(pause) => {}
                }
            }
        }
    }

    info!(routine = %routine.name, sessions = reports.len(), "routine finished");
    Ok(reports)
}

/// A pause is bounded by the same limit as a session's duration.
fn pause_duration(seconds: f64, config: &StreamConfig) -> Result<Duration> {
    let pause = Duration::try_from_secs_f64(seconds).map_err(|_| {
        StreamError::InvalidRequest(format!(
            "pause must be a non-negative number of seconds, got {seconds}"
        ))
    })?;
    if pause > config.max_duration {
        return Err(StreamError::InvalidRequest(format!(
            "pause {seconds}s exceeds limit of {:?}",
            config.max_duration
        )));
    }
    Ok(pause)
}
