use std::sync::Arc;

use cranelink_transport::{Transport, TransportError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::StreamConfig;
use crate::emit::Emitter;
use crate::error::{Result, StreamError};
use crate::guard::StopGuard;
use crate::observer::{FrameObserver, TracingObserver};
use crate::sequence::SequenceCounter;
use crate::session::{SessionOutcome, SessionPhase, SessionReport, StreamRequest};

/// Drives streaming sessions over one transport.
///
/// Sessions are independent: each gets its own sequence counter. The
/// controller does not serialize concurrent sessions on a shared transport;
/// callers that need exclusion must provide it.
pub struct StreamController<T> {
    transport: Arc<T>,
    config: StreamConfig,
    observer: Arc<dyn FrameObserver>,
}

impl<T: Transport + 'static> StreamController<T> {
    /// Create a controller with default configuration and tracing diagnostics.
    pub fn new(transport: T) -> Self {
        Self::from_shared(Arc::new(transport))
    }

    /// Create a controller over a transport shared with other owners.
    pub fn from_shared(transport: Arc<T>) -> Self {
        Self {
            transport,
            config: StreamConfig::default(),
            observer: Arc::new(TracingObserver),
        }
    }

    pub fn with_config(mut self, config: StreamConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn FrameObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    /// Run one session to completion.
    pub async fn run_session(&self, request: &StreamRequest) -> Result<SessionReport> {
        self.run_session_until(request, &CancellationToken::new())
            .await
    }

    /// Run one session, ending the streaming phase early if `cancel` fires.
    ///
    /// Phases: idle, streaming (`ticks` rounds of tilt/roll/pan frames with
    /// one interval of sleep after each round), stopping (three centering
    /// frames, no delay), done. Cancellation skips the remaining ticks but
    /// never the stop burst. A failed write aborts the session and returns
    /// the transport error; with `stop_on_write_error` a stop burst is
    /// attempted first.
    pub async fn run_session_until(
        &self,
        request: &StreamRequest,
        cancel: &CancellationToken,
    ) -> Result<SessionReport> {
        let plan = request.plan(&self.config)?;
        let first_sequence = self.config.initial_sequence.resolve()?;
        self.observer.on_phase(SessionPhase::Idle);

        info!(
            pan = request.pan,
            tilt = request.tilt,
            ticks = plan.ticks,
            frames = plan.total_frames(),
            rate = request.rate,
            seq = first_sequence,
            "session starting"
        );

        let emitter = Emitter::new(
            Arc::clone(&self.transport),
            Arc::clone(&self.observer),
            SequenceCounter::new(first_sequence),
            request.verbose,
        );
        let mut guard = StopGuard::new(emitter);
        let mut outcome = SessionOutcome::Completed;
        let mut ticks = 0u64;

        self.observer.on_phase(SessionPhase::Streaming);
        for tick in 0..plan.ticks {
            if cancel.is_cancelled() {
                outcome = SessionOutcome::Cancelled;
                break;
            }
            for command in plan.tick_commands() {
                if let Err(err) = guard
                    .emitter()
                    .send(SessionPhase::Streaming, Some(tick), command)
                    .await
                {
                    return Err(self.abort(&mut guard, tick, err).await);
                }
            }
            ticks += 1;

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    outcome = SessionOutcome::Cancelled;
                    break;
                }
                _ = tokio::time::sleep(plan.interval) => {}
            }
        }

        if outcome == SessionOutcome::Cancelled {
            info!(ticks, planned = plan.ticks, "session cancelled, stopping");
        }

        self.observer.on_phase(SessionPhase::Stopping);
        guard.stop().await?;
        self.observer.on_phase(SessionPhase::Done);

        let report = SessionReport {
            ticks,
            frames_sent: guard.sent(),
            first_sequence,
            next_sequence: guard.next_sequence(),
            outcome,
        };
        debug!(?report, "session finished");
        Ok(report)
    }

    async fn abort(
        &self,
        guard: &mut StopGuard<T>,
        tick: u64,
        err: TransportError,
    ) -> StreamError {
        warn!(%err, tick, "write failed mid-stream");
        if self.config.stop_on_write_error {
            self.observer.on_phase(SessionPhase::Stopping);
            if let Err(stop_err) = guard.stop().await {
                warn!(err = %stop_err, "stop burst after write failure also failed");
            }
        } else {
            guard.disarm();
        }
        self.observer.on_phase(SessionPhase::Done);
        StreamError::Transport(err)
    }
}

/// Run one session with default configuration.
///
/// Convenience form of [`StreamController::run_session`] taking the request
/// fields directly.
pub async fn run_session<T: Transport + 'static>(
    transport: T,
    pan_speed: f64,
    tilt_speed: f64,
    duration: f64,
    rate: f64,
    verbose: bool,
) -> Result<SessionReport> {
    let request = StreamRequest {
        pan: pan_speed,
        tilt: tilt_speed,
        duration,
        rate,
        verbose,
    };
    StreamController::new(transport).run_session(&request).await
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use cranelink_frame::{decode_frame, Axis, CENTER, FRAME_LEN};
    use cranelink_transport::RecordingTransport;

    use super::*;
    use crate::config::SequenceStart;
    use crate::observer::FrameEvent;

    fn controller(
        transport: &RecordingTransport,
        start: u8,
    ) -> StreamController<RecordingTransport> {
        StreamController::new(transport.clone()).with_config(StreamConfig {
            initial_sequence: SequenceStart::Fixed(start),
            ..StreamConfig::default()
        })
    }

    fn decoded(transport: &RecordingTransport) -> Vec<(u8, Axis, u16)> {
        transport
            .writes()
            .iter()
            .map(|bytes| {
                assert_eq!(bytes.len(), FRAME_LEN);
                let frame = decode_frame(bytes).expect("recorded frame should decode");
                (
                    frame.sequence(),
                    frame.axis().expect("known axis"),
                    frame.value(),
                )
            })
            .collect()
    }

    #[derive(Default)]
    struct PhaseLog {
        phases: Mutex<Vec<SessionPhase>>,
        frames: Mutex<Vec<(SessionPhase, Option<u64>, bool)>>,
    }

    impl FrameObserver for PhaseLog {
        fn on_frame(&self, event: &FrameEvent<'_>) {
            self.frames
                .lock()
                .unwrap()
                .push((event.phase, event.tick, event.verbose));
        }

        fn on_phase(&self, phase: SessionPhase) {
            self.phases.lock().unwrap().push(phase);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn one_second_at_25hz_sends_75_plus_3_frames() {
        let transport = RecordingTransport::new();
        let report = controller(&transport, 0)
            .run_session(&StreamRequest::pan(0.9))
            .await
            .unwrap();

        let frames = decoded(&transport);
        assert_eq!(frames.len(), 78);
        assert_eq!(report.ticks, 25);
        assert_eq!(report.frames_sent, 78);
        assert_eq!(report.outcome, SessionOutcome::Completed);

        let pan_value = 2048 + (0.9f64 * 2047.0) as u16;
        assert_eq!(pan_value, 3890);
        for (i, (_, axis, value)) in frames[..75].iter().enumerate() {
            assert_eq!(*axis, Axis::STREAM_ORDER[i % 3]);
            match axis {
                Axis::Tilt | Axis::Roll => assert_eq!(*value, CENTER),
                Axis::Pan => assert_eq!(*value, pan_value),
            }
        }
        for (i, (_, axis, value)) in frames[75..].iter().enumerate() {
            assert_eq!(*axis, Axis::STREAM_ORDER[i]);
            assert_eq!(*value, CENTER);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn sequence_increments_per_frame_and_wraps() {
        let transport = RecordingTransport::new();
        let report = controller(&transport, 250)
            .run_session(&StreamRequest::tilt(-0.5))
            .await
            .unwrap();

        let seqs: Vec<u8> = decoded(&transport).iter().map(|f| f.0).collect();
        let expected: Vec<u8> = (0..78u32).map(|i| (250 + i) as u8).collect();
        assert_eq!(seqs, expected);
        assert_eq!(report.first_sequence, 250);
        assert_eq!(report.next_sequence, (250u32 + 78) as u8);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_burst_is_centered_regardless_of_speed() {
        for (pan, tilt) in [(1.0, 1.0), (-1.0, -1.0), (0.3, -0.7)] {
            let transport = RecordingTransport::new();
            let request = StreamRequest {
                pan,
                tilt,
                duration: 0.2,
                ..StreamRequest::default()
            };
            controller(&transport, 0).run_session(&request).await.unwrap();

            let frames = decoded(&transport);
            assert_eq!(frames.len(), 5 * 3 + 3);
            let tail: Vec<(Axis, u16)> = frames[frames.len() - 3..]
                .iter()
                .map(|f| (f.1, f.2))
                .collect();
            assert_eq!(
                tail,
                vec![(Axis::Tilt, CENTER), (Axis::Roll, CENTER), (Axis::Pan, CENTER)]
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_are_paced_by_the_interval() {
        let transport = RecordingTransport::new();
        let started = tokio::time::Instant::now();
        controller(&transport, 0)
            .run_session(&StreamRequest::pan(0.5).with_duration(2.0).with_rate(10.0))
            .await
            .unwrap();

        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(2), "elapsed {elapsed:?}");
        assert!(elapsed < Duration::from_millis(2050), "elapsed {elapsed:?}");
        assert_eq!(transport.len(), 20 * 3 + 3);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_ticks_still_stops() {
        let transport = RecordingTransport::new();
        let report = controller(&transport, 7)
            .run_session(&StreamRequest::pan(1.0).with_duration(0.01))
            .await
            .unwrap();

        assert_eq!(report.ticks, 0);
        let frames = decoded(&transport);
        assert_eq!(frames.len(), 3);
        assert!(frames.iter().all(|f| f.2 == CENTER));
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_request_sends_nothing() {
        let transport = RecordingTransport::new();
        let err = controller(&transport, 0)
            .run_session(&StreamRequest::default().with_rate(0.0))
            .await
            .unwrap_err();

        assert!(matches!(err, StreamError::InvalidRequest(_)));
        assert!(transport.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_initial_sequence_is_rejected() {
        let transport = RecordingTransport::new();
        let err = controller(&transport, 251)
            .run_session(&StreamRequest::default())
            .await
            .unwrap_err();

        assert!(matches!(err, StreamError::InvalidConfig(_)));
        assert!(transport.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_still_sends_stop_burst() {
        let transport = RecordingTransport::new();
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            // Mid-way through the sleep after the fourth tick.
            tokio::time::sleep(Duration::from_millis(150)).await;
            trigger.cancel();
        });

        let report = controller(&transport, 0)
            .run_session_until(&StreamRequest::pan(0.9).with_duration(5.0), &cancel)
            .await
            .unwrap();

        assert_eq!(report.outcome, SessionOutcome::Cancelled);
        assert_eq!(report.ticks, 4);
        let frames = decoded(&transport);
        assert_eq!(frames.len(), 4 * 3 + 3);
        assert!(frames[12..].iter().all(|f| f.2 == CENTER));
    }

    #[tokio::test(start_paused = true)]
    async fn pre_cancelled_token_only_stops() {
        let transport = RecordingTransport::new();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let report = controller(&transport, 0)
            .run_session_until(&StreamRequest::pan(0.9), &cancel)
            .await
            .unwrap();

        assert_eq!(report.outcome, SessionOutcome::Cancelled);
        assert_eq!(report.ticks, 0);
        assert_eq!(transport.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_session_future_still_stops() {
        let transport = RecordingTransport::new();
        let ctrl = controller(&transport, 0);

        let result = tokio::time::timeout(
            Duration::from_millis(100),
            ctrl.run_session(&StreamRequest::pan(0.9).with_duration(5.0)),
        )
        .await;
        assert!(result.is_err(), "session should have been cut short");

        // Let the spawned stop burst run.
        tokio::time::sleep(Duration::from_millis(10)).await;

        let frames = decoded(&transport);
        assert_eq!(frames.len(), 3 * 3 + 3);
        let tail = &frames[frames.len() - 3..];
        assert!(tail.iter().all(|f| f.2 == CENTER));
        let seqs: Vec<u8> = frames.iter().map(|f| f.0).collect();
        assert_eq!(seqs, (0..12).collect::<Vec<u8>>());
    }

    #[tokio::test(start_paused = true)]
    async fn write_failure_propagates_after_best_effort_stop() {
        // Budget: 2 full ticks plus one frame, then every write fails.
        let transport = RecordingTransport::failing_after(7);
        let err = controller(&transport, 0)
            .run_session(&StreamRequest::pan(0.9))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            StreamError::Transport(TransportError::Rejected(_))
        ));
        assert_eq!(transport.len(), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn write_failure_reports_stopping_phase() {
        let transport = RecordingTransport::failing_after(4);
        let log = Arc::new(PhaseLog::default());
        let ctrl = controller(&transport, 0).with_observer(log.clone());

        let err = ctrl.run_session(&StreamRequest::pan(0.9)).await.unwrap_err();
        assert!(matches!(err, StreamError::Transport(_)));

        let phases = log.phases.lock().unwrap().clone();
        assert_eq!(
            phases,
            vec![
                SessionPhase::Idle,
                SessionPhase::Streaming,
                SessionPhase::Stopping,
                SessionPhase::Done
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn write_failure_without_stop_aborts_immediately() {
        let transport = RecordingTransport::failing_after(4);
        let ctrl = controller(&transport, 0).with_config(StreamConfig {
            initial_sequence: SequenceStart::Fixed(0),
            stop_on_write_error: false,
            ..StreamConfig::default()
        });

        let err = ctrl.run_session(&StreamRequest::pan(0.9)).await.unwrap_err();
        assert!(matches!(err, StreamError::Transport(_)));

        tokio::time::sleep(Duration::from_millis(10)).await;
        let frames = decoded(&transport);
        assert_eq!(frames.len(), 4);
        // Last pan command stays in effect: no centering frame was sent.
        assert_eq!(frames[2], (2, Axis::Pan, 3890));
        assert_eq!(frames[3], (3, Axis::Tilt, CENTER));
    }

    /// Rejects exactly one write, by index, and records the rest.
    struct FlakyTransport {
        inner: RecordingTransport,
        fail_at: usize,
        attempts: Mutex<usize>,
    }

    impl Transport for FlakyTransport {
        async fn write(&self, bytes: &[u8]) -> cranelink_transport::Result<()> {
            let attempt = {
                let mut attempts = self.attempts.lock().unwrap();
                *attempts += 1;
                *attempts - 1
            };
            if attempt == self.fail_at {
                return Err(TransportError::Rejected("radio busy".to_string()));
            }
            self.inner.write(bytes).await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn write_failure_sends_stop_burst_when_link_allows() {
        let recording = RecordingTransport::new();
        let flaky = FlakyTransport {
            inner: recording.clone(),
            fail_at: 5,
            attempts: Mutex::new(0),
        };
        let ctrl = StreamController::new(flaky).with_config(StreamConfig {
            initial_sequence: SequenceStart::Fixed(40),
            ..StreamConfig::default()
        });

        let err = ctrl.run_session(&StreamRequest::pan(-0.9)).await.unwrap_err();
        assert!(matches!(
            err,
            StreamError::Transport(TransportError::Rejected(_))
        ));

        let frames = decoded(&recording);
        assert_eq!(frames.len(), 5 + 3);
        // The rejected frame never consumed a sequence number.
        let seqs: Vec<u8> = frames.iter().map(|f| f.0).collect();
        assert_eq!(seqs, (40..48).collect::<Vec<u8>>());
        assert!(frames[5..].iter().all(|f| f.2 == CENTER));
    }

    /// Records every frame, but never finishes the write at `stall_at`.
    struct StallingTransport {
        inner: RecordingTransport,
        stall_at: usize,
        attempts: Mutex<usize>,
    }

    impl Transport for StallingTransport {
        async fn write(&self, bytes: &[u8]) -> cranelink_transport::Result<()> {
            let attempt = {
                let mut attempts = self.attempts.lock().unwrap();
                *attempts += 1;
                *attempts - 1
            };
            self.inner.write(bytes).await?;
            if attempt == self.stall_at {
                std::future::pending::<()>().await;
            }
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_mid_write_does_not_reuse_sequence() {
        let recording = RecordingTransport::new();
        let stalling = StallingTransport {
            inner: recording.clone(),
            stall_at: 4,
            attempts: Mutex::new(0),
        };
        let ctrl = StreamController::new(stalling).with_config(StreamConfig {
            initial_sequence: SequenceStart::Fixed(0),
            ..StreamConfig::default()
        });

        let result = tokio::time::timeout(
            Duration::from_millis(100),
            ctrl.run_session(&StreamRequest::pan(0.9).with_duration(5.0)),
        )
        .await;
        assert!(result.is_err(), "session should have been cut short");

        tokio::time::sleep(Duration::from_millis(10)).await;

        // Frame 4 reached the wire before the write stalled; the stop burst
        // continues after it.
        let frames = decoded(&recording);
        let seqs: Vec<u8> = frames.iter().map(|f| f.0).collect();
        assert_eq!(seqs, (0..8).collect::<Vec<u8>>());
        assert!(frames[5..].iter().all(|f| f.2 == CENTER));
    }

    #[tokio::test(start_paused = true)]
    async fn observer_sees_phases_and_every_frame() {
        let transport = RecordingTransport::new();
        let log = Arc::new(PhaseLog::default());
        controller(&transport, 0)
            .with_observer(log.clone())
            .run_session(&StreamRequest::tilt(0.8).with_duration(0.08).with_verbose(true))
            .await
            .unwrap();

        let phases = log.phases.lock().unwrap().clone();
        assert_eq!(
            phases,
            vec![
                SessionPhase::Idle,
                SessionPhase::Streaming,
                SessionPhase::Stopping,
                SessionPhase::Done
            ]
        );

        let frames = log.frames.lock().unwrap().clone();
        assert_eq!(
            frames,
            vec![
                (SessionPhase::Streaming, Some(0), true),
                (SessionPhase::Streaming, Some(0), true),
                (SessionPhase::Streaming, Some(0), true),
                (SessionPhase::Streaming, Some(1), true),
                (SessionPhase::Streaming, Some(1), true),
                (SessionPhase::Streaming, Some(1), true),
                (SessionPhase::Stopping, None, true),
                (SessionPhase::Stopping, None, true),
                (SessionPhase::Stopping, None, true),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn free_function_runs_default_session() {
        let transport = RecordingTransport::new();
        let report = run_session(transport.clone(), 0.0, 0.8, 1.0, 25.0, false)
            .await
            .unwrap();

        assert_eq!(report.frames_sent, 78);
        let frames = decoded(&transport);
        assert!(frames[..75]
            .iter()
            .filter(|f| f.1 == Axis::Tilt)
            .all(|f| f.2 == 3685));
        assert!(report.first_sequence <= 250);
    }
}
