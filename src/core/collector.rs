use crate::core::assembler::assemble_frame;
use crate::core::config::PipelineConfig;
use crate::core::recording::{RecordingBuffer, SharedRecording};
use crate::models::features::{FrameRecord, NormalizeError, PipelineError, PipelineResult};
use crate::models::landmark::LandmarkFrame;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, Mutex, RwLock};
use tokio::task::JoinHandle;
use uuid::Uuid;

// ==============================================================================
// Sinks
// ==============================================================================

/// Destination for assembled frame records
#[async_trait]
pub trait FrameSink: Send + 'static {
    async fn consume(&mut self, record: FrameRecord) -> PipelineResult<()>;
}

#[async_trait]
impl FrameSink for SharedRecording {
    async fn consume(&mut self, record: FrameRecord) -> PipelineResult<()> {
        self.lock().await.push(record);
        Ok(())
    }
}

#[async_trait]
impl FrameSink for mpsc::Sender<FrameRecord> {
    async fn consume(&mut self, record: FrameRecord) -> PipelineResult<()> {
        self.send(record)
            .await
            .map_err(|_| PipelineError::SinkFailed("record receiver dropped".to_string()))
    }
}

// ==============================================================================
// Statistics
// ==============================================================================

/// Counters for one collection session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStatistics {
    pub session_id: String,
    pub frames_received: u64,
    pub frames_emitted: u64,
    pub frames_missing_reference: u64,
    pub frames_degenerate_scale: u64,
    pub frames_discarded: u64, // Rejected at submission because the channel was full
    pub frames_with_hands: u64,
    pub sink_errors: u64,
    pub average_processing_time_us: f64,
}

// ==============================================================================
// Feature Collector
// ==============================================================================

struct ActiveSession {
    session_id: String,
    frame_tx: mpsc::Sender<LandmarkFrame>,
    worker: JoinHandle<SessionStatistics>,
    drop_late_frames: bool,
    discarded: u64,
}

/// Runs the assembler over a stream of landmark frames.
///
/// Frames are assembled one at a time on a background task in submission
/// order; each frame is independent of the ones before it.
pub struct FeatureCollector {
    config: RwLock<PipelineConfig>,
    session: Mutex<Option<ActiveSession>>,
}

impl FeatureCollector {
    pub fn new(config: PipelineConfig) -> PipelineResult<Self> {
        config
            .validate()
            .map_err(|e| PipelineError::InvalidConfig(e.to_string()))?;

        Ok(Self {
            config: RwLock::new(config),
            session: Mutex::new(None),
        })
    }

    pub async fn config(&self) -> PipelineConfig {
        self.config.read().await.clone()
    }

    /// Replace the configuration. A running session keeps the settings it
    /// started with.
    pub async fn update_config(&self, config: PipelineConfig) -> PipelineResult<()> {
        config
            .validate()
            .map_err(|e| PipelineError::InvalidConfig(e.to_string()))?;
        *self.config.write().await = config;
        Ok(())
    }

    pub async fn is_collecting(&self) -> bool {
        self.session.lock().await.is_some()
    }

    pub async fn session_id(&self) -> Option<String> {
        self.session
            .lock()
            .await
            .as_ref()
            .map(|s| s.session_id.clone())
    }

    /// Start a collection session delivering records to `sink`
    pub async fn start_session<S: FrameSink>(&self, sink: S) -> PipelineResult<String> {
        let mut session = self.session.lock().await;
        if session.is_some() {
            return Err(PipelineError::AlreadyRunning);
        }

        let config = self.config.read().await.clone();
        let session_id = Uuid::new_v4().to_string();

        let (tx, rx) = mpsc::channel::<LandmarkFrame>(config.channel_capacity);
        let worker = tokio::spawn(Self::process_frames(
            session_id.clone(),
            rx,
            sink,
            config.clone(),
        ));

        *session = Some(ActiveSession {
            session_id: session_id.clone(),
            frame_tx: tx,
            worker,
            drop_late_frames: config.drop_late_frames,
            discarded: 0,
        });

        log::info!("Started feature collection for session {}", session_id);
        Ok(session_id)
    }

    /// Start a session recording into a buffer sized by `max_recorded_frames`
    pub async fn start_recording(&self) -> PipelineResult<(String, SharedRecording)> {
        let buffer = RecordingBuffer::from_config(&*self.config.read().await);
        let recording: SharedRecording = Arc::new(Mutex::new(buffer));
        let session_id = self.start_session(recording.clone()).await?;
        Ok((session_id, recording))
    }

    /// Queue one frame for assembly.
    ///
    /// Returns `Ok(false)` when the frame was discarded because the queue was
    /// full and late frames are dropped.
    pub async fn submit_frame(&self, frame: LandmarkFrame) -> PipelineResult<bool> {
        let tx = {
            let mut session = self.session.lock().await;
            let active = session.as_mut().ok_or(PipelineError::NotRunning)?;

            if !active.drop_late_frames {
                active.frame_tx.clone()
            } else {
                return match active.frame_tx.try_send(frame) {
                    Ok(()) => Ok(true),
                    Err(TrySendError::Full(frame)) => {
                        active.discarded += 1;
                        log::debug!("Discarded late frame at {}", frame.timestamp);
                        Ok(false)
                    }
                    Err(TrySendError::Closed(_)) => Err(PipelineError::ChannelClosed),
                };
            }
        };

        // Wait for room without holding the session lock
        tx.send(frame)
            .await
            .map_err(|_| PipelineError::ChannelClosed)?;
        Ok(true)
    }

    /// Stop the running session once every queued frame has been assembled
    pub async fn stop_session(&self) -> PipelineResult<SessionStatistics> {
        let active = self
            .session
            .lock()
            .await
            .take()
            .ok_or(PipelineError::NotRunning)?;

        // Dropping the sender lets the worker drain the queue and finish
        drop(active.frame_tx);
        let mut stats = active
            .worker
            .await
            .map_err(|e| PipelineError::WorkerFailed(e.to_string()))?;
        stats.frames_discarded = active.discarded;

        log::info!(
            "Stopped feature collection for session {}: {} of {} frames emitted",
            stats.session_id,
            stats.frames_emitted,
            stats.frames_received + stats.frames_discarded
        );
        Ok(stats)
    }

    /// Background task assembling queued frames and forwarding them to the sink
    async fn process_frames<S: FrameSink>(
        session_id: String,
        mut rx: mpsc::Receiver<LandmarkFrame>,
        mut sink: S,
        config: PipelineConfig,
    ) -> SessionStatistics {
        let mut stats = SessionStatistics {
            session_id: session_id.clone(),
            ..SessionStatistics::default()
        };
        let mut total_processing_us: u64 = 0;

        while let Some(frame) = rx.recv().await {
            let frame_index = stats.frames_received;
            stats.frames_received += 1;

            let start_time = std::time::Instant::now();
            let assembled = assemble_frame(
                &frame.body,
                &frame.hands,
                config.hand_policy,
                config.min_confidence,
            );
            let processing_time_us = start_time.elapsed().as_micros() as u64;

            let features = match assembled {
                Ok(features) => features,
                Err(NormalizeError::DegenerateScale) => {
                    stats.frames_degenerate_scale += 1;
                    log::debug!("Dropped frame {}: zero shoulder width", frame_index);
                    continue;
                }
                Err(e) => {
                    stats.frames_missing_reference += 1;
                    log::debug!("Dropped frame {}: {}", frame_index, e);
                    continue;
                }
            };

            total_processing_us += processing_time_us;
            stats.frames_emitted += 1;
            if features.hand_count() > 0 {
                stats.frames_with_hands += 1;
            }

            let record = FrameRecord {
                session_id: session_id.clone(),
                frame_index,
                timestamp: frame.timestamp,
                created_at: chrono::Utc::now().timestamp_millis(),
                features,
                processing_time_us,
            };

            if let Err(e) = sink.consume(record).await {
                stats.sink_errors += 1;
                log::warn!("Error delivering frame {}: {}", frame_index, e);
            }
        }

        if stats.frames_emitted > 0 {
            stats.average_processing_time_us =
                total_processing_us as f64 / stats.frames_emitted as f64;
        }
        stats
    }
}
