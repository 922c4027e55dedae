pub mod core;
pub mod models;

pub use crate::core::assembler::{assemble_frame, HandPolicy, BODY_SCHEDULE, HAND_SCHEDULE, MAX_HANDS};
pub use crate::core::collector::{FeatureCollector, FrameSink, SessionStatistics};
pub use crate::core::config::PipelineConfig;
pub use crate::core::normalizer::{cell_index, normalize, ReferenceFrame};
pub use crate::core::recording::{RecordingBuffer, SharedRecording};
pub use crate::models::features::{
    FeatureSlot, FrameFeatureVector, FrameRecord, NormalizeError, NormalizedPoint, PipelineError,
    PipelineResult,
};
pub use crate::models::landmark::{
    BodyJoint, BodyLandmarks, HandJoint, HandLandmarks, ImageSize, Keypoint, LandmarkFrame, Point2D,
};
