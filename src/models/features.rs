// Data models for normalized per-frame feature vectors

use serde::{Deserialize, Serialize};

// ==============================================================================
// Normalized Point
// ==============================================================================

/// A landmark in body-relative units: hundredths of a shoulder width,
/// measured from the nose and truncated toward zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NormalizedPoint {
    pub vertical: i32,
    pub horizontal: i32,
}

impl NormalizedPoint {
    pub fn new(vertical: i32, horizontal: i32) -> Self {
        Self {
            vertical,
            horizontal,
        }
    }
}

// ==============================================================================
// Normalization Errors
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum NormalizeError {
    #[error("Reference landmark (nose or shoulder) not detected")]
    MissingReference,

    #[error("Shoulder width is zero")]
    DegenerateScale,

    #[error("Landmark not detected")]
    MissingPoint,

    #[error("Landmark falls outside the overlay grid")]
    OutOfGridRange,
}

impl NormalizeError {
    /// Whether this error leaves the frame without a usable coordinate system
    pub fn is_frame_fatal(&self) -> bool {
        matches!(
            self,
            NormalizeError::MissingReference | NormalizeError::DegenerateScale
        )
    }

    /// Compact negative code used when a dense integer encoding is required
    pub fn code(&self) -> i32 {
        match self {
            NormalizeError::MissingReference => -1,
            NormalizeError::MissingPoint => -2,
            NormalizeError::DegenerateScale => -3,
            NormalizeError::OutOfGridRange => -4,
        }
    }
}

/// Outcome of normalizing one scheduled landmark
pub type FeatureSlot = Result<NormalizedPoint, NormalizeError>;

// ==============================================================================
// Frame Feature Vector
// ==============================================================================

/// Ordered feature slots for one frame: 8 body slots, then 6 slots per
/// included hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameFeatureVector {
    slots: Vec<FeatureSlot>,
}

impl FrameFeatureVector {
    /// Number of body slots at the head of every vector
    pub const BODY_SLOTS: usize = 8;
    /// Number of slots contributed by each included hand
    pub const HAND_SLOTS: usize = 6;

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, slot: FeatureSlot) {
        self.slots.push(slot);
    }

    pub fn slots(&self) -> &[FeatureSlot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of hand blocks appended after the body slots
    pub fn hand_count(&self) -> usize {
        self.slots.len().saturating_sub(Self::BODY_SLOTS) / Self::HAND_SLOTS
    }

    /// Number of slots whose landmark could not be normalized
    pub fn missing_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_err()).count()
    }

    /// Dense `[vertical, horizontal, ...]` encoding for classifier input.
    ///
    /// Failed slots are written as the error code on both axes. Those codes
    /// overlap legitimate small negative coordinates, so use `slots()` when
    /// the distinction matters.
    pub fn flatten(&self) -> Vec<i32> {
        let mut flat = Vec::with_capacity(self.slots.len() * 2);
        for slot in &self.slots {
            match slot {
                Ok(point) => {
                    flat.push(point.vertical);
                    flat.push(point.horizontal);
                }
                Err(e) => {
                    flat.push(e.code());
                    flat.push(e.code());
                }
            }
        }
        flat
    }
}

// ==============================================================================
// Frame Record
// ==============================================================================

/// One assembled frame as handed to a sink by the collection pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    pub session_id: String,
    pub frame_index: u64,
    pub timestamp: i64,  // Capture timestamp supplied with the landmarks
    pub created_at: i64, // Wall clock, milliseconds
    pub features: FrameFeatureVector,
    pub processing_time_us: u64,
}

// ==============================================================================
// Pipeline Errors
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("No collection session is running")]
    NotRunning,

    #[error("A collection session is already running")]
    AlreadyRunning,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Frame channel closed")]
    ChannelClosed,

    #[error("Sink failed: {0}")]
    SinkFailed(String),

    #[error("Collection worker failed: {0}")]
    WorkerFailed(String),
}

pub type PipelineResult<T> = Result<T, PipelineError>;
