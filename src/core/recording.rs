// Recording buffer - accumulates assembled frames over a collection session

use crate::core::config::PipelineConfig;
use crate::models::features::{FrameFeatureVector, FrameRecord};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Recording shared between a running collector and its owner
pub type SharedRecording = Arc<Mutex<RecordingBuffer>>;

/// Chronological store of frame records.
///
/// With a capacity the oldest record is evicted once full; capacity 0 keeps
/// everything.
#[derive(Debug, Clone, Default)]
pub struct RecordingBuffer {
    records: VecDeque<FrameRecord>,
    capacity: usize,
    evicted: u64,
}

impl RecordingBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
            evicted: 0,
        }
    }

    pub fn unbounded() -> Self {
        Self::new(0)
    }

    pub fn shared(capacity: usize) -> SharedRecording {
        Arc::new(Mutex::new(Self::new(capacity)))
    }

    /// Buffer sized by `max_recorded_frames`
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.max_recorded_frames)
    }

    pub fn push(&mut self, record: FrameRecord) {
        if self.capacity > 0 && self.records.len() == self.capacity {
            self.records.pop_front();
            self.evicted += 1;
        }
        self.records.push_back(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records evicted to respect the capacity
    pub fn evicted(&self) -> u64 {
        self.evicted
    }

    pub fn frames(&self) -> impl Iterator<Item = &FrameRecord> {
        self.records.iter()
    }

    pub fn latest(&self) -> Option<&FrameRecord> {
        self.records.back()
    }

    /// One flattened feature row per frame, oldest first
    pub fn to_matrix(&self) -> Vec<Vec<i32>> {
        self.records
            .iter()
            .map(|record| record.features.flatten())
            .collect()
    }

    pub fn feature_vectors(&self) -> Vec<FrameFeatureVector> {
        self.records.iter().map(|record| record.features.clone()).collect()
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.evicted = 0;
    }
}
