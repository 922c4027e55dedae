use crate::core::assembler::HandPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Feature pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    /// Which detected hands are appended to each frame's vector
    pub hand_policy: HandPolicy,
    /// Landmarks below this confidence are treated as not detected (0.0-1.0)
    pub min_confidence: f32,
    /// Frames that may wait between submission and assembly
    pub channel_capacity: usize,
    /// Discard new frames instead of waiting when the channel is full
    pub drop_late_frames: bool,
    /// Frames kept by a session recording (0 = unbounded)
    pub max_recorded_frames: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            hand_policy: HandPolicy::RequireBothHands,
            min_confidence: 0.0,
            channel_capacity: 100,
            drop_late_frames: true,
            max_recorded_frames: 0,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from the default location, creating it with defaults if it doesn't exist
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        Self::load_from(&Self::get_config_path()?)
    }

    /// Load configuration from `path`, creating it with defaults if it doesn't exist
    pub fn load_from(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: PipelineConfig = serde_json::from_str(&contents)?;
            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        self.validate()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(format!(
                "Invalid minimum confidence: {}. Must be between 0.0 and 1.0",
                self.min_confidence
            )
            .into());
        }

        if self.channel_capacity == 0 || self.channel_capacity > 10_000 {
            return Err(format!(
                "Invalid channel capacity: {}. Must be between 1 and 10000",
                self.channel_capacity
            )
            .into());
        }

        if self.max_recorded_frames > 1_000_000 {
            return Err(format!(
                "Invalid recording size: {}. Must be at most 1000000 frames (0 = unbounded)",
                self.max_recorded_frames
            )
            .into());
        }

        Ok(())
    }

    /// Reset the default location to the default configuration
    pub fn reset() -> Result<Self, Box<dyn std::error::Error>> {
        let config = Self::default();
        config.save()?;
        Ok(config)
    }

    /// Get the configuration file path
    fn get_config_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .map_err(|_| "Could not determine home directory")?;

        let mut path = PathBuf::from(home);
        path.push(".signlang");
        path.push("config");
        path.push("settings.json");

        Ok(path)
    }
}
