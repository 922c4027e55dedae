// Data models for landmarks coming in and feature vectors going out

pub mod features;
pub mod landmark;
