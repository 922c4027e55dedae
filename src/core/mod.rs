pub mod config;

// Per-frame feature extraction
pub mod normalizer;
pub mod assembler;

// Session-level collection
pub mod recording;
pub mod collector;
