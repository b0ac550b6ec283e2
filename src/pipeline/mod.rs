pub mod classifier;
pub mod cooldown;
pub mod geometry;
pub mod recognizer;
pub mod stabilizer;

// Re-exports for convenience
pub use classifier::{GestureCandidate, classify, classify_hand};
pub use cooldown::CooldownGate;
pub use geometry::{FeatureSet, extract_features};
pub use recognizer::{GestureInfo, PipelineConfig, PipelineStats, RecognitionPipeline};
pub use stabilizer::Stabilizer;
