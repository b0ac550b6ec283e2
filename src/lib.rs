pub mod config;
pub mod dispatch;
pub mod error;
pub mod pipeline;
pub mod source;
pub mod types;
pub mod worker;

pub use pipeline::{PipelineConfig, RecognitionPipeline};
pub use types::{GestureKind, HandSkeleton, Landmark, LandmarkFrame, Recognition, RecognitionEvent};
