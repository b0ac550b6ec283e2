use std::time::{Duration, Instant};

use crate::{
    pipeline::{
        classifier::classify,
        cooldown::{CooldownGate, DEFAULT_COOLDOWN},
        geometry::extract_features,
        stabilizer::{DEFAULT_WINDOW, Stabilizer},
    },
    types::{GestureKind, Landmark, LandmarkFrame, Recognition, RecognitionEvent},
};

pub const DEFAULT_GESTURE_THRESHOLD: f32 = 0.85;

#[derive(Clone, Debug, PartialEq)]
pub struct PipelineConfig {
    /// Reported through [`GestureInfo`]; acceptance uses the per-gesture floors.
    pub gesture_threshold: f32,
    pub cooldown_period: Duration,
    pub smoothing_buffer_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            gesture_threshold: DEFAULT_GESTURE_THRESHOLD,
            cooldown_period: DEFAULT_COOLDOWN,
            smoothing_buffer_size: DEFAULT_WINDOW,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub frames: u64,
    pub no_hand: u64,
    pub malformed: u64,
    pub suppressed: u64,
    pub emitted: u64,
}

#[derive(Clone, Debug)]
pub struct GestureInfo {
    pub supported: Vec<(GestureKind, &'static str)>,
    pub gesture_threshold: f32,
    pub cooldown_period: Duration,
}

/// Per-frame driver: geometry, classification, smoothing, debounce.
///
/// Owns the smoothing window and the cooldown table; they change only through
/// [`RecognitionPipeline::process`] and [`RecognitionPipeline::reset_buffers`].
#[derive(Debug)]
pub struct RecognitionPipeline {
    config: PipelineConfig,
    stabilizer: Stabilizer,
    cooldown: CooldownGate,
    stats: PipelineStats,
}

impl RecognitionPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        log::info!(
            "recognition pipeline ready (window {}, cooldown {:?})",
            config.smoothing_buffer_size,
            config.cooldown_period
        );
        Self {
            stabilizer: Stabilizer::new(config.smoothing_buffer_size),
            cooldown: CooldownGate::new(config.cooldown_period),
            stats: PipelineStats::default(),
            config,
        }
    }

    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    /// Runs one detector frame through the pipeline, using only the first hand.
    pub fn process_frame(&mut self, frame: &LandmarkFrame) -> Option<RecognitionEvent> {
        self.process(frame.primary_hand().map(Vec::as_slice), frame.timestamp)
    }

    /// Runs one hand (or its absence) through the pipeline. Returns an event only
    /// for a stable gesture that is out of cooldown.
    pub fn process(&mut self, hand: Option<&[Landmark]>, now: Instant) -> Option<RecognitionEvent> {
        self.stats.frames += 1;

        let raw = match hand {
            None => {
                self.stats.no_hand += 1;
                Recognition::NoGesture
            }
            Some(points) => match extract_features(points) {
                Ok(features) => classify(&features),
                Err(err) => {
                    self.stats.malformed += 1;
                    log::debug!("treating frame as no hand: {err}");
                    Recognition::NoGesture
                }
            },
        };

        let Recognition::Recognized {
            gesture,
            score: confidence,
        } = self.stabilizer.push(raw)
        else {
            return None;
        };

        if !self.cooldown.admit(gesture, now) {
            self.stats.suppressed += 1;
            log::debug!("{gesture} suppressed by cooldown");
            return None;
        }

        self.stats.emitted += 1;
        Some(RecognitionEvent {
            gesture,
            confidence,
            timestamp: now,
        })
    }

    /// Empties the smoothing window and the cooldown table.
    pub fn reset_buffers(&mut self) {
        self.stabilizer.clear();
        self.cooldown.clear();
        log::info!("gesture recognition buffers reset");
    }

    pub fn gesture_info(&self) -> GestureInfo {
        GestureInfo {
            supported: GestureKind::ALL
                .into_iter()
                .map(|kind| (kind, kind.description()))
                .collect(),
            gesture_threshold: self.config.gesture_threshold,
            cooldown_period: self.config.cooldown_period,
        }
    }
}

impl Default for RecognitionPipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}
