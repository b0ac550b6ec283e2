use std::collections::{HashMap, VecDeque};

use crate::types::{GestureKind, Recognition};

pub const DEFAULT_WINDOW: usize = 5;

/// Majority vote over the last `capacity` classifier outputs.
#[derive(Clone, Debug)]
pub struct Stabilizer {
    window: VecDeque<Recognition>,
    capacity: usize,
}

impl Stabilizer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            window: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.window.len() >= self.capacity
    }

    pub fn clear(&mut self) {
        self.window.clear();
    }

    pub fn push(&mut self, sample: Recognition) -> Recognition {
        if self.window.len() == self.capacity {
            self.window.pop_front();
        }
        self.window.push_back(sample);

        if !self.is_full() {
            return sample;
        }

        self.vote()
    }

    fn vote(&self) -> Recognition {
        let mut counts: HashMap<GestureKind, usize> = HashMap::new();
        let mut total_confidence = 0.0f32;
        let mut voters = 0usize;

        for sample in &self.window {
            if let Recognition::Recognized { gesture, score } = sample {
                *counts.entry(*gesture).or_default() += 1;
                total_confidence += *score;
                voters += 1;
            }
        }

        let Some((gesture, count)) = counts.into_iter().max_by_key(|&(_, count)| count) else {
            return Recognition::NoGesture;
        };

        if count < self.capacity / 2 + 1 {
            return Recognition::NoGesture;
        }

        // Confidence reflects the whole window, not only the winning label.
        Recognition::Recognized {
            gesture,
            score: total_confidence / voters as f32,
        }
    }
}

impl Default for Stabilizer {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seen(gesture: GestureKind, score: f32) -> Recognition {
        Recognition::Recognized { gesture, score }
    }

    #[test]
    fn passes_through_until_full() {
        let mut stabilizer = Stabilizer::new(5);
        let inputs = [
            seen(GestureKind::Fist, 0.95),
            Recognition::NoGesture,
            seen(GestureKind::Pinch, 0.81),
            seen(GestureKind::OpenPalm, 0.9),
        ];
        for input in inputs {
            assert_eq!(stabilizer.push(input), input);
        }
        assert_eq!(stabilizer.len(), 4);
    }

    #[test]
    fn majority_wins_with_window_mean() {
        let mut stabilizer = Stabilizer::new(5);
        let inputs = [
            seen(GestureKind::Fist, 0.95),
            seen(GestureKind::Fist, 0.95),
            seen(GestureKind::Fist, 0.95),
            seen(GestureKind::OpenPalm, 0.9),
            seen(GestureKind::OpenPalm, 0.9),
        ];
        let mut last = Recognition::NoGesture;
        for input in inputs {
            last = stabilizer.push(input);
        }
        assert_eq!(last.gesture(), Some(GestureKind::Fist));
        assert!((last.confidence() - 0.93).abs() < 1e-6);
    }

    #[test]
    fn no_majority_means_no_gesture() {
        let mut stabilizer = Stabilizer::new(5);
        let inputs = [
            seen(GestureKind::Fist, 0.95),
            seen(GestureKind::OpenPalm, 0.9),
            seen(GestureKind::Fist, 0.95),
            seen(GestureKind::OpenPalm, 0.9),
            seen(GestureKind::Pinch, 0.85),
        ];
        let mut last = seen(GestureKind::Fist, 1.0);
        for input in inputs {
            last = stabilizer.push(input);
        }
        assert_eq!(last, Recognition::NoGesture);
    }

    #[test]
    fn blank_frames_do_not_lower_confidence() {
        let mut stabilizer = Stabilizer::new(5);
        for _ in 0..2 {
            stabilizer.push(Recognition::NoGesture);
        }
        let mut last = Recognition::NoGesture;
        for score in [0.9, 0.95, 1.0] {
            last = stabilizer.push(seen(GestureKind::ThumbsUp, score));
        }
        assert_eq!(last.gesture(), Some(GestureKind::ThumbsUp));
        assert!((last.confidence() - 0.95).abs() < 1e-6);
    }

    #[test]
    fn evicts_oldest_sample() {
        let mut stabilizer = Stabilizer::new(3);
        for _ in 0..3 {
            stabilizer.push(seen(GestureKind::Fist, 0.95));
        }
        assert_eq!(stabilizer.push(Recognition::NoGesture).gesture(), Some(GestureKind::Fist));
        assert_eq!(stabilizer.push(Recognition::NoGesture), Recognition::NoGesture);
        assert_eq!(stabilizer.len(), 3);
    }

    #[test]
    fn clear_restarts_cold() {
        let mut stabilizer = Stabilizer::new(3);
        for _ in 0..3 {
            stabilizer.push(Recognition::NoGesture);
        }
        stabilizer.clear();
        assert!(stabilizer.is_empty());
        let input = seen(GestureKind::Pinch, 0.82);
        assert_eq!(stabilizer.push(input), input);
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let mut stabilizer = Stabilizer::new(0);
        assert_eq!(stabilizer.capacity(), 1);
        let input = seen(GestureKind::OpenPalm, 0.9);
        assert_eq!(stabilizer.push(input), input);
        assert_eq!(stabilizer.push(Recognition::NoGesture), Recognition::NoGesture);
    }
}
