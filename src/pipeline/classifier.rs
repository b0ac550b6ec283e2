use crate::{
    pipeline::geometry::{FeatureSet, extract_features},
    types::{Finger, GestureKind, Landmark, Recognition},
};

const PINCH_MAX_DISTANCE: f32 = 50.0;
const PEACE_MIN_TIP_SPREAD: f32 = 30.0;
const EXTENDED_BELOW: f32 = 0.3;
const CURLED_ABOVE: f32 = 0.7;
const FIST_CURLED_ABOVE: f32 = 0.8;

const PEACE_SCORE: f32 = 0.9;
const THUMBS_UP_SCORE: f32 = 0.9;
const FIST_SCORE: f32 = 0.95;
const OPEN_PALM_SCORE: f32 = 0.9;

/// A gesture that matched its trigger condition, before the confidence floor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GestureCandidate {
    pub gesture: GestureKind,
    pub score: f32,
}

struct GestureRule {
    gesture: GestureKind,
    min_confidence: f32,
    score: fn(&FeatureSet) -> Option<f32>,
}

// Ordered by specificity; equal scores resolve to the earlier rule.
const RULES: [GestureRule; 5] = [
    GestureRule {
        gesture: GestureKind::Fist,
        min_confidence: 0.9,
        score: fist,
    },
    GestureRule {
        gesture: GestureKind::PeaceSign,
        min_confidence: 0.85,
        score: peace_sign,
    },
    GestureRule {
        gesture: GestureKind::ThumbsUp,
        min_confidence: 0.8,
        score: thumbs_up,
    },
    GestureRule {
        gesture: GestureKind::OpenPalm,
        min_confidence: 0.8,
        score: open_palm,
    },
    GestureRule {
        gesture: GestureKind::Pinch,
        min_confidence: 0.8,
        score: pinch,
    },
];

pub fn min_confidence(gesture: GestureKind) -> f32 {
    RULES
        .iter()
        .find(|rule| rule.gesture == gesture)
        .map(|rule| rule.min_confidence)
        .unwrap_or(1.0)
}

/// Every gesture whose trigger condition holds, in tie-break priority order.
pub fn candidates(features: &FeatureSet) -> Vec<GestureCandidate> {
    RULES
        .iter()
        .filter_map(|rule| {
            (rule.score)(features).map(|score| GestureCandidate {
                gesture: rule.gesture,
                score,
            })
        })
        .collect()
}

/// Picks the highest scoring candidate that clears its own confidence floor.
pub fn classify(features: &FeatureSet) -> Recognition {
    let mut best: Option<GestureCandidate> = None;
    for candidate in candidates(features) {
        if candidate.score < min_confidence(candidate.gesture) {
            continue;
        }
        if best.is_none_or(|current| candidate.score > current.score) {
            best = Some(candidate);
        }
    }

    match best {
        Some(GestureCandidate { gesture, score }) => Recognition::Recognized { gesture, score },
        None => Recognition::NoGesture,
    }
}

/// Classifies a raw skeleton; anything that is not a valid 21-point hand is `NoGesture`.
pub fn classify_hand(skeleton: &[Landmark]) -> Recognition {
    match extract_features(skeleton) {
        Ok(features) => classify(&features),
        Err(_) => Recognition::NoGesture,
    }
}

pub fn pinch(features: &FeatureSet) -> Option<f32> {
    let dist = features.thumb_index_distance;
    (dist < PINCH_MAX_DISTANCE).then(|| 1.0 - dist / PINCH_MAX_DISTANCE)
}

pub fn peace_sign(features: &FeatureSet) -> Option<f32> {
    let matched = features.curl(Finger::Index) < EXTENDED_BELOW
        && features.curl(Finger::Middle) < EXTENDED_BELOW
        && features.curl(Finger::Ring) > CURLED_ABOVE
        && features.curl(Finger::Pinky) > CURLED_ABOVE
        && features.index_middle_distance > PEACE_MIN_TIP_SPREAD;
    matched.then_some(PEACE_SCORE)
}

pub fn thumbs_up(features: &FeatureSet) -> Option<f32> {
    let matched = features.curl(Finger::Thumb) < EXTENDED_BELOW
        && [Finger::Index, Finger::Middle, Finger::Ring, Finger::Pinky]
            .into_iter()
            .all(|finger| features.curl(finger) > CURLED_ABOVE);
    matched.then_some(THUMBS_UP_SCORE)
}

pub fn fist(features: &FeatureSet) -> Option<f32> {
    features
        .all_curled_above(FIST_CURLED_ABOVE)
        .then_some(FIST_SCORE)
}

pub fn open_palm(features: &FeatureSet) -> Option<f32> {
    features
        .all_curled_below(EXTENDED_BELOW)
        .then_some(OPEN_PALM_SCORE)
}
