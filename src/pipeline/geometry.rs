use crate::{
    error::SkeletonError,
    types::{Finger, Landmark, NUM_LANDMARKS},
};

pub const THUMB_TIP: usize = 4;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_TIP: usize = 12;

// Tip-to-base reach of a straight finger, in multiples of the first segment.
const FINGER_REACH: f32 = 2.0;
const THUMB_REACH: f32 = 1.5;

/// Landmark indices of one finger, from the knuckle out: `[base, joint, next, tip]`.
/// For the thumb that is CMC, MCP, IP, tip; for the others MCP, PIP, DIP, tip.
pub fn finger_joints(finger: Finger) -> [usize; 4] {
    match finger {
        Finger::Thumb => [1, 2, 3, 4],
        Finger::Index => [5, 6, 7, 8],
        Finger::Middle => [9, 10, 11, 12],
        Finger::Ring => [13, 14, 15, 16],
        Finger::Pinky => [17, 18, 19, 20],
    }
}

/// Geometric features of one hand. Distances are in input units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FeatureSet {
    pub thumb_index_distance: f32,
    pub index_middle_distance: f32,
    /// Curl ratio per finger in `Finger::ALL` order. 0 is straight, 1 fully curled.
    pub curls: [f32; 5],
}

impl FeatureSet {
    pub fn curl(&self, finger: Finger) -> f32 {
        self.curls[finger as usize]
    }

    pub fn all_curled_above(&self, threshold: f32) -> bool {
        self.curls.iter().all(|&c| c > threshold)
    }

    pub fn all_curled_below(&self, threshold: f32) -> bool {
        self.curls.iter().all(|&c| c < threshold)
    }
}

pub fn extract_features(skeleton: &[Landmark]) -> Result<FeatureSet, SkeletonError> {
    if skeleton.len() != NUM_LANDMARKS {
        return Err(SkeletonError::WrongLandmarkCount {
            got: skeleton.len(),
        });
    }
    if let Some(index) = skeleton.iter().position(|p| !p.is_finite()) {
        return Err(SkeletonError::NonFiniteCoordinate { index });
    }

    Ok(FeatureSet {
        thumb_index_distance: distance(skeleton[THUMB_TIP], skeleton[INDEX_TIP]),
        index_middle_distance: distance(skeleton[INDEX_TIP], skeleton[MIDDLE_TIP]),
        curls: Finger::ALL.map(|finger| curl_ratio(skeleton, finger)),
    })
}

/// Planar distance; depth is too noisy to contribute.
pub fn distance(a: Landmark, b: Landmark) -> f32 {
    ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
}

fn curl_ratio(points: &[Landmark], finger: Finger) -> f32 {
    let [base, joint, next, tip] = finger_joints(finger);
    match finger {
        // Thumb bends around its MCP, measured against the MCP-IP segment.
        Finger::Thumb => bend_ratio(points[tip], points[joint], points[next], THUMB_REACH),
        _ => bend_ratio(points[tip], points[base], points[joint], FINGER_REACH),
    }
}

fn bend_ratio(tip: Landmark, base: Landmark, joint: Landmark, reach: f32) -> f32 {
    let tip_to_base = distance(tip, base);
    let joint_to_base = distance(joint, base);
    if joint_to_base <= 0.0 {
        return 0.0;
    }

    let curl = 1.0 - tip_to_base / (joint_to_base * reach);
    if curl.is_nan() {
        0.0
    } else {
        curl.clamp(0.0, 1.0)
    }
}
