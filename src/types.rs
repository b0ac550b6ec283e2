use std::{fmt, str::FromStr, time::Instant};

pub const NUM_LANDMARKS: usize = 21;

/// One anatomical keypoint. `x`/`y` share a unit (usually pixels), `z` is relative depth.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl From<[f32; 3]> for Landmark {
    fn from([x, y, z]: [f32; 3]) -> Self {
        Self { x, y, z }
    }
}

/// Landmarks of one detected hand, in detector order. Validity (exactly 21
/// finite points) is checked when features are extracted, not here.
pub type HandSkeleton = Vec<Landmark>;

/// Output of the hand detector for one captured frame.
#[derive(Clone, Debug)]
pub struct LandmarkFrame {
    pub timestamp: Instant,
    pub hands: Vec<HandSkeleton>,
}

impl LandmarkFrame {
    pub fn empty(timestamp: Instant) -> Self {
        Self {
            timestamp,
            hands: Vec::new(),
        }
    }

    pub fn primary_hand(&self) -> Option<&HandSkeleton> {
        self.hands.first()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 5] = [
        Finger::Thumb,
        Finger::Index,
        Finger::Middle,
        Finger::Ring,
        Finger::Pinky,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Finger::Thumb => "thumb",
            Finger::Index => "index",
            Finger::Middle => "middle",
            Finger::Ring => "ring",
            Finger::Pinky => "pinky",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GestureKind {
    Pinch,
    PeaceSign,
    ThumbsUp,
    Fist,
    OpenPalm,
}

impl GestureKind {
    pub const ALL: [GestureKind; 5] = [
        GestureKind::Pinch,
        GestureKind::PeaceSign,
        GestureKind::ThumbsUp,
        GestureKind::Fist,
        GestureKind::OpenPalm,
    ];

    /// Stable snake_case name used in logs, config and recorded data.
    pub fn label(&self) -> &'static str {
        match self {
            GestureKind::Pinch => "pinch",
            GestureKind::PeaceSign => "peace_sign",
            GestureKind::ThumbsUp => "thumbs_up",
            GestureKind::Fist => "fist",
            GestureKind::OpenPalm => "open_palm",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            GestureKind::Pinch => "Pinch",
            GestureKind::PeaceSign => "Peace sign",
            GestureKind::ThumbsUp => "Thumbs up",
            GestureKind::Fist => "Fist",
            GestureKind::OpenPalm => "Open palm",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            GestureKind::Pinch => "🤏 ",
            GestureKind::PeaceSign => "✌️ ",
            GestureKind::ThumbsUp => "👍 ",
            GestureKind::Fist => "✊ ",
            GestureKind::OpenPalm => "🖐 ",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            GestureKind::Pinch => "Thumb and index finger close together - controls volume",
            GestureKind::PeaceSign => {
                "Index and middle finger extended (V sign) - takes screenshot"
            }
            GestureKind::ThumbsUp => "Thumb extended upward - like action",
            GestureKind::Fist => "All fingers curled into fist - pause/play media",
            GestureKind::OpenPalm => "All fingers extended - stop action",
        }
    }
}

impl fmt::Display for GestureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown gesture label: {0}")]
pub struct UnknownGesture(pub String);

impl FromStr for GestureKind {
    type Err = UnknownGesture;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GestureKind::ALL
            .into_iter()
            .find(|kind| kind.label() == s)
            .ok_or_else(|| UnknownGesture(s.to_string()))
    }
}

/// Per-frame classifier or stabilizer output.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Recognition {
    NoGesture,
    Recognized { gesture: GestureKind, score: f32 },
}

impl Recognition {
    pub fn gesture(&self) -> Option<GestureKind> {
        match self {
            Recognition::NoGesture => None,
            Recognition::Recognized { gesture, .. } => Some(*gesture),
        }
    }

    pub fn confidence(&self) -> f32 {
        match self {
            Recognition::NoGesture => 0.0,
            Recognition::Recognized { score, .. } => *score,
        }
    }
}

/// A debounced, accepted gesture handed to the action dispatcher.
#[derive(Clone, Debug, PartialEq)]
pub struct RecognitionEvent {
    pub gesture: GestureKind,
    pub confidence: f32,
    pub timestamp: Instant,
}

impl RecognitionEvent {
    pub fn display_text(&self) -> String {
        format!(
            "{}{} ({:.0}%)",
            self.gesture.emoji(),
            self.gesture.display_name(),
            self.confidence * 100.0
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gesture_labels_parse_back() {
        for kind in GestureKind::ALL {
            assert_eq!(kind.label().parse::<GestureKind>(), Ok(kind));
        }
        assert!("wave".parse::<GestureKind>().is_err());
    }

    #[test]
    fn no_gesture_has_zero_confidence() {
        assert_eq!(Recognition::NoGesture.confidence(), 0.0);
        assert_eq!(Recognition::NoGesture.gesture(), None);
    }
}
