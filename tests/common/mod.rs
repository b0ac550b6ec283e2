#![allow(dead_code)]

use std::time::{Duration, Instant};

use gesture_control::{Landmark, LandmarkFrame};

pub const FRAME_INTERVAL: Duration = Duration::from_millis(33);

/// Builds an upright right hand whose fingers have exactly the requested curl
/// ratios, in thumb, index, middle, ring, pinky order.
pub fn hand_with_curls(curls: [f32; 5]) -> Vec<Landmark> {
    let mut points = vec![Landmark::default(); 21];
    points[0] = Landmark::new(200.0, 300.0, 0.0);

    // Thumb reaches sideways: IP sits 20 from the MCP, a straight tip 30.
    let thumb_mcp = (140.0, 260.0);
    points[1] = Landmark::new(160.0, 280.0, 0.0);
    points[2] = Landmark::new(thumb_mcp.0, thumb_mcp.1, 0.0);
    points[3] = Landmark::new(thumb_mcp.0 - 20.0, thumb_mcp.1, 0.0);
    points[4] = Landmark::new(thumb_mcp.0 - 30.0 * (1.0 - curls[0]), thumb_mcp.1, -0.02);

    // Other fingers point up: PIP sits 20 above the MCP, a straight tip 40.
    let knuckles = [(165.0, 220.0), (200.0, 215.0), (230.0, 220.0), (260.0, 230.0)];
    for (finger, &(x, y)) in knuckles.iter().enumerate() {
        let base = 5 + finger * 4;
        let curl = curls[finger + 1];
        points[base] = Landmark::new(x, y, 0.0);
        points[base + 1] = Landmark::new(x, y - 20.0, 0.0);
        points[base + 2] = Landmark::new(x, y - 30.0, 0.0);
        points[base + 3] = Landmark::new(x, y - 40.0 * (1.0 - curl), -0.03);
    }
    points
}

pub fn fist() -> Vec<Landmark> {
    hand_with_curls([0.9; 5])
}

pub fn open_palm() -> Vec<Landmark> {
    hand_with_curls([0.1; 5])
}

pub fn peace_sign() -> Vec<Landmark> {
    hand_with_curls([0.5, 0.1, 0.1, 0.9, 0.9])
}

pub fn thumbs_up() -> Vec<Landmark> {
    hand_with_curls([0.1, 0.9, 0.9, 0.9, 0.9])
}

/// Tips 11.2 apart with everything else half bent: a pinch just under its floor.
pub fn loose_pinch() -> Vec<Landmark> {
    let mut points = hand_with_curls([0.5; 5]);
    points[4] = Landmark::new(100.0, 100.0, 0.0);
    points[8] = Landmark::new(110.0, 105.0, 0.0);
    points
}

pub fn frame_at(start: Instant, index: u32, hands: Vec<Vec<Landmark>>) -> LandmarkFrame {
    LandmarkFrame {
        timestamp: start + FRAME_INTERVAL * index,
        hands,
    }
}
