use std::{
    fs::File,
    io::{BufRead, BufReader, Lines},
    path::Path,
    thread,
    time::{Duration, Instant},
};

use serde::Deserialize;

use crate::{
    error::SourceError,
    types::{HandSkeleton, Landmark, LandmarkFrame},
    worker::FrameSlot,
};

/// One line of recorded detector output.
#[derive(Debug, Deserialize)]
struct RecordedFrame {
    /// Seconds since the start of the recording.
    t: f64,
    #[serde(default)]
    hands: Vec<Vec<[f32; 3]>>,
}

/// Reads detector output recorded as JSON Lines:
/// `{"t": 0.033, "hands": [[[x, y, z], ...21 points], ...]}`.
pub struct LandmarkSource<R> {
    lines: Lines<R>,
    line: usize,
    base: Instant,
    max_hands: usize,
}

impl LandmarkSource<BufReader<File>> {
    pub fn open(path: &Path, base: Instant) -> Result<Self, SourceError> {
        let file = File::open(path)?;
        Ok(Self::from_reader(BufReader::new(file), base))
    }
}

impl<R: BufRead> LandmarkSource<R> {
    pub fn from_reader(reader: R, base: Instant) -> Self {
        Self {
            lines: reader.lines(),
            line: 0,
            base,
            max_hands: usize::MAX,
        }
    }

    /// Keeps at most `max_hands` hands per frame, like the detector would.
    pub fn with_max_hands(mut self, max_hands: usize) -> Self {
        self.max_hands = max_hands.max(1);
        self
    }

    fn decode(&self, raw: &str) -> Result<LandmarkFrame, SourceError> {
        let recorded: RecordedFrame =
            serde_json::from_str(raw).map_err(|source| SourceError::Parse {
                line: self.line,
                source,
            })?;
        let invalid = || SourceError::InvalidTimestamp {
            line: self.line,
            value: recorded.t,
        };
        let timestamp = Duration::try_from_secs_f64(recorded.t)
            .ok()
            .and_then(|offset| self.base.checked_add(offset))
            .ok_or_else(invalid)?;

        let hands = recorded
            .hands
            .into_iter()
            .take(self.max_hands)
            .map(|points| points.into_iter().map(Landmark::from).collect::<HandSkeleton>())
            .collect();

        Ok(LandmarkFrame {
            timestamp,
            hands,
        })
    }
}

impl<R: BufRead> Iterator for LandmarkSource<R> {
    type Item = Result<LandmarkFrame, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let raw = match self.lines.next()? {
                Ok(raw) => raw,
                Err(err) => return Some(Err(err.into())),
            };
            self.line += 1;
            if raw.trim().is_empty() {
                continue;
            }
            return Some(self.decode(&raw));
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReplayStats {
    pub published: u64,
    pub replaced: u64,
    pub skipped: u64,
}

/// Plays recorded frames into `slot` at their recorded pace, like a live camera.
/// Bad lines are skipped; read errors and a stopped recognizer end the replay.
pub fn start_replay<R>(
    source: LandmarkSource<R>,
    slot: FrameSlot,
) -> thread::JoinHandle<Result<ReplayStats, SourceError>>
where
    R: BufRead + Send + 'static,
{
    thread::spawn(move || {
        let mut stats = ReplayStats::default();
        for item in source {
            let frame = match item {
                Ok(frame) => frame,
                Err(SourceError::Io(err)) => return Err(SourceError::Io(err)),
                Err(err) => {
                    log::warn!("skipping frame: {err}");
                    stats.skipped += 1;
                    continue;
                }
            };

            if let Some(wait) = frame.timestamp.checked_duration_since(Instant::now()) {
                thread::sleep(wait);
            }

            match slot.publish(frame) {
                Ok(true) => stats.replaced += 1,
                Ok(false) => {}
                Err(err) => {
                    log::error!(
                        "replay stopped after {} frames: {err}",
                        stats.published
                    );
                    return Err(err.into());
                }
            }
            stats.published += 1;
        }
        log::info!(
            "replay finished: {} frames published, {} replaced before use, {} skipped",
            stats.published,
            stats.replaced,
            stats.skipped
        );
        Ok(stats)
    })
}
