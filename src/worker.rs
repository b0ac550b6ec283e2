use std::thread;

use anyhow::anyhow;
use crossbeam_channel::{Receiver, Sender, TryRecvError, TrySendError, bounded, select};

use crate::{
    error::SlotClosed,
    pipeline::{PipelineStats, RecognitionPipeline},
    types::{LandmarkFrame, RecognitionEvent},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    Reset,
}

/// Single-slot handoff between capture and recognition. A new frame always
/// replaces one the recognizer has not picked up yet.
#[derive(Debug)]
pub struct FrameSlot {
    tx: Sender<LandmarkFrame>,
    stale_rx: Receiver<LandmarkFrame>,
    alive_rx: Receiver<()>,
}

/// Recognizer side of a [`FrameSlot`]. Dropping it closes the slot.
#[derive(Debug)]
pub struct FrameFeed {
    rx: Receiver<LandmarkFrame>,
    _alive: Sender<()>,
}

impl FrameFeed {
    pub fn receiver(&self) -> &Receiver<LandmarkFrame> {
        &self.rx
    }
}

impl FrameSlot {
    pub fn new() -> (Self, FrameFeed) {
        let (tx, rx) = bounded(1);
        let (alive_tx, alive_rx) = bounded(0);
        (
            Self {
                tx,
                stale_rx: rx.clone(),
                alive_rx,
            },
            FrameFeed {
                rx,
                _alive: alive_tx,
            },
        )
    }

    /// Never blocks. Returns `true` if an unconsumed frame was discarded, and
    /// fails once the [`FrameFeed`] has been dropped.
    pub fn publish(&self, frame: LandmarkFrame) -> Result<bool, SlotClosed> {
        // Nothing is ever sent on the liveness channel; it only disconnects.
        if let Err(TryRecvError::Disconnected) = self.alive_rx.try_recv() {
            return Err(SlotClosed);
        }

        let mut frame = frame;
        let mut replaced = false;
        loop {
            match self.tx.try_send(frame) {
                Ok(()) => return Ok(replaced),
                Err(TrySendError::Full(pending)) => {
                    if self.stale_rx.try_recv().is_ok() {
                        replaced = true;
                    }
                    frame = pending;
                }
                Err(TrySendError::Disconnected(_)) => return Err(SlotClosed),
            }
        }
    }
}

pub struct RecognizerHandle {
    control_tx: Sender<Control>,
    handle: thread::JoinHandle<PipelineStats>,
}

impl RecognizerHandle {
    /// Clears the smoothing window and cooldown table before the next frame.
    pub fn reset(&self) {
        if self.control_tx.send(Control::Reset).is_err() {
            log::warn!("recognizer worker already stopped, reset ignored");
        }
    }

    /// Waits for the worker to drain; it stops once every frame sender is dropped.
    pub fn join(self) -> anyhow::Result<PipelineStats> {
        drop(self.control_tx);
        self.handle
            .join()
            .map_err(|_| anyhow!("recognizer worker panicked"))
    }
}

pub fn start_recognizer(
    pipeline: RecognitionPipeline,
    feed: FrameFeed,
    event_tx: Sender<RecognitionEvent>,
) -> RecognizerHandle {
    let (control_tx, control_rx) = bounded(8);
    let handle = thread::spawn(move || run_worker_loop(pipeline, feed, control_rx, event_tx));
    RecognizerHandle { control_tx, handle }
}

fn run_worker_loop(
    mut pipeline: RecognitionPipeline,
    feed: FrameFeed,
    control_rx: Receiver<Control>,
    event_tx: Sender<RecognitionEvent>,
) -> PipelineStats {
    log::info!("recognizer worker started");
    // Holding `_alive` keeps the slot open for as long as this loop runs.
    let FrameFeed {
        rx: frame_rx,
        _alive,
    } = feed;

    let mut control_open = true;
    let mut frames_open = true;
    while control_open && frames_open {
        select! {
            recv(control_rx) -> msg => match msg {
                Ok(Control::Reset) => pipeline.reset_buffers(),
                Err(_) => control_open = false,
            },
            recv(frame_rx) -> msg => match msg {
                Ok(frame) => recognize(&mut pipeline, frame, &frame_rx, &event_tx),
                Err(_) => frames_open = false,
            },
        }
    }

    if frames_open {
        while let Ok(frame) = frame_rx.recv() {
            recognize(&mut pipeline, frame, &frame_rx, &event_tx);
        }
    }

    let stats = pipeline.stats();
    log::info!(
        "recognizer worker stopped after {} frames ({} events)",
        stats.frames,
        stats.emitted
    );
    stats
}

fn recognize(
    pipeline: &mut RecognitionPipeline,
    frame: LandmarkFrame,
    frame_rx: &Receiver<LandmarkFrame>,
    event_tx: &Sender<RecognitionEvent>,
) {
    let frame = latest_frame(frame, frame_rx);
    let Some(event) = pipeline.process_frame(&frame) else {
        return;
    };

    log::info!("recognized {}", event.display_text());
    match event_tx.try_send(event) {
        Ok(()) => {}
        Err(TrySendError::Full(event)) => {
            log::warn!("dispatcher busy, dropping {}", event.gesture);
        }
        Err(TrySendError::Disconnected(_)) => {
            log::debug!("no dispatcher attached");
        }
    }
}

// Drop stale frames if the recognizer is still busy to avoid backlog.
fn latest_frame(mut frame: LandmarkFrame, frame_rx: &Receiver<LandmarkFrame>) -> LandmarkFrame {
    while let Ok(newer) = frame_rx.try_recv() {
        frame = newer;
    }
    frame
}
