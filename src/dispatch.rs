use std::{fmt, thread, time::Duration};

use anyhow::anyhow;
use crossbeam_channel::{Receiver, Sender, bounded, select};

use crate::{
    pipeline::cooldown::CooldownGate,
    types::{GestureKind, RecognitionEvent},
};

pub const DEFAULT_VOLUME_STEP: u32 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    AdjustVolume { delta: i32 },
    Screenshot,
    Like,
    ToggleMedia,
    StopMedia,
}

impl Action {
    pub fn for_event(event: &RecognitionEvent, volume_step: u32) -> Action {
        Action::for_gesture(event.gesture, event.confidence, volume_step)
    }

    /// Default gesture policy. Pinch volume change scales with how far the
    /// confidence sits above one half.
    pub fn for_gesture(gesture: GestureKind, confidence: f32, volume_step: u32) -> Action {
        match gesture {
            GestureKind::Pinch => Action::AdjustVolume {
                delta: ((confidence - 0.5) * volume_step as f32 * 2.0) as i32,
            },
            GestureKind::PeaceSign => Action::Screenshot,
            GestureKind::ThumbsUp => Action::Like,
            GestureKind::Fist => Action::ToggleMedia,
            GestureKind::OpenPalm => Action::StopMedia,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Action::AdjustVolume { .. } => "Volume Control",
            Action::Screenshot => "Take Screenshot",
            Action::Like => "Like Action",
            Action::ToggleMedia => "Pause/Play Media",
            Action::StopMedia => "Stop Media",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::AdjustVolume { delta } => write!(f, "{} ({delta:+})", self.label()),
            _ => f.write_str(self.label()),
        }
    }
}

pub fn gesture_mappings() -> Vec<(GestureKind, &'static str)> {
    GestureKind::ALL
        .into_iter()
        .map(|gesture| {
            let action = Action::for_gesture(gesture, 1.0, DEFAULT_VOLUME_STEP);
            (gesture, action.label())
        })
        .collect()
}

/// Performs actions against the host (audio, input automation, media keys).
pub trait ActionBackend: Send + 'static {
    fn perform(&mut self, action: &Action) -> anyhow::Result<()>;

    fn stop_all(&mut self) {}
}

/// Backend that only reports what it would do.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogBackend;

impl ActionBackend for LogBackend {
    fn perform(&mut self, action: &Action) -> anyhow::Result<()> {
        log::info!("action: {action}");
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DispatchConfig {
    pub action_cooldown: Duration,
    pub volume_step: u32,
    pub enable_audio_control: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            action_cooldown: Duration::from_secs(1),
            volume_step: DEFAULT_VOLUME_STEP,
            enable_audio_control: true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    Executed(Action),
    /// Volume change rounded to zero; nothing to do.
    NoOp,
    CoolingDown,
    Disabled,
    Failed,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub executed: u64,
    pub skipped: u64,
    pub failed: u64,
}

pub struct ActionDispatcher<B> {
    backend: B,
    config: DispatchConfig,
    cooldown: CooldownGate,
    stats: DispatchStats,
}

impl<B: ActionBackend> ActionDispatcher<B> {
    pub fn new(backend: B, config: DispatchConfig) -> Self {
        Self {
            backend,
            cooldown: CooldownGate::new(config.action_cooldown),
            config,
            stats: DispatchStats::default(),
        }
    }

    pub fn stats(&self) -> DispatchStats {
        self.stats
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn dispatch(&mut self, event: &RecognitionEvent) -> DispatchOutcome {
        let outcome = self.try_dispatch(event);
        match outcome {
            DispatchOutcome::Executed(_) | DispatchOutcome::NoOp => self.stats.executed += 1,
            DispatchOutcome::CoolingDown | DispatchOutcome::Disabled => self.stats.skipped += 1,
            DispatchOutcome::Failed => self.stats.failed += 1,
        }
        outcome
    }

    fn try_dispatch(&mut self, event: &RecognitionEvent) -> DispatchOutcome {
        if event.gesture == GestureKind::Pinch && !self.config.enable_audio_control {
            log::debug!("audio control disabled, ignoring pinch");
            return DispatchOutcome::Disabled;
        }

        if !self.cooldown.admit(event.gesture, event.timestamp) {
            log::debug!("action for {} still cooling down", event.gesture);
            return DispatchOutcome::CoolingDown;
        }

        let action = Action::for_event(event, self.config.volume_step);
        if action == (Action::AdjustVolume { delta: 0 }) {
            return DispatchOutcome::NoOp;
        }

        match self.backend.perform(&action) {
            Ok(()) => {
                log::info!(
                    "executed {action} for {} with confidence {:.2}",
                    event.gesture,
                    event.confidence
                );
                DispatchOutcome::Executed(action)
            }
            Err(err) => {
                log::warn!("failed to execute {action} for {}: {err:?}", event.gesture);
                DispatchOutcome::Failed
            }
        }
    }

    /// Halts anything in progress and forgets action cooldowns.
    pub fn emergency_stop(&mut self) {
        log::warn!("emergency stop activated");
        self.backend.stop_all();
        self.cooldown.clear();
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatchControl {
    EmergencyStop,
}

pub struct DispatcherHandle {
    control_tx: Sender<DispatchControl>,
    handle: thread::JoinHandle<DispatchStats>,
}

impl DispatcherHandle {
    /// Halts the backend and clears action cooldowns before the next event.
    pub fn emergency_stop(&self) {
        if self.control_tx.send(DispatchControl::EmergencyStop).is_err() {
            log::warn!("action dispatcher already stopped, emergency stop ignored");
        }
    }

    /// Waits for the dispatcher to finish; it stops once every event sender is dropped.
    pub fn join(self) -> anyhow::Result<DispatchStats> {
        drop(self.control_tx);
        self.handle
            .join()
            .map_err(|_| anyhow!("action dispatcher panicked"))
    }
}

/// Runs the dispatcher on its own thread so slow host calls never hold up
/// recognition.
pub fn start_dispatcher<B: ActionBackend>(
    dispatcher: ActionDispatcher<B>,
    event_rx: Receiver<RecognitionEvent>,
) -> DispatcherHandle {
    let (control_tx, control_rx) = bounded(4);
    let handle = thread::spawn(move || run_dispatch_loop(dispatcher, event_rx, control_rx));
    DispatcherHandle { control_tx, handle }
}

fn run_dispatch_loop<B: ActionBackend>(
    mut dispatcher: ActionDispatcher<B>,
    event_rx: Receiver<RecognitionEvent>,
    control_rx: Receiver<DispatchControl>,
) -> DispatchStats {
    log::info!("action dispatcher started");

    let mut control_open = true;
    let mut events_open = true;
    while control_open && events_open {
        select! {
            recv(control_rx) -> msg => match msg {
                Ok(DispatchControl::EmergencyStop) => dispatcher.emergency_stop(),
                Err(_) => control_open = false,
            },
            recv(event_rx) -> msg => match msg {
                Ok(event) => {
                    dispatcher.dispatch(&event);
                }
                Err(_) => events_open = false,
            },
        }
    }

    if events_open {
        for event in event_rx.iter() {
            dispatcher.dispatch(&event);
        }
    }

    dispatcher.backend.stop_all();
    let stats = dispatcher.stats();
    log::info!(
        "action dispatcher stopped ({} executed, {} skipped, {} failed)",
        stats.executed,
        stats.skipped,
        stats.failed
    );
    stats
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use anyhow::bail;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        performed: Vec<Action>,
        fail: bool,
        stopped: bool,
    }

    impl ActionBackend for Recorder {
        fn perform(&mut self, action: &Action) -> anyhow::Result<()> {
            if self.fail {
                bail!("host refused {action}");
            }
            self.performed.push(*action);
            Ok(())
        }

        fn stop_all(&mut self) {
            self.stopped = true;
        }
    }

    fn event(gesture: GestureKind, confidence: f32, timestamp: Instant) -> RecognitionEvent {
        RecognitionEvent {
            gesture,
            confidence,
            timestamp,
        }
    }

    #[test]
    fn maps_each_gesture_to_its_action() {
        let now = Instant::now();
        assert_eq!(
            Action::for_event(&event(GestureKind::PeaceSign, 0.9, now), 5),
            Action::Screenshot
        );
        assert_eq!(
            Action::for_event(&event(GestureKind::ThumbsUp, 0.9, now), 5),
            Action::Like
        );
        assert_eq!(
            Action::for_event(&event(GestureKind::Fist, 0.95, now), 5),
            Action::ToggleMedia
        );
        assert_eq!(
            Action::for_event(&event(GestureKind::OpenPalm, 0.9, now), 5),
            Action::StopMedia
        );
        assert_eq!(
            Action::for_event(&event(GestureKind::Pinch, 1.0, now), 5),
            Action::AdjustVolume { delta: 5 }
        );
    }

    #[test]
    fn action_cooldown_is_per_gesture() {
        let mut dispatcher = ActionDispatcher::new(Recorder::default(), DispatchConfig::default());
        let t = Instant::now();
        let later = t + Duration::from_millis(200);

        assert_eq!(
            dispatcher.dispatch(&event(GestureKind::Fist, 0.95, t)),
            DispatchOutcome::Executed(Action::ToggleMedia)
        );
        assert_eq!(
            dispatcher.dispatch(&event(GestureKind::Fist, 0.95, later)),
            DispatchOutcome::CoolingDown
        );
        assert_eq!(
            dispatcher.dispatch(&event(GestureKind::OpenPalm, 0.9, later)),
            DispatchOutcome::Executed(Action::StopMedia)
        );
        assert_eq!(
            dispatcher.backend().performed,
            vec![Action::ToggleMedia, Action::StopMedia]
        );
    }

    #[test]
    fn disabled_audio_skips_pinch() {
        let config = DispatchConfig {
            enable_audio_control: false,
            ..DispatchConfig::default()
        };
        let mut dispatcher = ActionDispatcher::new(Recorder::default(), config);
        let outcome = dispatcher.dispatch(&event(GestureKind::Pinch, 1.0, Instant::now()));
        assert_eq!(outcome, DispatchOutcome::Disabled);
        assert!(dispatcher.backend().performed.is_empty());
    }

    #[test]
    fn neutral_pinch_is_a_no_op() {
        let mut dispatcher = ActionDispatcher::new(Recorder::default(), DispatchConfig::default());
        let outcome = dispatcher.dispatch(&event(GestureKind::Pinch, 0.5, Instant::now()));
        assert_eq!(outcome, DispatchOutcome::NoOp);
        assert!(dispatcher.backend().performed.is_empty());
    }

    #[test]
    fn backend_failure_is_contained() {
        let backend = Recorder {
            fail: true,
            ..Recorder::default()
        };
        let mut dispatcher = ActionDispatcher::new(backend, DispatchConfig::default());
        let outcome = dispatcher.dispatch(&event(GestureKind::ThumbsUp, 0.9, Instant::now()));
        assert_eq!(outcome, DispatchOutcome::Failed);
        assert_eq!(dispatcher.stats().failed, 1);
    }

    #[test]
    fn emergency_stop_clears_cooldowns() {
        let mut dispatcher = ActionDispatcher::new(Recorder::default(), DispatchConfig::default());
        let t = Instant::now();
        dispatcher.dispatch(&event(GestureKind::Fist, 0.95, t));
        dispatcher.emergency_stop();
        assert!(dispatcher.backend().stopped);
        assert_eq!(
            dispatcher.dispatch(&event(GestureKind::Fist, 0.95, t)),
            DispatchOutcome::Executed(Action::ToggleMedia)
        );
    }

    #[test]
    fn mappings_cover_all_gestures() {
        let mappings = gesture_mappings();
        assert_eq!(mappings.len(), 5);
        assert!(mappings.contains(&(GestureKind::PeaceSign, "Take Screenshot")));
    }
}
