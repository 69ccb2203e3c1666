//! Per-frame gesture controller.
//!
//! Owns every piece of gesture state (stabilizer, swipe tracker, cooldown
//! registry) so independent instances never share anything but the store and
//! the action lock. Each frame runs classify, stabilize, lock and dispatch in
//! that order; the swipe path runs alongside the pose path every frame.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use vitrine_core::{HandFrame, InputSource, Timestamp, VitrineConfig};
use vitrine_gesture::{
    CooldownKey, CooldownRegistry, DwellStabilizer, GestureCandidate, GestureClassifier,
    StabilizerEvent, SwipeDetection, SwipeDetector,
};
use vitrine_store::Store;

use crate::action::Action;
use crate::dispatcher::{Dispatcher, Outcome};
use crate::feedback::{FeedbackBus, GestureSignal};
use crate::lock::ActionLock;

/// What happened to one action the frame produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Dispatch {
    Applied(Outcome),
    /// Lock held by another input; the action was dropped
    LockBusy(Action),
}

/// Everything one frame produced, for callers and tests
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameReport {
    pub candidate: GestureCandidate,
    pub stabilizer: Vec<StabilizerEvent>,
    pub swipe: Option<SwipeDetection>,
    pub dispatches: Vec<Dispatch>,
}

impl FrameReport {
    pub fn outcomes(&self) -> impl Iterator<Item = &Outcome> {
        self.dispatches.iter().filter_map(|d| match d {
            Dispatch::Applied(outcome) => Some(outcome),
            Dispatch::LockBusy(_) => None,
        })
    }
}

pub struct GesturePipeline {
    classifier: GestureClassifier,
    stabilizer: DwellStabilizer,
    swipe: SwipeDetector,
    cooldowns: CooldownRegistry,
    dispatcher: Dispatcher,
    lock: Arc<ActionLock>,
    feedback: FeedbackBus,
    active: bool,
}

impl GesturePipeline {
    pub fn new(config: &VitrineConfig, store: Arc<Store>, lock: Arc<ActionLock>) -> Self {
        info!(
            "Gesture pipeline created (hold {}ms, swipe cooldown {}ms)",
            config.stabilizer.hold_duration_ms, config.cooldown.swipe_ms
        );
        Self {
            classifier: GestureClassifier::new(config.classifier.clone()),
            stabilizer: DwellStabilizer::new(config.stabilizer.clone()),
            swipe: SwipeDetector::new(config.swipe.clone()),
            cooldowns: CooldownRegistry::new(config.cooldown.clone()),
            dispatcher: Dispatcher::new(store),
            lock,
            feedback: FeedbackBus::new(),
            active: true,
        }
    }

    /// Publish on a shared bus instead of a private one
    pub fn with_feedback(mut self, feedback: FeedbackBus) -> Self {
        self.feedback = feedback;
        self
    }

    pub fn feedback(&self) -> &FeedbackBus {
        &self.feedback
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn stabilizer(&self) -> &DwellStabilizer {
        &self.stabilizer
    }

    pub fn swipe(&self) -> &SwipeDetector {
        &self.swipe
    }

    pub fn cooldowns(&self) -> &CooldownRegistry {
        &self.cooldowns
    }

    pub fn start(&mut self) {
        if !self.active {
            info!("Gesture pipeline started");
            self.active = true;
        }
    }

    /// Stop processing and drop all transient state, including a
    /// gesture-held lock. Cooldown history is kept.
    pub fn shutdown(&mut self) {
        self.active = false;
        self.stabilizer.reset();
        self.swipe.reset();
        if self.lock.release(InputSource::Gesture) {
            debug!("Released gesture-held action lock on shutdown");
        }
        info!("Gesture pipeline stopped");
    }

    pub fn process_frame(&mut self, frame: &HandFrame) -> FrameReport {
        if !self.active {
            trace!("Pipeline stopped, ignoring frame");
            return FrameReport::default();
        }

        let now = frame.timestamp;
        let mut report = FrameReport {
            candidate: self.classifier.classify(frame.hand.as_ref()),
            ..FrameReport::default()
        };

        self.track_swipe(frame, now, &mut report);

        report.stabilizer = self.stabilizer.advance(&report.candidate, now);
        for event in report.stabilizer.clone() {
            match event {
                StabilizerEvent::Progress { kind, progress } => {
                    self.feedback.gesture(GestureSignal::Progress { kind, progress });
                }
                StabilizerEvent::Failed { kind, .. } => {
                    self.feedback.gesture(GestureSignal::Failure { kind });
                }
                StabilizerEvent::Confirmed { kind } => {
                    if !self.cooldowns.try_fire(CooldownKey::Pose(kind), now) {
                        debug!("{} confirmed during cooldown, ignoring", kind);
                        continue;
                    }
                    let Some(action) = Action::from_gesture(kind) else {
                        trace!("{} is a rest pose", kind);
                        continue;
                    };
                    info!("Gesture {} confirmed -> {}", kind, action);
                    let dispatch = self.fire(action, now);
                    let signal = match dispatch {
                        Dispatch::Applied(_) => GestureSignal::Success { kind },
                        Dispatch::LockBusy(_) => GestureSignal::Failure { kind },
                    };
                    self.feedback.gesture(signal);
                    report.dispatches.push(dispatch);
                }
            }
        }

        report
    }

    /// Swipes need a pointing hand; anything else drops the anchor
    fn track_swipe(&mut self, frame: &HandFrame, now: Timestamp, report: &mut FrameReport) {
        let pointing = frame
            .hand
            .as_ref()
            .filter(|hand| self.classifier.is_pointing(&hand.landmarks));
        let Some(hand) = pointing else {
            self.swipe.release_anchor();
            return;
        };

        let wrist = hand.landmarks.wrist();
        if !self.cooldowns.is_ready(CooldownKey::Swipe, now) {
            self.swipe.follow(wrist.x, wrist.y, now);
            return;
        }

        let Some(detection) = self.swipe.update(wrist.x, wrist.y, now) else {
            return;
        };
        self.cooldowns.record(CooldownKey::Swipe, now);
        info!(
            "Swipe {} (dx={:.3}, threshold {:.2})",
            detection.direction, detection.delta_x, detection.threshold
        );
        self.feedback.gesture(GestureSignal::Swipe {
            direction: detection.direction,
        });
        report.swipe = Some(detection);
        let dispatch = self.fire(Action::from_swipe(detection.direction), now);
        report.dispatches.push(dispatch);
    }

    /// Dispatch under a scoped gesture hold on the lock
    fn fire(&self, action: Action, now: Timestamp) -> Dispatch {
        let Some(_guard) = self.lock.guard_at(InputSource::Gesture, now) else {
            debug!("Action lock busy, dropping gesture '{}'", action);
            return Dispatch::LockBusy(action);
        };
        let outcome = self.dispatcher.dispatch(&action);
        self.feedback.message(outcome.feedback.clone());
        Dispatch::Applied(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::Effect;
    use crate::feedback::UiSignal;
    use vitrine_core::{AppMode, HandObservation, ModelGesture, ModelLabel};
    use vitrine_gesture::poses::{open_hand, pointing_hand};
    use vitrine_gesture::{GestureKind, SwipeDirection};
    use vitrine_store::{Product, ProductId};

    const FRAME_MS: i64 = 33;

    fn store() -> Arc<Store> {
        Arc::new(Store::new(vec![
            Product::new("cup", "Espresso Cup", "kitchen", 1250, 3),
            Product::new("rake", "Leaf Rake", "garden", 2400, 2),
            Product::new("pot", "Moka Pot", "kitchen", 3900, 5),
        ]))
    }

    fn pipeline(store: Arc<Store>, lock: Arc<ActionLock>) -> GesturePipeline {
        GesturePipeline::new(&VitrineConfig::default(), store, lock)
    }

    fn labelled(gesture: ModelGesture, ms: i64) -> HandFrame {
        let hand = HandObservation::new(open_hand(0.5, 0.8)).with_label(ModelLabel::new(gesture, 0.9));
        HandFrame::with_hand(Timestamp::from_millis(ms), hand)
    }

    fn pointing(x: f64, ms: i64) -> HandFrame {
        HandFrame::with_hand(
            Timestamp::from_millis(ms),
            HandObservation::new(pointing_hand(x, 0.8)),
        )
    }

    /// Hold a labelled pose from `from` to `to` at frame cadence
    fn hold(
        pipeline: &mut GesturePipeline,
        gesture: ModelGesture,
        from: i64,
        to: i64,
    ) -> Vec<Dispatch> {
        let mut dispatches = Vec::new();
        let mut t = from;
        while t <= to {
            dispatches.extend(pipeline.process_frame(&labelled(gesture, t)).dispatches);
            t += FRAME_MS;
        }
        dispatches
    }

    fn cup_qty(store: &Store) -> u32 {
        store.read(|s| s.cart.quantity_of(&ProductId::new("cup")))
    }

    #[test]
    fn test_held_thumb_up_adds_focused_once() {
        let store = store();
        let mut pipeline = pipeline(store.clone(), Arc::new(ActionLock::default()));

        let dispatches = hold(&mut pipeline, ModelGesture::ThumbUp, 0, 2_500);
        assert_eq!(dispatches.len(), 1);
        assert!(matches!(&dispatches[0], Dispatch::Applied(o) if o.applied()));
        assert_eq!(cup_qty(&store), 1);
        assert_eq!(store.read(|s| s.cart.len()), 1);
    }

    #[test]
    fn test_thumb_down_in_cart_removes_last_unit() {
        let store = store();
        store.add_to_cart(&ProductId::new("cup"), 1).unwrap();
        store.set_mode(AppMode::Cart);
        let mut pipeline = pipeline(store.clone(), Arc::new(ActionLock::default()));

        hold(&mut pipeline, ModelGesture::ThumbDown, 0, 2_100);
        let state = store.get_state();
        assert!(state.cart.is_empty());
        assert_eq!(state.cart_active_index, 0);
    }

    #[test]
    fn test_victory_with_empty_cart_stays_in_cart() {
        let store = store();
        store.set_mode(AppMode::Cart);
        let mut pipeline = pipeline(store.clone(), Arc::new(ActionLock::default()));

        let dispatches = hold(&mut pipeline, ModelGesture::Victory, 0, 2_100);
        match &dispatches[..] {
            [Dispatch::Applied(outcome)] => assert_eq!(outcome.effect, Effect::CartEmpty),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(store.mode(), AppMode::Cart);
    }

    #[test]
    fn test_closed_fist_dispatches_nothing() {
        let store = store();
        let mut pipeline = pipeline(store.clone(), Arc::new(ActionLock::default()));
        assert!(hold(&mut pipeline, ModelGesture::ClosedFist, 0, 2_500).is_empty());
        assert!(store.read(|s| s.cart.is_empty()));
    }

    #[test]
    fn test_confirmed_gesture_dropped_when_voice_holds_lock() {
        let store = store();
        let lock = Arc::new(ActionLock::default());
        let mut pipeline = pipeline(store.clone(), lock.clone());
        let mut rx = pipeline.feedback().subscribe();

        hold(&mut pipeline, ModelGesture::ThumbUp, 0, 1_980);
        assert!(lock.acquire_at(InputSource::Voice, Timestamp::from_millis(1_990)));

        let report = pipeline.process_frame(&labelled(ModelGesture::ThumbUp, 2_013));
        assert_eq!(report.dispatches, vec![Dispatch::LockBusy(Action::Confirm)]);
        assert_eq!(cup_qty(&store), 0);
        assert_eq!(lock.snapshot().holder, Some(InputSource::Voice));

        let mut saw_failure = false;
        while let Ok(signal) = rx.try_recv() {
            if signal
                == UiSignal::Gesture(GestureSignal::Failure {
                    kind: GestureKind::ThumbUp,
                })
            {
                saw_failure = true;
            }
        }
        assert!(saw_failure);
    }

    #[test]
    fn test_swipe_dropped_while_voice_holds_lock() {
        let store = store();
        let lock = Arc::new(ActionLock::default());
        let mut pipeline = pipeline(store.clone(), lock.clone());

        pipeline.process_frame(&pointing(0.40, 0));
        assert!(lock.acquire_at(InputSource::Voice, Timestamp::from_millis(10)));

        let report = pipeline.process_frame(&pointing(0.56, FRAME_MS));
        assert!(report.swipe.is_some());
        assert!(matches!(
            &report.dispatches[..],
            [Dispatch::LockBusy(Action::Navigate(_))]
        ));
        assert_eq!(store.read(|s| s.focused_index), 0);
        assert_eq!(lock.snapshot().holder, Some(InputSource::Voice));
    }

    #[test]
    fn test_gesture_and_voice_alternate_on_shared_lock() {
        let store = store();
        let lock = Arc::new(ActionLock::default());
        let mut pipeline = pipeline(store.clone(), lock.clone());
        let voice = crate::voice::VoiceGateway::new(store.clone(), lock.clone(), FeedbackBus::new());

        // Gesture dispatch releases its scoped hold, so voice gets in right after
        hold(&mut pipeline, ModelGesture::ThumbUp, 0, 2_013);
        assert_eq!(cup_qty(&store), 1);
        assert!(matches!(
            voice.handle_at("add", Timestamp::from_millis(2_020)),
            crate::voice::VoiceResult::Dispatched(_)
        ));
        assert_eq!(cup_qty(&store), 2);

        // A voice hold inside the window blocks the next swipe
        assert!(voice.acquire_action_lock(Timestamp::from_millis(2_030)));
        pipeline.process_frame(&pointing(0.40, 2_046));
        let report = pipeline.process_frame(&pointing(0.56, 2_079));
        assert!(matches!(&report.dispatches[..], [Dispatch::LockBusy(_)]));
        assert!(voice.release_action_lock());
    }

    #[test]
    fn test_lock_released_after_gesture_dispatch() {
        let store = store();
        let lock = Arc::new(ActionLock::default());
        let mut pipeline = pipeline(store, lock.clone());

        hold(&mut pipeline, ModelGesture::ThumbUp, 0, 2_100);
        assert!(!lock.snapshot().held());
    }

    #[test]
    fn test_pointing_swipe_navigates_coverflow() {
        let store = store();
        let mut pipeline = pipeline(store.clone(), Arc::new(ActionLock::default()));

        assert!(pipeline.process_frame(&pointing(0.40, 0)).swipe.is_none());
        let report = pipeline.process_frame(&pointing(0.56, FRAME_MS));

        let detection = report.swipe.unwrap();
        assert_eq!(detection.direction, SwipeDirection::Left);
        assert!(report.candidate.is_none());
        assert_eq!(store.read(|s| s.focused_index), 1);
    }

    #[test]
    fn test_swipe_cooldown_blocks_immediate_repeat() {
        let store = store();
        let mut pipeline = pipeline(store.clone(), Arc::new(ActionLock::default()));

        pipeline.process_frame(&pointing(0.20, 0));
        assert!(pipeline.process_frame(&pointing(0.36, 33)).swipe.is_some());
        // Inside the 600ms cooldown the anchor only follows the hand
        assert!(pipeline.process_frame(&pointing(0.55, 66)).swipe.is_none());
        assert_eq!(store.read(|s| s.focused_index), 1);

        pipeline.process_frame(&pointing(0.55, 700));
        assert!(pipeline.process_frame(&pointing(0.71, 733)).swipe.is_some());
        assert_eq!(store.read(|s| s.focused_index), 2);
    }

    #[test]
    fn test_open_hand_does_not_swipe() {
        let store = store();
        let mut pipeline = pipeline(store.clone(), Arc::new(ActionLock::default()));

        for (i, x) in [0.3, 0.5, 0.7].iter().enumerate() {
            let hand = HandObservation::new(open_hand(*x, 0.8));
            let frame = HandFrame::with_hand(Timestamp::from_millis(i as i64 * FRAME_MS), hand);
            assert!(pipeline.process_frame(&frame).swipe.is_none());
        }
        assert_eq!(pipeline.swipe().state().anchor_x, None);
    }

    #[test]
    fn test_shutdown_clears_state_and_gesture_lock() {
        let store = store();
        let lock = Arc::new(ActionLock::default());
        let mut pipeline = pipeline(store.clone(), lock.clone());

        hold(&mut pipeline, ModelGesture::ThumbUp, 0, 1_000);
        pipeline.process_frame(&pointing(0.4, 1_033));
        assert!(lock.acquire_at(InputSource::Gesture, Timestamp::from_millis(1_050)));

        pipeline.shutdown();
        assert!(!pipeline.is_active());
        assert!(pipeline.stabilizer().state().is_idle());
        assert_eq!(pipeline.swipe().state().anchor_x, None);
        assert!(!lock.snapshot().held());

        // Frames are ignored until restarted
        let report = pipeline.process_frame(&labelled(ModelGesture::ThumbUp, 5_000));
        assert_eq!(report, FrameReport::default());

        pipeline.start();
        hold(&mut pipeline, ModelGesture::ThumbUp, 6_000, 8_100);
        assert_eq!(cup_qty(&store), 1);
    }

    #[test]
    fn test_shutdown_keeps_voice_lock() {
        let lock = Arc::new(ActionLock::default());
        let mut pipeline = pipeline(store(), lock.clone());
        lock.acquire_at(InputSource::Voice, Timestamp::from_millis(0));

        pipeline.shutdown();
        assert_eq!(lock.snapshot().holder, Some(InputSource::Voice));
    }

    #[test]
    fn test_progress_signals_published() {
        let mut pipeline = pipeline(store(), Arc::new(ActionLock::default()));
        let mut rx = pipeline.feedback().subscribe();

        pipeline.process_frame(&labelled(ModelGesture::Victory, 0));
        pipeline.process_frame(&labelled(ModelGesture::Victory, 1_000));

        let mut progress = Vec::new();
        while let Ok(UiSignal::Gesture(GestureSignal::Progress { progress: p, .. })) = rx.try_recv() {
            progress.push(p);
        }
        assert_eq!(progress.len(), 2);
        assert!((progress[1] - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_independent_instances() {
        let store = store();
        let lock = Arc::new(ActionLock::default());
        let mut first = pipeline(store.clone(), lock.clone());
        let second = pipeline(store, lock);

        hold(&mut first, ModelGesture::ThumbUp, 0, 1_000);
        assert!(!first.stabilizer().state().is_idle());
        assert!(second.stabilizer().state().is_idle());
    }
}
