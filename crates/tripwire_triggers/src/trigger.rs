//! Trigger volume coordinator
//!
//! Turns raw enter/stay/exit contact callbacks into filtered, debounced and
//! optionally delayed notifications. All delays run on the volume's own
//! [`Scheduler`]; nothing fires until [`TriggerVolume::advance`] is called.

use crate::collider::{apply_overrides, ColliderShape, VolumeCollider};
use crate::config::TriggerConfig;
use crate::events::{TriggerEvent, TriggerEventType};
use crate::feedback::SharedFeedback;
use crate::filter::DetectedObject;
use std::time::Duration;
use tripwire_event::{Signal, SubscriberId};
use tripwire_sched::{Scheduler, TaskHandle};

/// Work waiting on the volume's clock
#[derive(Debug)]
enum PendingAction {
    /// Deliver a notification
    Emit(TriggerEvent),
    /// Stay wait elapsed
    StayTick(DetectedObject),
    /// Re-arm a one-shot volume
    ResetTriggerOnce,
}

/// A trigger volume and its session state
pub struct TriggerVolume {
    config: TriggerConfig,
    colliders: Vec<VolumeCollider>,
    feedback: Option<SharedFeedback>,
    on_trigger_enter: Signal<TriggerEvent>,
    on_trigger_stay: Signal<TriggerEvent>,
    on_trigger_exit: Signal<TriggerEvent>,
    scheduler: Scheduler<PendingAction>,
    /// Net admitted overlaps, persists across steps
    overlap_count: i32,
    /// Admitted enters this step
    step_enter_count: u32,
    /// Stay callbacks this step, filtered or not
    step_stay_count: u32,
    has_entered_once: bool,
    has_exited_once: bool,
    /// Most recent stay task, kept after it fires
    stay_task: Option<TaskHandle>,
    stay_pending: bool,
    first_stay_interval: bool,
    triggered: bool,
}

impl TriggerVolume {
    /// Create a volume backed by a unit trigger box
    pub fn new(config: TriggerConfig) -> Self {
        Self::with_colliders(
            config,
            vec![VolumeCollider::trigger(ColliderShape::cube(1.0))],
        )
    }

    /// Create a volume from its collider components.
    ///
    /// The config is validated and the collider overrides applied here, once.
    /// Without colliders the volume never reacts to anything.
    pub fn with_colliders(config: TriggerConfig, mut colliders: Vec<VolumeCollider>) -> Self {
        let config = config.validated();
        if colliders.is_empty() {
            log::debug!("Trigger volume has no colliders and will stay inert");
        }
        apply_overrides(
            &mut colliders,
            config.override_convex,
            config.override_is_trigger,
        );

        Self {
            config,
            colliders,
            feedback: None,
            on_trigger_enter: Signal::new(),
            on_trigger_stay: Signal::new(),
            on_trigger_exit: Signal::new(),
            scheduler: Scheduler::new(),
            overlap_count: 0,
            step_enter_count: 0,
            step_stay_count: 0,
            has_entered_once: false,
            has_exited_once: false,
            stay_task: None,
            stay_pending: false,
            first_stay_interval: true,
            triggered: false,
        }
    }

    /// Attach a feedback sink
    pub fn with_feedback(mut self, sink: SharedFeedback) -> Self {
        self.attach_feedback(sink);
        self
    }

    /// Attach a feedback sink unless one is already attached
    pub fn attach_feedback(&mut self, sink: SharedFeedback) -> bool {
        if self.feedback.is_some() {
            return false;
        }
        sink.lock().set_triggered(self.triggered);
        self.feedback = Some(sink);
        true
    }

    /// Subscribe to enter notifications
    pub fn on_enter<F>(mut self, f: F) -> Self
    where
        F: Fn(&TriggerEvent) + Send + Sync + 'static,
    {
        self.on_trigger_enter.subscribe(f);
        self
    }

    /// Subscribe to stay notifications
    pub fn on_stay<F>(mut self, f: F) -> Self
    where
        F: Fn(&TriggerEvent) + Send + Sync + 'static,
    {
        self.on_trigger_stay.subscribe(f);
        self
    }

    /// Subscribe to exit notifications
    pub fn on_exit<F>(mut self, f: F) -> Self
    where
        F: Fn(&TriggerEvent) + Send + Sync + 'static,
    {
        self.on_trigger_exit.subscribe(f);
        self
    }

    /// Subscribe to one notification type at runtime
    pub fn subscribe<F>(&mut self, event_type: TriggerEventType, f: F) -> SubscriberId
    where
        F: Fn(&TriggerEvent) + Send + Sync + 'static,
    {
        self.signal_mut(event_type).subscribe(f)
    }

    /// Remove a runtime subscription
    pub fn unsubscribe(&mut self, event_type: TriggerEventType, id: SubscriberId) -> bool {
        self.signal_mut(event_type).unsubscribe(id)
    }

    fn signal(&self, event_type: TriggerEventType) -> &Signal<TriggerEvent> {
        match event_type {
            TriggerEventType::Enter => &self.on_trigger_enter,
            TriggerEventType::Stay => &self.on_trigger_stay,
            TriggerEventType::Exit => &self.on_trigger_exit,
        }
    }

    fn signal_mut(&mut self, event_type: TriggerEventType) -> &mut Signal<TriggerEvent> {
        match event_type {
            TriggerEventType::Enter => &mut self.on_trigger_enter,
            TriggerEventType::Stay => &mut self.on_trigger_stay,
            TriggerEventType::Exit => &mut self.on_trigger_exit,
        }
    }

    /// Start of a physics step. Clears the per-step counters.
    pub fn begin_step(&mut self) {
        self.step_enter_count = 0;
        self.step_stay_count = 0;
    }

    /// An object started overlapping the volume
    pub fn on_trigger_enter(&mut self, object: &DetectedObject) {
        if self.is_inert() || self.filter(object) {
            return;
        }

        self.overlap_count += 1;
        self.step_enter_count += 1;
        if self.config.merge_trigger_detection && self.overlap_count > 1 {
            return;
        }

        if self.config.trigger_once && self.has_entered_once {
            return;
        }

        self.has_entered_once = true;
        self.set_feedback(true);
        log::debug!("Object {} entered trigger volume", object.id);

        if self.on_trigger_enter.is_empty() {
            return;
        }

        self.scheduler.schedule(
            self.config.enter_delay(),
            PendingAction::Emit(TriggerEvent::enter(Some(object.clone()))),
        );
    }

    /// An object stopped overlapping the volume
    pub fn on_trigger_exit(&mut self, object: &DetectedObject) {
        if self.is_inert() || self.filter(object) {
            return;
        }

        self.overlap_count -= 1;
        if self.config.merge_trigger_detection && self.overlap_count > 0 {
            return;
        }

        if self.config.trigger_once && self.has_exited_once {
            self.stop_stay_task();
            return;
        }

        self.has_exited_once = true;
        log::debug!("Object {} exited trigger volume", object.id);

        if let Some(reset_delay) = self.config.reset_delay() {
            self.scheduler
                .schedule(reset_delay, PendingAction::ResetTriggerOnce);
            self.set_feedback(false);
        } else {
            self.set_feedback(!(self.overlap_count == 0 || self.config.trigger_once));
        }

        self.stop_stay_task();

        if self.on_trigger_exit.is_empty() {
            return;
        }

        self.scheduler.schedule(
            self.config.exit_delay(),
            PendingAction::Emit(TriggerEvent::exit(object.clone())),
        );
    }

    /// An object is still overlapping the volume
    pub fn on_trigger_stay(&mut self, object: &DetectedObject) {
        if self.is_inert() {
            return;
        }

        // Counted before filtering: the counter reports raw detector traffic
        self.step_stay_count += 1;

        if self.filter(object) || self.on_trigger_stay.is_empty() {
            return;
        }

        if self.overlap_count <= 0 {
            return;
        }

        if self.config.trigger_once && self.has_exited_once {
            return;
        }

        if self.stay_pending {
            return;
        }

        let delay = if self.first_stay_interval {
            self.config.stay_delay()
        } else {
            self.config.stay_interval()
        };
        self.stay_pending = true;
        self.stay_task = Some(
            self.scheduler
                .schedule(delay, PendingAction::StayTick(object.clone())),
        );
    }

    /// Re-arm a one-shot volume.
    ///
    /// If something is still inside, the volume immediately counts as entered
    /// again and raises an enter notification without an object.
    pub fn reset_trigger_once(&mut self) {
        if !self.config.trigger_once {
            return;
        }

        self.has_exited_once = false;

        if self.overlap_count > 0 {
            self.has_entered_once = true;
            self.set_feedback(true);
            log::debug!("One-shot trigger volume re-armed while occupied");
            self.scheduler.schedule(
                self.config.enter_delay(),
                PendingAction::Emit(TriggerEvent::enter(None)),
            );
        } else {
            self.has_entered_once = false;
        }
    }

    /// Returns true when the object must be ignored
    pub fn filter(&self, object: &DetectedObject) -> bool {
        self.config.filter.rejects(object)
    }

    /// Advance the volume clock, running every task that came due.
    ///
    /// Returns the notifications delivered during this call.
    pub fn advance(&mut self, dt: Duration) -> Vec<TriggerEvent> {
        let mut fired = Vec::new();
        for action in self.scheduler.advance(dt) {
            match action {
                PendingAction::Emit(event) => fired.push(self.deliver(event)),
                PendingAction::StayTick(object) => {
                    self.stay_pending = false;
                    self.first_stay_interval = false;
                    fired.push(self.deliver(TriggerEvent::stay(object)));
                }
                PendingAction::ResetTriggerOnce => self.reset_trigger_once(),
            }
        }
        fired
    }

    /// Cancel every pending notification, reset and stay task
    pub fn cancel_pending(&mut self) {
        self.scheduler.clear();
        self.stay_pending = false;
    }

    fn deliver(&self, mut event: TriggerEvent) -> TriggerEvent {
        event.fired_at = self.scheduler.now();
        log::debug!(
            "Trigger {} notification at {:?} (object: {:?})",
            event.event_type,
            event.fired_at,
            event.object_id()
        );
        self.signal(event.event_type).emit(&event);
        event
    }

    fn stop_stay_task(&mut self) {
        let Some(handle) = self.stay_task else {
            return;
        };
        self.scheduler.cancel(handle);
        self.stay_pending = false;
        self.first_stay_interval = true;
    }

    fn set_feedback(&mut self, triggered: bool) {
        self.triggered = triggered;
        if let Some(sink) = &self.feedback {
            sink.lock().set_triggered(triggered);
        }
    }

    /// A volume without colliders ignores every callback
    pub fn is_inert(&self) -> bool {
        self.colliders.is_empty()
    }

    pub fn config(&self) -> &TriggerConfig {
        &self.config
    }

    /// Collider components after overrides
    pub fn colliders(&self) -> &[VolumeCollider] {
        &self.colliders
    }

    /// Net number of admitted objects inside
    pub fn overlap_count(&self) -> i32 {
        self.overlap_count
    }

    /// Admitted enters since the step began
    pub fn step_enter_count(&self) -> u32 {
        self.step_enter_count
    }

    /// Stay callbacks since the step began, including filtered ones
    pub fn step_stay_count(&self) -> u32 {
        self.step_stay_count
    }

    pub fn has_entered_once(&self) -> bool {
        self.has_entered_once
    }

    pub fn has_exited_once(&self) -> bool {
        self.has_exited_once
    }

    /// Whether a stay notification is waiting to fire
    pub fn is_stay_pending(&self) -> bool {
        self.stay_pending
    }

    /// Last visual-feedback state pushed
    pub fn is_triggered(&self) -> bool {
        self.triggered
    }

    /// Volume clock
    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    /// Tasks waiting on the clock
    pub fn pending_count(&self) -> usize {
        self.scheduler.pending_count()
    }
}

impl Default for TriggerVolume {
    fn default() -> Self {
        Self::new(TriggerConfig::default())
    }
}

// Manual Debug implementation (skip signals and sink)
impl std::fmt::Debug for TriggerVolume {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TriggerVolume")
            .field("config", &self.config)
            .field("colliders", &self.colliders.len())
            .field("overlap_count", &self.overlap_count)
            .field("has_entered_once", &self.has_entered_once)
            .field("has_exited_once", &self.has_exited_once)
            .field("stay_pending", &self.stay_pending)
            .field("triggered", &self.triggered)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collider::Override;
    use crate::feedback::{FeedbackSink, GizmoRenderer};
    use crate::filter::TriggerFilter;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use tripwire_core::{Layer, LayerMask, ObjectId};

    fn object(index: u32) -> DetectedObject {
        DetectedObject::new(ObjectId::new(index, 0))
    }

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn counting(volume: &mut TriggerVolume, event_type: TriggerEventType) -> Arc<AtomicU32> {
        let count = Arc::new(AtomicU32::new(0));
        let count_clone = count.clone();
        volume.subscribe(event_type, move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });
        count
    }

    #[test]
    fn test_enter_fires_after_delay() {
        let mut volume = TriggerVolume::new(TriggerConfig::default().with_enter_delay(0.2));
        let enters = counting(&mut volume, TriggerEventType::Enter);

        volume.on_trigger_enter(&object(1));
        assert_eq!(volume.overlap_count(), 1);
        assert!(volume.is_triggered());

        assert!(volume.advance(ms(100)).is_empty());
        let fired = volume.advance(ms(100));
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].fired_at, ms(200));
        assert_eq!(fired[0].object_id(), Some(ObjectId::new(1, 0)));
        assert_eq!(enters.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_no_subscriber_schedules_nothing() {
        let mut volume = TriggerVolume::default();
        volume.on_trigger_enter(&object(1));
        volume.on_trigger_stay(&object(1));
        volume.on_trigger_exit(&object(1));
        assert_eq!(volume.pending_count(), 0);
        assert!(volume.advance(ms(10)).is_empty());
        assert_eq!(volume.overlap_count(), 0);
    }

    #[test]
    fn test_merge_detection_counts_one_logical_trigger() {
        let mut volume = TriggerVolume::default();
        let enters = counting(&mut volume, TriggerEventType::Enter);
        let exits = counting(&mut volume, TriggerEventType::Exit);

        for i in 1..=3 {
            volume.on_trigger_enter(&object(i));
        }
        assert_eq!(volume.overlap_count(), 3);
        for i in 1..=2 {
            volume.on_trigger_exit(&object(i));
        }
        volume.advance(Duration::ZERO);
        assert_eq!(enters.load(Ordering::SeqCst), 1);
        assert_eq!(exits.load(Ordering::SeqCst), 0);
        assert!(volume.is_triggered());

        volume.on_trigger_exit(&object(3));
        volume.advance(Duration::ZERO);
        assert_eq!(exits.load(Ordering::SeqCst), 1);
        assert!(!volume.is_triggered());
    }

    #[test]
    fn test_without_merge_every_object_fires() {
        let mut volume = TriggerVolume::new(TriggerConfig::default().with_merge_detection(false));
        let enters = counting(&mut volume, TriggerEventType::Enter);
        let exits = counting(&mut volume, TriggerEventType::Exit);

        volume.on_trigger_enter(&object(1));
        volume.on_trigger_enter(&object(2));
        volume.on_trigger_exit(&object(1));
        // Still occupied by object 2
        assert!(volume.is_triggered());
        volume.on_trigger_exit(&object(2));
        assert!(!volume.is_triggered());

        volume.advance(Duration::ZERO);
        assert_eq!(enters.load(Ordering::SeqCst), 2);
        assert_eq!(exits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_filtered_object_changes_nothing() {
        let config = TriggerConfig::default().with_filter(
            TriggerFilter::new()
                .with_layers(LayerMask::NONE.with(Layer::PLAYER))
                .with_tag("Player"),
        );
        let mut volume = TriggerVolume::new(config);
        let enters = counting(&mut volume, TriggerEventType::Enter);
        let stays = counting(&mut volume, TriggerEventType::Stay);
        let exits = counting(&mut volume, TriggerEventType::Exit);

        let intruder = object(9).with_layer(Layer::PLAYER).with_tag("Enemy");
        volume.on_trigger_enter(&intruder);
        volume.on_trigger_stay(&intruder);
        volume.on_trigger_exit(&intruder);
        volume.advance(ms(1000));

        assert_eq!(volume.overlap_count(), 0);
        assert!(!volume.is_triggered());
        assert_eq!(enters.load(Ordering::SeqCst), 0);
        assert_eq!(stays.load(Ordering::SeqCst), 0);
        assert_eq!(exits.load(Ordering::SeqCst), 0);
        // The raw stay counter still saw it
        assert_eq!(volume.step_stay_count(), 1);
    }

    #[test]
    fn test_stay_delay_then_interval() {
        let config = TriggerConfig::default().with_stay_timing(0.5, 1.0);
        let mut volume = TriggerVolume::new(config);
        let stays = counting(&mut volume, TriggerEventType::Stay);
        let a = object(1);

        volume.on_trigger_enter(&a);
        let mut fire_times = Vec::new();
        for _ in 0..30 {
            for event in volume.advance(ms(100)) {
                fire_times.push(event.fired_at);
            }
            volume.on_trigger_stay(&a);
        }

        assert_eq!(fire_times, vec![ms(600), ms(1600), ms(2600)]);
        assert_eq!(stays.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_exit_cancels_pending_stay() {
        let mut volume = TriggerVolume::new(TriggerConfig::default().with_stay_timing(0.5, 0.5));
        let stays = counting(&mut volume, TriggerEventType::Stay);
        let a = object(1);

        volume.on_trigger_enter(&a);
        volume.on_trigger_stay(&a);
        assert!(volume.is_stay_pending());

        volume.advance(ms(400));
        volume.on_trigger_exit(&a);
        assert!(!volume.is_stay_pending());

        volume.advance(ms(1000));
        assert_eq!(stays.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_stay_ignored_when_empty() {
        let mut volume = TriggerVolume::default();
        counting(&mut volume, TriggerEventType::Stay);

        volume.on_trigger_stay(&object(1));
        assert!(!volume.is_stay_pending());
        assert_eq!(volume.step_stay_count(), 1);
    }

    #[test]
    fn test_begin_step_resets_step_counters_only() {
        let mut volume = TriggerVolume::default();
        volume.on_trigger_enter(&object(1));
        volume.on_trigger_stay(&object(1));
        assert_eq!(volume.step_enter_count(), 1);
        assert_eq!(volume.step_stay_count(), 1);

        volume.begin_step();
        assert_eq!(volume.step_enter_count(), 0);
        assert_eq!(volume.step_stay_count(), 0);
        assert_eq!(volume.overlap_count(), 1);
    }

    #[test]
    fn test_trigger_once_blocks_reentry() {
        let mut volume = TriggerVolume::new(TriggerConfig::default().with_trigger_once(0.0));
        let enters = counting(&mut volume, TriggerEventType::Enter);
        let exits = counting(&mut volume, TriggerEventType::Exit);
        let a = object(1);

        volume.on_trigger_enter(&a);
        volume.on_trigger_exit(&a);
        assert!(!volume.is_triggered());
        volume.on_trigger_enter(&a);
        volume.on_trigger_exit(&a);
        volume.advance(Duration::ZERO);

        assert_eq!(enters.load(Ordering::SeqCst), 1);
        assert_eq!(exits.load(Ordering::SeqCst), 1);
        assert!(volume.has_entered_once());
        assert!(volume.has_exited_once());
    }

    #[test]
    fn test_manual_reset_when_empty_rearms() {
        let mut volume = TriggerVolume::new(TriggerConfig::default().with_trigger_once(0.0));
        let enters = counting(&mut volume, TriggerEventType::Enter);
        let a = object(1);

        volume.on_trigger_enter(&a);
        volume.on_trigger_exit(&a);
        volume.reset_trigger_once();
        assert!(!volume.has_entered_once());
        assert!(!volume.has_exited_once());

        volume.on_trigger_enter(&a);
        volume.advance(Duration::ZERO);
        assert_eq!(enters.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_manual_reset_while_occupied_fires_null_enter() {
        let mut volume = TriggerVolume::new(TriggerConfig::default().with_trigger_once(0.0));
        counting(&mut volume, TriggerEventType::Enter);

        volume.on_trigger_enter(&object(1));
        volume.advance(Duration::ZERO);

        volume.reset_trigger_once();
        let fired = volume.advance(Duration::ZERO);
        assert_eq!(fired.len(), 1);
        assert!(fired[0].is_enter());
        assert_eq!(fired[0].object, None);
        assert!(volume.has_entered_once());
    }

    #[test]
    fn test_reset_is_noop_without_trigger_once() {
        let mut volume = TriggerVolume::default();
        counting(&mut volume, TriggerEventType::Enter);
        volume.on_trigger_enter(&object(1));
        volume.advance(Duration::ZERO);

        volume.reset_trigger_once();
        assert_eq!(volume.pending_count(), 0);
    }

    #[test]
    fn test_feedback_sink() {
        let gizmo = GizmoRenderer::default().shared();
        let mut volume = TriggerVolume::default().with_feedback(gizmo.clone());

        volume.on_trigger_enter(&object(1));
        assert!(gizmo.lock().is_triggered());
        volume.on_trigger_exit(&object(1));
        assert!(!gizmo.lock().is_triggered());
    }

    #[test]
    fn test_first_feedback_sink_wins() {
        struct Flag(bool);
        impl FeedbackSink for Flag {
            fn set_triggered(&mut self, triggered: bool) {
                self.0 = triggered;
            }
        }

        let first = Arc::new(parking_lot::Mutex::new(Flag(false)));
        let second = Arc::new(parking_lot::Mutex::new(Flag(false)));
        let mut volume = TriggerVolume::default();
        assert!(volume.attach_feedback(first.clone()));
        assert!(!volume.attach_feedback(second.clone()));

        volume.on_trigger_enter(&object(1));
        assert!(first.lock().0);
        assert!(!second.lock().0);
    }

    #[test]
    fn test_inert_without_colliders() {
        let mut volume = TriggerVolume::with_colliders(TriggerConfig::default(), Vec::new());
        counting(&mut volume, TriggerEventType::Enter);

        volume.on_trigger_enter(&object(1));
        assert!(volume.is_inert());
        assert_eq!(volume.overlap_count(), 0);
        assert_eq!(volume.pending_count(), 0);
    }

    #[test]
    fn test_overrides_applied_at_build() {
        let config =
            TriggerConfig::default().with_overrides(Override::EnableAll, Override::EnableAll);
        let volume = TriggerVolume::with_colliders(
            config,
            vec![
                VolumeCollider::new(ColliderShape::mesh(false)),
                VolumeCollider::new(ColliderShape::sphere(1.0)),
            ],
        );
        assert_eq!(volume.colliders()[0].convex(), Some(true));
        assert!(volume.colliders().iter().all(|c| c.is_trigger));
    }

    #[test]
    fn test_cancel_pending() {
        let mut volume = TriggerVolume::new(TriggerConfig::default().with_enter_delay(1.0));
        let enters = counting(&mut volume, TriggerEventType::Enter);

        volume.on_trigger_enter(&object(1));
        volume.cancel_pending();
        volume.advance(ms(2000));
        assert_eq!(enters.load(Ordering::SeqCst), 0);
    }
}
