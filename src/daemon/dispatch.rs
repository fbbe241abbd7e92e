//! Event dispatcher.
//!
//! Drains `TimerEvent`s from the engine and hands them to the notification,
//! sound and label sinks. Every sink failure is logged and dropped; nothing
//! here can stall or fail the engine.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::indicator::{Label, LabelSink};
use crate::notification::NotificationSender;
use crate::sound::{SoundCue, SoundPlayer};

use super::timer::{Notification, TimerEvent};

/// Routes engine events to their sinks.
#[derive(Clone)]
pub struct EventDispatcher {
    notifier: Arc<dyn NotificationSender>,
    sound: Arc<dyn SoundPlayer>,
    label: Arc<dyn LabelSink>,
}

impl EventDispatcher {
    pub fn new(
        notifier: Arc<dyn NotificationSender>,
        sound: Arc<dyn SoundPlayer>,
        label: Arc<dyn LabelSink>,
    ) -> Self {
        Self {
            notifier,
            sound,
            label,
        }
    }

    /// Consumes events until every sender is dropped.
    pub async fn run(self, mut rx: mpsc::UnboundedReceiver<TimerEvent>) {
        while let Some(event) = rx.recv().await {
            self.dispatch(event);
        }
        debug!("Event dispatcher stopped");
    }

    /// Handles a single event.
    pub fn dispatch(&self, event: TimerEvent) {
        match event {
            TimerEvent::Notify(notification) => self.notify(&notification),
            TimerEvent::Label(label) => self.update_label(&label),
        }
    }

    fn notify(&self, notification: &Notification) {
        if notification.play_sound && !self.sound.is_disabled() {
            let source = SoundCue::for_state(notification.category).source();
            if let Err(e) = self.sound.play(&source) {
                warn!("Failed to queue sound '{}': {}", source.name(), e);
            }
        }

        if let Err(e) = self.notifier.send(notification) {
            warn!("Failed to queue notification '{}': {}", notification.title, e);
        }
    }

    fn update_label(&self, label: &Label) {
        if let Err(e) = self.label.update(label) {
            warn!("Failed to update status label: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicator::MockLabelSink;
    use crate::notification::MockNotificationSender;
    use crate::sound::MockSoundPlayer;
    use crate::types::SessionState;

    struct Sinks {
        notifier: Arc<MockNotificationSender>,
        sound: Arc<MockSoundPlayer>,
        label: Arc<MockLabelSink>,
    }

    fn create_dispatcher() -> (EventDispatcher, Sinks) {
        let sinks = Sinks {
            notifier: Arc::new(MockNotificationSender::new()),
            sound: Arc::new(MockSoundPlayer::new()),
            label: Arc::new(MockLabelSink::new()),
        };
        let dispatcher = EventDispatcher::new(
            sinks.notifier.clone(),
            sinks.sound.clone(),
            sinks.label.clone(),
        );
        (dispatcher, sinks)
    }

    fn notification(category: SessionState, play_sound: bool) -> TimerEvent {
        TimerEvent::Notify(Notification {
            title: "Short Break".to_string(),
            body: "Take a 5 minute break!".to_string(),
            category,
            play_sound,
        })
    }

    #[test]
    fn test_notify_plays_category_sound() {
        let (dispatcher, sinks) = create_dispatcher();

        dispatcher.dispatch(notification(SessionState::ShortBreak, true));

        assert_eq!(sinks.notifier.notification_count(), 1);
        let calls = sinks.sound.get_play_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name(), "break");
    }

    #[test]
    fn test_silent_notification_skips_sound() {
        let (dispatcher, sinks) = create_dispatcher();

        dispatcher.dispatch(notification(SessionState::Stopped, false));

        assert_eq!(sinks.notifier.notification_count(), 1);
        assert_eq!(sinks.sound.play_count(), 0);
    }

    #[test]
    fn test_disabled_sound_still_notifies() {
        let notifier = Arc::new(MockNotificationSender::new());
        let sound = Arc::new(MockSoundPlayer::disabled());
        let dispatcher =
            EventDispatcher::new(notifier.clone(), sound.clone(), Arc::new(MockLabelSink::new()));

        dispatcher.dispatch(notification(SessionState::Walk, true));

        assert_eq!(notifier.notification_count(), 1);
        assert_eq!(sound.play_count(), 0);
    }

    #[test]
    fn test_label_goes_to_sink() {
        let (dispatcher, sinks) = create_dispatcher();

        dispatcher.dispatch(TimerEvent::Label(Label::paused()));

        assert_eq!(sinks.label.last(), Some(Label::paused()));
        assert_eq!(sinks.notifier.notification_count(), 0);
    }

    #[test]
    fn test_sink_failures_are_swallowed() {
        let (dispatcher, sinks) = create_dispatcher();
        sinks.notifier.set_should_fail(true);
        sinks.sound.set_should_fail(true);

        dispatcher.dispatch(notification(SessionState::Lunch, true));
        dispatcher.dispatch(TimerEvent::Label(Label::idle()));

        assert_eq!(sinks.label.last(), Some(Label::idle()));
    }

    #[tokio::test]
    async fn test_run_ends_when_senders_drop() {
        let (dispatcher, sinks) = create_dispatcher();
        let (tx, rx) = mpsc::unbounded_channel();

        tx.send(TimerEvent::Label(Label::stopped())).unwrap();
        drop(tx);
        dispatcher.run(rx).await;

        assert_eq!(sinks.label.labels(), vec![Label::stopped()]);
    }
}
