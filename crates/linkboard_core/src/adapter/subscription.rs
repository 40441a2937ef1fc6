//! Change subscriptions for push backends.

use super::AdapterError;
use crate::model::link::Link;
use crate::model::notice::Notice;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::mpsc::UnboundedReceiver;

/// One unsolicited update from a push backend.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeEvent {
    /// Full links collection in the backend's snapshot order.
    Links(Vec<Link>),
    /// Full notices collection in the backend's snapshot order.
    Notices(Vec<Notice>),
    /// The listener itself failed; previously delivered data stays valid.
    ListenerFailed(AdapterError),
}

/// Handle to an attached change listener.
///
/// Dropping the handle detaches the listener.
pub struct Subscription {
    events: Option<UnboundedReceiver<ChangeEvent>>,
    detach: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Handle returned by pull backends; never yields.
    pub fn inactive() -> Self {
        Self {
            events: None,
            detach: None,
        }
    }

    pub fn active(events: UnboundedReceiver<ChangeEvent>, detach: impl FnOnce() + 'static) -> Self {
        Self {
            events: Some(events),
            detach: Some(Box::new(detach)),
        }
    }

    pub fn is_active(&self) -> bool {
        self.events.is_some()
    }

    /// Returns the next queued event without waiting.
    pub fn try_next(&mut self) -> Option<ChangeEvent> {
        let events = self.events.as_mut()?;
        match events.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.events = None;
                None
            }
        }
    }

    /// Waits for the next event.
    ///
    /// Returns `None` immediately for inactive handles and once the backend
    /// has dropped the listener.
    pub async fn next(&mut self) -> Option<ChangeEvent> {
        let events = self.events.as_mut()?;
        let event = events.recv().await;
        if event.is_none() {
            self.events = None;
        }
        event
    }

    /// Detaches the listener now.
    pub fn unsubscribe(mut self) {
        self.detach_now();
    }

    fn detach_now(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
        self.events = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach_now();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}
