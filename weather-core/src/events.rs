use std::cell::RefCell;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::error::WeatherError;

/// What the presenter tells its listeners after each refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenterEvent {
    /// A new observation replaced the current one; re-read it from the presenter.
    DataUpdated,
    Error(WeatherError),
}

/// Fan-out of presenter events to any number of listeners.
///
/// Lives on the same task as the presenter that owns it, hence the `RefCell`.
#[derive(Debug, Default)]
pub struct EventChannel {
    subscribers: RefCell<Vec<UnboundedSender<PresenterEvent>>>,
}

impl EventChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> UnboundedReceiver<PresenterEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.borrow_mut().push(tx);
        rx
    }

    /// Deliver `event` to every live subscriber. Subscribers whose receiver was dropped
    /// are forgotten.
    pub fn emit(&self, event: PresenterEvent) {
        self.subscribers
            .borrow_mut()
            .retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }
}
