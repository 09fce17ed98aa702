//! Typed publish/subscribe notifications.
//!
//! Every stateful entity in this crate (the preferences store and each
//! document) embeds its own [`NotificationBus`]. Mutators publish a
//! [`Notification`] after a successful change, or a `DocumentError` after a
//! rejected one; subscribers are invoked synchronously, in subscription
//! order, on the calling thread, before the mutating call returns.
//!
//! The bus is intentionally `!Send`: the model is single-threaded and
//! cooperative, and the ordering guarantee depends on dispatch never leaving
//! the mutating call's thread.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::catalog::BlogServer;
use crate::document::UploadOutcome;

/// A notification published by a store or document, with its typed payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    ServerSelected(BlogServer),
    BlogSelected(String),
    UsernameSelected(String),
    DocumentError(String),
    TitleChanged(String),
    ContentChanged(String),
    SectionChanged(String),
    MetadataChanged(BTreeMap<String, String>),
    DataDirectoryChanged(String),
    UseFilenameChanged(bool),
    NumPostsChanged(usize),
    UploadingStarted,
    PostUploadSuccess,
    UploadingFinished(UploadOutcome),
}

/// Payload-free discriminant of [`Notification`], used to select which
/// notifications a subscription receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    ServerSelected,
    BlogSelected,
    UsernameSelected,
    DocumentError,
    TitleChanged,
    ContentChanged,
    SectionChanged,
    MetadataChanged,
    DataDirectoryChanged,
    UseFilenameChanged,
    NumPostsChanged,
    UploadingStarted,
    PostUploadSuccess,
    UploadingFinished,
}

impl Notification {
    pub fn kind(&self) -> EventKind {
        match self {
            Notification::ServerSelected(_) => EventKind::ServerSelected,
            Notification::BlogSelected(_) => EventKind::BlogSelected,
            Notification::UsernameSelected(_) => EventKind::UsernameSelected,
            Notification::DocumentError(_) => EventKind::DocumentError,
            Notification::TitleChanged(_) => EventKind::TitleChanged,
            Notification::ContentChanged(_) => EventKind::ContentChanged,
            Notification::SectionChanged(_) => EventKind::SectionChanged,
            Notification::MetadataChanged(_) => EventKind::MetadataChanged,
            Notification::DataDirectoryChanged(_) => EventKind::DataDirectoryChanged,
            Notification::UseFilenameChanged(_) => EventKind::UseFilenameChanged,
            Notification::NumPostsChanged(_) => EventKind::NumPostsChanged,
            Notification::UploadingStarted => EventKind::UploadingStarted,
            Notification::PostUploadSuccess => EventKind::PostUploadSuccess,
            Notification::UploadingFinished(_) => EventKind::UploadingFinished,
        }
    }
}

/// Handle returned by [`NotificationBus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Rc<RefCell<dyn FnMut(&Notification)>>;

struct Subscriber {
    id: SubscriptionId,
    kind: EventKind,
    callback: Callback,
}

/// Synchronous per-entity publish/subscribe dispatcher.
#[derive(Default)]
pub struct NotificationBus {
    subscribers: RefCell<Vec<Subscriber>>,
    next_id: Cell<u64>,
}

impl std::fmt::Debug for NotificationBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationBus")
            .field("subscribers", &self.subscribers.borrow().len())
            .field("next_id", &self.next_id.get())
            .finish()
    }
}

impl NotificationBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` for notifications of `kind`.
    pub fn subscribe<F>(&self, kind: EventKind, callback: F) -> SubscriptionId
    where
        F: FnMut(&Notification) + 'static,
    {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);
        self.subscribers.borrow_mut().push(Subscriber {
            id,
            kind,
            callback: Rc::new(RefCell::new(callback)),
        });
        id
    }

    /// Remove a subscription. Returns false if the id was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.borrow_mut();
        let before = subscribers.len();
        subscribers.retain(|subscriber| subscriber.id != id);
        subscribers.len() != before
    }

    /// Deliver `notification` to every matching subscriber, in subscription
    /// order, before returning.
    ///
    /// The subscriber list is snapshotted up front, so callbacks may
    /// subscribe or unsubscribe; a subscription added during dispatch first
    /// sees the next publish.
    pub fn publish(&self, notification: &Notification) {
        let kind = notification.kind();
        let targets: Vec<Callback> = self
            .subscribers
            .borrow()
            .iter()
            .filter(|subscriber| subscriber.kind == kind)
            .map(|subscriber| Rc::clone(&subscriber.callback))
            .collect();
        tracing::trace!(?kind, subscribers = targets.len(), "dispatching notification");
        for callback in targets {
            (callback.borrow_mut())(notification);
        }
    }
}
