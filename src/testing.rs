//! Test support: a recording subscriber for notification assertions.

use std::cell::RefCell;
use std::rc::Rc;

use crate::notify::{EventKind, Notification};

/// Records every notification its callbacks receive, in arrival order.
///
/// Subscribe one recorder to several kinds on the same bus to assert on the
/// relative order of different notifications.
///
/// ```
/// use lablog_poster::document::PostDocument;
/// use lablog_poster::directory_upload::DataDirectoryUploadDocument;
/// use lablog_poster::notify::EventKind;
/// use lablog_poster::testing::EventRecorder;
///
/// let mut doc = DataDirectoryUploadDocument::new();
/// let recorder = EventRecorder::new();
/// doc.subscribe(EventKind::TitleChanged, recorder.callback());
/// doc.set_title("a title");
/// recorder.assert_arrived(EventKind::TitleChanged);
/// ```
#[derive(Clone, Default)]
pub struct EventRecorder {
    received: Rc<RefCell<Vec<Notification>>>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A callback suitable for `subscribe`; every clone feeds the same
    /// recorder.
    pub fn callback(&self) -> impl FnMut(&Notification) + 'static {
        let received = Rc::clone(&self.received);
        move |notification: &Notification| received.borrow_mut().push(notification.clone())
    }

    /// Everything received so far, in arrival order.
    pub fn received(&self) -> Vec<Notification> {
        self.received.borrow().clone()
    }

    pub fn count(&self) -> usize {
        self.received.borrow().len()
    }

    pub fn count_of(&self, kind: EventKind) -> usize {
        self.received
            .borrow()
            .iter()
            .filter(|notification| notification.kind() == kind)
            .count()
    }

    /// The kinds received so far, in arrival order.
    pub fn kinds(&self) -> Vec<EventKind> {
        self.received
            .borrow()
            .iter()
            .map(Notification::kind)
            .collect()
    }

    /// Panic unless at least one notification of `kind` has arrived.
    pub fn assert_arrived(&self, kind: EventKind) {
        assert!(
            self.count_of(kind) > 0,
            "notification {kind:?} did not arrive"
        );
    }

    pub fn clear(&self) {
        self.received.borrow_mut().clear();
    }
}
