//! Shared post-draft state and the common document surface.
//!
//! Both concrete documents ([`DataDirectoryUploadDocument`] and
//! [`IncrementalPostCreationDocument`]) hold a [`PostDraft`] for the fields
//! every post carries (title, content, section, metadata) plus the status
//! log and notification bus, and expose the shared surface through the
//! [`PostDocument`] trait.
//!
//! Field setters are total: the statically typed parameter replaces the old
//! value wholesale (metadata included: a new map replaces the previous one,
//! never merges into it) and the field's `*Changed` notification is
//! published before the setter returns. Where a mutation can still fail
//! (selection indices, upload preconditions) the failing call leaves state
//! untouched, publishes `DocumentError` and returns the structured error.
//!
//! [`DataDirectoryUploadDocument`]: crate::directory_upload::DataDirectoryUploadDocument
//! [`IncrementalPostCreationDocument`]: crate::incremental::IncrementalPostCreationDocument

use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

use crate::notify::{EventKind, Notification, NotificationBus, SubscriptionId};
use crate::status::StatusLog;

/// A violated upload precondition. Published as `DocumentError` and returned
/// by `do_upload`; nothing is mutated when one of these is raised.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("need a post title (or use filenames as titles)")]
    MissingTitle,
    #[error("need post text")]
    MissingContent,
    #[error("no directory selected")]
    MissingDirectory,
    #[error("the path {path} appears not to exist")]
    DirectoryNotFound { path: String },
    #[error("could not read directory {path}: {source}")]
    ListDirectory {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("need at least one post")]
    NoPosts,
}

/// Aggregated result of one `do_upload` call. Recomputed fresh per call,
/// never cumulative. `failed_indices` carries the 1-based indices of
/// rejected posts where per-item accounting exists (the incremental
/// document); the single-call directory batch leaves it empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadOutcome {
    pub succeeded: usize,
    pub failed: usize,
    pub failed_indices: Vec<usize>,
}

/// The draft fields shared by every post document, with the owning
/// document's status log and notification bus.
pub struct PostDraft {
    title: String,
    content: String,
    section: String,
    metadata: BTreeMap<String, String>,
    status: StatusLog,
    bus: NotificationBus,
}

impl PostDraft {
    pub(crate) fn new() -> Self {
        Self {
            title: String::new(),
            content: String::new(),
            section: String::new(),
            metadata: BTreeMap::new(),
            status: StatusLog::new(),
            bus: NotificationBus::new(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        debug!(title = %self.title, "post title set");
        self.bus
            .publish(&Notification::TitleChanged(self.title.clone()));
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        debug!(length = self.content.len(), "post content set");
        self.bus
            .publish(&Notification::ContentChanged(self.content.clone()));
    }

    pub fn section(&self) -> &str {
        &self.section
    }

    pub fn set_section(&mut self, section: impl Into<String>) {
        self.section = section.into();
        debug!(section = %self.section, "post section set");
        self.bus
            .publish(&Notification::SectionChanged(self.section.clone()));
    }

    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    /// Replace the whole metadata map.
    pub fn set_metadata(&mut self, metadata: BTreeMap<String, String>) {
        self.metadata = metadata;
        debug!(keys = self.metadata.len(), "post metadata set");
        self.bus
            .publish(&Notification::MetadataChanged(self.metadata.clone()));
    }

    pub fn status(&self) -> &StatusLog {
        &self.status
    }

    pub fn bus(&self) -> &NotificationBus {
        &self.bus
    }

    pub(crate) fn push_status(&mut self, entry: impl Into<String>) {
        self.status.push(entry);
    }

    /// Restore the fresh-construction state. Subscriptions survive; nothing
    /// is published.
    pub(crate) fn reset(&mut self) {
        self.title.clear();
        self.content.clear();
        self.section.clear();
        self.metadata.clear();
        self.status.clear();
    }
}

/// The surface common to every post document: the shared draft fields, the
/// status log, and the notification contract.
pub trait PostDocument {
    fn draft(&self) -> &PostDraft;
    fn draft_mut(&mut self) -> &mut PostDraft;

    fn title(&self) -> &str {
        self.draft().title()
    }

    fn set_title(&mut self, title: impl Into<String>) {
        self.draft_mut().set_title(title);
    }

    fn content(&self) -> &str {
        self.draft().content()
    }

    fn set_content(&mut self, content: impl Into<String>) {
        self.draft_mut().set_content(content);
    }

    fn section(&self) -> &str {
        self.draft().section()
    }

    fn set_section(&mut self, section: impl Into<String>) {
        self.draft_mut().set_section(section);
    }

    fn metadata(&self) -> &BTreeMap<String, String> {
        self.draft().metadata()
    }

    fn set_metadata(&mut self, metadata: BTreeMap<String, String>) {
        self.draft_mut().set_metadata(metadata);
    }

    fn status(&self) -> &StatusLog {
        self.draft().status()
    }

    fn last_status(&self) -> Option<&str> {
        self.draft().status().last()
    }

    fn subscribe<F>(&self, kind: EventKind, callback: F) -> SubscriptionId
    where
        F: FnMut(&Notification) + 'static,
    {
        self.draft().bus().subscribe(kind, callback)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.draft().bus().unsubscribe(id)
    }
}
