#![doc = "lablog-poster: document and notification core for LaBLog batch posting."]

//! This crate holds the stateful model behind a desktop posting tool for a
//! LaBLog-style blog service: the preferences store (server/blog/username
//! selection), the post documents (directory data upload and incremental
//! post creation) and the synchronous notification contract they share.
//! Presentation and network transport are external; the collaborator
//! interfaces they implement live in [`contract`].
//!
//! # Usage
//! Construct a [`preferences::PreferencesStore`], one document, and drive it
//! through its setters; `do_upload` runs the batch against the posting
//! client you supply.

pub mod catalog;
pub mod contract;
pub mod directory_upload;
pub mod document;
pub mod incremental;
pub mod notify;
pub mod preferences;
pub mod status;

#[cfg(any(test, feature = "test-export-mocks"))]
pub mod testing;
