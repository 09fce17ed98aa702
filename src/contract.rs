//! Interfaces to the external posting collaborators.
//!
//! The documents in this crate never talk to the network themselves: the
//! directory batch goes through [`BatchPostingClient`], individual posts
//! through [`SinglePostingClient`], and directory enumeration through
//! [`FileLister`]. Real transport implementations live outside this crate;
//! the traits here are the contract they fulfil, and are annotated for
//! `mockall` so tests can count and script the delegated calls.
//!
//! Item failures are data, not errors: the batch call reports failure
//! counts, the single-post call reports a [`PostOutcome`]. Neither has an
//! error channel of its own.

use async_trait::async_trait;
#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

/// Uploader identity forwarded with every delegated call.
pub const DEFAULT_UPLOADER_ID: &str = "lablog-poster";

/// Everything the batch client needs for one directory upload.
pub struct DirectoryUploadRequest<'a> {
    /// Paths collected from the data directory, one level deep, in
    /// filesystem order.
    pub files: &'a [PathBuf],
    /// Shared post title; may be empty when the client should derive titles
    /// from filenames.
    pub title: &'a str,
    pub content: &'a str,
    pub metadata: &'a BTreeMap<String, String>,
    pub section: &'a str,
    pub server_url: &'a str,
    pub blog: &'a str,
    pub username: &'a str,
    pub uploader_id: &'a str,
}

/// Counters returned by the batch client: how many file uploads and how many
/// post creations failed, out of how many items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchUploadCounts {
    pub file_failures: usize,
    pub post_failures: usize,
    pub total: usize,
}

/// Everything the single-post client needs to create one post. The target
/// server and uploader identity ride along in the request, so one call
/// creates and submits the post.
pub struct NewBlogPost<'a> {
    pub title: &'a str,
    pub content: &'a str,
    pub section: &'a str,
    pub metadata: &'a BTreeMap<String, String>,
    pub server_url: &'a str,
    pub blog: &'a str,
    pub username: &'a str,
    pub uploader_id: &'a str,
}

/// Result of one post-creation call. `Unknown` is a malformed or
/// indeterminate client response; the orchestration counts it as neither
/// success nor failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostOutcome {
    Posted,
    Rejected,
    Unknown,
}

/// Enumerates the entries of a data directory, one level deep, in whatever
/// order the filesystem yields them. Callers must not depend on the order.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait FileLister {
    fn list_files(&self, directory: &Path) -> io::Result<Vec<PathBuf>>;
}

/// Local-filesystem [`FileLister`], the implementation used outside tests.
pub struct FsFileLister;

impl FileLister for FsFileLister {
    fn list_files(&self, directory: &Path) -> io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(directory)? {
            files.push(entry?.path());
        }
        Ok(files)
    }
}

/// Client for uploading a whole directory of data files as attached posts in
/// one opaque, synchronous-in-effect call.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait BatchPostingClient: Send + Sync {
    /// Upload every listed file as an attached post. Item failures are
    /// folded into the returned counters, never raised.
    async fn upload_directory<'a>(&self, req: DirectoryUploadRequest<'a>) -> BatchUploadCounts;
}

/// Client for creating one independent post per call.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait SinglePostingClient: Send + Sync {
    /// Create and submit one post, reporting whether the service accepted
    /// it.
    async fn create_post<'a>(&self, req: NewBlogPost<'a>) -> PostOutcome;
}
