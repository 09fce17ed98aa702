//! Document for posting a directory of data files as one batch.
//!
//! Orchestration for one `do_upload` call:
//! preconditions → "sending" status + `UploadingStarted` → enumerate the
//! directory through the [`FileLister`] → exactly one
//! [`BatchPostingClient::upload_directory`] call → record the returned
//! counts → "completed" status + `UploadingFinished`. There are no per-file
//! notifications and no retries; one started and one finished event per
//! call, whatever the counters say.

use std::path::Path;
use tracing::{debug, error, info};

use crate::contract::{
    BatchPostingClient, BatchUploadCounts, DirectoryUploadRequest, FileLister, DEFAULT_UPLOADER_ID,
};
use crate::document::{PostDocument, PostDraft, UploadError, UploadOutcome};
use crate::notify::Notification;
use crate::preferences::PreferencesStore;

/// Document model for a multi-post directory data upload: the shared draft
/// fields plus the target directory and the use-filenames-as-titles flag.
pub struct DataDirectoryUploadDocument {
    draft: PostDraft,
    data_directory: String,
    use_filename: bool,
    last_counts: Option<BatchUploadCounts>,
}

impl PostDocument for DataDirectoryUploadDocument {
    fn draft(&self) -> &PostDraft {
        &self.draft
    }

    fn draft_mut(&mut self) -> &mut PostDraft {
        &mut self.draft
    }
}

impl DataDirectoryUploadDocument {
    pub fn new() -> Self {
        Self {
            draft: PostDraft::new(),
            data_directory: String::new(),
            use_filename: false,
            last_counts: None,
        }
    }

    pub fn data_directory(&self) -> &str {
        &self.data_directory
    }

    pub fn set_data_directory(&mut self, directory: impl Into<String>) {
        self.data_directory = directory.into();
        debug!(directory = %self.data_directory, "data directory set");
        self.draft
            .bus()
            .publish(&Notification::DataDirectoryChanged(
                self.data_directory.clone(),
            ));
    }

    pub fn use_filename(&self) -> bool {
        self.use_filename
    }

    pub fn set_use_filename(&mut self, use_filename: bool) {
        self.use_filename = use_filename;
        debug!(use_filename, "use-filename flag set");
        self.draft
            .bus()
            .publish(&Notification::UseFilenameChanged(self.use_filename));
    }

    /// The raw counters from the most recent completed batch call, if any.
    pub fn last_counts(&self) -> Option<BatchUploadCounts> {
        self.last_counts
    }

    /// Restore the fresh-construction state. Subscriptions survive; nothing
    /// is published.
    pub fn reset(&mut self) {
        self.draft.reset();
        self.data_directory.clear();
        self.use_filename = false;
        self.last_counts = None;
    }

    fn check_preconditions(&self) -> Result<(), UploadError> {
        if self.draft.title().is_empty() && !self.use_filename {
            return Err(UploadError::MissingTitle);
        }
        if self.draft.content().is_empty() {
            return Err(UploadError::MissingContent);
        }
        if self.data_directory.is_empty() {
            return Err(UploadError::MissingDirectory);
        }
        if !Path::new(&self.data_directory).exists() {
            return Err(UploadError::DirectoryNotFound {
                path: self.data_directory.clone(),
            });
        }
        Ok(())
    }

    fn fail(&self, err: UploadError) -> UploadError {
        error!(error = %err, "directory upload rejected");
        self.draft
            .bus()
            .publish(&Notification::DocumentError(err.to_string()));
        err
    }

    /// Upload every file in the data directory as an attached post, in one
    /// delegated batch call. Returns the aggregated outcome; item failures
    /// are counted, not raised.
    pub async fn do_upload<L, C>(
        &mut self,
        prefs: &PreferencesStore,
        lister: &L,
        client: &C,
    ) -> Result<UploadOutcome, UploadError>
    where
        L: FileLister,
        C: BatchPostingClient,
    {
        if let Err(err) = self.check_preconditions() {
            return Err(self.fail(err));
        }

        self.draft.push_status("Sending data posts to server");
        self.draft.bus().publish(&Notification::UploadingStarted);
        info!(directory = %self.data_directory, "[UPLOAD] starting directory upload");

        let files = match lister.list_files(Path::new(&self.data_directory)) {
            Ok(files) => files,
            Err(source) => {
                let err = UploadError::ListDirectory {
                    path: self.data_directory.clone(),
                    source,
                };
                return Err(self.fail(err));
            }
        };
        debug!(files = files.len(), "[UPLOAD] collected directory entries");

        let counts = client
            .upload_directory(DirectoryUploadRequest {
                files: &files,
                title: self.draft.title(),
                content: self.draft.content(),
                metadata: self.draft.metadata(),
                section: self.draft.section(),
                server_url: prefs.current_server().url(),
                blog: prefs.current_blog(),
                username: prefs.current_username(),
                uploader_id: DEFAULT_UPLOADER_ID,
            })
            .await;

        self.last_counts = Some(counts);
        let failed = counts.file_failures + counts.post_failures;
        let outcome = UploadOutcome {
            succeeded: counts.total.saturating_sub(failed),
            failed,
            failed_indices: Vec::new(),
        };

        self.draft
            .push_status(format!("Uploaded {} data objects", counts.total));
        match serde_json::to_string_pretty(&outcome) {
            Ok(json) => debug!(json = %json, "[UPLOAD] directory upload outcome"),
            Err(e) => error!(error = ?e, "[UPLOAD] failed to serialize outcome"),
        }
        info!(
            total = counts.total,
            file_failures = counts.file_failures,
            post_failures = counts.post_failures,
            "[UPLOAD] directory upload finished"
        );
        self.draft
            .bus()
            .publish(&Notification::UploadingFinished(outcome.clone()));
        Ok(outcome)
    }
}

impl Default for DataDirectoryUploadDocument {
    fn default() -> Self {
        Self::new()
    }
}
