//! Document for creating a numbered series of near-identical posts.
//!
//! One `do_upload` call attempts every index from 1 to `num_posts`
//! inclusive, each as an independent [`SinglePostingClient::create_post`]
//! call with the title suffixed `-<index>`. Rejected posts are counted and
//! their indices recorded, but never retried and never abort the remaining
//! indices; an indeterminate client response counts as neither outcome.

use tracing::{debug, error, info, warn};

use crate::contract::{NewBlogPost, PostOutcome, SinglePostingClient, DEFAULT_UPLOADER_ID};
use crate::document::{PostDocument, PostDraft, UploadError, UploadOutcome};
use crate::notify::Notification;
use crate::preferences::PreferencesStore;

/// Document model for incremental post creation: the shared draft fields
/// plus how many numbered posts to generate.
pub struct IncrementalPostCreationDocument {
    draft: PostDraft,
    num_posts: usize,
}

impl PostDocument for IncrementalPostCreationDocument {
    fn draft(&self) -> &PostDraft {
        &self.draft
    }

    fn draft_mut(&mut self) -> &mut PostDraft {
        &mut self.draft
    }
}

impl IncrementalPostCreationDocument {
    pub fn new() -> Self {
        Self {
            draft: PostDraft::new(),
            num_posts: 0,
        }
    }

    pub fn num_posts(&self) -> usize {
        self.num_posts
    }

    /// Zero is accepted here; it is rejected only when the upload starts.
    pub fn set_num_posts(&mut self, num_posts: usize) {
        self.num_posts = num_posts;
        debug!(num_posts, "post count set");
        self.draft
            .bus()
            .publish(&Notification::NumPostsChanged(self.num_posts));
    }

    /// Restore the fresh-construction state. Subscriptions survive; nothing
    /// is published.
    pub fn reset(&mut self) {
        self.draft.reset();
        self.num_posts = 0;
    }

    fn check_preconditions(&self) -> Result<(), UploadError> {
        if self.draft.title().is_empty() {
            return Err(UploadError::MissingTitle);
        }
        if self.draft.content().is_empty() {
            return Err(UploadError::MissingContent);
        }
        if self.num_posts == 0 {
            return Err(UploadError::NoPosts);
        }
        Ok(())
    }

    fn fail(&self, err: UploadError) -> UploadError {
        error!(error = %err, "incremental upload rejected");
        self.draft
            .bus()
            .publish(&Notification::DocumentError(err.to_string()));
        err
    }

    /// Create `num_posts` independent posts titled `<title>-1` through
    /// `<title>-<num_posts>`, in that order. Returns the aggregated outcome
    /// with the 1-based indices of rejected posts.
    pub async fn do_upload<C>(
        &mut self,
        prefs: &PreferencesStore,
        client: &C,
    ) -> Result<UploadOutcome, UploadError>
    where
        C: SinglePostingClient,
    {
        if let Err(err) = self.check_preconditions() {
            return Err(self.fail(err));
        }

        self.draft.push_status("Sending posts to server");
        self.draft.bus().publish(&Notification::UploadingStarted);
        info!(
            num_posts = self.num_posts,
            "[UPLOAD] starting incremental post creation"
        );

        let mut succeeded = 0;
        let mut failed_indices = Vec::new();
        for index in 1..=self.num_posts {
            let title = format!("{}-{}", self.draft.title(), index);
            let outcome = client
                .create_post(NewBlogPost {
                    title: &title,
                    content: self.draft.content(),
                    section: self.draft.section(),
                    metadata: self.draft.metadata(),
                    server_url: prefs.current_server().url(),
                    blog: prefs.current_blog(),
                    username: prefs.current_username(),
                    uploader_id: DEFAULT_UPLOADER_ID,
                })
                .await;
            match outcome {
                PostOutcome::Posted => {
                    succeeded += 1;
                    debug!(post = %title, "[UPLOAD] post created");
                    self.draft.bus().publish(&Notification::PostUploadSuccess);
                }
                PostOutcome::Rejected => {
                    debug!(post = %title, "[UPLOAD] post rejected");
                    failed_indices.push(index);
                }
                PostOutcome::Unknown => {
                    warn!(post = %title, "[UPLOAD] indeterminate outcome, counted as neither");
                }
            }
        }

        let outcome = UploadOutcome {
            succeeded,
            failed: failed_indices.len(),
            failed_indices,
        };
        self.draft.push_status(format!(
            "Uploaded {} posts ({} failed)",
            self.num_posts, outcome.failed
        ));
        info!(
            attempted = self.num_posts,
            succeeded = outcome.succeeded,
            failed = outcome.failed,
            "[UPLOAD] incremental post creation finished"
        );
        self.draft
            .bus()
            .publish(&Notification::UploadingFinished(outcome.clone()));
        Ok(outcome)
    }
}

impl Default for IncrementalPostCreationDocument {
    fn default() -> Self {
        Self::new()
    }
}
