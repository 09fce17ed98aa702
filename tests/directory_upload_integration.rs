use std::collections::BTreeMap;
use std::fs::File;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tempfile::tempdir;

use lablog_poster::contract::{
    BatchUploadCounts, DirectoryUploadRequest, FileLister, FsFileLister, MockBatchPostingClient,
    MockFileLister,
};
use lablog_poster::directory_upload::DataDirectoryUploadDocument;
use lablog_poster::document::{PostDocument, UploadError};
use lablog_poster::notify::{EventKind, Notification};
use lablog_poster::preferences::PreferencesStore;
use lablog_poster::testing::EventRecorder;

fn seeded_document(directory: &str) -> DataDirectoryUploadDocument {
    let mut doc = DataDirectoryUploadDocument::new();
    doc.set_title("detector run");
    doc.set_content("raw detector output for the overnight run");
    doc.set_section("API Testing");
    doc.set_metadata(BTreeMap::from([(
        "instrument".to_string(),
        "SANS2D".to_string(),
    )]));
    doc.set_data_directory(directory);
    doc
}

#[tokio::test]
async fn test_upload_delegates_exactly_once_with_selection_context() {
    let dir = tempdir().expect("tempdir should be created");
    for name in ["alpha.dat", "beta.dat", "gamma.dat"] {
        File::create(dir.path().join(name)).expect("fixture file should be created");
    }

    let prefs = PreferencesStore::new();
    let mut doc = seeded_document(&dir.path().display().to_string());

    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_in_mock = Arc::clone(&seen);
    let mut client = MockBatchPostingClient::new();
    client
        .expect_upload_directory()
        .times(1)
        .returning(move |req: DirectoryUploadRequest<'_>| {
            seen_in_mock.lock().unwrap().push((
                req.files.len(),
                req.title.to_string(),
                req.server_url.to_string(),
                req.blog.to_string(),
                req.username.to_string(),
            ));
            BatchUploadCounts {
                file_failures: 0,
                post_failures: 0,
                total: req.files.len(),
            }
        });

    let outcome = doc
        .do_upload(&prefs, &FsFileLister, &client)
        .await
        .expect("upload should succeed");

    assert_eq!(outcome.succeeded, 3);
    assert_eq!(outcome.failed, 0);
    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1, "exactly one delegated batch call");
    let (files, title, server, blog, username) = &seen[0];
    assert_eq!(*files, 3, "every directory entry is in the batch");
    assert_eq!(title, "detector run");
    assert_eq!(server, "http://biolab.isis.rl.ac.uk");
    assert_eq!(blog, "testing_sandpit");
    assert_eq!(username, "cameronneylon.net");
}

#[tokio::test]
async fn test_failure_counts_fold_into_outcome() {
    let dir = tempdir().expect("tempdir should be created");
    let prefs = PreferencesStore::new();
    let mut doc = seeded_document(&dir.path().display().to_string());

    let mut lister = MockFileLister::new();
    lister.expect_list_files().times(1).returning(|_| {
        Ok(vec![
            PathBuf::from("/data/a.dat"),
            PathBuf::from("/data/b.dat"),
            PathBuf::from("/data/c.dat"),
            PathBuf::from("/data/d.dat"),
            PathBuf::from("/data/e.dat"),
        ])
    });
    let mut client = MockBatchPostingClient::new();
    client
        .expect_upload_directory()
        .times(1)
        .returning(|_| BatchUploadCounts {
            file_failures: 2,
            post_failures: 1,
            total: 5,
        });

    let recorder = EventRecorder::new();
    doc.subscribe(EventKind::UploadingStarted, recorder.callback());
    doc.subscribe(EventKind::UploadingFinished, recorder.callback());

    let outcome = doc
        .do_upload(&prefs, &lister, &client)
        .await
        .expect("upload should succeed");

    assert_eq!(outcome.succeeded, 2);
    assert_eq!(outcome.failed, 3, "file and post failures are folded together");
    assert!(outcome.failed_indices.is_empty(), "the batch call has no per-item indices");
    assert_eq!(
        doc.last_counts(),
        Some(BatchUploadCounts {
            file_failures: 2,
            post_failures: 1,
            total: 5,
        }),
        "the raw counters from the batch call are recorded"
    );
    assert_eq!(
        doc.status().entries(),
        &[
            "Sending data posts to server".to_string(),
            "Uploaded 5 data objects".to_string(),
        ]
    );
    assert_eq!(
        recorder.received(),
        vec![
            Notification::UploadingStarted,
            Notification::UploadingFinished(outcome),
        ],
        "one started and one finished notification, in order"
    );
}

#[tokio::test]
async fn test_empty_content_rejected_before_any_collaborator_call() {
    let dir = tempdir().expect("tempdir should be created");
    let prefs = PreferencesStore::new();
    let mut doc = DataDirectoryUploadDocument::new();
    doc.set_title("detector run");
    doc.set_data_directory(dir.path().display().to_string());

    // No expectations: any call into either mock fails the test.
    let lister = MockFileLister::new();
    let client = MockBatchPostingClient::new();

    let recorder = EventRecorder::new();
    doc.subscribe(EventKind::DocumentError, recorder.callback());
    doc.subscribe(EventKind::UploadingStarted, recorder.callback());

    let err = doc
        .do_upload(&prefs, &lister, &client)
        .await
        .expect_err("empty content must be rejected");

    assert!(matches!(err, UploadError::MissingContent));
    assert!(doc.status().is_empty(), "no status entry before the precondition check passes");
    assert_eq!(
        recorder.kinds(),
        vec![EventKind::DocumentError],
        "exactly one error notification and no started event"
    );
}

#[tokio::test]
async fn test_empty_title_allowed_when_filenames_are_titles() {
    let dir = tempdir().expect("tempdir should be created");
    File::create(dir.path().join("alpha.dat")).expect("fixture file should be created");

    let prefs = PreferencesStore::new();
    let mut doc = DataDirectoryUploadDocument::new();
    doc.set_content("raw detector output");
    doc.set_data_directory(dir.path().display().to_string());
    doc.set_use_filename(true);

    let mut client = MockBatchPostingClient::new();
    client
        .expect_upload_directory()
        .times(1)
        .returning(|req: DirectoryUploadRequest<'_>| BatchUploadCounts {
            file_failures: 0,
            post_failures: 0,
            total: req.files.len(),
        });

    let outcome = doc
        .do_upload(&prefs, &FsFileLister, &client)
        .await
        .expect("use_filename stands in for the title");

    assert_eq!(outcome.succeeded, 1);
}

#[tokio::test]
async fn test_missing_directory_selection_rejected() {
    let prefs = PreferencesStore::new();
    let mut doc = DataDirectoryUploadDocument::new();
    doc.set_title("detector run");
    doc.set_content("raw detector output");

    let lister = MockFileLister::new();
    let client = MockBatchPostingClient::new();

    let err = doc
        .do_upload(&prefs, &lister, &client)
        .await
        .expect_err("no directory selected");

    assert!(matches!(err, UploadError::MissingDirectory));
}

#[tokio::test]
async fn test_nonexistent_directory_rejected() {
    let dir = tempdir().expect("tempdir should be created");
    let gone = dir.path().join("never-created");

    let prefs = PreferencesStore::new();
    let mut doc = seeded_document(&gone.display().to_string());

    let lister = MockFileLister::new();
    let client = MockBatchPostingClient::new();

    let err = doc
        .do_upload(&prefs, &lister, &client)
        .await
        .expect_err("the path does not exist");

    assert!(matches!(err, UploadError::DirectoryNotFound { .. }));
    assert!(doc.status().is_empty());
}

#[tokio::test]
async fn test_listing_failure_stops_before_the_batch_call() {
    let dir = tempdir().expect("tempdir should be created");
    let prefs = PreferencesStore::new();
    let mut doc = seeded_document(&dir.path().display().to_string());

    let mut lister = MockFileLister::new();
    lister
        .expect_list_files()
        .times(1)
        .returning(|_| {
            Err(std::io::Error::new(
                std::io::ErrorKind::Other,
                "device vanished",
            ))
        });
    let client = MockBatchPostingClient::new();

    let recorder = EventRecorder::new();
    doc.subscribe(EventKind::DocumentError, recorder.callback());
    doc.subscribe(EventKind::UploadingFinished, recorder.callback());

    let err = doc
        .do_upload(&prefs, &lister, &client)
        .await
        .expect_err("listing failed");

    assert!(matches!(err, UploadError::ListDirectory { .. }));
    assert_eq!(
        recorder.kinds(),
        vec![EventKind::DocumentError],
        "an error is published and no finished event follows"
    );
}

#[tokio::test]
async fn test_repeat_uploads_produce_independent_outcomes() {
    let dir = tempdir().expect("tempdir should be created");
    File::create(dir.path().join("alpha.dat")).expect("fixture file should be created");
    File::create(dir.path().join("beta.dat")).expect("fixture file should be created");

    let prefs = PreferencesStore::new();
    let mut doc = seeded_document(&dir.path().display().to_string());

    let mut calls = 0;
    let mut client = MockBatchPostingClient::new();
    client
        .expect_upload_directory()
        .times(2)
        .returning(move |req: DirectoryUploadRequest<'_>| {
            calls += 1;
            BatchUploadCounts {
                file_failures: if calls == 2 { 1 } else { 0 },
                post_failures: 0,
                total: req.files.len(),
            }
        });

    let first = doc
        .do_upload(&prefs, &FsFileLister, &client)
        .await
        .expect("first upload should succeed");
    let second = doc
        .do_upload(&prefs, &FsFileLister, &client)
        .await
        .expect("second upload should succeed");

    assert_eq!((first.succeeded, first.failed), (2, 0));
    assert_eq!(
        (second.succeeded, second.failed),
        (1, 1),
        "counters are per call, never cumulative"
    );
    assert_eq!(
        doc.last_counts().map(|counts| counts.file_failures),
        Some(1),
        "the recorded counters follow the latest call"
    );
}

#[test]
fn test_fs_file_lister_enumerates_one_level() {
    let dir = tempdir().expect("tempdir should be created");
    for name in ["alpha.dat", "beta.dat"] {
        File::create(dir.path().join(name)).expect("fixture file should be created");
    }
    std::fs::create_dir(dir.path().join("nested")).expect("subdir should be created");
    File::create(dir.path().join("nested").join("inner.dat"))
        .expect("nested fixture file should be created");

    let mut files = FsFileLister
        .list_files(dir.path())
        .expect("listing should succeed");
    files.sort();

    assert_eq!(
        files,
        vec![
            dir.path().join("alpha.dat"),
            dir.path().join("beta.dat"),
            dir.path().join("nested"),
        ],
        "every directory entry is listed, but nothing below the first level"
    );
}
