// ABOUTME: Integration tests for object-storage fetches via an external CLI.
// ABOUTME: An existing destination file short-circuits the transfer.

use std::path::Path;

use nonempty::NonEmpty;
use vaultship::config::{ArtifactSpec, StoreSpec};
use vaultship::fetch::{FetchError, FetchOutcome, ObjectStore};

// Use `cp` as the storage CLI: `cp <uri> <dest>` with a local path as the uri.
fn cp_store() -> ObjectStore {
    ObjectStore::new(&StoreSpec {
        command: NonEmpty::new("cp".to_string()),
    })
}

fn seed(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[tokio::test]
async fn fetches_into_a_missing_destination() {
    let dir = tempfile::tempdir().unwrap();
    let src = seed(dir.path(), "remote.env", "KEY=value\n");
    let dest = dir.path().join("deep/nested/.env");

    let outcome = cp_store()
        .fetch(src.to_str().unwrap(), &dest)
        .await
        .unwrap();

    assert_eq!(outcome, FetchOutcome::Fetched);
    assert_eq!(std::fs::read_to_string(&dest).unwrap(), "KEY=value\n");
}

#[tokio::test]
async fn existing_destination_is_left_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let src = seed(dir.path(), "remote.env", "NEW=1\n");
    let dest = seed(dir.path(), ".env", "OLD=1\n");

    let outcome = cp_store()
        .fetch(src.to_str().unwrap(), &dest)
        .await
        .unwrap();

    assert_eq!(outcome, FetchOutcome::AlreadyPresent);
    assert_eq!(std::fs::read_to_string(&dest).unwrap(), "OLD=1\n");
}

#[tokio::test]
async fn missing_tool_is_a_dependency_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = ObjectStore::new(&StoreSpec {
        command: NonEmpty::new("/nonexistent/aws-cli".to_string()),
    });

    let err = store
        .fetch("s3://bucket/key", &dir.path().join("out"))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::ToolMissing(_)));
}

#[tokio::test]
async fn failed_transfer_surfaces_the_tool_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing_src = dir.path().join("no-such-object");

    let err = cp_store()
        .fetch(missing_src.to_str().unwrap(), &dir.path().join("out"))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::CommandFailed { .. }));
}

#[tokio::test]
async fn fetch_all_stops_at_the_first_failure() {
    let dir = tempfile::tempdir().unwrap();
    let good = seed(dir.path(), "a.env", "A=1\n");
    let artifacts = vec![
        ArtifactSpec {
            uri: good.display().to_string(),
            dest: dir.path().join("out/a.env"),
        },
        ArtifactSpec {
            uri: dir.path().join("missing").display().to_string(),
            dest: dir.path().join("out/b.env"),
        },
        ArtifactSpec {
            uri: good.display().to_string(),
            dest: dir.path().join("out/c.env"),
        },
    ];

    let err = cp_store().fetch_all(&artifacts).await.unwrap_err();
    assert!(matches!(err, FetchError::CommandFailed { .. }));

    // First artifact landed, third was never attempted.
    assert!(dir.path().join("out/a.env").exists());
    assert!(!dir.path().join("out/c.env").exists());
}
