// ABOUTME: Integration tests for the external crypto tool gateway.
// ABOUTME: Postcondition verification, missing tools, and tool failure modes.

mod support;

use std::path::{Path, PathBuf};

use nonempty::NonEmpty;
use support::fake_crypto_tool;
use vaultship::config::CryptoToolSpec;
use vaultship::crypto::{CryptoError, CryptoGateway};
use vaultship::envfile::{ConfigState, TransformId, classify};

fn tag() -> TransformId {
    TransformId::new("qna-envfile-Configured-with-the-Following-ES-user").unwrap()
}

fn gateway_for(tool: &Path) -> CryptoGateway {
    CryptoGateway::new(&CryptoToolSpec {
        command: NonEmpty::new(tool.display().to_string()),
        prompt: false,
    })
}

fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }
    path
}

#[tokio::test]
async fn encrypt_then_decrypt_restores_the_exact_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let tool = fake_crypto_tool(dir.path());
    let gateway = gateway_for(&tool);

    let path = dir.path().join(".env");
    let original = b"ES_CONNECTION_LINE=https://alice:pw@x:9200\n\
                     #qna-envfile-Configured-with-the-Following-ES-user:alice\n";
    std::fs::write(&path, original).unwrap();

    gateway.encrypt(&path, &tag()).await.unwrap();
    assert_eq!(classify(&path, &tag()).unwrap(), ConfigState::Encrypted);
    assert_ne!(std::fs::read(&path).unwrap(), original.to_vec());

    gateway.decrypt(&path, &tag()).await.unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), original.to_vec());
    assert_eq!(
        classify(&path, &tag()).unwrap(),
        ConfigState::ConfiguredPlaintext
    );
}

#[tokio::test]
async fn missing_tool_is_reported_as_such() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = gateway_for(&dir.path().join("no-such-tool"));

    let path = dir.path().join(".env");
    std::fs::write(&path, b"KEY=value\n").unwrap();

    let err = gateway.encrypt(&path, &tag()).await.unwrap_err();
    assert!(matches!(err, CryptoError::ToolMissing(_)));
}

#[tokio::test]
async fn nonzero_exit_is_a_command_failure() {
    let dir = tempfile::tempdir().unwrap();
    let tool = write_script(dir.path(), "failcrypt", "echo 'key not loaded' >&2; exit 3");
    let gateway = gateway_for(&tool);

    let path = dir.path().join(".env");
    std::fs::write(&path, b"KEY=value\n").unwrap();

    let err = gateway.encrypt(&path, &tag()).await.unwrap_err();
    match err {
        CryptoError::CommandFailed { detail, .. } => {
            assert!(detail.contains("exit 3"));
            assert!(detail.contains("key not loaded"));
        }
        other => panic!("expected CommandFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn encrypt_that_leaves_plaintext_is_an_integrity_violation() {
    let dir = tempfile::tempdir().unwrap();
    // Reports success but never transforms the file.
    let tool = write_script(dir.path(), "nopcrypt", "exit 0");
    let gateway = gateway_for(&tool);

    let path = dir.path().join(".env");
    std::fs::write(&path, b"KEY=value\n").unwrap();

    let err = gateway.encrypt(&path, &tag()).await.unwrap_err();
    assert!(matches!(err, CryptoError::IntegrityViolation { op: "encrypt", .. }));
}

#[tokio::test]
async fn decrypt_that_leaves_ciphertext_is_an_integrity_violation() {
    let dir = tempfile::tempdir().unwrap();
    let real = fake_crypto_tool(dir.path());
    let gateway = gateway_for(&real);

    let path = dir.path().join(".env");
    std::fs::write(&path, b"KEY=value\n").unwrap();
    gateway.encrypt(&path, &tag()).await.unwrap();

    let nop = write_script(dir.path(), "nopcrypt", "exit 0");
    let err = gateway_for(&nop).decrypt(&path, &tag()).await.unwrap_err();
    assert!(matches!(err, CryptoError::IntegrityViolation { op: "decrypt", .. }));
}
