// ABOUTME: Integration tests for file-level transform application.
// ABOUTME: Running the configurator twice must leave the file byte-identical.

use std::path::PathBuf;

use vaultship::envfile::{
    ApplyError, ConfigState, TransformId, TransformParams, TransformRule, apply_file, classify,
};

fn qna_rule() -> TransformRule {
    TransformRule {
        field: "ES_CONNECTION_LINE".to_string(),
        marker: TransformId::new("qna-envfile-Configured-with-the-Following-ES-user").unwrap(),
    }
}

fn alice() -> TransformParams {
    TransformParams::Credential {
        user: "alice".to_string(),
        secret: "s3cret".to_string(),
        endpoint: "https://x:9200".to_string(),
    }
}

fn env_file(content: &[u8]) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".env");
    std::fs::write(&path, content).unwrap();
    (dir, path)
}

#[test]
fn configures_a_fresh_file_and_flips_its_state() {
    let (_dir, path) = env_file(b"QNA_PORT=8080\n");
    let rule = qna_rule();

    assert_eq!(
        classify(&path, &rule.marker).unwrap(),
        ConfigState::UnconfiguredPlaintext
    );

    let changed = apply_file(&path, &rule, &alice()).unwrap();
    assert!(changed);

    assert_eq!(
        classify(&path, &rule.marker).unwrap(),
        ConfigState::ConfiguredPlaintext
    );
    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("ES_CONNECTION_LINE=https://alice:s3cret@x:9200\n"));
    assert!(content.contains("#qna-envfile-Configured-with-the-Following-ES-user:alice\n"));
}

#[test]
fn second_run_is_a_no_op_and_byte_identical() {
    let (_dir, path) = env_file(b"QNA_PORT=8080\nES_HOST=x\n");
    let rule = qna_rule();

    assert!(apply_file(&path, &rule, &alice()).unwrap());
    let after_first = std::fs::read(&path).unwrap();

    assert!(!apply_file(&path, &rule, &alice()).unwrap());
    let after_second = std::fs::read(&path).unwrap();

    assert_eq!(after_first, after_second);
}

#[test]
fn changed_credentials_supersede_without_duplicating_lines() {
    let (_dir, path) = env_file(b"QNA_PORT=8080\n");
    let rule = qna_rule();

    apply_file(&path, &rule, &alice()).unwrap();
    let bob = TransformParams::Credential {
        user: "bob".to_string(),
        secret: "pw".to_string(),
        endpoint: "https://x:9200".to_string(),
    };
    assert!(apply_file(&path, &rule, &bob).unwrap());

    let content = std::fs::read_to_string(&path).unwrap();
    let field_lines = content
        .lines()
        .filter(|l| l.starts_with("ES_CONNECTION_LINE="))
        .count();
    assert_eq!(field_lines, 1);
    assert!(content.contains("https://bob:pw@x:9200"));
    assert!(!content.contains("alice"));
}

#[test]
fn missing_file_is_config_missing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.env");

    let err = apply_file(&path, &qna_rule(), &alice()).unwrap_err();
    assert!(matches!(err, ApplyError::ConfigMissing(_)));
}

#[test]
fn refuses_to_transform_binary_content() {
    let (_dir, path) = env_file(&[0x1f, 0x8b, 0x08, 0x00, 0xff, 0xfe, 0x00, 0x9c]);

    let err = apply_file(&path, &qna_rule(), &alice()).unwrap_err();
    assert!(matches!(err, ApplyError::NotText(_)));
}

#[test]
fn transforms_for_different_services_coexist_in_one_file() {
    let (_dir, path) = env_file(b"SHARED=1\n");
    let mac_rule = TransformRule {
        field: "LICENSED_MAC".to_string(),
        marker: TransformId::new("sentiment-en-envfile-Configured-with-the-Following-MAC")
            .unwrap(),
    };
    let mac = TransformParams::HardwareId {
        value: "00:1b:44:11:3a:b7".to_string(),
    };

    apply_file(&path, &qna_rule(), &alice()).unwrap();
    apply_file(&path, &mac_rule, &mac).unwrap();
    // Re-running either transform leaves both in place.
    assert!(!apply_file(&path, &qna_rule(), &alice()).unwrap());
    assert!(!apply_file(&path, &mac_rule, &mac).unwrap());

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("ES_CONNECTION_LINE="));
    assert!(content.contains("LICENSED_MAC="));
    assert_eq!(
        classify(&path, &qna_rule().marker).unwrap(),
        ConfigState::ConfiguredPlaintext
    );
    assert_eq!(
        classify(&path, &mac_rule.marker).unwrap(),
        ConfigState::ConfiguredPlaintext
    );
}
