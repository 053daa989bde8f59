// ABOUTME: Manifest types and parsing for vaultship.yml.
// ABOUTME: One immutable manifest drives every component; no ambient globals.

mod env_value;
mod init;

pub use env_value::EnvValue;
pub use init::init_manifest;

use crate::envfile::{TransformId, TransformParams, TransformRule};
use crate::error::{Error, Result};
use crate::runtime::RegistryAuth;
use crate::types::{ImageRef, ServiceName};
use nonempty::NonEmpty;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const MANIFEST_FILENAME: &str = "vaultship.yml";
pub const MANIFEST_FILENAME_ALT: &str = "vaultship.yaml";
pub const MANIFEST_FILENAME_DIR: &str = ".vaultship/config.yml";

/// The immutable run manifest: service catalog plus external-collaborator
/// commands. Enumerated once at startup and passed by reference everywhere.
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    #[serde(deserialize_with = "deserialize_services")]
    pub services: NonEmpty<ServiceSpec>,

    /// Fixed hardware identifier injected into sentiment-family env files.
    pub hardware_id: String,

    #[serde(default)]
    pub registry: Option<RegistrySpec>,

    pub crypto: CryptoToolSpec,

    #[serde(default)]
    pub store: Option<StoreSpec>,

    #[serde(default)]
    pub artifacts: Vec<ArtifactSpec>,

    #[serde(default = "default_stop_timeout", with = "humantime_serde")]
    pub stop_timeout: Duration,
}

/// One service: identity, port, file paths, image, and its transform rule.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceSpec {
    #[serde(deserialize_with = "deserialize_service_name")]
    pub name: ServiceName,

    #[serde(deserialize_with = "deserialize_image_ref")]
    pub image: ImageRef,

    pub port: u16,

    pub env_file: PathBuf,

    pub log_dir: PathBuf,

    /// Where the env file is mounted inside the container.
    #[serde(default = "default_env_mount")]
    pub env_mount: String,

    /// Where the log directory is mounted inside the container.
    #[serde(default = "default_log_mount")]
    pub log_mount: String,

    /// Absent for services whose env file needs no secure configuration;
    /// those deploy directly.
    #[serde(default)]
    pub transform: Option<TransformSpec>,
}

fn default_env_mount() -> String {
    "/app/.env".to_string()
}

fn default_log_mount() -> String {
    "/app/logs".to_string()
}

/// The two transform families, as data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransformKind {
    /// Inject a generated connection credential and endpoint.
    Credential,
    /// Inject the fixed hardware identifier.
    HardwareId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransformSpec {
    pub kind: TransformKind,

    pub field: String,

    #[serde(deserialize_with = "deserialize_transform_id")]
    pub marker: TransformId,
}

impl TransformSpec {
    pub fn rule(&self) -> TransformRule {
        TransformRule {
            field: self.field.clone(),
            marker: self.marker.clone(),
        }
    }
}

/// Registry credentials, resolved lazily so the common cached-token path
/// never touches them.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistrySpec {
    #[serde(default)]
    pub server: Option<String>,
    pub username: EnvValue,
    pub password: EnvValue,
}

impl RegistrySpec {
    pub fn resolve(&self) -> Result<RegistryAuth> {
        Ok(RegistryAuth {
            username: self.username.resolve()?,
            password: self.password.resolve()?,
            server: self.server.clone(),
        })
    }
}

/// External crypto tool invocation: program plus leading arguments.
#[derive(Debug, Clone, Deserialize)]
pub struct CryptoToolSpec {
    #[serde(deserialize_with = "deserialize_command")]
    pub command: NonEmpty<String>,

    /// Whether the tool may prompt interactively for key material.
    #[serde(default)]
    pub prompt: bool,
}

/// Object-storage CLI invocation, e.g. ["aws", "s3", "cp"].
#[derive(Debug, Clone, Deserialize)]
pub struct StoreSpec {
    #[serde(deserialize_with = "deserialize_command")]
    pub command: NonEmpty<String>,
}

/// A prerequisite file to materialize before the pipeline runs.
#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactSpec {
    pub uri: String,
    pub dest: PathBuf,
}

fn default_stop_timeout() -> Duration {
    Duration::from_secs(30)
}

impl Manifest {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(Error::from)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(MANIFEST_FILENAME),
            dir.join(MANIFEST_FILENAME_ALT),
            dir.join(MANIFEST_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                return Self::load(path);
            }
        }

        Err(Error::ManifestNotFound(dir.to_path_buf()))
    }

    /// Look up a service by name.
    pub fn service(&self, name: &str) -> Result<&ServiceSpec> {
        self.services
            .iter()
            .find(|s| s.name.as_str() == name)
            .ok_or_else(|| Error::UnknownService(name.to_string()))
    }

    /// The fixed parameters for a hardware-identifier transform.
    pub fn hardware_params(&self) -> TransformParams {
        TransformParams::HardwareId {
            value: self.hardware_id.clone(),
        }
    }

    /// The built-in catalog: search engine, Q&A, and two sentiment services.
    pub fn template() -> Self {
        let services = NonEmpty::from_vec(vec![
            ServiceSpec {
                name: ServiceName::new("search").unwrap(),
                image: ImageRef::parse("registry.example.com/stack/search:7.10.1").unwrap(),
                port: 9200,
                env_file: PathBuf::from("/opt/stack/search/.env"),
                log_dir: PathBuf::from("/var/log/stack/search"),
                env_mount: default_env_mount(),
                log_mount: default_log_mount(),
                transform: None,
            },
            ServiceSpec {
                name: ServiceName::new("qna").unwrap(),
                image: ImageRef::parse("registry.example.com/stack/qna:latest").unwrap(),
                port: 8080,
                env_file: PathBuf::from("/opt/stack/qna/.env"),
                log_dir: PathBuf::from("/var/log/stack/qna"),
                env_mount: default_env_mount(),
                log_mount: default_log_mount(),
                transform: Some(TransformSpec {
                    kind: TransformKind::Credential,
                    field: "ES_CONNECTION_LINE".to_string(),
                    marker: TransformId::new(
                        "qna-envfile-Configured-with-the-Following-ES-user",
                    )
                    .unwrap(),
                }),
            },
            ServiceSpec {
                name: ServiceName::new("sentiment-en").unwrap(),
                image: ImageRef::parse("registry.example.com/stack/sentiment-en:latest")
                    .unwrap(),
                port: 8081,
                env_file: PathBuf::from("/opt/stack/sentiment-en/.env"),
                log_dir: PathBuf::from("/var/log/stack/sentiment-en"),
                env_mount: default_env_mount(),
                log_mount: default_log_mount(),
                transform: Some(TransformSpec {
                    kind: TransformKind::HardwareId,
                    field: "LICENSED_MAC".to_string(),
                    marker: TransformId::new(
                        "sentiment-en-envfile-Configured-with-the-Following-MAC",
                    )
                    .unwrap(),
                }),
            },
            ServiceSpec {
                name: ServiceName::new("sentiment-multi").unwrap(),
                image: ImageRef::parse("registry.example.com/stack/sentiment-multi:latest")
                    .unwrap(),
                port: 8082,
                env_file: PathBuf::from("/opt/stack/sentiment-multi/.env"),
                log_dir: PathBuf::from("/var/log/stack/sentiment-multi"),
                env_mount: default_env_mount(),
                log_mount: default_log_mount(),
                transform: Some(TransformSpec {
                    kind: TransformKind::HardwareId,
                    field: "LICENSED_MAC".to_string(),
                    marker: TransformId::new(
                        "sentiment-multi-envfile-Configured-with-the-Following-MAC",
                    )
                    .unwrap(),
                }),
            },
        ])
        .expect("template catalog is non-empty");

        Manifest {
            services,
            hardware_id: "00:1b:44:11:3a:b7".to_string(),
            registry: None,
            crypto: CryptoToolSpec {
                command: NonEmpty::new("vaultcrypt".to_string()),
                prompt: false,
            },
            store: None,
            artifacts: Vec::new(),
            stop_timeout: default_stop_timeout(),
        }
    }
}

// Custom deserializers

fn deserialize_service_name<'de, D>(deserializer: D) -> std::result::Result<ServiceName, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    ServiceName::new(&s).map_err(serde::de::Error::custom)
}

fn deserialize_image_ref<'de, D>(deserializer: D) -> std::result::Result<ImageRef, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    ImageRef::parse(&s).map_err(serde::de::Error::custom)
}

fn deserialize_transform_id<'de, D>(deserializer: D) -> std::result::Result<TransformId, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    TransformId::new(&s).map_err(serde::de::Error::custom)
}

fn deserialize_services<'de, D>(
    deserializer: D,
) -> std::result::Result<NonEmpty<ServiceSpec>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let values: Vec<ServiceSpec> = Vec::deserialize(deserializer)?;
    NonEmpty::from_vec(values)
        .ok_or_else(|| serde::de::Error::custom("at least one service is required"))
}

fn deserialize_command<'de, D>(deserializer: D) -> std::result::Result<NonEmpty<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let values: Vec<String> = Vec::deserialize(deserializer)?;
    NonEmpty::from_vec(values)
        .ok_or_else(|| serde::de::Error::custom("command cannot be empty"))
}
