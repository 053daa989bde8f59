// ABOUTME: Test support utilities.
// ABOUTME: In-memory container runtime and a fake crypto tool for tests.

// Each test binary uses only a slice of these helpers.
#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use vaultship::config::ServiceSpec;
use vaultship::runtime::{
    ContainerConfig, ContainerError, ContainerFilters, ContainerOps, ContainerState,
    ContainerSummary, ImageError, ImageOps, RegistryAuth,
};
use vaultship::types::{ContainerId, ImageRef, ServiceName};

#[derive(Debug, Clone)]
pub struct MockContainer {
    pub id: ContainerId,
    pub name: String,
    pub image: String,
    pub state: ContainerState,
}

#[derive(Debug, Default)]
struct Inner {
    containers: Vec<MockContainer>,
    next_id: u64,
    pulls: Vec<(String, bool)>,
    removed: Vec<ContainerId>,
    fail_anonymous_pull: bool,
    fail_all_pulls: bool,
}

/// In-memory runtime standing in for the container daemon.
#[derive(Debug, Default)]
pub struct MockRuntime {
    inner: Mutex<Inner>,
}

impl MockRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make anonymous pulls fail so the lazy-login retry path runs.
    pub fn require_auth(self) -> Self {
        self.inner.lock().unwrap().fail_anonymous_pull = true;
        self
    }

    /// Make every pull fail, authenticated or not.
    pub fn fail_pulls(self) -> Self {
        self.inner.lock().unwrap().fail_all_pulls = true;
        self
    }

    /// Seed an existing container.
    pub fn with_container(self, name: &str, state: ContainerState) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.next_id += 1;
            let id = ContainerId::new(format!("mock-{}", inner.next_id));
            inner.containers.push(MockContainer {
                id,
                name: name.to_string(),
                image: "seeded".to_string(),
                state,
            });
        }
        self
    }

    pub fn containers_named(&self, name: &str) -> Vec<MockContainer> {
        self.inner
            .lock()
            .unwrap()
            .containers
            .iter()
            .filter(|c| c.name == name)
            .cloned()
            .collect()
    }

    pub fn removed_ids(&self) -> Vec<ContainerId> {
        self.inner.lock().unwrap().removed.clone()
    }

    /// (image, authenticated) per pull attempt, in order.
    pub fn pulls(&self) -> Vec<(String, bool)> {
        self.inner.lock().unwrap().pulls.clone()
    }
}

#[async_trait]
impl ImageOps for MockRuntime {
    async fn pull_image(
        &self,
        reference: &ImageRef,
        auth: Option<&RegistryAuth>,
    ) -> Result<(), ImageError> {
        let mut inner = self.inner.lock().unwrap();
        inner.pulls.push((reference.to_string(), auth.is_some()));

        if inner.fail_all_pulls {
            return Err(ImageError::PullFailed(reference.to_string()));
        }
        if inner.fail_anonymous_pull && auth.is_none() {
            return Err(ImageError::AuthenticationFailed(reference.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ContainerOps for MockRuntime {
    async fn create_container(
        &self,
        config: &ContainerConfig,
    ) -> Result<ContainerId, ContainerError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.containers.iter().any(|c| c.name == config.name) {
            return Err(ContainerError::AlreadyExists(config.name.clone()));
        }
        inner.next_id += 1;
        let id = ContainerId::new(format!("mock-{}", inner.next_id));
        inner.containers.push(MockContainer {
            id: id.clone(),
            name: config.name.clone(),
            image: config.image.to_string(),
            state: ContainerState::Created,
        });
        Ok(id)
    }

    async fn start_container(&self, id: &ContainerId) -> Result<(), ContainerError> {
        let mut inner = self.inner.lock().unwrap();
        let container = inner
            .containers
            .iter_mut()
            .find(|c| &c.id == id)
            .ok_or_else(|| ContainerError::NotFound(id.to_string()))?;
        container.state = ContainerState::Running;
        Ok(())
    }

    async fn stop_container(
        &self,
        id: &ContainerId,
        _timeout: Duration,
    ) -> Result<(), ContainerError> {
        let mut inner = self.inner.lock().unwrap();
        let container = inner
            .containers
            .iter_mut()
            .find(|c| &c.id == id)
            .ok_or_else(|| ContainerError::NotFound(id.to_string()))?;
        container.state = ContainerState::Exited;
        Ok(())
    }

    async fn remove_container(&self, id: &ContainerId, _force: bool) -> Result<(), ContainerError> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.containers.len();
        inner.containers.retain(|c| &c.id != id);
        if inner.containers.len() == before {
            return Err(ContainerError::NotFound(id.to_string()));
        }
        inner.removed.push(id.clone());
        Ok(())
    }

    async fn list_containers(
        &self,
        filters: &ContainerFilters,
    ) -> Result<Vec<ContainerSummary>, ContainerError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .containers
            .iter()
            .filter(|c| filters.all || c.state.is_running())
            .filter(|c| filters.name.as_deref().is_none_or(|n| n == c.name))
            .map(|c| ContainerSummary {
                id: c.id.clone(),
                name: c.name.clone(),
                image: c.image.clone(),
                state: c.state,
                labels: HashMap::new(),
            })
            .collect())
    }
}

/// A service spec with no transform, pointing at fixed paths. Rollout code
/// never touches the filesystem, so the paths need not exist.
pub fn plain_spec(name: &str, port: u16) -> ServiceSpec {
    ServiceSpec {
        name: ServiceName::new(name).unwrap(),
        image: ImageRef::parse(&format!("registry.example.com/stack/{name}:latest")).unwrap(),
        port,
        env_file: PathBuf::from(format!("/opt/stack/{name}/.env")),
        log_dir: PathBuf::from(format!("/var/log/stack/{name}")),
        env_mount: "/app/.env".to_string(),
        log_mount: "/app/logs".to_string(),
        transform: None,
    }
}

/// Write a fake crypto tool script into `dir` and return its path.
///
/// encrypt gzips the target in place (binary output), decrypt reverses it.
/// The trailing --no-prompt flag is accepted and ignored.
pub fn fake_crypto_tool(dir: &Path) -> PathBuf {
    let path = dir.join("fakecrypt");
    let script = r#"#!/bin/sh
op="$1"
file="$2"
case "$op" in
  encrypt) gzip -c "$file" > "$file.tmp" && mv "$file.tmp" "$file" ;;
  decrypt) gzip -d -c "$file" > "$file.tmp" && mv "$file.tmp" "$file" ;;
  *) echo "unknown op: $op" >&2; exit 2 ;;
esac
"#;
    std::fs::write(&path, script).unwrap();

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    path
}
