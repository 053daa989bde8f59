// ABOUTME: State transition methods for one service's rollout.
// ABOUTME: Each method consumes self and returns the next state on success.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::time::Duration;

use crate::config::ServiceSpec;
use crate::runtime::{
    ContainerConfig, ContainerFilters, ContainerOps, ImageOps, PortMapping, RegistryAuth,
    RestartPolicyConfig, VolumeMount,
};
use crate::types::{ContainerId, ServiceName};

use super::error::DeployError;
use super::state::{ImageReady, NoImage, Running};

/// How to resolve a container-name collision before starting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionPolicy {
    /// Main pipeline: remove any same-named container, running or stopped,
    /// and recreate. Deployment is never skipped based on running state.
    Recreate,
    /// Boot path: a running container is left alone; only stopped ones are
    /// removed and recreated.
    PreserveRunning,
}

/// The container instance bound to one service after a successful rollout.
#[derive(Debug, Clone)]
pub struct DeploymentTarget {
    pub service: ServiceName,
    pub container: ContainerId,
    /// False when `PreserveRunning` found an already-running container.
    pub recreated: bool,
}

/// A rollout in progress, parameterized by its current state.
#[derive(Debug)]
pub struct Rollout<S> {
    spec: ServiceSpec,
    stop_timeout: Duration,
    container: Option<ContainerId>,
    recreated: bool,
    _state: PhantomData<S>,
}

impl Rollout<NoImage> {
    pub fn new(spec: ServiceSpec, stop_timeout: Duration) -> Self {
        Rollout {
            spec,
            stop_timeout,
            container: None,
            recreated: true,
            _state: PhantomData,
        }
    }
}

impl<S> Rollout<S> {
    pub fn service_name(&self) -> &ServiceName {
        &self.spec.name
    }

    fn transition<T>(self) -> Rollout<T> {
        Rollout {
            spec: self.spec,
            stop_timeout: self.stop_timeout,
            container: self.container,
            recreated: self.recreated,
            _state: PhantomData,
        }
    }
}

// =============================================================================
// NoImage -> ImageReady
// =============================================================================

impl Rollout<NoImage> {
    /// Ensure the service image is present.
    ///
    /// A pull is tried first without credentials; only on failure are
    /// credentials resolved (`login`) and the pull retried exactly once.
    /// The common path with a cached token never touches credentials.
    ///
    /// # Errors
    ///
    /// Returns `DeployError::ImagePullFailed` if the retried pull also fails,
    /// or `DeployError::LoginFailed` if credentials cannot be obtained.
    #[must_use = "rollout state must be used"]
    pub async fn ensure_image<R, F>(
        self,
        runtime: &R,
        login: F,
    ) -> Result<Rollout<ImageReady>, DeployError>
    where
        R: ImageOps,
        F: FnOnce() -> Result<Option<RegistryAuth>, DeployError>,
    {
        match runtime.pull_image(&self.spec.image, None).await {
            Ok(()) => return Ok(self.transition()),
            Err(e) => {
                tracing::debug!(image = %self.spec.image, error = %e, "anonymous pull failed, retrying with login");
            }
        }

        let auth = login()?.ok_or_else(|| {
            DeployError::LoginFailed(format!(
                "no registry credentials configured for {}",
                self.spec.image
            ))
        })?;

        runtime
            .pull_image(&self.spec.image, Some(&auth))
            .await
            .map_err(|e| DeployError::ImagePullFailed(e.to_string()))?;

        Ok(self.transition())
    }
}

// =============================================================================
// ImageReady -> Running
// =============================================================================

impl Rollout<ImageReady> {
    /// Resolve any name collision per `policy`, then create and start the
    /// service container with its config file and log directory mounted.
    ///
    /// Afterwards exactly one container bound to the service name exists.
    ///
    /// # Errors
    ///
    /// Returns error if removal, creation, or start fails.
    #[must_use = "rollout state must be used"]
    pub async fn start<R: ContainerOps>(
        mut self,
        runtime: &R,
        policy: CollisionPolicy,
    ) -> Result<Rollout<Running>, DeployError> {
        let name = self.spec.name.to_string();

        let filters = ContainerFilters {
            name: Some(name.clone()),
            all: true,
            ..Default::default()
        };
        let existing = runtime.list_containers(&filters).await?;

        for container in existing {
            if policy == CollisionPolicy::PreserveRunning && container.state.is_running() {
                tracing::info!(service = %name, "container already running, leaving in place");
                self.container = Some(container.id);
                self.recreated = false;
                return Ok(self.transition());
            }

            if container.state.is_running() {
                let _ = runtime
                    .stop_container(&container.id, self.stop_timeout)
                    .await;
            }
            runtime
                .remove_container(&container.id, true)
                .await
                .map_err(|e| DeployError::ContainerRemoveFailed(e.to_string()))?;
            tracing::info!(service = %name, id = %container.id, "removed stale container");
        }

        let config = self.build_container_config();
        let container_id = runtime
            .create_container(&config)
            .await
            .map_err(|e| DeployError::ContainerCreateFailed(e.to_string()))?;

        if let Err(e) = runtime.start_container(&container_id).await {
            // Clean up the created container on start failure
            let _ = runtime.remove_container(&container_id, true).await;
            return Err(DeployError::ContainerStartFailed(e.to_string()));
        }

        self.container = Some(container_id);
        self.recreated = true;
        Ok(self.transition())
    }

    fn build_container_config(&self) -> ContainerConfig {
        let mut labels = HashMap::new();
        labels.insert(
            "vaultship.service".to_string(),
            self.spec.name.to_string(),
        );
        labels.insert("vaultship.managed".to_string(), "true".to_string());
        labels.insert(
            "vaultship.deployed-at".to_string(),
            chrono::Utc::now().to_rfc3339(),
        );

        let volumes = vec![
            VolumeMount {
                source: self.spec.env_file.display().to_string(),
                target: self.spec.env_mount.clone(),
                read_only: true,
            },
            VolumeMount {
                source: self.spec.log_dir.display().to_string(),
                target: self.spec.log_mount.clone(),
                read_only: false,
            },
        ];

        ContainerConfig {
            name: self.spec.name.to_string(),
            image: self.spec.image.clone(),
            labels,
            ports: vec![PortMapping::symmetric(self.spec.port)],
            volumes,
            restart_policy: RestartPolicyConfig::UnlessStopped,
            stop_timeout: Some(self.stop_timeout),
        }
    }
}

// =============================================================================
// Running - Terminal State
// =============================================================================

impl Rollout<Running> {
    /// The container instance now bound to the service.
    pub fn target(self) -> DeploymentTarget {
        let container = self
            .container
            .expect("running rollout must have a container");
        DeploymentTarget {
            service: self.spec.name,
            container,
            recreated: self.recreated,
        }
    }
}
