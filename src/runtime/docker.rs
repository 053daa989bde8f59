// ABOUTME: Bollard-based container runtime implementation.
// ABOUTME: Talks to the local Docker-compatible socket (Docker or Podman).

use crate::runtime::error::{PingSnafu, SocketSnafu};
use crate::runtime::traits::{
    ContainerConfig, ContainerError, ContainerFilters, ContainerOps, ContainerState,
    ContainerSummary, ImageError, ImageOps, Protocol, RegistryAuth, RestartPolicyConfig,
};
use crate::types::{ContainerId, ImageRef};
use async_trait::async_trait;
use bollard::Docker;
use bollard::models::{
    ContainerCreateBody, HostConfig, Mount, MountTypeEnum, PortBinding, RestartPolicy,
    RestartPolicyNameEnum,
};
use bollard::query_parameters::{
    CreateContainerOptions, CreateImageOptions, ListContainersOptions, RemoveContainerOptions,
    StopContainerOptions,
};
use futures::StreamExt;
use snafu::ResultExt;
use std::collections::HashMap;
use std::time::Duration;

use super::error::ConnectError;

// =============================================================================
// Error Mapping Helpers
// =============================================================================

fn map_image_pull_error(e: bollard::errors::Error, image_name: &str) -> ImageError {
    match &e {
        bollard::errors::Error::DockerResponseServerError { status_code, .. }
            if *status_code == 401 || *status_code == 403 =>
        {
            ImageError::AuthenticationFailed(image_name.to_string())
        }
        bollard::errors::Error::DockerResponseServerError { status_code, .. }
            if *status_code == 404 =>
        {
            ImageError::NotFound(image_name.to_string())
        }
        _ => ImageError::PullFailed(format!("{}: {}", image_name, e)),
    }
}

fn map_container_create_error(e: bollard::errors::Error) -> ContainerError {
    match &e {
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 404 => ContainerError::ImageNotFound(message.clone()),
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 409 => ContainerError::AlreadyExists(message.clone()),
        _ => ContainerError::Runtime(e.to_string()),
    }
}

fn map_container_start_error(e: bollard::errors::Error) -> ContainerError {
    match &e {
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 404 => ContainerError::NotFound(message.clone()),
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 304 => ContainerError::AlreadyRunning(message.clone()),
        _ => ContainerError::Runtime(e.to_string()),
    }
}

fn map_container_stop_error(e: bollard::errors::Error) -> ContainerError {
    match &e {
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 404 => ContainerError::NotFound(message.clone()),
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 304 => ContainerError::NotRunning(message.clone()),
        _ => ContainerError::Runtime(e.to_string()),
    }
}

fn map_container_not_found_error(e: bollard::errors::Error) -> ContainerError {
    match &e {
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 404 => ContainerError::NotFound(message.clone()),
        _ => ContainerError::Runtime(e.to_string()),
    }
}

fn parse_container_state(raw: &str) -> ContainerState {
    match raw {
        "created" => ContainerState::Created,
        "running" => ContainerState::Running,
        "paused" => ContainerState::Paused,
        "restarting" => ContainerState::Restarting,
        "removing" => ContainerState::Removing,
        "dead" => ContainerState::Dead,
        _ => ContainerState::Exited,
    }
}

// =============================================================================
// DockerRuntime
// =============================================================================

/// Container runtime implementation using bollard against the local socket.
///
/// Works with both Docker and rootful Podman via the Docker-compatible API.
pub struct DockerRuntime {
    client: Docker,
}

impl DockerRuntime {
    /// Connect using the local platform defaults (unix socket or env).
    pub fn connect_local() -> Result<Self, ConnectError> {
        let client = Docker::connect_with_local_defaults().context(SocketSnafu)?;
        Ok(Self { client })
    }

    /// Connect and verify the daemon answers.
    pub async fn connect_and_ping() -> Result<Self, ConnectError> {
        let runtime = Self::connect_local()?;
        runtime.client.ping().await.context(PingSnafu)?;
        Ok(runtime)
    }
}

#[async_trait]
impl ImageOps for DockerRuntime {
    async fn pull_image(
        &self,
        reference: &ImageRef,
        auth: Option<&RegistryAuth>,
    ) -> Result<(), ImageError> {
        let image_name = reference.to_string();

        let opts = CreateImageOptions {
            from_image: Some(image_name.clone()),
            ..Default::default()
        };

        let credentials = auth.map(|a| bollard::auth::DockerCredentials {
            username: Some(a.username.clone()),
            password: Some(a.password.clone()),
            serveraddress: a.server.clone(),
            ..Default::default()
        });

        // Pull returns a stream of progress updates - consume it
        let mut stream = self.client.create_image(Some(opts), None, credentials);
        while let Some(result) = stream.next().await {
            result.map_err(|e| map_image_pull_error(e, &image_name))?;
        }

        Ok(())
    }
}

#[async_trait]
impl ContainerOps for DockerRuntime {
    async fn create_container(
        &self,
        config: &ContainerConfig,
    ) -> Result<ContainerId, ContainerError> {
        let image_name = config.image.to_string();

        let mut host_config = HostConfig {
            restart_policy: Some(RestartPolicy {
                name: Some(match &config.restart_policy {
                    RestartPolicyConfig::No => RestartPolicyNameEnum::NO,
                    RestartPolicyConfig::Always => RestartPolicyNameEnum::ALWAYS,
                    RestartPolicyConfig::UnlessStopped => RestartPolicyNameEnum::UNLESS_STOPPED,
                }),
                maximum_retry_count: None,
            }),
            ..Default::default()
        };

        let mounts: Vec<Mount> = config
            .volumes
            .iter()
            .map(|m| Mount {
                source: Some(m.source.clone()),
                target: Some(m.target.clone()),
                typ: Some(MountTypeEnum::BIND),
                read_only: Some(m.read_only),
                ..Default::default()
            })
            .collect();
        if !mounts.is_empty() {
            host_config.mounts = Some(mounts);
        }

        let mut port_bindings: HashMap<String, Option<Vec<PortBinding>>> = HashMap::new();
        let mut exposed_ports: Vec<String> = Vec::new();
        for port in &config.ports {
            let proto = match port.protocol {
                Protocol::Tcp => "tcp",
                Protocol::Udp => "udp",
            };
            let port_key = format!("{}/{}", port.container_port, proto);

            exposed_ports.push(port_key.clone());

            if let Some(host_port) = port.host_port {
                port_bindings.insert(
                    port_key,
                    Some(vec![PortBinding {
                        host_ip: None,
                        host_port: Some(host_port.to_string()),
                    }]),
                );
            }
        }
        if !port_bindings.is_empty() {
            host_config.port_bindings = Some(port_bindings);
        }

        let container_config = ContainerCreateBody {
            image: Some(image_name),
            labels: if config.labels.is_empty() {
                None
            } else {
                Some(config.labels.clone())
            },
            host_config: Some(host_config),
            exposed_ports: if exposed_ports.is_empty() {
                None
            } else {
                Some(exposed_ports)
            },
            stop_timeout: config.stop_timeout.map(|d| d.as_secs() as i64),
            ..Default::default()
        };

        let opts = CreateContainerOptions {
            name: Some(config.name.clone()),
            ..Default::default()
        };

        let response = self
            .client
            .create_container(Some(opts), container_config)
            .await
            .map_err(map_container_create_error)?;

        Ok(ContainerId::new(response.id))
    }

    async fn start_container(&self, id: &ContainerId) -> Result<(), ContainerError> {
        self.client
            .start_container(
                id.as_str(),
                None::<bollard::query_parameters::StartContainerOptions>,
            )
            .await
            .map_err(map_container_start_error)
    }

    async fn stop_container(
        &self,
        id: &ContainerId,
        timeout: Duration,
    ) -> Result<(), ContainerError> {
        let opts = StopContainerOptions {
            t: Some(timeout.as_secs() as i32),
            signal: None,
        };

        self.client
            .stop_container(id.as_str(), Some(opts))
            .await
            .map_err(map_container_stop_error)
    }

    async fn remove_container(&self, id: &ContainerId, force: bool) -> Result<(), ContainerError> {
        let opts = RemoveContainerOptions {
            force,
            ..Default::default()
        };

        self.client
            .remove_container(id.as_str(), Some(opts))
            .await
            .map_err(map_container_not_found_error)?;

        Ok(())
    }

    async fn list_containers(
        &self,
        filters: &ContainerFilters,
    ) -> Result<Vec<ContainerSummary>, ContainerError> {
        let mut filter_map: HashMap<String, Vec<String>> = HashMap::new();

        if let Some(ref name) = filters.name {
            filter_map.insert("name".to_string(), vec![name.clone()]);
        }

        for (key, value) in &filters.labels {
            filter_map
                .entry("label".to_string())
                .or_default()
                .push(format!("{}={}", key, value));
        }

        let opts = ListContainersOptions {
            all: filters.all,
            filters: Some(filter_map),
            ..Default::default()
        };

        let containers = self
            .client
            .list_containers(Some(opts))
            .await
            .map_err(|e| ContainerError::Runtime(e.to_string()))?;

        // The name filter is a substring match on the daemon side; keep only
        // exact name matches so "qna" never matches "qna-old".
        let wanted = filters.name.as_deref();

        Ok(containers
            .into_iter()
            .filter_map(|c| {
                let id = c.id.unwrap_or_default();
                let names = c.names.unwrap_or_default();
                let name = names
                    .first()
                    .map(|n| n.trim_start_matches('/').to_string())
                    .unwrap_or_default();

                if let Some(wanted) = wanted
                    && name != wanted
                {
                    return None;
                }

                let state_str = c
                    .state
                    .map(|s| format!("{:?}", s).to_lowercase())
                    .unwrap_or_default();

                Some(ContainerSummary {
                    id: ContainerId::new(id),
                    name,
                    image: c.image.unwrap_or_default(),
                    state: parse_container_state(&state_str),
                    labels: c.labels.unwrap_or_default(),
                })
            })
            .collect())
    }
}
