// ABOUTME: Shared types used across runtime trait definitions.
// ABOUTME: ContainerConfig, mounts, ports, restart policy, registry auth.

use crate::types::ImageRef;
use std::collections::HashMap;
use std::time::Duration;

/// Configuration for creating a container.
#[derive(Debug, Clone)]
pub struct ContainerConfig {
    /// Name for the container. One container per service name, so the
    /// service name is the container name.
    pub name: String,
    /// Image to run.
    pub image: ImageRef,
    /// Labels to apply.
    pub labels: HashMap<String, String>,
    /// Port mappings (host:container).
    pub ports: Vec<PortMapping>,
    /// Volume mounts (env file, log directory).
    pub volumes: Vec<VolumeMount>,
    /// Restart policy.
    pub restart_policy: RestartPolicyConfig,
    /// Stop timeout.
    pub stop_timeout: Option<Duration>,
}

/// Port mapping configuration.
#[derive(Debug, Clone)]
pub struct PortMapping {
    /// Host port.
    pub host_port: Option<u16>,
    /// Container port.
    pub container_port: u16,
    /// Protocol (tcp/udp).
    pub protocol: Protocol,
}

impl PortMapping {
    /// Publish the same port on host and container, TCP.
    pub fn symmetric(port: u16) -> Self {
        Self {
            host_port: Some(port),
            container_port: port,
            protocol: Protocol::Tcp,
        }
    }
}

/// Network protocol.
#[derive(Debug, Clone, Copy, Default)]
pub enum Protocol {
    #[default]
    Tcp,
    Udp,
}

/// Volume mount configuration.
#[derive(Debug, Clone)]
pub struct VolumeMount {
    /// Source path on the host.
    pub source: String,
    /// Target path in the container.
    pub target: String,
    /// Read-only flag.
    pub read_only: bool,
}

/// Restart policy configuration.
#[derive(Debug, Clone, Default)]
pub enum RestartPolicyConfig {
    /// Never restart.
    No,
    /// Always restart.
    Always,
    /// Restart unless explicitly stopped.
    #[default]
    UnlessStopped,
}

/// Container state as reported by the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerState {
    Created,
    Running,
    Paused,
    Restarting,
    Removing,
    Exited,
    Dead,
}

impl ContainerState {
    pub fn is_running(self) -> bool {
        matches!(self, ContainerState::Running | ContainerState::Restarting)
    }
}

/// Registry authentication credentials.
#[derive(Debug, Clone)]
pub struct RegistryAuth {
    /// Username.
    pub username: String,
    /// Password or token.
    pub password: String,
    /// Registry server (e.g. a private ECR endpoint).
    pub server: Option<String>,
}
