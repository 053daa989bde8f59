// ABOUTME: Container runtime abstraction and its bollard-backed implementation.
// ABOUTME: The pipeline sees only the ImageOps/ContainerOps capability traits.

mod docker;
mod error;
mod traits;

pub use docker::DockerRuntime;
pub use error::ConnectError;
pub use traits::{
    ContainerConfig, ContainerError, ContainerFilters, ContainerOps, ContainerState,
    ContainerSummary, ImageError, ImageOps, PortMapping, Protocol, RegistryAuth,
    RestartPolicyConfig, VolumeMount,
};
