// ABOUTME: Validated domain types shared across the crate.
// ABOUTME: Service names, image references, and phantom-typed IDs.

mod id;
mod image_ref;
mod service_name;

pub use id::{ContainerId, ContainerMarker, Id};
pub use image_ref::{ImageRef, ParseImageRefError};
pub use service_name::{ServiceName, ServiceNameError};
