// ABOUTME: Environment-configuration file handling: markers, classification, transforms.
// ABOUTME: The file's own bytes are the only persisted pipeline state.

mod apply;
mod inspect;
mod marker;

pub use apply::{Applied, ApplyError, TransformParams, TransformRule, apply, apply_file};
pub use inspect::{ConfigState, InspectError, classify, classify_bytes};
pub use marker::{Marker, MarkerSet, TransformId, TransformIdError};
