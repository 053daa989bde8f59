// ABOUTME: Deployment driver: dependency resolution, stale-container cleanup, start.
// ABOUTME: Typestate rollout enforces pull-before-start at compile time.

mod error;
mod rollout;
mod state;

pub use error::DeployError;
pub use rollout::{CollisionPolicy, DeploymentTarget, Rollout};
pub use state::{ImageReady, NoImage, Running};
