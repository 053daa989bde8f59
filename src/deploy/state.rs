// ABOUTME: Rollout state marker types for the type state pattern.
// ABOUTME: Zero-sized types enforce valid state transitions at compile time.

/// Initial state: image may be absent locally.
/// Available actions: `ensure_image()`
#[derive(Debug, Clone, Copy, Default)]
pub struct NoImage;

/// Image present locally.
/// Available actions: `start()`
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageReady;

/// Container created and running. Terminal.
/// Available actions: `target()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Running;
