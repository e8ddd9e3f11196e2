//! Offline export of the animation to a video container.

/// Synthetic-clock frame loop.
pub mod driver;
/// Persistence and notification collaborators.
pub mod sink;
