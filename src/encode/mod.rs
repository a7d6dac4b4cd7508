//! Output encoders.

/// Structured scene graph for previews.
pub mod scene;
/// Legacy `.osb` text.
pub mod text;
