//! Shared primitives: errors, storyboard enums and colors, rounding.

pub mod core;
pub mod error;
pub mod math;
