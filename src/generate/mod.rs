//! Script execution, merging and encoder dispatch.

pub mod cancel;
pub mod generator;
