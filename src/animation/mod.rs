//! Eased commands and the per-property timelines they live in.

pub mod command;
pub mod ease;
pub mod timeline;
