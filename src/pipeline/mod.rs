//! Hooks wrapped around a generation run.

pub mod config;
pub mod step;
pub mod steps;
