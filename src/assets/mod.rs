//! Generated asset files and the cache that keeps them on disk.

pub mod asset;
pub mod cache;
pub mod materialize;
