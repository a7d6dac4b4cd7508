//! Elements, groups and the script boundary.

pub mod element;
pub mod script;
