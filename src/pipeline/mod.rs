//! The unpack / reconcile / repack pipeline

pub mod extract;
pub mod rebuild;
pub mod reconcile;
