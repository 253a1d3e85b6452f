//! lunahack - unpack, mod, and repack 3DS cartridge images
//!
//! Orchestrates an external packer and an external editor around an
//! on-disk extraction tree and an editable working tree, with a
//! fingerprint cache to skip repeated extraction of the same image.

// Enforce strict code quality and reliability
#![deny(
    // Safety
    unsafe_code,

    // Correctness
    missing_debug_implementations,
    unreachable_pub,

    // Future compatibility
    future_incompatible,

    // Rust 2018 idioms
    rust_2018_idioms,
)]
#![warn(
    // Documentation
    missing_docs,

    // Error handling best practices
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,

    // Code clarity and maintainability
    clippy::cognitive_complexity,
    clippy::type_complexity,

    // Best practices
    clippy::wildcard_imports,
    clippy::enum_glob_use,
    clippy::if_not_else,
    clippy::needless_continue,
    clippy::explicit_iter_loop,
)]

pub mod api;
pub mod cache;
pub mod config;
pub mod discovery;
pub mod exceptions;
pub mod exit_codes;
pub mod fingerprint;
pub mod fsutil;
pub mod logger;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod runner;
pub mod session;
pub mod version;

// Re-export main API types
pub use api::{SessionOptions, run_session};
pub use config::{PARTITIONS, Partition, SessionConfig};
pub use exceptions::{LunaError, Result};
pub use runner::FailurePolicy;
pub use session::Session;
