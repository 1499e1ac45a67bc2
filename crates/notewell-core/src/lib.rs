//! # notewell-core
//!
//! Core types, errors, and domain logic for the notewell note service.
//!
//! This crate provides the foundational data structures that the other
//! notewell crates depend on: the domain models (notes, version snapshots,
//! users, principals), the error taxonomy, centralized default constants,
//! and the pure merge/retention logic exercised by the database layer.

pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;
pub mod uuid_utils;

// Re-export commonly used types at crate root
pub use defaults::RETENTION_LIMIT;
pub use error::{Error, Result};
pub use models::*;
pub use uuid_utils::{extract_timestamp, is_v7, new_v7};
