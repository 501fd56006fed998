//! Core types for the Wheelwright dependency resolver.
//!
//! This crate provides the foundational vocabulary used throughout
//! Wheelwright:
//! - Canonical three-component package versions
//! - Bounded version ranges
//! - Requirement fragment parsing (the textual form a package index
//!   declares its dependencies in)

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

mod requirement;
mod version;

pub use requirement::{Requirement, RequirementParseError};
pub use version::{Version, VersionParseError, VersionRange, standardize};

// Re-export commonly used collection types
pub use ahash::{AHashMap, AHashSet};

/// Global allocator using mimalloc for high performance.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;
