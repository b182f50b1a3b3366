//! # artreq Core
//!
//! Requirement extraction shared by every artreq front end.
//!
//! This crate provides:
//! - The [`ArtifactRequirement`] model and its two fixed requirement keys
//! - The [`RequirementError`] taxonomy
//! - Strict-then-tolerant version coercion
//! - Engine version extraction from rules files

pub mod error;
pub mod requirement;
pub mod rules;
pub mod version;

pub use error::{BoxError, RequirementError, Result};
pub use requirement::{
    ArtifactRequirement, RequirementKey, ENGINE_VERSION_KEY, PLUGIN_API_VERSION_KEY,
};
pub use rules::{rules_requirement_from_reader, rulesfile_requirement, RULES_ENGINE_ANCHOR};
pub use version::{parse_requirement_version, parse_tolerant, InvalidVersion, ParsedVersion};
