//! Version token coercion
//!
//! Rules files declare their engine requirement either as a semantic version
//! (`0.26.1`) or as a bare number (`9`). Parsing happens in two tiers:
//!
//! 1. strict semver on the trimmed token, used as-is;
//! 2. a tolerant grammar (optional `v` prefix, leading zeros, missing
//!    components) whose major component is reinterpreted as the minor
//!    component of `0.<major>.0`.
//!
//! A bare number therefore names a minor engine version, never a major one.

use semver::Version;
use thiserror::Error;

/// Token rejected by both parsing tiers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unable to parse requirement {token:?}: expected a numeric value or a valid semver string")]
pub struct InvalidVersion {
    pub token: String,
}

/// Outcome of a successful requirement version parse
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedVersion {
    /// Token was already a full semantic version
    Strict(Version),
    /// Token only parsed tolerantly; `tolerant` is what the loose grammar
    /// produced, `remapped` is `0.<tolerant.major>.0`
    Remapped { tolerant: Version, remapped: Version },
}

impl ParsedVersion {
    /// The normalized version to report
    pub fn version(&self) -> &Version {
        match self {
            Self::Strict(v) => v,
            Self::Remapped { remapped, .. } => remapped,
        }
    }

    pub fn is_remapped(&self) -> bool {
        matches!(self, Self::Remapped { .. })
    }
}

/// Parse a raw requirement token with strict-then-tolerant fallback
pub fn parse_requirement_version(token: &str) -> Result<ParsedVersion, InvalidVersion> {
    if let Ok(version) = Version::parse(token.trim()) {
        return Ok(ParsedVersion::Strict(version));
    }

    match parse_tolerant(token) {
        Some(tolerant) => {
            let remapped = remap_to_minor(&tolerant);
            Ok(ParsedVersion::Remapped { tolerant, remapped })
        }
        None => Err(InvalidVersion {
            token: token.to_string(),
        }),
    }
}

/// Reinterpret a version's major component as a minor engine version
pub fn remap_to_minor(version: &Version) -> Version {
    Version::new(0, version.major, 0)
}

/// Loose version grammar
///
/// Accepts surrounding whitespace, a leading `v`, leading zeros in each
/// component and fewer than three components (missing ones become `0`).
/// A shortened version cannot carry prerelease or build metadata.
pub fn parse_tolerant(token: &str) -> Option<Version> {
    let trimmed = token.trim();
    let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);

    let mut parts: Vec<String> = trimmed.splitn(3, '.').map(strip_leading_zeros).collect();

    if parts.len() < 3 {
        if parts
            .last()
            .is_some_and(|last| last.contains(['+', '-']))
        {
            return None;
        }
        parts.resize(3, "0".to_string());
    }

    Version::parse(&parts.join(".")).ok()
}

fn strip_leading_zeros(part: &str) -> String {
    if part.len() <= 1 {
        return part.to_string();
    }

    let stripped = part.trim_start_matches('0');
    match stripped.chars().next() {
        Some(c) if c.is_ascii_digit() => stripped.to_string(),
        _ => format!("0{}", stripped),
    }
}
