//! Engine version requirement of a rules file
//!
//! Rules files are not parsed as YAML. The first line starting with
//! [`RULES_ENGINE_ANCHOR`] is located, split on `:`, and its second field is
//! run through [`parse_requirement_version`].

use crate::error::{RequirementError, Result};
use crate::requirement::ArtifactRequirement;
use crate::version::parse_requirement_version;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Line prefix declaring the required engine version
pub const RULES_ENGINE_ANCHOR: &str = "- required_engine_version";

/// Extract the engine version requirement from a rules file on disk
pub fn rulesfile_requirement(path: impl AsRef<Path>) -> Result<ArtifactRequirement> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| RequirementError::FileOpen {
        path: path.to_path_buf(),
        source,
    })?;

    rules_requirement_from_reader(BufReader::new(file), path)
}

/// Extract the engine version requirement from already opened rules content
///
/// `path` is only used to give errors context.
pub fn rules_requirement_from_reader<R: BufRead>(
    reader: R,
    path: impl AsRef<Path>,
) -> Result<ArtifactRequirement> {
    let path = path.as_ref();

    let anchor_line = find_anchor_line(reader)
        .map_err(|source| RequirementError::FileRead {
            path: path.to_path_buf(),
            source,
        })?
        .ok_or_else(|| RequirementError::RequirementNotFound {
            path: path.to_path_buf(),
        })?;

    let token = anchor_token(&anchor_line).ok_or_else(|| RequirementError::VersionParse {
        path: path.to_path_buf(),
        token: anchor_line[RULES_ENGINE_ANCHOR.len()..].trim().to_string(),
    })?;
    let parsed =
        parse_requirement_version(token).map_err(|err| RequirementError::VersionParse {
            path: path.to_path_buf(),
            token: err.token,
        })?;

    tracing::debug!(
        "Rules file {:?} requires engine {} (token {:?}, remapped: {})",
        path,
        parsed.version(),
        token,
        parsed.is_remapped()
    );

    Ok(ArtifactRequirement::engine(parsed.version().to_string()))
}

/// Scan lines in order, stopping at the first anchor
///
/// Lines are matched as bytes so non UTF-8 content before the anchor is
/// skipped. Only the anchor line is decoded, lossily.
fn find_anchor_line<R: BufRead>(mut reader: R) -> std::io::Result<Option<String>> {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(None);
        }

        let line = strip_line_ending(&buf);
        if line.starts_with(RULES_ENGINE_ANCHOR.as_bytes()) {
            return Ok(Some(String::from_utf8_lossy(line).into_owned()));
        }
    }
}

fn strip_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Second `:`-separated field of the anchor line, if the line has one
fn anchor_token(line: &str) -> Option<&str> {
    line.split(':').nth(1)
}
