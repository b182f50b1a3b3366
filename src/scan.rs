//! Artifact classification and batch extraction

use artreq_config::{OutputFormat, ScanConfig};
use artreq_core::{rulesfile_requirement, ArtifactRequirement, RequirementError};
use artreq_plugins::{plugin_requirement, PluginLoader};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Kind of registry artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Rules,
    Plugin,
}

/// A requirement together with the artifact it came from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedRequirement {
    pub path: PathBuf,
    pub kind: ArtifactKind,
    pub requirement: ArtifactRequirement,
}

/// An artifact whose extraction failed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Results of extracting one or more artifacts
#[derive(Debug, Default, Serialize)]
pub struct Report {
    pub requirements: Vec<ExtractedRequirement>,
    /// Rules files declaring no engine version
    pub without_requirement: Vec<PathBuf>,
    pub failures: Vec<ExtractionFailure>,
}

impl Report {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    fn record(
        &mut self,
        path: &Path,
        kind: ArtifactKind,
        result: artreq_core::Result<ArtifactRequirement>,
    ) {
        match result {
            Ok(requirement) => self.requirements.push(ExtractedRequirement {
                path: path.to_path_buf(),
                kind,
                requirement,
            }),
            Err(err) if err.is_not_found() => {
                tracing::info!("{:?} declares no requirement", path);
                self.without_requirement.push(path.to_path_buf());
            }
            Err(err) => self.fail(path, &err),
        }
    }

    fn fail(&mut self, path: &Path, err: &dyn std::error::Error) {
        tracing::error!("{}", err);
        self.failures.push(ExtractionFailure {
            path: path.to_path_buf(),
            error: err.to_string(),
        });
    }

    /// Print the report in the configured format
    pub fn render(
        &self,
        format: OutputFormat,
        pretty: bool,
        out: &mut impl Write,
    ) -> anyhow::Result<()> {
        match format {
            OutputFormat::Json if pretty => serde_json::to_writer_pretty(&mut *out, self)?,
            OutputFormat::Json => serde_json::to_writer(&mut *out, self)?,
            OutputFormat::Text => {
                for extracted in &self.requirements {
                    writeln!(out, "{}\t{}", extracted.path.display(), extracted.requirement)?;
                }
                for path in &self.without_requirement {
                    writeln!(out, "{}\t-", path.display())?;
                }
                for failure in &self.failures {
                    writeln!(out, "{}\terror: {}", failure.path.display(), failure.error)?;
                }
                return Ok(());
            }
        }
        writeln!(out)?;
        Ok(())
    }
}

/// Runs the matching extractor for each artifact
pub struct Extractor<L> {
    loader: L,
    scan: ScanConfig,
}

impl<L: PluginLoader> Extractor<L> {
    pub fn new(loader: L, scan: ScanConfig) -> Self {
        Self { loader, scan }
    }

    /// Decide an artifact's kind from its extension
    pub fn classify(&self, path: &Path) -> Option<ArtifactKind> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        if self.scan.rules_extensions.contains(&ext) {
            Some(ArtifactKind::Rules)
        } else if self.scan.plugin_extensions.contains(&ext) {
            Some(ArtifactKind::Plugin)
        } else {
            None
        }
    }

    pub fn extract(
        &self,
        kind: ArtifactKind,
        path: &Path,
    ) -> Result<ArtifactRequirement, RequirementError> {
        match kind {
            ArtifactKind::Rules => rulesfile_requirement(path),
            ArtifactKind::Plugin => plugin_requirement(&self.loader, path),
        }
    }

    /// Extract every path as the given kind
    pub fn extract_all(&self, kind: ArtifactKind, paths: &[PathBuf]) -> Report {
        let mut report = Report::default();
        for path in paths {
            report.record(path, kind, self.extract(kind, path));
        }
        report
    }

    /// Walk a directory and extract every recognised artifact
    pub fn scan_dir(&self, dir: &Path) -> Report {
        let mut report = Report::default();

        let mut walker = WalkDir::new(dir)
            .follow_links(self.scan.follow_links)
            .sort_by_file_name();
        if let Some(depth) = self.scan.max_depth {
            walker = walker.max_depth(depth);
        }

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    let path = err.path().unwrap_or(dir).to_path_buf();
                    report.fail(&path, &err);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            match self.classify(path) {
                Some(kind) => {
                    tracing::debug!("Extracting {:?} as {:?}", path, kind);
                    report.record(path, kind, self.extract(kind, path));
                }
                None => tracing::trace!("Skipping {:?}", path),
            }
        }

        report
    }
}
