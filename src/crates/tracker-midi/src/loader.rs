//! Reading patterns and projects from a tracker's SD card layout.
//!
//! A project directory holds `project.mt` plus a `patterns/` directory of
//! `pattern_NN.mtp` files. Slots that were never used have no file.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracker_core::{Pattern, Project, Song};

pub const PROJECT_FILE_NAME: &str = "project.mt";
pub const PATTERNS_DIR_NAME: &str = "patterns";
pub const PATTERN_EXTENSION: &str = "mtp";

pub fn pattern_file_name(number: u8) -> String {
    format!("pattern_{:02}.{}", number, PATTERN_EXTENSION)
}

/// Paths of a project on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLocation {
    pub root: PathBuf,
    pub project_file: PathBuf,
}

impl ProjectLocation {
    /// Accepts either the project directory or its `project.mt` file
    pub fn resolve(path: &Path) -> Result<Self> {
        let (root, project_file) = if path.is_dir() {
            (path.to_path_buf(), path.join(PROJECT_FILE_NAME))
        } else {
            let root = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            };
            (root, path.to_path_buf())
        };

        if !project_file.is_file() {
            anyhow::bail!("Project file not found: {}", project_file.display());
        }
        Ok(ProjectLocation { root, project_file })
    }

    pub fn pattern_path(&self, number: u8) -> PathBuf {
        self.root
            .join(PATTERNS_DIR_NAME)
            .join(pattern_file_name(number))
    }

    /// The directory name, which is what the tracker shows as project name
    pub fn name(&self) -> String {
        self.root
            .canonicalize()
            .ok()
            .and_then(|root| root.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_else(|| Project::DEFAULT_NAME.to_string())
    }
}

pub fn load_pattern(path: &Path) -> Result<Pattern> {
    let data = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Pattern::from_file_bytes(&data)
        .with_context(|| format!("Failed to decode pattern {}", path.display()))
}

/// Raw bytes of every pattern file present, keyed by pattern number
pub fn read_pattern_files(location: &ProjectLocation) -> Result<BTreeMap<u8, Vec<u8>>> {
    let mut files = BTreeMap::new();
    for number in 1..=Song::MAXIMUM_SLOTS as u8 {
        let path = location.pattern_path(number);
        match fs::read(&path) {
            Ok(data) => {
                debug!("read {}", path.display());
                files.insert(number, data);
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()));
            }
        }
    }
    Ok(files)
}

pub fn load_project(path: &Path) -> Result<Project> {
    let location = ProjectLocation::resolve(path)?;
    let data = fs::read(&location.project_file)
        .with_context(|| format!("Failed to read {}", location.project_file.display()))?;
    let pattern_files = read_pattern_files(&location)?;
    info!(
        "loading {} with {} pattern files",
        location.project_file.display(),
        pattern_files.len()
    );

    let project = Project::from_bytes(&data, &pattern_files)
        .with_context(|| format!("Failed to decode project {}", location.root.display()))?;
    Ok(project.with_name(location.name()))
}
