//! Snapshot load/save of the catalog to its text files.
//!
//! Loading is skip-and-continue: a bad line is recorded in the
//! [`LoadReport`] and the next line is read. A missing file is an empty
//! dataset. Saving rewrites the whole file from the in-memory registry.

use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio::fs;
use tracing::{debug, info, warn};

use super::format::{self, RecordError};
use crate::core::{CatalogEngine, EntityKind, LibraryError};

pub const DEFAULT_USERS_FILE: &str = "usuarios.txt";
pub const DEFAULT_RESOURCES_FILE: &str = "recursos.txt";
pub const DEFAULT_LOANS_FILE: &str = "prestamos.txt";

/// Locations of the three data files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataFiles {
    pub users: PathBuf,
    pub resources: PathBuf,
    pub loans: PathBuf,
}

impl DataFiles {
    /// Default file names inside a directory
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            users: dir.join(DEFAULT_USERS_FILE),
            resources: dir.join(DEFAULT_RESOURCES_FILE),
            loans: dir.join(DEFAULT_LOANS_FILE),
        }
    }
}

/// A line that was not loaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedLine {
    /// 1-based line number
    pub line: usize,
    pub content: String,
    #[serde(serialize_with = "serialize_reason")]
    pub reason: RecordError,
}

fn serialize_reason<S: serde::Serializer>(reason: &RecordError, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&reason.to_string())
}

impl SkippedLine {
    /// The engine-level error for this skip
    pub fn to_error(&self) -> LibraryError {
        LibraryError::MalformedRecord {
            line: self.line,
            reason: self.reason.clone(),
        }
    }
}

/// Outcome of loading one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub path: PathBuf,
    /// The file did not exist; nothing was loaded
    pub missing: bool,
    pub loaded: usize,
    pub skipped: Vec<SkippedLine>,
}

impl LoadReport {
    fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            missing: false,
            loaded: 0,
            skipped: Vec::new(),
        }
    }

    fn skip(&mut self, line: usize, content: &str, reason: RecordError) {
        warn!(
            path = %self.path.display(),
            line,
            %reason,
            "Skipping malformed line"
        );
        self.skipped.push(SkippedLine {
            line,
            content: content.to_string(),
            reason,
        });
    }

    /// Order skips by line and log the totals
    fn finish(mut self, what: &str) -> Self {
        self.skipped.sort_by_key(|s| s.line);
        info!(
            path = %self.path.display(),
            loaded = self.loaded,
            skipped = self.skipped.len(),
            "{} loaded",
            what
        );
        self
    }

    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }

    /// Lines skipped because a number field did not parse
    pub fn invalid_numbers(&self) -> impl Iterator<Item = &SkippedLine> {
        self.skipped.iter().filter(|s| s.reason.is_invalid_number())
    }
}

/// Read the report's file as numbered, non-blank lines.
///
/// Each line is decoded on its own; one that is not UTF-8 is skipped in the
/// report. A missing file marks the report and yields no lines.
async fn read_lines(report: &mut LoadReport) -> Result<Vec<(usize, String)>, LibraryError> {
    let bytes = match fs::read(&report.path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %report.path.display(), "Data file not found, starting empty");
            report.missing = true;
            return Ok(Vec::new());
        }
        Err(e) => return Err(LibraryError::io(&report.path, e)),
    };

    let mut lines = Vec::new();
    for (i, raw) in bytes.split(|&b| b == b'\n').enumerate() {
        let number = i + 1;
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        match std::str::from_utf8(raw) {
            Ok(line) if line.trim().is_empty() => {}
            Ok(line) => lines.push((number, line.to_string())),
            Err(_) => report.skip(
                number,
                &String::from_utf8_lossy(raw),
                RecordError::InvalidEncoding,
            ),
        }
    }

    Ok(lines)
}

async fn write_lines(path: &Path, lines: Vec<String>) -> Result<usize, LibraryError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| LibraryError::io(parent, e))?;
        }
    }

    let count = lines.len();
    let mut content = lines.join("\n");
    if count > 0 {
        content.push('\n');
    }

    fs::write(path, content)
        .await
        .map_err(|e| LibraryError::io(path, e))?;

    Ok(count)
}

impl CatalogEngine {
    /// Load `id,name` lines into the user registry
    pub async fn load_users(&mut self, path: impl AsRef<Path>) -> Result<LoadReport, LibraryError> {
        let mut report = LoadReport::new(path.as_ref());
        let lines = read_lines(&mut report).await?;
        for (number, line) in lines {
            let added = format::parse_user(&line)
                .and_then(|user| self.try_add_user(user).map_err(record_reason));
            match added {
                Ok(()) => report.loaded += 1,
                Err(reason) => report.skip(number, &line, reason),
            }
        }

        Ok(report.finish("Users"))
    }

    /// Write every registered user, replacing the file
    pub async fn save_users(&self, path: impl AsRef<Path>) -> Result<usize, LibraryError> {
        let path = path.as_ref();
        let lines = self.users().iter().map(format::format_user).collect();
        let count = write_lines(path, lines).await?;
        info!(path = %path.display(), count, "Users saved");
        Ok(count)
    }

    /// Load `TYPE,id,title,extra` lines into the resource registry
    pub async fn load_resources(
        &mut self,
        path: impl AsRef<Path>,
    ) -> Result<LoadReport, LibraryError> {
        let mut report = LoadReport::new(path.as_ref());
        let lines = read_lines(&mut report).await?;
        for (number, line) in lines {
            let added = format::parse_resource(&line)
                .and_then(|resource| self.try_add_resource(resource).map_err(record_reason));
            match added {
                Ok(()) => report.loaded += 1,
                Err(reason) => report.skip(number, &line, reason),
            }
        }

        Ok(report.finish("Resources"))
    }

    /// Write every registered resource, replacing the file
    pub async fn save_resources(&self, path: impl AsRef<Path>) -> Result<usize, LibraryError> {
        let path = path.as_ref();
        let lines = self.resources().iter().map(format::format_resource).collect();
        let count = write_lines(path, lines).await?;
        info!(path = %path.display(), count, "Resources saved");
        Ok(count)
    }

    /// Load the loan history. Users and resources must already be loaded;
    /// open loans mark their resource as loaned.
    pub async fn load_history(
        &mut self,
        path: impl AsRef<Path>,
    ) -> Result<LoadReport, LibraryError> {
        let mut report = LoadReport::new(path.as_ref());
        let lines = read_lines(&mut report).await?;
        for (number, line) in lines {
            let loan = match format::parse_loan(&line) {
                Ok(loan) => loan,
                Err(reason) => {
                    report.skip(number, &line, reason);
                    continue;
                }
            };

            match self.restore_loan(loan) {
                Ok(()) => report.loaded += 1,
                Err(err) => report.skip(number, &line, record_reason(err)),
            }
        }

        Ok(report.finish("Loan history"))
    }

    /// Write the full loan history, replacing the file
    pub async fn save_history(&self, path: impl AsRef<Path>) -> Result<usize, LibraryError> {
        let path = path.as_ref();
        let lines = self.history().iter().map(format::format_loan).collect();
        let count = write_lines(path, lines).await?;
        info!(path = %path.display(), count, "Loan history saved");
        Ok(count)
    }

    /// Load users, then resources, then history
    pub async fn load_all(&mut self, files: &DataFiles) -> Result<Vec<LoadReport>, LibraryError> {
        Ok(vec![
            self.load_users(&files.users).await?,
            self.load_resources(&files.resources).await?,
            self.load_history(&files.loans).await?,
        ])
    }

    pub async fn save_all(&self, files: &DataFiles) -> Result<(), LibraryError> {
        self.save_users(&files.users).await?;
        self.save_resources(&files.resources).await?;
        self.save_history(&files.loans).await?;
        Ok(())
    }
}

/// Why the engine refused a parsed record
fn record_reason(err: LibraryError) -> RecordError {
    match err {
        LibraryError::DuplicateId { id, .. } => RecordError::DuplicateId(id),
        LibraryError::LineBreak { field, .. } => RecordError::LineBreak(field),
        LibraryError::NotFound {
            kind: EntityKind::User,
            id,
        } => RecordError::UnknownUser(id),
        LibraryError::NotFound { id, .. } => RecordError::UnknownResource(id),
        LibraryError::NotAvailable { id, .. } => RecordError::StateConflict(id),
        other => RecordError::StateConflict(other.to_string()),
    }
}
