use crate::error::{ErrorKind, Result};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::fs::File;
use std::path::{Path, PathBuf};
use tempfile::{Builder, TempPath};
use uuid::Uuid;

/// Names the intermediate `.html` and `.pdf` files of a single conversion.
///
/// Backed by a v4 UUID so concurrent conversions sharing an output directory
/// never pick the same file names.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct ArtifactName(String);
impl ArtifactName {
    pub(crate) fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }

    /// `<dir>/<name>.pdf`
    pub(crate) fn pdf_in(&self, dir: impl AsRef<Path>) -> PathBuf {
        dir.as_ref().join(format!("{}.pdf", self.0))
    }
}
impl Display for ArtifactName {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

/// Files created on behalf of one conversion, removed when dropped.
///
/// Only paths the converter itself created are tracked: a caller's HTML file
/// is never registered here. With `keep` set every path is released from
/// `tempfile`'s cleanup as soon as it is tracked, so even a cancelled
/// conversion leaves its files behind.
///
/// Removal happens in `TempPath`'s destructor, a blocking unlink of at most two
/// small files, including when an async conversion is dropped.
pub(crate) struct Artifacts {
    paths: Vec<TempPath>,
    keep: bool,
}
impl Artifacts {
    pub(crate) fn new(keep: bool) -> Self {
        Self { paths: Vec::with_capacity(2), keep }
    }

    /// Exclusively creates `<dir>/<name>.html`, failing if it already exists.
    pub(crate) fn create_html(&mut self, dir: &Path, name: &ArtifactName) -> Result<(File, PathBuf)> {
        let (file, path) = Builder::new()
            .prefix(name.as_str())
            .suffix(".html")
            .rand_bytes(0)
            .tempfile_in(dir)
            .map_err(ErrorKind::Io)?
            .into_parts();
        Ok((file, self.track(path)?))
    }

    /// Registers `<dir>/<name>.pdf`, which Chrome may or may not create.
    pub(crate) fn expect_pdf(&mut self, dir: &Path, name: &ArtifactName) -> Result<PathBuf> {
        self.track(TempPath::from_path(name.pdf_in(dir)))
    }

    fn track(&mut self, path: TempPath) -> Result<PathBuf> {
        if self.keep {
            let kept = path.keep().map_err(|e| ErrorKind::Io(e.error))?;
            tracing::trace!(path = %kept.display(), "Keeping conversion artifact");
            return Ok(kept);
        }
        let owned = path.to_path_buf();
        self.paths.push(path);
        Ok(owned)
    }
}
