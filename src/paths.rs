use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// A workbook location resolved once per request.
///
/// Deserializes from an already-resolved path string; decode rewrites
/// filepath arguments through [`PathResolver`] before typed params are built.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct WorkbookPath(PathBuf);

impl WorkbookPath {
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    pub fn display(&self) -> std::path::Display<'_> {
        self.0.display()
    }
}

impl AsRef<Path> for WorkbookPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for WorkbookPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
}

impl PathResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Absolute names pass through untouched; anything else lands under the root.
    /// Existence is not checked.
    pub fn resolve(&self, raw: &str) -> WorkbookPath {
        let candidate = Path::new(raw);
        if candidate.is_absolute() {
            WorkbookPath(candidate.to_path_buf())
        } else {
            WorkbookPath(self.root.join(candidate))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_paths_pass_through() {
        let resolver = PathResolver::new("/srv/excel");
        let resolved = resolver.resolve("/abs/path/x.xlsx");
        assert_eq!(resolved.as_path(), Path::new("/abs/path/x.xlsx"));
    }

    #[test]
    fn relative_paths_join_root() {
        let resolver = PathResolver::new("/srv/excel");
        assert_eq!(
            resolver.resolve("x.xlsx").as_path(),
            Path::new("/srv/excel/x.xlsx")
        );
        assert_eq!(
            resolver.resolve("nested/y.xlsx").as_path(),
            Path::new("/srv/excel/nested/y.xlsx")
        );
    }
}
