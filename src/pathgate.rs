//! Path-safety gate: rejects unsafe path shapes and confines resolved
//! paths to a named sandbox root, defending against symlink traversal.
//!
//! Grounded in the teacher's `security/sanitize.rs` style: pure functions
//! over `Result<T, Error>`, rejecting on the first violated rule.

use std::path::{Component, Path, PathBuf};

use crate::{Error, Result};

/// The three sandbox roots the gate can be configured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SandboxRoot {
    Project,
    Asset,
    Output,
}

impl SandboxRoot {
    fn name(self) -> &'static str {
        match self {
            SandboxRoot::Project => "project",
            SandboxRoot::Asset => "asset",
            SandboxRoot::Output => "output",
        }
    }
}

/// A configured gate bound to one sandbox root.
#[derive(Debug, Clone)]
pub struct PathSafetyGate {
    root: SandboxRoot,
    base: PathBuf,
}

impl PathSafetyGate {
    pub fn new(root: SandboxRoot, base: impl Into<PathBuf>) -> Self {
        Self { root, base: base.into() }
    }

    /// Validate a caller-supplied relative path against this gate's root.
    /// Rejects empty paths, absolute paths, and any `.`/`..`/empty
    /// component, then canonicalizes against the base and verifies the
    /// canonical result still lives under it.
    ///
    /// # Errors
    /// Returns `Error::PathSafety` on any violated rule.
    pub fn validate(&self, candidate: &str) -> Result<PathBuf> {
        if candidate.is_empty() {
            return Err(self.violation("path is empty"));
        }

        let path = Path::new(candidate);
        if path.is_absolute() {
            return Err(self.violation("absolute paths are not allowed"));
        }

        for component in path.components() {
            match component {
                Component::Normal(_) => {}
                Component::CurDir => return Err(self.violation("'.' components are not allowed")),
                Component::ParentDir => return Err(self.violation("'..' components are not allowed")),
                Component::RootDir | Component::Prefix(_) => {
                    return Err(self.violation("absolute paths are not allowed"));
                }
            }
        }
        if candidate.split('/').any(str::is_empty) {
            return Err(self.violation("empty path components are not allowed"));
        }

        std::fs::create_dir_all(&self.base).map_err(Error::Io)?;
        let canonical_base = std::fs::canonicalize(&self.base).map_err(Error::Io)?;
        let joined = self.base.join(path);

        let canonical = if joined.exists() {
            std::fs::canonicalize(&joined).map_err(Error::Io)?
        } else {
            // The leaf may not exist yet (e.g. an output file about to be
            // written); canonicalize its existing parent instead.
            let parent = joined.parent().unwrap_or(&joined);
            std::fs::create_dir_all(parent).map_err(Error::Io)?;
            let canonical_parent = std::fs::canonicalize(parent).map_err(Error::Io)?;
            canonical_parent.join(joined.file_name().unwrap_or_default())
        };

        if !canonical.starts_with(&canonical_base) {
            return Err(self.violation("resolved path escapes the sandbox root"));
        }

        Ok(canonical)
    }

    fn violation(&self, message: &str) -> Error {
        Error::PathSafety(format!("{} sandbox: {message}", self.root.name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> (tempfile::TempDir, PathSafetyGate) {
        let dir = tempfile::tempdir().unwrap();
        let gate = PathSafetyGate::new(SandboxRoot::Project, dir.path());
        (dir, gate)
    }

    #[test]
    fn rejects_empty_path() {
        let (_dir, gate) = gate();
        assert!(gate.validate("").is_err());
    }

    #[test]
    fn rejects_absolute_path() {
        let (_dir, gate) = gate();
        assert!(gate.validate("/etc/passwd").is_err());
    }

    #[test]
    fn rejects_parent_dir_traversal() {
        let (_dir, gate) = gate();
        assert!(gate.validate("../../etc/passwd").is_err());
    }

    #[test]
    fn rejects_dot_component() {
        let (_dir, gate) = gate();
        assert!(gate.validate("./foo").is_err());
    }

    #[test]
    fn accepts_plain_relative_path() {
        let (_dir, gate) = gate();
        let resolved = gate.validate("terrain/mountain.tor").unwrap();
        assert!(resolved.to_string_lossy().contains("terrain"));
    }

    #[test]
    fn rejects_empty_path_component() {
        let (_dir, gate) = gate();
        assert!(gate.validate("foo//bar").is_err());
    }
}
