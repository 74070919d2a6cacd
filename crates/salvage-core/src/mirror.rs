//! Mapping between volume paths and the mirrored output tree
//!
//! Volume paths are `/`-separated strings handed to the probes verbatim. They
//! are never interpreted by the host filesystem until `PathMirror` turns them
//! into output paths, one checked component at a time.

use std::path::PathBuf;

use crate::error::ItemError;

/// Trim trailing separators, keeping a lone `/` intact
pub fn normalize_volume_path(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() && path.starts_with('/') {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Join a child name onto a volume path with exactly one separator
pub fn join_volume_path(parent: &str, name: &str) -> String {
    if parent.ends_with('/') {
        format!("{}{}", parent, name)
    } else {
        format!("{}/{}", parent, name)
    }
}

/// Substitutes the source root prefix of a volume path with the output root
#[derive(Debug, Clone)]
pub struct PathMirror {
    source_root: String,
    output_root: PathBuf,
}

impl PathMirror {
    pub fn new(source_root: &str, output_root: impl Into<PathBuf>) -> Self {
        Self {
            source_root: normalize_volume_path(source_root),
            output_root: output_root.into(),
        }
    }

    pub fn output_root(&self) -> &std::path::Path {
        &self.output_root
    }

    /// Path below the source root, without a leading separator. `None` when
    /// `source` does not lie under the root at a component boundary.
    pub fn relative<'p>(&self, source: &'p str) -> Option<&'p str> {
        let rest = if self.source_root == "/" {
            source.strip_prefix('/')?
        } else {
            let rest = source.strip_prefix(self.source_root.as_str())?;
            if !rest.is_empty() && !rest.starts_with('/') {
                return None;
            }
            rest
        };
        Some(rest.trim_start_matches('/'))
    }

    /// Output location for a volume path (file or directory)
    pub fn output_path(&self, source: &str) -> Result<PathBuf, ItemError> {
        let relative = self
            .relative(source)
            .ok_or_else(|| ItemError::OutsideRoot(source.to_string()))?;

        let mut path = self.output_root.clone();
        for component in relative.split('/').filter(|c| !c.is_empty()) {
            if component == "." || component == ".." {
                return Err(ItemError::UnsafePath(source.to_string()));
            }
            path.push(component);
        }
        Ok(path)
    }
}
