//! File resolution for file-backed batch items.
//!
//! The host owns its folders; nodes only ask for a path. Names follow the
//! host's annotated convention: `photo.png` lives in the input folder, while
//! `photo.png [output]` or `photo.png [temp]` pick another folder.

use crate::core::error::ResolveError;
use std::path::{Component, Path, PathBuf};

/// Extensions treated as loadable images.
pub const IMAGE_EXTENSIONS: [&str; 8] = ["png", "jpg", "jpeg", "gif", "bmp", "tiff", "tif", "webp"];

/// Maps a file name to a loadable path.
pub trait FileResolver: Send + Sync {
    /// Resolve `name` to a path usable for loading.
    fn resolve(&self, name: &str) -> Result<PathBuf, ResolveError>;
}

/// Which host folder an annotated name refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderKind {
    Input,
    Output,
    Temp,
}

impl FolderKind {
    /// Split a trailing ` [input]`, ` [output]` or ` [temp]` annotation off a name.
    pub fn split_annotation(name: &str) -> (&str, FolderKind) {
        let annotations = [
            (" [input]", FolderKind::Input),
            (" [output]", FolderKind::Output),
            (" [temp]", FolderKind::Temp),
        ];
        for (suffix, kind) in annotations {
            if let Some(stripped) = name.strip_suffix(suffix) {
                return (stripped, kind);
            }
        }
        (name, FolderKind::Input)
    }
}

/// The host's input, output and temp folders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderPaths {
    /// Folder for uploaded inputs.
    pub input: PathBuf,
    /// Folder for saved outputs.
    pub output: PathBuf,
    /// Folder for temporary previews.
    pub temp: PathBuf,
}

impl FolderPaths {
    /// Create folder paths.
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>, temp: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            temp: temp.into(),
        }
    }

    /// Folder for a kind.
    pub fn folder(&self, kind: FolderKind) -> &Path {
        match kind {
            FolderKind::Input => &self.input,
            FolderKind::Output => &self.output,
            FolderKind::Temp => &self.temp,
        }
    }
}

impl Default for FolderPaths {
    fn default() -> Self {
        Self::new("input", "output", "temp")
    }
}

impl FileResolver for FolderPaths {
    fn resolve(&self, name: &str) -> Result<PathBuf, ResolveError> {
        let (relative, kind) = FolderKind::split_annotation(name.trim_end());
        let relative = relative.trim();
        if relative.is_empty() {
            return Err(ResolveError::EmptyName);
        }

        let relative_path = Path::new(relative);
        for component in relative_path.components() {
            match component {
                Component::Normal(_) | Component::CurDir => {}
                Component::ParentDir => return Err(ResolveError::Traversal(name.to_string())),
                Component::RootDir | Component::Prefix(_) => {
                    return Err(ResolveError::NotRelative(name.to_string()))
                }
            }
        }

        let folder = self.folder(kind);
        let joined = folder.join(relative_path);
        // Prefer an absolute path when the folder exists; fall back to the join.
        Ok(std::path::absolute(&joined).unwrap_or(joined))
    }
}

/// Check whether a path has an image extension.
pub fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_annotation() {
        assert_eq!(FolderKind::split_annotation("a.png"), ("a.png", FolderKind::Input));
        assert_eq!(FolderKind::split_annotation("a.png [output]"), ("a.png", FolderKind::Output));
        assert_eq!(FolderKind::split_annotation("a.png [temp]"), ("a.png", FolderKind::Temp));
        assert_eq!(FolderKind::split_annotation("a.png [input]"), ("a.png", FolderKind::Input));
    }

    #[test]
    fn test_resolve_picks_folder() {
        let folders = FolderPaths::new("/data/in", "/data/out", "/data/tmp");
        assert!(folders.resolve("cat.png").unwrap().ends_with("in/cat.png"));
        assert!(folders.resolve("cat.png [output]").unwrap().ends_with("out/cat.png"));
        assert!(folders.resolve("sub/cat.png [temp]").unwrap().ends_with("tmp/sub/cat.png"));
        assert!(folders.resolve("  cat.png [output]  ").unwrap().ends_with("out/cat.png"));
    }

    #[test]
    fn test_resolve_rejects_escapes() {
        let folders = FolderPaths::default();
        assert_eq!(folders.resolve(""), Err(ResolveError::EmptyName));
        assert_eq!(folders.resolve(" [output]"), Err(ResolveError::EmptyName));
        assert_eq!(folders.resolve("   [temp]  "), Err(ResolveError::EmptyName));
        assert!(matches!(folders.resolve("../secret.png"), Err(ResolveError::Traversal(_))));
        assert!(matches!(folders.resolve("a/../../b.png"), Err(ResolveError::Traversal(_))));
        assert!(matches!(folders.resolve("/etc/passwd"), Err(ResolveError::NotRelative(_))));
    }

    #[test]
    fn test_image_extensions() {
        assert!(has_image_extension(Path::new("a.PNG")));
        assert!(has_image_extension(Path::new("dir/b.webp")));
        assert!(!has_image_extension(Path::new("notes.txt")));
        assert!(!has_image_extension(Path::new("no_extension")));
    }
}
