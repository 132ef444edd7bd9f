//! Flatten options, file records and top-level error types.

use std::ffi::OsString;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Directory name a Pioneer export stores its media under.
pub const NAME_DIR_CONTENTS: &str = "Contents";

/// Log target of the user-facing progress lines (destination created, file copied).
pub const LOG_TARGET_PROGRESS: &str = "pioneerflat::progress";

////////////////////////////////////////////////////////////////////////////////
// #region StructsAndErrors

/// Input options for `flatten_contents`.
#[derive(Debug, Clone)]
pub struct SpecFlattenOptions {
    /// Required last path segment of the source directory.
    pub name_dir_root: String,
    /// Compare required bytes against destination free space before copying.
    pub if_check_space: bool,
}

impl Default for SpecFlattenOptions {
    fn default() -> Self {
        Self {
            name_dir_root: NAME_DIR_CONTENTS.to_string(),
            if_check_space: true,
        }
    }
}

/// One regular file discovered under the source tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecFileEntry {
    /// Full source path.
    pub path_file_src: PathBuf,
    /// Basename the flattened copy is named after.
    pub name_file: OsString,
    /// Size reported by `lstat`, in bytes.
    pub n_bytes: u64,
}

/// One committed copy, source to flattened destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecCopiedFile {
    pub path_file_src: PathBuf,
    pub path_file_dst: PathBuf,
}

/// Fatal errors. Any of these aborts the run at the point it occurs.
#[derive(Debug, Error)]
pub enum FlattenError {
    /// Source path does not exist.
    #[error("Pioneer folder {} does not exist", .0.display())]
    NotFound(PathBuf),

    /// Source path does not end in the required directory name.
    #[error("The last folder in the path '{}' is not '{name_expected}'.", .path.display())]
    InvalidArgument {
        path: PathBuf,
        name_expected: String,
    },

    /// Source exists but cannot be walked as a directory.
    #[error("Pioneer path is not a directory: {}", .0.display())]
    SourceNotDirectory(PathBuf),

    /// Destination is nested inside the source tree.
    ///
    /// Stricter than the plain flattening tool, which accepts such a pair.
    #[error(
        "Output folder {} is inside pioneer folder {}",
        .path_dir_dst.display(),
        .path_dir_src.display()
    )]
    SourceDestinationOverlap {
        path_dir_src: PathBuf,
        path_dir_dst: PathBuf,
    },

    /// Destination directory creation failed.
    #[error("Failed to initialize output folder {}: {source}", .path.display())]
    DestinationInitFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Precomputed source size exceeds destination free space.
    #[error(
        "Not enough space in output folder '{}' to copy files from '{}'.\nRequired size: {n_bytes_required} bytes, free space: {n_bytes_free} bytes.",
        .path_dir_dst.display(),
        .path_dir_src.display()
    )]
    InsufficientSpace {
        path_dir_src: PathBuf,
        path_dir_dst: PathBuf,
        n_bytes_required: u64,
        n_bytes_free: u64,
    },

    /// Unhandled filesystem failure during scan or copy.
    #[error("{operation} {}: {source}", .path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FlattenError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
