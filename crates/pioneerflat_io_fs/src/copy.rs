//! Source validation, tree scan, space check and flattening copy.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::report::{ReportFlatten, ReportFlattenBuilder};
use crate::spec::{FlattenError, LOG_TARGET_PROGRESS, SpecFileEntry, SpecFlattenOptions};
use crate::util::{
    available_bytes, copy_file_with_metadata, derive_flat_destination,
    is_destination_inside_source, last_segment,
};

/// Flatten every regular file under `dir_source` into `dir_destination`.
///
/// Runs, in order:
/// 1. Source validation (existence, last segment, directory, overlap).
/// 2. Destination creation.
/// 3. Tree scan and free-space check.
/// 4. Sequential copy with collision renaming.
///
/// Steps 1-3 never write a file. The first error aborts the run; files copied
/// before it stay in place.
pub fn flatten_contents<P, Q>(
    dir_source: P,
    dir_destination: Q,
    spec_options: &SpecFlattenOptions,
) -> Result<ReportFlatten, FlattenError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let path_dir_src = dir_source.as_ref();
    let path_dir_dst = dir_destination.as_ref();

    validate_source(path_dir_src, spec_options)?;
    if is_destination_inside_source(path_dir_src, path_dir_dst) {
        return Err(FlattenError::SourceDestinationOverlap {
            path_dir_src: path_dir_src.to_path_buf(),
            path_dir_dst: path_dir_dst.to_path_buf(),
        });
    }
    let if_created_destination = init_destination(path_dir_dst)?;

    let mut builder_report = ReportFlattenBuilder {
        if_created_destination,
        ..ReportFlattenBuilder::default()
    };
    let l_files = scan_tree(path_dir_src, &mut builder_report)?;
    if spec_options.if_check_space {
        let n_bytes_free =
            check_free_space(path_dir_src, path_dir_dst, builder_report.n_bytes_required)?;
        builder_report.n_bytes_free = Some(n_bytes_free);
    }

    flatten_files(&l_files, path_dir_dst, &mut builder_report)?;
    let report = builder_report.build();
    log::debug!("{report}");
    Ok(report)
}

/// Check that `path_dir_src` exists, ends in the required name and is a directory.
pub fn validate_source(
    path_dir_src: &Path,
    spec_options: &SpecFlattenOptions,
) -> Result<(), FlattenError> {
    if !path_dir_src.exists() {
        return Err(FlattenError::NotFound(path_dir_src.to_path_buf()));
    }

    let b_is_name_matching = last_segment(path_dir_src)
        .is_some_and(|name| name == spec_options.name_dir_root.as_str());
    if !b_is_name_matching {
        return Err(FlattenError::InvalidArgument {
            path: path_dir_src.to_path_buf(),
            name_expected: spec_options.name_dir_root.clone(),
        });
    }

    if !path_dir_src.is_dir() {
        return Err(FlattenError::SourceNotDirectory(path_dir_src.to_path_buf()));
    }
    Ok(())
}

/// Create `path_dir_dst` with its parents if missing.
///
/// Returns `true` when the directory was created by this call.
pub fn init_destination(path_dir_dst: &Path) -> Result<bool, FlattenError> {
    if path_dir_dst.exists() {
        if !path_dir_dst.is_dir() {
            return Err(FlattenError::DestinationInitFailed {
                path: path_dir_dst.to_path_buf(),
                source: io::Error::new(
                    io::ErrorKind::NotADirectory,
                    "path exists and is not a directory",
                ),
            });
        }
        return Ok(false);
    }

    fs::create_dir_all(path_dir_dst).map_err(|e| FlattenError::DestinationInitFailed {
        path: path_dir_dst.to_path_buf(),
        source: e,
    })?;
    log::info!(
        target: LOG_TARGET_PROGRESS,
        "Output folder '{}' created.",
        path_dir_dst.display()
    );
    Ok(true)
}

/// Collect every regular file under `path_dir_src`, files before
/// subdirectories, each sorted by name.
///
/// Symlinks are counted as skipped and never followed. Unreadable directories
/// become warnings; a file whose size cannot be read is an error.
pub fn scan_tree(
    path_dir_src: &Path,
    builder_report: &mut ReportFlattenBuilder,
) -> Result<Vec<SpecFileEntry>, FlattenError> {
    let mut l_files = Vec::new();
    walk_directory(path_dir_src, builder_report, &mut l_files)?;
    log::debug!(
        "Scanned {}: files={} bytes={} skipped={}",
        path_dir_src.display(),
        builder_report.cnt_scanned,
        builder_report.n_bytes_required,
        builder_report.cnt_skipped
    );
    Ok(l_files)
}

/// Compare `n_bytes_required` against free space at `path_dir_dst`.
///
/// Returns the measured free bytes.
pub fn check_free_space(
    path_dir_src: &Path,
    path_dir_dst: &Path,
    n_bytes_required: u64,
) -> Result<u64, FlattenError> {
    let n_bytes_free = available_bytes(path_dir_dst)
        .map_err(|e| FlattenError::io("Failed to query free space of", path_dir_dst, e))?;
    log::debug!(
        "Free space at {}: {n_bytes_free} bytes, required {n_bytes_required} bytes",
        path_dir_dst.display()
    );
    ensure_space(path_dir_src, path_dir_dst, n_bytes_required, n_bytes_free)?;
    Ok(n_bytes_free)
}

fn ensure_space(
    path_dir_src: &Path,
    path_dir_dst: &Path,
    n_bytes_required: u64,
    n_bytes_free: u64,
) -> Result<(), FlattenError> {
    if n_bytes_required > n_bytes_free {
        return Err(FlattenError::InsufficientSpace {
            path_dir_src: path_dir_src.to_path_buf(),
            path_dir_dst: path_dir_dst.to_path_buf(),
            n_bytes_required,
            n_bytes_free,
        });
    }
    Ok(())
}

/// Copy `l_files` directly under `path_dir_dst`, renaming on collision.
pub fn flatten_files(
    l_files: &[SpecFileEntry],
    path_dir_dst: &Path,
    builder_report: &mut ReportFlattenBuilder,
) -> Result<(), FlattenError> {
    for spec_file_entry in l_files {
        let path_file_src = &spec_file_entry.path_file_src;
        let (path_file_dst, b_renamed) =
            derive_flat_destination(path_dir_dst, &spec_file_entry.name_file)
            .map_err(|e| FlattenError::io("Failed to inspect destination for", path_file_src, e))?;
        copy_file_with_metadata(path_file_src, &path_file_dst)
            .map_err(|e| FlattenError::io("Failed to copy", path_file_src, e))?;

        log::info!(
            target: LOG_TARGET_PROGRESS,
            "Copied {} to {}",
            path_file_src.display(),
            path_file_dst.display()
        );
        builder_report.add_copied(path_file_src.clone(), path_file_dst, b_renamed);
    }
    Ok(())
}

fn walk_directory(
    path_root: &Path,
    builder_report: &mut ReportFlattenBuilder,
    l_files: &mut Vec<SpecFileEntry>,
) -> Result<(), FlattenError> {
    let iter_entries = match fs::read_dir(path_root) {
        Ok(iter) => iter,
        Err(e) => {
            builder_report.add_warning(format!(
                "Failed to read directory {} ({e})",
                path_root.display()
            ));
            return Ok(());
        }
    };

    let mut l_dirs: Vec<PathBuf> = Vec::new();
    let mut l_files_here: Vec<SpecFileEntry> = Vec::new();

    for _entry_res in iter_entries {
        let entry = match _entry_res {
            Ok(v) => v,
            Err(e) => {
                builder_report.add_warning(format!(
                    "Failed to read directory entry under {} ({e})",
                    path_root.display()
                ));
                continue;
            }
        };

        let path_entry = entry.path();
        let cfg_file_type = entry
            .file_type()
            .map_err(|e| FlattenError::io("Failed to inspect", &path_entry, e))?;

        if cfg_file_type.is_symlink() {
            log::debug!("Symlink skipped: {}", path_entry.display());
            builder_report.add_skipped();
        } else if cfg_file_type.is_dir() {
            l_dirs.push(path_entry);
        } else if cfg_file_type.is_file() {
            let meta_file_src = fs::symlink_metadata(&path_entry)
                .map_err(|e| FlattenError::io("Failed to stat", &path_entry, e))?;
            l_files_here.push(SpecFileEntry {
                name_file: entry.file_name(),
                path_file_src: path_entry,
                n_bytes: meta_file_src.len(),
            });
        } else {
            builder_report.add_warning(format!("Special file skipped: {}", path_entry.display()));
            builder_report.add_skipped();
        }
    }

    l_files_here.sort_by(|a, b| a.path_file_src.cmp(&b.path_file_src));
    l_dirs.sort();

    for spec_file_entry in l_files_here {
        builder_report.add_scanned(spec_file_entry.n_bytes);
        l_files.push(spec_file_entry);
    }
    for path_dir_sub in l_dirs {
        walk_directory(&path_dir_sub, builder_report, l_files)?;
    }
    Ok(())
}
