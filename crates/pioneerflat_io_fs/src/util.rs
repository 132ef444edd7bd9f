use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use filetime::{FileTime, set_file_times};

////////////////////////////////////////////////////////////////////////////////
// #region PathUtilities

/// Resolve `.` and `..` textually, without touching the filesystem.
///
/// A leading `..` that cannot be popped is kept, `a/b/..` becomes `a`, and an
/// empty result becomes `.`.
pub(crate) fn normalize_lexically(path: &Path) -> PathBuf {
    let mut l_parts: Vec<Component<'_>> = Vec::new();
    for part in path.components() {
        match part {
            Component::CurDir => {}
            Component::ParentDir => match l_parts.last() {
                Some(Component::Normal(_)) => {
                    l_parts.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => l_parts.push(part),
            },
            _ => l_parts.push(part),
        }
    }
    if l_parts.is_empty() {
        return PathBuf::from(".");
    }
    l_parts.iter().collect()
}

/// Last normal segment of `path` after lexical normalization.
pub(crate) fn last_segment(path: &Path) -> Option<OsString> {
    normalize_lexically(path)
        .file_name()
        .map(OsStr::to_os_string)
}

fn _absolutize_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(path)
}

/// Canonicalize the deepest existing ancestor and re-append the rest.
fn _normalize_path(path: &Path) -> PathBuf {
    let path_abs = normalize_lexically(&_absolutize_path(path));
    let mut l_tail: Vec<&OsStr> = Vec::new();
    let mut path_cursor = path_abs.as_path();
    loop {
        if let Ok(resolved) = fs::canonicalize(path_cursor) {
            return l_tail.iter().rev().fold(resolved, |acc, name| acc.join(name));
        }
        match (path_cursor.parent(), path_cursor.file_name()) {
            (Some(parent), Some(name)) => {
                l_tail.push(name);
                path_cursor = parent;
            }
            _ => return path_abs.clone(),
        }
    }
}

/// `true` when `path_dir_dst` is `path_dir_src` or lies below it.
pub(crate) fn is_destination_inside_source(path_dir_src: &Path, path_dir_dst: &Path) -> bool {
    _normalize_path(path_dir_dst).starts_with(_normalize_path(path_dir_src))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CollisionNaming

/// Split a basename into stem and extension, the extension keeping its dot.
///
/// Leading dots belong to the stem, so `.hidden` has no extension.
pub(crate) fn split_name_extension(name: &OsStr) -> (OsString, OsString) {
    let Some(c_name) = name.to_str() else {
        let path_name = Path::new(name);
        let stem = path_name.file_stem().unwrap_or(name).to_os_string();
        let mut ext = OsString::new();
        if let Some(raw_ext) = path_name.extension() {
            ext.push(".");
            ext.push(raw_ext);
        }
        return (stem, ext);
    };

    let n_leading_dots = c_name.len() - c_name.trim_start_matches('.').len();
    match c_name[n_leading_dots..].rfind('.') {
        Some(n_idx) => {
            let (stem, ext) = c_name.split_at(n_leading_dots + n_idx);
            (OsString::from(stem), OsString::from(ext))
        }
        None => (OsString::from(c_name), OsString::new()),
    }
}

fn _is_occupied(path: &Path) -> io::Result<bool> {
    match fs::symlink_metadata(path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// First free destination for `name` directly under `path_dir_dst`.
///
/// Tries `name`, then `stem_2.ext`, `stem_3.ext`, … Any existing entry,
/// dangling symlinks included, counts as taken. The returned flag is `true`
/// when a suffix had to be added.
pub(crate) fn derive_flat_destination(
    path_dir_dst: &Path,
    name: &OsStr,
) -> io::Result<(PathBuf, bool)> {
    let path_file_dst = path_dir_dst.join(name);
    if !_is_occupied(&path_file_dst)? {
        return Ok((path_file_dst, false));
    }

    let (stem, ext) = split_name_extension(name);
    let mut n_counter: u64 = 2;
    loop {
        let mut name_candidate = stem.clone();
        name_candidate.push(format!("_{n_counter}"));
        name_candidate.push(&ext);
        let path_candidate = path_dir_dst.join(&name_candidate);
        log::trace!("Probing collision name {}", path_candidate.display());
        if !_is_occupied(&path_candidate)? {
            return Ok((path_candidate, true));
        }
        n_counter += 1;
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CopyAndSpace

/// Bytes available to unprivileged writers on the filesystem holding `path`.
pub(crate) fn available_bytes(path: &Path) -> io::Result<u64> {
    fs2::available_space(path)
}

pub(crate) fn copy_file_with_metadata(
    path_file_src: &Path,
    path_file_dst: &Path,
) -> Result<(), io::Error> {
    fs::copy(path_file_src, path_file_dst)?;
    apply_metadata(path_file_src, path_file_dst)
}

fn apply_metadata(path_file_src: &Path, path_file_dst: &Path) -> Result<(), io::Error> {
    let stat_src = fs::metadata(path_file_src)?;

    let file_time_access = FileTime::from_last_access_time(&stat_src);
    let file_time_modify = FileTime::from_last_modification_time(&stat_src);
    set_file_times(path_file_dst, file_time_access, file_time_modify)?;

    #[cfg(target_os = "linux")]
    copy_xattrs_linux(path_file_src, path_file_dst);

    fs::set_permissions(path_file_dst, stat_src.permissions())
}

#[cfg(target_os = "linux")]
fn copy_xattrs_linux(path_file_src: &Path, path_file_dst: &Path) {
    let iter_xattr_names = match xattr::list(path_file_src) {
        Ok(v) => v,
        Err(_) => return,
    };

    for name in iter_xattr_names {
        let Some(raw_value) = xattr::get(path_file_src, &name).ok().flatten() else {
            continue;
        };
        if let Err(e) = xattr::set(path_file_dst, &name, &raw_value) {
            log::debug!(
                "Skipped xattr {} on {} ({e})",
                name.to_string_lossy(),
                path_file_dst.display()
            );
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
