use crate::error::{ProjectionError, ProjectionResult};
use std::ffi::{OsStr, OsString};

/// Name of the synthetic file that exposes a node's own data.
pub const SENTINEL: &str = ".node";

const SENTINEL_SUFFIX: &str = "/.node";

/// What a filesystem path refers to, with the store path it maps onto.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathKind {
    Directory(String),
    Content(String),
}

/// True when `fs_path` names a sentinel file rather than a directory.
pub fn is_content_ref(fs_path: &str) -> bool {
    fs_path == SENTINEL || fs_path.ends_with(SENTINEL_SUFFIX)
}

fn rooted(rest: &str) -> String {
    let mut composed = String::with_capacity(rest.len() + 1);
    composed.push('/');
    composed.push_str(rest.trim_start_matches('/'));
    composed
}

/// Maps a filesystem path (relative to the mount, with or without a leading
/// slash) onto the absolute store path it projects.
pub fn to_store_path(fs_path: &str) -> String {
    if fs_path == SENTINEL {
        return "/".to_string();
    }
    if let Some(rest) = fs_path.strip_suffix(SENTINEL_SUFFIX) {
        return rooted(rest);
    }
    rooted(fs_path)
}

/// Filesystem path of the sentinel holding `store_path`'s data. The root maps
/// to the bare sentinel name.
pub fn sentinel_path(store_path: &str) -> String {
    if store_path == "/" {
        return SENTINEL.to_string();
    }
    let mut composed = String::with_capacity(store_path.len() + SENTINEL_SUFFIX.len());
    composed.push_str(store_path);
    composed.push_str(SENTINEL_SUFFIX);
    composed
}

pub fn classify(fs_path: &str) -> PathKind {
    if is_content_ref(fs_path) {
        PathKind::Content(to_store_path(fs_path))
    } else {
        PathKind::Directory(to_store_path(fs_path))
    }
}

/// Store paths are UTF-8, so paths that are not cannot name a node.
pub fn fs_path_str(path: &OsStr) -> ProjectionResult<&str> {
    path.to_str()
        .ok_or_else(|| ProjectionError::InvalidPath(path.to_string_lossy().into_owned()))
}

pub fn make_child_path(parent: &OsStr, name: &OsStr) -> OsString {
    if parent == OsStr::new("/") {
        let mut composed = OsString::from("/");
        composed.push(name);
        composed
    } else {
        let mut composed = OsString::from(parent);
        composed.push(OsStr::new("/"));
        composed.push(name);
        composed
    }
}
