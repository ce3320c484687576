use crate::error::{ProjectionError, ProjectionResult};
use crate::pathmap::{SENTINEL, to_store_path};
use crate::store::StoreClient;
use fuse3::FileType;
use std::ffi::OsString;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntryInfo {
    pub name: OsString,
    pub kind: FileType,
}

impl DirEntryInfo {
    fn directory(name: String) -> Self {
        Self {
            name: OsString::from(name),
            kind: FileType::Directory,
        }
    }

    fn sentinel() -> Self {
        Self {
            name: OsString::from(SENTINEL),
            kind: FileType::RegularFile,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.kind == FileType::RegularFile
    }
}

/// Lists the directory projected from `fs_path`: one directory per child
/// node in store order, then the sentinel file. A child node named like the
/// sentinel is left out, since its name always resolves to the sentinel.
pub async fn list_directory(
    store: &dyn StoreClient,
    fs_path: &str,
) -> ProjectionResult<Vec<DirEntryInfo>> {
    let store_path = to_store_path(fs_path);
    let children = store
        .list(&store_path)
        .await
        .map_err(|source| ProjectionError::NodeUnavailable {
            path: store_path.clone(),
            source,
        })?;

    let mut entries = Vec::with_capacity(children.len() + 1);
    for child in children {
        if child == SENTINEL {
            log::warn!("{store_path} has a child named {SENTINEL}; hidden behind its data file");
            continue;
        }
        entries.push(DirEntryInfo::directory(child));
    }
    entries.push(DirEntryInfo::sentinel());
    Ok(entries)
}
