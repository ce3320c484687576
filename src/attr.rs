use crate::error::{ProjectionError, ProjectionResult};
use crate::pathmap::{PathKind, classify};
use crate::store::StoreClient;
use crate::util::AttrTemplate;
use fuse3::path::reply::FileAttr;

/// How to answer a stat of a sentinel whose node cannot be fetched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingNodePolicy {
    /// Report an empty regular file and succeed.
    #[default]
    Lenient,
    /// Report the sentinel as missing.
    Strict,
}

/// Builds attributes for `fs_path`.
///
/// Only sentinel paths touch the store. Everything else is reported as a
/// directory without checking that the node exists; a missing node is
/// detected when the directory is listed.
pub async fn attributes_for(
    store: &dyn StoreClient,
    template: &AttrTemplate,
    policy: MissingNodePolicy,
    fs_path: &str,
) -> ProjectionResult<FileAttr> {
    match classify(fs_path) {
        PathKind::Content(store_path) => match store.get(&store_path).await {
            Ok((_, stat)) => Ok(template.content(&stat)),
            Err(err) => match policy {
                MissingNodePolicy::Lenient => {
                    log::warn!("stat of {fs_path}: {err}; reporting empty file");
                    Ok(template.empty_content())
                }
                MissingNodePolicy::Strict => Err(ProjectionError::NotFound(store_path)),
            },
        },
        PathKind::Directory(store_path) => Ok(template.directory(store_path == "/")),
    }
}
