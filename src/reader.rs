use crate::error::{ProjectionError, ProjectionResult};
use crate::pathmap::{is_content_ref, to_store_path};
use crate::store::{StoreClient, StoreStat};
use bytes::Bytes;

/// Snapshot of a node's data taken when the sentinel was opened.
#[derive(Debug, Clone)]
pub struct ContentHandle {
    data: Bytes,
    stat: StoreStat,
}

impl ContentHandle {
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn stat(&self) -> StoreStat {
        // Size must match the bytes served even if the node grew in between.
        StoreStat {
            data_length: self.size(),
            ..self.stat
        }
    }

    pub fn read_at(&self, offset: u64, size: u32) -> Bytes {
        let len = self.data.len();
        let start = usize::try_from(offset).unwrap_or(usize::MAX).min(len);
        let end = start.saturating_add(size as usize).min(len);
        self.data.slice(start..end)
    }
}

/// Opens the sentinel at `fs_path`. The node's data is fetched in full up
/// front; a fetch failure is surfaced to the caller.
pub async fn open_file(store: &dyn StoreClient, fs_path: &str) -> ProjectionResult<ContentHandle> {
    if !is_content_ref(fs_path) {
        return Err(ProjectionError::InvalidPath(fs_path.to_string()));
    }
    let store_path = to_store_path(fs_path);
    let (data, stat) = store
        .get(&store_path)
        .await
        .map_err(|source| ProjectionError::NodeUnavailable {
            path: store_path,
            source,
        })?;
    Ok(ContentHandle { data, stat })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;

    #[tokio::test]
    async fn root_sentinel_serves_root_data() {
        let store = MemoryStore::new();
        let blob: Vec<u8> = (0..42).collect();
        store.put("/", &blob, 5000);

        let handle = open_file(&store, "/.node").await.unwrap();
        assert_eq!(handle.size(), 42);
        assert_eq!(&handle.read_at(0, 4096)[..], &blob[..]);
        assert_eq!(handle.stat().mtime_millis, 5000);
    }

    #[tokio::test]
    async fn reads_are_bounded_by_data() {
        let store = MemoryStore::new();
        store.put("/a", b"0123456789", 0);

        let handle = open_file(&store, "a/.node").await.unwrap();
        assert_eq!(&handle.read_at(3, 4)[..], b"3456");
        assert_eq!(&handle.read_at(8, 100)[..], b"89");
        assert!(handle.read_at(10, 1).is_empty());
        assert!(handle.read_at(u64::MAX, u32::MAX).is_empty());
    }

    #[tokio::test]
    async fn empty_node_opens_as_empty_file() {
        let store = MemoryStore::new();
        store.put("/empty", b"", 0);

        let handle = open_file(&store, "/empty/.node").await.unwrap();
        assert_eq!(handle.size(), 0);
        assert!(handle.read_at(0, 16).is_empty());
    }

    #[tokio::test]
    async fn directories_cannot_be_opened() {
        let store = MemoryStore::new();
        store.put("/a", b"data", 0);

        for path in ["a", "/a", "", "a.node"] {
            let err = open_file(&store, path).await.unwrap_err();
            assert!(matches!(err, ProjectionError::InvalidPath(_)), "{path}");
        }
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn failed_fetch_is_invalid_argument() {
        let store = MemoryStore::new();

        let err = open_file(&store, "x/.node").await.unwrap_err();
        assert!(matches!(err, ProjectionError::NodeUnavailable { ref path, .. } if path == "/x"));
        assert_eq!(err.errno(), libc::EINVAL);
    }
}
