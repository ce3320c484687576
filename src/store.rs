use crate::error::StoreError;
use async_trait::async_trait;
use bytes::Bytes;

/// Point-in-time metadata of a store node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStat {
    pub data_length: u64,
    pub mtime_millis: i64,
}

/// Read access to the coordination store. Implementations must tolerate
/// concurrent callers.
#[async_trait]
pub trait StoreClient: Send + Sync {
    async fn get(&self, path: &str) -> Result<(Bytes, StoreStat), StoreError>;

    async fn list(&self, path: &str) -> Result<Vec<String>, StoreError>;
}

#[cfg(test)]
pub(crate) mod memory {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone)]
    struct MemoryNode {
        data: Bytes,
        mtime_millis: i64,
        children: Vec<String>,
    }

    /// In-memory tree for exercising the projection without a server.
    #[derive(Debug, Default)]
    pub struct MemoryStore {
        nodes: Mutex<HashMap<String, MemoryNode>>,
        calls: AtomicUsize,
    }

    impl MemoryStore {
        pub fn new() -> Self {
            let store = Self::default();
            store.put("/", b"", 0);
            store
        }

        /// Inserts or replaces a node and links it into its parent.
        pub fn put(&self, path: &str, data: &[u8], mtime_millis: i64) {
            let mut nodes = self.nodes.lock();
            let children = nodes
                .get(path)
                .map(|node| node.children.clone())
                .unwrap_or_default();
            nodes.insert(
                path.to_string(),
                MemoryNode {
                    data: Bytes::copy_from_slice(data),
                    mtime_millis,
                    children,
                },
            );
            if path == "/" {
                return;
            }
            let (parent, name) = match path.rsplit_once('/') {
                Some(("", name)) => ("/", name),
                Some((parent, name)) => (parent, name),
                None => return,
            };
            if let Some(parent) = nodes.get_mut(parent)
                && !parent.children.iter().any(|c| c == name)
            {
                parent.children.push(name.to_string());
            }
        }

        /// Drops a node and unlinks it from its parent.
        pub fn remove(&self, path: &str) {
            let mut nodes = self.nodes.lock();
            nodes.remove(path);
            if let Some((parent, name)) = path.rsplit_once('/') {
                let parent = if parent.is_empty() { "/" } else { parent };
                if let Some(parent) = nodes.get_mut(parent) {
                    parent.children.retain(|c| c != name);
                }
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl StoreClient for MemoryStore {
        async fn get(&self, path: &str) -> Result<(Bytes, StoreStat), StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let nodes = self.nodes.lock();
            let node = nodes
                .get(path)
                .ok_or_else(|| StoreError::NoNode(path.to_string()))?;
            let stat = StoreStat {
                data_length: node.data.len() as u64,
                mtime_millis: node.mtime_millis,
            };
            Ok((node.data.clone(), stat))
        }

        async fn list(&self, path: &str) -> Result<Vec<String>, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let nodes = self.nodes.lock();
            nodes
                .get(path)
                .map(|node| node.children.clone())
                .ok_or_else(|| StoreError::NoNode(path.to_string()))
        }
    }

    #[tokio::test]
    async fn put_links_children_in_insertion_order() {
        let store = MemoryStore::new();
        store.put("/a", b"", 0);
        store.put("/a/b", b"x", 0);
        store.put("/a/c", b"y", 0);
        store.put("/a/b", b"z", 0);

        assert_eq!(store.list("/").await.unwrap(), vec!["a".to_string()]);
        assert_eq!(
            store.list("/a").await.unwrap(),
            vec!["b".to_string(), "c".to_string()]
        );
        let (data, stat) = store.get("/a/b").await.unwrap();
        assert_eq!(&data[..], b"z");
        assert_eq!(stat.data_length, 1);
    }
}
