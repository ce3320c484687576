use crate::listing::DirEntryInfo;
use crate::reader::ContentHandle;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone)]
pub enum Handle {
    Content(Arc<ContentHandle>),
    Dir(Arc<Vec<DirEntryInfo>>),
}

#[derive(Debug, Default)]
pub struct HandleTable {
    next_id: AtomicU64,
    entries: RwLock<HashMap<u64, Handle>>,
}

impl HandleTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_content(&self, content: ContentHandle) -> u64 {
        self.insert(Handle::Content(Arc::new(content)))
    }

    pub fn insert_dir(&self, entries: Vec<DirEntryInfo>) -> u64 {
        self.insert(Handle::Dir(Arc::new(entries)))
    }

    pub fn get_content(&self, id: u64) -> Option<Arc<ContentHandle>> {
        match self.entries.read().get(&id)? {
            Handle::Content(content) => Some(content.clone()),
            Handle::Dir(_) => None,
        }
    }

    pub fn get_dir(&self, id: u64) -> Option<Arc<Vec<DirEntryInfo>>> {
        match self.entries.read().get(&id)? {
            Handle::Dir(entries) => Some(entries.clone()),
            Handle::Content(_) => None,
        }
    }

    pub fn remove(&self, id: u64) -> Option<Handle> {
        self.entries.write().remove(&id)
    }

    fn insert(&self, handle: Handle) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.entries.write().insert(id, handle);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::open_file;
    use crate::store::memory::MemoryStore;

    #[tokio::test]
    async fn handles_are_typed() {
        let store = MemoryStore::new();
        store.put("/a", b"abc", 0);
        let table = HandleTable::new();

        let file = table.insert_content(open_file(&store, "a/.node").await.unwrap());
        let dir = table.insert_dir(Vec::new());
        assert_ne!(file, dir);

        assert!(table.get_content(file).is_some());
        assert!(table.get_dir(file).is_none());
        assert!(table.get_dir(dir).is_some());
        assert!(table.get_content(dir).is_none());

        assert!(table.remove(file).is_some());
        assert!(table.get_content(file).is_none());
        assert!(table.remove(file).is_none());
    }
}
