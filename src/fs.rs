use crate::attr::{MissingNodePolicy, attributes_for};
use crate::error::ProjectionError;
use crate::handle_table::HandleTable;
use crate::listing::{DirEntryInfo, list_directory};
use crate::pathmap::{SENTINEL, fs_path_str, make_child_path, sentinel_path, to_store_path};
use crate::reader::open_file;
use crate::store::StoreClient;
use crate::util::AttrTemplate;
use fuse3::FileType;
use fuse3::path::prelude::*;
use fuse3::path::reply::DirectoryEntryPlus;
use std::ffi::{OsStr, OsString};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

const MAX_WRITE: NonZeroU32 = NonZeroU32::new(128 * 1024).unwrap();

/// Open flags that would modify the file.
fn wants_write(flags: u32) -> bool {
    let flags = flags as i32;
    let accmode = flags & libc::O_ACCMODE;
    accmode != libc::O_RDONLY
        || flags & (libc::O_TRUNC | libc::O_APPEND | libc::O_CREAT) != 0
}

/// Read-only projection of a store tree, served through the path-based
/// FUSE API.
pub struct ZkFs {
    store: Arc<dyn StoreClient>,
    handles: HandleTable,
    template: AttrTemplate,
    attr_ttl: Duration,
    missing_node: MissingNodePolicy,
}

impl ZkFs {
    pub fn new(
        store: Arc<dyn StoreClient>,
        attr_ttl: Duration,
        missing_node: MissingNodePolicy,
    ) -> Self {
        Self::with_template(store, AttrTemplate::current_process(), attr_ttl, missing_node)
    }

    pub fn with_template(
        store: Arc<dyn StoreClient>,
        template: AttrTemplate,
        attr_ttl: Duration,
        missing_node: MissingNodePolicy,
    ) -> Self {
        Self {
            store,
            handles: HandleTable::new(),
            template,
            attr_ttl,
            missing_node,
        }
    }

    async fn stat_path(&self, path: &OsStr) -> Result<FileAttr, fuse3::Errno> {
        let path = fs_path_str(path)?;
        let attr = attributes_for(
            self.store.as_ref(),
            &self.template,
            self.missing_node,
            path,
        )
        .await?;
        Ok(attr)
    }

    async fn load_dir_entries(&self, path: &OsStr) -> Result<Vec<DirEntryInfo>, fuse3::Errno> {
        let path = fs_path_str(path)?;
        let entries = list_directory(self.store.as_ref(), path).await?;
        Ok(entries)
    }

    /// Attributes for a listed entry. A sentinel whose stat fails right after
    /// its directory was listed is reported as an empty file.
    async fn entry_attr(&self, parent: &OsStr, entry: &DirEntryInfo) -> FileAttr {
        if !entry.is_sentinel() {
            return self.template.directory(false);
        }
        let attr = match fs_path_str(parent) {
            Ok(parent) => {
                let sentinel = sentinel_path(&to_store_path(parent));
                self.stat_path(OsStr::new(&sentinel)).await
            }
            Err(err) => Err(err.into()),
        };
        attr.unwrap_or_else(|_| {
            log::warn!(
                "stat of {} under {} failed; listing it as empty",
                SENTINEL,
                parent.to_string_lossy()
            );
            self.template.empty_content()
        })
    }
}

impl PathFilesystem for ZkFs {
    async fn init(&self, _req: Request) -> Result<ReplyInit, fuse3::Errno> {
        Ok(ReplyInit {
            max_write: MAX_WRITE,
        })
    }

    async fn destroy(&self, _req: Request) {}

    async fn lookup(
        &self,
        _req: Request,
        parent: &OsStr,
        name: &OsStr,
    ) -> Result<ReplyEntry, fuse3::Errno> {
        let path = make_child_path(parent, name);
        let attr = self.stat_path(&path).await?;
        Ok(ReplyEntry {
            ttl: self.attr_ttl,
            attr,
        })
    }

    async fn getattr(
        &self,
        _req: Request,
        path: Option<&OsStr>,
        fh: Option<u64>,
        _flags: u32,
    ) -> Result<ReplyAttr, fuse3::Errno> {
        if let Some(content) = fh.and_then(|id| self.handles.get_content(id)) {
            return Ok(ReplyAttr {
                ttl: self.attr_ttl,
                attr: self.template.content(&content.stat()),
            });
        }

        let path = path.ok_or_else(fuse3::Errno::new_not_exist)?;
        log::debug!("getattr {}", path.to_string_lossy());
        let attr = self.stat_path(path).await?;
        Ok(ReplyAttr {
            ttl: self.attr_ttl,
            attr,
        })
    }

    async fn open(
        &self,
        _req: Request,
        path: &OsStr,
        flags: u32,
    ) -> Result<ReplyOpen, fuse3::Errno> {
        log::debug!("open {} flags={flags:#o}", path.to_string_lossy());
        let fs_path = fs_path_str(path)?;
        if wants_write(flags) {
            return Err(ProjectionError::ReadOnly(fs_path.to_string()).into());
        }
        let content = open_file(self.store.as_ref(), fs_path).await?;
        let handle = self.handles.insert_content(content);
        Ok(ReplyOpen {
            fh: handle,
            flags: 0,
        })
    }

    async fn read(
        &self,
        _req: Request,
        _path: Option<&OsStr>,
        fh: u64,
        offset: u64,
        size: u32,
    ) -> Result<ReplyData, fuse3::Errno> {
        let content = self
            .handles
            .get_content(fh)
            .ok_or_else(|| fuse3::Errno::from(libc::EBADF))?;
        Ok(content.read_at(offset, size).into())
    }

    async fn release(
        &self,
        _req: Request,
        _path: Option<&OsStr>,
        fh: u64,
        _flags: u32,
        _lock_owner: u64,
        _flush: bool,
    ) -> Result<(), fuse3::Errno> {
        self.handles.remove(fh);
        Ok(())
    }

    async fn opendir(
        &self,
        _req: Request,
        path: &OsStr,
        flags: u32,
    ) -> Result<ReplyOpen, fuse3::Errno> {
        log::debug!("opendir {}", path.to_string_lossy());
        let entries = self.load_dir_entries(path).await?;
        let handle = self.handles.insert_dir(entries);
        Ok(ReplyOpen { fh: handle, flags })
    }

    type DirEntryStream<'a>
        = futures_util::stream::Iter<std::vec::IntoIter<fuse3::Result<DirectoryEntry>>>
    where
        Self: 'a;
    type DirEntryPlusStream<'a>
        = futures_util::stream::Iter<std::vec::IntoIter<fuse3::Result<DirectoryEntryPlus>>>
    where
        Self: 'a;

    async fn readdir<'a>(
        &'a self,
        _req: Request,
        _path: &'a OsStr,
        fh: u64,
        offset: i64,
    ) -> Result<ReplyDirectory<Self::DirEntryStream<'a>>, fuse3::Errno> {
        let logical = self
            .handles
            .get_dir(fh)
            .ok_or_else(|| fuse3::Errno::from(libc::EBADF))?;
        let mut entries: Vec<fuse3::Result<DirectoryEntry>> = Vec::with_capacity(logical.len() + 2);

        let mut idx: i64 = 0;
        for name in [".", ".."] {
            idx += 1;
            entries.push(Ok(DirectoryEntry {
                kind: FileType::Directory,
                name: OsString::from(name),
                offset: idx,
            }));
        }

        for entry in logical.iter() {
            idx += 1;
            entries.push(Ok(DirectoryEntry {
                kind: entry.kind,
                name: entry.name.clone(),
                offset: idx,
            }));
        }

        let skip = offset.max(0) as usize;
        let entries: Vec<_> = entries.into_iter().skip(skip).collect();
        let stream = futures_util::stream::iter(entries);
        Ok(ReplyDirectory { entries: stream })
    }

    async fn readdirplus<'a>(
        &'a self,
        _req: Request,
        parent: &'a OsStr,
        fh: u64,
        offset: u64,
        _lock_owner: u64,
    ) -> Result<ReplyDirectoryPlus<Self::DirEntryPlusStream<'a>>, fuse3::Errno> {
        let logical = self
            .handles
            .get_dir(fh)
            .ok_or_else(|| fuse3::Errno::from(libc::EBADF))?;
        let mut entries: Vec<fuse3::Result<DirectoryEntryPlus>> =
            Vec::with_capacity(logical.len() + 2);
        let dir_attr = self.template.directory(parent == OsStr::new("/"));

        let mut idx: i64 = 0;
        for name in [".", ".."] {
            idx += 1;
            if (idx as u64) <= offset {
                continue;
            }
            entries.push(Ok(DirectoryEntryPlus {
                kind: FileType::Directory,
                name: OsString::from(name),
                offset: idx,
                attr: dir_attr,
                entry_ttl: self.attr_ttl,
                attr_ttl: self.attr_ttl,
            }));
        }

        for entry in logical.iter() {
            idx += 1;
            if (idx as u64) <= offset {
                continue;
            }
            let attr = self.entry_attr(parent, entry).await;
            entries.push(Ok(DirectoryEntryPlus {
                kind: entry.kind,
                name: entry.name.clone(),
                offset: idx,
                attr,
                entry_ttl: self.attr_ttl,
                attr_ttl: self.attr_ttl,
            }));
        }

        let stream = futures_util::stream::iter(entries);
        Ok(ReplyDirectoryPlus { entries: stream })
    }

    async fn releasedir(
        &self,
        _req: Request,
        _path: &OsStr,
        fh: u64,
        _flags: u32,
    ) -> Result<(), fuse3::Errno> {
        self.handles.remove(fh);
        Ok(())
    }
}
