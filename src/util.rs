use crate::store::StoreStat;
use fuse3::FileType;
use fuse3::path::reply::FileAttr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub const ROOT_DIR_PERM: u16 = 0o755;
pub const DIR_PERM: u16 = 0o555;
pub const CONTENT_PERM: u16 = 0o444;

const BLOCK_SIZE: u32 = 4096;

/// Store clocks tick in milliseconds; the reported mtime is truncated to
/// whole seconds.
pub fn system_time_from_millis(millis: i64) -> SystemTime {
    let secs = millis / 1000;
    if secs < 0 {
        return UNIX_EPOCH;
    }
    UNIX_EPOCH + Duration::from_secs(secs as u64)
}

/// Ownership and timestamps shared by every synthesized attribute set.
#[derive(Debug, Clone, Copy)]
pub struct AttrTemplate {
    pub uid: u32,
    pub gid: u32,
    pub mounted_at: SystemTime,
}

impl AttrTemplate {
    pub fn current_process() -> Self {
        Self {
            uid: nix::unistd::getuid().as_raw(),
            gid: nix::unistd::getgid().as_raw(),
            mounted_at: SystemTime::now(),
        }
    }

    fn base(&self, kind: FileType, perm: u16, size: u64, mtime: SystemTime) -> FileAttr {
        FileAttr {
            size,
            blocks: size.div_ceil(512),
            atime: mtime,
            mtime,
            ctime: mtime,
            kind,
            perm,
            nlink: if kind == FileType::Directory { 2 } else { 1 },
            uid: self.uid,
            gid: self.gid,
            rdev: 0,
            blksize: BLOCK_SIZE,
            #[cfg(target_os = "macos")]
            crtime: mtime,
            #[cfg(target_os = "macos")]
            flags: 0,
        }
    }

    pub fn directory(&self, root: bool) -> FileAttr {
        let perm = if root { ROOT_DIR_PERM } else { DIR_PERM };
        self.base(FileType::Directory, perm, 0, self.mounted_at)
    }

    pub fn content(&self, stat: &StoreStat) -> FileAttr {
        self.base(
            FileType::RegularFile,
            CONTENT_PERM,
            stat.data_length,
            system_time_from_millis(stat.mtime_millis),
        )
    }

    /// Attributes of a sentinel whose node could not be fetched.
    pub fn empty_content(&self) -> FileAttr {
        self.base(FileType::RegularFile, CONTENT_PERM, 0, UNIX_EPOCH)
    }
}
